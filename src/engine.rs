// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The review engine: owns the active session and wires it to the injected
//! collaborators.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use tokio::sync::mpsc::UnboundedSender;

use crate::collab::DueCardSource;
use crate::collab::FeedbackPlayer;
use crate::collab::ReviewOutcome;
use crate::error::Fallible;
use crate::error::fail;
use crate::policy::Schedule;
use crate::session::RatedCard;
use crate::session::Session;
use crate::session::Summary;
use crate::session::queue::QueueEntry;
use crate::types::card::Card;
use crate::types::rating::Rating;

pub struct ReviewEngine<S: DueCardSource> {
    user_id: String,
    source: Arc<S>,
    recorder: UnboundedSender<ReviewOutcome>,
    feedback: Arc<dyn FeedbackPlayer>,
    state: Arc<Mutex<EngineState>>,
}

struct EngineState {
    /// Bumped by every open and close. A fetch is only installed if the
    /// generation is unchanged when it resolves.
    generation: u64,
    phase: Phase,
}

enum Phase {
    Closed,
    Loading,
    Open(Session),
}

/// What the UI should show right now.
#[derive(Debug)]
pub enum View {
    Closed,
    Loading,
    Reviewing(CardView),
    Finished(Summary),
}

#[derive(Debug)]
pub struct CardView {
    pub entry: QueueEntry,
    pub revealed: bool,
    /// Entries already reviewed.
    pub position: usize,
    /// Current queue length, retries included.
    pub length: usize,
    pub progress: f64,
    pub preview: [(Rating, Schedule); 3],
}

impl<S: DueCardSource> Clone for ReviewEngine<S> {
    fn clone(&self) -> Self {
        Self {
            user_id: self.user_id.clone(),
            source: self.source.clone(),
            recorder: self.recorder.clone(),
            feedback: self.feedback.clone(),
            state: self.state.clone(),
        }
    }
}

impl<S: DueCardSource> ReviewEngine<S> {
    pub fn new(
        user_id: impl Into<String>,
        source: S,
        recorder: UnboundedSender<ReviewOutcome>,
        feedback: Arc<dyn FeedbackPlayer>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            source: Arc::new(source),
            recorder,
            feedback,
            state: Arc::new(Mutex::new(EngineState {
                generation: 0,
                phase: Phase::Closed,
            })),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Opens a fresh session from the cards currently due. Returns `false` if
    /// another open or a close happened while the cards were being fetched,
    /// in which case the fetched cards are discarded.
    pub async fn open(&self) -> bool {
        let generation = self.begin_open();
        let cards = match self.source.fetch_due_cards(&self.user_id).await {
            Ok(cards) => cards,
            Err(e) => {
                log::warn!("Failed to fetch due cards for {}: {e}", self.user_id);
                Vec::new()
            }
        };
        self.finish_open(generation, cards)
    }

    fn begin_open(&self) -> u64 {
        let mut state = self.acquire();
        state.generation += 1;
        state.phase = Phase::Loading;
        state.generation
    }

    fn finish_open(&self, generation: u64, cards: Vec<Card>) -> bool {
        let mut state = self.acquire();
        if state.generation != generation {
            log::debug!("Discarding stale fetch of {} due cards.", cards.len());
            return false;
        }
        log::debug!("Opening session with {} due cards.", cards.len());
        state.phase = Phase::Open(Session::start(&cards));
        true
    }

    /// Ends the current session, returning its summary if one was open.
    pub fn close(&self) -> Option<Summary> {
        let mut state = self.acquire();
        state.generation += 1;
        match std::mem::replace(&mut state.phase, Phase::Closed) {
            Phase::Open(session) => Some(session.summary()),
            Phase::Closed | Phase::Loading => None,
        }
    }

    pub fn flip(&self) {
        let mut state = self.acquire();
        if let Phase::Open(session) = &mut state.phase {
            session.flip();
        }
    }

    /// Rates the active card. The outcome is handed to the recorder without
    /// waiting for it to be persisted.
    pub fn rate(&self, rating: Rating) -> Fallible<RatedCard> {
        let rated = {
            let mut state = self.acquire();
            let session = match &mut state.phase {
                Phase::Open(session) => session,
                Phase::Closed | Phase::Loading => return fail("no review session is open."),
            };
            match session.rate(rating) {
                Some(rated) => rated,
                None => return fail("the review session is finished."),
            }
        };
        if let Err(e) = self.recorder.send(rated.outcome.clone()) {
            log::error!(
                "Review recorder is not running, dropping review of {}.",
                e.0.card_id
            );
        }
        if let Err(e) = self.feedback.play(rating.feedback()) {
            log::debug!("Feedback failed: {e}");
        }
        Ok(rated)
    }

    pub fn view(&self) -> View {
        let state = self.acquire();
        match &state.phase {
            Phase::Closed => View::Closed,
            Phase::Loading => View::Loading,
            Phase::Open(session) => match (session.current(), session.preview()) {
                (Some(entry), Some(preview)) => View::Reviewing(CardView {
                    entry: entry.clone(),
                    revealed: session.is_revealed(),
                    position: session.queue().position(),
                    length: session.queue().len(),
                    progress: session.progress(),
                    preview,
                }),
                _ => View::Finished(session.summary()),
            },
        }
    }

    fn acquire(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use tokio::sync::mpsc;
    use tokio::sync::oneshot;

    use super::*;
    use crate::collab::ReviewRecorder;
    use crate::collab::spawn_recorder;
    use crate::types::rating::Feedback;

    struct StaticSource {
        cards: Option<Vec<Card>>,
    }

    impl DueCardSource for StaticSource {
        async fn fetch_due_cards(&self, _user_id: &str) -> Fallible<Vec<Card>> {
            match &self.cards {
                Some(cards) => Ok(cards.clone()),
                None => fail("connection refused."),
            }
        }
    }

    /// Each fetch waits for the next gate to be opened by the test.
    struct GatedSource {
        gates: Mutex<VecDeque<oneshot::Receiver<Vec<Card>>>>,
        started: mpsc::UnboundedSender<()>,
    }

    impl DueCardSource for GatedSource {
        async fn fetch_due_cards(&self, _user_id: &str) -> Fallible<Vec<Card>> {
            let gate = self.gates.lock().unwrap().pop_front().unwrap();
            self.started.send(()).unwrap();
            Ok(gate.await.unwrap_or_default())
        }
    }

    struct MemoryRecorder {
        outcomes: Mutex<Vec<ReviewOutcome>>,
        fail: bool,
    }

    impl ReviewRecorder for MemoryRecorder {
        fn record(&self, outcome: &ReviewOutcome) -> Fallible<()> {
            if self.fail {
                return fail("disk full.");
            }
            self.outcomes.lock().unwrap().push(outcome.clone());
            Ok(())
        }
    }

    struct RecordingFeedback {
        played: Mutex<Vec<Feedback>>,
    }

    impl FeedbackPlayer for RecordingFeedback {
        fn play(&self, feedback: Feedback) -> Fallible<()> {
            self.played.lock().unwrap().push(feedback);
            fail("no audio device.")
        }
    }

    fn deck(ids: &[&str]) -> Vec<Card> {
        ids.iter()
            .map(|id| Card::new(*id, format!("front {id}"), format!("back {id}"), 1))
            .collect()
    }

    fn engine_with<S: DueCardSource>(
        source: S,
        recorder: Arc<MemoryRecorder>,
        feedback: Arc<RecordingFeedback>,
    ) -> (ReviewEngine<S>, tokio::task::JoinHandle<()>) {
        let (tx, handle) = spawn_recorder(recorder);
        (ReviewEngine::new("alice", source, tx, feedback), handle)
    }

    fn recorder(fail: bool) -> Arc<MemoryRecorder> {
        Arc::new(MemoryRecorder {
            outcomes: Mutex::new(Vec::new()),
            fail,
        })
    }

    fn feedback() -> Arc<RecordingFeedback> {
        Arc::new(RecordingFeedback {
            played: Mutex::new(Vec::new()),
        })
    }

    fn active_id<S: DueCardSource>(engine: &ReviewEngine<S>) -> Option<String> {
        match engine.view() {
            View::Reviewing(view) => Some(view.entry.card.id().to_string()),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_full_session() -> Fallible<()> {
        let rec = recorder(false);
        let fb = feedback();
        let source = StaticSource {
            cards: Some(deck(&["a", "b"])),
        };
        let (engine, handle) = engine_with(source, rec.clone(), fb.clone());
        assert!(matches!(engine.view(), View::Closed));
        assert!(engine.open().await);

        assert_eq!(active_id(&engine).as_deref(), Some("a"));
        engine.flip();
        match engine.view() {
            View::Reviewing(view) => {
                assert!(view.revealed);
                assert_eq!(view.position, 0);
                assert_eq!(view.length, 2);
                assert_eq!(view.preview[2].1.next_box, 2);
            }
            other => panic!("unexpected view: {other:?}"),
        }

        engine.rate(Rating::Hard)?;
        engine.rate(Rating::Easy)?;
        assert_eq!(active_id(&engine).as_deref(), Some("a"));
        engine.rate(Rating::Medium)?;

        match engine.view() {
            View::Finished(summary) => {
                assert_eq!(summary.stats.cards_rated, 3);
                assert_eq!(summary.stats.xp_earned, 15);
            }
            other => panic!("unexpected view: {other:?}"),
        }
        assert!(engine.rate(Rating::Easy).is_err());

        drop(engine);
        handle.await.unwrap();
        let outcomes = rec.outcomes.lock().unwrap();
        let recorded: Vec<(&str, Rating, u32)> = outcomes
            .iter()
            .map(|o| (o.card_id.as_str(), o.rating, o.next_box))
            .collect();
        assert_eq!(
            recorded,
            vec![
                ("a", Rating::Hard, 1),
                ("b", Rating::Easy, 2),
                ("a", Rating::Medium, 1)
            ]
        );
        assert_eq!(
            *fb.played.lock().unwrap(),
            vec![Feedback::Negative, Feedback::Positive, Feedback::Neutral]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_failure_is_an_empty_session() {
        let (engine, _handle) = engine_with(StaticSource { cards: None }, recorder(false), feedback());
        assert!(engine.open().await);
        match engine.view() {
            View::Finished(summary) => assert_eq!(summary.stats.cards_rated, 0),
            other => panic!("unexpected view: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_due_set_is_finished_immediately() {
        let source = StaticSource {
            cards: Some(Vec::new()),
        };
        let (engine, _handle) = engine_with(source, recorder(false), feedback());
        engine.open().await;
        assert!(matches!(engine.view(), View::Finished(_)));
    }

    #[tokio::test]
    async fn test_rate_without_session_fails() {
        let source = StaticSource {
            cards: Some(deck(&["a"])),
        };
        let (engine, _handle) = engine_with(source, recorder(false), feedback());
        let err = engine.rate(Rating::Easy).unwrap_err();
        assert_eq!(err.to_string(), "error: no review session is open.");
    }

    #[tokio::test]
    async fn test_persistence_failure_does_not_roll_back() -> Fallible<()> {
        let rec = recorder(true);
        let source = StaticSource {
            cards: Some(deck(&["a", "b"])),
        };
        let (engine, handle) = engine_with(source, rec.clone(), feedback());
        engine.open().await;
        engine.rate(Rating::Easy)?;
        assert_eq!(active_id(&engine).as_deref(), Some("b"));
        engine.rate(Rating::Easy)?;
        assert!(matches!(engine.view(), View::Finished(_)));
        drop(engine);
        handle.await.unwrap();
        assert!(rec.outcomes.lock().unwrap().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_stopped_recorder_does_not_block_rating() -> Fallible<()> {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let source = StaticSource {
            cards: Some(deck(&["a"])),
        };
        let engine = ReviewEngine::new("alice", source, tx, feedback());
        engine.open().await;
        engine.rate(Rating::Medium)?;
        assert!(matches!(engine.view(), View::Finished(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_stale_fetch_is_discarded() {
        let (gate_a, rx_a) = oneshot::channel();
        let (gate_b, rx_b) = oneshot::channel();
        let (started_tx, mut started_rx) = mpsc::unbounded_channel();
        let source = GatedSource {
            gates: Mutex::new(VecDeque::from([rx_a, rx_b])),
            started: started_tx,
        };
        let (engine, _handle) = engine_with(source, recorder(false), feedback());

        let first = tokio::spawn({
            let engine = engine.clone();
            async move { engine.open().await }
        });
        started_rx.recv().await.unwrap();
        assert!(matches!(engine.view(), View::Loading));

        let second = tokio::spawn({
            let engine = engine.clone();
            async move { engine.open().await }
        });
        started_rx.recv().await.unwrap();

        gate_b.send(deck(&["fresh"])).unwrap();
        assert!(second.await.unwrap());
        gate_a.send(deck(&["stale"])).unwrap();
        assert!(!first.await.unwrap());

        assert_eq!(active_id(&engine).as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn test_close_discards_fetch_in_flight() {
        let (gate, rx) = oneshot::channel();
        let (started_tx, mut started_rx) = mpsc::unbounded_channel();
        let source = GatedSource {
            gates: Mutex::new(VecDeque::from([rx])),
            started: started_tx,
        };
        let (engine, _handle) = engine_with(source, recorder(false), feedback());
        let pending = tokio::spawn({
            let engine = engine.clone();
            async move { engine.open().await }
        });
        started_rx.recv().await.unwrap();
        assert!(engine.close().is_none());
        gate.send(deck(&["late"])).unwrap();
        assert!(!pending.await.unwrap());
        assert!(matches!(engine.view(), View::Closed));
    }

    #[tokio::test]
    async fn test_reopen_starts_fresh_session() -> Fallible<()> {
        let source = StaticSource {
            cards: Some(deck(&["a", "b"])),
        };
        let (engine, _handle) = engine_with(source, recorder(false), feedback());
        engine.open().await;
        engine.rate(Rating::Easy)?;
        let summary = engine.close().unwrap();
        assert_eq!(summary.stats.xp_earned, 10);
        engine.open().await;
        assert_eq!(active_id(&engine).as_deref(), Some("a"));
        match engine.view() {
            View::Reviewing(view) => assert_eq!(view.position, 0),
            other => panic!("unexpected view: {other:?}"),
        }
        Ok(())
    }
}
