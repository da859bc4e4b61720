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

//! The collaborators the review engine depends on. The engine is handed an
//! implementation of each when it is constructed.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::error::Fallible;
use crate::types::card::Card;
use crate::types::card::CardId;
use crate::types::rating::Feedback;
use crate::types::rating::Rating;

/// The record of a single rating, as handed to the review log.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    #[serde(serialize_with = "serialize_card_id")]
    pub card_id: CardId,
    pub rating: Rating,
    pub next_box: u32,
    pub source_type: Option<String>,
    pub source_id: Option<String>,
    pub node_id: Option<String>,
}

impl ReviewOutcome {
    pub fn new(card: &Card, rating: Rating, next_box: u32) -> Self {
        let provenance = card.provenance().clone();
        Self {
            card_id: card.id().clone(),
            rating,
            next_box,
            source_type: provenance.source_type,
            source_id: provenance.source_id,
            node_id: provenance.node_id,
        }
    }
}

fn serialize_card_id<S>(id: &CardId, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(id.as_str())
}

/// Supplies the cards due for review right now.
pub trait DueCardSource: Send + Sync + 'static {
    fn fetch_due_cards(&self, user_id: &str) -> impl Future<Output = Fallible<Vec<Card>>> + Send;
}

/// Persists review outcomes.
pub trait ReviewRecorder: Send + Sync {
    fn record(&self, outcome: &ReviewOutcome) -> Fallible<()>;
}

/// Plays a cue after a rating. Best effort.
pub trait FeedbackPlayer: Send + Sync {
    fn play(&self, feedback: Feedback) -> Fallible<()>;
}

/// A feedback player that only logs the cue.
pub struct LogFeedback;

impl FeedbackPlayer for LogFeedback {
    fn play(&self, feedback: Feedback) -> Fallible<()> {
        log::debug!("Feedback: {feedback:?}");
        Ok(())
    }
}

/// Spawns the task that drains review outcomes into `recorder`. The task
/// exits once every sender is dropped. Failures are logged and dropped.
pub fn spawn_recorder(
    recorder: Arc<dyn ReviewRecorder>,
) -> (UnboundedSender<ReviewOutcome>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<ReviewOutcome>();
    let handle = tokio::spawn(async move {
        while let Some(outcome) = rx.recv().await {
            if let Err(e) = recorder.record(&outcome) {
                log::error!("Failed to record review of {}: {e}", outcome.card_id);
            }
        }
        log::debug!("Review recorder stopped.");
    });
    (tx, handle)
}
