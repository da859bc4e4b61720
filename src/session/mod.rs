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

//! A single review sitting.

pub mod queue;
pub mod stats;

use crate::collab::ReviewOutcome;
use crate::policy;
use crate::policy::Schedule;
use crate::session::queue::QueueEntry;
use crate::session::queue::SessionQueue;
use crate::session::stats::SessionStats;
use crate::session::stats::StatsSnapshot;
use crate::types::card::Card;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

pub struct Session {
    queue: SessionQueue,
    stats: SessionStats,
    /// Whether the back of the active card is showing.
    revealed: bool,
    started_at: Timestamp,
}

/// What happened when the active card was rated.
#[derive(Clone, Debug)]
pub struct RatedCard {
    pub outcome: ReviewOutcome,
    pub schedule: Schedule,
    /// Whether a retry of the card was put at the back of the queue.
    pub requeued: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct Summary {
    pub stats: StatsSnapshot,
    pub duration_secs: u64,
}

impl Session {
    pub fn start(cards: &[Card]) -> Self {
        let mut stats = SessionStats::new();
        stats.reset();
        Self {
            queue: SessionQueue::start(cards),
            stats,
            revealed: false,
            started_at: Timestamp::now(),
        }
    }

    pub fn current(&self) -> Option<&QueueEntry> {
        self.queue.current()
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Turns the active card over. The active card itself does not change.
    pub fn flip(&mut self) {
        if !self.queue.is_finished() {
            self.revealed = !self.revealed;
        }
    }

    /// Schedules for each rating of the active card.
    pub fn preview(&self) -> Option<[(Rating, Schedule); 3]> {
        self.current()
            .map(|entry| policy::preview(entry.card.level()))
    }

    /// Rates the active card and moves on to the next one. Returns `None` if
    /// the session is already finished.
    pub fn rate(&mut self, rating: Rating) -> Option<RatedCard> {
        let entry = self.queue.current()?;
        let schedule = policy::schedule(entry.card.level(), rating);
        let outcome = ReviewOutcome::new(&entry.card, rating, schedule.next_box);
        log::debug!(
            "{} {} box={}->{} next={}",
            outcome.card_id,
            rating,
            entry.card.level(),
            schedule.next_box,
            schedule.label()
        );
        self.stats.record_rating(rating);
        let requeued = rating.should_repeat();
        if requeued {
            self.queue.requeue_and_advance();
        } else {
            self.queue.advance();
        }
        self.revealed = false;
        Some(RatedCard {
            outcome,
            schedule,
            requeued,
        })
    }

    pub fn is_finished(&self) -> bool {
        self.queue.is_finished()
    }

    pub fn progress(&self) -> f64 {
        self.queue.progress()
    }

    pub fn queue(&self) -> &SessionQueue {
        &self.queue
    }

    pub fn summary(&self) -> Summary {
        Summary {
            stats: self.stats.snapshot(),
            duration_secs: self.started_at.seconds_until(Timestamp::now()),
        }
    }
}
