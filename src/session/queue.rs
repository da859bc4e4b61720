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

use crate::types::card::Card;

/// A card's place in the session queue.
#[derive(Clone, PartialEq, Debug)]
pub struct QueueEntry {
    pub card: Card,
    /// Whether this entry was appended after a hard rating.
    pub is_retry: bool,
}

/// The cards of one review sitting, in review order. Entries before the
/// cursor have been reviewed; the entry at the cursor is the active card.
/// Hard-rated cards are appended again at the back, so the queue only grows.
#[derive(Clone, Debug)]
pub struct SessionQueue {
    entries: Vec<QueueEntry>,
    cursor: usize,
}

impl SessionQueue {
    pub fn start(cards: &[Card]) -> Self {
        let entries = cards
            .iter()
            .cloned()
            .map(|card| QueueEntry {
                card,
                is_retry: false,
            })
            .collect();
        Self { entries, cursor: 0 }
    }

    /// The active entry, or `None` once the session is finished.
    pub fn current(&self) -> Option<&QueueEntry> {
        self.entries.get(self.cursor)
    }

    pub fn advance(&mut self) {
        if self.cursor < self.entries.len() {
            self.cursor += 1;
        }
    }

    /// Puts a retry copy of the active card at the back of the queue and
    /// moves on. Does nothing once the session is finished.
    pub fn requeue_and_advance(&mut self) {
        if let Some(entry) = self.current() {
            let retry = QueueEntry {
                card: entry.card.clone(),
                is_retry: true,
            };
            self.entries.push(retry);
            self.advance();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.entries.len()
    }

    /// Fraction of the queue reviewed so far. The denominator is the current
    /// length, since retries grow the queue.
    pub fn progress(&self) -> f64 {
        if self.entries.is_empty() {
            return 1.0;
        }
        self.cursor as f64 / self.entries.len() as f64
    }

    /// The number of entries reviewed so far.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The number of entries not yet reviewed, including the active one.
    pub fn remaining(&self) -> usize {
        self.entries.len() - self.cursor
    }
}
