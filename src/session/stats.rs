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

use serde::Serialize;

use crate::types::rating::Rating;

/// Running totals for the end-of-session summary.
#[derive(Default, Debug)]
pub struct SessionStats {
    cards_rated: usize,
    xp_earned: u32,
}

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub cards_rated: usize,
    pub xp_earned: u32,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.cards_rated = 0;
        self.xp_earned = 0;
    }

    pub fn record_rating(&mut self, rating: Rating) {
        self.cards_rated += 1;
        self.xp_earned += rating.xp();
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cards_rated: self.cards_rated,
            xp_earned: self.xp_earned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xp_accumulation() {
        let mut stats = SessionStats::new();
        stats.record_rating(Rating::Easy);
        stats.record_rating(Rating::Easy);
        stats.record_rating(Rating::Medium);
        stats.record_rating(Rating::Hard);
        assert_eq!(
            stats.snapshot(),
            StatsSnapshot {
                cards_rated: 4,
                xp_earned: 25
            }
        );
    }

    #[test]
    fn test_reset() {
        let mut stats = SessionStats::new();
        stats.record_rating(Rating::Easy);
        stats.reset();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_snapshot_is_read_only() {
        let mut stats = SessionStats::new();
        stats.record_rating(Rating::Medium);
        let a = stats.snapshot();
        let b = stats.snapshot();
        assert_eq!(a, b);
        assert_eq!(a.cards_rated, 1);
    }

    #[test]
    fn test_serialize() {
        let snapshot = StatsSnapshot {
            cards_rated: 3,
            xp_earned: 20,
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(json, r#"{"cardsRated":3,"xpEarned":20}"#);
    }
}
