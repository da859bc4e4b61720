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

//! The box-based scheduling policy. Given a card's current box and a rating,
//! decide the card's next box and how long until it is due again.

use std::fmt::Display;
use std::fmt::Formatter;

use crate::types::rating::Rating;

/// How long a hard-rated card stays in short-term review, in minutes.
const HARD_INTERVAL_MINUTES: u32 = 10;

/// Growth factor of the medium interval per box.
const MEDIUM_GROWTH: f64 = 2.2;

/// Multiplier applied to every medium interval.
const MEDIUM_SCALE: f64 = 1.2;

/// Days until the next review after promotion into box `i + 1`.
const EASY_INTERVALS: [f64; 8] = [1.0, 3.0, 7.0, 16.0, 35.0, 80.0, 180.0, 365.0];

/// The time until a card is due again.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Interval {
    Minutes(u32),
    Days(f64),
}

impl Interval {
    pub fn label(&self) -> String {
        match self {
            Interval::Minutes(minutes) => plural(*minutes as u64, "minute"),
            Interval::Days(days) => format_interval(*days),
        }
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The scheduling decision for a single rating.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Schedule {
    pub next_box: u32,
    pub interval: Interval,
}

impl Schedule {
    pub fn label(&self) -> String {
        self.interval.label()
    }
}

pub fn schedule(current_box: u32, rating: Rating) -> Schedule {
    match rating {
        Rating::Hard => Schedule {
            next_box: current_box,
            interval: Interval::Minutes(HARD_INTERVAL_MINUTES),
        },
        Rating::Medium => Schedule {
            next_box: current_box,
            interval: Interval::Days(medium_days(current_box)),
        },
        Rating::Easy => {
            let next_box = current_box.saturating_add(1);
            Schedule {
                next_box,
                interval: Interval::Days(easy_days(next_box)),
            }
        }
    }
}

/// Like [`schedule`], for callers holding an unvalidated box. Negative boxes
/// are treated as box 0.
pub fn schedule_signed(current_box: i64, rating: Rating) -> Schedule {
    let current_box = current_box.clamp(0, u32::MAX as i64) as u32;
    schedule(current_box, rating)
}

/// The schedule of every rating, in rating order. Used to label the rating
/// buttons before the user commits.
pub fn preview(current_box: u32) -> [(Rating, Schedule); 3] {
    Rating::ALL.map(|rating| (rating, schedule(current_box, rating)))
}

// Medium never promotes, so this keeps growing with the box.
fn medium_days(current_box: u32) -> f64 {
    let base = if current_box == 0 {
        1.0
    } else {
        MEDIUM_GROWTH.powi(current_box.min(i32::MAX as u32) as i32)
    };
    base * MEDIUM_SCALE
}

fn easy_days(next_box: u32) -> f64 {
    let index = (next_box.max(1) - 1) as usize;
    EASY_INTERVALS[index.min(EASY_INTERVALS.len() - 1)]
}

/// Renders a number of days for display.
pub fn format_interval(days: f64) -> String {
    if days < 1.0 {
        "<1 day".to_string()
    } else if days >= 365.0 {
        "1 year".to_string()
    } else if days >= 30.0 {
        plural((days / 30.0).round() as u64, "month")
    } else {
        plural(days.round() as u64, "day")
    }
}

fn plural(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit}")
    } else {
        format!("{count} {unit}s")
    }
}
