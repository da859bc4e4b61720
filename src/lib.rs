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

//! boxdrill: a box-based spaced repetition review engine.
//!
//! The engine schedules cards with a Leitner-style policy, runs review
//! sessions that repeat hard cards before the session ends, and hands review
//! outcomes to injected collaborators. The `drill` module is a small web
//! shell around it.

pub mod cli;
pub mod collab;
pub mod config;
pub mod db;
pub mod deck;
pub mod drill;
pub mod engine;
pub mod error;
pub mod markdown;
pub mod policy;
pub mod session;
pub mod types;

pub use collab::DueCardSource;
pub use collab::FeedbackPlayer;
pub use collab::ReviewOutcome;
pub use collab::ReviewRecorder;
pub use engine::ReviewEngine;
pub use engine::View;
pub use error::ErrorReport;
pub use error::Fallible;
pub use error::fail;
pub use policy::Interval;
pub use policy::Schedule;
pub use session::Session;
pub use types::card::Card;
pub use types::card::CardId;
pub use types::rating::Feedback;
pub use types::rating::Rating;
