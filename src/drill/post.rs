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

use axum::Form;
use axum::extract::State;
use axum::response::Redirect;
use serde::Deserialize;

use crate::drill::state::ServerState;
use crate::error::Fallible;
use crate::types::rating::Rating;

#[derive(Debug, Deserialize)]
enum Action {
    Flip,
    Hard,
    Medium,
    Easy,
    Restart,
}

impl Action {
    pub fn rating(&self) -> Rating {
        match self {
            Action::Hard => Rating::Hard,
            Action::Medium => Rating::Medium,
            Action::Easy => Rating::Easy,
            _ => panic!("Action does not correspond to a rating"),
        }
    }
}

#[derive(Deserialize)]
pub struct FormData {
    action: Action,
}

pub async fn post_handler(
    State(state): State<ServerState>,
    Form(form): Form<FormData>,
) -> Redirect {
    match action_handler(&state, form.action).await {
        Ok(_) => {}
        Err(e) => {
            log::error!("{e}");
        }
    }
    Redirect::to("/")
}

async fn action_handler(state: &ServerState, action: Action) -> Fallible<()> {
    match action {
        Action::Flip => {
            state.engine.flip();
        }
        Action::Hard | Action::Medium | Action::Easy => {
            let rated = state.engine.rate(action.rating())?;
            log::debug!(
                "Rated {} {}, due in {}",
                rated.outcome.card_id,
                rated.outcome.rating,
                rated.schedule.label()
            );
        }
        Action::Restart => {
            log::debug!("Reopening session for {}", state.engine.user_id());
            state.engine.open().await;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_rating() {
        assert_eq!(Action::Hard.rating(), Rating::Hard);
        assert_eq!(Action::Medium.rating(), Rating::Medium);
        assert_eq!(Action::Easy.rating(), Rating::Easy);
    }

    #[test]
    #[should_panic(expected = "Action does not correspond to a rating")]
    fn test_non_rating_action_panics() {
        Action::Flip.rating();
    }
}
