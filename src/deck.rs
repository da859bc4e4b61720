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

use std::path::Path;
use std::path::PathBuf;

use walkdir::WalkDir;

use crate::collab::DueCardSource;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::card::Card;
use crate::types::card::ValidatedCards;
use crate::types::card::parse_due_cards;
use crate::types::card::validate_cards;

/// Reads a user's due cards from `<directory>/<user>.json`.
pub struct JsonCardSource {
    directory: PathBuf,
}

impl JsonCardSource {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn deck_path(&self, user_id: &str) -> Fallible<PathBuf> {
        if user_id.is_empty()
            || user_id.contains(['/', '\\'])
            || user_id.starts_with('.')
        {
            return fail(format!("invalid user id: {user_id:?}"));
        }
        Ok(self.directory.join(format!("{user_id}.json")))
    }
}

impl DueCardSource for JsonCardSource {
    async fn fetch_due_cards(&self, user_id: &str) -> Fallible<Vec<Card>> {
        let path = self.deck_path(user_id)?;
        log::debug!("Loading due cards from {}", path.display());
        let content = tokio::fs::read_to_string(&path).await?;
        parse_due_cards(&content)
    }
}

/// Validation results for one deck file.
pub struct DeckReport {
    pub path: PathBuf,
    pub accepted: usize,
    pub rejected: Vec<(usize, String)>,
}

/// Validates every `*.json` deck under `directory`.
pub fn check_decks(directory: &Path) -> Fallible<Vec<DeckReport>> {
    if !directory.exists() {
        return fail("directory does not exist.");
    }
    let mut reports = Vec::new();
    for entry in WalkDir::new(directory).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            let content = std::fs::read_to_string(path)?;
            let ValidatedCards { cards, rejected } = match validate_cards(&content) {
                Ok(validated) => validated,
                Err(e) => return fail(format!("{}: {}", path.display(), e.message())),
            };
            reports.push(DeckReport {
                path: path.to_path_buf(),
                accepted: cards.len(),
                rejected: rejected
                    .into_iter()
                    .map(|(index, e)| (index, e.message().to_string()))
                    .collect(),
            });
        }
    }
    Ok(reports)
}
