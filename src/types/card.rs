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

use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;

/// Opaque card identifier, unique within the backing store.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct CardId(String);

impl CardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derives an identifier from the card's text, for entries that arrive
    /// without one.
    fn from_content(front: &str, back: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(front.as_bytes());
        hasher.update(&[0]);
        hasher.update(back.as_bytes());
        Self(format!("h:{}", hasher.finalize().to_hex()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CardId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A due card. The core reads `level` to schedule the next review but never
/// writes it back.
#[derive(Clone, PartialEq, Debug)]
pub struct Card {
    id: CardId,
    front: String,
    back: String,
    /// The card's current box.
    level: u32,
    deck_title: String,
    provenance: Provenance,
}

/// Where a card came from. Forwarded to the review log verbatim.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct Provenance {
    pub source_type: Option<String>,
    pub source_id: Option<String>,
    pub node_id: Option<String>,
}

impl Card {
    pub fn new(
        id: impl Into<String>,
        front: impl Into<String>,
        back: impl Into<String>,
        level: u32,
    ) -> Self {
        Self {
            id: CardId::new(id),
            front: front.into(),
            back: back.into(),
            level,
            deck_title: String::new(),
            provenance: Provenance::default(),
        }
    }

    pub fn with_deck_title(mut self, deck_title: impl Into<String>) -> Self {
        self.deck_title = deck_title.into();
        self
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    /// Validates a card as received from a collaborator.
    pub fn from_raw(raw: RawCard) -> Fallible<Self> {
        let front = match raw.front {
            Some(front) => front,
            None => return fail("card is missing its front."),
        };
        let back = match raw.back {
            Some(back) => back,
            None => return fail("card is missing its back."),
        };
        let id = match raw.id {
            Some(id) => CardId::new(id.into_string()),
            None => CardId::from_content(&front, &back),
        };
        let level = raw.level.unwrap_or(0).clamp(0, u32::MAX as i64) as u32;
        Ok(Self {
            id,
            front,
            back,
            level,
            deck_title: raw.deck_title.unwrap_or_default(),
            provenance: Provenance {
                source_type: raw.source_type.map(Scalar::into_string),
                source_id: raw.source_id.map(Scalar::into_string),
                node_id: raw.node_id.map(Scalar::into_string),
            },
        })
    }

    pub fn id(&self) -> &CardId {
        &self.id
    }

    pub fn front(&self) -> &str {
        &self.front
    }

    pub fn back(&self) -> &str {
        &self.back
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn deck_title(&self) -> &str {
        &self.deck_title
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }
}

/// The lenient wire shape of a card. Backends send ids and provenance as
/// either strings or numbers, and may leave out the box entirely.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RawCard {
    #[serde(default)]
    pub id: Option<Scalar>,
    #[serde(default)]
    pub front: Option<String>,
    #[serde(default)]
    pub back: Option<String>,
    #[serde(default, rename = "box")]
    pub level: Option<i64>,
    #[serde(default)]
    pub deck_title: Option<String>,
    #[serde(default)]
    pub source_type: Option<Scalar>,
    #[serde(default)]
    pub source_id: Option<Scalar>,
    #[serde(default)]
    pub node_id: Option<Scalar>,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Integer(i64),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Text(s) => s,
            Scalar::Integer(n) => n.to_string(),
        }
    }
}

/// The result of validating a due-card document entry by entry.
pub struct ValidatedCards {
    pub cards: Vec<Card>,
    /// The index and reason of every rejected entry.
    pub rejected: Vec<(usize, ErrorReport)>,
}

/// Validates every entry of a JSON array of cards. Fails only if the document
/// itself is not an array.
pub fn validate_cards(json: &str) -> Fallible<ValidatedCards> {
    let value: Value = serde_json::from_str(json)?;
    let entries = match value {
        Value::Array(entries) => entries,
        _ => return fail("due cards must be a JSON array."),
    };
    let mut cards = Vec::with_capacity(entries.len());
    let mut rejected = Vec::new();
    for (index, entry) in entries.into_iter().enumerate() {
        let card = RawCard::deserialize(entry)
            .map_err(ErrorReport::from)
            .and_then(Card::from_raw);
        match card {
            Ok(card) => cards.push(card),
            Err(e) => rejected.push((index, e)),
        }
    }
    Ok(ValidatedCards { cards, rejected })
}

/// Parses due cards, skipping malformed entries.
pub fn parse_due_cards(json: &str) -> Fallible<Vec<Card>> {
    let ValidatedCards { cards, rejected } = validate_cards(json)?;
    for (index, e) in rejected {
        log::warn!("Skipping due card #{index}: {e}");
    }
    Ok(cards)
}
