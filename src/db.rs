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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use rusqlite::Connection;
use rusqlite::Transaction;

use crate::collab::ReviewOutcome;
use crate::collab::ReviewRecorder;
use crate::error::Fallible;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

/// An append-only review log in SQLite.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

/// A review as read back from the log.
#[derive(Debug)]
pub struct ReviewRow {
    pub card_id: String,
    pub rating: Rating,
    pub next_box: u32,
    pub source_type: Option<String>,
    pub source_id: Option<String>,
    pub node_id: Option<String>,
    pub reviewed_at: Timestamp,
}

impl Database {
    pub fn new(database_path: &str) -> Fallible<Self> {
        let conn = Connection::open(database_path)?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Fallible<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(mut conn: Connection) -> Fallible<Self> {
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                log::debug!("Creating review log schema.");
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self { conn })
    }

    pub fn insert_review(&self, outcome: &ReviewOutcome, reviewed_at: Timestamp) -> Fallible<()> {
        let sql = "insert into reviews (card_id, rating, next_box, source_type, source_id, node_id, reviewed_at) values (?, ?, ?, ?, ?, ?, ?);";
        let conn = self.acquire();
        conn.execute(
            sql,
            (
                outcome.card_id.as_str(),
                outcome.rating,
                outcome.next_box,
                &outcome.source_type,
                &outcome.source_id,
                &outcome.node_id,
                reviewed_at,
            ),
        )?;
        Ok(())
    }

    /// The total number of reviews in the log.
    pub fn review_count(&self) -> Fallible<usize> {
        let conn = self.acquire();
        let count: i64 = conn.query_row("select count(*) from reviews;", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Every review of a card, oldest first.
    pub fn reviews_for_card(&self, card_id: &str) -> Fallible<Vec<ReviewRow>> {
        let conn = self.acquire();
        let sql = "select card_id, rating, next_box, source_type, source_id, node_id, reviewed_at from reviews where card_id = ? order by review_id;";
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query([card_id])?;
        let mut reviews = Vec::new();
        while let Some(row) = rows.next()? {
            reviews.push(ReviewRow {
                card_id: row.get(0)?,
                rating: row.get(1)?,
                next_box: row.get(2)?,
                source_type: row.get(3)?,
                source_id: row.get(4)?,
                node_id: row.get(5)?,
                reviewed_at: row.get(6)?,
            });
        }
        Ok(reviews)
    }

    fn acquire(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ReviewRecorder for Database {
    fn record(&self, outcome: &ReviewOutcome) -> Fallible<()> {
        self.insert_review(outcome, Timestamp::now())
    }
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["reviews"], |row| row.get(0))?;
    Ok(count > 0)
}
