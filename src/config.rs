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

use std::fs::read_to_string;
use std::path::Path;

use serde::Deserialize;

use crate::error::Fallible;

/// The name of the optional configuration file in a deck directory.
pub const CONFIG_FILE: &str = "boxdrill.toml";

#[derive(Deserialize, Debug, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// The user whose due cards are drilled.
    pub user: String,
    /// The port the drill server listens on.
    pub port: u16,
    /// The review log, relative to the deck directory.
    pub database: String,
    /// Whether to open the drill page in a browser on start.
    pub open_browser: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user: "default".to_string(),
            port: 8000,
            database: "reviews.db".to_string(),
            open_browser: true,
        }
    }
}

impl Config {
    pub fn parse(content: &str) -> Fallible<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Loads `boxdrill.toml` from `directory`, falling back to the defaults if
    /// there is none.
    pub fn load(directory: &Path) -> Fallible<Self> {
        let path = directory.join(CONFIG_FILE);
        if path.exists() {
            log::debug!("Loading configuration from {}", path.display());
            Self::parse(&read_to_string(path)?)
        } else {
            Ok(Self::default())
        }
    }
}
