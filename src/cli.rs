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

use std::env::current_dir;
use std::fmt::Write;
use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;
use crate::deck::DeckReport;
use crate::deck::check_decks;
use crate::drill::server::start_server;
use crate::error::Fallible;
use crate::error::fail;
use crate::policy::preview;

#[derive(Parser, Debug, PartialEq)]
#[command(version, about, long_about = None)]
enum Command {
    /// Drill the cards due for a user.
    Drill {
        /// Path to the deck directory. Defaults to the current directory.
        directory: Option<String>,
        /// The user whose cards are drilled. Overrides the config file.
        #[arg(long)]
        user: Option<String>,
        /// The port to serve the drill page on. Overrides the config file.
        #[arg(long)]
        port: Option<u16>,
        /// Don't open the drill page in a browser.
        #[arg(long)]
        no_open: bool,
    },
    /// Validate the deck files in a directory.
    Check {
        /// Path to the deck directory. Defaults to the current directory.
        directory: Option<String>,
    },
    /// Print the schedule each rating would produce for a card.
    Intervals {
        /// The card's current box.
        #[arg(long = "box", default_value_t = 0)]
        level: u32,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Drill {
            directory,
            user,
            port,
            no_open,
        } => {
            let directory = resolve_directory(directory)?;
            let mut config = Config::load(&directory)?;
            if let Some(user) = user {
                config.user = user;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if no_open {
                config.open_browser = false;
            }
            start_server(directory, config).await
        }
        Command::Check { directory } => {
            let directory = resolve_directory(directory)?;
            let reports = check_decks(&directory)?;
            print!("{}", render_check(&reports));
            Ok(())
        }
        Command::Intervals { level } => {
            print!("{}", render_intervals(level));
            Ok(())
        }
    }
}

fn resolve_directory(directory: Option<String>) -> Fallible<PathBuf> {
    let directory: PathBuf = match directory {
        Some(dir) => PathBuf::from(dir),
        None => current_dir()?,
    };
    if !directory.exists() {
        return fail("directory does not exist.");
    }
    Ok(directory.canonicalize()?)
}

fn render_check(reports: &[DeckReport]) -> String {
    let mut out = String::new();
    for report in reports {
        let _ = writeln!(
            out,
            "{}: {} accepted, {} rejected",
            report.path.display(),
            report.accepted,
            report.rejected.len()
        );
        for (index, reason) in &report.rejected {
            let _ = writeln!(out, "  #{index}: {reason}");
        }
    }
    if reports.iter().all(|r| r.rejected.is_empty()) {
        out.push_str("ok\n");
    }
    out
}

fn render_intervals(level: u32) -> String {
    let mut out = String::new();
    for (rating, schedule) in preview(level) {
        let _ = writeln!(
            out,
            "{:<7} box {} -> {}  {}",
            rating.as_str(),
            level,
            schedule.next_box,
            schedule.label()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_drill() {
        let cli = Command::try_parse_from(["boxdrill", "drill", "decks", "--user", "bob", "--no-open"])
            .unwrap();
        assert_eq!(
            cli,
            Command::Drill {
                directory: Some("decks".to_string()),
                user: Some("bob".to_string()),
                port: None,
                no_open: true,
            }
        );
    }

    #[test]
    fn test_parse_intervals() {
        let cli = Command::try_parse_from(["boxdrill", "intervals", "--box", "3"]).unwrap();
        assert_eq!(cli, Command::Intervals { level: 3 });
        let cli = Command::try_parse_from(["boxdrill", "intervals"]).unwrap();
        assert_eq!(cli, Command::Intervals { level: 0 });
    }

    #[test]
    fn test_render_intervals() {
        let out = render_intervals(2);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "hard    box 2 -> 2  10 minutes",
                "medium  box 2 -> 2  6 days",
                "easy    box 2 -> 3  7 days",
            ]
        );
    }

    #[test]
    fn test_render_check() {
        let reports = vec![
            DeckReport {
                path: PathBuf::from("a.json"),
                accepted: 2,
                rejected: vec![],
            },
            DeckReport {
                path: PathBuf::from("b.json"),
                accepted: 0,
                rejected: vec![(0, "card is missing its back.".to_string())],
            },
        ];
        assert_eq!(
            render_check(&reports),
            "a.json: 2 accepted, 0 rejected\nb.json: 0 accepted, 1 rejected\n  #0: card is missing its back.\n"
        );
        assert_eq!(render_check(&reports[..1]), "a.json: 2 accepted, 0 rejected\nok\n");
    }

    #[test]
    fn test_resolve_non_existent_directory() {
        assert!(resolve_directory(Some("./derpherp".to_string())).is_err());
    }
}
