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

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use maud::Markup;
use maud::PreEscaped;
use maud::html;

use crate::drill::state::ServerState;
use crate::drill::template::page_template;
use crate::engine::CardView;
use crate::engine::View;
use crate::markdown::markdown_to_html;
use crate::session::Summary;
use crate::types::rating::Rating;

pub async fn get_handler(State(state): State<ServerState>) -> (StatusCode, Html<String>) {
    let body = match state.engine.view() {
        View::Closed => html! {
            div.finished {
                h1 { "Session Closed" }
                (restart_form())
            }
        },
        View::Loading => html! {
            div.finished {
                h1 { "Loading..." }
            }
        },
        View::Reviewing(view) => render_card(&view),
        View::Finished(summary) => render_summary(&summary),
    };
    let html = page_template(body);
    (StatusCode::OK, Html(html.into_string()))
}

fn render_card(view: &CardView) -> Markup {
    let card = &view.entry.card;
    let progress = format!("{} / {}", view.position, view.length);
    let percent = (view.progress * 100.0).round() as u32;
    let progress_style = format!("width: {percent}%;");
    let front = markdown_to_html(card.front());
    let controls = if view.revealed {
        html! {
            form action="/" method="post" {
                @for (rating, schedule) in &view.preview {
                    button id=(rating.as_str()) type="submit" name="action" value=(button_value(*rating)) {
                        (button_value(*rating))
                        span.interval { (schedule.label()) }
                    }
                }
            }
        }
    } else {
        html! {
            form action="/" method="post" {
                button id="flip" type="submit" name="action" value="Flip" { "Reveal" }
            }
        }
    };
    html! {
        div.root {
            div.card {
                div.header {
                    h1 { (card.deck_title()) }
                    div.progress { (progress) }
                }
                div.progress-bar {
                    div.progress-fill style=(progress_style) {}
                }
                @if view.entry.is_retry {
                    span.retry { "Retry" }
                }
                div.content {
                    div.question .rich-text {
                        (PreEscaped(front))
                    }
                    @if view.revealed {
                        div.answer .rich-text {
                            (PreEscaped(markdown_to_html(card.back())))
                        }
                    }
                }
                div.controls {
                    (controls)
                }
            }
        }
    }
}

fn render_summary(summary: &Summary) -> Markup {
    let stats = summary.stats;
    html! {
        div.finished {
            h1 { "Session Completed" }
            @if stats.cards_rated == 0 {
                p { "Nothing to review." }
            } @else {
                ul.stats {
                    li { "Cards rated: " (stats.cards_rated) }
                    li { "XP earned: " (stats.xp_earned) }
                    li { "Time: " (format_duration(summary.duration_secs)) }
                }
            }
            (restart_form())
        }
    }
}

fn restart_form() -> Markup {
    html! {
        form action="/" method="post" {
            button id="restart" type="submit" name="action" value="Restart" { "Check for due cards" }
        }
    }
}

fn button_value(rating: Rating) -> &'static str {
    match rating {
        Rating::Hard => "Hard",
        Rating::Medium => "Medium",
        Rating::Easy => "Easy",
    }
}

fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{secs}s")
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(59), "59s");
        assert_eq!(format_duration(125), "2m 5s");
    }
}
