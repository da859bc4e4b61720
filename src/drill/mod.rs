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

mod get;
mod post;
pub mod server;
mod state;
mod template;

#[cfg(test)]
mod tests {
    use std::fs::write;
    use std::path::Path;
    use std::path::PathBuf;
    use std::time::Duration;

    use reqwest::StatusCode;
    use tempfile::tempdir;
    use tokio::net::TcpStream;
    use tokio::spawn;
    use tokio::time::sleep;

    use crate::config::Config;
    use crate::db::Database;
    use crate::drill::server::start_server;
    use crate::error::Fallible;

    const DECK: &str = r#"[
        {"id": "fr", "front": "Capital of **France**?", "back": "Paris", "box": 0, "deckTitle": "Geography"},
        {"id": "de", "front": "Capital of Germany?", "back": "Berlin", "box": 2, "deckTitle": "Geography", "sourceType": "lesson", "sourceId": 9}
    ]"#;

    fn config(port: u16) -> Config {
        Config {
            user: "alice".to_string(),
            port,
            database: "reviews.db".to_string(),
            open_browser: false,
        }
    }

    async fn serve(directory: &Path) -> String {
        let port = portpicker::pick_unused_port().expect("no free port");
        let directory = directory.to_path_buf();
        spawn(async move { start_server(directory, config(port)).await });
        let bind = format!("127.0.0.1:{port}");
        loop {
            if let Ok(stream) = TcpStream::connect(&bind).await {
                drop(stream);
                break;
            }
            sleep(Duration::from_millis(1)).await;
        }
        format!("http://{bind}/")
    }

    async fn act(url: &str, action: &str) -> Fallible<String> {
        let response = reqwest::Client::new()
            .post(url)
            .form(&[("action", action)])
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/html; charset=utf-8"
        );
        Ok(response.text().await.unwrap())
    }

    #[tokio::test]
    async fn test_start_server_on_non_existent_directory() -> Fallible<()> {
        let directory = PathBuf::from("./derpherp");
        let result = start_server(directory, config(0)).await;
        let err = result.err().unwrap();
        assert_eq!(err.to_string(), "error: directory does not exist.");
        Ok(())
    }

    #[tokio::test]
    async fn test_e2e() -> Fallible<()> {
        let dir = tempdir()?;
        write(dir.path().join("alice.json"), DECK)?;
        let url = serve(dir.path()).await;

        // Static and unknown routes.
        let response = reqwest::get(format!("{url}style.css")).await.unwrap();
        assert!(response.status().is_success());
        assert_eq!(response.headers().get("content-type").unwrap(), "text/css");
        let response = reqwest::get(format!("{url}herp-derp")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // The first card, face down.
        let html = reqwest::get(&url).await.unwrap().text().await.unwrap();
        assert!(html.contains("Capital of <strong>France</strong>?"));
        assert!(html.contains("Geography"));
        assert!(html.contains("0 / 2"));
        assert!(!html.contains("Paris"));

        // Turn it over: the back and the interval previews show up.
        let html = act(&url, "Flip").await?;
        assert!(html.contains("Paris"));
        assert!(html.contains("10 minutes"));
        assert!(html.contains("1 day"));

        // Hard puts a retry at the back of the queue.
        let html = act(&url, "Hard").await?;
        assert!(html.contains("Capital of Germany?"));
        assert!(html.contains("1 / 3"));

        act(&url, "Flip").await?;
        let html = act(&url, "Easy").await?;
        assert!(html.contains("Retry"));
        assert!(html.contains("Capital of <strong>France</strong>?"));

        act(&url, "Flip").await?;
        let html = act(&url, "Medium").await?;
        assert!(html.contains("Session Completed"));
        assert!(html.contains("Cards rated: 3"));
        assert!(html.contains("XP earned: 15"));

        // Reviews reach the log without the page waiting on them.
        let db = Database::new(dir.path().join("reviews.db").to_str().unwrap())?;
        let mut count = 0;
        for _ in 0..500 {
            count = db.review_count()?;
            if count == 3 {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(count, 3);
        let berlin = db.reviews_for_card("de")?;
        assert_eq!(berlin.len(), 1);
        assert_eq!(berlin[0].next_box, 3);
        assert_eq!(berlin[0].source_id.as_deref(), Some("9"));

        // Restart picks up the deck again from the start.
        let html = act(&url, "Restart").await?;
        assert!(html.contains("0 / 2"));
        Ok(())
    }

    #[tokio::test]
    async fn test_nothing_due() -> Fallible<()> {
        let dir = tempdir()?;
        write(dir.path().join("alice.json"), "[]")?;
        let url = serve(dir.path()).await;
        let html = reqwest::get(&url).await.unwrap().text().await.unwrap();
        assert!(html.contains("Session Completed"));
        assert!(html.contains("Nothing to review."));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_deck_is_nothing_due() -> Fallible<()> {
        let dir = tempdir()?;
        let url = serve(dir.path()).await;
        let html = reqwest::get(&url).await.unwrap().text().await.unwrap();
        assert!(html.contains("Nothing to review."));
        Ok(())
    }

    #[tokio::test]
    async fn test_rating_when_finished_is_harmless() -> Fallible<()> {
        let dir = tempdir()?;
        write(dir.path().join("alice.json"), "[]")?;
        let url = serve(dir.path()).await;
        let html = act(&url, "Easy").await?;
        assert!(html.contains("Nothing to review."));
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_action_is_rejected() -> Fallible<()> {
        let dir = tempdir()?;
        write(dir.path().join("alice.json"), DECK)?;
        let url = serve(dir.path()).await;
        let response = reqwest::Client::new()
            .post(&url)
            .form(&[("action", "Forgot")])
            .send()
            .await
            .unwrap();
        assert!(response.status().is_client_error());
        Ok(())
    }
}
