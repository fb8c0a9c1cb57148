use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::Duration;

use crate::config::Config;
use crate::session::ThreadId;

/// Events reported back from a dispatched completion request.
#[derive(Debug, Clone)]
pub enum CompletionEvent {
    /// The backend answered; the reply belongs to `thread`.
    Reply {
        thread: ThreadId,
        role: String,
        content: String,
    },
    /// The request failed; no reply will arrive for `thread`.
    Failed { thread: ThreadId, error: String },
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    message: &'a str,
}

/// The `choices[0].message` portion of a completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplyMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

/// HTTP client for the completion backend.
#[derive(Clone)]
pub struct CompletionClient {
    client: reqwest::Client,
    base_url: String,
}

impl CompletionClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
        })
    }

    /// Dispatch one request on the runtime.
    ///
    /// The submitted text is moved into the task, so later edits to the
    /// composer cannot affect it. Exactly one event arrives on the returned
    /// channel: the reply, or the failure once the request errors out.
    pub fn request(&self, thread: ThreadId, text: String) -> mpsc::Receiver<CompletionEvent> {
        let (tx, rx) = mpsc::channel(1);
        let client = self.clone();

        tokio::spawn(async move {
            let event = match client.complete(&text).await {
                Ok(reply) => CompletionEvent::Reply {
                    thread,
                    role: reply.role,
                    content: reply.content,
                },
                Err(e) => {
                    tracing::warn!(error = %e, "completion request failed");
                    CompletionEvent::Failed {
                        thread,
                        error: e.to_string(),
                    }
                }
            };
            let _ = tx.send(event).await;
        });

        rx
    }

    /// POST the submitted text and parse `choices[0].message`.
    pub async fn complete(&self, text: &str) -> Result<ReplyMessage> {
        let url = format!("{}/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&CompletionRequest { message: text })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "completion backend returned {}: {}",
                status,
                body
            ));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .context("Failed to parse completion response")?;

        extract_reply(parsed)
    }
}

fn extract_reply(response: CompletionResponse) -> Result<ReplyMessage> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or_else(|| anyhow::anyhow!("completion response had no choices"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_contract_response() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Here is a plan..."}}]}"#;
        let parsed: CompletionResponse = serde_json::from_str(body).unwrap();

        let reply = extract_reply(parsed).unwrap();
        assert_eq!(reply.role, "assistant");
        assert_eq!(reply.content, "Here is a plan...");
    }

    #[test]
    fn only_the_first_choice_is_consumed() {
        let body = r#"{"choices":[
            {"message":{"role":"assistant","content":"first"}},
            {"message":{"role":"assistant","content":"second"}}
        ]}"#;
        let parsed: CompletionResponse = serde_json::from_str(body).unwrap();

        assert_eq!(extract_reply(parsed).unwrap().content, "first");
    }

    #[test]
    fn empty_choices_is_an_error() {
        let parsed: CompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(extract_reply(parsed).is_err());
    }

    #[test]
    fn request_body_carries_the_message_field() {
        let body = serde_json::to_value(CompletionRequest { message: "hello" }).unwrap();
        assert_eq!(body, serde_json::json!({ "message": "hello" }));
    }

    #[tokio::test]
    async fn unreachable_backend_reports_failure() {
        let config = Config {
            backend_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 5,
            ..Config::default()
        };
        let client = CompletionClient::new(&config).unwrap();

        let mut session = crate::session::ChatSession::new();
        session.set_input("hello");
        let outbound = session.submit().unwrap();

        let mut rx = client.request(outbound.thread, outbound.text);
        match rx.recv().await {
            Some(CompletionEvent::Failed { thread, .. }) => {
                assert_eq!(thread, outbound.thread)
            }
            other => panic!("expected a failure event, got {:?}", other),
        }
    }
}
