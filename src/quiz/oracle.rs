//! Client for the remote text-completion service used for hints,
//! explanations, doubts and fill-in-the-blank generation.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::OracleConfig;
use crate::quiz::error::OracleError;

/// Substituted whenever the service fails or answers with nothing usable.
pub const FALLBACK_TEXT: &str = "No explanation available.";

#[async_trait]
pub trait Oracle: Send + Sync {
    /// Sends one prompt. `Ok(None)` means the service answered but the
    /// response carried no text.
    async fn generate(&self, prompt: &str) -> Result<Option<String>, OracleError>;
}

/// Text to show plus an optional non-fatal notice for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub notice: Option<String>,
}

impl Reply {
    fn fallback(notice: Option<String>) -> Self {
        Self {
            text: FALLBACK_TEXT.to_string(),
            notice,
        }
    }
}

/// Asks the oracle and never fails: errors degrade to [`FALLBACK_TEXT`].
pub async fn complete(oracle: &dyn Oracle, prompt: &str) -> Reply {
    log::debug!("Prompt: {:?}", prompt);
    match oracle.generate(prompt).await {
        Ok(Some(text)) if !text.trim().is_empty() => {
            log::debug!("Completion: {:?}", text);
            Reply {
                text: text.trim().to_string(),
                notice: None,
            }
        }
        Ok(_) => {
            log::warn!("Oracle returned no text");
            Reply::fallback(None)
        }
        Err(err) => {
            log::warn!("Oracle request failed: {}", err);
            Reply::fallback(Some(format!("Error fetching explanation: {}", err)))
        }
    }
}

/// Gemini `generateContent` endpoint.
pub struct GeminiOracle {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GeminiOracle {
    pub fn new(config: &OracleConfig) -> Result<Self, OracleError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl Oracle for GeminiOracle {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, OracleError> {
        let payload = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OracleError::HttpStatus(response.status()));
        }

        let body: GenerateResponse = response.json().await?;
        Ok(body.into_text())
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// `candidates[0].content.parts[0].text`
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replays canned answers in order and records every prompt it sees.
    #[derive(Default)]
    pub(crate) struct ScriptedOracle {
        replies: Mutex<VecDeque<Result<Option<String>, OracleError>>>,
        pub(crate) prompts: Mutex<Vec<String>>,
    }

    impl ScriptedOracle {
        pub(crate) fn with_texts<I, S>(texts: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            let replies = texts.into_iter().map(|t| Ok(Some(t.into()))).collect();
            Self {
                replies: Mutex::new(replies),
                prompts: Mutex::default(),
            }
        }

        pub(crate) fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Oracle for ScriptedOracle {
        async fn generate(&self, prompt: &str) -> Result<Option<String>, OracleError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(None))
        }
    }

    fn parse(body: &str) -> Option<String> {
        serde_json::from_str::<GenerateResponse>(body)
            .unwrap()
            .into_text()
    }

    #[test]
    fn extracts_first_candidate_text() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"  A hint  "},{"text":"ignored"}]}},{"content":{"parts":[{"text":"second"}]}}]}"#;
        assert_eq!(parse(body).as_deref(), Some("  A hint  "));
    }

    #[test]
    fn missing_shapes_yield_nothing() {
        assert_eq!(parse(r#"{}"#), None);
        assert_eq!(parse(r#"{"candidates":[]}"#), None);
        assert_eq!(parse(r#"{"candidates":[{}]}"#), None);
        assert_eq!(parse(r#"{"candidates":[{"content":{"parts":[]}}]}"#), None);
        assert_eq!(parse(r#"{"candidates":[{"content":{"parts":[{}]}}]}"#), None);
    }

    #[test]
    fn request_body_matches_wire_shape() {
        let payload = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: "why?" }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({"contents": [{"parts": [{"text": "why?"}]}]})
        );
    }

    #[tokio::test]
    async fn complete_trims_successful_text() {
        let oracle = ScriptedOracle::with_texts(["\n  Think about paging.  \n"]);
        let reply = complete(&oracle, "hint please").await;
        assert_eq!(reply.text, "Think about paging.");
        assert_eq!(reply.notice, None);
        assert_eq!(oracle.prompts(), vec!["hint please".to_string()]);
    }

    #[tokio::test]
    async fn empty_text_falls_back_silently() {
        let oracle = ScriptedOracle::with_texts(["   "]);
        let reply = complete(&oracle, "x").await;
        assert_eq!(reply.text, FALLBACK_TEXT);
        assert_eq!(reply.notice, None);

        let exhausted = ScriptedOracle::default();
        assert_eq!(complete(&exhausted, "x").await.text, FALLBACK_TEXT);
    }

    /// Answers a single request with `status_line` and `body`, returning the
    /// endpoint to post to.
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let read = stream.read(&mut buf).unwrap();
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..read]);
                let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") else {
                    continue;
                };
                let head = String::from_utf8_lossy(&request[..end]).to_lowercase();
                let length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|value| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if request.len() >= end + 4 + length {
                    break;
                }
            }
            let response = format!(
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{addr}/v1beta/models/test:generateContent")
    }

    fn local_oracle(endpoint: String) -> GeminiOracle {
        GeminiOracle::new(&OracleConfig {
            endpoint,
            api_key: "test-key".to_string(),
            timeout: Some(Duration::from_secs(5)),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn error_status_falls_back_with_notice() {
        let oracle = local_oracle(serve_once("HTTP/1.1 503 Service Unavailable", ""));

        let reply = complete(&oracle, "anything").await;

        assert_eq!(reply.text, FALLBACK_TEXT);
        let notice = reply.notice.unwrap();
        assert!(notice.starts_with("Error fetching explanation"));
        assert!(notice.contains("503"));
    }

    #[tokio::test]
    async fn undecodable_body_falls_back_with_notice() {
        let oracle = local_oracle(serve_once("HTTP/1.1 200 OK", "not json"));

        let reply = complete(&oracle, "anything").await;

        assert_eq!(reply.text, FALLBACK_TEXT);
        assert!(reply.notice.is_some());
    }

    #[tokio::test]
    async fn body_without_candidates_falls_back_silently() {
        let oracle = local_oracle(serve_once("HTTP/1.1 200 OK", "{}"));

        let reply = complete(&oracle, "anything").await;

        assert_eq!(reply.text, FALLBACK_TEXT);
        assert_eq!(reply.notice, None);
    }

    #[tokio::test]
    async fn successful_body_yields_candidate_text() {
        let oracle = local_oracle(serve_once(
            "HTTP/1.1 200 OK",
            r#"{"candidates":[{"content":{"parts":[{"text":" Paging. "}]}}]}"#,
        ));

        let reply = complete(&oracle, "anything").await;

        assert_eq!(reply.text, "Paging.");
        assert_eq!(reply.notice, None);
    }

    #[tokio::test]
    async fn transport_failure_falls_back_with_notice() {
        let oracle = GeminiOracle::new(&OracleConfig {
            endpoint: "http://127.0.0.1:9/v1beta/models/test:generateContent".to_string(),
            api_key: "test-key".to_string(),
            timeout: Some(Duration::from_secs(2)),
        })
        .unwrap();

        let reply = complete(&oracle, "anything").await;
        assert_eq!(reply.text, FALLBACK_TEXT);
        assert!(reply
            .notice
            .as_deref()
            .is_some_and(|notice| notice.starts_with("Error fetching explanation")));
    }
}
