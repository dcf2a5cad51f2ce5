//! # HTTP Engine Client
//!
//! Streams fragments from an OpenAI-style chat completion endpoint
//! (`stream: true`). The upstream response is a text event stream of
//! `data: <json>` lines terminated by a `data: [DONE]` sentinel; each
//! chunk's `choices[0].delta.content` becomes one opaque fragment.
//!
//! Failures are reported in-band as [`EngineSignal::Failed`] — the session
//! layer converts them to a terminal `error` event, never a raw stream
//! abort.

use std::time::Duration;

use futures::StreamExt;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::EngineConfig;
use crate::context::EvaluationContext;
use crate::engine::{ArbiterEngine, EngineSignal, FRAGMENT_CHANNEL_CAPACITY};
use crate::error::EngineError;

/// Reqwest-backed inference engine client.
#[derive(Debug, Clone)]
pub struct HttpEngine {
    http: reqwest::Client,
    config: EngineConfig,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    stream: bool,
    messages: Vec<ChatMessage<'a>>,
}

impl HttpEngine {
    /// Create an engine client from configuration.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(config.timeout_secs));

        if let Some(key) = &config.api_key {
            let mut headers = reqwest::header::HeaderMap::new();
            let value = reqwest::header::HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|_| EngineError::Config(crate::config::ConfigError::InvalidApiKey))?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
            builder = builder.default_headers(headers);
        }

        let http = builder.build().map_err(|e| EngineError::Http {
            endpoint: "client_init".to_string(),
            source: e,
        })?;

        Ok(Self { http, config })
    }

    async fn run(
        http: reqwest::Client,
        config: EngineConfig,
        context: EvaluationContext,
        cancel: CancellationToken,
        tx: mpsc::Sender<EngineSignal>,
    ) {
        match Self::stream_fragments(http, &config, context, cancel, &tx).await {
            Ok(()) => {}
            Err(EngineError::Cancelled) => {
                tracing::debug!("engine run cancelled before completion");
            }
            Err(e) => {
                tracing::warn!(error = %e, "engine stream failed");
                let _ = tx.send(EngineSignal::Failed(e.to_string())).await;
            }
        }
    }

    async fn stream_fragments(
        http: reqwest::Client,
        config: &EngineConfig,
        context: EvaluationContext,
        cancel: CancellationToken,
        tx: &mpsc::Sender<EngineSignal>,
    ) -> Result<(), EngineError> {
        let endpoint = config.url.to_string();
        let body = ChatRequest {
            model: &config.model,
            stream: true,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &context.system,
                },
                ChatMessage {
                    role: "user",
                    content: &context.input,
                },
            ],
        };

        let request = http.post(config.url.clone()).json(&body).send();
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(EngineError::Cancelled),
            response = request => response.map_err(|e| classify(e, &endpoint, config.timeout_secs))?,
        };

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(EngineError::Upstream {
                status: status.as_u16(),
                detail: detail.chars().take(200).collect(),
            });
        }

        let timeout_secs = config.timeout_secs;
        let body = response
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|e| classify(e, &endpoint, timeout_secs)));
        futures::pin_mut!(body);
        forward_fragments(body, &cancel, tx).await
    }
}

/// Forward the engine's body to the fragment channel.
///
/// `[DONE]` is the only completion signal: a body that closes without the
/// sentinel is an unfinished run and surfaces as
/// [`EngineError::Disconnected`], never as `Done`.
async fn forward_fragments<S, B>(
    mut body: S,
    cancel: &CancellationToken,
    tx: &mpsc::Sender<EngineSignal>,
) -> Result<(), EngineError>
where
    S: futures::Stream<Item = Result<B, EngineError>> + Unpin,
    B: AsRef<[u8]>,
{
    let mut line_buffer: Vec<u8> = Vec::new();

    loop {
        let chunk = tokio::select! {
            _ = cancel.cancelled() => return Err(EngineError::Cancelled),
            chunk = body.next() => chunk,
        };

        match chunk {
            Some(Ok(chunk)) => {
                line_buffer.extend_from_slice(chunk.as_ref());
                for line in drain_lines(&mut line_buffer) {
                    match parse_sse_line(&line) {
                        SseLine::Fragment(text) => {
                            if tx.send(EngineSignal::Fragment(text)).await.is_err() {
                                // Consumer dropped the run.
                                return Err(EngineError::Cancelled);
                            }
                        }
                        SseLine::Done => {
                            let _ = tx.send(EngineSignal::Done).await;
                            return Ok(());
                        }
                        SseLine::Noise => {}
                    }
                }
            }
            Some(Err(e)) => return Err(e),
            None => return Err(EngineError::Disconnected),
        }
    }
}

fn classify(e: reqwest::Error, endpoint: &str, timeout_secs: u64) -> EngineError {
    if e.is_timeout() {
        EngineError::Timeout {
            seconds: timeout_secs,
        }
    } else {
        EngineError::Http {
            endpoint: endpoint.to_string(),
            source: e,
        }
    }
}

/// Drain every complete line (terminated by `\n`) from the buffer,
/// retaining any trailing partial line.
fn drain_lines(buffer: &mut Vec<u8>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
        let line: Vec<u8> = buffer.drain(..=pos).collect();
        let text = String::from_utf8_lossy(&line[..pos]);
        lines.push(text.trim_end_matches('\r').to_string());
    }
    lines
}

enum SseLine {
    Fragment(String),
    Done,
    Noise,
}

/// Interpret one upstream line: completion sentinel, content delta, or noise.
fn parse_sse_line(line: &str) -> SseLine {
    let Some(data) = line.strip_prefix("data:") else {
        return SseLine::Noise;
    };
    let data = data.trim();
    if data == "[DONE]" {
        return SseLine::Done;
    }
    match serde_json::from_str::<serde_json::Value>(data) {
        Ok(value) => {
            match value["choices"][0]["delta"]["content"].as_str() {
                Some(content) if !content.is_empty() => SseLine::Fragment(content.to_string()),
                // Role-only deltas and finish_reason chunks carry no content.
                _ => SseLine::Noise,
            }
        }
        Err(_) => SseLine::Noise,
    }
}

impl ArbiterEngine for HttpEngine {
    fn start(
        &self,
        context: EvaluationContext,
        cancel: CancellationToken,
    ) -> mpsc::Receiver<EngineSignal> {
        let (tx, rx) = mpsc::channel(FRAGMENT_CHANNEL_CAPACITY);
        let http = self.http.clone();
        let config = self.config.clone();
        tokio::spawn(Self::run(http, config, context, cancel, tx));
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_done_sentinel() {
        assert!(matches!(parse_sse_line("data: [DONE]"), SseLine::Done));
    }

    #[test]
    fn parse_content_delta() {
        let line = r#"data: {"choices":[{"delta":{"content":"{\"decision"}}]}"#;
        match parse_sse_line(line) {
            SseLine::Fragment(text) => assert_eq!(text, "{\"decision"),
            _ => panic!("expected fragment"),
        }
    }

    #[test]
    fn role_only_delta_is_noise() {
        let line = r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#;
        assert!(matches!(parse_sse_line(line), SseLine::Noise));
    }

    #[test]
    fn non_data_lines_are_noise() {
        assert!(matches!(parse_sse_line(": keep-alive"), SseLine::Noise));
        assert!(matches!(parse_sse_line("event: ping"), SseLine::Noise));
        assert!(matches!(parse_sse_line(""), SseLine::Noise));
    }

    #[test]
    fn drain_lines_retains_partial_tail() {
        let mut buffer = b"data: a\r\ndata: b\npartial".to_vec();
        let lines = drain_lines(&mut buffer);
        assert_eq!(lines, vec!["data: a".to_string(), "data: b".to_string()]);
        assert_eq!(buffer, b"partial");
    }

    #[test]
    fn engine_builds_from_mock_config() {
        let config = EngineConfig::local_mock(9200).unwrap();
        assert!(HttpEngine::new(config).is_ok());
    }

    fn body_of(chunks: &[&str]) -> impl futures::Stream<Item = Result<Vec<u8>, EngineError>> + Unpin
    {
        let chunks: Vec<Result<Vec<u8>, EngineError>> =
            chunks.iter().map(|c| Ok(c.as_bytes().to_vec())).collect();
        futures::stream::iter(chunks)
    }

    #[tokio::test]
    async fn sentinel_completes_the_run() {
        let (tx, mut rx) = mpsc::channel(FRAGMENT_CHANNEL_CAPACITY);
        let body = body_of(&[
            "data: {\"choices\":[{\"delta\":{\"content\":\"verdict\"}}]}\n",
            "data: [DONE]\n",
        ]);
        let result = forward_fragments(body, &CancellationToken::new(), &tx).await;
        assert!(result.is_ok());
        assert_eq!(
            rx.recv().await,
            Some(EngineSignal::Fragment("verdict".to_string()))
        );
        assert_eq!(rx.recv().await, Some(EngineSignal::Done));
    }

    #[tokio::test]
    async fn body_eof_without_sentinel_is_a_disconnect() {
        let (tx, mut rx) = mpsc::channel(FRAGMENT_CHANNEL_CAPACITY);
        // Truncated upstream: content arrives but the stream closes before
        // the completion sentinel.
        let body = body_of(&["data: {\"choices\":[{\"delta\":{\"content\":\"partial\"}}]}\n"]);
        let result = forward_fragments(body, &CancellationToken::new(), &tx).await;
        assert!(matches!(result, Err(EngineError::Disconnected)));
        assert_eq!(
            rx.recv().await,
            Some(EngineSignal::Fragment("partial".to_string()))
        );
        // No completion signal was forwarded.
        drop(tx);
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn cancellation_interrupts_the_body() {
        let (tx, _rx) = mpsc::channel(FRAGMENT_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();
        cancel.cancel();
        // A pending (never-yielding) body: cancellation must win the race.
        let body = futures::stream::pending::<Result<Vec<u8>, EngineError>>();
        futures::pin_mut!(body);
        let result = forward_fragments(body, &cancel, &tx).await;
        assert!(matches!(result, Err(EngineError::Cancelled)));
    }
}
