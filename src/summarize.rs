//! Chunked summarization through an OpenAI-compatible completions API.
//!
//! Long text is cut into chunks of at most `chunk_size` characters and each
//! chunk is sent as one completion request. The trimmed response lines are
//! collected in chunk order.
//!
//! # Architecture
//!
//! - [`CompletionApi`]: one prompt in, one completion out
//! - [`OpenAiCompletions`]: the HTTP implementation
//! - [`RetryCompletion`]: decorator adding exponential backoff with jitter
//! - [`Summarizer`]: chunking and ordered collection on top of any of the above

use crate::error::{CompletionError, SummarizeError};
use crate::utils::truncate_for_log;
use rand::{rng, Rng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// Sampling temperature sent with every request.
pub const TEMPERATURE: f32 = 0.5;
/// Nucleus sampling mass sent with every request.
pub const TOP_P: f32 = 1.0;

/// Something that turns a prompt into completion text.
pub trait CompletionApi {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
    stop: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    text: String,
}

/// Client for `POST {api_base}/completions`.
pub struct OpenAiCompletions {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiCompletions {
    pub fn new(
        client: reqwest::Client,
        api_base: &str,
        api_key: &str,
        model: &str,
        max_tokens: u32,
    ) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            max_tokens,
        }
    }
}

impl fmt::Debug for OpenAiCompletions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiCompletions")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

impl CompletionApi for OpenAiCompletions {
    #[instrument(level = "info", skip_all, fields(model = %self.model, prompt_chars = prompt.chars().count()))]
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let body = CompletionRequest {
            model: &self.model,
            prompt,
            max_tokens: self.max_tokens,
            temperature: TEMPERATURE,
            top_p: TOP_P,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            stop: None,
        };

        let t0 = Instant::now();
        let resp = self
            .client
            .post(format!("{}/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                elapsed_ms = t0.elapsed().as_millis() as u128,
                response_preview = %truncate_for_log(&message, 300),
                "Completion request rejected"
            );
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: CompletionResponse = resp.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or(CompletionError::NoChoices)
    }
}

/// Adds exponential backoff retries to any [`CompletionApi`].
///
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
///
/// With `max_retries == 0` every call goes straight through.
pub struct RetryCompletion<T> {
    inner: T,
    max_retries: usize,
    base_delay: Duration,
    max_delay: Duration,
}

impl<T: CompletionApi> RetryCompletion<T> {
    pub fn new(inner: T, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryCompletion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryCompletion")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T: CompletionApi> CompletionApi for RetryCompletion<T> {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let mut attempt = 0usize;
        loop {
            match self.inner.complete(prompt).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        if self.max_retries > 0 {
                            error!(attempt, max = self.max_retries, error = %e, "complete() exhausted retries");
                        }
                        return Err(e);
                    }

                    let mut delay = self.base_delay.saturating_mul(1 << (attempt - 1).min(16));
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + Duration::from_millis(jitter_ms);

                    warn!(attempt, max = self.max_retries, ?delay, error = %e, "complete() attempt failed; backing off");
                    sleep(delay).await;
                }
            }
        }
    }
}

/// Split `text` into contiguous slices of at most `chunk_size` characters.
///
/// A chunk ends just after the last whitespace inside its window when there
/// is one, so words are not cut; a single word longer than `chunk_size` is
/// split hard. Concatenating the chunks gives back `text` exactly. A
/// `chunk_size` of zero is treated as one.
pub fn chunk_text(text: &str, chunk_size: usize) -> Vec<&str> {
    let chunk_size = chunk_size.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let Some((limit, next)) = rest.char_indices().nth(chunk_size) else {
            chunks.push(rest);
            break;
        };
        let cut = if next.is_whitespace() {
            limit
        } else {
            rest[..limit]
                .char_indices()
                .rev()
                .find(|(_, c)| c.is_whitespace())
                .map(|(i, c)| i + c.len_utf8())
                .unwrap_or(limit)
        };
        let (chunk, tail) = rest.split_at(cut);
        chunks.push(chunk);
        rest = tail;
    }
    chunks
}

/// Trimmed completion text split into lines.
fn completion_lines(text: &str) -> impl Iterator<Item = String> + '_ {
    text.trim().split('\n').map(str::to_string)
}

/// Ordered summary lines and the number of chunks they came from.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub lines: Vec<String>,
    pub chunks: usize,
}

/// Summarizes text chunk by chunk through a [`CompletionApi`].
#[derive(Debug)]
pub struct Summarizer<C> {
    api: C,
    chunk_size: usize,
}

impl<C: CompletionApi> Summarizer<C> {
    pub fn new(api: C, chunk_size: usize) -> Self {
        Self { api, chunk_size }
    }

    /// Summary lines for `text`, in chunk order.
    ///
    /// Stops at the first failed chunk; the error keeps the lines gathered
    /// before it.
    #[instrument(level = "info", skip_all, fields(chars = text.chars().count(), chunk_size = self.chunk_size))]
    pub async fn summarize(&self, text: &str) -> Result<Summary, SummarizeError> {
        let chunks = chunk_text(text, self.chunk_size);
        let total = chunks.len();
        let mut lines = Vec::new();
        info!(chunks = total, "Generating summary");

        for (i, chunk) in chunks.into_iter().enumerate() {
            let t0 = Instant::now();
            match self.api.complete(chunk).await {
                Ok(text) => {
                    lines.extend(completion_lines(&text));
                    info!(
                        chunk = i + 1,
                        of = total,
                        elapsed_ms = t0.elapsed().as_millis() as u128,
                        "Summarized chunk"
                    );
                }
                Err(source) => {
                    error!(chunk = i + 1, of = total, error = %source, "Summarization failed");
                    return Err(SummarizeError {
                        chunk_index: i,
                        total_chunks: total,
                        partial: lines,
                        source,
                    });
                }
            }
        }
        Ok(Summary { lines, chunks: total })
    }
}
