//! Browser sessions used to render search result pages.
//!
//! The harvester only needs two things from a browser: navigate somewhere and
//! hand back the rendered page source. [`BrowserSession`] captures that, and
//! [`WebDriverSession`] implements it against any W3C WebDriver server such as
//! chromedriver.
//!
//! Sessions are plain owned values. Whoever opens one is responsible for
//! calling [`BrowserSession::quit`] on every exit path.

use crate::error::BrowserError;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// A single-page browser session.
pub trait BrowserSession {
    /// Load `url` in the session's only window.
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError>;

    /// Rendered markup of the current page.
    async fn page_source(&mut self) -> Result<String, BrowserError>;

    /// End the session. Calling it more than once is a no-op.
    async fn quit(&mut self) -> Result<(), BrowserError>;
}

/// A session on a W3C WebDriver server.
#[derive(Debug)]
pub struct WebDriverSession {
    client: reqwest::Client,
    base_url: String,
    session_id: Option<String>,
}

impl WebDriverSession {
    /// Start a headless Chrome session on the WebDriver server at `base_url`.
    #[instrument(level = "info", skip_all, fields(%base_url))]
    pub async fn start(base_url: &str) -> Result<Self, BrowserError> {
        let client = reqwest::Client::new();
        let base_url = base_url.trim_end_matches('/').to_string();
        let capabilities = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": ["--headless=new", "--disable-gpu"] }
                }
            }
        });

        let t0 = Instant::now();
        let resp = client
            .post(format!("{base_url}/session"))
            .json(&capabilities)
            .send()
            .await?;
        let body = read_value(resp).await?;
        let session_id = body
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or(BrowserError::MalformedResponse("value.sessionId"))?
            .to_string();

        info!(
            %session_id,
            elapsed_ms = t0.elapsed().as_millis() as u128,
            "WebDriver session started"
        );
        Ok(Self {
            client,
            base_url,
            session_id: Some(session_id),
        })
    }

    fn endpoint(&self, suffix: &str) -> Result<String, BrowserError> {
        let id = self
            .session_id
            .as_deref()
            .ok_or(BrowserError::MalformedResponse("session id (session already closed)"))?;
        Ok(format!("{}/session/{}{}", self.base_url, id, suffix))
    }
}

impl BrowserSession for WebDriverSession {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        let resp = self
            .client
            .post(self.endpoint("/url")?)
            .json(&json!({ "url": url }))
            .send()
            .await?;
        read_value(resp).await?;
        debug!("Navigation complete");
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String, BrowserError> {
        let resp = self.client.get(self.endpoint("/source")?).send().await?;
        let value = read_value(resp).await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or(BrowserError::MalformedResponse("value (page source)"))
    }

    #[instrument(level = "info", skip_all)]
    async fn quit(&mut self) -> Result<(), BrowserError> {
        let Some(id) = self.session_id.take() else {
            return Ok(());
        };
        let resp = self
            .client
            .delete(format!("{}/session/{}", self.base_url, id))
            .send()
            .await?;
        match read_value(resp).await {
            Ok(_) => {
                info!(session_id = %id, "WebDriver session closed");
                Ok(())
            }
            Err(e) => {
                warn!(session_id = %id, error = %e, "WebDriver refused to close session");
                Err(e)
            }
        }
    }
}

/// Unwrap the `value` member of a WebDriver response, turning error payloads
/// into [`BrowserError::Api`].
async fn read_value(resp: reqwest::Response) -> Result<Value, BrowserError> {
    let status = resp.status();
    let text = resp.text().await?;
    if !status.is_success() {
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| v["value"]["message"].as_str().map(str::to_string))
            .unwrap_or(text);
        return Err(BrowserError::Api {
            status: status.as_u16(),
            message,
        });
    }
    let mut body: Value = serde_json::from_str(&text)
        .map_err(|_| BrowserError::MalformedResponse("JSON body"))?;
    Ok(body
        .get_mut("value")
        .map(Value::take)
        .unwrap_or(Value::Null))
}
