//! Page fetching and visible-text extraction.
//!
//! A page that cannot be fetched is not an error for the run: the failure is
//! logged with its URL and the page is treated as missing.

use crate::error::FetchError;
use scraper::{Html, Node};
use tracing::{debug, error, instrument, warn};

/// Elements whose text never renders.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Fetch `url` and return its visible text, or `None` if the page could not be
/// retrieved.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn extract_content(client: &reqwest::Client, url: &str) -> Option<String> {
    match fetch_page(client, url).await {
        Ok(html) => {
            let text = visible_text(&Html::parse_document(&html));
            debug!(bytes = text.len(), "Extracted page text");
            Some(text)
        }
        Err(FetchError::Status { status, .. }) => {
            warn!(status, "Page returned a non-success status; skipping");
            None
        }
        Err(e) => {
            error!(error = %e, "An error occurred while extracting content from the URL");
            None
        }
    }
}

async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(resp.text().await?)
}

/// Concatenate every text node of `document` that is not inside a script,
/// style, or similar non-rendered element.
pub fn visible_text(document: &Html) -> String {
    let mut text = String::new();
    for node in document.tree.root().descendants() {
        let Node::Text(t) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| HIDDEN_ELEMENTS.contains(&e.name()))
        });
        if !hidden {
            text.push_str(t);
        }
    }
    text
}

/// Plain text of a markup fragment; text without tags passes through unchanged.
pub fn strip_markup(markup: &str) -> String {
    visible_text(&Html::parse_fragment(markup))
}
