//! Result-link harvesting from a rendered search results page.
//!
//! The page is loaded once through a [`BrowserSession`]; each organic result
//! container (`div.g`) contributes the `href` of its first anchor. Links are
//! handed out as a lazy stream with a throttle delay between items, so a
//! caller that only takes the first few never waits for the rest.

use crate::browser::BrowserSession;
use crate::error::BrowserError;
use crate::throttle::{Throttle, ThrottlePolicy};
use futures::stream::{self, Stream};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

static RESULT_CONTAINER: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.g").expect("valid result container selector"));
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("valid anchor selector"));

/// Load `search_url` in `session` and stream the result links found there.
///
/// Navigation or page-source failures are logged and produce an empty
/// stream; they never surface as errors.
#[instrument(level = "info", skip_all, fields(%search_url))]
pub async fn harvest_links<S: BrowserSession>(
    session: &mut S,
    search_url: &str,
    policy: &ThrottlePolicy,
) -> impl Stream<Item = String> {
    let links = match load_links(session, search_url).await {
        Ok(links) => {
            info!(count = links.len(), "Harvested result links");
            debug!(urls = ?links, "Result links");
            links
        }
        Err(e) => {
            warn!(error = %e, "Search page could not be loaded; no links harvested");
            Vec::new()
        }
    };

    let throttle = Throttle::new(policy.clone());
    stream::unfold(
        (links.into_iter(), throttle, true),
        |(mut links, mut throttle, first)| async move {
            let link = links.next()?;
            if !first {
                throttle.wait().await;
            }
            Some((link, (links, throttle, false)))
        },
    )
}

async fn load_links<S: BrowserSession>(
    session: &mut S,
    search_url: &str,
) -> Result<Vec<String>, BrowserError> {
    session.navigate(search_url).await?;
    let source = session.page_source().await?;
    Ok(parse_result_links(&source, search_url))
}

/// Extract the first anchor `href` of every result container, in page order.
///
/// Hrefs that do not lead to another web page are dropped: empty or
/// fragment-only hrefs, non-http(s) schemes, and links back to `page_url`
/// itself.
pub fn parse_result_links(html: &str, page_url: &str) -> Vec<String> {
    let base = Url::parse(page_url).ok();
    let document = Html::parse_document(html);

    document
        .select(&RESULT_CONTAINER)
        .filter_map(|container| container.select(&ANCHOR).next())
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(|href| resolve_href(base.as_ref(), href))
        .map(String::from)
        .collect()
}

/// Make `href` absolute and unwrap search-engine redirect links
/// (`/url?q=<target>`). `None` when the result is not a fetchable page.
fn resolve_href(base: Option<&Url>, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let mut resolved = match base {
        Some(base) => base.join(href).ok()?,
        None => Url::parse(href).ok()?,
    };
    if resolved.path() == "/url" {
        let target = resolved
            .query_pairs()
            .find(|(k, _)| k == "q" || k == "url")
            .and_then(|(_, v)| Url::parse(&v).ok());
        resolved = target?;
    }
    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }
    if base.is_some_and(|base| same_page(base, &resolved)) {
        return None;
    }
    Some(resolved)
}

fn same_page(a: &Url, b: &Url) -> bool {
    a[..url::Position::AfterQuery] == b[..url::Position::AfterQuery]
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::time::Duration;

    /// A browser that serves one canned page and remembers where it was sent.
    #[derive(Debug, Default)]
    struct CannedBrowser {
        page: Option<String>,
        visited: Vec<String>,
    }

    impl BrowserSession for CannedBrowser {
        async fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
            self.visited.push(url.to_string());
            match self.page {
                Some(_) => Ok(()),
                None => Err(BrowserError::Api {
                    status: 500,
                    message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
                }),
            }
        }

        async fn page_source(&mut self) -> Result<String, BrowserError> {
            self.page
                .clone()
                .ok_or(BrowserError::MalformedResponse("value (page source)"))
        }

        async fn quit(&mut self) -> Result<(), BrowserError> {
            Ok(())
        }
    }

    const RESULTS_PAGE: &str = r#"
        <html><body>
          <div class="g"><a href="https://one.example/post">One</a><a href="https://ignored.example">x</a></div>
          <div class="g"><span>no link here</span></div>
          <div class="g other"><a href="/url?q=https://two.example/a&amp;sa=U">Two</a></div>
          <div class="not-a-result"><a href="https://three.example">Three</a></div>
          <div class="g"><a href="/relative/path">Four</a></div>
        </body></html>
    "#;

    #[test]
    fn parses_first_anchor_of_each_container() {
        let links = parse_result_links(RESULTS_PAGE, "https://www.google.com/search?q=x");
        assert_eq!(
            links,
            vec![
                "https://one.example/post".to_string(),
                "https://two.example/a".to_string(),
                "https://www.google.com/relative/path".to_string(),
            ]
        );
    }

    #[test]
    fn drops_links_that_are_not_other_pages() {
        let page = r##"
            <div class="g"><a href="#">Top</a></div>
            <div class="g"><a href="">Empty</a></div>
            <div class="g"><a href="javascript:void(0)">Script</a></div>
            <div class="g"><a href="mailto:someone@example.com">Mail</a></div>
            <div class="g"><a href="/search?q=solar%20blog%20post#results">Self</a></div>
            <div class="g"><a href="/url?sa=U">Broken redirect</a></div>
            <div class="g"><a href="https://solar.example/post">Real</a></div>
        "##;
        let links = parse_result_links(page, "https://www.google.com/search?q=solar%20blog%20post");
        assert_eq!(links, vec!["https://solar.example/post".to_string()]);
    }

    #[test]
    fn no_containers_means_no_links() {
        let links = parse_result_links("<html><body><p>nothing</p></body></html>", "https://x.test/");
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn streams_links_lazily() {
        let mut browser = CannedBrowser {
            page: Some(RESULTS_PAGE.to_string()),
            ..Default::default()
        };
        let links: Vec<String> = harvest_links(
            &mut browser,
            "https://www.google.com/search?q=x",
            &ThrottlePolicy::None,
        )
        .await
        .take(2)
        .collect()
        .await;
        assert_eq!(links.len(), 2);
        assert_eq!(browser.visited, vec!["https://www.google.com/search?q=x".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_runs_only_between_taken_links() {
        let policy = ThrottlePolicy::Fixed { delay_ms: 200 };
        let mut browser = CannedBrowser {
            page: Some(RESULTS_PAGE.to_string()),
            ..Default::default()
        };

        let start = tokio::time::Instant::now();
        let all: Vec<String> = harvest_links(&mut browser, "https://www.google.com/search?q=x", &policy)
            .await
            .collect()
            .await;
        let elapsed = start.elapsed();
        assert_eq!(all.len(), 3);
        assert!(elapsed >= Duration::from_millis(400), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(600), "{elapsed:?}");

        let start = tokio::time::Instant::now();
        let first: Vec<String> = harvest_links(&mut browser, "https://www.google.com/search?q=x", &policy)
            .await
            .take(1)
            .collect()
            .await;
        assert_eq!(first.len(), 1);
        assert!(start.elapsed() < Duration::from_millis(200), "{:?}", start.elapsed());
    }

    #[tokio::test]
    async fn empty_page_yields_empty_stream() {
        let mut browser = CannedBrowser {
            page: Some("<html><body></body></html>".to_string()),
            ..Default::default()
        };
        let links: Vec<String> = harvest_links(&mut browser, "https://x.test/", &ThrottlePolicy::None)
            .await
            .collect()
            .await;
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn navigation_failure_yields_empty_stream() {
        let mut browser = CannedBrowser::default();
        let links: Vec<String> = harvest_links(&mut browser, "https://x.test/", &ThrottlePolicy::None)
            .await
            .collect()
            .await;
        assert!(links.is_empty());
    }
}
