//! Orchestration of a full run.
//!
//! For every keyword, in input order:
//!
//! 1. **BuildingQuery**: keyword → query → search URL
//! 2. **Harvesting**: result links from the rendered search page
//! 3. **Fetching**: visible text of each link, up to `num_results` links
//! 4. **Accumulating**: append the text to the draft, update the trend map
//!
//! Then, once for the whole draft:
//!
//! 5. **Stripping**: remove any markup left in the draft
//! 6. **Summarizing**: chunked completion requests
//! 7. **Done**
//!
//! Fetch failures only drop the affected link. A summarization failure ends
//! the run, carrying whatever lines were produced before it.

use crate::browser::BrowserSession;
use crate::config::RunConfig;
use crate::error::SummarizeError;
use crate::fetch::{extract_content, strip_markup};
use crate::harvest::harvest_links;
use crate::models::{BlogDraft, BlogPost, KeywordRun};
use crate::query::{build_queries, search_url};
use crate::signal::{salient_terms, SIGNAL_THRESHOLD};
use crate::summarize::{CompletionApi, Summarizer};
use crate::trends::TrendMap;
use futures::StreamExt;
use std::fmt;
use std::pin::pin;
use tracing::{debug, info, instrument};

/// Where the assembler is in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    BuildingQuery,
    Harvesting,
    Fetching,
    Accumulating,
    Stripping,
    Summarizing,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::BuildingQuery => "building_query",
            Stage::Harvesting => "harvesting",
            Stage::Fetching => "fetching",
            Stage::Accumulating => "accumulating",
            Stage::Stripping => "stripping",
            Stage::Summarizing => "summarizing",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Everything gathered before summarization.
#[derive(Debug, Default)]
pub struct Harvest {
    pub draft: BlogDraft,
    pub trends: TrendMap,
    pub runs: Vec<KeywordRun>,
}

/// Drives the stages of one run.
#[derive(Debug)]
pub struct PostAssembler<'a> {
    client: &'a reqwest::Client,
    config: &'a RunConfig,
    collect_salient_terms: bool,
    stage: Stage,
}

impl<'a> PostAssembler<'a> {
    pub fn new(client: &'a reqwest::Client, config: &'a RunConfig) -> Self {
        Self {
            client,
            config,
            collect_salient_terms: false,
            stage: Stage::BuildingQuery,
        }
    }

    /// Also record content-derived salient terms per keyword.
    pub fn with_salient_terms(mut self, enabled: bool) -> Self {
        self.collect_salient_terms = enabled;
        self
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn enter(&mut self, stage: Stage) {
        debug!(from = %self.stage, to = %stage, "Stage transition");
        self.stage = stage;
    }

    /// Search, fetch and count for every keyword. Never fails; pages that
    /// cannot be fetched are skipped.
    #[instrument(level = "info", skip_all, fields(keywords = keywords.len(), num_results = self.config.num_results))]
    pub async fn harvest<S: BrowserSession>(&mut self, session: &mut S, keywords: &[String]) -> Harvest {
        let config = self.config;
        let mut harvest = Harvest::default();

        self.enter(Stage::BuildingQuery);
        let queries = build_queries(keywords);

        for (keyword, query) in keywords.iter().zip(queries) {
            self.enter(Stage::BuildingQuery);
            harvest.draft.push_header(keyword);
            let url = search_url(&config.search_base, &query);
            let mut run = KeywordRun {
                keyword: keyword.clone(),
                query: query.as_str().to_string(),
                search_url: url.clone(),
                links: Vec::new(),
                fetched: Vec::new(),
                salient_terms: Vec::new(),
            };

            self.enter(Stage::Harvesting);
            let links = harvest_links(session, &url, &config.throttle).await;
            let mut links = pin!(links.take(config.num_results));

            while let Some(link) = links.next().await {
                run.links.push(link.clone());

                self.enter(Stage::Fetching);
                let Some(content) = extract_content(self.client, &link).await else {
                    continue;
                };

                self.enter(Stage::Accumulating);
                harvest.draft.push_content(&content);
                let total = harvest.trends.accumulate(keyword, &content);
                debug!(%keyword, %link, total, "Accumulated page");
                if self.collect_salient_terms {
                    for term in salient_terms(&content, SIGNAL_THRESHOLD) {
                        if !run.salient_terms.contains(&term) {
                            run.salient_terms.push(term);
                        }
                    }
                }
                run.fetched.push(link);
            }

            info!(
                %keyword,
                links = run.links.len(),
                fetched = run.fetched.len(),
                occurrences = harvest.trends.get(keyword).unwrap_or(0),
                "Keyword complete"
            );
            harvest.runs.push(run);
        }
        harvest
    }

    /// Strip markup from the harvested draft and summarize it.
    #[instrument(level = "info", skip_all, fields(draft_bytes = harvest.draft.len()))]
    pub async fn summarize<C: CompletionApi>(
        &mut self,
        summarizer: &Summarizer<C>,
        harvest: &Harvest,
    ) -> Result<BlogPost, SummarizeError> {
        self.enter(Stage::Stripping);
        let cleaned = strip_markup(harvest.draft.as_str());

        self.enter(Stage::Summarizing);
        let summary = summarizer.summarize(&cleaned).await?;

        self.enter(Stage::Done);
        Ok(BlogPost {
            summary: summary.lines.join("\n"),
            trends: harvest.trends.clone(),
            lines: summary.lines.len(),
            chunks: summary.chunks,
        })
    }
}
