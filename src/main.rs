//! `keyword_blog` command-line entry point.

use chrono::{Local, Utc};
use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

use keyword_blog::assembler::PostAssembler;
use keyword_blog::browser::{BrowserSession, WebDriverSession};
use keyword_blog::cli::Cli;
use keyword_blog::config::RunConfig;
use keyword_blog::error::PipelineError;
use keyword_blog::outputs::{self, OutputPaths};
use keyword_blog::summarize::{OpenAiCompletions, RetryCompletion, Summarizer};
use keyword_blog::utils::{ensure_parent_writable, parse_keywords, prompt};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        date = %Local::now().format("%Y-%m-%d %H:%M:%S"),
        "keyword_blog starting up"
    );

    // Parse CLI and config
    let args = Cli::parse();
    let mut config = match args.config.as_deref() {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    args.apply_overrides(&mut config);
    config.validate()?;
    debug!(?config, "Effective configuration");

    // ---- Operator input ----
    let raw_keywords = match args.keywords.clone() {
        Some(raw) => raw,
        None => prompt("Enter the keywords for the blog post (separated by commas): ")?,
    };
    let keywords = parse_keywords(&raw_keywords);
    if keywords.is_empty() {
        warn!("No keywords given; the post will be empty");
    }
    let api_key = match args.api_key.clone() {
        Some(key) => key,
        None => prompt("Enter your OpenAI API key: ")?,
    };
    info!(?keywords, num_results = config.num_results, "Generating blog post");

    // Early check: fail on unwritable outputs before spending time searching
    let paths = OutputPaths::from_config(&config, args.report.clone(), args.signals.clone());
    for path in paths.iter() {
        if let Err(e) = ensure_parent_writable(path).await {
            error!(%path, error = %e, "Output location is not writable (fix perms or choose a different path)");
            return Err(e);
        }
    }

    let client = reqwest::Client::builder()
        .user_agent(concat!("keyword_blog/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(PipelineError::Client)?;
    let api = OpenAiCompletions::new(
        client.clone(),
        &config.api_base,
        &api_key,
        &config.model,
        config.max_tokens,
    );
    let summarizer = Summarizer::new(
        RetryCompletion::new(api, config.completion_retries, Duration::from_secs(1)),
        config.chunk_size,
    );

    // ---- Harvest; the browser session is closed as soon as links are fetched ----
    let started_at = Utc::now().to_rfc3339();
    let mut assembler = PostAssembler::new(&client, &config).with_salient_terms(args.signals.is_some());
    let mut session = WebDriverSession::start(&config.webdriver_url)
        .await
        .map_err(PipelineError::from)?;
    let harvest = assembler.harvest(&mut session, &keywords).await;
    if let Err(e) = session.quit().await {
        warn!(error = %e, "Failed to close browser session");
    }

    // ---- Summarize and write ----
    let outcome = assembler.summarize(&summarizer, &harvest).await;
    let result = outputs::write_outcome(config.on_summary_failure, &harvest, outcome, &paths, &started_at).await;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        ok = result.is_ok(),
        "Execution complete"
    );
    result.map_err(Into::into)
}
