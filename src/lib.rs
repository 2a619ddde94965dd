//! # Keyword Blog
//!
//! Turns a list of keywords into a summarized blog post. Each keyword is
//! searched on the web, the top results are scraped, and the collected text
//! is condensed through an OpenAI-compatible completions API. Alongside the
//! post, a trend listing records how often each keyword appeared in the
//! pages gathered for it.
//!
//! ## Usage
//!
//! ```sh
//! chromedriver --port=9515 &
//! keyword_blog -k "solar,wind" --api-key "$OPENAI_API_KEY"
//! ```
//!
//! ## Architecture
//!
//! The run is a strictly sequential pipeline:
//! 1. **Querying**: keyword → `"<keyword> blog post"` → search URL
//! 2. **Harvesting**: result links from the search page, rendered through WebDriver
//! 3. **Fetching**: visible text of each result page over plain HTTP
//! 4. **Counting**: literal keyword occurrences per page
//! 5. **Summarizing**: the whole draft, chunk by chunk
//! 6. **Output**: `blog_post.md` and `keyword_trends.txt`

pub mod assembler;
pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod harvest;
pub mod models;
pub mod outputs;
pub mod query;
pub mod signal;
pub mod summarize;
pub mod throttle;
pub mod trends;
pub mod utils;
