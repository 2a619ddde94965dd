//! Search query construction.

/// Appended to every keyword to steer results toward blog-style pages.
pub const QUERY_SUFFIX: &str = " blog post";

/// A search query derived from one keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn for_keyword(keyword: &str) -> Self {
        SearchQuery(format!("{keyword}{QUERY_SUFFIX}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One query per keyword, in input order. Empty keywords are not filtered.
pub fn build_queries(keywords: &[String]) -> Vec<SearchQuery> {
    keywords.iter().map(|k| SearchQuery::for_keyword(k)).collect()
}

/// Search-results URL for `query` against `search_base`.
pub fn search_url(search_base: &str, query: &SearchQuery) -> String {
    format!("{}?q={}", search_base, urlencoding::encode(query.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_query_per_keyword_in_order() {
        let keywords = vec!["solar".to_string(), "Wind Farms".to_string(), String::new()];
        let queries = build_queries(&keywords);
        assert_eq!(queries.len(), 3);
        assert!(queries.iter().all(|q| q.as_str().ends_with(QUERY_SUFFIX)));
        assert_eq!(queries[0].as_str(), "solar blog post");
        assert_eq!(queries[1].as_str(), "Wind Farms blog post");
        assert_eq!(queries[2].as_str(), " blog post");
    }

    #[test]
    fn search_url_encodes_query() {
        let query = SearchQuery::for_keyword("c++ & rust");
        assert_eq!(
            search_url("https://www.google.com/search", &query),
            "https://www.google.com/search?q=c%2B%2B%20%26%20rust%20blog%20post"
        );
    }
}
