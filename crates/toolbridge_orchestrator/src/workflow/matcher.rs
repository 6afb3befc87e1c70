//! Attributing a generated request to one of the candidate tools.

use toolbridge_http::HttpRequestSpec;

/// Name reported when there are no candidates.
pub const UNKNOWN_TOOL: &str = "unknown";

/// Decides which candidate tool a generated request belongs to.
pub trait ToolMatcher: Send + Sync + 'static {
    /// Returns the name of the matched tool.
    fn match_tool(&self, request: &HttpRequestSpec, candidates: &[String]) -> String;
}

/// Matches tool-name keywords against the request URL.
///
/// Name parts split on `_` and longer than three characters are searched
/// for in the lowercased URL. Without a hit, a lone candidate wins, then
/// the first one.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlKeywordMatcher;

impl ToolMatcher for UrlKeywordMatcher {
    fn match_tool(&self, request: &HttpRequestSpec, candidates: &[String]) -> String {
        let Some(first) = candidates.first() else {
            tracing::warn!("no candidate tools to match against");
            return UNKNOWN_TOOL.to_string();
        };

        let url = request.url.to_lowercase();
        for name in candidates {
            let lowered = name.to_lowercase();
            if let Some(part) = lowered
                .split('_')
                .find(|part| part.len() > 3 && url.contains(part))
            {
                tracing::info!(tool = %name, keyword = part, "matched tool by URL keyword");
                return name.clone();
            }
        }

        if candidates.len() == 1 {
            tracing::info!(tool = %first, "single candidate selected");
        } else {
            tracing::warn!(tool = %first, "no keyword match, defaulting to first candidate");
        }
        first.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolbridge_http::HttpMethod;

    fn request(url: &str) -> HttpRequestSpec {
        HttpRequestSpec::new(HttpMethod::Get, url)
    }

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn keyword_in_url_wins() {
        let candidates = names(&["get_stock_quote", "get_weather_forecast"]);
        let matched = UrlKeywordMatcher
            .match_tool(&request("https://api.WEATHER.example.com/v1"), &candidates);
        assert_eq!(matched, "get_weather_forecast");
    }

    #[test]
    fn short_parts_are_ignored() {
        // "get" appears in the URL but is too short to count.
        let candidates = names(&["get_stock_quote", "get_news"]);
        let matched = UrlKeywordMatcher.match_tool(&request("https://example.com/news/get"), &candidates);
        assert_eq!(matched, "get_news");

        let matched = UrlKeywordMatcher.match_tool(&request("https://example.com/get"), &candidates);
        assert_eq!(matched, "get_stock_quote");
    }

    #[test]
    fn single_candidate_is_selected() {
        let matched = UrlKeywordMatcher
            .match_tool(&request("https://www.alphavantage.co/query"), &names(&["get_stock_quote"]));
        assert_eq!(matched, "get_stock_quote");
    }

    #[test]
    fn no_candidates_is_unknown() {
        assert_eq!(UrlKeywordMatcher.match_tool(&request("https://x.io"), &[]), UNKNOWN_TOOL);
    }
}
