use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default base for board, catalog, archive and thread pages.
pub const DEFAULT_BOARDS_URL: &str = "https://boards.4chan.org";

/// Default endpoint of the native search API.
pub const DEFAULT_SEARCH_URL: &str = "https://find.4chan.org/api";

/// The service never renders more than this many index pages for a board.
pub const DEFAULT_MAX_PAGES: u32 = 10;

/// Construction-time options of a [`Client`](crate::Client).
///
/// Every field has a default, so a partial document deserializes cleanly:
///
/// ```rust
/// let config: chanfetch::Config =
///     serde_json::from_str(r#"{ "raise_http_exceptions": false }"#).unwrap();
/// assert!(!config.raise_http_exceptions);
/// assert!(config.raise_parsing_exceptions);
/// assert_eq!(config.max_pages, 10);
/// ```
///
/// There is no logger option: the crate logs through the [`log`] facade, so the
/// logger is whatever the caller installs. Without one, logging is disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Propagate HTTP failures instead of treating the page as absent.
    pub raise_http_exceptions: bool,

    /// Propagate parsing failures instead of skipping the affected item.
    pub raise_parsing_exceptions: bool,

    /// Highest page index (inclusive) fetched by the catalog and search engines.
    pub max_pages: u32,

    /// Calls allowed per rate-limit window.
    pub rate_limit_calls: u32,

    /// Length of the rolling rate-limit window, in milliseconds.
    pub rate_limit_period_ms: u64,

    /// `User-Agent` sent when a request does not carry its own.
    pub user_agent: String,

    /// Base URL for board pages, archives and threads.
    pub boards_url: String,

    /// Search API endpoint.
    pub search_url: String,
}

impl Config {
    pub(crate) fn rate_limit_period(&self) -> Duration {
        Duration::from_millis(self.rate_limit_period_ms)
    }

    pub(crate) fn boards_base(&self) -> &str {
        self.boards_url.trim_end_matches('/')
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            raise_http_exceptions: true,
            raise_parsing_exceptions: true,
            max_pages: DEFAULT_MAX_PAGES,
            rate_limit_calls: 1,
            rate_limit_period_ms: 750,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            boards_url: DEFAULT_BOARDS_URL.to_string(),
            search_url: DEFAULT_SEARCH_URL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_raise_everything() {
        let config = Config::default();
        assert!(config.raise_http_exceptions);
        assert!(config.raise_parsing_exceptions);
        assert_eq!(config.rate_limit_period(), Duration::from_millis(750));
        assert!(config.user_agent.starts_with("chanfetch/"));
    }

    #[test]
    fn trailing_slash_is_ignored() {
        let config = Config {
            boards_url: "http://localhost:8080/".into(),
            ..Config::default()
        };
        assert_eq!(config.boards_base(), "http://localhost:8080");
    }
}
