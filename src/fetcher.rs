use std::{collections::HashMap, sync::Arc};

use reqwest::{header::USER_AGENT, StatusCode};

use crate::{error::Error, result::Result, throttle::Throttle, transport::Transport};

/// Outcome of a single page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Fetched {
    /// 2xx, body ready for extraction.
    Page(String),
    /// 404: exhausted pagination, a missing archive or a deleted thread.
    NotFound,
    /// An HTTP failure that was swallowed because HTTP errors are not raised.
    Absent,
}

/// Rate-limited GET with response classification.
pub(crate) struct Fetcher {
    transport: Arc<dyn Transport>,
    throttle: Throttle,
    user_agent: String,
    raise_http_exceptions: bool,
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("throttle", &self.throttle)
            .field("user_agent", &self.user_agent)
            .field("raise_http_exceptions", &self.raise_http_exceptions)
            .finish_non_exhaustive()
    }
}

impl Fetcher {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        throttle: Throttle,
        user_agent: String,
        raise_http_exceptions: bool,
    ) -> Self {
        Self {
            transport,
            throttle,
            user_agent,
            raise_http_exceptions,
        }
    }

    /// Fetches `url` once the throttle allows it.
    ///
    /// `headers` are passed through untouched; a default `User-Agent` is added only
    /// when they do not carry one.
    pub(crate) async fn fetch(&self, url: &str, headers: &HashMap<String, String>) -> Result<Fetched> {
        self.throttle.acquire().await;

        let mut headers = headers.clone();
        if !headers
            .keys()
            .any(|name| name.eq_ignore_ascii_case(USER_AGENT.as_str()))
        {
            headers.insert(USER_AGENT.to_string(), self.user_agent.clone());
        }

        log::info!("request for {} dispatched", url);
        let outcome = match self.transport.get(url, &headers).await {
            Ok(response) => match StatusCode::from_u16(response.status) {
                Ok(status) if status.is_success() => return Ok(Fetched::Page(response.body)),
                Ok(StatusCode::NOT_FOUND) => {
                    log::warn!("received a 404 status from {}", url);
                    return Ok(Fetched::NotFound);
                }
                _ => Error::status(url, response.status),
            },
            Err(e) => Error::transport(url, e),
        };

        if self.raise_http_exceptions {
            Err(outcome)
        } else {
            log::warn!("ignoring failed request: {}", outcome);
            Ok(Fetched::Absent)
        }
    }
}
