use thiserror::Error;

/// Failures surfaced by the fetch, parse and assemble pipeline.
///
/// Whether [`Error::Http`], [`Error::Parsing`] and [`Error::NotFound`] reach the caller
/// is decided by the raise policies in [`Config`](crate::config::Config).
#[derive(Debug, Error)]
pub enum Error {
    /// A non-2xx response other than 404, or a transport failure (`status` is `None`).
    #[error("request to {url} failed: {reason}")]
    Http {
        /// The requested URL.
        url: String,
        /// The HTTP status code, when a response was received.
        status: Option<u16>,
        /// Human readable cause.
        reason: String,
    },

    /// The page was fetched but its structure did not match what the extractor expects.
    #[error("could not parse {context}: {reason}")]
    Parsing {
        /// What was being parsed (page kind, element).
        context: String,
        /// What was missing or malformed.
        reason: String,
    },

    /// The thread does not exist, or it expired from the archive.
    #[error("thread {number} on /{board}/ was not found")]
    NotFound {
        /// Sanitized board name.
        board: String,
        /// Thread number.
        number: u64,
    },

    /// A configured base URL could not be turned into a request URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// The default HTTP client could not be built.
    #[error("{0}")]
    Reqwest(#[from] reqwest::Error),
}

impl Error {
    pub(crate) fn status(url: &str, status: u16) -> Self {
        Error::Http {
            url: url.to_string(),
            status: Some(status),
            reason: format!("unexpected status {status}"),
        }
    }

    pub(crate) fn transport(url: &str, reason: impl ToString) -> Self {
        Error::Http {
            url: url.to_string(),
            status: None,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn parsing(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Parsing {
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// Returns the HTTP status code carried by an [`Error::Http`], if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => *status,
            _ => None,
        }
    }

    /// Returns true for [`Error::Http`].
    pub fn is_http(&self) -> bool {
        matches!(self, Error::Http { .. })
    }

    /// Returns true for [`Error::Parsing`].
    pub fn is_parsing(&self) -> bool {
        matches!(self, Error::Parsing { .. })
    }

    /// Returns true for [`Error::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
