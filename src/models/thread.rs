use std::{
    fmt::{Display, Formatter},
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};

use crate::models::{non_blank, LIVE_URL};

/// A thread on a board.
///
/// Identity is `(board, number)` only. The title and flags are advisory: they depend on
/// where the thread was discovered and are only authoritative after the thread page
/// itself was fetched (see [`Client::posts`](crate::Client::posts)).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    board: String,
    number: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default)]
    is_stickied: bool,
    #[serde(default)]
    is_closed: bool,
    #[serde(default)]
    is_archived: bool,
}

impl Thread {
    /// Constructs a `Thread` from its identity alone; every flag starts out false.
    pub fn new(board: impl Into<String>, number: u64) -> Self {
        Self {
            board: board.into(),
            number,
            title: None,
            is_stickied: false,
            is_closed: false,
            is_archived: false,
        }
    }

    /// Sets the title. Blank titles are stored as `None`.
    #[must_use]
    pub fn with_title(mut self, title: Option<&str>) -> Self {
        self.title = title.and_then(non_blank);
        self
    }

    /// Sets the stickied flag.
    #[must_use]
    pub fn stickied(mut self, yes: bool) -> Self {
        self.is_stickied = yes;
        self
    }

    /// Sets the closed flag.
    #[must_use]
    pub fn closed(mut self, yes: bool) -> Self {
        self.is_closed = yes;
        self
    }

    /// Sets the archived flag.
    #[must_use]
    pub fn archived(mut self, yes: bool) -> Self {
        self.is_archived = yes;
        self
    }

    /// Returns the board name, without slashes.
    pub fn board(&self) -> &str {
        &self.board
    }

    /// Returns the thread number (the number of its original post).
    pub fn number(&self) -> u64 {
        self.number
    }

    /// Returns the subject, if the thread has one.
    ///
    /// For threads listed by an archive this may be a preview of the post body.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns whether the thread is pinned to the top of the board.
    pub fn is_stickied(&self) -> bool {
        self.is_stickied
    }

    /// Returns whether the thread is closed to replies.
    pub fn is_closed(&self) -> bool {
        self.is_closed
    }

    /// Returns whether the thread has been moved to the archive.
    pub fn is_archived(&self) -> bool {
        self.is_archived
    }

    /// Returns the URL of the thread on the live service.
    pub fn url(&self) -> String {
        format!("{LIVE_URL}/{}/thread/{}", self.board, self.number)
    }
}

impl PartialEq for Thread {
    fn eq(&self, other: &Self) -> bool {
        self.board == other.board && self.number == other.number
    }
}

impl Eq for Thread {}

impl Hash for Thread {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.board.hash(state);
        self.number.hash(state);
    }
}

impl Display for Thread {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Thread({})", self.url())
    }
}
