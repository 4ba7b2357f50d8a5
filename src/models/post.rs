use std::{
    fmt::{Display, Formatter},
    hash::{Hash, Hasher},
    sync::Arc,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{thread::Thread, LIVE_URL};

/// Display name used when a post carries none.
pub const DEFAULT_NAME: &str = "Anonymous";

/// A single post of a thread, as rendered on the thread page.
///
/// All posts returned by one [`Client::posts`](crate::Client::posts) call share one
/// [`Thread`] through an [`Arc`], so their thread metadata can never disagree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    thread: Arc<Thread>,
    number: u64,
    timestamp: DateTime<Utc>,
    poster: Poster,
    text: String,
    is_original_post: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file: Option<File>,
    #[serde(default)]
    replies: Vec<u64>,
}

impl Post {
    /// Constructs a post without attachment or replies.
    ///
    /// The post counts as the original post when `number` equals the thread number.
    pub fn new(thread: Arc<Thread>, number: u64, timestamp: DateTime<Utc>, text: impl Into<String>) -> Self {
        let is_original_post = number == thread.number();
        Self {
            thread,
            number,
            timestamp,
            poster: Poster::default(),
            text: text.into(),
            is_original_post,
            file: None,
            replies: Vec::new(),
        }
    }

    /// Sets the author.
    #[must_use]
    pub fn with_poster(mut self, poster: Poster) -> Self {
        self.poster = poster;
        self
    }

    /// Sets the attachment.
    #[must_use]
    pub fn with_file(mut self, file: Option<File>) -> Self {
        self.file = file;
        self
    }

    /// Returns the thread this post belongs to.
    pub fn thread(&self) -> &Thread {
        &self.thread
    }

    /// Returns the shared handle to the thread.
    pub fn thread_handle(&self) -> &Arc<Thread> {
        &self.thread
    }

    /// Returns the post number.
    pub fn number(&self) -> u64 {
        self.number
    }

    /// Returns when the post was made.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the author.
    pub fn poster(&self) -> &Poster {
        &self.poster
    }

    /// Returns the post body with line breaks as `\n` and quote markers (`>>123`) intact.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the body with newlines escaped, for single-line output such as CSV.
    pub fn serialized_text(&self) -> String {
        self.text.replace('\n', "\\n")
    }

    /// Returns whether this is the first post of its thread.
    pub fn is_original_post(&self) -> bool {
        self.is_original_post
    }

    /// Returns the attachment, if any.
    pub fn file(&self) -> Option<&File> {
        self.file.as_ref()
    }

    /// Returns the numbers of later posts in the same thread that quote this one,
    /// in posting order.
    pub fn replies(&self) -> &[u64] {
        &self.replies
    }

    pub(crate) fn push_reply(&mut self, number: u64) {
        if !self.replies.contains(&number) {
            self.replies.push(number);
        }
    }

    /// Returns the URL of the post on the live service.
    pub fn url(&self) -> String {
        format!(
            "{LIVE_URL}/{}/thread/{}#p{}",
            self.thread.board(),
            self.thread.number(),
            self.number
        )
    }
}

impl PartialEq for Post {
    fn eq(&self, other: &Self) -> bool {
        self.number == other.number && self.thread == other.thread
    }
}

impl Eq for Post {}

impl Hash for Post {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.thread.hash(state);
        self.number.hash(state);
    }
}

impl Display for Post {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Post({})", self.url())
    }
}

/// The author of a post, as far as the service discloses it.
///
/// Poster ids rotate per thread; equal ids in different threads say nothing about
/// the author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poster {
    /// Display name, `Anonymous` unless the poster set one.
    pub name: String,
    /// Whether the post carries a staff capcode.
    pub is_moderator: bool,
    /// Per-thread poster id, on boards that show them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Country or board flag label, on boards that show them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
}

impl Default for Poster {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            is_moderator: false,
            id: None,
            flag: None,
        }
    }
}

/// A media attachment. Two files are equal when their URLs are.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct File {
    /// Absolute URL of the full-size media.
    pub url: String,
    /// Filename as uploaded.
    pub name: String,
    /// Human readable size, e.g. `137 KB`.
    pub size: String,
    /// Width and height in pixels.
    pub dimensions: (u32, u32),
    /// Whether the thumbnail is hidden behind a spoiler.
    pub is_spoiler: bool,
}

impl PartialEq for File {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for File {}

impl Hash for File {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}
