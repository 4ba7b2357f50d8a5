#![deny(clippy::all, clippy::pedantic)]
#![deny(missing_docs)]
#![allow(clippy::must_use_candidate)]
//! # chanfetch
//!
//! chanfetch is a read-only client for imageboards that have no stable API. It reads
//! the public HTML pages (and the JSON search front end) and turns them into typed
//! [`Thread`]s and [`Post`]s.
//!
//! This library can fetch:
//! - the list of boards
//! - the active threads of a board, or of every board
//! - the archived threads of a board
//! - threads matching a text search
//! - the posts of a thread, with their reply graph
//!
//! While respecting:
//! - a rolling-window rate limit shared by every request of a [`Client`].
//! - configurable raise policies for HTTP and parsing failures.
//!
//! Listings are pulled lazily, one page per refill.
//!
//! ## Example: Printing the opening post of every sticky on a board.
//!
//! ```rust,no_run
//! # type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
//! use chanfetch::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = Client::new();
//!     let mut threads = client.threads("/po/");
//!
//!     while let Some(thread) = threads.next().await? {
//!         if !thread.is_stickied() {
//!             continue;
//!         }
//!         let posts = client.posts(&thread).await?;
//!         if let Some(op) = posts.first() {
//!             println!("{}: {}", op.thread(), op.text());
//!         }
//!     }
//!     Ok(())
//! }
//! ```

/// Client module contains [`Client`] for fetching boards, threads and posts.
pub mod client;

/// Settings a [`Client`] is built from.
pub mod config;

/// Contains [`Error`]s that can be thrown by the libary.
///
/// [`Error`]: crate::error::Error
pub mod error;

pub(crate) mod extract;

pub(crate) mod fetcher;

/// Threads, posts and the values they carry.
pub mod models;

/// Lazy, page-by-page sequences of threads.
pub mod paginate;

pub(crate) mod reconcile;

pub(crate) mod result;

pub(crate) mod throttle;

/// The HTTP seam: implement [`Transport`] to send requests some other way.
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use client::Client;
pub use config::Config;
pub use error::Error;
pub use models::{
    post::{File, Post, Poster},
    sanitize_board,
    thread::Thread,
};
pub use paginate::{
    all_boards::AllThreads,
    catalog::CatalogThreads,
    search::{SearchHeaders, SearchThreads},
};
pub use result::Result;
pub use transport::{RawResponse, ReqwestTransport, Transport};
