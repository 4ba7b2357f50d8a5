use std::{collections::HashMap, sync::Arc, time::Duration};

use reqwest::Client as ReqwestClient;

use crate::{
    config::Config,
    error::Error,
    extract::{extract, settle, Extracted, PageKind},
    fetcher::{Fetched, Fetcher},
    models::{post::Post, sanitize_board, thread::Thread},
    paginate::{all_boards::AllThreads, catalog::CatalogThreads, search::SearchHeaders, search::SearchThreads},
    reconcile::{assemble, reconcile},
    result::Result,
    throttle::Throttle,
    transport::{ReqwestTransport, Transport},
};

/// Entry point for every request.
///
/// A `Client` owns its rate limiter: every page it or its sequences fetch goes through
/// the same quota. It is meant to be driven by one task at a time; issuing requests
/// from several tasks concurrently keeps working but no longer honours the quota.
#[derive(Debug)]
pub struct Client {
    config: Config,
    fetcher: Fetcher,
}

impl Client {
    /// Constructs a client with the default [`Config`] and a plain `reqwest` transport.
    pub fn new() -> Client {
        Self::with_transport(Config::default(), Arc::new(ReqwestTransport::default()))
    }

    /// Constructs a client with `config`, using a `reqwest` transport with a 30 second
    /// request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialised.
    pub fn with_config(config: Config) -> Result<Client> {
        let http = ReqwestClient::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self::with_transport(config, Arc::new(ReqwestTransport::new(http))))
    }

    /// Constructs a client that sends its requests through `transport`.
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Client {
        let throttle = Throttle::new(config.rate_limit_calls, config.rate_limit_period());
        let fetcher = Fetcher::new(
            transport,
            throttle,
            config.user_agent.clone(),
            config.raise_http_exceptions,
        );
        Client { config, fetcher }
    }

    /// Returns the configuration the client was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetches the names of all boards the service hosts, in the order it lists them.
    ///
    /// Boards whose pages cannot be read by this crate are left out. The list is
    /// fetched anew on every call.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or the parsing fails and the raise policies
    /// let it through.
    pub async fn boards(&self) -> Result<Vec<String>> {
        let url = format!("{}/search", self.config.boards_base());
        log::info!("fetching all boards");

        let boards = match self.fetch(&url, &HashMap::new()).await? {
            Fetched::Page(body) => self
                .tolerate(extract(PageKind::Boards, "", &body).and_then(Extracted::boards))?
                .unwrap_or_default(),
            Fetched::NotFound if self.config.raise_http_exceptions => {
                return Err(Error::status(&url, 404))
            }
            Fetched::NotFound | Fetched::Absent => Vec::new(),
        };

        log::info!("fetched {} board(s)", boards.len());
        Ok(boards)
    }

    /// Returns the active threads of `board`, fetched lazily page by page.
    ///
    /// `board` may carry slashes: `"/b/"`, `"b"` and `"b/"` are the same board.
    pub fn threads(&self, board: &str) -> CatalogThreads<'_> {
        CatalogThreads::new(self, board)
    }

    /// Fetches the board list and returns the active threads of all of them.
    ///
    /// # Errors
    ///
    /// Returns an error if the board list cannot be fetched, see [`Client::boards`].
    pub async fn all_threads(&self) -> Result<AllThreads<'_>> {
        let boards = self.boards().await?;
        Ok(AllThreads::new(self, &boards))
    }

    /// Fetches the archive of `board`.
    ///
    /// Titles of archived threads are excerpts and may be the start of the opening post;
    /// [`Client::posts`] resolves the real one.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive cannot be fetched or parsed and the raise
    /// policies let it through. A board without an archive answers 404, which is an
    /// error only when HTTP errors are raised.
    pub async fn archived_threads(&self, board: &str) -> Result<Vec<Thread>> {
        let board = sanitize_board(board);
        let url = format!("{}/{board}/archive", self.config.boards_base());
        log::info!("fetching the archive of /{}/", board);

        match self.fetch(&url, &HashMap::new()).await? {
            Fetched::Page(body) => self.listing(PageKind::Archive, &board, &body),
            Fetched::NotFound if self.config.raise_http_exceptions => Err(Error::status(&url, 404)),
            Fetched::NotFound | Fetched::Absent => Ok(Vec::new()),
        }
    }

    /// Searches `board` for threads matching `text`, fetched lazily page by page.
    pub fn search(&self, board: &str, text: &str, headers: &SearchHeaders) -> SearchThreads<'_> {
        SearchThreads::new(self, board, text, headers)
    }

    /// Fetches every post of `thread`, in posting order.
    ///
    /// Only the board and number of `thread` are used. The title and flags of the
    /// returned posts' thread come from the thread page itself, whatever `thread`
    /// carried. Replies are linked before the posts are returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for a missing thread, or an HTTP or parsing error,
    /// when the raise policies let it through. Otherwise failures yield an empty list,
    /// never a partial one.
    pub async fn posts(&self, thread: &Thread) -> Result<Vec<Post>> {
        let board = sanitize_board(thread.board());
        let url = format!(
            "{}/{board}/thread/{}/",
            self.config.boards_base(),
            thread.number()
        );
        log::debug!("fetching posts for {}", thread);

        let body = match self.fetch(&url, &HashMap::new()).await? {
            Fetched::Page(body) => body,
            Fetched::NotFound if self.config.raise_http_exceptions => {
                return Err(Error::NotFound {
                    board,
                    number: thread.number(),
                })
            }
            Fetched::NotFound | Fetched::Absent => return Ok(Vec::new()),
        };

        let parsed = extract(PageKind::Thread, &board, &body)
            .and_then(Extracted::thread_page)
            .and_then(|page| Ok((page.thread, page.posts.into_iter().collect::<Result<Vec<_>>>()?)));
        let Some((page_thread, drafts)) = self.tolerate(parsed)? else {
            return Ok(Vec::new());
        };

        let shared = reconcile(thread, page_thread);
        let posts = assemble(&shared, drafts);
        log::debug!("fetched {} post(s) for {}", posts.len(), shared);
        Ok(posts)
    }

    pub(crate) async fn fetch(&self, url: &str, headers: &HashMap<String, String>) -> Result<Fetched> {
        self.fetcher.fetch(url, headers).await
    }

    /// Extracts a thread listing, applying the parsing policy to the page and its items.
    pub(crate) fn listing(&self, kind: PageKind, board: &str, body: &str) -> Result<Vec<Thread>> {
        Ok(self
            .listing_page(kind, board, body)?
            .map(|listing| listing.threads)
            .unwrap_or_default())
    }

    /// Like [`Client::listing`], but tells a tolerated unparsable page (`None`) apart
    /// from a page that parsed, and counts the items that were skipped.
    pub(crate) fn listing_page(&self, kind: PageKind, board: &str, body: &str) -> Result<Option<Listing>> {
        let Some(items) = self.tolerate(extract(kind, board, body).and_then(Extracted::threads))? else {
            return Ok(None);
        };
        let total = items.len();
        let threads = settle(items, self.config.raise_parsing_exceptions)?;
        Ok(Some(Listing {
            skipped: total - threads.len(),
            threads,
        }))
    }

    /// Passes a parsing failure through, or logs it and yields `None`.
    fn tolerate<T>(&self, parsed: Result<T>) -> Result<Option<T>> {
        match parsed {
            Ok(parsed) => Ok(Some(parsed)),
            Err(e) if self.config.raise_parsing_exceptions || !e.is_parsing() => Err(e),
            Err(e) => {
                log::warn!("ignoring unparsable page: {}", e);
                Ok(None)
            }
        }
    }
}

/// Threads read from one listing page.
#[derive(Debug)]
pub(crate) struct Listing {
    pub(crate) threads: Vec<Thread>,
    /// Items dropped because they could not be parsed.
    pub(crate) skipped: usize,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}
