use std::collections::{HashMap, VecDeque};

use reqwest::{
    header::{ACCEPT, USER_AGENT},
    Url,
};

use crate::{
    error::Error,
    extract::PageKind,
    fetcher::Fetched,
    models::{sanitize_board, thread::Thread},
    paginate::Seen,
    result::Result,
    Client,
};

/// Results the search API returns per page.
const PAGE_SIZE: u32 = 10;

/// Headers the search front end wants before it answers.
///
/// The service puts its search API behind bot mitigation; callers supply a browser
/// `User-Agent` and whatever cookies or headers got them through. Nothing here is
/// interpreted, only forwarded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHeaders {
    /// `User-Agent` to send with every search request.
    pub user_agent: String,
    /// Additional headers, typically `Cookie`.
    pub extra: HashMap<String, String>,
}

impl SearchHeaders {
    /// Headers with the given `User-Agent` and nothing else.
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            extra: HashMap::new(),
        }
    }

    /// Adds a pass-through header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    fn to_map(&self) -> HashMap<String, String> {
        let mut headers = self.extra.clone();
        headers.insert(ACCEPT.to_string(), "application/json".to_string());
        headers.insert(USER_AGENT.to_string(), self.user_agent.clone());
        headers
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Page(u32),
    Done,
}

/// Threads matching a text query on one board, from the service's own search.
///
/// Created by [`Client::search`]. Result pages overlap, so threads are deduplicated for
/// the whole run. The run ends at the page cap, on a 404, or on the first page that adds
/// nothing new.
#[derive(Debug)]
pub struct SearchThreads<'a> {
    client: &'a Client,
    board: String,
    query: String,
    headers: HashMap<String, String>,
    state: State,
    seen: Seen,
    buffered: VecDeque<Thread>,
}

impl<'a> SearchThreads<'a> {
    pub(crate) fn new(client: &'a Client, board: &str, text: &str, headers: &SearchHeaders) -> Self {
        let state = if client.config().max_pages == 0 {
            State::Done
        } else {
            State::Page(1)
        };
        Self {
            client,
            board: sanitize_board(board),
            query: text.trim().to_string(),
            headers: headers.to_map(),
            state,
            seen: Seen::default(),
            buffered: VecDeque::new(),
        }
    }

    /// Returns the sanitized board name.
    pub fn board(&self) -> &str {
        &self.board
    }

    /// Returns the trimmed query text.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns true once no further page will be fetched.
    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// Pulls the next matching thread.
    ///
    /// # Errors
    ///
    /// Returns the first HTTP or parsing failure the raise policies let through.
    /// The sequence ends after an error.
    pub async fn next(&mut self) -> Result<Option<Thread>> {
        loop {
            if let Some(thread) = self.buffered.pop_front() {
                return Ok(Some(thread));
            }
            if !self.fetch_page().await? {
                return Ok(None);
            }
        }
    }

    /// Drains the sequence.
    ///
    /// # Errors
    ///
    /// See [`SearchThreads::next`].
    pub async fn collect_all(mut self) -> Result<Vec<Thread>> {
        let mut threads = Vec::new();
        while let Some(thread) = self.next().await? {
            threads.push(thread);
        }
        Ok(threads)
    }

    /// Fetches one page into the buffer. Returns false when the run is over.
    async fn fetch_page(&mut self) -> Result<bool> {
        let State::Page(page) = self.state else {
            return Ok(false);
        };
        self.state = State::Done;

        let url = self.page_url(page)?;
        log::info!("fetching search page {} for {:?} on /{}/", page, self.query, self.board);
        let threads = match self.client.fetch(url.as_str(), &self.headers).await? {
            Fetched::Page(body) => match self.client.listing_page(PageKind::Search, &self.board, &body)? {
                Some(listing) => {
                    let complete = listing.skipped == 0;
                    let threads = self.seen.unseen(listing.threads);
                    // only a fully readable page can prove the results ran out
                    if threads.is_empty() && complete {
                        log::info!("search page {} added no new threads, stopping", page);
                        return Ok(false);
                    }
                    threads
                }
                None => Vec::new(),
            },
            Fetched::NotFound => return Ok(false),
            Fetched::Absent => Vec::new(),
        };

        if page < self.client.config().max_pages {
            self.state = State::Page(page + 1);
        }
        self.buffered.extend(threads);
        Ok(true)
    }

    fn page_url(&self, page: u32) -> Result<Url> {
        let offset = (page - 1) * PAGE_SIZE;
        Url::parse_with_params(
            &self.client.config().search_url,
            &[
                ("o", offset.to_string()),
                ("q", self.query.clone()),
                ("b", self.board.clone()),
            ],
        )
        .map_err(|e| Error::InvalidUrl(format!("{}: {e}", self.client.config().search_url)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{client, MockTransport, SEARCH};

    fn url(offset: u32) -> String {
        format!("{SEARCH}?o={offset}&q=rust+lang&b=g")
    }

    fn hits(numbers: &[u64]) -> String {
        let hits: Vec<String> = numbers
            .iter()
            .map(|n| format!(r#"{{"board":"g","thread":"t{n}","posts":[{{"no":{n},"sub":"thread {n}"}}]}}"#))
            .collect();
        format!(r#"{{"threads":[{}]}}"#, hits.join(","))
    }

    fn headers() -> SearchHeaders {
        SearchHeaders::new("Mozilla/5.0").header("Cookie", "cf_clearance=abc")
    }

    #[tokio::test]
    async fn pages_by_offset_and_deduplicates() {
        let transport = Arc::new(
            MockTransport::new()
                .with_page(&url(0), &hits(&[1, 2, 3]))
                .with_page(&url(10), &hits(&[3, 4]))
                .with_page(&url(20), &hits(&[4])),
        );
        let client = client(&transport, true, true);
        let threads = client
            .search("/g/", "  rust lang ", &headers())
            .collect_all()
            .await
            .unwrap();

        assert_eq!(threads.iter().map(Thread::number).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert_eq!(threads[3].title(), Some("thread 4"));
        assert_eq!(transport.urls(), vec![url(0), url(10), url(20)]);
    }

    #[tokio::test]
    async fn forwards_caller_headers() {
        let transport = Arc::new(MockTransport::new().with_page(&url(0), &hits(&[])));
        let client = client(&transport, true, true);
        client.search("g", "rust lang", &headers()).collect_all().await.unwrap();

        let (_, sent) = &transport.requests()[0];
        assert_eq!(sent.get("user-agent").map(String::as_str), Some("Mozilla/5.0"));
        assert_eq!(sent.get("Cookie").map(String::as_str), Some("cf_clearance=abc"));
        assert_eq!(sent.get("accept").map(String::as_str), Some("application/json"));
    }

    #[tokio::test]
    async fn respects_the_page_cap() {
        let mut transport = MockTransport::new();
        for page in 0..12 {
            transport = transport.with_page(&url(page * 10), &hits(&[u64::from(page)]));
        }
        let transport = Arc::new(transport);
        let client = client(&transport, true, true);

        let threads = client.search("g", "rust lang", &headers()).collect_all().await.unwrap();
        assert_eq!(threads.len(), 10);
        assert_eq!(transport.urls().len(), 10);
    }

    #[tokio::test]
    async fn blocked_request_raises_or_ends_quietly() {
        let transport = Arc::new(MockTransport::new().with_status(&url(0), 403));

        let strict = client(&transport, true, true);
        let err = strict.search("g", "rust lang", &headers()).collect_all().await.unwrap_err();
        assert_eq!(err.http_status(), Some(403));

        let lenient = client(&transport, false, true);
        assert!(lenient
            .search("g", "rust lang", &headers())
            .collect_all()
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn unreadable_page_is_skipped_when_lenient() {
        let transport = Arc::new(
            MockTransport::new()
                .with_page(&url(0), &hits(&[1]))
                .with_page(&url(10), "<html>Just a moment...</html>")
                .with_page(&url(20), &hits(&[2]))
                .with_page(&url(30), &hits(&[])),
        );
        let client = client(&transport, true, false);

        let threads = client.search("g", "rust lang", &headers()).collect_all().await.unwrap();
        assert_eq!(threads.iter().map(Thread::number).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(transport.urls(), vec![url(0), url(10), url(20), url(30)]);
    }

    #[tokio::test]
    async fn page_of_broken_hits_does_not_end_the_run() {
        let transport = Arc::new(
            MockTransport::new()
                .with_page(&url(0), r#"{"threads":[{"board":"g","thread":"oops","posts":[]}]}"#)
                .with_page(&url(10), &hits(&[7]))
                .with_page(&url(20), &hits(&[7])),
        );
        let client = client(&transport, true, false);

        let threads = client.search("g", "rust lang", &headers()).collect_all().await.unwrap();
        assert_eq!(threads.iter().map(Thread::number).collect::<Vec<_>>(), vec![7]);
        assert_eq!(transport.urls().len(), 3);
    }

    #[tokio::test]
    async fn challenge_page_is_a_parsing_error() {
        let transport = Arc::new(MockTransport::new().with_page(&url(0), "<html>Just a moment...</html>"));
        let client = client(&transport, true, true);
        let err = client.search("g", "rust lang", &headers()).collect_all().await.unwrap_err();
        assert!(err.is_parsing());
    }
}
