use std::collections::{HashMap, VecDeque};

use crate::{
    extract::PageKind,
    fetcher::Fetched,
    models::{sanitize_board, thread::Thread},
    paginate::Seen,
    result::Result,
    Client,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Page(u32),
    Done,
}

/// The active threads of one board, read page by page from its index.
///
/// Created by [`Client::threads`]. Pages `1..=max_pages` are fetched in order; a 404
/// means the board has no more pages and ends the run quietly. Threads that move
/// between pages while the run is in progress are only yielded once.
#[derive(Debug)]
pub struct CatalogThreads<'a> {
    client: &'a Client,
    board: String,
    state: State,
    seen: Seen,
    buffered: VecDeque<Thread>,
}

impl<'a> CatalogThreads<'a> {
    pub(crate) fn new(client: &'a Client, board: &str) -> Self {
        let board = sanitize_board(board);
        let state = if client.config().max_pages == 0 {
            State::Done
        } else {
            State::Page(1)
        };
        Self {
            client,
            board,
            state,
            seen: Seen::default(),
            buffered: VecDeque::new(),
        }
    }

    /// Returns the sanitized board name.
    pub fn board(&self) -> &str {
        &self.board
    }

    /// Returns true once no further page will be fetched.
    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// Pulls the next thread, fetching the next page when the current one is used up.
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
            match self.next_page().await? {
                Some(threads) => self.buffered.extend(threads),
                None => return Ok(None),
            }
        }
    }

    /// Drains the sequence.
    ///
    /// # Errors
    ///
    /// See [`CatalogThreads::next`].
    pub async fn collect_all(mut self) -> Result<Vec<Thread>> {
        let mut threads = Vec::new();
        while let Some(thread) = self.next().await? {
            threads.push(thread);
        }
        Ok(threads)
    }

    /// Fetches one page and returns its threads not yielded before, or `None` when
    /// the run is over.
    pub(crate) async fn next_page(&mut self) -> Result<Option<Vec<Thread>>> {
        let State::Page(page) = self.state else {
            return Ok(None);
        };
        // stays done if anything below fails
        self.state = State::Done;

        let url = self.page_url(page);
        log::info!("fetching page {} of /{}/", page, self.board);
        let threads = match self.client.fetch(&url, &HashMap::new()).await? {
            Fetched::Page(body) => self.client.listing(PageKind::Catalog, &self.board, &body)?,
            Fetched::NotFound => {
                log::info!(
                    "page {} of /{}/ does not exist, no further threads will be returned",
                    page,
                    self.board
                );
                return Ok(None);
            }
            Fetched::Absent => Vec::new(),
        };

        if page < self.client.config().max_pages {
            self.state = State::Page(page + 1);
        }
        let threads = self.seen.unseen(threads);
        log::debug!("page {} of /{}/ had {} new thread(s)", page, self.board, threads.len());
        Ok(Some(threads))
    }

    fn page_url(&self, page: u32) -> String {
        let base = self.client.config().boards_base();
        if page > 1 {
            format!("{base}/{}/{page}", self.board)
        } else {
            format!("{base}/{}/", self.board)
        }
    }
}
