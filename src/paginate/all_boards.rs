use std::collections::VecDeque;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{models::thread::Thread, paginate::catalog::CatalogThreads, result::Result, Client};

#[derive(Debug)]
struct Cursor<'a> {
    threads: CatalogThreads<'a>,
    pages: u32,
}

/// Threads of every board, interleaved page by page.
///
/// Created by [`Client::all_threads`]. Each refill picks one of the boards that still
/// has pages at random and fetches exactly one page from it, so no board is drained
/// before the others get a turn.
#[derive(Debug)]
pub struct AllThreads<'a> {
    cursors: Vec<Cursor<'a>>,
    buffered: VecDeque<Thread>,
    rng: StdRng,
}

impl<'a> AllThreads<'a> {
    pub(crate) fn new(client: &'a Client, boards: &[String]) -> Self {
        Self::with_rng(client, boards, StdRng::from_entropy())
    }

    pub(crate) fn with_rng(client: &'a Client, boards: &[String], rng: StdRng) -> Self {
        let cursors = boards
            .iter()
            .map(|board| Cursor {
                threads: CatalogThreads::new(client, board),
                pages: 0,
            })
            .filter(|cursor| !cursor.threads.is_done())
            .collect();
        Self {
            cursors,
            buffered: VecDeque::new(),
            rng,
        }
    }

    /// Returns the boards that still have pages left.
    pub fn remaining_boards(&self) -> Vec<&str> {
        self.cursors.iter().map(|c| c.threads.board()).collect()
    }

    /// Pulls the next thread from whichever board was last picked.
    ///
    /// # Errors
    ///
    /// Returns the first HTTP or parsing failure the raise policies let through from
    /// any board. The sequence ends after an error.
    pub async fn next(&mut self) -> Result<Option<Thread>> {
        loop {
            if let Some(thread) = self.buffered.pop_front() {
                return Ok(Some(thread));
            }
            if self.cursors.is_empty() {
                return Ok(None);
            }

            let index = self.rng.gen_range(0..self.cursors.len());
            let cursor = &mut self.cursors[index];
            let page = match cursor.threads.next_page().await {
                Ok(page) => page,
                Err(e) => {
                    self.cursors.clear();
                    return Err(e);
                }
            };

            if let Some(threads) = page {
                cursor.pages += 1;
                self.buffered.extend(threads);
            }
            if cursor.threads.is_done() {
                log::info!(
                    "/{}/ exhausted after {} page(s)",
                    cursor.threads.board(),
                    cursor.pages
                );
                self.cursors.swap_remove(index);
            }
        }
    }

    /// Drains the sequence.
    ///
    /// # Errors
    ///
    /// See [`AllThreads::next`].
    pub async fn collect_all(mut self) -> Result<Vec<Thread>> {
        let mut threads = Vec::new();
        while let Some(thread) = self.next().await? {
            threads.push(thread);
        }
        Ok(threads)
    }
}
