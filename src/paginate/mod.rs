//! Lazy, single-pass thread sequences.
//!
//! Each engine owns its page cursor and seen-set, fetches at most one page per pull
//! and stops for good after the first error it returns. Dropping an engine half way
//! through is always fine.

use std::collections::HashSet;

use crate::models::thread::Thread;

/// Every board at once, see [`AllThreads`](all_boards::AllThreads).
pub mod all_boards;
/// One board's index pages, see [`CatalogThreads`](catalog::CatalogThreads).
pub mod catalog;
/// The search API, see [`SearchThreads`](search::SearchThreads).
pub mod search;

/// Threads already yielded during one run, by identity.
#[derive(Debug, Default)]
pub(crate) struct Seen(HashSet<Thread>);

impl Seen {
    /// Keeps the threads not yielded before, in page order.
    pub(crate) fn unseen(&mut self, threads: Vec<Thread>) -> Vec<Thread> {
        threads
            .into_iter()
            .filter(|thread| {
                let fresh = self.0.insert(thread.clone());
                if !fresh {
                    log::debug!("skipping duplicate {}", thread);
                }
                fresh
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_are_dropped_across_calls() {
        let mut seen = Seen::default();
        let first = seen.unseen(vec![Thread::new("b", 1), Thread::new("b", 2)]);
        let second = seen.unseen(vec![
            Thread::new("b", 2).stickied(true),
            Thread::new("g", 2),
            Thread::new("b", 3),
            Thread::new("b", 3),
        ]);
        assert_eq!(first.len(), 2);
        assert_eq!(second, vec![Thread::new("g", 2), Thread::new("b", 3)]);
    }
}
