//! Merging thread metadata from different origins and linking replies.

use std::{
    collections::HashMap,
    sync::{Arc, LazyLock},
};

use regex::Regex;

use crate::{
    extract::PostDraft,
    models::{post::Post, thread::Thread},
};

/// Settles the metadata of a thread before any post points at it.
///
/// The thread page is authoritative: whatever the caller's copy carried (an archive
/// excerpt, a stale title, catalog flags) is dropped rather than merged.
pub(crate) fn reconcile(requested: &Thread, page: Thread) -> Arc<Thread> {
    if requested.title() != page.title() {
        log::debug!(
            "title of {} resolved from {:?} to {:?}",
            page,
            requested.title(),
            page.title()
        );
    }
    if requested.number() != page.number() {
        log::warn!("requested {} but the page describes {}", requested, page);
    }
    Arc::new(page)
}

/// Builds posts that all share `thread`, then links their replies.
pub(crate) fn assemble(thread: &Arc<Thread>, drafts: Vec<PostDraft>) -> Vec<Post> {
    let mut posts: Vec<Post> = drafts
        .into_iter()
        .map(|draft| {
            Post::new(Arc::clone(thread), draft.number, draft.timestamp, draft.text)
                .with_poster(draft.poster)
                .with_file(draft.file)
        })
        .collect();
    link_replies(&mut posts);
    posts
}

/// `>>123`, a quote of post 123.
#[allow(clippy::expect_used)]
static QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">>(\d+)").expect("quote pattern is valid"));

/// Numbers quoted with `>>123` in `text`, in order of appearance.
pub(crate) fn quoted_numbers(text: &str) -> Vec<u64> {
    QUOTE
        .captures_iter(text)
        .filter_map(|captures| captures.get(1)?.as_str().parse().ok())
        .collect()
}

/// Records each quote as a reply on the quoted post.
///
/// A single pass in posting order: a quote only resolves against posts that came
/// before the quoting one, so self, forward and foreign references are ignored.
pub(crate) fn link_replies(posts: &mut [Post]) {
    let mut seen: HashMap<u64, usize> = HashMap::with_capacity(posts.len());
    for index in 0..posts.len() {
        let number = posts[index].number();
        for quoted in quoted_numbers(posts[index].text()) {
            if let Some(&target) = seen.get(&quoted) {
                posts[target].push_reply(number);
            }
        }
        seen.entry(number).or_insert(index);
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::models::post::Poster;

    fn draft(number: u64, text: &str) -> PostDraft {
        PostDraft {
            number,
            timestamp: Utc.timestamp_opt(1_658_892_700, 0).unwrap(),
            poster: Poster::default(),
            text: text.to_string(),
            file: None,
        }
    }

    #[test]
    fn quotes_are_found_in_order() {
        assert_eq!(quoted_numbers(">>12\nyes >>3 and >>12"), vec![12, 3, 12]);
        assert!(quoted_numbers(">>>/g/123 >>>/b/").is_empty());
        assert!(quoted_numbers("> greentext").is_empty());
    }

    #[test]
    fn reply_graph_ignores_self_forward_and_unknown() {
        let thread = Arc::new(Thread::new("b", 1));
        let posts = assemble(
            &thread,
            vec![
                draft(1, "op"),
                draft(2, "no quotes >>3"),
                draft(3, ">>1\n>>3\n>>99"),
            ],
        );
        assert_eq!(posts[0].replies(), &[3]);
        assert!(posts[1].replies().is_empty());
        assert!(posts[2].replies().is_empty());
    }

    #[test]
    fn replies_keep_posting_order() {
        let thread = Arc::new(Thread::new("b", 10));
        let posts = assemble(
            &thread,
            vec![
                draft(10, "op"),
                draft(11, ">>10"),
                draft(12, ">>10 >>11 >>10"),
                draft(13, ">>10"),
            ],
        );
        assert_eq!(posts[0].replies(), &[11, 12, 13]);
        assert_eq!(posts[1].replies(), &[12]);
    }

    #[test]
    fn posts_share_one_thread() {
        let thread = reconcile(
            &Thread::new("b", 1).with_title(Some("stale")),
            Thread::new("b", 1).with_title(Some("YLYL thread")),
        );
        let posts = assemble(&thread, vec![draft(1, "op"), draft(2, "reply")]);
        assert!(posts.iter().all(|p| Arc::ptr_eq(p.thread_handle(), &thread)));
        assert!(posts.iter().all(|p| p.thread().title() == Some("YLYL thread")));
        assert!(posts[0].is_original_post());
        assert!(!posts[1].is_original_post());
    }

    #[test]
    fn page_metadata_wins_even_when_absent() {
        let requested = Thread::new("b", 1).with_title(Some("archive excerpt")).stickied(true);
        let thread = reconcile(&requested, Thread::new("b", 1).archived(true));
        assert_eq!(thread.title(), None);
        assert!(!thread.is_stickied());
        assert!(thread.is_archived());
    }
}
