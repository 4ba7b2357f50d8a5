use scraper::Html;
use serde::Deserialize;

use crate::{
    error::Error,
    extract::parse_number,
    models::{non_blank, sanitize_board, thread::Thread},
    result::Result,
};

#[derive(Debug, Deserialize)]
struct Results {
    #[serde(default)]
    threads: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(default)]
    board: Option<String>,
    #[serde(default)]
    thread: String,
    #[serde(default)]
    posts: Vec<HitPost>,
}

#[derive(Debug, Deserialize)]
struct HitPost {
    #[serde(default)]
    sub: Option<String>,
}

/// Reads one page of search results.
///
/// The service leaves stickied, closed and archived threads out of its results, so
/// those flags are false here without being read from anywhere.
pub(crate) fn threads(board: &str, body: &str) -> Result<Vec<Result<Thread>>> {
    let results: Results = serde_json::from_str(body)
        .map_err(|e| Error::parsing(format!("search results for /{board}/"), e.to_string()))?;

    Ok(results
        .threads
        .into_iter()
        .map(|hit| read_hit(board, hit))
        .collect())
}

fn read_hit(board: &str, hit: Hit) -> Result<Thread> {
    let context = || format!("search hit on /{board}/");
    let number = parse_number(&hit.thread)
        .ok_or_else(|| Error::parsing(context(), format!("`{}` is not a thread number", hit.thread)))?;
    let op = hit
        .posts
        .first()
        .ok_or_else(|| Error::parsing(context(), format!("thread {number} has no posts")))?;

    let board = hit
        .board
        .as_deref()
        .map(sanitize_board)
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| board.to_string());
    let title = op.sub.as_deref().and_then(decode_entities);

    Ok(Thread::new(board, number).with_title(title.as_deref()))
}

/// Subjects come HTML-escaped.
fn decode_entities(raw: &str) -> Option<String> {
    let fragment = Html::parse_fragment(raw);
    let decoded: String = fragment.root_element().text().collect();
    non_blank(&decoded)
}
