use scraper::Html;

use crate::{
    error::Error,
    extract::{selector, text},
    models::{non_blank, sanitize_board},
    result::Result,
};

/// Boards whose pages do not follow the layout the extractors read.
pub(crate) const EXCLUDED_BOARDS: &[&str] = &["f"];

/// Reads board names from the navigation list, in page order.
pub(crate) fn boards(document: &Html) -> Result<Vec<String>> {
    let list = selector(".boardList")?;
    let anchor = selector("a")?;

    let list = document
        .select(&list)
        .next()
        .ok_or_else(|| Error::parsing("board list", "no .boardList element"))?;

    let mut boards = Vec::new();
    for name in list.select(&anchor).filter_map(|a| non_blank(&text(a))) {
        let name = sanitize_board(&name);
        if EXCLUDED_BOARDS.contains(&name.as_str()) {
            log::debug!("excluding /{}/", name);
        } else if !boards.contains(&name) {
            boards.push(name);
        }
    }
    Ok(boards)
}
