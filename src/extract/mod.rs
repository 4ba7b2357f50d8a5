//! Page-shape specific extraction of threads and posts.
//!
//! Every fetch origin has its own extractor; [`extract`] dispatches on [`PageKind`].
//! Extractors fail the whole page with [`Error::Parsing`] when its skeleton is missing,
//! and report per-item failures inline so the caller can apply its parsing policy.

use scraper::{ElementRef, Html, Selector};

use crate::{error::Error, models::non_blank, models::thread::Thread, result::Result};

pub(crate) mod archive;
pub(crate) mod boards;
pub(crate) mod catalog;
pub(crate) mod search;
pub(crate) mod thread;

pub(crate) use thread::{PostDraft, ThreadPage};

/// Where a page body came from, which decides how it is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PageKind {
    Boards,
    Catalog,
    Archive,
    Search,
    Thread,
}

impl PageKind {
    fn name(self) -> &'static str {
        match self {
            PageKind::Boards => "board list",
            PageKind::Catalog => "catalog page",
            PageKind::Archive => "archive page",
            PageKind::Search => "search results",
            PageKind::Thread => "thread page",
        }
    }
}

/// Output of an extractor.
#[derive(Debug)]
pub(crate) enum Extracted {
    Boards(Vec<String>),
    Threads(Vec<Result<Thread>>),
    ThreadPage(ThreadPage),
}

impl Extracted {
    pub(crate) fn boards(self) -> Result<Vec<String>> {
        match self {
            Extracted::Boards(boards) => Ok(boards),
            other => Err(other.mismatch("a board list")),
        }
    }

    pub(crate) fn threads(self) -> Result<Vec<Result<Thread>>> {
        match self {
            Extracted::Threads(threads) => Ok(threads),
            other => Err(other.mismatch("a thread listing")),
        }
    }

    pub(crate) fn thread_page(self) -> Result<ThreadPage> {
        match self {
            Extracted::ThreadPage(page) => Ok(page),
            other => Err(other.mismatch("a thread page")),
        }
    }

    fn mismatch(&self, expected: &str) -> Error {
        let found = match self {
            Extracted::Boards(_) => "a board list",
            Extracted::Threads(_) => "a thread listing",
            Extracted::ThreadPage(_) => "a thread page",
        };
        Error::parsing("extractor output", format!("expected {expected}, found {found}"))
    }
}

/// Parses `body` as a page of the given kind. `board` is the sanitized board the page
/// was requested for.
pub(crate) fn extract(kind: PageKind, board: &str, body: &str) -> Result<Extracted> {
    log::debug!("extracting {} of /{}/ ({} bytes)", kind.name(), board, body.len());
    match kind {
        PageKind::Boards => boards::boards(&Html::parse_document(body)).map(Extracted::Boards),
        PageKind::Catalog => {
            catalog::threads(board, &Html::parse_document(body)).map(Extracted::Threads)
        }
        PageKind::Archive => {
            archive::threads(board, &Html::parse_document(body)).map(Extracted::Threads)
        }
        PageKind::Search => search::threads(board, body).map(Extracted::Threads),
        PageKind::Thread => {
            thread::page(board, &Html::parse_document(body)).map(Extracted::ThreadPage)
        }
    }
}

/// Applies the parsing policy to per-item results: either the first failure is
/// returned, or failures are logged and dropped.
pub(crate) fn settle<T>(items: Vec<Result<T>>, raise_parsing_exceptions: bool) -> Result<Vec<T>> {
    let mut settled = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Ok(item) => settled.push(item),
            Err(e) if raise_parsing_exceptions => return Err(e),
            Err(e) => log::warn!("skipping unparsable item: {}", e),
        }
    }
    Ok(settled)
}

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::parsing(format!("selector `{css}`"), format!("{e:?}")))
}

pub(crate) fn first<'a>(element: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    element.select(selector).next()
}

pub(crate) fn text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Trimmed text of an optional element; blank text counts as absent.
pub(crate) fn text_of(element: Option<ElementRef<'_>>) -> Option<String> {
    element.and_then(|element| non_blank(&text(element)))
}

/// Reads a number out of strings such as `t123`, `p123`, `No.123` or `1,234`.
pub(crate) fn parse_number(raw: &str) -> Option<u64> {
    let digits: String = raw
        .trim()
        .trim_start_matches(|c: char| !c.is_ascii_digit())
        .chars()
        .filter(|c| !matches!(c, ',' | '\'' | ' ' | '\u{a0}'))
        .collect();
    digits.parse().ok()
}

/// Completes protocol-relative links such as `//i.4cdn.org/...`.
pub(crate) fn absolute_url(href: &str) -> String {
    if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_tolerate_prefixes_and_separators() {
        assert_eq!(parse_number("t123"), Some(123));
        assert_eq!(parse_number("p388462123"), Some(388_462_123));
        assert_eq!(parse_number(" No.1,234,567 "), Some(1_234_567));
        assert_eq!(parse_number("1\u{a0}234"), Some(1234));
        assert_eq!(parse_number("thread"), None);
        assert_eq!(parse_number("12a"), None);
    }

    #[test]
    fn protocol_relative_urls_get_https() {
        assert_eq!(absolute_url("//i.4cdn.org/a/1.jpg"), "https://i.4cdn.org/a/1.jpg");
        assert_eq!(absolute_url("http://x/1.jpg"), "http://x/1.jpg");
    }

    #[test]
    fn settle_drops_or_raises() {
        let items = || vec![Ok(1), Err(Error::parsing("row", "broken")), Ok(3)];
        assert_eq!(settle(items(), false).unwrap(), vec![1, 3]);
        assert!(settle(items(), true).unwrap_err().is_parsing());
    }

    #[test]
    fn dispatch_checks_output_shape() {
        let extracted = extract(PageKind::Boards, "", r#"<div class="boardList"><a>b</a></div>"#)
            .unwrap();
        assert!(extracted.threads().unwrap_err().is_parsing());
    }
}
