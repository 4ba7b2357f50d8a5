use scraper::{ElementRef, Html, Selector};

use crate::{
    error::Error,
    extract::{first, parse_number, selector, text_of},
    models::thread::Thread,
    result::Result,
};

struct Selectors {
    subject: Selector,
    sticky: Selector,
    closed: Selector,
}

/// Reads the active threads listed on one index page of a board.
///
/// Catalog threads are never archived.
pub(crate) fn threads(board: &str, document: &Html) -> Result<Vec<Result<Thread>>> {
    let thread = selector(".board > .thread")?;
    let selectors = Selectors {
        subject: selector(".op .postInfo .subject")?,
        sticky: selector(".op .stickyIcon")?,
        closed: selector(".op .closedIcon")?,
    };

    let threads: Vec<_> = document
        .select(&thread)
        .map(|element| read_thread(board, element, &selectors))
        .collect();

    if threads.is_empty() {
        return Err(Error::parsing(
            format!("catalog page of /{board}/"),
            "no thread elements",
        ));
    }
    Ok(threads)
}

fn read_thread(board: &str, element: ElementRef<'_>, selectors: &Selectors) -> Result<Thread> {
    let id = element.value().id().unwrap_or_default();
    let number = parse_number(id).ok_or_else(|| {
        Error::parsing(
            format!("catalog thread on /{board}/"),
            format!("thread element has unusable id `{id}`"),
        )
    })?;

    Ok(Thread::new(board, number)
        .with_title(text_of(first(element, &selectors.subject)).as_deref())
        .stickied(first(element, &selectors.sticky).is_some())
        .closed(first(element, &selectors.closed).is_some()))
}
