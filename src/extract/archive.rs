use scraper::{ElementRef, Html, Selector};

use crate::{
    error::Error,
    extract::{parse_number, selector, text, text_of},
    models::thread::Thread,
    result::Result,
};

/// Reads the archive listing of a board.
///
/// The listing has no subject column, only an excerpt that holds either the subject or
/// the start of the opening post. It is stored as the title anyway; fetching the thread
/// page replaces it with the real one.
pub(crate) fn threads(board: &str, document: &Html) -> Result<Vec<Result<Thread>>> {
    let table = selector("#arc-list")?;
    let row = selector("tbody tr")?;
    let cell = selector("td")?;

    let table = document.select(&table).next().ok_or_else(|| {
        Error::parsing(format!("archive of /{board}/"), "no #arc-list table")
    })?;

    Ok(table
        .select(&row)
        .map(|row| read_row(board, row, &cell))
        .collect())
}

fn read_row(board: &str, row: ElementRef<'_>, cell: &Selector) -> Result<Thread> {
    let context = || format!("archive row of /{board}/");
    let mut cells = row.select(cell);

    let number = cells
        .next()
        .map(text)
        .ok_or_else(|| Error::parsing(context(), "row has no cells"))?;
    let number = parse_number(&number)
        .ok_or_else(|| Error::parsing(context(), format!("`{}` is not a thread number", number.trim())))?;
    let excerpt = cells
        .next()
        .ok_or_else(|| Error::parsing(context(), "row has no excerpt cell"))?;

    Ok(Thread::new(board, number)
        .with_title(text_of(Some(excerpt)).as_deref())
        .archived(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archive(rows: &str) -> String {
        format!(
            r#"<table id="arc-list" class="flashListing">
                 <thead><tr><th>No.</th><th>Excerpt</th><th></th></tr></thead>
                 <tbody>{rows}</tbody>
               </table>"#
        )
    }

    #[test]
    fn every_row_is_archived_with_excerpt_title() {
        let html = archive(
            r#"<tr><td>570,368</td><td><b>Gundam general</b>: last thread hit bump limit</td><td>[<a href="/po/thread/570368" class="quotelink">View</a>]</td></tr>
               <tr><td>570369</td><td>   </td><td>[<a href="/po/thread/570369">View</a>]</td></tr>"#,
        );
        let threads: Vec<_> = threads("po", &Html::parse_document(&html))
            .unwrap()
            .into_iter()
            .map(Result::unwrap)
            .collect();

        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].number(), 570_368);
        assert_eq!(
            threads[0].title(),
            Some("Gundam general: last thread hit bump limit")
        );
        assert_eq!(threads[1].title(), None);
        assert!(threads.iter().all(Thread::is_archived));
        assert!(threads.iter().all(|t| !t.is_stickied() && !t.is_closed()));
    }

    #[test]
    fn malformed_rows_fail_individually() {
        let html = archive(
            "<tr><td>abc</td><td>x</td></tr><tr><td>5</td></tr><tr><td>6</td><td>ok</td></tr>",
        );
        let threads = threads("po", &Html::parse_document(&html)).unwrap();
        assert!(threads[0].as_ref().unwrap_err().is_parsing());
        assert!(threads[1].as_ref().unwrap_err().is_parsing());
        assert_eq!(threads[2].as_ref().unwrap().number(), 6);
    }

    #[test]
    fn missing_table_is_a_parsing_error() {
        let html = Html::parse_document("<p>This board has no archive</p>");
        assert!(threads("b", &html).unwrap_err().is_parsing());
    }
}
