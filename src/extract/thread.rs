use chrono::{DateTime, TimeZone, Utc};
use scraper::{ElementRef, Html, Node, Selector};

use crate::{
    error::Error,
    extract::{absolute_url, first, parse_number, selector, text, text_of},
    models::{
        non_blank,
        post::{File, Poster, DEFAULT_NAME},
        thread::Thread,
    },
    result::Result,
};

const SPOILER_LABEL: &str = "Spoiler Image";

/// Everything a thread page says about its thread, before posts are tied to it.
#[derive(Debug)]
pub(crate) struct ThreadPage {
    pub(crate) thread: Thread,
    pub(crate) posts: Vec<Result<PostDraft>>,
}

/// A post read from the page that does not point at its thread yet.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PostDraft {
    pub(crate) number: u64,
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) poster: Poster,
    pub(crate) text: String,
    pub(crate) file: Option<File>,
}

struct Selectors {
    subject: Selector,
    sticky: Selector,
    closed: Selector,
    archived: Selector,
    name: Selector,
    capcode: Selector,
    uid: Selector,
    uid_hand: Selector,
    flag: Selector,
    date: Selector,
    file_text: Selector,
    anchor: Selector,
    message: Selector,
}

impl Selectors {
    fn new() -> Result<Self> {
        Ok(Self {
            subject: selector(".postInfo .subject")?,
            sticky: selector(".postInfo .stickyIcon")?,
            closed: selector(".postInfo .closedIcon")?,
            archived: selector(".postInfo .archivedIcon")?,
            name: selector(".postInfo .nameBlock .name")?,
            capcode: selector(".postInfo .nameBlock .capcode")?,
            uid: selector(".postInfo .posteruid")?,
            uid_hand: selector(".hand")?,
            flag: selector(".postInfo .flag, .postInfo .bfl")?,
            date: selector(".postInfo .dateTime")?,
            file_text: selector(".fileText")?,
            anchor: selector("a")?,
            message: selector("blockquote.postMessage")?,
        })
    }
}

/// Reads the thread metadata from the original post and every post in page order.
pub(crate) fn page(board: &str, document: &Html) -> Result<ThreadPage> {
    let post = selector("div.post")?;
    let selectors = Selectors::new()?;
    let context = || format!("thread page on /{board}/");

    let elements: Vec<_> = document.select(&post).collect();
    let op = elements
        .iter()
        .find(|element| element.value().classes().any(|class| class == "op"))
        .ok_or_else(|| Error::parsing(context(), "no original post"))?;

    let number = post_number(*op)
        .ok_or_else(|| Error::parsing(context(), "original post has no number"))?;
    let thread = Thread::new(board, number)
        .with_title(text_of(first(*op, &selectors.subject)).as_deref())
        .stickied(first(*op, &selectors.sticky).is_some())
        .closed(first(*op, &selectors.closed).is_some())
        .archived(first(*op, &selectors.archived).is_some());

    let posts = elements
        .iter()
        .map(|element| read_post(board, *element, &selectors))
        .collect();

    Ok(ThreadPage { thread, posts })
}

fn post_number(element: ElementRef<'_>) -> Option<u64> {
    element.value().id().and_then(parse_number)
}

fn read_post(board: &str, element: ElementRef<'_>, selectors: &Selectors) -> Result<PostDraft> {
    let number = post_number(element).ok_or_else(|| {
        Error::parsing(
            format!("post on /{board}/"),
            format!("unusable post id `{}`", element.value().id().unwrap_or_default()),
        )
    })?;
    let context = || format!("post {number} on /{board}/");

    let utc = first(element, &selectors.date)
        .and_then(|date| date.value().attr("data-utc"))
        .ok_or_else(|| Error::parsing(context(), "no timestamp"))?;
    let timestamp = utc
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .ok_or_else(|| Error::parsing(context(), format!("bad timestamp `{utc}`")))?;

    let text = first(element, &selectors.message)
        .map(message_text)
        .ok_or_else(|| Error::parsing(context(), "no message body"))?;

    let file = match first(element, &selectors.file_text) {
        Some(file_text) => Some(
            read_file(file_text, selectors)
                .ok_or_else(|| Error::parsing(context(), "file without link"))?,
        ),
        None => None,
    };

    Ok(PostDraft {
        number,
        timestamp,
        poster: read_poster(element, selectors),
        text,
        file,
    })
}

fn read_poster(element: ElementRef<'_>, selectors: &Selectors) -> Poster {
    let id = first(element, &selectors.uid).and_then(|uid| {
        text_of(first(uid, &selectors.uid_hand)).or_else(|| {
            let raw = text(uid);
            let raw = raw.trim().trim_start_matches('(').trim_end_matches(')');
            non_blank(raw.trim_start_matches("ID:"))
        })
    });

    Poster {
        name: text_of(first(element, &selectors.name))
            .unwrap_or_else(|| DEFAULT_NAME.to_string()),
        is_moderator: first(element, &selectors.capcode).is_some(),
        id,
        flag: first(element, &selectors.flag)
            .and_then(|flag| flag.value().attr("title"))
            .and_then(non_blank),
    }
}

/// Reads `File: <a href=..>name.jpg</a> (137 KB, 1024x768)`.
fn read_file(file_text: ElementRef<'_>, selectors: &Selectors) -> Option<File> {
    let anchor = first(file_text, &selectors.anchor)?;
    let url = absolute_url(anchor.value().attr("href")?);
    let label = text(anchor);

    let details = text(file_text);
    let details: Vec<&str> = details
        .rsplit_once('(')
        .map(|(_, tail)| tail.trim_end().trim_end_matches(')'))
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|detail| !detail.is_empty())
        .collect();

    let is_spoiler = label.trim() == SPOILER_LABEL || details.contains(&SPOILER_LABEL);
    let dimensions = details.iter().find_map(|detail| parse_dimensions(detail));
    let size = details
        .iter()
        .copied()
        .find(|detail| *detail != SPOILER_LABEL && parse_dimensions(detail).is_none())
        .unwrap_or_default();

    // truncated and spoilered names keep the full name in a title attribute
    let name = file_text
        .value()
        .attr("title")
        .or_else(|| anchor.value().attr("title"))
        .and_then(non_blank)
        .or_else(|| non_blank(&label))
        .unwrap_or_default();

    Some(File {
        url,
        name,
        size: size.to_string(),
        dimensions: dimensions.unwrap_or_default(),
        is_spoiler,
    })
}

fn parse_dimensions(detail: &str) -> Option<(u32, u32)> {
    let (width, height) = detail.split_once('x')?;
    Some((width.trim().parse().ok()?, height.trim().parse().ok()?))
}

/// Text of a post body with `<br>` turned into newlines.
fn message_text(message: ElementRef<'_>) -> String {
    let mut out = String::new();
    push_text(message, &mut out);
    out.trim().to_string()
}

fn push_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(e) if e.name() == "br" => out.push('\n'),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    push_text(child, out);
                }
            }
            _ => {}
        }
    }
}
