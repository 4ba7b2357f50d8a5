//! Canned-response transport for unit tests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;

use crate::{
    config::Config,
    transport::{RawResponse, Transport, TransportError},
    Client,
};

pub(crate) const BASE: &str = "http://chan.test";
pub(crate) const SEARCH: &str = "http://find.test/api";

type Sent = (String, HashMap<String, String>);

#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    routes: HashMap<String, RawResponse>,
    sent: Mutex<Vec<Sent>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_page(mut self, url: &str, body: &str) -> Self {
        self.routes.insert(
            url.to_string(),
            RawResponse {
                status: 200,
                body: body.to_string(),
            },
        );
        self
    }

    pub(crate) fn with_status(mut self, url: &str, status: u16) -> Self {
        self.routes.insert(
            url.to_string(),
            RawResponse {
                status,
                body: String::new(),
            },
        );
        self
    }

    pub(crate) fn merge(mut self, other: MockTransport) -> Self {
        self.routes.extend(other.routes);
        self
    }

    pub(crate) fn requests(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|(url, _)| url).collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<RawResponse, TransportError> {
        self.sent
            .lock()
            .unwrap()
            .push((url.to_string(), headers.clone()));
        self.routes
            .get(url)
            .cloned()
            .ok_or_else(|| format!("connection refused: {url}").into())
    }
}

pub(crate) fn config(raise_http: bool, raise_parsing: bool) -> Config {
    Config {
        raise_http_exceptions: raise_http,
        raise_parsing_exceptions: raise_parsing,
        rate_limit_calls: 1000,
        rate_limit_period_ms: 1,
        boards_url: BASE.to_string(),
        search_url: SEARCH.to_string(),
        ..Config::default()
    }
}

pub(crate) fn client(transport: &Arc<MockTransport>, raise_http: bool, raise_parsing: bool) -> Client {
    Client::with_transport(config(raise_http, raise_parsing), transport.clone())
}

/// Board index page holding one `.thread` per `(number, subject, sticky, closed)`.
pub(crate) fn index_page(threads: &[(u64, &str, bool, bool)]) -> String {
    let mut html = String::from(r#"<html><body><form name="delform"><div class="board">"#);
    for &(number, subject, sticky, closed) in threads {
        let sticky = if sticky {
            r#"<img src="//s.4cdn.org/image/sticky.gif" alt="Sticky" title="Sticky" class="stickyIcon retina">"#
        } else {
            ""
        };
        let closed = if closed {
            r#"<img src="//s.4cdn.org/image/closed.gif" alt="Closed" title="Closed" class="closedIcon retina">"#
        } else {
            ""
        };
        html.push_str(&format!(
            r#"<div class="thread" id="t{number}">
                 <div class="postContainer opContainer" id="pc{number}">
                   <div id="p{number}" class="post op">
                     <div class="postInfo desktop" id="pi{number}">
                       <span class="subject">{subject}</span>
                       <span class="nameBlock"><span class="name">Anonymous</span></span>
                       <span class="dateTime" data-utc="1658892700">07/26/22(Tue)23:31:40</span>
                       <span class="postNum desktop"><a href="thread/{number}#p{number}">No.</a><a href="thread/{number}#q{number}">{number}</a>{sticky}{closed}</span>
                     </div>
                     <blockquote class="postMessage" id="m{number}">op of {number}</blockquote>
                   </div>
                 </div>
               </div><hr>"#
        ));
    }
    html.push_str("</div></form></body></html>");
    html
}
