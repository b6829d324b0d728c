//! In-memory transport
//!
//! Canned responses keyed by URL, with a request log. Clones share state, so
//! a test can keep one handle while the shell owns another.

use crate::{FetchResponse, NetError, Response, Transport};
use futures::future::{FutureExt, LocalBoxFuture};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Default)]
struct Entry {
    response: Option<Result<Response, NetError>>,
    delay: Option<Duration>,
}

#[derive(Debug, Default)]
struct State {
    entries: HashMap<String, Entry>,
    requests: Vec<String>,
}

/// Transport answering from a fixed table
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    state: Rc<RefCell<State>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` with status 200 at `url`
    pub fn insert(&self, url: &str, body: impl Into<Vec<u8>>) -> &Self {
        self.respond(url, Ok(Response::ok(body)))
    }

    /// Serve an arbitrary response or error at `url`
    pub fn respond(&self, url: &str, response: Result<Response, NetError>) -> &Self {
        self.state.borrow_mut().entries.entry(url.to_string()).or_default().response = Some(response);
        self
    }

    /// Hold the response for `url` back for `delay`
    pub fn delay(&self, url: &str, delay: Duration) -> &Self {
        self.state.borrow_mut().entries.entry(url.to_string()).or_default().delay = Some(delay);
        self
    }

    /// Every URL requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.state.borrow().requests.clone()
    }

    /// Number of requests made for `url`
    pub fn request_count(&self, url: &str) -> usize {
        self.state.borrow().requests.iter().filter(|u| *u == url).count()
    }
}

impl Transport for MemoryTransport {
    fn fetch(&self, url: &str) -> LocalBoxFuture<'static, Result<FetchResponse, NetError>> {
        let (response, delay) = {
            let mut state = self.state.borrow_mut();
            state.requests.push(url.to_string());
            match state.entries.get(url) {
                Some(entry) => (
                    entry.response.clone().unwrap_or_else(|| Ok(Response::status(404))),
                    entry.delay,
                ),
                None => (Ok(Response::status(404)), None),
            }
        };
        let url = url.to_string();
        async move {
            if let Some(delay) = delay {
                smol::Timer::after(delay).await;
            }
            response.map(|r| FetchResponse::new(&url, r))
        }
        .boxed_local()
    }
}
