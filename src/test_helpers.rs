//! Shared test helpers: JSON fixtures and an instrumented mock gateway.

use crate::error::Result;
use crate::gateway::{Gateway, Params, empty_body};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// A `profileViewDetailed` with every optional field present
pub(crate) fn profile_json(did: &str, handle: &str) -> Value {
    json!({
        "did": did,
        "handle": handle,
        "displayName": format!("{handle} (display)"),
        "createdAt": "2023-04-12T09:30:00.000Z",
        "description": "bio",
        "followersCount": 10,
        "followsCount": 5,
    })
}

/// A `postView` authored by `handle`
pub(crate) fn post_json(uri: &str, handle: &str) -> Value {
    json!({
        "uri": uri,
        "cid": "bafyreib",
        "author": { "did": format!("did:plc:{handle}"), "handle": handle },
        "record": {
            "$type": "app.bsky.feed.post",
            "createdAt": "2024-05-01T12:00:00.000Z",
            "text": format!("post {uri}"),
        },
        "replyCount": 1,
        "repostCount": 2,
        "likeCount": 3,
        "quoteCount": 0,
        "indexedAt": "2024-05-01T12:00:01.000Z",
    })
}

/// A `feedViewPost` without a reason
pub(crate) fn feed_post_json(uri: &str) -> Value {
    json!({ "post": post_json(uri, "author.test") })
}

/// A `feedViewPost` reposted by `by`
pub(crate) fn feed_repost_json(uri: &str, by: &str) -> Value {
    json!({
        "post": post_json(uri, "author.test"),
        "reason": {
            "$type": "app.bsky.feed.defs#reasonRepost",
            "by": { "did": format!("did:plc:{by}"), "handle": by },
            "indexedAt": "2024-05-02T08:00:00.000Z",
        },
    })
}

type Handler = Box<dyn Fn(&str, &Params) -> Result<Value> + Send + Sync>;

/// Gateway answering from a closure while recording every call and the peak
/// number of concurrently outstanding requests
pub(crate) struct MockGateway {
    handler: Handler,
    delay: Duration,
    calls: Mutex<Vec<(String, Params)>>,
    starts: Mutex<Vec<usize>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl MockGateway {
    pub(crate) fn new(
        handler: impl Fn(&str, &Params) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            starts: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Answer successive calls with `pages` in order, then with `{}`
    pub(crate) fn with_pages(pages: Vec<Value>) -> Self {
        let pages = Mutex::new(VecDeque::from(pages));
        Self::new(move |_, _| Ok(pages.lock().unwrap().pop_front().unwrap_or_else(empty_body)))
    }

    /// Hold each request open for `delay` so concurrent calls overlap
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn calls(&self) -> Vec<(String, Params)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// For each call in start order, how many others were outstanding when it began
    pub(crate) fn in_flight_at_start(&self) -> Vec<usize> {
        self.starts.lock().unwrap().clone()
    }

    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Gateway for MockGateway {
    async fn fetch(&self, endpoint: &str, params: &Params) -> Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((endpoint.to_string(), params.clone()));

        let before = self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.starts.lock().unwrap().push(before);
        self.peak.fetch_max(before + 1, Ordering::SeqCst);

        if self.delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.delay).await;
        }

        let result = (self.handler)(endpoint, params);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// The string list passed as `name`, or empty
pub(crate) fn list_param(params: &Params, name: &str) -> Vec<String> {
    match params.get(name) {
        Some(crate::gateway::ParamValue::List(items)) => items.clone(),
        _ => Vec::new(),
    }
}

/// The string passed as `name`, if any
pub(crate) fn str_param(params: &Params, name: &str) -> Option<String> {
    match params.get(name) {
        Some(crate::gateway::ParamValue::Str(s)) => Some(s.clone()),
        _ => None,
    }
}
