//! Cursor pagination. Drives one endpoint through its cursor sequence under a
//! termination policy, one request at a time.

use crate::gateway::{Gateway, Params};
use serde_json::Value;
use std::collections::HashSet;

/// When a walk stops asking for more pages
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// Stop once this many items are accumulated; the result is truncated to it
    Bounded(usize),
    /// Stop only when the server returns no cursor
    Exhaustive,
}

impl Termination {
    fn satisfied(&self, accumulated: usize) -> bool {
        match self {
            Termination::Bounded(limit) => accumulated >= *limit,
            Termination::Exhaustive => false,
        }
    }
}

/// One page of a paginated response
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    /// Items from the page's result array
    pub items: Vec<Value>,
    /// Cursor for the next page, `None` when exhausted
    pub cursor: Option<String>,
}

impl Page {
    /// Extract the array under `key` and the `cursor` field
    ///
    /// A missing or non-array `key` yields no items; a missing, non-string or
    /// empty cursor yields `None`. The empty-object failure sentinel therefore
    /// reads as an empty final page.
    pub fn from_body(body: Value, key: &str) -> Self {
        let Value::Object(mut map) = body else {
            return Self::default();
        };

        let items = match map.remove(key) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        let cursor = match map.remove("cursor") {
            Some(Value::String(c)) if !c.is_empty() => Some(c),
            _ => None,
        };

        Self { items, cursor }
    }
}

/// A paginated request template
#[derive(Clone, Debug)]
pub struct PageRequest<'a> {
    /// XRPC method to call
    pub endpoint: &'a str,
    /// Parameters sent with every page (without `limit` and `cursor`)
    pub params: Params,
    /// Items requested per page
    pub page_size: usize,
    /// Stop policy
    pub termination: Termination,
}

/// Outcome of a walk
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Walk {
    /// Accumulated items, in page order
    pub items: Vec<Value>,
    /// Number of requests issued
    pub pages: usize,
}

/// Walk `request` to completion, extracting each page with `extract`
///
/// Requests are strictly sequential. A failed request yields the empty-object
/// sentinel, which `extract` turns into an empty page without a cursor, so the
/// walk ends with whatever it accumulated. A cursor the walk already requested
/// also ends it.
pub async fn walk<G, F>(gateway: &G, request: PageRequest<'_>, extract: F) -> Walk
where
    G: Gateway + ?Sized,
    F: Fn(Value) -> Page,
{
    let PageRequest {
        endpoint,
        mut params,
        page_size,
        termination,
    } = request;

    let page_size = match termination {
        Termination::Bounded(0) => return Walk::default(),
        Termination::Bounded(limit) => page_size.min(limit),
        Termination::Exhaustive => page_size,
    }
    .max(1);
    params.push("limit", page_size);

    let mut outcome = Walk::default();
    let mut seen_cursors = HashSet::new();

    loop {
        let body = gateway.call(endpoint, &params).await;
        outcome.pages += 1;

        let Page { items, cursor } = extract(body);
        tracing::debug!(
            endpoint = endpoint,
            page = outcome.pages,
            items = items.len(),
            has_cursor = cursor.is_some(),
            "Fetched page"
        );
        outcome.items.extend(items);

        if termination.satisfied(outcome.items.len()) {
            break;
        }
        let Some(cursor) = cursor else {
            break;
        };
        if !seen_cursors.insert(cursor.clone()) {
            tracing::warn!(
                endpoint = endpoint,
                cursor = %cursor,
                "Server repeated a cursor, stopping pagination"
            );
            break;
        }
        params.push("cursor", cursor);
    }

    if let Termination::Bounded(limit) = termination {
        outcome.items.truncate(limit);
    }
    outcome
}
