//! Gateway abstraction over the XRPC transport.
//!
//! A [`Gateway`] performs one GET per call. The engine only ever sees a JSON
//! value: failures are downgraded to an empty object by [`Gateway::call`], and
//! only the inspectable [`Gateway::fetch`] reports why.

mod cache;
mod http;

pub use cache::ResponseCache;
pub use http::HttpGateway;

use crate::error::Result;
use serde_json::Value;

/// XRPC method identifiers used by the fetch engine
pub mod nsid {
    /// Paginated follower listing
    pub const GET_FOLLOWERS: &str = "app.bsky.graph.getFollowers";
    /// Paginated author feed
    pub const GET_AUTHOR_FEED: &str = "app.bsky.feed.getAuthorFeed";
    /// Batched profile lookup
    pub const GET_PROFILES: &str = "app.bsky.actor.getProfiles";
    /// Batched relationship lookup
    pub const GET_RELATIONSHIPS: &str = "app.bsky.graph.getRelationships";
    /// Post with its reply tree
    pub const GET_POST_THREAD: &str = "app.bsky.feed.getPostThread";
}

/// A single query parameter value
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamValue {
    /// String value
    Str(String),
    /// Integer value
    Int(i64),
    /// Repeated key, one query pair per element
    List(Vec<String>),
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<usize> for ParamValue {
    fn from(value: usize) -> Self {
        ParamValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        ParamValue::List(value)
    }
}

impl From<&[String]> for ParamValue {
    fn from(value: &[String]) -> Self {
        ParamValue::List(value.to_vec())
    }
}

/// Ordered query parameters for one request
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, ParamValue)>);

impl Params {
    /// Empty parameter list
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append
    pub fn with(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.push(name, value);
        self
    }

    /// Append a parameter, replacing any earlier value with the same name
    pub fn push(&mut self, name: &str, value: impl Into<ParamValue>) {
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name.to_string(), value)),
        }
    }

    /// Look up a parameter by name
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Flatten into query pairs, expanding lists into repeated keys
    pub fn query_pairs(&self) -> Vec<(&str, String)> {
        let mut pairs = Vec::with_capacity(self.0.len());
        for (name, value) in &self.0 {
            match value {
                ParamValue::Str(s) => pairs.push((name.as_str(), s.clone())),
                ParamValue::Int(i) => pairs.push((name.as_str(), i.to_string())),
                ParamValue::List(items) => {
                    pairs.extend(items.iter().map(|item| (name.as_str(), item.clone())))
                }
            }
        }
        pairs
    }
}

/// The empty-object sentinel returned in place of a failed response
pub fn empty_body() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Abstraction over the XRPC transport, enabling testability.
///
/// Implementations must be safe to call concurrently: the fan-out executor
/// keeps many `fetch` futures outstanding against one gateway.
#[async_trait::async_trait]
pub trait Gateway: Send + Sync {
    /// Issue one GET for `endpoint` and return the parsed body, or why it failed
    async fn fetch(&self, endpoint: &str, params: &Params) -> Result<Value>;

    /// Issue one GET and return the parsed body, or `{}` on any failure
    ///
    /// Never fails: transport errors, non-success statuses and undecodable
    /// bodies all come back as an empty object, which callers read as "no
    /// data, no cursor".
    async fn call(&self, endpoint: &str, params: &Params) -> Value {
        match self.fetch(endpoint, params).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(
                    endpoint = endpoint,
                    error = %e,
                    code = e.error_code(),
                    "Request failed, treating as empty response"
                );
                empty_body()
            }
        }
    }
}

#[async_trait::async_trait]
impl<G: Gateway + ?Sized> Gateway for std::sync::Arc<G> {
    async fn fetch(&self, endpoint: &str, params: &Params) -> Result<Value> {
        (**self).fetch(endpoint, params).await
    }
}
