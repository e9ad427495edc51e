//! Production [`Gateway`] over reqwest.

use super::{Gateway, Params, ResponseCache};
use crate::config::{Config, HttpConfig};
use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

/// Longest response body kept in an [`Error::Http`]
const MAX_ERROR_BODY_CHARS: usize = 512;

/// XRPC gateway backed by a pooled `reqwest::Client`
///
/// Cloning is cheap and clones share the connection pool and response cache.
#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: reqwest::Client,
    /// `<api_host>/xrpc/`, endpoints are joined onto it
    base: Url,
    cache: Option<ResponseCache>,
}

impl HttpGateway {
    /// Create a gateway from transport settings and an optional cache
    ///
    /// # Errors
    /// Returns error if the API host is not a valid URL or the HTTP client
    /// cannot be built
    pub fn new(config: &HttpConfig, cache: Option<ResponseCache>) -> Result<Self> {
        let base = Url::parse(&format!("{}/xrpc/", config.api_host.trim_end_matches('/')))?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| Error::Config {
                message: format!("failed to create HTTP client: {e}"),
                key: Some("http".to_string()),
            })?;

        Ok(Self {
            client,
            base,
            cache,
        })
    }

    /// Create a gateway from a full [`Config`], enabling the cache if configured
    ///
    /// # Errors
    /// Same as [`HttpGateway::new`]
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = config.cache.enabled.then(ResponseCache::new);
        Self::new(&config.http, cache)
    }

    /// The response cache, when enabled
    pub fn cache(&self) -> Option<&ResponseCache> {
        self.cache.as_ref()
    }

    /// Build the full request URL for `endpoint` with `params` as the query
    ///
    /// # Errors
    /// Returns error if `endpoint` cannot be joined onto the base URL
    pub fn url(&self, endpoint: &str, params: &Params) -> Result<Url> {
        let mut url = self.base.join(endpoint)?;
        let pairs = params.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }
}

#[async_trait::async_trait]
impl Gateway for HttpGateway {
    async fn fetch(&self, endpoint: &str, params: &Params) -> Result<Value> {
        let url = self.url(endpoint, params)?;

        if let Some(cache) = &self.cache
            && let Some(body) = cache.get(url.as_str()).await
        {
            tracing::debug!(url = %url, "Serving response from cache");
            return Ok(body);
        }

        tracing::debug!(url = %url, "GET");
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                url: url.to_string(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let bytes = response.bytes().await?;
        let body = parse_body(&bytes)?;

        if let Some(cache) = &self.cache {
            cache.insert(url.to_string(), body.clone()).await;
        }

        Ok(body)
    }
}

/// Decode a response body without serde_json's nesting limit
///
/// Reply trees nest two JSON levels per thread level, so a depth-100 thread
/// exceeds the default limit of 128.
fn parse_body(bytes: &[u8]) -> Result<Value> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    deserializer.disable_recursion_limit();
    let value = Value::deserialize(&mut deserializer)?;
    deserializer.end()?;
    Ok(value)
}
