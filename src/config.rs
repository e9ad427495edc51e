//! Configuration types for bsky-fetch

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest `actors` list `app.bsky.actor.getProfiles` accepts per call
pub const GET_PROFILES_MAX_ACTORS: usize = 25;

/// Largest `others` list `app.bsky.graph.getRelationships` accepts per call
pub const GET_RELATIONSHIPS_MAX_OTHERS: usize = 30;

/// Largest page `app.bsky.feed.getAuthorFeed` returns
pub const GET_FEED_REQ_LIMIT: usize = 50;

/// Largest page `app.bsky.graph.getFollowers` returns
pub const GET_FOLLOWERS_REQ_LIMIT: usize = 100;

/// Default cap on simultaneously outstanding requests
pub const MAX_REQUESTS_IN_FLIGHT: usize = 50;

/// Deepest reply tree `app.bsky.feed.getPostThread` will return
pub const MAX_THREAD_DEPTH: usize = 100;

/// HTTP transport settings for [`HttpGateway`](crate::gateway::HttpGateway)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// API host, without the `/xrpc` suffix (default: "https://public.api.bsky.app")
    #[serde(default = "default_api_host")]
    pub api_host: String,

    /// Per-request timeout (default: 30 seconds)
    ///
    /// A request that exceeds it is a transport failure and is downgraded to
    /// an empty result like any other.
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            api_host: default_api_host(),
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// How fan-out chunks are scheduled against the in-flight limit
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scheduling {
    /// Issue up to `wave_size` chunks, wait for all of them, then start the next wave
    #[default]
    Waves,
    /// Keep up to `wave_size` chunks in flight, starting a new one as each finishes
    SlidingWindow,
}

/// Endpoint limits and concurrency settings for the fetch engine
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Handles per `getProfiles` call (default: 25, max: 25)
    #[serde(default = "default_profile_chunk_size")]
    pub profile_chunk_size: usize,

    /// DIDs per `getRelationships` call (default: 30, max: 30)
    #[serde(default = "default_relationship_chunk_size")]
    pub relationship_chunk_size: usize,

    /// Page size for author feeds (default: 50, max: 50)
    #[serde(default = "default_feed_page_size")]
    pub feed_page_size: usize,

    /// Page size for follower listings (default: 100, max: 100)
    #[serde(default = "default_follower_page_size")]
    pub follower_page_size: usize,

    /// Maximum simultaneously outstanding requests during fan-out (default: 50)
    #[serde(default = "default_wave_size")]
    pub wave_size: usize,

    /// Reply depth requested for threads (default: 100, max: 100)
    #[serde(default = "default_thread_depth")]
    pub thread_depth: usize,

    /// Fan-out scheduling mode (default: waves)
    #[serde(default)]
    pub scheduling: Scheduling,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            profile_chunk_size: default_profile_chunk_size(),
            relationship_chunk_size: default_relationship_chunk_size(),
            feed_page_size: default_feed_page_size(),
            follower_page_size: default_follower_page_size(),
            wave_size: default_wave_size(),
            thread_depth: default_thread_depth(),
            scheduling: Scheduling::default(),
        }
    }
}

/// Response cache settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Keep successful response bodies in memory, keyed by request URL (default: true)
    ///
    /// Entries never expire; a cached body is served for the lifetime of the
    /// gateway.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Main configuration for [`BskyClient`](crate::BskyClient)
///
/// Every field has a default, so `Config::default()` talks to the public
/// AppView with the API's own per-call limits.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP transport
    #[serde(default)]
    pub http: HttpConfig,

    /// Endpoint limits and concurrency
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Response cache
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Config {
    /// Check the configuration for values the API or the engine cannot honor
    ///
    /// # Errors
    /// Returns [`Error::Config`] naming the offending key.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.http.api_host).map_err(|e| {
            Error::config("http.api_host", format!("invalid URL {:?}: {e}", self.http.api_host))
        })?;

        self.limits.validate()
    }
}

impl LimitsConfig {
    /// Check every size is non-zero and within the endpoint's cap
    ///
    /// # Errors
    /// Returns [`Error::Config`] naming the offending key.
    pub fn validate(&self) -> Result<()> {
        let bounded = [
            ("limits.profile_chunk_size", self.profile_chunk_size, GET_PROFILES_MAX_ACTORS),
            (
                "limits.relationship_chunk_size",
                self.relationship_chunk_size,
                GET_RELATIONSHIPS_MAX_OTHERS,
            ),
            ("limits.feed_page_size", self.feed_page_size, GET_FEED_REQ_LIMIT),
            ("limits.follower_page_size", self.follower_page_size, GET_FOLLOWERS_REQ_LIMIT),
            ("limits.thread_depth", self.thread_depth, MAX_THREAD_DEPTH),
        ];

        for (key, value, max) in bounded {
            if value == 0 || value > max {
                return Err(Error::config(
                    key,
                    format!("must be between 1 and {max}, got {value}"),
                ));
            }
        }

        if self.wave_size == 0 {
            return Err(Error::config("limits.wave_size", "must be at least 1"));
        }

        Ok(())
    }
}

// Default value functions
fn default_api_host() -> String {
    "https://public.api.bsky.app".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    concat!("bsky-fetch/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_profile_chunk_size() -> usize {
    GET_PROFILES_MAX_ACTORS
}

fn default_relationship_chunk_size() -> usize {
    GET_RELATIONSHIPS_MAX_OTHERS
}

fn default_feed_page_size() -> usize {
    GET_FEED_REQ_LIMIT
}

fn default_follower_page_size() -> usize {
    GET_FOLLOWERS_REQ_LIMIT
}

fn default_wave_size() -> usize {
    MAX_REQUESTS_IN_FLIGHT
}

fn default_thread_depth() -> usize {
    MAX_THREAD_DEPTH
}

fn default_true() -> bool {
    true
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
