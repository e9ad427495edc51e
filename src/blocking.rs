//! Synchronous facade over [`crate::BskyClient`].
//!
//! Each client owns a current-thread runtime and blocks on it for every call.
//! Do not use it from inside an async context; the runtime refuses to nest.

use crate::config::{Config, LimitsConfig};
use crate::error::Result;
use crate::fanout::BatchReport;
use crate::gateway::{Gateway, HttpGateway, Params};
use crate::relationships::RelationshipEntry;
use crate::types::{FeedEntry, FollowerNetwork, Profile, Relationships, Thread};
use serde_json::Value;
use tokio::runtime::{Builder, Runtime};

/// Blocking read-only client for the public Bluesky API
#[derive(Debug)]
pub struct BskyClient<G = HttpGateway> {
    runtime: Runtime,
    inner: crate::BskyClient<G>,
}

impl BskyClient<HttpGateway> {
    /// Create a client talking HTTP to the configured API host
    ///
    /// # Errors
    /// Returns error if the configuration is invalid, or the HTTP client or
    /// runtime cannot be built
    pub fn new(config: Config) -> Result<Self> {
        let inner = crate::BskyClient::new(config)?;
        Ok(Self {
            runtime: runtime()?,
            inner,
        })
    }
}

impl<G: Gateway> BskyClient<G> {
    /// Create a client over any gateway
    ///
    /// # Errors
    /// Returns error if the runtime cannot be built
    pub fn with_gateway(gateway: G, limits: LimitsConfig) -> Result<Self> {
        Ok(Self {
            runtime: runtime()?,
            inner: crate::BskyClient::with_gateway(gateway, limits),
        })
    }

    /// The async client this facade drives
    pub fn inner(&self) -> &crate::BskyClient<G> {
        &self.inner
    }

    /// One raw request; `{}` on any failure
    pub fn call(&self, endpoint: &str, params: &Params) -> Value {
        self.runtime
            .block_on(self.inner.gateway().call(endpoint, params))
    }

    /// See [`crate::BskyClient::profiles_report`]
    pub fn profiles_report<I, S>(&self, actors: I) -> BatchReport<Profile>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.runtime.block_on(self.inner.profiles_report(actors))
    }

    /// See [`crate::BskyClient::profiles`]
    pub fn profiles<I, S>(&self, actors: I) -> Vec<Profile>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.runtime.block_on(self.inner.profiles(actors))
    }

    /// See [`crate::BskyClient::profile`]
    pub fn profile(&self, actor: &str) -> Option<Profile> {
        self.runtime.block_on(self.inner.profile(actor))
    }

    /// See [`crate::BskyClient::feed`]
    pub fn feed(&self, actor: &str, limit: usize) -> Vec<FeedEntry> {
        self.runtime.block_on(self.inner.feed(actor, limit))
    }

    /// See [`crate::BskyClient::thread`]
    pub fn thread(&self, uri: &str) -> Option<Thread> {
        self.runtime.block_on(self.inner.thread(uri))
    }

    /// See [`crate::BskyClient::follower_handles`]
    pub fn follower_handles(&self, actor: &str) -> Vec<String> {
        self.runtime.block_on(self.inner.follower_handles(actor))
    }

    /// See [`crate::BskyClient::followers`]
    pub fn followers(&self, actor: &str) -> Vec<Profile> {
        self.runtime.block_on(self.inner.followers(actor))
    }

    /// See [`crate::BskyClient::relationships_report`]
    pub fn relationships_report<I, S>(
        &self,
        actor: &str,
        others: I,
    ) -> BatchReport<RelationshipEntry>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.runtime
            .block_on(self.inner.relationships_report(actor, others))
    }

    /// See [`crate::BskyClient::relationships`]
    pub fn relationships<I, S>(&self, actor: &str, others: I) -> Relationships
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.runtime.block_on(self.inner.relationships(actor, others))
    }

    /// See [`crate::BskyClient::follower_network`]
    pub fn follower_network(&self, actor: &str) -> Option<FollowerNetwork> {
        self.runtime.block_on(self.inner.follower_network(actor))
    }
}

fn runtime() -> Result<Runtime> {
    Ok(Builder::new_current_thread().enable_all().build()?)
}
