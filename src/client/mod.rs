//! High-level client split into focused submodules.
//!
//! The `BskyClient` struct and its methods are organized by domain:
//! - [`actors`] - Batched profile lookups
//! - [`feed`] - Author feeds and reply threads
//! - [`graph`] - Followers and follow relationships

mod actors;
mod feed;
mod graph;


use crate::config::{Config, LimitsConfig};
use crate::error::Result;
use crate::fanout::FanOut;
use crate::gateway::{Gateway, HttpGateway};

/// Read-only client for the public Bluesky API
///
/// Owns its gateway explicitly; nothing is shared through globals. Every fetch
/// operation returns plain values and never fails: requests that go wrong
/// contribute nothing (see the `*_report` variants to find out which did).
#[derive(Clone, Debug)]
pub struct BskyClient<G = HttpGateway> {
    gateway: G,
    limits: LimitsConfig,
}

impl BskyClient<HttpGateway> {
    /// Create a client talking HTTP to the configured API host
    ///
    /// # Errors
    /// Returns error if the configuration is invalid or the HTTP client
    /// cannot be built
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let gateway = HttpGateway::from_config(&config)?;

        tracing::info!(
            api_host = %config.http.api_host,
            cache = config.cache.enabled,
            wave_size = config.limits.wave_size,
            "Bluesky client initialized"
        );

        Ok(Self::with_gateway(gateway, config.limits))
    }
}

impl<G: Gateway> BskyClient<G> {
    /// Create a client over any gateway, e.g. a test double
    pub fn with_gateway(gateway: G, limits: LimitsConfig) -> Self {
        Self { gateway, limits }
    }

    /// The underlying gateway
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Endpoint limits in effect
    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    fn fan_out(&self, chunk_size: usize) -> FanOut {
        FanOut::new(chunk_size, self.limits.wave_size).with_scheduling(self.limits.scheduling)
    }
}

fn collect_keys<I, S>(keys: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    keys.into_iter().map(Into::into).collect()
}
