//! # bsky-fetch
//!
//! Read-only client for the public Bluesky AppView API.
//!
//! The core is a batched, bounded-concurrency fetch engine:
//! - **Cursor pagination** - bounded walks for feeds, exhaustive walks for
//!   follower lists
//! - **Batched fan-out** - key lists are deduped, split into endpoint-legal
//!   chunks and fetched with at most `wave_size` requests in flight
//! - **Partial results** - a failed request contributes nothing and never
//!   aborts its siblings; `*_report` variants tell you which chunks failed
//!
//! ## Quick Start
//!
//! ```no_run
//! use bsky_fetch::{BskyClient, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = BskyClient::new(Config::default())?;
//!
//!     for entry in client.feed("bsky.app", 20).await {
//!         println!("{}: {}", entry.post().author.handle, entry.post().text);
//!     }
//!
//!     if let Some(network) = client.follower_network("bsky.app").await {
//!         println!("{} mutuals", network.relationships.mutuals().count());
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Synchronous facade
pub mod blocking;
/// High-level client (decomposed into focused submodules)
pub mod client;
/// Configuration types and API limits
pub mod config;
/// Error types
pub mod error;
/// Batched fan-out executor
pub mod fanout;
/// Transport seam and its HTTP implementation
pub mod gateway;
/// Raw JSON to domain entity mapping
pub mod mapper;
/// Cursor pagination
pub mod pagination;
/// Relationship folding
pub mod relationships;
/// Domain entities
pub mod types;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use client::BskyClient;
pub use config::{CacheConfig, Config, HttpConfig, LimitsConfig, Scheduling};
pub use error::{Error, Result};
pub use fanout::{BatchReport, ChunkOutcome, ChunkReport};
pub use gateway::{Gateway, HttpGateway, ParamValue, Params, ResponseCache};
pub use relationships::RelationshipEntry;
pub use types::{FeedEntry, FollowerNetwork, Post, Profile, Relationships, Repost, Thread};
