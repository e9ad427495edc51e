//! Author feeds and reply threads.

use super::BskyClient;
use crate::gateway::{Gateway, Params, nsid};
use crate::mapper::{map_each, to_feed_entry, to_thread};
use crate::pagination::{Page, PageRequest, Termination, walk};
use crate::types::{FeedEntry, Thread};

impl<G: Gateway> BskyClient<G> {
    /// Up to `limit` most recent entries of an actor's feed
    ///
    /// Pages are `feed_page_size` entries (or `limit`, if smaller) and the
    /// result is truncated to exactly `limit`. A feed shorter than `limit`, or a
    /// page that fails, ends the walk early.
    pub async fn feed(&self, actor: &str, limit: usize) -> Vec<FeedEntry> {
        let result = walk(
            &self.gateway,
            PageRequest {
                endpoint: nsid::GET_AUTHOR_FEED,
                params: Params::new().with("actor", actor),
                page_size: self.limits.feed_page_size,
                termination: Termination::Bounded(limit),
            },
            |body| Page::from_body(body, "feed"),
        )
        .await;

        let entries = map_each(&result.items, to_feed_entry);
        tracing::debug!(
            actor = actor,
            entries = entries.len(),
            pages = result.pages,
            "Fetched feed"
        );
        entries
    }

    /// A post and its replies, `thread_depth` levels deep
    ///
    /// Returns `None` when the request fails or the post is not viewable
    /// (deleted, blocked or not found).
    pub async fn thread(&self, uri: &str) -> Option<Thread> {
        let params = Params::new()
            .with("uri", uri)
            .with("depth", self.limits.thread_depth);
        let body = self.gateway.call(nsid::GET_POST_THREAD, &params).await;

        let Some(root) = body.get("thread") else {
            tracing::debug!(uri = uri, "No thread in response");
            return None;
        };

        match to_thread(root) {
            Ok(thread) => Some(thread),
            Err(e) => {
                tracing::warn!(uri = uri, error = %e, "Thread root is not a viewable post");
                None
            }
        }
    }
}
