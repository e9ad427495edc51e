//! Common test utilities for bsky-fetch integration tests

#![allow(dead_code)]

use bsky_fetch::Config;
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::MockServer;

/// XRPC path for an endpoint
pub fn xrpc(endpoint: &str) -> String {
    format!("/xrpc/{endpoint}")
}

/// Config pointing at `server` with a short timeout
pub fn config_for(server: &MockServer, cache: bool) -> Config {
    let mut config = Config::default();
    config.http.api_host = server.uri();
    config.http.timeout = Duration::from_secs(5);
    config.cache.enabled = cache;
    config
}

/// A `profileViewDetailed` as the AppView returns it
pub fn profile_json(did: &str, handle: &str) -> Value {
    json!({
        "did": did,
        "handle": handle,
        "displayName": handle.to_uppercase(),
        "createdAt": "2023-04-12T09:30:00.000Z",
        "description": "",
        "followersCount": 3,
        "followsCount": 4,
        "postsCount": 12,
    })
}

/// A `postView` authored by `handle`
pub fn post_json(uri: &str, handle: &str) -> Value {
    json!({
        "uri": uri,
        "cid": "bafyreib",
        "author": { "did": format!("did:plc:{handle}"), "handle": handle },
        "record": {
            "$type": "app.bsky.feed.post",
            "createdAt": "2024-05-01T12:00:00.000Z",
            "text": format!("text of {uri}"),
        },
        "replyCount": 0,
        "repostCount": 0,
        "likeCount": 7,
        "quoteCount": 0,
        "indexedAt": "2024-05-01T12:00:01.000Z",
    })
}

/// A reply tree `depth` levels below the root, one reply per level
pub fn linear_thread_json(depth: usize) -> Value {
    let mut node = json!({
        "$type": "app.bsky.feed.defs#threadViewPost",
        "post": post_json(&format!("at://thread/{depth}"), "leaf.test"),
        "replies": [],
    });
    for level in (0..depth).rev() {
        node = json!({
            "$type": "app.bsky.feed.defs#threadViewPost",
            "post": post_json(&format!("at://thread/{level}"), "author.test"),
            "replies": [node],
        });
    }
    node
}
