//! JSON to entity mapping.
//!
//! Each mapper deserializes a wire view with explicit serde defaults for the
//! fields the server omits when they are zero or unset, then builds the
//! immutable entity. Missing required fields are an [`Error::Mapping`]; the
//! engine skips such entities one at a time rather than failing a page.

use crate::error::{Error, Result};
use crate::types::{FeedEntry, Post, Profile, Repost, Thread};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// `$type` of a feed reason marking a repost
pub const REASON_REPOST: &str = "app.bsky.feed.defs#reasonRepost";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileView {
    did: String,
    handle: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    followers_count: u64,
    #[serde(default)]
    follows_count: u64,
}

impl From<ProfileView> for Profile {
    fn from(view: ProfileView) -> Self {
        let created_at = view.created_at.as_deref().and_then(|raw| {
            parse_timestamp(raw)
                .inspect_err(|e| {
                    tracing::debug!(
                        did = %view.did,
                        created_at = raw,
                        error = %e,
                        "Ignoring unparseable profile timestamp"
                    );
                })
                .ok()
        });

        Profile {
            did: view.did,
            handle: view.handle,
            display_name: view.display_name.unwrap_or_default(),
            created_at,
            description: view.description.unwrap_or_default(),
            followers_count: view.followers_count,
            follows_count: view.follows_count,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostRecord {
    created_at: String,
    text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostView {
    uri: String,
    author: ProfileView,
    record: PostRecord,
    #[serde(default)]
    indexed_at: Option<String>,
    reply_count: u64,
    repost_count: u64,
    like_count: u64,
    quote_count: u64,
}

/// Timestamp layout used when a client writes `createdAt` without an offset
const NAIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parse an RFC 3339 timestamp, or an offset-less one read as UTC
fn parse_timestamp(raw: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|rfc_err| {
            NaiveDateTime::parse_from_str(raw, NAIVE_TIMESTAMP_FORMAT)
                .map(|naive| naive.and_utc())
                .inspect(|_| {
                    tracing::debug!(
                        created_at = raw,
                        error = %rfc_err,
                        "Reading offset-less timestamp as UTC"
                    );
                })
        })
}

/// Creation time of a post: the record's `createdAt`, else the AppView's `indexedAt`
fn post_created_at(view: &PostView) -> Result<DateTime<Utc>> {
    let err = match parse_timestamp(&view.record.created_at) {
        Ok(created_at) => return Ok(created_at),
        Err(e) => e,
    };

    let indexed_at = view.indexed_at.as_deref().and_then(|raw| parse_timestamp(raw).ok());
    match indexed_at {
        Some(indexed_at) => {
            tracing::debug!(
                uri = %view.uri,
                created_at = %view.record.created_at,
                error = %err,
                "Unparseable post timestamp, using indexedAt"
            );
            Ok(indexed_at)
        }
        None => Err(Error::mapping(
            "post",
            format!("unparseable createdAt {:?}: {err}", view.record.created_at),
        )),
    }
}

/// Map a profile view (`profileView`, `profileViewBasic` or `profileViewDetailed`)
///
/// # Errors
/// Returns [`Error::Mapping`] if `did` or `handle` is missing.
pub fn to_profile(json: &Value) -> Result<Profile> {
    ProfileView::deserialize(json)
        .map(Profile::from)
        .map_err(|e| Error::mapping("profile", e.to_string()))
}

/// Map a `postView`
///
/// # Errors
/// Returns [`Error::Mapping`] if the URI, author, record text or any
/// engagement count is missing, or if neither `createdAt` nor `indexedAt`
/// parses as a timestamp.
pub fn to_post(json: &Value) -> Result<Post> {
    let view = PostView::deserialize(json).map_err(|e| Error::mapping("post", e.to_string()))?;
    let created_at = post_created_at(&view)?;

    Ok(Post {
        uri: view.uri,
        author: view.author.into(),
        created_at,
        text: view.record.text,
        reply_count: view.reply_count,
        repost_count: view.repost_count,
        like_count: view.like_count,
        quote_count: view.quote_count,
    })
}

/// Map a `threadViewPost` and, recursively, its replies
///
/// Replies without a `post` object (not-found or blocked placeholders) are
/// left out of the tree.
///
/// # Errors
/// Returns [`Error::Mapping`] if this node is not a viewable post.
pub fn to_thread(json: &Value) -> Result<Thread> {
    let post_json = json.get("post").ok_or_else(|| {
        let kind = json.get("$type").and_then(Value::as_str).unwrap_or("unknown");
        Error::mapping("thread", format!("node is not a viewable post ({kind})"))
    })?;
    let post = to_post(post_json)?;

    let replies = json
        .get("replies")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .filter_map(|reply| match to_thread(reply) {
            Ok(thread) => Some(thread),
            Err(e) => {
                tracing::debug!(parent = %post.uri, error = %e, "Skipping reply");
                None
            }
        })
        .collect();

    Ok(Thread { post, replies })
}

/// Map a `feedViewPost` into a [`FeedEntry`]
///
/// A repost reason produces [`FeedEntry::Repost`]. Any other reason, or a
/// repost reason without the reposter's handle, is logged and the entry is
/// kept as a plain [`FeedEntry::Post`].
///
/// # Errors
/// Returns [`Error::Mapping`] if the embedded post cannot be mapped.
pub fn to_feed_entry(json: &Value) -> Result<FeedEntry> {
    let post_json = json
        .get("post")
        .ok_or_else(|| Error::mapping("feed entry", "missing field `post`"))?;
    let post = to_post(post_json)?;

    let reason = match json.get("reason") {
        None | Some(Value::Null) => return Ok(FeedEntry::Post(post)),
        Some(reason) => reason,
    };

    let tag = reason.get("$type").and_then(Value::as_str).unwrap_or_default();
    if tag != REASON_REPOST {
        tracing::warn!(
            uri = %post.uri,
            reason = tag,
            "Unexpected feed reason, keeping entry as a post"
        );
        return Ok(FeedEntry::Post(post));
    }

    match reason.pointer("/by/handle").and_then(Value::as_str) {
        Some(by) => Ok(FeedEntry::Repost(Repost {
            post,
            by: by.to_string(),
        })),
        None => {
            tracing::warn!(
                uri = %post.uri,
                "Repost reason without reposter handle, keeping entry as a post"
            );
            Ok(FeedEntry::Post(post))
        }
    }
}

/// The `handle` field of a profile view
///
/// # Errors
/// Returns [`Error::Mapping`] if the field is missing or not a string.
pub fn to_handle(json: &Value) -> Result<String> {
    json.get("handle")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::mapping("handle", "missing field `handle`"))
}

/// Map every item, logging and skipping the ones that fail
pub(crate) fn map_each<'a, T>(
    items: impl IntoIterator<Item = &'a Value>,
    map: impl Fn(&Value) -> Result<T>,
) -> Vec<T> {
    items
        .into_iter()
        .filter_map(|item| match map(item) {
            Ok(entity) => Some(entity),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping entity");
                None
            }
        })
        .collect()
}
