//! Core entity types for bsky-fetch
//!
//! All entities are value objects: built once from a JSON payload by
//! [`mapper`](crate::mapper), owned by the caller, never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// An actor's public profile
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Profile {
    /// Stable opaque identifier (e.g. "did:plc:z72i7hdynmk6r22z27h6tvur")
    pub did: String,
    /// Human-readable unique name (e.g. "bsky.app")
    pub handle: String,
    /// Display name, empty when the actor never set one
    pub display_name: String,
    /// Account creation time; absent for some legacy accounts
    pub created_at: Option<DateTime<Utc>>,
    /// Profile bio, empty when unset
    pub description: String,
    /// Number of followers, 0 when the server omits it
    pub followers_count: u64,
    /// Number of accounts followed, 0 when the server omits it
    pub follows_count: u64,
}

/// A post as seen in feeds and threads
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Post {
    /// AT URI of the post record (e.g. "at://did:plc:.../app.bsky.feed.post/3k...")
    pub uri: String,
    /// The post's author
    pub author: Profile,
    /// `createdAt` of the post record
    pub created_at: DateTime<Utc>,
    /// Post text
    pub text: String,
    /// Number of replies
    pub reply_count: u64,
    /// Number of reposts
    pub repost_count: u64,
    /// Number of likes
    pub like_count: u64,
    /// Number of quote posts
    pub quote_count: u64,
}

/// A post re-shared into another actor's feed
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Repost {
    /// The reposted post
    pub post: Post,
    /// Handle of the actor who reposted it
    pub by: String,
}

/// One item of an author feed
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedEntry {
    /// An original post
    Post(Post),
    /// A repost of someone else's post
    Repost(Repost),
}

impl FeedEntry {
    /// The underlying post, whichever variant this is
    pub fn post(&self) -> &Post {
        match self {
            FeedEntry::Post(post) => post,
            FeedEntry::Repost(repost) => &repost.post,
        }
    }

    /// Whether this entry is a repost
    pub fn is_repost(&self) -> bool {
        matches!(self, FeedEntry::Repost(_))
    }
}

/// A post and its reply tree
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Thread {
    /// The post at this node
    pub post: Post,
    /// Direct replies, in server order
    pub replies: Vec<Thread>,
}

impl Thread {
    /// Total number of posts in this tree, including the root
    pub fn len(&self) -> usize {
        1 + self.replies.iter().map(Thread::len).sum::<usize>()
    }

    /// Always false: a thread holds at least its root post
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Depth of the tree; a post with no replies has depth 1
    pub fn depth(&self) -> usize {
        1 + self.replies.iter().map(Thread::depth).max().unwrap_or(0)
    }

    /// Visit every node depth-first, pre-order, with its nesting level
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Thread, usize)) {
        self.walk_at(0, visit);
    }

    fn walk_at<'a>(&'a self, level: usize, visit: &mut impl FnMut(&'a Thread, usize)) {
        visit(self, level);
        for reply in &self.replies {
            reply.walk_at(level + 1, visit);
        }
    }
}

/// Follow relationships between a root actor and a set of other actors
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Relationships {
    /// DID of the root actor
    pub actor: String,
    /// DIDs that follow the root actor
    pub followed_by: BTreeSet<String>,
    /// DIDs the root actor follows
    pub following: BTreeSet<String>,
}

impl Relationships {
    /// Empty relationship sets for `actor`
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            ..Default::default()
        }
    }

    /// DIDs present in both sets
    pub fn mutuals(&self) -> impl Iterator<Item = &String> {
        self.followed_by.intersection(&self.following)
    }
}

/// A root actor, its followers' profiles and its relationships with them
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FollowerNetwork {
    /// The root actor
    pub root: Profile,
    /// Follower profiles keyed by DID
    pub profiles: HashMap<String, Profile>,
    /// How the root relates to each follower
    pub relationships: Relationships,
}

impl FollowerNetwork {
    /// Profiles of actors that follow the root, in DID order
    ///
    /// DIDs whose profile could not be fetched are skipped.
    pub fn followed_by(&self) -> impl Iterator<Item = &Profile> {
        self.relationships
            .followed_by
            .iter()
            .filter_map(|did| self.profile(did))
    }

    /// Profiles of actors the root follows back, in DID order
    pub fn following(&self) -> impl Iterator<Item = &Profile> {
        self.relationships
            .following
            .iter()
            .filter_map(|did| self.profile(did))
    }

    /// Look up a profile by DID, including the root's own
    pub fn profile(&self, did: &str) -> Option<&Profile> {
        if self.root.did == did {
            Some(&self.root)
        } else {
            self.profiles.get(did)
        }
    }
}
