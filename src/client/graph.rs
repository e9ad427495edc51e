//! Followers and follow relationships.

use super::{BskyClient, collect_keys};
use crate::fanout::{BatchReport, BatchRequest};
use crate::gateway::{Gateway, Params, nsid};
use crate::mapper::{map_each, to_handle};
use crate::pagination::{Page, PageRequest, Termination, walk};
use crate::relationships::{RelationshipEntry, fold, is_missing_actor, to_relationship};
use crate::types::{FollowerNetwork, Profile, Relationships};

impl<G: Gateway> BskyClient<G> {
    /// Handles of every follower of `actor`
    ///
    /// Walks the follower listing until the server stops returning a cursor.
    /// No truncation is applied.
    pub async fn follower_handles(&self, actor: &str) -> Vec<String> {
        let result = walk(
            &self.gateway,
            PageRequest {
                endpoint: nsid::GET_FOLLOWERS,
                params: Params::new().with("actor", actor),
                page_size: self.limits.follower_page_size,
                termination: Termination::Exhaustive,
            },
            |body| Page::from_body(body, "followers"),
        )
        .await;

        let handles = map_each(&result.items, to_handle);
        tracing::debug!(
            actor = actor,
            followers = handles.len(),
            pages = result.pages,
            "Fetched follower handles"
        );
        handles
    }

    /// Full profiles of every follower of `actor`
    ///
    /// The listing only carries basic views, so the handles are re-fetched in
    /// batches to get counts and descriptions.
    pub async fn followers(&self, actor: &str) -> Vec<Profile> {
        let handles = self.follower_handles(actor).await;
        self.profiles(handles).await
    }

    /// Relationship entries between `actor` and each of `others`, with a
    /// per-chunk report
    pub async fn relationships_report<I, S>(
        &self,
        actor: &str,
        others: I,
    ) -> BatchReport<RelationshipEntry>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fan_out(self.limits.relationship_chunk_size)
            .run(
                &self.gateway,
                collect_keys(others),
                BatchRequest {
                    endpoint: nsid::GET_RELATIONSHIPS,
                    result_key: "relationships",
                    params: |chunk: &[String]| {
                        Params::new().with("actor", actor).with("others", chunk)
                    },
                    map: to_relationship,
                    placeholder: Some(is_missing_actor),
                },
            )
            .await
    }

    /// Which of `others` follow `actor`, and which `actor` follows
    ///
    /// `actor` and `others` are DIDs.
    pub async fn relationships<I, S>(&self, actor: &str, others: I) -> Relationships
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let report = self.relationships_report(actor, others).await;
        fold(actor, report.items)
    }

    /// `actor`'s profile, its followers' profiles and how it relates to them
    ///
    /// Returns `None` when the root profile cannot be fetched.
    pub async fn follower_network(&self, actor: &str) -> Option<FollowerNetwork> {
        let Some(root) = self.profile(actor).await else {
            tracing::warn!(actor = actor, "Root profile not found");
            return None;
        };

        let followers = self.followers(actor).await;
        let relationships = self
            .relationships(&root.did, followers.iter().map(|p| p.did.clone()))
            .await;

        tracing::info!(
            actor = actor,
            followers = followers.len(),
            followed_by = relationships.followed_by.len(),
            following = relationships.following.len(),
            "Built follower network"
        );

        let profiles = followers.into_iter().map(|p| (p.did.clone(), p)).collect();
        Some(FollowerNetwork {
            root,
            profiles,
            relationships,
        })
    }
}
