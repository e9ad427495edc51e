//! Batched profile lookups.

use super::{BskyClient, collect_keys};
use crate::fanout::{BatchReport, BatchRequest};
use crate::gateway::{Gateway, Params, nsid};
use crate::mapper::to_profile;
use crate::types::Profile;

impl<G: Gateway> BskyClient<G> {
    /// Profiles for a list of handles or DIDs, with a per-chunk report
    ///
    /// Duplicates are fetched once. Lookups run in chunks of
    /// `profile_chunk_size` with at most `wave_size` requests in flight.
    pub async fn profiles_report<I, S>(&self, actors: I) -> BatchReport<Profile>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fan_out(self.limits.profile_chunk_size)
            .run(
                &self.gateway,
                collect_keys(actors),
                BatchRequest {
                    endpoint: nsid::GET_PROFILES,
                    result_key: "profiles",
                    params: |chunk: &[String]| Params::new().with("actors", chunk),
                    map: to_profile,
                    placeholder: None,
                },
            )
            .await
    }

    /// Profiles for a list of handles or DIDs
    ///
    /// Actors the server does not know, and actors whose chunk failed, are
    /// simply absent from the result.
    pub async fn profiles<I, S>(&self, actors: I) -> Vec<Profile>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.profiles_report(actors).await.items
    }

    /// A single profile by handle or DID
    pub async fn profile(&self, actor: &str) -> Option<Profile> {
        self.profiles([actor]).await.into_iter().next()
    }
}
