//! Batched fan-out: split a key list into endpoint-legal chunks and fetch them
//! with a bounded number of requests in flight.
//!
//! Each chunk is isolated. A chunk whose request fails, or whose response lacks
//! the result array, contributes nothing to the merged items and never stops
//! its siblings. The accumulator is only touched by the driving task after the
//! chunk futures resolve, so nothing is shared across them but the gateway.

use crate::config::Scheduling;
use crate::error::Result;
use crate::gateway::{Gateway, Params};
use crate::mapper::map_each;
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::collections::HashSet;

/// Split `items` into consecutive chunks of at most `size` elements
///
/// Yields `ceil(len / size)` chunks; only the last may be shorter. A `size` of
/// zero is treated as one.
pub fn partition<T: Clone>(items: &[T], size: usize) -> Vec<Vec<T>> {
    items.chunks(size.max(1)).map(<[T]>::to_vec).collect()
}

/// Drop repeated keys, keeping the first occurrence of each
pub fn dedupe<I, S>(keys: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    keys.into_iter()
        .map(Into::into)
        .filter(|key| seen.insert(key.clone()))
        .collect()
}

/// What happened to one chunk's request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// The response carried the result array; `items` entities were mapped from it
    Succeeded {
        /// Entities contributed by this chunk
        items: usize,
    },
    /// The response had no result array (including the empty-object sentinel)
    MissingKey,
    /// The request failed
    Failed {
        /// Machine-readable error code
        code: &'static str,
        /// Error message
        error: String,
    },
}

/// One chunk's keys and outcome
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkReport {
    /// Keys sent in this chunk
    pub keys: Vec<String>,
    /// What the request produced
    pub outcome: ChunkOutcome,
}

impl ChunkReport {
    /// Whether this chunk contributed data
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, ChunkOutcome::Succeeded { .. })
    }
}

/// Merged items plus a per-chunk account of a fan-out
#[derive(Clone, Debug, PartialEq)]
pub struct BatchReport<T> {
    /// Entities merged from every successful chunk
    pub items: Vec<T>,
    /// One report per chunk, in completion order
    pub chunks: Vec<ChunkReport>,
}

impl<T> Default for BatchReport<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            chunks: Vec::new(),
        }
    }
}

impl<T> BatchReport<T> {
    /// Chunks that contributed nothing
    pub fn failed_chunks(&self) -> impl Iterator<Item = &ChunkReport> {
        self.chunks.iter().filter(|c| !c.succeeded())
    }

    /// Whether every chunk succeeded
    pub fn is_complete(&self) -> bool {
        self.chunks.iter().all(ChunkReport::succeeded)
    }

    /// Keys whose chunk failed; entities for them may be missing from `items`
    pub fn failed_keys(&self) -> impl Iterator<Item = &String> {
        self.failed_chunks().flat_map(|c| c.keys.iter())
    }

    fn merge(&mut self, report: ChunkReport, items: Vec<T>) {
        self.items.extend(items);
        self.chunks.push(report);
    }
}

/// A batched endpoint: how to build one chunk's request and read its response
pub struct BatchRequest<'a, P, M> {
    /// XRPC method to call
    pub endpoint: &'a str,
    /// Top-level array holding the results
    pub result_key: &'a str,
    /// Request parameters for one chunk of keys
    pub params: P,
    /// Maps one result array element to an entity
    pub map: M,
    /// Recognizes elements standing in for a missing entity; these are
    /// dropped at `debug` instead of going through `map`
    pub placeholder: Option<fn(&Value) -> bool>,
}

/// Chunking and concurrency settings for one fan-out
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FanOut {
    /// Keys per request
    pub chunk_size: usize,
    /// Most requests outstanding at once
    pub wave_size: usize,
    /// Barrier waves or a sliding window
    pub scheduling: Scheduling,
}

impl FanOut {
    /// Fan-out with wave scheduling
    pub fn new(chunk_size: usize, wave_size: usize) -> Self {
        Self {
            chunk_size,
            wave_size,
            scheduling: Scheduling::Waves,
        }
    }

    /// Same limits with a different scheduling mode
    pub fn with_scheduling(self, scheduling: Scheduling) -> Self {
        Self { scheduling, ..self }
    }

    /// Dedupe `keys`, fetch them chunk by chunk and merge the results
    ///
    /// Never fails; see [`BatchReport::failed_chunks`] for what went missing.
    pub async fn run<G, T, P, M>(
        &self,
        gateway: &G,
        keys: Vec<String>,
        request: BatchRequest<'_, P, M>,
    ) -> BatchReport<T>
    where
        G: Gateway + ?Sized,
        P: Fn(&[String]) -> Params,
        M: Fn(&Value) -> Result<T>,
    {
        let keys = dedupe(keys);
        if keys.is_empty() {
            return BatchReport::default();
        }

        let chunks = partition(&keys, self.chunk_size);
        let wave_size = self.wave_size.max(1);
        let BatchRequest {
            endpoint,
            result_key,
            params,
            map,
            placeholder,
        } = request;

        tracing::debug!(
            endpoint = endpoint,
            keys = keys.len(),
            chunks = chunks.len(),
            wave_size = wave_size,
            scheduling = ?self.scheduling,
            "Starting fan-out"
        );

        let target = ChunkTarget {
            endpoint,
            result_key,
            placeholder,
        };
        let mut report = BatchReport::default();
        match self.scheduling {
            Scheduling::Waves => {
                for (wave_index, wave) in chunks.chunks(wave_size).enumerate() {
                    let outcomes = join_all(wave.iter().map(|chunk| {
                        let chunk_params = params(chunk.as_slice());
                        fetch_chunk(gateway, target, chunk.clone(), chunk_params, &map)
                    }))
                    .await;

                    tracing::debug!(
                        endpoint = endpoint,
                        wave = wave_index,
                        requests = outcomes.len(),
                        "Wave complete"
                    );
                    for (chunk_report, items) in outcomes {
                        report.merge(chunk_report, items);
                    }
                }
            }
            Scheduling::SlidingWindow => {
                let outcomes: Vec<_> = stream::iter(chunks)
                    .map(|chunk| {
                        let chunk_params = params(chunk.as_slice());
                        fetch_chunk(gateway, target, chunk, chunk_params, &map)
                    })
                    .buffer_unordered(wave_size)
                    .collect()
                    .await;

                for (chunk_report, items) in outcomes {
                    report.merge(chunk_report, items);
                }
            }
        }

        let failed = report.failed_chunks().count();
        if failed > 0 {
            tracing::warn!(
                endpoint = endpoint,
                failed_chunks = failed,
                total_chunks = report.chunks.len(),
                "Fan-out finished with missing chunks"
            );
        }
        tracing::debug!(
            endpoint = endpoint,
            items = report.items.len(),
            chunks = report.chunks.len(),
            "Fan-out complete"
        );

        report
    }
}

/// Where one chunk's request goes and how its response is read
#[derive(Clone, Copy)]
struct ChunkTarget<'a> {
    endpoint: &'a str,
    result_key: &'a str,
    placeholder: Option<fn(&Value) -> bool>,
}

/// Fetch one chunk and map its result array
async fn fetch_chunk<G, T, M>(
    gateway: &G,
    target: ChunkTarget<'_>,
    keys: Vec<String>,
    params: Params,
    map: &M,
) -> (ChunkReport, Vec<T>)
where
    G: Gateway + ?Sized,
    M: Fn(&Value) -> Result<T>,
{
    let ChunkTarget {
        endpoint,
        result_key,
        placeholder,
    } = target;

    let body = match gateway.fetch(endpoint, &params).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(
                endpoint = endpoint,
                keys = keys.len(),
                error = %e,
                "Chunk request failed"
            );
            let outcome = ChunkOutcome::Failed {
                code: e.error_code(),
                error: e.to_string(),
            };
            return (ChunkReport { keys, outcome }, Vec::new());
        }
    };

    match body.get(result_key).and_then(Value::as_array) {
        Some(array) => {
            let is_placeholder = |item: &Value| placeholder.is_some_and(|f| f(item));
            let skipped = array.iter().filter(|item| is_placeholder(*item)).count();
            if skipped > 0 {
                tracing::debug!(
                    endpoint = endpoint,
                    skipped = skipped,
                    "Dropping placeholder entries"
                );
            }
            let items = map_each(array.iter().filter(|item| !is_placeholder(*item)), map);
            let outcome = ChunkOutcome::Succeeded { items: items.len() };
            (ChunkReport { keys, outcome }, items)
        }
        None => {
            tracing::warn!(
                endpoint = endpoint,
                result_key = result_key,
                "Response missing result array, skipping chunk"
            );
            let outcome = ChunkOutcome::MissingKey;
            (ChunkReport { keys, outcome }, Vec::new())
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
