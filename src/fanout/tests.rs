use super::*;
use crate::error::Error;
use crate::gateway::nsid;
use crate::mapper::to_profile;
use crate::test_helpers::{MockGateway, list_param, profile_json};
use serde_json::json;
use std::time::Duration;

fn handles(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("user{i}.test")).collect()
}

/// Echo every requested handle back as a profile
fn echo_profiles(_endpoint: &str, params: &Params) -> Result<Value> {
    let profiles: Vec<Value> = list_param(params, "actors")
        .iter()
        .map(|h| profile_json(&format!("did:plc:{h}"), h))
        .collect();
    Ok(json!({ "profiles": profiles }))
}

fn profile_request()
-> BatchRequest<'static, impl Fn(&[String]) -> Params, impl Fn(&Value) -> Result<crate::Profile>> {
    BatchRequest {
        endpoint: nsid::GET_PROFILES,
        result_key: "profiles",
        params: |chunk: &[String]| Params::new().with("actors", chunk),
        map: to_profile,
        placeholder: None,
    }
}

// --- partition / dedupe ---

#[test]
fn partition_yields_ceil_chunks_preserving_elements() {
    for (n, size) in [(0, 25), (1, 25), (25, 25), (26, 25), (1000, 25), (61, 30), (7, 1)] {
        let items: Vec<usize> = (0..n).collect();
        let chunks = partition(&items, size);

        assert_eq!(chunks.len(), n.div_ceil(size), "n={n} size={size}");
        assert!(chunks.iter().all(|c| !c.is_empty() && c.len() <= size));
        let flat: Vec<usize> = chunks.into_iter().flatten().collect();
        assert_eq!(flat, items);
    }
}

#[test]
fn partition_treats_zero_size_as_one() {
    assert_eq!(partition(&[1, 2, 3], 0), vec![vec![1], vec![2], vec![3]]);
}

#[test]
fn dedupe_keeps_first_occurrence() {
    assert_eq!(
        dedupe(["alice", "alice", "bob", "alice", "carol"]),
        vec!["alice".to_string(), "bob".to_string(), "carol".to_string()]
    );
}

// --- executor ---

#[tokio::test]
async fn empty_key_list_issues_no_requests() {
    let gateway = MockGateway::new(echo_profiles);
    let report = FanOut::new(25, 50)
        .run(&gateway, Vec::new(), profile_request())
        .await;

    assert!(report.items.is_empty());
    assert!(report.chunks.is_empty());
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn duplicate_keys_are_fetched_once() {
    let gateway = MockGateway::new(echo_profiles);
    let keys = vec!["alice".to_string(), "alice".to_string(), "bob".to_string()];

    let report = FanOut::new(25, 50).run(&gateway, keys, profile_request()).await;

    let calls = gateway.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(list_param(&calls[0].1, "actors"), vec!["alice", "bob"]);
    assert_eq!(report.items.len(), 2);
}

#[tokio::test]
async fn chunks_respect_endpoint_limit() {
    let gateway = MockGateway::new(echo_profiles);

    let report = FanOut::new(25, 50)
        .run(&gateway, handles(1000), profile_request())
        .await;

    let calls = gateway.calls();
    assert_eq!(calls.len(), 40);
    assert!(
        calls
            .iter()
            .all(|(endpoint, p)| endpoint == nsid::GET_PROFILES
                && list_param(p, "actors").len() <= 25)
    );
    assert_eq!(report.items.len(), 1000);
    assert!(report.is_complete());
}

#[tokio::test]
async fn waves_never_exceed_wave_size() {
    let gateway = MockGateway::new(echo_profiles).with_delay(Duration::from_millis(5));

    let report = FanOut::new(2, 4)
        .run(&gateway, handles(40), profile_request())
        .await;

    assert_eq!(gateway.call_count(), 20);
    assert_eq!(gateway.peak_in_flight(), 4);
    assert_eq!(report.items.len(), 40);
}

#[tokio::test]
async fn sliding_window_never_exceeds_wave_size() {
    let gateway = MockGateway::new(echo_profiles).with_delay(Duration::from_millis(5));

    let report = FanOut::new(2, 4)
        .with_scheduling(Scheduling::SlidingWindow)
        .run(&gateway, handles(40), profile_request())
        .await;

    assert_eq!(gateway.call_count(), 20);
    assert!(gateway.peak_in_flight() <= 4);
    assert!(gateway.peak_in_flight() > 1);
    assert_eq!(report.items.len(), 40);
}

#[tokio::test]
async fn waves_are_serialized() {
    // 7 chunks in waves of 3: each wave starts with nothing outstanding
    let gateway = MockGateway::new(echo_profiles).with_delay(Duration::from_millis(5));

    FanOut::new(1, 3)
        .run(&gateway, handles(7), profile_request())
        .await;

    assert_eq!(gateway.in_flight_at_start(), vec![0, 1, 2, 0, 1, 2, 0]);
    assert_eq!(gateway.peak_in_flight(), 3);
}

#[tokio::test]
async fn failed_chunk_is_isolated() {
    let gateway = MockGateway::new(|endpoint: &str, params: &Params| {
        if list_param(params, "actors").contains(&"user2.test".to_string()) {
            Err(Error::Http {
                status: 500,
                url: format!("https://x.test/xrpc/{endpoint}"),
                body: "boom".to_string(),
            })
        } else {
            echo_profiles(endpoint, params)
        }
    });

    // 5 chunks of 1 in a single wave; the third fails
    let report = FanOut::new(1, 5)
        .run(&gateway, handles(5), profile_request())
        .await;

    assert_eq!(gateway.call_count(), 5);
    assert_eq!(report.items.len(), 4);
    assert!(!report.items.iter().any(|p| p.handle == "user2.test"));

    let failed: Vec<_> = report.failed_chunks().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].keys, vec!["user2.test".to_string()]);
    assert!(matches!(
        failed[0].outcome,
        ChunkOutcome::Failed { code: "http_error", .. }
    ));
    assert_eq!(report.failed_keys().count(), 1);
}

#[tokio::test]
async fn failure_does_not_stop_later_waves() {
    let gateway = MockGateway::new(|endpoint: &str, params: &Params| {
        if list_param(params, "actors").contains(&"user0.test".to_string()) {
            Ok(json!({}))
        } else {
            echo_profiles(endpoint, params)
        }
    });

    let report = FanOut::new(2, 2)
        .run(&gateway, handles(10), profile_request())
        .await;

    assert_eq!(gateway.call_count(), 5);
    assert_eq!(report.items.len(), 8);
    assert_eq!(report.chunks.len(), 5);
}

#[tokio::test]
async fn missing_result_key_counts_as_failed_chunk() {
    let gateway = MockGateway::new(|_: &str, _: &Params| Ok(json!({ "error": "InvalidRequest" })));

    let report = FanOut::new(25, 50)
        .run(&gateway, handles(3), profile_request())
        .await;

    assert!(report.items.is_empty());
    assert_eq!(report.chunks.len(), 1);
    assert_eq!(report.chunks[0].outcome, ChunkOutcome::MissingKey);
    assert!(!report.is_complete());
}

#[tokio::test]
async fn unmappable_entities_are_skipped_within_a_chunk() {
    let gateway = MockGateway::new(|_: &str, _: &Params| {
        Ok(json!({ "profiles": [
            profile_json("did:plc:a", "a.test"),
            { "did": "did:plc:no-handle" },
        ]}))
    });

    let report = FanOut::new(25, 50)
        .run(&gateway, handles(2), profile_request())
        .await;

    assert_eq!(report.items.len(), 1);
    assert_eq!(report.chunks[0].outcome, ChunkOutcome::Succeeded { items: 1 });
}

#[tokio::test]
async fn placeholders_are_dropped_before_mapping() {
    let gateway = MockGateway::new(|_: &str, _: &Params| {
        Ok(json!({ "profiles": [
            { "$type": "app.bsky.graph.defs#notFoundActor", "actor": "gone.test", "notFound": true },
            profile_json("did:plc:a", "a.test"),
            { "did": "did:plc:no-handle" },
        ]}))
    });
    fn is_not_found(item: &Value) -> bool {
        item.get("notFound").is_some()
    }
    let request = BatchRequest {
        placeholder: Some(is_not_found),
        ..profile_request()
    };

    let report = FanOut::new(25, 50).run(&gateway, handles(3), request).await;

    assert_eq!(report.items.len(), 1);
    assert_eq!(report.items[0].handle, "a.test");
    assert_eq!(report.chunks[0].outcome, ChunkOutcome::Succeeded { items: 1 });
}
