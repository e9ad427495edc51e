//! Relationship folding for `app.bsky.graph.getRelationships`.

use crate::error::{Error, Result};
use crate::types::Relationships;
use serde_json::Value;

/// The flags one `relationships[]` entry carries
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationshipEntry {
    /// The other actor's DID
    pub did: String,
    /// The root actor follows this actor
    pub following: bool,
    /// This actor follows the root actor
    pub followed_by: bool,
}

/// A flag is set when its field is present and neither `null` nor `false`
///
/// The server sets `following`/`followedBy` to the AT URI of the follow
/// record and omits them otherwise.
fn flag(entry: &Value, key: &str) -> bool {
    !matches!(entry.get(key), None | Some(Value::Null) | Some(Value::Bool(false)))
}

/// Whether a `relationships[]` element lacks a `did`, as `notFoundActor`
/// placeholders for deleted or unknown accounts do
pub fn is_missing_actor(entry: &Value) -> bool {
    entry.get("did").and_then(Value::as_str).is_none()
}

/// Map one `relationships[]` element
///
/// # Errors
/// Returns [`Error::Mapping`] for entries without a `did`, such as
/// `notFoundActor` placeholders.
pub fn to_relationship(entry: &Value) -> Result<RelationshipEntry> {
    let did = entry.get("did").and_then(Value::as_str).ok_or_else(|| {
        let actor = entry.get("actor").and_then(Value::as_str).unwrap_or("?");
        Error::mapping("relationship", format!("entry for {actor} has no `did`"))
    })?;

    Ok(RelationshipEntry {
        did: did.to_string(),
        following: flag(entry, "following"),
        followed_by: flag(entry, "followedBy"),
    })
}

/// Fold relationship entries into the root actor's two sets
///
/// Each entry contributes to neither, one or both sets. Repeated DIDs collapse.
pub fn fold<I>(actor: &str, entries: I) -> Relationships
where
    I: IntoIterator<Item = RelationshipEntry>,
{
    let mut relationships = Relationships::new(actor);
    for entry in entries {
        if entry.following {
            relationships.following.insert(entry.did.clone());
        }
        if entry.followed_by {
            relationships.followed_by.insert(entry.did);
        }
    }
    relationships
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::map_each;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn folds_flags_into_independent_sets() {
        let raw = vec![
            json!({ "did": "x", "following": true }),
            json!({ "did": "y", "followedBy": true }),
            json!({ "did": "z", "following": true, "followedBy": true }),
        ];

        let relationships = fold("root", map_each(&raw, to_relationship));

        assert_eq!(relationships.actor, "root");
        assert_eq!(relationships.following, set(&["x", "z"]));
        assert_eq!(relationships.followed_by, set(&["y", "z"]));
    }

    #[test]
    fn uri_valued_flags_count_as_present() {
        let entry = to_relationship(&json!({
            "$type": "app.bsky.graph.defs#relationship",
            "did": "did:plc:other",
            "following": "at://did:plc:root/app.bsky.graph.follow/3k",
        }))
        .unwrap();

        assert!(entry.following);
        assert!(!entry.followed_by);
    }

    #[test]
    fn null_and_false_flags_are_absent() {
        let entry = to_relationship(&json!({
            "did": "did:plc:other",
            "following": null,
            "followedBy": false,
        }))
        .unwrap();

        assert!(!entry.following);
        assert!(!entry.followed_by);
    }

    #[test]
    fn entry_without_flags_contributes_nothing() {
        let relationships = fold(
            "root",
            map_each(&[json!({ "did": "w" })], to_relationship),
        );
        assert!(relationships.following.is_empty());
        assert!(relationships.followed_by.is_empty());
    }

    #[test]
    fn not_found_actor_is_skipped() {
        let raw = vec![
            json!({
                "$type": "app.bsky.graph.defs#notFoundActor",
                "actor": "did:plc:gone",
                "notFound": true,
            }),
            json!({ "did": "a", "followedBy": "at://a/app.bsky.graph.follow/1" }),
        ];

        let relationships = fold("root", map_each(&raw, to_relationship));
        assert_eq!(relationships.followed_by, set(&["a"]));
    }

    #[test]
    fn missing_actor_recognizes_entries_without_did() {
        assert!(is_missing_actor(&json!({
            "$type": "app.bsky.graph.defs#notFoundActor",
            "actor": "did:plc:gone",
            "notFound": true,
        })));
        assert!(!is_missing_actor(&json!({ "did": "did:plc:here" })));
    }

    #[test]
    fn repeated_dids_collapse() {
        let entries = vec![
            RelationshipEntry {
                did: "a".to_string(),
                following: true,
                followed_by: false,
            },
            RelationshipEntry {
                did: "a".to_string(),
                following: true,
                followed_by: true,
            },
        ];

        let relationships = fold("root", entries);
        assert_eq!(relationships.following.len(), 1);
        assert_eq!(relationships.followed_by.len(), 1);
    }
}
