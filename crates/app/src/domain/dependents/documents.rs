//! Dependent Documents

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::dependents::kinds::DependentKind;

/// A stored dependent record. The document is kept as-is so unknown fields
/// survive a delete and restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependentDocument {
    pub uuid: Uuid,
    pub document: Value,
}

impl DependentDocument {
    /// Notification uuids listed in the document's `notifications` array.
    /// Entries that are not uuid strings are ignored.
    #[must_use]
    pub fn notification_refs(&self) -> Vec<Uuid> {
        self.document
            .get("notifications")
            .and_then(Value::as_array)
            .map(|refs| {
                refs.iter()
                    .filter_map(Value::as_str)
                    .filter_map(|value| Uuid::try_parse(value).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether any of the kind's reference fields points at `community`.
    #[must_use]
    pub fn is_owned_by(&self, kind: DependentKind, community: Uuid) -> bool {
        let community = community.to_string();

        kind.collection()
            .reference_fields
            .iter()
            .any(|field| {
                self.document.get(*field).and_then(Value::as_str) == Some(community.as_str())
            })
    }

    /// Point every reference field present on the document at `community`.
    /// A document with none of them gets the kind's primary field.
    pub fn rebind_to(&mut self, kind: DependentKind, community: Uuid) {
        let community = Value::String(community.to_string());

        let Some(fields) = self.document.as_object_mut() else {
            return;
        };

        let mut rebound = false;

        for field in kind.collection().reference_fields {
            if let Some(value) = fields.get_mut(*field) {
                *value = community.clone();
                rebound = true;
            }
        }

        if !rebound {
            fields.insert(kind.primary_field().to_string(), community);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn document(value: Value) -> DependentDocument {
        DependentDocument {
            uuid: Uuid::now_v7(),
            document: value,
        }
    }

    #[test]
    fn notification_refs_skip_invalid_entries() {
        let first = Uuid::now_v7();
        let second = Uuid::now_v7();

        let resident = document(json!({
            "notifications": [first.to_string(), "not-a-uuid", 7, second.to_string()],
        }));

        assert_eq!(resident.notification_refs(), vec![first, second]);
    }

    #[test]
    fn notification_refs_default_to_empty() {
        assert!(document(json!({ "name": "Ana" })).notification_refs().is_empty());
        assert!(document(json!({ "notifications": "x" })).notification_refs().is_empty());
    }

    #[test]
    fn legacy_reference_field_counts_as_ownership() {
        let community = Uuid::now_v7();
        let worker = document(json!({ "communityAssigned": community.to_string() }));

        assert!(worker.is_owned_by(DependentKind::Workers, community));
        assert!(!worker.is_owned_by(DependentKind::Residents, community));
    }

    #[test]
    fn rebind_rewrites_every_present_reference_field() {
        let old = Uuid::now_v7();
        let new = Uuid::now_v7();

        let mut worker = document(json!({
            "name": "Sam",
            "community": old.to_string(),
            "communityAssigned": old.to_string(),
        }));

        worker.rebind_to(DependentKind::Workers, new);

        assert_eq!(worker.document["community"], json!(new.to_string()));
        assert_eq!(worker.document["communityAssigned"], json!(new.to_string()));
        assert_eq!(worker.document["name"], json!("Sam"));
    }

    #[test]
    fn rebind_keeps_legacy_only_documents_on_their_legacy_field() {
        let new = Uuid::now_v7();

        let mut worker = document(json!({ "communityAssigned": Uuid::now_v7().to_string() }));

        worker.rebind_to(DependentKind::Workers, new);

        assert_eq!(worker.document["communityAssigned"], json!(new.to_string()));
        assert!(worker.document.get("community").is_none());
    }

    #[test]
    fn rebind_sets_primary_field_when_no_reference_exists() {
        let new = Uuid::now_v7();

        let mut notification = document(json!({ "title": "Water outage" }));

        notification.rebind_to(DependentKind::Notifications, new);

        assert_eq!(notification.document["community"], json!(new.to_string()));
    }
}
