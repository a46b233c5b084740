//! Append-only audit trail types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use budgetrack_shared::types::{AuditLogId, UserId};

/// Entity type recorded for purchase order mutations.
pub const PURCHASE_ORDER_ENTITY: &str = "PurchaseOrder";

/// Kind of mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    /// Entity created.
    Create,
    /// Entity updated.
    Update,
}

impl AuditAction {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
        }
    }

    /// Parses the stored representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CREATE" => Some(Self::Create),
            "UPDATE" => Some(Self::Update),
            _ => None,
        }
    }
}

/// An audit entry to be appended.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditEntry {
    /// Entity type, e.g. `PurchaseOrder`.
    pub entity_type: String,
    /// Entity ID.
    pub entity_id: Uuid,
    /// Mutation kind.
    pub action: AuditAction,
    /// Acting user.
    pub user_id: UserId,
    /// Snapshot (create) or raw update payload.
    pub diff: serde_json::Value,
}

impl NewAuditEntry {
    /// Entry for a newly created entity.
    #[must_use]
    pub fn created(
        entity_type: &str,
        entity_id: Uuid,
        user_id: UserId,
        snapshot: serde_json::Value,
    ) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            entity_id,
            action: AuditAction::Create,
            user_id,
            diff: snapshot,
        }
    }

    /// Entry for an update.
    #[must_use]
    pub fn updated(
        entity_type: &str,
        entity_id: Uuid,
        user_id: UserId,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            entity_id,
            action: AuditAction::Update,
            user_id,
            diff: payload,
        }
    }
}

/// A stored audit entry. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// Entry ID.
    pub id: AuditLogId,
    /// Entity type.
    pub entity_type: String,
    /// Entity ID.
    pub entity_id: Uuid,
    /// Mutation kind.
    pub action: AuditAction,
    /// Acting user.
    pub user_id: UserId,
    /// Recorded payload.
    pub diff: serde_json::Value,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
}

/// Filters for querying the audit trail.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFilter {
    /// Only entries for this entity type.
    pub entity_type: Option<String>,
    /// Only entries for this entity.
    pub entity_id: Option<Uuid>,
}
