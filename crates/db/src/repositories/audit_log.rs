//! Audit log repository. Entries are only ever inserted.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use budgetrack_core::audit::{AuditAction, AuditEntry, AuditFilter, NewAuditEntry};
use budgetrack_shared::types::{AuditLogId, UserId};

use super::now;
use crate::entities::audit_logs;
use crate::entities::sea_orm_active_enums::AuditAction as DbAuditAction;

/// Audit log repository.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    db: DatabaseConnection,
}

impl AuditLogRepository {
    /// Creates a new audit log repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists entries, oldest first.
    pub async fn list(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>, sea_orm::DbErr> {
        let mut query = audit_logs::Entity::find();
        if let Some(entity_type) = filter.entity_type.as_deref() {
            query = query.filter(audit_logs::Column::EntityType.eq(entity_type));
        }
        if let Some(entity_id) = filter.entity_id {
            query = query.filter(audit_logs::Column::EntityId.eq(entity_id));
        }

        let models = query
            .order_by_asc(audit_logs::Column::CreatedAt)
            .order_by_asc(audit_logs::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(to_entry).collect())
    }

    /// Appends an entry on the given connection, usually an open transaction.
    pub(crate) async fn append<C: ConnectionTrait>(
        conn: &C,
        entry: NewAuditEntry,
    ) -> Result<AuditEntry, sea_orm::DbErr> {
        let model = audit_logs::ActiveModel {
            id: Set(AuditLogId::new().into_inner()),
            entity_type: Set(entry.entity_type),
            entity_id: Set(entry.entity_id),
            action: Set(to_db_action(entry.action)),
            user_id: Set(entry.user_id.into_inner()),
            diff: Set(entry.diff),
            created_at: Set(now()),
        }
        .insert(conn)
        .await?;

        Ok(to_entry(model))
    }
}

const fn to_db_action(action: AuditAction) -> DbAuditAction {
    match action {
        AuditAction::Create => DbAuditAction::Create,
        AuditAction::Update => DbAuditAction::Update,
    }
}

fn to_entry(model: audit_logs::Model) -> AuditEntry {
    AuditEntry {
        id: AuditLogId::from_uuid(model.id),
        entity_type: model.entity_type,
        entity_id: model.entity_id,
        action: match model.action {
            DbAuditAction::Create => AuditAction::Create,
            DbAuditAction::Update => AuditAction::Update,
        },
        user_id: UserId::from_uuid(model.user_id),
        diff: model.diff,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
