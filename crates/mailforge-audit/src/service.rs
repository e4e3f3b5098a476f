use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use std::sync::Arc;
use tracing::debug;
use mailforge_database::DbConnection;
use mailforge_entities::events;

use crate::AuditEvent;

pub struct AuditService {
    db: Arc<DbConnection>,
}

impl AuditService {
    pub fn new(db: Arc<DbConnection>) -> Self {
        Self { db }
    }

    /// Append an audit event for a workspace
    pub async fn record(
        &self,
        workspace_id: i32,
        event: &AuditEvent,
    ) -> anyhow::Result<events::Model> {
        let row = events::ActiveModel {
            workspace_id: Set(workspace_id),
            event_type: Set(event.event_type().to_string()),
            payload: Set(event.payload()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let result = row
            .insert(self.db.as_ref())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to record audit event: {}", e))?;

        debug!(
            "Recorded {} event for workspace {}",
            result.event_type, workspace_id
        );

        Ok(result)
    }

    /// Most recent events for a workspace, newest first
    pub async fn recent_events(
        &self,
        workspace_id: i32,
        limit: u64,
    ) -> anyhow::Result<Vec<events::Model>> {
        let results = events::Entity::find()
            .filter(events::Column::WorkspaceId.eq(workspace_id))
            .order_by_desc(events::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;

        Ok(results)
    }

    /// Events of a given type for a workspace, newest first
    pub async fn events_of_type(
        &self,
        workspace_id: i32,
        event_type: &str,
    ) -> anyhow::Result<Vec<events::Model>> {
        let results = events::Entity::find()
            .filter(events::Column::WorkspaceId.eq(workspace_id))
            .filter(events::Column::EventType.eq(event_type))
            .order_by_desc(events::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;

        Ok(results)
    }
}
