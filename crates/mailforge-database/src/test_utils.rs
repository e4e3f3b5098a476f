//! Test utilities for database integration tests
//!
//! Provides an in-memory sqlite database with the full schema applied, so
//! service crates can run their integration tests without external
//! infrastructure. Each `TestDatabase` owns its own connection and schema;
//! tests are fully isolated from each other.

use crate::DbConnection;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, Database};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use mailforge_migrations::Migrator;

/// Test database backed by in-memory sqlite
pub struct TestDatabase {
    pub db: Arc<DbConnection>,
}

impl TestDatabase {
    /// Create a fresh database with all migrations applied
    pub async fn with_migrations() -> anyhow::Result<Self> {
        let db = Database::connect("sqlite::memory:")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to open in-memory database: {}", e))?;

        Migrator::up(&db, None)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Get the database connection
    pub fn connection(&self) -> &DbConnection {
        &self.db
    }

    /// Get the database connection as Arc
    pub fn connection_arc(&self) -> Arc<DbConnection> {
        Arc::clone(&self.db)
    }
}

/// Insert a tenant and workspace, returning the workspace id
///
/// Most provisioning tests need a workspace to hang domains and mailboxes
/// off; this keeps that boilerplate in one place.
pub async fn seed_workspace(db: &DbConnection) -> anyhow::Result<i32> {
    use mailforge_entities::{tenants, workspaces};

    let tenant = tenants::ActiveModel {
        name: Set("test-tenant".to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let workspace = workspaces::ActiveModel {
        tenant_id: Set(tenant.id),
        name: Set("test-workspace".to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(workspace.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

    #[tokio::test]
    async fn test_database_setup() -> anyhow::Result<()> {
        let test_db = TestDatabase::with_migrations().await?;

        let statement =
            Statement::from_string(DatabaseBackend::Sqlite, "SELECT 1".to_owned());
        let result = test_db.db.query_one(statement).await?;
        assert!(result.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_migrations_create_tables() -> anyhow::Result<()> {
        let test_db = TestDatabase::with_migrations().await?;

        for table in ["tenants", "workspaces", "domains", "mailboxes", "events"] {
            let statement = Statement::from_string(
                DatabaseBackend::Sqlite,
                format!(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name='{}'",
                    table
                ),
            );
            let result = test_db.db.query_one(statement).await?;
            assert!(result.is_some(), "table {} should exist", table);
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_workspace() -> anyhow::Result<()> {
        let test_db = TestDatabase::with_migrations().await?;
        let workspace_id = seed_workspace(test_db.connection()).await?;
        assert!(workspace_id > 0);
        Ok(())
    }
}
