//! Database connection management

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::sync::Arc;
use tracing::info;
use mailforge_core::settings::AppSettings;
use mailforge_migrations::{Migrator, MigratorTrait};

pub type DbConnection = DatabaseConnection;

/// Connect to the configured database and bring the schema up to date
pub async fn establish_connection(settings: &AppSettings) -> Result<Arc<DbConnection>, DbErr> {
    let mut opt = ConnectOptions::new(settings.database_url.as_str());
    opt.max_connections(100).min_connections(5);

    let db = Database::connect(opt).await?;
    info!("Database connection established");

    Migrator::up(&db, None).await?;
    info!("Schema migrations applied");

    Ok(Arc::new(db))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::EntityTrait;

    #[tokio::test]
    async fn test_establish_connection_applies_schema() {
        let settings = AppSettings {
            database_url: "sqlite::memory:".to_string(),
            hostname: None,
            dkim: Default::default(),
            dns: None,
            storage: Default::default(),
        };

        let db = establish_connection(&settings).await.unwrap();

        // The migrated tables are queryable
        let domains = mailforge_entities::domains::Entity::find()
            .all(db.as_ref())
            .await
            .unwrap();
        assert!(domains.is_empty());
    }
}
