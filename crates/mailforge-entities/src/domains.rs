//! `SeaORM` Entity for domains table
//!
//! One row per provisioned email domain. The selector/key/public-key/status
//! columns are mutated only by DKIM rotation; everything else is set once at
//! provisioning time.

use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, ConnectionTrait, DbErr};
use serde::{Deserialize, Serialize};
use mailforge_core::DBDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "domains")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub workspace_id: i32,
    /// Normalized lowercase domain name, globally unique
    #[sea_orm(unique)]
    pub domain: String,
    /// Mail server hostname, e.g. "mail.example.com"
    pub hostname: String,
    /// Active DKIM selector; at most one per domain
    pub dkim_selector: String,
    pub dkim_private_path: Option<String>,
    pub dkim_public_key: Option<String>,
    pub spf_policy: Option<String>,
    pub dmarc_policy: Option<String>,
    /// pending, active, provisioned, suspended
    pub status: String,
    pub created_at: DBDateTime,
    pub updated_at: DBDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::workspaces::Entity",
        from = "Column::WorkspaceId",
        to = "super::workspaces::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Workspaces,
    #[sea_orm(has_many = "super::mailboxes::Entity")]
    Mailboxes,
}

impl Related<super::workspaces::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workspaces.def()
    }
}

impl Related<super::mailboxes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Mailboxes.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now();

        if insert {
            if self.created_at.is_not_set() {
                self.created_at = Set(now);
            }
            if self.updated_at.is_not_set() {
                self.updated_at = Set(now);
            }
        } else {
            self.updated_at = Set(now);
        }

        Ok(self)
    }
}
