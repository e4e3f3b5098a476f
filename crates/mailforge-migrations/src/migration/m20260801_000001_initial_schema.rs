use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ========================================
        // TENANTS TABLE
        // ========================================
        manager
            .create_table(
                Table::create()
                    .table(Tenants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tenants::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tenants::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Tenants::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // ========================================
        // WORKSPACES TABLE
        // ========================================
        manager
            .create_table(
                Table::create()
                    .table(Workspaces::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Workspaces::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Workspaces::TenantId).integer().not_null())
                    .col(ColumnDef::new(Workspaces::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Workspaces::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_workspaces_tenant")
                            .from(Workspaces::Table, Workspaces::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_workspaces_tenant_id")
                    .table(Workspaces::Table)
                    .col(Workspaces::TenantId)
                    .to_owned(),
            )
            .await?;

        // ========================================
        // DOMAINS TABLE
        // ========================================
        manager
            .create_table(
                Table::create()
                    .table(Domains::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Domains::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Domains::WorkspaceId).integer().not_null())
                    .col(
                        ColumnDef::new(Domains::Domain)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Domains::Hostname).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Domains::DkimSelector)
                            .string_len(63)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Domains::DkimPrivatePath).string_len(255))
                    .col(ColumnDef::new(Domains::DkimPublicKey).text())
                    .col(ColumnDef::new(Domains::SpfPolicy).text())
                    .col(ColumnDef::new(Domains::DmarcPolicy).text())
                    .col(
                        ColumnDef::new(Domains::Status)
                            .string_len(50)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Domains::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Domains::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_domains_workspace")
                            .from(Domains::Table, Domains::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_domains_workspace_id")
                    .table(Domains::Table)
                    .col(Domains::WorkspaceId)
                    .to_owned(),
            )
            .await?;

        // ========================================
        // MAILBOXES TABLE
        // ========================================
        manager
            .create_table(
                Table::create()
                    .table(Mailboxes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Mailboxes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Mailboxes::WorkspaceId).integer().not_null())
                    .col(ColumnDef::new(Mailboxes::DomainId).integer().not_null())
                    .col(
                        ColumnDef::new(Mailboxes::LocalPart)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Mailboxes::PasswordHash)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Mailboxes::QuotaMb)
                            .integer()
                            .not_null()
                            .default(1024),
                    )
                    .col(
                        ColumnDef::new(Mailboxes::Status)
                            .string_len(50)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Mailboxes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Mailboxes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mailboxes_workspace")
                            .from(Mailboxes::Table, Mailboxes::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mailboxes_domain")
                            .from(Mailboxes::Table, Mailboxes::DomainId)
                            .to(Domains::Table, Domains::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // (local_part, domain_id) uniqueness is the last line of defense
        // against provisioning races
        manager
            .create_index(
                Index::create()
                    .name("idx_mailboxes_domain_local_part")
                    .table(Mailboxes::Table)
                    .col(Mailboxes::DomainId)
                    .col(Mailboxes::LocalPart)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ========================================
        // EVENTS TABLE
        // ========================================
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Events::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Events::WorkspaceId).integer().not_null())
                    .col(
                        ColumnDef::new(Events::EventType)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Events::Payload).json().not_null())
                    .col(
                        ColumnDef::new(Events::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_workspace")
                            .from(Events::Table, Events::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_events_workspace_type")
                    .table(Events::Table)
                    .col(Events::WorkspaceId)
                    .col(Events::EventType)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Mailboxes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Domains::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Workspaces::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tenants::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Tenants {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Workspaces {
    Table,
    Id,
    TenantId,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Domains {
    Table,
    Id,
    WorkspaceId,
    Domain,
    Hostname,
    DkimSelector,
    DkimPrivatePath,
    DkimPublicKey,
    SpfPolicy,
    DmarcPolicy,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Mailboxes {
    Table,
    Id,
    WorkspaceId,
    DomainId,
    LocalPart,
    PasswordHash,
    QuotaMb,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
    WorkspaceId,
    EventType,
    Payload,
    CreatedAt,
}
