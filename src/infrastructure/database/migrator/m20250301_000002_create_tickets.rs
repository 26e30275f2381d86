//! Migration to create tickets table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tickets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tickets::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tickets::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Tickets::Description).text().not_null())
                    .col(
                        ColumnDef::new(Tickets::Status)
                            .string_len(20)
                            .not_null()
                            .default("TODO"),
                    )
                    .col(ColumnDef::new(Tickets::Priority).string_len(10).null())
                    .col(ColumnDef::new(Tickets::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Tickets::AssignedTo).string().null())
                    .col(ColumnDef::new(Tickets::HelpfulNotes).text().null())
                    .col(
                        ColumnDef::new(Tickets::RelatedSkills)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Tickets::Deadline)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Tickets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tickets::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_creator")
                            .from(Tickets::Table, Tickets::CreatedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_assignee")
                            .from(Tickets::Table, Tickets::AssignedTo)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tickets_created_by")
                    .table(Tickets::Table)
                    .col(Tickets::CreatedBy)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tickets_status")
                    .table(Tickets::Table)
                    .col(Tickets::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tickets::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Tickets {
    Table,
    Id,
    Title,
    Description,
    Status,
    Priority,
    CreatedBy,
    AssignedTo,
    HelpfulNotes,
    RelatedSkills,
    Deadline,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
