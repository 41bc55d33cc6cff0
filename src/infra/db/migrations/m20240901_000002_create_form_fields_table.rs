//! Migration: Create the form_fields table for administrator-defined fields.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FormFields::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FormFields::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FormFields::Label).string_len(200).not_null())
                    .col(
                        ColumnDef::new(FormFields::FieldType)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FormFields::IsRequired)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(FormFields::FieldOrder).integer().not_null())
                    .col(
                        ColumnDef::new(FormFields::Options)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(FormFields::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FormFields::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // The listing always sorts by (field_order, id)
        manager
            .create_index(
                Index::create()
                    .name("idx_form_fields_order")
                    .table(FormFields::Table)
                    .col(FormFields::FieldOrder)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FormFields::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum FormFields {
    Table,
    Id,
    Label,
    FieldType,
    IsRequired,
    FieldOrder,
    Options,
    CreatedAt,
    UpdatedAt,
}
