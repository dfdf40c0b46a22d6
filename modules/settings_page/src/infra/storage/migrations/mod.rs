//! Database migrations for the settings page

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250301_000001_create_options::Migration)]
    }
}

mod m20250301_000001_create_options {
    use super::*;

    #[derive(DeriveMigrationName)]
    pub struct Migration;

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SettingsPageOptions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SettingsPageOptions::OptionName)
                                .string()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(SettingsPageOptions::OptionValue).json().not_null())
                        .col(
                            ColumnDef::new(SettingsPageOptions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(
                            ColumnDef::new(SettingsPageOptions::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SettingsPageOptions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum SettingsPageOptions {
        Table,
        OptionName,
        OptionValue,
        CreatedAt,
        UpdatedAt,
    }
}
