//! Ledger schema: one row per user.
//!
//! - `income` accumulates across income submissions.
//! - the three category/expense pairs are overwritten by each completed
//!   expense submission; a skipped pair is stored as `NULL` / `0.0`.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Ledgers {
    Table,
    UserId,
    DisplayName,
    Income,
    Category1,
    Expenses1,
    Category2,
    Expenses2,
    Category3,
    Expenses3,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ledgers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Ledgers::UserId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Ledgers::DisplayName).string().not_null())
                    .col(
                        ColumnDef::new(Ledgers::Income)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(Ledgers::Category1).string())
                    .col(ColumnDef::new(Ledgers::Expenses1).double())
                    .col(ColumnDef::new(Ledgers::Category2).string())
                    .col(ColumnDef::new(Ledgers::Expenses2).double())
                    .col(ColumnDef::new(Ledgers::Category3).string())
                    .col(ColumnDef::new(Ledgers::Expenses3).double())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ledgers::Table).to_owned())
            .await
    }
}
