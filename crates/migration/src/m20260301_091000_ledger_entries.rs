use sea_orm_migration::prelude::*;

use crate::m20260301_090000_expense_categories::ExpenseCategories;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Fund movements (`fund_in`/`fund_out`) and account transactions
/// (`income`/`expense`) of every domain share one append-only table, so a
/// single id sequence orders them.
#[derive(Iden)]
enum LedgerEntries {
    Table,
    Id,
    Domain,
    Kind,
    TransactionNumber,
    Purpose,
    Category,
    CategoryId,
    AmountMinor,
    Description,
    TransactionDate,
    CreatedBy,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LedgerEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerEntries::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LedgerEntries::Domain).string().not_null())
                    .col(ColumnDef::new(LedgerEntries::Kind).string().not_null())
                    .col(ColumnDef::new(LedgerEntries::TransactionNumber).string())
                    .col(ColumnDef::new(LedgerEntries::Purpose).string())
                    .col(ColumnDef::new(LedgerEntries::Category).string())
                    .col(ColumnDef::new(LedgerEntries::CategoryId).integer())
                    .col(
                        ColumnDef::new(LedgerEntries::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerEntries::Description).string())
                    .col(
                        ColumnDef::new(LedgerEntries::TransactionDate)
                            .date()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerEntries::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(LedgerEntries::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-ledger_entries-category_id")
                            .from(LedgerEntries::Table, LedgerEntries::CategoryId)
                            .to(ExpenseCategories::Table, ExpenseCategories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_entries-domain-transaction_date")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::Domain)
                    .col(LedgerEntries::TransactionDate)
                    .col(LedgerEntries::Id)
                    .to_owned(),
            )
            .await?;

        // NULLs are distinct in SQLite unique indexes, so fund movements
        // (no transaction number) never collide.
        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_entries-transaction_number-unique")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::TransactionNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LedgerEntries::Table).to_owned())
            .await?;
        Ok(())
    }
}
