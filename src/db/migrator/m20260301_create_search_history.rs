use sea_orm_migration::prelude::*;

use super::m20260301_create_profiles::Profiles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SearchHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SearchHistory::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SearchHistory::CallerId).string().not_null())
                    .col(ColumnDef::new(SearchHistory::ProfileId).integer().not_null())
                    .col(ColumnDef::new(SearchHistory::SearchedAt).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_search_history_profile")
                            .from(SearchHistory::Table, SearchHistory::ProfileId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_search_history_caller_profile")
                    .table(SearchHistory::Table)
                    .col(SearchHistory::CallerId)
                    .col(SearchHistory::ProfileId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_search_history_caller_searched")
                    .table(SearchHistory::Table)
                    .col(SearchHistory::CallerId)
                    .col(SearchHistory::SearchedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SearchHistory::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SearchHistory {
    Table,
    Id,
    CallerId,
    ProfileId,
    SearchedAt,
}
