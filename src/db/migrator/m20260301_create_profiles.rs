use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Profiles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Profiles::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Profiles::Name).string())
                    .col(ColumnDef::new(Profiles::Bio).text())
                    .col(ColumnDef::new(Profiles::Avatar).text())
                    .col(ColumnDef::new(Profiles::AvatarHd).text())
                    .col(
                        ColumnDef::new(Profiles::IsVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Profiles::IsBusiness)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Profiles::PostsCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Profiles::FollowersCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Profiles::FollowingCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Profiles::ExternalLink).text())
                    .col(
                        ColumnDef::new(Profiles::BioLinks)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Profiles::PostsData)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Profiles::RawData)
                            .text()
                            .not_null()
                            .default("{}"),
                    )
                    .col(ColumnDef::new(Profiles::LastFetchedAt).string())
                    .col(ColumnDef::new(Profiles::InsightsData).text())
                    .col(ColumnDef::new(Profiles::StrategyData).text())
                    .col(ColumnDef::new(Profiles::PersonasData).text())
                    .col(ColumnDef::new(Profiles::InsightsGeneratedAt).string())
                    .col(ColumnDef::new(Profiles::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Profiles::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Profiles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Profiles {
    Table,
    Id,
    Username,
    Name,
    Bio,
    Avatar,
    AvatarHd,
    IsVerified,
    IsBusiness,
    PostsCount,
    FollowersCount,
    FollowingCount,
    ExternalLink,
    BioLinks,
    PostsData,
    RawData,
    LastFetchedAt,
    InsightsData,
    StrategyData,
    PersonasData,
    InsightsGeneratedAt,
    CreatedAt,
    UpdatedAt,
}
