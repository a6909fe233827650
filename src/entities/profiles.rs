use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,

    pub name: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub avatar: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub avatar_hd: Option<String>,
    pub is_verified: bool,
    pub is_business: bool,
    pub posts_count: i64,
    pub followers_count: i64,
    pub following_count: i64,
    #[sea_orm(column_type = "Text", nullable)]
    pub external_link: Option<String>,

    /// JSON array of `{title, url}`
    #[sea_orm(column_type = "Text")]
    pub bio_links: String,
    /// JSON array of normalized posts
    #[sea_orm(column_type = "Text")]
    pub posts_data: String,
    #[sea_orm(column_type = "Text")]
    pub raw_data: String,
    pub last_fetched_at: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub insights_data: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub strategy_data: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub personas_data: Option<String>,
    pub insights_generated_at: Option<String>,

    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::search_history::Entity")]
    SearchHistory,
}

impl Related<super::search_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SearchHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
