use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "category")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// Icon identifier or emoji shown next to the name.
    pub icon: Option<String>,

    #[sea_orm(default_value = 0)]
    pub display_order: i32,
    /// Number of published tutorials in this category.
    #[sea_orm(default_value = 0)]
    pub tutorial_count: i32,

    #[sea_orm(has_many)]
    pub tutorials: HasMany<super::tutorial::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
