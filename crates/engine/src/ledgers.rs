//! Ledgers table: one row per user.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ledgers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub display_name: String,
    pub income: f64,
    pub category1: Option<String>,
    pub expenses1: Option<f64>,
    pub category2: Option<String>,
    pub expenses2: Option<f64>,
    pub category3: Option<String>,
    pub expenses3: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
