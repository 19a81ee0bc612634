//! `SeaORM` Entity for sales.commission_rules.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "sales", table_name = "commission_rules")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub salesperson_id: Option<Uuid>,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub min_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub max_amount: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((7, 4)))")]
    pub rate_percent: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub flat_amount: Decimal,
    pub priority: i32,
    pub is_active: bool,
    pub effective_from: Date,
    pub effective_to: Option<Date>,
    pub created_at: DateTimeUtc,
    pub created_by: Option<Uuid>,
    pub updated_at: DateTimeUtc,
    pub updated_by: Option<Uuid>,
    pub deleted_at: Option<DateTimeUtc>,
    pub deleted_by: Option<Uuid>,
    pub is_deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
