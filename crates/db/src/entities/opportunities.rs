//! `SeaORM` Entity for crm.opportunities.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "crm", table_name = "opportunities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub partner_id: Option<Uuid>,
    pub lead_id: Option<Uuid>,
    pub stage: String,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub estimated_value: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub probability: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub weighted_value: Decimal,
    pub expected_close_date: Option<Date>,
    pub currency: String,
    pub closed_at: Option<DateTimeUtc>,
    pub lost_reason: Option<String>,
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
