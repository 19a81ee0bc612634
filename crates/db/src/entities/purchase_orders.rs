//! `SeaORM` Entity for procurement.purchase_orders.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "procurement", table_name = "purchase_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub number: String,
    pub supplier_id: Uuid,
    pub order_date: Date,
    pub expected_date: Option<Date>,
    pub purchase_quote_id: Option<Uuid>,
    pub status: String,
    pub approved_at: Option<DateTimeUtc>,
    pub approved_by: Option<Uuid>,
    pub notes: Option<String>,
    pub currency: String,
    #[sea_orm(column_type = "Decimal(Some((19, 10)))")]
    pub exchange_rate: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub subtotal: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub discount_total: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub tax_total: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub grand_total: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub base_grand_total: Decimal,
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
