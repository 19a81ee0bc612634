//! `SeaORM` Entity for hr.payroll_entry_details.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "hr", table_name = "payroll_entry_details")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub payroll_entry_id: Uuid,
    pub line_no: i32,
    pub kind: String,
    pub code: String,
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub amount: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::payroll_entries::Entity",
        from = "Column::PayrollEntryId",
        to = "super::payroll_entries::Column::Id",
        on_delete = "Cascade"
    )]
    PayrollEntries,
}

impl Related<super::payroll_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PayrollEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
