//! `SeaORM` Entity for hr.payroll_entries.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "hr", table_name = "payroll_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub payroll_id: Uuid,
    pub employee_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub gross_pay: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub total_deductions: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub net_pay: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub employer_contribution: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::payrolls::Entity",
        from = "Column::PayrollId",
        to = "super::payrolls::Column::Id",
        on_delete = "Cascade"
    )]
    Payrolls,
    #[sea_orm(has_many = "super::payroll_entry_details::Entity")]
    PayrollEntryDetails,
}

impl Related<super::payrolls::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payrolls.def()
    }
}

impl Related<super::payroll_entry_details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PayrollEntryDetails.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
