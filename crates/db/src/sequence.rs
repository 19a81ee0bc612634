//! Per-tenant document numbering.

use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect, Set};
use uuid::Uuid;

use crate::entities::number_sequences;

/// Prefixes of the numbered documents.
pub mod prefix {
    /// Journal entries.
    pub const JOURNAL_ENTRY: &str = "JE";
    /// Credit notes.
    pub const CREDIT_NOTE: &str = "CN";
    /// Sales quotes.
    pub const SALES_QUOTE: &str = "QT";
    /// Sales orders.
    pub const SALES_ORDER: &str = "SO";
    /// Sales invoices.
    pub const SALES_INVOICE: &str = "INV";
    /// Shipments.
    pub const SHIPMENT: &str = "SHP";
    /// Sales returns.
    pub const SALES_RETURN: &str = "RMA";
    /// Purchase quotes.
    pub const PURCHASE_QUOTE: &str = "PQ";
    /// Purchase orders.
    pub const PURCHASE_ORDER: &str = "PO";
    /// Goods receipts.
    pub const GOODS_RECEIPT: &str = "GRN";
    /// Supplier bills.
    pub const SUPPLIER_BILL: &str = "BILL";
    /// Payroll runs.
    pub const PAYROLL: &str = "PAY";
}

/// Formats a sequence value as `PREFIX-000001`.
#[must_use]
pub fn format_number(prefix: &str, value: i64) -> String {
    format!("{prefix}-{value:06}")
}

/// Issues the next number for `prefix`.
///
/// Must run inside the transaction that creates the document: the counter
/// row stays locked until it commits, so concurrent creators queue up and a
/// rolled-back creation does not consume a number.
pub async fn next_number<C: ConnectionTrait>(db: &C, tenant_id: Uuid, prefix: &str) -> Result<String, DbErr> {
    number_sequences::Entity::insert(number_sequences::ActiveModel {
        tenant_id: Set(tenant_id),
        prefix: Set(prefix.to_string()),
        next_value: Set(1),
    })
    .on_conflict(
        OnConflict::columns([number_sequences::Column::TenantId, number_sequences::Column::Prefix])
            .do_nothing()
            .to_owned(),
    )
    .do_nothing()
    .exec(db)
    .await?;

    let counter = number_sequences::Entity::find()
        .filter(number_sequences::Column::TenantId.eq(tenant_id))
        .filter(number_sequences::Column::Prefix.eq(prefix))
        .lock_exclusive()
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("number sequence {prefix}")))?;

    let value = counter.next_value;
    let mut active: number_sequences::ActiveModel = counter.into();
    active.next_value = Set(value + 1);
    active.update(db).await?;

    Ok(format_number(prefix, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_pads_to_six_digits() {
        assert_eq!(format_number(prefix::SALES_ORDER, 1), "SO-000001");
        assert_eq!(format_number(prefix::SUPPLIER_BILL, 1234), "BILL-001234");
        assert_eq!(format_number("X", 1_234_567), "X-1234567");
    }
}
