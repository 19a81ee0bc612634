//! Child rows of commercial documents.
//!
//! Sales and procurement each keep their lines in one table keyed by
//! `(document_type, document_id)`.

use std::collections::HashMap;

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};
use tessera_core::document::DocumentLine;
use uuid::Uuid;

use crate::entities::{procurement_document_lines, sales_document_lines};

/// Document type keys stored in the line tables.
pub mod doc_type {
    /// Sales quote.
    pub const SALES_QUOTE: &str = "sales_quote";
    /// Sales order.
    pub const SALES_ORDER: &str = "sales_order";
    /// Sales invoice.
    pub const SALES_INVOICE: &str = "sales_invoice";
    /// Purchase quote.
    pub const PURCHASE_QUOTE: &str = "purchase_quote";
    /// Purchase order.
    pub const PURCHASE_ORDER: &str = "purchase_order";
    /// Supplier bill.
    pub const SUPPLIER_BILL: &str = "supplier_bill";
}

macro_rules! line_store {
    ($store:ident, $entity:ident) => {
        /// Line persistence for one module's line table.
        pub(crate) mod $store {
            use super::*;
            use crate::entities::$entity::{ActiveModel, Column, Entity, Model};

            fn to_line(model: Model) -> DocumentLine {
                DocumentLine {
                    id: model.id,
                    line_no: model.line_no,
                    item_code: model.item_code,
                    description: model.description,
                    quantity: model.quantity,
                    unit_price: model.unit_price,
                    discount_percent: model.discount_percent,
                    tax_percent: model.tax_percent,
                    delivered_quantity: model.delivered_quantity,
                }
            }

            fn to_active(document_type: &str, document_id: Uuid, line: &DocumentLine) -> ActiveModel {
                ActiveModel {
                    id: Set(line.id),
                    document_type: Set(document_type.to_string()),
                    document_id: Set(document_id),
                    line_no: Set(line.line_no),
                    item_code: Set(line.item_code.clone()),
                    description: Set(line.description.clone()),
                    quantity: Set(line.quantity),
                    unit_price: Set(line.unit_price),
                    discount_percent: Set(line.discount_percent),
                    tax_percent: Set(line.tax_percent),
                    delivered_quantity: Set(line.delivered_quantity),
                }
            }

            /// Loads the lines of one document in line order.
            pub async fn load<C: ConnectionTrait>(
                db: &C,
                document_type: &str,
                document_id: Uuid,
            ) -> Result<Vec<DocumentLine>, DbErr> {
                let models = Entity::find()
                    .filter(Column::DocumentType.eq(document_type))
                    .filter(Column::DocumentId.eq(document_id))
                    .order_by_asc(Column::LineNo)
                    .all(db)
                    .await?;
                Ok(models.into_iter().map(to_line).collect())
            }

            /// Loads the lines of many documents, grouped by document id.
            pub async fn load_many<C: ConnectionTrait>(
                db: &C,
                document_type: &str,
                document_ids: &[Uuid],
            ) -> Result<HashMap<Uuid, Vec<DocumentLine>>, DbErr> {
                let mut grouped: HashMap<Uuid, Vec<DocumentLine>> = HashMap::new();
                if document_ids.is_empty() {
                    return Ok(grouped);
                }
                let models = Entity::find()
                    .filter(Column::DocumentType.eq(document_type))
                    .filter(Column::DocumentId.is_in(document_ids.iter().copied()))
                    .order_by_asc(Column::LineNo)
                    .all(db)
                    .await?;
                for model in models {
                    grouped.entry(model.document_id).or_default().push(to_line(model));
                }
                Ok(grouped)
            }

            /// Replaces every line of one document.
            pub async fn replace<C: ConnectionTrait>(
                db: &C,
                document_type: &str,
                document_id: Uuid,
                lines: &[DocumentLine],
            ) -> Result<(), DbErr> {
                Entity::delete_many()
                    .filter(Column::DocumentType.eq(document_type))
                    .filter(Column::DocumentId.eq(document_id))
                    .exec(db)
                    .await?;
                if lines.is_empty() {
                    return Ok(());
                }
                Entity::insert_many(lines.iter().map(|line| to_active(document_type, document_id, line)))
                    .exec(db)
                    .await?;
                Ok(())
            }
        }
    };
}

line_store!(sales_lines, sales_document_lines);
line_store!(procurement_lines, procurement_document_lines);
