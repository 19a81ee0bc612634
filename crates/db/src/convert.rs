//! Helpers for mapping entity models to domain records and back.

use sea_orm::DbErr;

/// Builds an `AuditInfo` from a model with the standard audit columns.
macro_rules! audit_info {
    ($model:expr) => {
        tessera_core::AuditInfo {
            created_at: $model.created_at,
            created_by: $model.created_by,
            updated_at: $model.updated_at,
            updated_by: $model.updated_by,
            deleted_at: $model.deleted_at,
            deleted_by: $model.deleted_by,
            is_deleted: $model.is_deleted,
        }
    };
}

/// Sets the audit columns of an active model.
macro_rules! apply_audit {
    ($active:expr, $audit:expr) => {{
        let audit = $audit;
        $active.created_at = sea_orm::Set(audit.created_at);
        $active.created_by = sea_orm::Set(audit.created_by);
        $active.updated_at = sea_orm::Set(audit.updated_at);
        $active.updated_by = sea_orm::Set(audit.updated_by);
        $active.deleted_at = sea_orm::Set(audit.deleted_at);
        $active.deleted_by = sea_orm::Set(audit.deleted_by);
        $active.is_deleted = sea_orm::Set(audit.is_deleted);
    }};
}

/// Builds `DocumentPricing` from a header model carrying the pricing columns.
macro_rules! document_pricing {
    ($model:expr) => {
        tessera_core::document::DocumentPricing {
            currency: $model.currency.clone(),
            exchange_rate: $model.exchange_rate,
            totals: tessera_core::document::DocumentTotals {
                subtotal: $model.subtotal,
                discount_total: $model.discount_total,
                tax_total: $model.tax_total,
                grand_total: $model.grand_total,
            },
            base_grand_total: $model.base_grand_total,
        }
    };
}

/// Sets the pricing columns of a header active model.
macro_rules! apply_pricing {
    ($active:expr, $pricing:expr) => {{
        let pricing = $pricing;
        $active.currency = sea_orm::Set(pricing.currency.clone());
        $active.exchange_rate = sea_orm::Set(pricing.exchange_rate);
        $active.subtotal = sea_orm::Set(pricing.totals.subtotal);
        $active.discount_total = sea_orm::Set(pricing.totals.discount_total);
        $active.tax_total = sea_orm::Set(pricing.totals.tax_total);
        $active.grand_total = sea_orm::Set(pricing.totals.grand_total);
        $active.base_grand_total = sea_orm::Set(pricing.base_grand_total);
    }};
}

pub(crate) use {apply_audit, apply_pricing, audit_info, document_pricing};

/// Parses a stored status string into its domain enum.
pub(crate) fn decode<T>(what: &str, value: &str, parse: fn(&str) -> Option<T>) -> Result<T, DbErr> {
    parse(value).ok_or_else(|| DbErr::Type(format!("unknown {what} '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::sales::QuoteStatus;

    #[test]
    fn test_decode_known_status() {
        let status = decode("quote status", "sent", QuoteStatus::parse).unwrap();
        assert_eq!(status, QuoteStatus::Sent);
    }

    #[test]
    fn test_decode_unknown_status() {
        let err = decode("quote status", "bogus", QuoteStatus::parse).unwrap_err();
        assert!(err.to_string().contains("unknown quote status 'bogus'"));
    }
}
