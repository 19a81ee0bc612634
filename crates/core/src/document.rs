//! Line items and totals shared by sales and purchase documents.
//!
//! Per line:
//! - `net = quantity * unit_price * (1 - discount_percent / 100)`
//! - `tax = net * tax_percent / 100`
//!
//! Each amount is rounded to two places. Documents freeze their currency and
//! exchange rate at creation; `base_grand_total = grand_total * exchange_rate`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tessera_shared::types::{convert_amount, round_money};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::guard;
use crate::macros::text_enum;

text_enum! {
    /// Owner type of a stored document line.
    DocumentKind {
        /// Sales quote.
        SalesQuote => "sales_quote",
        /// Sales order.
        SalesOrder => "sales_order",
        /// Sales invoice.
        SalesInvoice => "sales_invoice",
        /// Purchase quote.
        PurchaseQuote => "purchase_quote",
        /// Purchase order.
        PurchaseOrder => "purchase_order",
        /// Supplier bill.
        SupplierBill => "supplier_bill",
    }
}

/// One priced line of a commercial document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentLine {
    /// Unique identifier.
    pub id: Uuid,
    /// 1-based position.
    pub line_no: i32,
    /// Item or service code.
    pub item_code: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Quantity ordered.
    pub quantity: Decimal,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Discount in percent.
    pub discount_percent: Decimal,
    /// Tax in percent.
    pub tax_percent: Decimal,
    /// Quantity delivered or received so far.
    pub delivered_quantity: Decimal,
}

/// Input for a document line.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentLineInput {
    /// Item or service code.
    pub item_code: String,
    /// Description.
    pub description: Option<String>,
    /// Quantity.
    pub quantity: Decimal,
    /// Unit price.
    pub unit_price: Decimal,
    /// Discount percent.
    #[serde(default)]
    pub discount_percent: Decimal,
    /// Tax percent.
    #[serde(default)]
    pub tax_percent: Decimal,
}

impl From<&DocumentLine> for DocumentLineInput {
    fn from(line: &DocumentLine) -> Self {
        Self {
            item_code: line.item_code.clone(),
            description: line.description.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            discount_percent: line.discount_percent,
            tax_percent: line.tax_percent,
        }
    }
}

impl DocumentLine {
    /// Builds and validates a line.
    ///
    /// # Errors
    ///
    /// Fails for an empty item code, non-positive quantity, negative price,
    /// a line amount above [`guard::MAX_AMOUNT`], or percentages outside `0..=100`.
    pub fn build(line_no: i32, input: DocumentLineInput) -> DomainResult<Self> {
        let quantity = guard::positive("quantity", input.quantity)?;
        let unit_price = guard::non_negative("unit price", input.unit_price)?;
        guard::product("line amount", quantity, unit_price)?;
        Ok(Self {
            id: Uuid::now_v7(),
            line_no,
            item_code: guard::required("item code", &input.item_code)?,
            description: guard::optional(input.description),
            quantity,
            unit_price,
            discount_percent: guard::percentage("discount percent", input.discount_percent)?,
            tax_percent: guard::percentage("tax percent", input.tax_percent)?,
            delivered_quantity: Decimal::ZERO,
        })
    }

    /// `quantity * unit_price`, rounded.
    #[must_use]
    pub fn gross_amount(&self) -> Decimal {
        round_money(self.quantity * self.unit_price)
    }

    /// Amount after discount, rounded.
    #[must_use]
    pub fn net_amount(&self) -> Decimal {
        round_money(
            self.quantity * self.unit_price * (Decimal::ONE - self.discount_percent / Decimal::ONE_HUNDRED),
        )
    }

    /// Discount given on the line.
    #[must_use]
    pub fn discount_amount(&self) -> Decimal {
        self.gross_amount() - self.net_amount()
    }

    /// Tax on the net amount, rounded.
    #[must_use]
    pub fn tax_amount(&self) -> Decimal {
        round_money(self.net_amount() * self.tax_percent / Decimal::ONE_HUNDRED)
    }

    /// Net plus tax.
    #[must_use]
    pub fn total_amount(&self) -> Decimal {
        self.net_amount() + self.tax_amount()
    }

    /// Quantity not yet delivered or received.
    #[must_use]
    pub fn outstanding_quantity(&self) -> Decimal {
        self.quantity - self.delivered_quantity
    }
}

/// Builds numbered lines from inputs.
///
/// # Errors
///
/// Fails on the first invalid line.
pub fn build_lines(inputs: Vec<DocumentLineInput>) -> DomainResult<Vec<DocumentLine>> {
    inputs
        .into_iter()
        .zip(1..)
        .map(|(input, no)| DocumentLine::build(no, input))
        .collect()
}

/// Totals derived from a document's lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTotals {
    /// Sum of gross amounts.
    pub subtotal: Decimal,
    /// Sum of discounts.
    pub discount_total: Decimal,
    /// Sum of taxes.
    pub tax_total: Decimal,
    /// `subtotal - discount_total + tax_total`.
    pub grand_total: Decimal,
}

impl DocumentTotals {
    /// Aggregates the lines.
    #[must_use]
    pub fn from_lines(lines: &[DocumentLine]) -> Self {
        let mut totals = Self::default();
        for line in lines {
            totals.subtotal += line.gross_amount();
            totals.discount_total += line.discount_amount();
            totals.tax_total += line.tax_amount();
        }
        totals.grand_total = totals.subtotal - totals.discount_total + totals.tax_total;
        totals
    }
}

/// Currency, frozen rate, and totals of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPricing {
    /// Document currency.
    pub currency: String,
    /// Rate to the tenant base currency at creation.
    pub exchange_rate: Decimal,
    /// Line totals.
    #[serde(flatten)]
    pub totals: DocumentTotals,
    /// Grand total in the base currency.
    pub base_grand_total: Decimal,
}

impl DocumentPricing {
    /// Freezes the currency and rate.
    ///
    /// # Errors
    ///
    /// Fails for a malformed currency or a non-positive rate.
    pub fn new(currency: &str, exchange_rate: Decimal) -> DomainResult<Self> {
        if exchange_rate <= Decimal::ZERO {
            return Err(DomainError::validation("exchange rate must be positive"));
        }
        Ok(Self {
            currency: guard::currency(currency)?,
            exchange_rate,
            totals: DocumentTotals::default(),
            base_grand_total: Decimal::ZERO,
        })
    }

    /// Recomputes the totals from `lines`.
    ///
    /// # Errors
    ///
    /// Fails when the grand total, in either currency, exceeds [`guard::MAX_AMOUNT`].
    pub fn reprice(&mut self, lines: &[DocumentLine]) -> DomainResult<()> {
        let totals = DocumentTotals::from_lines(lines);
        guard::bounded("grand total", totals.grand_total)?;
        let base_grand_total = convert_amount(totals.grand_total, self.exchange_rate)
            .ok_or_else(|| DomainError::validation("base grand total is out of range"))?;
        guard::bounded("base grand total", base_grand_total)?;
        self.totals = totals;
        self.base_grand_total = base_grand_total;
        Ok(())
    }
}

/// Fails when a document has no lines.
///
/// # Errors
///
/// Returns an invalid-operation error naming the action.
pub fn ensure_has_lines(lines: &[DocumentLine], action: &str) -> DomainResult<()> {
    if lines.is_empty() {
        return Err(DomainError::invalid(format!(
            "Cannot {action} a document without lines"
        )));
    }
    Ok(())
}

/// Validates a payment against the open balance and returns the new paid total.
///
/// # Errors
///
/// Fails unless `0 < amount <= grand_total - amount_paid`.
pub fn apply_payment(grand_total: Decimal, amount_paid: Decimal, amount: Decimal) -> DomainResult<Decimal> {
    guard::positive("payment amount", amount)?;
    let balance = grand_total - amount_paid;
    if amount > balance {
        return Err(DomainError::validation(format!(
            "payment of {amount} exceeds the balance due of {balance}"
        )));
    }
    Ok(amount_paid + amount)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn line_input(quantity: Decimal, unit_price: Decimal) -> DocumentLineInput {
        DocumentLineInput {
            item_code: "SKU-1".to_string(),
            description: None,
            quantity,
            unit_price,
            discount_percent: Decimal::ZERO,
            tax_percent: Decimal::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(qty: Decimal, price: Decimal, disc: Decimal, tax: Decimal) -> DocumentLine {
        DocumentLine::build(
            1,
            DocumentLineInput {
                item_code: "SKU-1".to_string(),
                description: None,
                quantity: qty,
                unit_price: price,
                discount_percent: disc,
                tax_percent: tax,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_line_amounts() {
        let l = line(dec!(3), dec!(19.99), dec!(10), dec!(11));
        assert_eq!(l.gross_amount(), dec!(59.97));
        assert_eq!(l.net_amount(), dec!(53.97));
        assert_eq!(l.discount_amount(), dec!(6.00));
        assert_eq!(l.tax_amount(), dec!(5.94));
        assert_eq!(l.total_amount(), dec!(59.91));
    }

    #[test]
    fn test_totals() {
        let lines = vec![
            line(dec!(2), dec!(100), dec!(0), dec!(10)),
            line(dec!(1), dec!(50), dec!(20), dec!(0)),
        ];
        let totals = DocumentTotals::from_lines(&lines);
        assert_eq!(totals.subtotal, dec!(250));
        assert_eq!(totals.discount_total, dec!(10));
        assert_eq!(totals.tax_total, dec!(20));
        assert_eq!(totals.grand_total, dec!(260));
    }

    #[test]
    fn test_pricing_base_total() {
        let mut pricing = DocumentPricing::new("usd", dec!(15500)).unwrap();
        pricing.reprice(&[line(dec!(1), dec!(10.50), dec!(0), dec!(0))]).unwrap();
        assert_eq!(pricing.currency, "USD");
        assert_eq!(pricing.base_grand_total, dec!(162750));
        assert!(DocumentPricing::new("USD", dec!(0)).is_err());
    }

    #[test]
    fn test_line_validation() {
        let bad = |qty, price, disc| {
            DocumentLine::build(
                1,
                DocumentLineInput {
                    item_code: "X".to_string(),
                    description: None,
                    quantity: qty,
                    unit_price: price,
                    discount_percent: disc,
                    tax_percent: Decimal::ZERO,
                },
            )
            .is_err()
        };
        assert!(bad(dec!(0), dec!(1), dec!(0)));
        assert!(bad(dec!(1), dec!(-1), dec!(0)));
        assert!(bad(dec!(1), dec!(1), dec!(120)));
        assert!(!bad(dec!(1), dec!(0), dec!(0)));
    }

    #[test]
    fn test_oversized_line_is_rejected() {
        let build = |qty: Decimal, price: Decimal| {
            DocumentLine::build(1, test_support::line_input(qty, price))
        };
        let err = build(dec!(70000000000000000000000000000), dec!(2)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = build(dec!(900000000000000), dec!(900000000000000)).unwrap_err();
        assert_eq!(err.to_string(), format!("line amount cannot exceed {}", guard::MAX_AMOUNT));

        assert!(build(dec!(1000), dec!(999999999999)).is_ok());
    }

    #[test]
    fn test_reprice_rejects_out_of_range_totals() {
        let big = line(dec!(1), dec!(900000000000000), dec!(0), dec!(0));
        let mut pricing = DocumentPricing::new("EUR", dec!(16000)).unwrap();
        assert!(pricing.reprice(std::slice::from_ref(&big)).is_err());
        assert_eq!(pricing.totals, DocumentTotals::default());
        assert_eq!(pricing.base_grand_total, Decimal::ZERO);

        let mut pricing = DocumentPricing::new("EUR", dec!(1)).unwrap();
        assert!(pricing.reprice(&[big.clone(), big]).is_err());
    }

    #[test]
    fn test_build_lines_numbers_sequentially() {
        let lines = build_lines(vec![
            test_support::line_input(dec!(1), dec!(1)),
            test_support::line_input(dec!(2), dec!(2)),
        ])
        .unwrap();
        assert_eq!(lines[0].line_no, 1);
        assert_eq!(lines[1].line_no, 2);
        assert!(ensure_has_lines(&[], "send").is_err());
    }

    #[test]
    fn test_apply_payment() {
        assert_eq!(apply_payment(dec!(100), dec!(40), dec!(60)).unwrap(), dec!(100));
        assert!(apply_payment(dec!(100), dec!(40), dec!(60.01)).is_err());
        assert!(apply_payment(dec!(100), dec!(0), dec!(0)).is_err());
    }
}
