//! Integration tests for partners and the sales and purchasing document flows.

mod common;

use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use tessera_core::crm::{BusinessPartner, PartnerInput};
use tessera_core::document::DocumentLineInput;
use tessera_core::procurement::{GoodsReceiptInput, LineReceipt, PurchaseOrderInput, PurchaseOrderStatus};
use tessera_core::sales::{InvoiceStatus, OrderStatus, QuoteStatus, SalesQuoteInput};
use tessera_db::{
    GoodsReceiptRepository, PartnerRepository, PurchaseOrderRepository, RepoError, SalesInvoiceRepository,
    SalesQuoteRepository,
};
use uuid::Uuid;

use common::{connect, create_tenant, date};

fn partner_input(code: &str, is_customer: bool, is_supplier: bool) -> PartnerInput {
    PartnerInput {
        code: code.to_string(),
        name: format!("Partner {code}"),
        is_customer,
        is_supplier,
        email: None,
        phone: None,
        tax_number: None,
        credit_limit: dec!(0),
    }
}

async fn create_partner(db: &DatabaseConnection, tenant_id: Uuid, code: &str, customer: bool, supplier: bool) -> BusinessPartner {
    PartnerRepository::new(db.clone())
        .create(tenant_id, partner_input(code, customer, supplier), None)
        .await
        .expect("Failed to create partner")
}

fn widget_line(quantity: rust_decimal::Decimal) -> DocumentLineInput {
    DocumentLineInput {
        item_code: "WIDGET".to_string(),
        description: None,
        quantity,
        unit_price: dec!(20),
        discount_percent: dec!(0),
        tax_percent: dec!(10),
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_partner_codes_normalized_and_unique() {
    let db = connect().await;
    let tenant = create_tenant(&db).await;
    let partner = create_partner(&db, tenant.id, "acme", true, false).await;
    assert_eq!(partner.code, "ACME");

    let result = PartnerRepository::new(db.clone())
        .create(tenant.id, partner_input("ACME", true, false), None)
        .await;
    assert!(matches!(result, Err(RepoError::Conflict(_))));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_quote_to_order_to_invoice() {
    let db = connect().await;
    let tenant = create_tenant(&db).await;
    let customer = create_partner(&db, tenant.id, "CUST", true, false).await;
    let quotes = SalesQuoteRepository::new(db.clone());

    let quote = quotes
        .create(
            tenant.id,
            SalesQuoteInput {
                partner_id: customer.id,
                quote_date: date(2026, 2, 1),
                valid_until: date(2026, 2, 28),
                currency: None,
                notes: None,
                lines: vec![widget_line(dec!(10))],
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(quote.pricing.totals.grand_total, dec!(220));

    quotes.transition(tenant.id, quote.id, |q| q.send(None)).await.unwrap();
    quotes.transition(tenant.id, quote.id, |q| q.accept(None)).await.unwrap();
    let (converted, order) = quotes.convert(tenant.id, quote.id, date(2026, 2, 10), None).await.unwrap();
    assert_eq!(converted.status, QuoteStatus::Converted);
    assert_eq!(converted.converted_order_id, Some(order.id));
    assert_eq!(order.quote_id, Some(quote.id));
    assert_eq!(order.status, OrderStatus::Draft);
    assert_eq!(order.pricing.totals.grand_total, dec!(220));

    let invoices = SalesInvoiceRepository::new(db.clone());
    let early = invoices
        .create_from_order(tenant.id, order.id, date(2026, 2, 11), date(2026, 3, 11), None)
        .await;
    assert!(matches!(early, Err(RepoError::Domain(_))));

    tessera_db::SalesOrderRepository::new(db.clone())
        .transition(tenant.id, order.id, |o| o.confirm(None))
        .await
        .unwrap();
    let invoice = invoices
        .create_from_order(tenant.id, order.id, date(2026, 2, 11), date(2026, 3, 11), None)
        .await
        .unwrap();
    assert_eq!(invoice.order_id, Some(order.id));
    assert_eq!(invoice.lines.len(), 1);

    invoices.transition(tenant.id, invoice.id, |i| i.issue(None)).await.unwrap();
    let partial = invoices
        .transition(tenant.id, invoice.id, |i| i.record_payment(dec!(100), None))
        .await
        .unwrap();
    assert_eq!(partial.status, InvoiceStatus::PartiallyPaid);
    let paid = invoices
        .transition(tenant.id, invoice.id, |i| i.record_payment(dec!(120), None))
        .await
        .unwrap();
    assert_eq!(paid.status, InvoiceStatus::Paid);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_goods_receipts_complete_purchase_order() {
    let db = connect().await;
    let tenant = create_tenant(&db).await;
    let supplier = create_partner(&db, tenant.id, "SUPP", false, true).await;
    let orders = PurchaseOrderRepository::new(db.clone());

    let order = orders
        .create(
            tenant.id,
            PurchaseOrderInput {
                supplier_id: supplier.id,
                order_date: date(2026, 3, 1),
                expected_date: None,
                currency: None,
                notes: None,
                lines: vec![widget_line(dec!(10))],
            },
            None,
        )
        .await
        .unwrap();
    orders.transition(tenant.id, order.id, |o| o.approve(None)).await.unwrap();
    orders.transition(tenant.id, order.id, |o| o.send(None)).await.unwrap();
    let line_id = order.lines[0].id;

    let receipts = GoodsReceiptRepository::new(db.clone());
    let receive = |quantity| GoodsReceiptInput {
        purchase_order_id: order.id,
        receipt_date: date(2026, 3, 5),
        notes: None,
        lines: vec![LineReceipt { po_line_id: line_id, quantity }],
    };

    receipts.receive(tenant.id, receive(dec!(4)), None).await.unwrap();
    let partial = orders.find(tenant.id, order.id).await.unwrap();
    assert_eq!(partial.status, PurchaseOrderStatus::PartiallyReceived);
    assert_eq!(partial.lines[0].delivered_quantity, dec!(4));

    let over = receipts.receive(tenant.id, receive(dec!(7)), None).await;
    assert!(matches!(over, Err(RepoError::Domain(_))));

    let last = receipts.receive(tenant.id, receive(dec!(6)), None).await.unwrap();
    assert_eq!(last.number, "GRN-000002");
    let done = orders.find(tenant.id, order.id).await.unwrap();
    assert_eq!(done.status, PurchaseOrderStatus::Received);
    assert_eq!(done.lines[0].delivered_quantity, dec!(10));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_supplier_cannot_be_invoiced_as_customer() {
    let db = connect().await;
    let tenant = create_tenant(&db).await;
    let supplier = create_partner(&db, tenant.id, "ONLYSUPP", false, true).await;

    let result = SalesQuoteRepository::new(db.clone())
        .create(
            tenant.id,
            SalesQuoteInput {
                partner_id: supplier.id,
                quote_date: date(2026, 2, 1),
                valid_until: date(2026, 2, 28),
                currency: None,
                notes: None,
                lines: vec![widget_line(dec!(1))],
            },
            None,
        )
        .await;
    assert!(matches!(result, Err(RepoError::Domain(_))));
}
