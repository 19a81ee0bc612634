//! Procurement routes: supplier quotes, purchase orders, goods receipts, and bills.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post, put},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use super::{StatusFilter, created};
use crate::{ApiResult, AppState, middleware::AuthUser};
use tessera_core::document::DocumentLineInput;
use tessera_core::procurement::{
    BillStatus, GoodsReceipt, GoodsReceiptInput, PurchaseOrder, PurchaseOrderInput, PurchaseOrderStatus,
    PurchaseQuote, PurchaseQuoteInput, PurchaseQuoteStatus, SupplierBill, SupplierBillInput,
};
use tessera_db::{GoodsReceiptRepository, PurchaseOrderRepository, PurchaseQuoteRepository, SupplierBillRepository};
use tessera_shared::types::{PageRequest, PageResponse};

/// Creates the procurement routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/quotes", get(list_quotes).post(create_quote))
        .route("/quotes/{id}", get(get_quote))
        .route("/quotes/{id}/lines", put(replace_quote_lines))
        .route("/quotes/{id}/submit", post(submit_quote))
        .route("/quotes/{id}/accept", post(accept_quote))
        .route("/quotes/{id}/reject", post(reject_quote))
        .route("/quotes/{id}/expire", post(expire_quote))
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/from-quote", post(create_order_from_quote))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/lines", put(replace_order_lines))
        .route("/orders/{id}/approve", post(approve_order))
        .route("/orders/{id}/send", post(send_order))
        .route("/orders/{id}/close", post(close_order))
        .route("/orders/{id}/cancel", post(cancel_order))
        .route("/receipts", get(list_receipts).post(receive_goods))
        .route("/receipts/{id}", get(get_receipt))
        .route("/bills", get(list_bills).post(create_bill))
        .route("/bills/{id}", get(get_bill))
        .route("/bills/{id}/lines", put(replace_bill_lines))
        .route("/bills/{id}/approve", post(approve_bill))
        .route("/bills/{id}/payments", post(record_bill_payment))
        .route("/bills/{id}/cancel", post(cancel_bill))
}

/// Body for replacing the lines of a draft document.
#[derive(Debug, Deserialize)]
pub struct LinesRequest {
    /// The new lines.
    pub lines: Vec<DocumentLineInput>,
}

// ---------------------------------------------------------------------------
// Supplier quotes
// ---------------------------------------------------------------------------

/// GET /procurement/quotes
async fn list_quotes(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(filter): Query<StatusFilter<PurchaseQuoteStatus>>,
) -> ApiResult<Json<PageResponse<PurchaseQuote>>> {
    auth.require("procurement.quotes.read")?;
    Ok(Json(
        PurchaseQuoteRepository::new(state.conn())
            .list(auth.tenant_id(), filter.status, &page)
            .await?,
    ))
}

/// POST /procurement/quotes
async fn create_quote(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<PurchaseQuoteInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require("procurement.quotes.create")?;
    let quote = PurchaseQuoteRepository::new(state.conn())
        .create(auth.tenant_id(), payload, auth.actor())
        .await?;
    Ok(created(quote))
}

/// GET /procurement/quotes/{id}
async fn get_quote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PurchaseQuote>> {
    auth.require("procurement.quotes.read")?;
    Ok(Json(PurchaseQuoteRepository::new(state.conn()).find(auth.tenant_id(), id).await?))
}

/// PUT /procurement/quotes/{id}/lines
async fn replace_quote_lines(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<LinesRequest>,
) -> ApiResult<Json<PurchaseQuote>> {
    auth.require("procurement.quotes.update")?;
    Ok(Json(
        PurchaseQuoteRepository::new(state.conn())
            .replace_lines(auth.tenant_id(), id, payload.lines, auth.actor())
            .await?,
    ))
}

/// POST /procurement/quotes/{id}/submit
async fn submit_quote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PurchaseQuote>> {
    auth.require("procurement.quotes.update")?;
    let actor = auth.actor();
    Ok(Json(
        PurchaseQuoteRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |q| q.submit(actor))
            .await?,
    ))
}

/// POST /procurement/quotes/{id}/accept
async fn accept_quote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PurchaseQuote>> {
    auth.require("procurement.quotes.update")?;
    let actor = auth.actor();
    Ok(Json(
        PurchaseQuoteRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |q| q.accept(actor))
            .await?,
    ))
}

/// POST /procurement/quotes/{id}/reject
async fn reject_quote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PurchaseQuote>> {
    auth.require("procurement.quotes.update")?;
    let actor = auth.actor();
    Ok(Json(
        PurchaseQuoteRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |q| q.reject(actor))
            .await?,
    ))
}

/// POST /procurement/quotes/{id}/expire
async fn expire_quote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PurchaseQuote>> {
    auth.require("procurement.quotes.update")?;
    let actor = auth.actor();
    Ok(Json(
        PurchaseQuoteRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |q| q.expire(actor))
            .await?,
    ))
}

// ---------------------------------------------------------------------------
// Purchase orders
// ---------------------------------------------------------------------------

/// Body for ordering from an accepted quote.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFromQuoteRequest {
    /// The accepted supplier quote.
    pub quote_id: Uuid,
    /// Order date.
    pub order_date: NaiveDate,
}

/// GET /procurement/orders
async fn list_orders(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(filter): Query<StatusFilter<PurchaseOrderStatus>>,
) -> ApiResult<Json<PageResponse<PurchaseOrder>>> {
    auth.require("procurement.orders.read")?;
    Ok(Json(
        PurchaseOrderRepository::new(state.conn())
            .list(auth.tenant_id(), filter.status, &page)
            .await?,
    ))
}

/// POST /procurement/orders
async fn create_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<PurchaseOrderInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require("procurement.orders.create")?;
    let order = PurchaseOrderRepository::new(state.conn())
        .create(auth.tenant_id(), payload, auth.actor())
        .await?;
    Ok(created(order))
}

/// POST /procurement/orders/from-quote
async fn create_order_from_quote(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<OrderFromQuoteRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require("procurement.orders.create")?;
    let order = PurchaseOrderRepository::new(state.conn())
        .create_from_quote(auth.tenant_id(), payload.quote_id, payload.order_date, auth.actor())
        .await?;
    Ok(created(order))
}

/// GET /procurement/orders/{id}
async fn get_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PurchaseOrder>> {
    auth.require("procurement.orders.read")?;
    Ok(Json(PurchaseOrderRepository::new(state.conn()).find(auth.tenant_id(), id).await?))
}

/// PUT /procurement/orders/{id}/lines
async fn replace_order_lines(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<LinesRequest>,
) -> ApiResult<Json<PurchaseOrder>> {
    auth.require("procurement.orders.update")?;
    Ok(Json(
        PurchaseOrderRepository::new(state.conn())
            .replace_lines(auth.tenant_id(), id, payload.lines, auth.actor())
            .await?,
    ))
}

/// POST /procurement/orders/{id}/approve
async fn approve_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PurchaseOrder>> {
    auth.require("procurement.orders.approve")?;
    let actor = auth.actor();
    Ok(Json(
        PurchaseOrderRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |o| o.approve(actor))
            .await?,
    ))
}

/// POST /procurement/orders/{id}/send
async fn send_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PurchaseOrder>> {
    auth.require("procurement.orders.update")?;
    let actor = auth.actor();
    Ok(Json(
        PurchaseOrderRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |o| o.send(actor))
            .await?,
    ))
}

/// POST /procurement/orders/{id}/close
async fn close_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PurchaseOrder>> {
    auth.require("procurement.orders.update")?;
    let actor = auth.actor();
    Ok(Json(
        PurchaseOrderRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |o| o.close(actor))
            .await?,
    ))
}

/// POST /procurement/orders/{id}/cancel
async fn cancel_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PurchaseOrder>> {
    auth.require("procurement.orders.update")?;
    let actor = auth.actor();
    Ok(Json(
        PurchaseOrderRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |o| o.cancel(actor))
            .await?,
    ))
}

// ---------------------------------------------------------------------------
// Goods receipts
// ---------------------------------------------------------------------------

/// `?purchaseOrderId=` filter.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptFilter {
    /// Only receipts against this order.
    pub purchase_order_id: Option<Uuid>,
}

/// GET /procurement/receipts
async fn list_receipts(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(filter): Query<ReceiptFilter>,
) -> ApiResult<Json<PageResponse<GoodsReceipt>>> {
    auth.require("procurement.receipts.read")?;
    Ok(Json(
        GoodsReceiptRepository::new(state.conn())
            .list(auth.tenant_id(), filter.purchase_order_id, &page)
            .await?,
    ))
}

/// POST /procurement/receipts - records a delivery and advances the order.
async fn receive_goods(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<GoodsReceiptInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require("procurement.receipts.create")?;
    let receipt = GoodsReceiptRepository::new(state.conn())
        .receive(auth.tenant_id(), payload, auth.actor())
        .await?;
    Ok(created(receipt))
}

/// GET /procurement/receipts/{id}
async fn get_receipt(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<GoodsReceipt>> {
    auth.require("procurement.receipts.read")?;
    Ok(Json(GoodsReceiptRepository::new(state.conn()).find(auth.tenant_id(), id).await?))
}

// ---------------------------------------------------------------------------
// Supplier bills
// ---------------------------------------------------------------------------

/// Body for recording a payment.
#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    /// Positive amount, at most the balance due.
    pub amount: Decimal,
}

/// GET /procurement/bills
async fn list_bills(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(filter): Query<StatusFilter<BillStatus>>,
) -> ApiResult<Json<PageResponse<SupplierBill>>> {
    auth.require("procurement.bills.read")?;
    Ok(Json(
        SupplierBillRepository::new(state.conn())
            .list(auth.tenant_id(), filter.status, &page)
            .await?,
    ))
}

/// POST /procurement/bills
async fn create_bill(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<SupplierBillInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require("procurement.bills.create")?;
    let bill = SupplierBillRepository::new(state.conn())
        .create(auth.tenant_id(), payload, auth.actor())
        .await?;
    Ok(created(bill))
}

/// GET /procurement/bills/{id}
async fn get_bill(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SupplierBill>> {
    auth.require("procurement.bills.read")?;
    Ok(Json(SupplierBillRepository::new(state.conn()).find(auth.tenant_id(), id).await?))
}

/// PUT /procurement/bills/{id}/lines
async fn replace_bill_lines(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<LinesRequest>,
) -> ApiResult<Json<SupplierBill>> {
    auth.require("procurement.bills.update")?;
    Ok(Json(
        SupplierBillRepository::new(state.conn())
            .replace_lines(auth.tenant_id(), id, payload.lines, auth.actor())
            .await?,
    ))
}

/// POST /procurement/bills/{id}/approve
async fn approve_bill(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SupplierBill>> {
    auth.require("procurement.bills.update")?;
    let actor = auth.actor();
    Ok(Json(
        SupplierBillRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |b| b.approve(actor))
            .await?,
    ))
}

/// POST /procurement/bills/{id}/payments
async fn record_bill_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<PaymentRequest>,
) -> ApiResult<Json<SupplierBill>> {
    auth.require("procurement.bills.record_payment")?;
    let actor = auth.actor();
    Ok(Json(
        SupplierBillRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |b| b.record_payment(payload.amount, actor))
            .await?,
    ))
}

/// POST /procurement/bills/{id}/cancel
async fn cancel_bill(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SupplierBill>> {
    auth.require("procurement.bills.update")?;
    let actor = auth.actor();
    Ok(Json(
        SupplierBillRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |b| b.cancel(actor))
            .await?,
    ))
}
