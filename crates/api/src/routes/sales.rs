//! Sales routes: quotes, orders, invoices, shipments, returns, and commission rules.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post, put},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{StatusFilter, created};
use crate::{ApiResult, AppState, middleware::AuthUser};
use tessera_core::document::DocumentLineInput;
use tessera_core::sales::{
    CommissionRule, CommissionRuleInput, InvoiceStatus, OrderStatus, QuoteStatus, ReturnStatus, SalesInvoice,
    SalesInvoiceInput, SalesOrder, SalesOrderInput, SalesQuote, SalesQuoteInput, SalesReturn, SalesReturnInput,
    Shipment, ShipmentInput,
};
use tessera_db::{
    CommissionRuleRepository, SalesInvoiceRepository, SalesOrderRepository, SalesQuoteRepository,
    SalesReturnRepository, ShipmentRepository,
};
use tessera_shared::types::{PageRequest, PageResponse};

/// Creates the sales routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/quotes", get(list_quotes).post(create_quote))
        .route("/quotes/{id}", get(get_quote))
        .route("/quotes/{id}/lines", put(replace_quote_lines))
        .route("/quotes/{id}/send", post(send_quote))
        .route("/quotes/{id}/accept", post(accept_quote))
        .route("/quotes/{id}/reject", post(reject_quote))
        .route("/quotes/{id}/expire", post(expire_quote))
        .route("/quotes/{id}/convert", post(convert_quote))
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/lines", put(replace_order_lines))
        .route("/orders/{id}/confirm", post(confirm_order))
        .route("/orders/{id}/complete", post(complete_order))
        .route("/orders/{id}/cancel", post(cancel_order))
        .route("/invoices", get(list_invoices).post(create_invoice))
        .route("/invoices/from-order", post(create_invoice_from_order))
        .route("/invoices/{id}", get(get_invoice))
        .route("/invoices/{id}/lines", put(replace_invoice_lines))
        .route("/invoices/{id}/issue", post(issue_invoice))
        .route("/invoices/{id}/payments", post(record_invoice_payment))
        .route("/invoices/{id}/cancel", post(cancel_invoice))
        .route("/shipments", get(list_shipments).post(create_shipment))
        .route("/shipments/{id}", get(get_shipment))
        .route("/shipments/{id}/pack", post(pack_shipment))
        .route("/shipments/{id}/ship", post(ship_shipment))
        .route("/shipments/{id}/deliver", post(deliver_shipment))
        .route("/shipments/{id}/cancel", post(cancel_shipment))
        .route("/returns", get(list_returns).post(create_return))
        .route("/returns/{id}", get(get_return))
        .route("/returns/{id}/approve", post(approve_return))
        .route("/returns/{id}/receive", post(receive_return))
        .route("/returns/{id}/refund", post(refund_return))
        .route("/returns/{id}/reject", post(reject_return))
        .route("/commission-rules", get(list_commission_rules).post(create_commission_rule))
        .route("/commission-rules/evaluate", get(evaluate_commission))
        .route(
            "/commission-rules/{id}",
            get(get_commission_rule)
                .put(update_commission_rule)
                .delete(deactivate_commission_rule),
        )
}

/// Body for replacing the lines of a draft document.
#[derive(Debug, Deserialize)]
pub struct LinesRequest {
    /// The new lines.
    pub lines: Vec<DocumentLineInput>,
}

/// Body carrying a mandatory reason.
#[derive(Debug, Deserialize)]
pub struct ReasonRequest {
    /// Free-text reason.
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Quotes
// ---------------------------------------------------------------------------

/// Body for converting a quote.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertQuoteRequest {
    /// Date of the resulting order.
    pub order_date: NaiveDate,
}

/// A converted quote and the order it produced.
#[derive(Debug, Serialize)]
pub struct QuoteConversion {
    /// The quote, now converted.
    pub quote: SalesQuote,
    /// The new draft order.
    pub order: SalesOrder,
}

/// GET /sales/quotes
async fn list_quotes(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(filter): Query<StatusFilter<QuoteStatus>>,
) -> ApiResult<Json<PageResponse<SalesQuote>>> {
    auth.require("sales.quotes.read")?;
    Ok(Json(
        SalesQuoteRepository::new(state.conn())
            .list(auth.tenant_id(), filter.status, &page)
            .await?,
    ))
}

/// POST /sales/quotes
async fn create_quote(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<SalesQuoteInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require("sales.quotes.create")?;
    let quote = SalesQuoteRepository::new(state.conn())
        .create(auth.tenant_id(), payload, auth.actor())
        .await?;
    Ok(created(quote))
}

/// GET /sales/quotes/{id}
async fn get_quote(State(state): State<AppState>, auth: AuthUser, Path(id): Path<Uuid>) -> ApiResult<Json<SalesQuote>> {
    auth.require("sales.quotes.read")?;
    Ok(Json(SalesQuoteRepository::new(state.conn()).find(auth.tenant_id(), id).await?))
}

/// PUT /sales/quotes/{id}/lines
async fn replace_quote_lines(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<LinesRequest>,
) -> ApiResult<Json<SalesQuote>> {
    auth.require("sales.quotes.update")?;
    Ok(Json(
        SalesQuoteRepository::new(state.conn())
            .replace_lines(auth.tenant_id(), id, payload.lines, auth.actor())
            .await?,
    ))
}

/// POST /sales/quotes/{id}/send
async fn send_quote(State(state): State<AppState>, auth: AuthUser, Path(id): Path<Uuid>) -> ApiResult<Json<SalesQuote>> {
    auth.require("sales.quotes.update")?;
    let actor = auth.actor();
    Ok(Json(
        SalesQuoteRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |q| q.send(actor))
            .await?,
    ))
}

/// POST /sales/quotes/{id}/accept
async fn accept_quote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SalesQuote>> {
    auth.require("sales.quotes.update")?;
    let actor = auth.actor();
    Ok(Json(
        SalesQuoteRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |q| q.accept(actor))
            .await?,
    ))
}

/// POST /sales/quotes/{id}/reject
async fn reject_quote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SalesQuote>> {
    auth.require("sales.quotes.update")?;
    let actor = auth.actor();
    Ok(Json(
        SalesQuoteRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |q| q.reject(actor))
            .await?,
    ))
}

/// POST /sales/quotes/{id}/expire
async fn expire_quote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SalesQuote>> {
    auth.require("sales.quotes.update")?;
    let actor = auth.actor();
    Ok(Json(
        SalesQuoteRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |q| q.expire(actor))
            .await?,
    ))
}

/// POST /sales/quotes/{id}/convert - accepted quotes become draft orders.
async fn convert_quote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ConvertQuoteRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require("sales.quotes.convert")?;
    let (quote, order) = SalesQuoteRepository::new(state.conn())
        .convert(auth.tenant_id(), id, payload.order_date, auth.actor())
        .await?;
    Ok(created(QuoteConversion { quote, order }))
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// GET /sales/orders
async fn list_orders(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(filter): Query<StatusFilter<OrderStatus>>,
) -> ApiResult<Json<PageResponse<SalesOrder>>> {
    auth.require("sales.orders.read")?;
    Ok(Json(
        SalesOrderRepository::new(state.conn())
            .list(auth.tenant_id(), filter.status, &page)
            .await?,
    ))
}

/// POST /sales/orders
async fn create_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<SalesOrderInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require("sales.orders.create")?;
    let order = SalesOrderRepository::new(state.conn())
        .create(auth.tenant_id(), payload, auth.actor())
        .await?;
    Ok(created(order))
}

/// GET /sales/orders/{id}
async fn get_order(State(state): State<AppState>, auth: AuthUser, Path(id): Path<Uuid>) -> ApiResult<Json<SalesOrder>> {
    auth.require("sales.orders.read")?;
    Ok(Json(SalesOrderRepository::new(state.conn()).find(auth.tenant_id(), id).await?))
}

/// PUT /sales/orders/{id}/lines
async fn replace_order_lines(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<LinesRequest>,
) -> ApiResult<Json<SalesOrder>> {
    auth.require("sales.orders.update")?;
    Ok(Json(
        SalesOrderRepository::new(state.conn())
            .replace_lines(auth.tenant_id(), id, payload.lines, auth.actor())
            .await?,
    ))
}

/// POST /sales/orders/{id}/confirm
async fn confirm_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SalesOrder>> {
    auth.require("sales.orders.update")?;
    let actor = auth.actor();
    Ok(Json(
        SalesOrderRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |o| o.confirm(actor))
            .await?,
    ))
}

/// POST /sales/orders/{id}/complete
async fn complete_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SalesOrder>> {
    auth.require("sales.orders.update")?;
    let actor = auth.actor();
    Ok(Json(
        SalesOrderRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |o| o.complete(actor))
            .await?,
    ))
}

/// POST /sales/orders/{id}/cancel
async fn cancel_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SalesOrder>> {
    auth.require("sales.orders.update")?;
    let actor = auth.actor();
    Ok(Json(
        SalesOrderRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |o| o.cancel(actor))
            .await?,
    ))
}

// ---------------------------------------------------------------------------
// Invoices
// ---------------------------------------------------------------------------

/// Body for invoicing an order.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceFromOrderRequest {
    /// The confirmed or completed order.
    pub order_id: Uuid,
    /// Invoice date.
    pub invoice_date: NaiveDate,
    /// Payment due date.
    pub due_date: NaiveDate,
}

/// Body for recording a payment.
#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    /// Positive amount, at most the balance due.
    pub amount: Decimal,
}

/// GET /sales/invoices
async fn list_invoices(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(filter): Query<StatusFilter<InvoiceStatus>>,
) -> ApiResult<Json<PageResponse<SalesInvoice>>> {
    auth.require("sales.invoices.read")?;
    Ok(Json(
        SalesInvoiceRepository::new(state.conn())
            .list(auth.tenant_id(), filter.status, &page)
            .await?,
    ))
}

/// POST /sales/invoices
async fn create_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<SalesInvoiceInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require("sales.invoices.create")?;
    let invoice = SalesInvoiceRepository::new(state.conn())
        .create(auth.tenant_id(), payload, auth.actor())
        .await?;
    Ok(created(invoice))
}

/// POST /sales/invoices/from-order
async fn create_invoice_from_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<InvoiceFromOrderRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require("sales.invoices.create")?;
    let invoice = SalesInvoiceRepository::new(state.conn())
        .create_from_order(
            auth.tenant_id(),
            payload.order_id,
            payload.invoice_date,
            payload.due_date,
            auth.actor(),
        )
        .await?;
    Ok(created(invoice))
}

/// GET /sales/invoices/{id}
async fn get_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SalesInvoice>> {
    auth.require("sales.invoices.read")?;
    Ok(Json(SalesInvoiceRepository::new(state.conn()).find(auth.tenant_id(), id).await?))
}

/// PUT /sales/invoices/{id}/lines
async fn replace_invoice_lines(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<LinesRequest>,
) -> ApiResult<Json<SalesInvoice>> {
    auth.require("sales.invoices.update")?;
    Ok(Json(
        SalesInvoiceRepository::new(state.conn())
            .replace_lines(auth.tenant_id(), id, payload.lines, auth.actor())
            .await?,
    ))
}

/// POST /sales/invoices/{id}/issue
async fn issue_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SalesInvoice>> {
    auth.require("sales.invoices.update")?;
    let actor = auth.actor();
    Ok(Json(
        SalesInvoiceRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |i| i.issue(actor))
            .await?,
    ))
}

/// POST /sales/invoices/{id}/payments
async fn record_invoice_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<PaymentRequest>,
) -> ApiResult<Json<SalesInvoice>> {
    auth.require("sales.invoices.record_payment")?;
    let actor = auth.actor();
    Ok(Json(
        SalesInvoiceRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |i| i.record_payment(payload.amount, actor))
            .await?,
    ))
}

/// POST /sales/invoices/{id}/cancel
async fn cancel_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SalesInvoice>> {
    auth.require("sales.invoices.update")?;
    let actor = auth.actor();
    Ok(Json(
        SalesInvoiceRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |i| i.cancel(actor))
            .await?,
    ))
}

// ---------------------------------------------------------------------------
// Shipments
// ---------------------------------------------------------------------------

/// `?orderId=` filter.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilter {
    /// Only shipments for this order.
    pub order_id: Option<Uuid>,
}

/// Body for dispatching a shipment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipRequest {
    /// Carrier tracking number.
    pub tracking_number: String,
}

/// GET /sales/shipments
async fn list_shipments(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(filter): Query<OrderFilter>,
) -> ApiResult<Json<PageResponse<Shipment>>> {
    auth.require("sales.shipments.read")?;
    Ok(Json(
        ShipmentRepository::new(state.conn())
            .list(auth.tenant_id(), filter.order_id, &page)
            .await?,
    ))
}

/// POST /sales/shipments
async fn create_shipment(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<ShipmentInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require("sales.shipments.create")?;
    let shipment = ShipmentRepository::new(state.conn())
        .create(auth.tenant_id(), payload, auth.actor())
        .await?;
    Ok(created(shipment))
}

/// GET /sales/shipments/{id}
async fn get_shipment(State(state): State<AppState>, auth: AuthUser, Path(id): Path<Uuid>) -> ApiResult<Json<Shipment>> {
    auth.require("sales.shipments.read")?;
    Ok(Json(ShipmentRepository::new(state.conn()).find(auth.tenant_id(), id).await?))
}

/// POST /sales/shipments/{id}/pack
async fn pack_shipment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Shipment>> {
    auth.require("sales.shipments.update")?;
    let actor = auth.actor();
    Ok(Json(
        ShipmentRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |s| s.pack(actor))
            .await?,
    ))
}

/// POST /sales/shipments/{id}/ship
async fn ship_shipment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ShipRequest>,
) -> ApiResult<Json<Shipment>> {
    auth.require("sales.shipments.update")?;
    let actor = auth.actor();
    Ok(Json(
        ShipmentRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |s| s.ship(&payload.tracking_number, actor))
            .await?,
    ))
}

/// POST /sales/shipments/{id}/deliver
async fn deliver_shipment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Shipment>> {
    auth.require("sales.shipments.update")?;
    let actor = auth.actor();
    Ok(Json(
        ShipmentRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |s| s.deliver(actor))
            .await?,
    ))
}

/// POST /sales/shipments/{id}/cancel
async fn cancel_shipment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Shipment>> {
    auth.require("sales.shipments.update")?;
    let actor = auth.actor();
    Ok(Json(
        ShipmentRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |s| s.cancel(actor))
            .await?,
    ))
}

// ---------------------------------------------------------------------------
// Returns
// ---------------------------------------------------------------------------

/// GET /sales/returns
async fn list_returns(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(filter): Query<StatusFilter<ReturnStatus>>,
) -> ApiResult<Json<PageResponse<SalesReturn>>> {
    auth.require("sales.returns.read")?;
    Ok(Json(
        SalesReturnRepository::new(state.conn())
            .list(auth.tenant_id(), filter.status, &page)
            .await?,
    ))
}

/// POST /sales/returns
async fn create_return(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<SalesReturnInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require("sales.returns.create")?;
    let ret = SalesReturnRepository::new(state.conn())
        .create(auth.tenant_id(), payload, auth.actor())
        .await?;
    Ok(created(ret))
}

/// GET /sales/returns/{id}
async fn get_return(State(state): State<AppState>, auth: AuthUser, Path(id): Path<Uuid>) -> ApiResult<Json<SalesReturn>> {
    auth.require("sales.returns.read")?;
    Ok(Json(SalesReturnRepository::new(state.conn()).find(auth.tenant_id(), id).await?))
}

/// POST /sales/returns/{id}/approve
async fn approve_return(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SalesReturn>> {
    auth.require("sales.returns.approve")?;
    let actor = auth.actor();
    Ok(Json(
        SalesReturnRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |r| r.approve(actor))
            .await?,
    ))
}

/// POST /sales/returns/{id}/receive
async fn receive_return(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SalesReturn>> {
    auth.require("sales.returns.update")?;
    let actor = auth.actor();
    Ok(Json(
        SalesReturnRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |r| r.receive(actor))
            .await?,
    ))
}

/// POST /sales/returns/{id}/refund
async fn refund_return(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SalesReturn>> {
    auth.require("sales.returns.update")?;
    let actor = auth.actor();
    Ok(Json(
        SalesReturnRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |r| r.refund(actor))
            .await?,
    ))
}

/// POST /sales/returns/{id}/reject
async fn reject_return(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReasonRequest>,
) -> ApiResult<Json<SalesReturn>> {
    auth.require("sales.returns.approve")?;
    let actor = auth.actor();
    Ok(Json(
        SalesReturnRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |r| r.reject(&payload.reason, actor))
            .await?,
    ))
}

// ---------------------------------------------------------------------------
// Commission rules
// ---------------------------------------------------------------------------

/// Query for a commission estimate.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateQuery {
    /// Sale amount.
    pub amount: Decimal,
    /// Salesperson, if any.
    pub salesperson_id: Option<Uuid>,
    /// Sale date.
    pub date: NaiveDate,
}

/// Commission estimate.
#[derive(Debug, Serialize)]
pub struct CommissionResponse {
    /// The sale amount.
    pub amount: Decimal,
    /// Commission due.
    pub commission: Decimal,
}

/// GET /sales/commission-rules
async fn list_commission_rules(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<PageResponse<CommissionRule>>> {
    auth.require("sales.commission_rules.read")?;
    Ok(Json(
        CommissionRuleRepository::new(state.conn())
            .list(auth.tenant_id(), &page)
            .await?,
    ))
}

/// POST /sales/commission-rules
async fn create_commission_rule(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CommissionRuleInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require("sales.commission_rules.create")?;
    let rule = CommissionRuleRepository::new(state.conn())
        .create(auth.tenant_id(), payload, auth.actor())
        .await?;
    Ok(created(rule))
}

/// GET /sales/commission-rules/evaluate?amount=&date=&salespersonId=
async fn evaluate_commission(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<EvaluateQuery>,
) -> ApiResult<Json<CommissionResponse>> {
    auth.require("sales.commission_rules.read")?;
    let commission = CommissionRuleRepository::new(state.conn())
        .evaluate(auth.tenant_id(), query.amount, query.salesperson_id, query.date)
        .await?;
    Ok(Json(CommissionResponse {
        amount: query.amount,
        commission,
    }))
}

/// GET /sales/commission-rules/{id}
async fn get_commission_rule(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CommissionRule>> {
    auth.require("sales.commission_rules.read")?;
    Ok(Json(CommissionRuleRepository::new(state.conn()).find(auth.tenant_id(), id).await?))
}

/// PUT /sales/commission-rules/{id}
async fn update_commission_rule(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CommissionRuleInput>,
) -> ApiResult<Json<CommissionRule>> {
    auth.require("sales.commission_rules.update")?;
    Ok(Json(
        CommissionRuleRepository::new(state.conn())
            .update(auth.tenant_id(), id, payload, auth.actor())
            .await?,
    ))
}

/// DELETE /sales/commission-rules/{id} - rules are deactivated.
async fn deactivate_commission_rule(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CommissionRule>> {
    auth.require("sales.commission_rules.delete")?;
    Ok(Json(
        CommissionRuleRepository::new(state.conn())
            .deactivate(auth.tenant_id(), id, auth.actor())
            .await?,
    ))
}
