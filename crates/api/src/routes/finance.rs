//! Finance routes: chart of accounts, fiscal calendar, exchange rates, the
//! journal, tax brackets, cheques, and credit notes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{StatusFilter, created};
use crate::{ApiResult, AppState, middleware::AuthUser};
use tessera_core::finance::{
    Account, AccountInput, AccountType, Cheque, ChequeInput, ChequeStatus, CreditNote, CreditNoteInput, ExchangeRate,
    ExchangeRateInput, FiscalYear, FiscalYearInput, JournalEntry, JournalEntryInput, JournalLineInput, JournalStatus,
    TaxRule, TaxRuleInput,
};
use tessera_db::{
    AccountRepository, ChequeRepository, CreditNoteRepository, ExchangeRateRepository, FiscalRepository,
    JournalRepository, TaxRuleRepository,
};
use tessera_shared::types::{PageRequest, PageResponse};

/// Creates the finance routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route("/accounts/{id}", get(get_account).put(update_account).delete(deactivate_account))
        .route("/fiscal-years", get(list_fiscal_years).post(create_fiscal_year))
        .route("/fiscal-years/{id}", get(get_fiscal_year))
        .route("/fiscal-years/{id}/close", post(close_fiscal_year))
        .route("/fiscal-years/{id}/periods/{period_id}/close", post(close_period))
        .route("/fiscal-years/{id}/periods/{period_id}/reopen", post(reopen_period))
        .route("/exchange-rates", get(list_exchange_rates).post(create_exchange_rate))
        .route("/exchange-rates/lookup", get(lookup_exchange_rate))
        .route("/journal-entries", get(list_journal_entries).post(create_journal_entry))
        .route("/journal-entries/{id}", get(get_journal_entry).delete(delete_journal_entry))
        .route("/journal-entries/{id}/lines", post(add_journal_line).put(replace_journal_lines))
        .route("/journal-entries/{id}/post", post(post_journal_entry))
        .route("/journal-entries/{id}/void", post(void_journal_entry))
        .route("/tax-rules", get(list_tax_rules).post(create_tax_rule))
        .route("/tax-rules/effective", get(effective_tax_rules))
        .route("/tax-rules/{id}", get(get_tax_rule).put(update_tax_rule).delete(delete_tax_rule))
        .route("/cheques", get(list_cheques).post(create_cheque))
        .route("/cheques/{id}", get(get_cheque))
        .route("/cheques/{id}/deposit", post(deposit_cheque))
        .route("/cheques/{id}/clear", post(clear_cheque))
        .route("/cheques/{id}/bounce", post(bounce_cheque))
        .route("/cheques/{id}/cancel", post(cancel_cheque))
        .route("/credit-notes", get(list_credit_notes).post(create_credit_note))
        .route("/credit-notes/{id}", get(get_credit_note))
        .route("/credit-notes/{id}/issue", post(issue_credit_note))
        .route("/credit-notes/{id}/apply", post(apply_credit_note))
        .route("/credit-notes/{id}/cancel", post(cancel_credit_note))
}

/// Body carrying a mandatory reason.
#[derive(Debug, Deserialize)]
pub struct ReasonRequest {
    /// Free-text reason.
    pub reason: String,
}

/// Body carrying an amount.
#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    /// Positive amount.
    pub amount: Decimal,
}

/// `?date=` for effective-dated lookups.
#[derive(Debug, Deserialize)]
pub struct DateQuery {
    /// The date of interest.
    pub date: NaiveDate,
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// `?accountType=` filter.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountFilter {
    /// Only accounts of this type.
    pub account_type: Option<AccountType>,
}

/// GET /finance/accounts
async fn list_accounts(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(filter): Query<AccountFilter>,
) -> ApiResult<Json<PageResponse<Account>>> {
    auth.require("finance.accounts.read")?;
    Ok(Json(
        AccountRepository::new(state.conn())
            .list(auth.tenant_id(), filter.account_type, &page)
            .await?,
    ))
}

/// POST /finance/accounts
async fn create_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<AccountInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require("finance.accounts.create")?;
    let account = AccountRepository::new(state.conn())
        .create(auth.tenant_id(), payload, auth.actor())
        .await?;
    Ok(created(account))
}

/// GET /finance/accounts/{id}
async fn get_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Account>> {
    auth.require("finance.accounts.read")?;
    Ok(Json(AccountRepository::new(state.conn()).find(auth.tenant_id(), id).await?))
}

/// PUT /finance/accounts/{id}
async fn update_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AccountInput>,
) -> ApiResult<Json<Account>> {
    auth.require("finance.accounts.update")?;
    let account = AccountRepository::new(state.conn())
        .update(auth.tenant_id(), id, payload, auth.actor())
        .await?;
    info!(tenant_id = %auth.tenant_id(), account_id = %account.id, "account updated");
    Ok(Json(account))
}

/// DELETE /finance/accounts/{id} - accounts are deactivated, never removed.
async fn deactivate_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Account>> {
    auth.require("finance.accounts.update")?;
    let account = AccountRepository::new(state.conn())
        .deactivate(auth.tenant_id(), id, auth.actor())
        .await?;
    info!(tenant_id = %auth.tenant_id(), account_id = %account.id, "account deactivated");
    Ok(Json(account))
}

// ---------------------------------------------------------------------------
// Fiscal calendar
// ---------------------------------------------------------------------------

/// GET /finance/fiscal-years
async fn list_fiscal_years(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<PageResponse<FiscalYear>>> {
    auth.require("finance.fiscal_years.read")?;
    Ok(Json(FiscalRepository::new(state.conn()).list(auth.tenant_id(), &page).await?))
}

/// POST /finance/fiscal-years - creates the year and its monthly periods.
async fn create_fiscal_year(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<FiscalYearInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require("finance.fiscal_years.create")?;
    let year = FiscalRepository::new(state.conn())
        .create(auth.tenant_id(), payload, auth.actor())
        .await?;
    Ok(created(year))
}

/// GET /finance/fiscal-years/{id}
async fn get_fiscal_year(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FiscalYear>> {
    auth.require("finance.fiscal_years.read")?;
    Ok(Json(FiscalRepository::new(state.conn()).find(auth.tenant_id(), id).await?))
}

/// POST /finance/fiscal-years/{id}/close
async fn close_fiscal_year(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FiscalYear>> {
    auth.require("finance.fiscal_years.close")?;
    Ok(Json(
        FiscalRepository::new(state.conn())
            .close(auth.tenant_id(), id, auth.actor())
            .await?,
    ))
}

/// POST /finance/fiscal-years/{id}/periods/{period_id}/close
async fn close_period(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, period_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<FiscalYear>> {
    auth.require("finance.fiscal_years.close")?;
    Ok(Json(
        FiscalRepository::new(state.conn())
            .close_period(auth.tenant_id(), id, period_id, auth.actor())
            .await?,
    ))
}

/// POST /finance/fiscal-years/{id}/periods/{period_id}/reopen
async fn reopen_period(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, period_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<FiscalYear>> {
    auth.require("finance.fiscal_years.close")?;
    Ok(Json(
        FiscalRepository::new(state.conn())
            .reopen_period(auth.tenant_id(), id, period_id, auth.actor())
            .await?,
    ))
}

// ---------------------------------------------------------------------------
// Exchange rates
// ---------------------------------------------------------------------------

/// Currency pair query.
#[derive(Debug, Deserialize)]
pub struct PairQuery {
    /// Source currency.
    pub from: Option<String>,
    /// Target currency.
    pub to: Option<String>,
}

/// Lookup query: a pair and a date.
#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    /// Source currency.
    pub from: String,
    /// Target currency.
    pub to: String,
    /// Rate as of this date.
    pub date: NaiveDate,
}

/// GET /finance/exchange-rates
async fn list_exchange_rates(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(pair): Query<PairQuery>,
) -> ApiResult<Json<PageResponse<ExchangeRate>>> {
    auth.require("finance.exchange_rates.read")?;
    Ok(Json(
        ExchangeRateRepository::new(state.conn())
            .list(auth.tenant_id(), pair.from.as_deref(), pair.to.as_deref(), &page)
            .await?,
    ))
}

/// POST /finance/exchange-rates
async fn create_exchange_rate(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<ExchangeRateInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require("finance.exchange_rates.create")?;
    let rate = ExchangeRateRepository::new(state.conn())
        .create(auth.tenant_id(), payload, auth.actor())
        .await?;
    info!(tenant_id = %auth.tenant_id(), from = %rate.from_currency, to = %rate.to_currency, rate = %rate.rate, "exchange rate recorded");
    Ok(created(rate))
}

/// GET /finance/exchange-rates/lookup?from=&to=&date=
async fn lookup_exchange_rate(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<LookupQuery>,
) -> ApiResult<Json<ExchangeRate>> {
    auth.require("finance.exchange_rates.read")?;
    Ok(Json(
        ExchangeRateRepository::new(state.conn())
            .lookup(auth.tenant_id(), &query.from, &query.to, query.date)
            .await?,
    ))
}

// ---------------------------------------------------------------------------
// Journal
// ---------------------------------------------------------------------------

/// Body for replacing all lines of a draft.
#[derive(Debug, Deserialize)]
pub struct ReplaceLinesRequest {
    /// The new lines.
    pub lines: Vec<JournalLineInput>,
}

/// A voided entry together with its reversal.
#[derive(Debug, Serialize)]
pub struct VoidResponse {
    /// The original entry, now voided.
    pub voided: JournalEntry,
    /// The posted reversal.
    pub reversal: JournalEntry,
}

/// GET /finance/journal-entries
async fn list_journal_entries(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(filter): Query<StatusFilter<JournalStatus>>,
) -> ApiResult<Json<PageResponse<JournalEntry>>> {
    auth.require("finance.journal_entries.read")?;
    Ok(Json(
        JournalRepository::new(state.conn())
            .list(auth.tenant_id(), filter.status, &page)
            .await?,
    ))
}

/// POST /finance/journal-entries
async fn create_journal_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<JournalEntryInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require("finance.journal_entries.create")?;
    let entry = JournalRepository::new(state.conn())
        .create(auth.tenant_id(), payload, auth.actor())
        .await?;
    Ok(created(entry))
}

/// GET /finance/journal-entries/{id}
async fn get_journal_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<JournalEntry>> {
    auth.require("finance.journal_entries.read")?;
    Ok(Json(JournalRepository::new(state.conn()).find(auth.tenant_id(), id).await?))
}

/// POST /finance/journal-entries/{id}/lines
async fn add_journal_line(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<JournalLineInput>,
) -> ApiResult<Json<JournalEntry>> {
    auth.require("finance.journal_entries.update")?;
    Ok(Json(
        JournalRepository::new(state.conn())
            .add_line(auth.tenant_id(), id, payload, auth.actor())
            .await?,
    ))
}

/// PUT /finance/journal-entries/{id}/lines
async fn replace_journal_lines(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReplaceLinesRequest>,
) -> ApiResult<Json<JournalEntry>> {
    auth.require("finance.journal_entries.update")?;
    Ok(Json(
        JournalRepository::new(state.conn())
            .replace_lines(auth.tenant_id(), id, payload.lines, auth.actor())
            .await?,
    ))
}

/// POST /finance/journal-entries/{id}/post
async fn post_journal_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<JournalEntry>> {
    auth.require("finance.journal_entries.post")?;
    Ok(Json(
        JournalRepository::new(state.conn())
            .post(auth.tenant_id(), id, auth.actor())
            .await?,
    ))
}

/// POST /finance/journal-entries/{id}/void
async fn void_journal_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReasonRequest>,
) -> ApiResult<Json<VoidResponse>> {
    auth.require("finance.journal_entries.void")?;
    let (voided, reversal) = JournalRepository::new(state.conn())
        .void(auth.tenant_id(), id, &payload.reason, auth.actor())
        .await?;
    Ok(Json(VoidResponse { voided, reversal }))
}

/// DELETE /finance/journal-entries/{id} - drafts only.
async fn delete_journal_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    auth.require("finance.journal_entries.delete")?;
    JournalRepository::new(state.conn())
        .delete(auth.tenant_id(), id, auth.actor())
        .await?;
    info!(tenant_id = %auth.tenant_id(), entry_id = %id, "journal entry deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Tax rules
// ---------------------------------------------------------------------------

/// GET /finance/tax-rules
async fn list_tax_rules(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<PageResponse<TaxRule>>> {
    auth.require("finance.tax_rules.read")?;
    Ok(Json(TaxRuleRepository::new(state.conn()).list(auth.tenant_id(), &page).await?))
}

/// GET /finance/tax-rules/effective?date=
async fn effective_tax_rules(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<DateQuery>,
) -> ApiResult<Json<Vec<TaxRule>>> {
    auth.require("finance.tax_rules.read")?;
    Ok(Json(
        TaxRuleRepository::new(state.conn())
            .effective_on(auth.tenant_id(), query.date)
            .await?,
    ))
}

/// POST /finance/tax-rules
async fn create_tax_rule(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<TaxRuleInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require("finance.tax_rules.create")?;
    let rule = TaxRuleRepository::new(state.conn())
        .create(auth.tenant_id(), payload, auth.actor())
        .await?;
    Ok(created(rule))
}

/// GET /finance/tax-rules/{id}
async fn get_tax_rule(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaxRule>> {
    auth.require("finance.tax_rules.read")?;
    Ok(Json(TaxRuleRepository::new(state.conn()).find(auth.tenant_id(), id).await?))
}

/// PUT /finance/tax-rules/{id}
async fn update_tax_rule(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TaxRuleInput>,
) -> ApiResult<Json<TaxRule>> {
    auth.require("finance.tax_rules.update")?;
    let rule = TaxRuleRepository::new(state.conn())
        .update(auth.tenant_id(), id, payload, auth.actor())
        .await?;
    info!(tenant_id = %auth.tenant_id(), tax_rule_id = %rule.id, "tax rule updated");
    Ok(Json(rule))
}

/// DELETE /finance/tax-rules/{id}
async fn delete_tax_rule(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    auth.require("finance.tax_rules.delete")?;
    TaxRuleRepository::new(state.conn())
        .delete(auth.tenant_id(), id, auth.actor())
        .await?;
    info!(tenant_id = %auth.tenant_id(), tax_rule_id = %id, "tax rule deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Cheques
// ---------------------------------------------------------------------------

/// GET /finance/cheques
async fn list_cheques(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(filter): Query<StatusFilter<ChequeStatus>>,
) -> ApiResult<Json<PageResponse<Cheque>>> {
    auth.require("finance.cheques.read")?;
    Ok(Json(
        ChequeRepository::new(state.conn())
            .list(auth.tenant_id(), filter.status, &page)
            .await?,
    ))
}

/// POST /finance/cheques
async fn create_cheque(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<ChequeInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require("finance.cheques.create")?;
    let cheque = ChequeRepository::new(state.conn())
        .create(auth.tenant_id(), payload, auth.actor())
        .await?;
    Ok(created(cheque))
}

/// GET /finance/cheques/{id}
async fn get_cheque(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Cheque>> {
    auth.require("finance.cheques.read")?;
    Ok(Json(ChequeRepository::new(state.conn()).find(auth.tenant_id(), id).await?))
}

/// POST /finance/cheques/{id}/deposit
async fn deposit_cheque(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Cheque>> {
    auth.require("finance.cheques.update")?;
    let actor = auth.actor();
    Ok(Json(
        ChequeRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |c| c.deposit(actor))
            .await?,
    ))
}

/// POST /finance/cheques/{id}/clear
async fn clear_cheque(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Cheque>> {
    auth.require("finance.cheques.update")?;
    let actor = auth.actor();
    Ok(Json(
        ChequeRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |c| c.clear(actor))
            .await?,
    ))
}

/// POST /finance/cheques/{id}/bounce
async fn bounce_cheque(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReasonRequest>,
) -> ApiResult<Json<Cheque>> {
    auth.require("finance.cheques.update")?;
    let actor = auth.actor();
    Ok(Json(
        ChequeRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |c| c.bounce(&payload.reason, actor))
            .await?,
    ))
}

/// POST /finance/cheques/{id}/cancel
async fn cancel_cheque(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Cheque>> {
    auth.require("finance.cheques.update")?;
    let actor = auth.actor();
    Ok(Json(
        ChequeRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |c| c.cancel(actor))
            .await?,
    ))
}

// ---------------------------------------------------------------------------
// Credit notes
// ---------------------------------------------------------------------------

/// `?partnerId=` filter.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerFilter {
    /// Only notes for this partner.
    pub partner_id: Option<Uuid>,
}

/// GET /finance/credit-notes
async fn list_credit_notes(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(filter): Query<PartnerFilter>,
) -> ApiResult<Json<PageResponse<CreditNote>>> {
    auth.require("finance.credit_notes.read")?;
    Ok(Json(
        CreditNoteRepository::new(state.conn())
            .list(auth.tenant_id(), filter.partner_id, &page)
            .await?,
    ))
}

/// POST /finance/credit-notes
async fn create_credit_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreditNoteInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require("finance.credit_notes.create")?;
    let note = CreditNoteRepository::new(state.conn())
        .create(auth.tenant_id(), payload, auth.actor())
        .await?;
    Ok(created(note))
}

/// GET /finance/credit-notes/{id}
async fn get_credit_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CreditNote>> {
    auth.require("finance.credit_notes.read")?;
    Ok(Json(CreditNoteRepository::new(state.conn()).find(auth.tenant_id(), id).await?))
}

/// POST /finance/credit-notes/{id}/issue
async fn issue_credit_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CreditNote>> {
    auth.require("finance.credit_notes.update")?;
    let actor = auth.actor();
    Ok(Json(
        CreditNoteRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |n| n.issue(actor))
            .await?,
    ))
}

/// POST /finance/credit-notes/{id}/apply
async fn apply_credit_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AmountRequest>,
) -> ApiResult<Json<CreditNote>> {
    auth.require("finance.credit_notes.update")?;
    let actor = auth.actor();
    Ok(Json(
        CreditNoteRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |n| n.apply(payload.amount, actor))
            .await?,
    ))
}

/// POST /finance/credit-notes/{id}/cancel
async fn cancel_credit_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CreditNote>> {
    auth.require("finance.credit_notes.update")?;
    let actor = auth.actor();
    Ok(Json(
        CreditNoteRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |n| n.cancel(actor))
            .await?,
    ))
}
