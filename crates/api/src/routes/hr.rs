//! HR routes: employees, leave, social security rates, and payroll runs.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use super::{StatusFilter, created};
use crate::{ApiResult, AppState, middleware::AuthUser};
use tessera_core::hr::{
    Employee, EmployeeInput, EmployeeStatus, LeaveAllocation, LeaveAllocationInput, LeaveRequest, LeaveRequestInput,
    LeaveStatus, LeaveType, LeaveTypeInput, Payroll, PayrollInput, PayrollStatus, SocialSecurityRate,
    SocialSecurityRateInput,
};
use tessera_db::{EmployeeRepository, LeaveRepository, PayrollRepository, SocialSecurityRepository};
use tessera_shared::types::{PageRequest, PageResponse};

/// Creates the HR routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/employees", get(list_employees).post(create_employee))
        .route("/employees/{id}", get(get_employee).put(update_employee))
        .route("/employees/{id}/leave", post(mark_on_leave))
        .route("/employees/{id}/return", post(return_from_leave))
        .route("/employees/{id}/terminate", post(terminate_employee))
        .route("/leave-types", get(list_leave_types).post(create_leave_type))
        .route("/leave-allocations", get(list_allocations).post(create_allocation))
        .route("/leave-allocations/{id}", get(get_allocation).put(adjust_allocation))
        .route("/leave-requests", get(list_leave_requests).post(create_leave_request))
        .route("/leave-requests/{id}", get(get_leave_request))
        .route("/leave-requests/{id}/approve", post(approve_leave_request))
        .route("/leave-requests/{id}/reject", post(reject_leave_request))
        .route("/leave-requests/{id}/cancel", post(cancel_leave_request))
        .route("/social-security-rates", get(list_rates).post(create_rate))
        .route("/social-security-rates/{id}", get(get_rate).put(update_rate))
        .route("/payrolls", get(list_payrolls).post(create_payroll))
        .route("/payrolls/{id}", get(get_payroll))
        .route("/payrolls/{id}/calculate", post(calculate_payroll))
        .route("/payrolls/{id}/approve", post(approve_payroll))
        .route("/payrolls/{id}/pay", post(pay_payroll))
        .route("/payrolls/{id}/cancel", post(cancel_payroll))
}

// ---------------------------------------------------------------------------
// Employees
// ---------------------------------------------------------------------------

/// Body for terminating an employee.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminateRequest {
    /// Last working day.
    pub termination_date: NaiveDate,
}

/// GET /hr/employees
async fn list_employees(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(filter): Query<StatusFilter<EmployeeStatus>>,
) -> ApiResult<Json<PageResponse<Employee>>> {
    auth.require("hr.employees.read")?;
    Ok(Json(
        EmployeeRepository::new(state.conn())
            .list(auth.tenant_id(), filter.status, &page)
            .await?,
    ))
}

/// POST /hr/employees
async fn create_employee(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<EmployeeInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require("hr.employees.create")?;
    let employee = EmployeeRepository::new(state.conn())
        .create(auth.tenant_id(), payload, auth.actor())
        .await?;
    Ok(created(employee))
}

/// GET /hr/employees/{id}
async fn get_employee(State(state): State<AppState>, auth: AuthUser, Path(id): Path<Uuid>) -> ApiResult<Json<Employee>> {
    auth.require("hr.employees.read")?;
    Ok(Json(EmployeeRepository::new(state.conn()).find(auth.tenant_id(), id).await?))
}

/// PUT /hr/employees/{id}
async fn update_employee(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<EmployeeInput>,
) -> ApiResult<Json<Employee>> {
    auth.require("hr.employees.update")?;
    Ok(Json(
        EmployeeRepository::new(state.conn())
            .update(auth.tenant_id(), id, payload, auth.actor())
            .await?,
    ))
}

/// POST /hr/employees/{id}/leave
async fn mark_on_leave(State(state): State<AppState>, auth: AuthUser, Path(id): Path<Uuid>) -> ApiResult<Json<Employee>> {
    auth.require("hr.employees.update")?;
    let actor = auth.actor();
    Ok(Json(
        EmployeeRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |e| e.mark_on_leave(actor))
            .await?,
    ))
}

/// POST /hr/employees/{id}/return
async fn return_from_leave(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Employee>> {
    auth.require("hr.employees.update")?;
    let actor = auth.actor();
    Ok(Json(
        EmployeeRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |e| e.return_from_leave(actor))
            .await?,
    ))
}

/// POST /hr/employees/{id}/terminate
async fn terminate_employee(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TerminateRequest>,
) -> ApiResult<Json<Employee>> {
    auth.require("hr.employees.update")?;
    let actor = auth.actor();
    Ok(Json(
        EmployeeRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |e| e.terminate(payload.termination_date, actor))
            .await?,
    ))
}

// ---------------------------------------------------------------------------
// Leave
// ---------------------------------------------------------------------------

/// `?employeeId=` filter.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeFilter {
    /// Only allocations of this employee.
    pub employee_id: Option<Uuid>,
}

/// Body for changing an allocation's entitlement.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustAllocationRequest {
    /// New total, not below the days already used.
    pub total_days: Decimal,
}

/// Body for rejecting a request.
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    /// Why the request was declined.
    pub reason: String,
}

/// GET /hr/leave-types
async fn list_leave_types(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<PageResponse<LeaveType>>> {
    auth.require("hr.leave.read")?;
    Ok(Json(LeaveRepository::new(state.conn()).list_types(auth.tenant_id(), &page).await?))
}

/// POST /hr/leave-types
async fn create_leave_type(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<LeaveTypeInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require("hr.leave.create")?;
    let leave_type = LeaveRepository::new(state.conn())
        .create_type(auth.tenant_id(), payload, auth.actor())
        .await?;
    Ok(created(leave_type))
}

/// GET /hr/leave-allocations
async fn list_allocations(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(filter): Query<EmployeeFilter>,
) -> ApiResult<Json<PageResponse<LeaveAllocation>>> {
    auth.require("hr.leave.read")?;
    Ok(Json(
        LeaveRepository::new(state.conn())
            .list_allocations(auth.tenant_id(), filter.employee_id, &page)
            .await?,
    ))
}

/// POST /hr/leave-allocations
async fn create_allocation(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<LeaveAllocationInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require("hr.leave.create")?;
    let allocation = LeaveRepository::new(state.conn())
        .create_allocation(auth.tenant_id(), payload, auth.actor())
        .await?;
    Ok(created(allocation))
}

/// GET /hr/leave-allocations/{id}
async fn get_allocation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LeaveAllocation>> {
    auth.require("hr.leave.read")?;
    Ok(Json(
        LeaveRepository::new(state.conn())
            .find_allocation(auth.tenant_id(), id)
            .await?,
    ))
}

/// PUT /hr/leave-allocations/{id}
async fn adjust_allocation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdjustAllocationRequest>,
) -> ApiResult<Json<LeaveAllocation>> {
    auth.require("hr.leave.update")?;
    Ok(Json(
        LeaveRepository::new(state.conn())
            .adjust_allocation(auth.tenant_id(), id, payload.total_days, auth.actor())
            .await?,
    ))
}

/// GET /hr/leave-requests
async fn list_leave_requests(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(filter): Query<StatusFilter<LeaveStatus>>,
) -> ApiResult<Json<PageResponse<LeaveRequest>>> {
    auth.require("hr.leave.read")?;
    Ok(Json(
        LeaveRepository::new(state.conn())
            .list_requests(auth.tenant_id(), filter.status, &page)
            .await?,
    ))
}

/// POST /hr/leave-requests
async fn create_leave_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<LeaveRequestInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require("hr.leave.create")?;
    let request = LeaveRepository::new(state.conn())
        .create_request(auth.tenant_id(), payload, auth.actor())
        .await?;
    Ok(created(request))
}

/// GET /hr/leave-requests/{id}
async fn get_leave_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LeaveRequest>> {
    auth.require("hr.leave.read")?;
    Ok(Json(LeaveRepository::new(state.conn()).find_request(auth.tenant_id(), id).await?))
}

/// POST /hr/leave-requests/{id}/approve - deducts the days from the allocation.
async fn approve_leave_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LeaveRequest>> {
    auth.require("hr.leave.approve")?;
    Ok(Json(
        LeaveRepository::new(state.conn())
            .approve(auth.tenant_id(), id, auth.actor())
            .await?,
    ))
}

/// POST /hr/leave-requests/{id}/reject
async fn reject_leave_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectRequest>,
) -> ApiResult<Json<LeaveRequest>> {
    auth.require("hr.leave.approve")?;
    Ok(Json(
        LeaveRepository::new(state.conn())
            .reject(auth.tenant_id(), id, &payload.reason, auth.actor())
            .await?,
    ))
}

/// POST /hr/leave-requests/{id}/cancel - restores approved days.
async fn cancel_leave_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LeaveRequest>> {
    auth.require("hr.leave.update")?;
    Ok(Json(
        LeaveRepository::new(state.conn())
            .cancel(auth.tenant_id(), id, auth.actor())
            .await?,
    ))
}

// ---------------------------------------------------------------------------
// Social security
// ---------------------------------------------------------------------------

/// GET /hr/social-security-rates
async fn list_rates(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<PageResponse<SocialSecurityRate>>> {
    auth.require("hr.social_security.read")?;
    Ok(Json(
        SocialSecurityRepository::new(state.conn())
            .list(auth.tenant_id(), &page)
            .await?,
    ))
}

/// POST /hr/social-security-rates
async fn create_rate(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<SocialSecurityRateInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require("hr.social_security.create")?;
    let rate = SocialSecurityRepository::new(state.conn())
        .create(auth.tenant_id(), payload, auth.actor())
        .await?;
    Ok(created(rate))
}

/// GET /hr/social-security-rates/{id}
async fn get_rate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SocialSecurityRate>> {
    auth.require("hr.social_security.read")?;
    Ok(Json(SocialSecurityRepository::new(state.conn()).find(auth.tenant_id(), id).await?))
}

/// PUT /hr/social-security-rates/{id}
async fn update_rate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SocialSecurityRateInput>,
) -> ApiResult<Json<SocialSecurityRate>> {
    auth.require("hr.social_security.update")?;
    Ok(Json(
        SocialSecurityRepository::new(state.conn())
            .update(auth.tenant_id(), id, payload, auth.actor())
            .await?,
    ))
}

// ---------------------------------------------------------------------------
// Payroll
// ---------------------------------------------------------------------------

/// GET /hr/payrolls - headers only; entries come with the single-run view.
async fn list_payrolls(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(filter): Query<StatusFilter<PayrollStatus>>,
) -> ApiResult<Json<PageResponse<Payroll>>> {
    auth.require("hr.payrolls.read")?;
    Ok(Json(
        PayrollRepository::new(state.conn())
            .list(auth.tenant_id(), filter.status, &page)
            .await?,
    ))
}

/// POST /hr/payrolls
async fn create_payroll(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<PayrollInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require("hr.payrolls.create")?;
    let payroll = PayrollRepository::new(state.conn())
        .create(auth.tenant_id(), payload, auth.actor())
        .await?;
    Ok(created(payroll))
}

/// GET /hr/payrolls/{id}
async fn get_payroll(State(state): State<AppState>, auth: AuthUser, Path(id): Path<Uuid>) -> ApiResult<Json<Payroll>> {
    auth.require("hr.payrolls.read")?;
    Ok(Json(PayrollRepository::new(state.conn()).find(auth.tenant_id(), id).await?))
}

/// POST /hr/payrolls/{id}/calculate - (re)computes every entry.
async fn calculate_payroll(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Payroll>> {
    auth.require("hr.payrolls.calculate")?;
    Ok(Json(
        PayrollRepository::new(state.conn())
            .calculate(auth.tenant_id(), id, auth.actor())
            .await?,
    ))
}

/// POST /hr/payrolls/{id}/approve
async fn approve_payroll(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Payroll>> {
    auth.require("hr.payrolls.approve")?;
    let actor = auth.actor();
    Ok(Json(
        PayrollRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |p| p.approve(actor))
            .await?,
    ))
}

/// POST /hr/payrolls/{id}/pay
async fn pay_payroll(State(state): State<AppState>, auth: AuthUser, Path(id): Path<Uuid>) -> ApiResult<Json<Payroll>> {
    auth.require("hr.payrolls.pay")?;
    let actor = auth.actor();
    Ok(Json(
        PayrollRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |p| p.pay(actor))
            .await?,
    ))
}

/// POST /hr/payrolls/{id}/cancel
async fn cancel_payroll(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Payroll>> {
    auth.require("hr.payrolls.cancel")?;
    let actor = auth.actor();
    Ok(Json(
        PayrollRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |p| p.cancel(actor))
            .await?,
    ))
}
