//! Leave type, allocation, and request repositories.

use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, QueryFilter, Set, TransactionTrait};
use tessera_core::hr::{
    LeaveAllocation, LeaveAllocationInput, LeaveRequest, LeaveRequestInput, LeaveStatus, LeaveType,
    LeaveTypeInput,
};
use tessera_core::{DomainError, DomainResult};
use tessera_shared::types::{PageRequest, PageResponse};
use uuid::Uuid;

use crate::convert::{apply_audit, audit_info, decode};
use crate::entities::{employees, leave_allocations, leave_requests, leave_types};
use crate::error::RepoResult;
use crate::scope::{TenantScoped, fetch_page, find_scoped, insert_record, lock_scoped, modify_scoped};

impl TryFrom<leave_types::Model> for LeaveType {
    type Error = DbErr;

    fn try_from(model: leave_types::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            tenant_id: model.tenant_id,
            audit: audit_info!(model),
            code: model.code,
            name: model.name,
            is_paid: model.is_paid,
        })
    }
}

impl From<&LeaveType> for leave_types::ActiveModel {
    fn from(leave_type: &LeaveType) -> Self {
        let mut active = Self {
            id: Set(leave_type.id),
            tenant_id: Set(leave_type.tenant_id),
            code: Set(leave_type.code.clone()),
            name: Set(leave_type.name.clone()),
            is_paid: Set(leave_type.is_paid),
            ..Default::default()
        };
        apply_audit!(active, &leave_type.audit);
        active
    }
}

impl TryFrom<leave_allocations::Model> for LeaveAllocation {
    type Error = DbErr;

    fn try_from(model: leave_allocations::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            tenant_id: model.tenant_id,
            audit: audit_info!(model),
            employee_id: model.employee_id,
            leave_type_id: model.leave_type_id,
            year: model.year,
            total_days_allocated: model.total_days_allocated,
            days_used: model.days_used,
        })
    }
}

impl From<&LeaveAllocation> for leave_allocations::ActiveModel {
    fn from(allocation: &LeaveAllocation) -> Self {
        let mut active = Self {
            id: Set(allocation.id),
            tenant_id: Set(allocation.tenant_id),
            employee_id: Set(allocation.employee_id),
            leave_type_id: Set(allocation.leave_type_id),
            year: Set(allocation.year),
            total_days_allocated: Set(allocation.total_days_allocated),
            days_used: Set(allocation.days_used),
            ..Default::default()
        };
        apply_audit!(active, &allocation.audit);
        active
    }
}

impl TryFrom<leave_requests::Model> for LeaveRequest {
    type Error = DbErr;

    fn try_from(model: leave_requests::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            tenant_id: model.tenant_id,
            audit: audit_info!(model),
            status: decode("leave status", &model.status, LeaveStatus::parse)?,
            employee_id: model.employee_id,
            allocation_id: model.allocation_id,
            start_date: model.start_date,
            end_date: model.end_date,
            days: model.days,
            reason: model.reason,
            rejection_reason: model.rejection_reason,
            decided_at: model.decided_at,
            decided_by: model.decided_by,
        })
    }
}

impl From<&LeaveRequest> for leave_requests::ActiveModel {
    fn from(request: &LeaveRequest) -> Self {
        let mut active = Self {
            id: Set(request.id),
            tenant_id: Set(request.tenant_id),
            employee_id: Set(request.employee_id),
            allocation_id: Set(request.allocation_id),
            start_date: Set(request.start_date),
            end_date: Set(request.end_date),
            days: Set(request.days),
            reason: Set(request.reason.clone()),
            status: Set(request.status.as_str().to_string()),
            rejection_reason: Set(request.rejection_reason.clone()),
            decided_at: Set(request.decided_at),
            decided_by: Set(request.decided_by),
            ..Default::default()
        };
        apply_audit!(active, &request.audit);
        active
    }
}

/// Leave repository covering types, allocations, and requests.
#[derive(Debug, Clone)]
pub struct LeaveRepository {
    db: DatabaseConnection,
}

impl LeaveRepository {
    /// Creates a new leave repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a leave type.
    pub async fn create_type(&self, tenant_id: Uuid, input: LeaveTypeInput, actor: Option<Uuid>) -> RepoResult<LeaveType> {
        let leave_type = LeaveType::create(tenant_id, input, actor)?;
        insert_record::<leave_types::Entity, _, _>(&self.db, &leave_type).await?;
        tracing::info!(%tenant_id, leave_type_id = %leave_type.id, code = %leave_type.code, "leave type created");
        Ok(leave_type)
    }

    /// Lists leave types.
    pub async fn list_types(&self, tenant_id: Uuid, page: &PageRequest) -> RepoResult<PageResponse<LeaveType>> {
        fetch_page(&self.db, leave_types::Entity::scoped(tenant_id), page).await
    }

    /// Grants days of one leave type to an employee for a year.
    pub async fn create_allocation(
        &self,
        tenant_id: Uuid,
        input: LeaveAllocationInput,
        actor: Option<Uuid>,
    ) -> RepoResult<LeaveAllocation> {
        find_scoped::<employees::Entity, _>(&self.db, tenant_id, input.employee_id).await?;
        find_scoped::<leave_types::Entity, _>(&self.db, tenant_id, input.leave_type_id).await?;
        let allocation = LeaveAllocation::create(tenant_id, input, actor)?;
        insert_record::<leave_allocations::Entity, _, _>(&self.db, &allocation).await?;
        tracing::info!(
            %tenant_id,
            allocation_id = %allocation.id,
            employee_id = %allocation.employee_id,
            days = %allocation.total_days_allocated,
            "leave allocated"
        );
        Ok(allocation)
    }

    /// Loads an allocation.
    pub async fn find_allocation(&self, tenant_id: Uuid, id: Uuid) -> RepoResult<LeaveAllocation> {
        Ok(find_scoped::<leave_allocations::Entity, _>(&self.db, tenant_id, id).await?.try_into()?)
    }

    /// Lists allocations, optionally for one employee.
    pub async fn list_allocations(
        &self,
        tenant_id: Uuid,
        employee_id: Option<Uuid>,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<LeaveAllocation>> {
        let mut select = leave_allocations::Entity::scoped(tenant_id);
        if let Some(employee_id) = employee_id {
            select = select.filter(leave_allocations::Column::EmployeeId.eq(employee_id));
        }
        fetch_page(&self.db, select, page).await
    }

    /// Changes the days granted; never below the days already used.
    pub async fn adjust_allocation(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        total: Decimal,
        actor: Option<Uuid>,
    ) -> RepoResult<LeaveAllocation> {
        modify_scoped::<leave_allocations::Entity, _, _>(&self.db, tenant_id, id, |allocation| {
            allocation.adjust_allocation(total, actor)
        })
        .await
    }

    /// Files a pending request against an allocation.
    pub async fn create_request(
        &self,
        tenant_id: Uuid,
        input: LeaveRequestInput,
        actor: Option<Uuid>,
    ) -> RepoResult<LeaveRequest> {
        let allocation = self.find_allocation(tenant_id, input.allocation_id).await?;
        let request = LeaveRequest::create(&allocation, input, actor)?;
        insert_record::<leave_requests::Entity, _, _>(&self.db, &request).await?;
        tracing::info!(%tenant_id, request_id = %request.id, days = %request.days, "leave requested");
        Ok(request)
    }

    /// Loads a request.
    pub async fn find_request(&self, tenant_id: Uuid, id: Uuid) -> RepoResult<LeaveRequest> {
        Ok(find_scoped::<leave_requests::Entity, _>(&self.db, tenant_id, id).await?.try_into()?)
    }

    /// Lists requests, optionally in one status.
    pub async fn list_requests(
        &self,
        tenant_id: Uuid,
        status: Option<LeaveStatus>,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<LeaveRequest>> {
        let mut select = leave_requests::Entity::scoped(tenant_id);
        if let Some(status) = status {
            select = select.filter(leave_requests::Column::Status.eq(status.as_str()));
        }
        fetch_page(&self.db, select, page).await
    }

    /// Approves a request, consuming days in the same transaction.
    pub async fn approve(&self, tenant_id: Uuid, id: Uuid, actor: Option<Uuid>) -> RepoResult<LeaveRequest> {
        self.decide(tenant_id, id, |request, allocation| request.approve(allocation, actor)).await
    }

    /// Cancels a request, restoring days if it had been approved.
    pub async fn cancel(&self, tenant_id: Uuid, id: Uuid, actor: Option<Uuid>) -> RepoResult<LeaveRequest> {
        self.decide(tenant_id, id, |request, allocation| request.cancel(allocation, actor)).await
    }

    /// Rejects a pending request.
    pub async fn reject(&self, tenant_id: Uuid, id: Uuid, reason: &str, actor: Option<Uuid>) -> RepoResult<LeaveRequest> {
        let request = modify_scoped::<leave_requests::Entity, _, _>(&self.db, tenant_id, id, |request| {
            request.reject(reason, actor)
        })
        .await?;
        tracing::info!(%tenant_id, request_id = %request.id, status = %request.status, "leave request decided");
        Ok(request)
    }

    async fn decide<F>(&self, tenant_id: Uuid, id: Uuid, apply: F) -> RepoResult<LeaveRequest>
    where
        F: FnOnce(&mut LeaveRequest, &mut LeaveAllocation) -> DomainResult<()> + Send,
    {
        let txn = self.db.begin().await?;
        let mut request = LeaveRequest::try_from(lock_scoped::<leave_requests::Entity, _>(&txn, tenant_id, id).await?)?;
        let mut allocation = LeaveAllocation::try_from(
            lock_scoped::<leave_allocations::Entity, _>(&txn, tenant_id, request.allocation_id).await?,
        )?;
        if allocation.employee_id != request.employee_id {
            return Err(DomainError::invalid("Leave request belongs to a different employee").into());
        }
        apply(&mut request, &mut allocation)?;
        leave_allocations::ActiveModel::from(&allocation).update(&txn).await?;
        leave_requests::ActiveModel::from(&request).update(&txn).await?;
        txn.commit().await?;

        tracing::info!(
            %tenant_id,
            request_id = %request.id,
            status = %request.status,
            days_remaining = %allocation.days_remaining(),
            "leave request decided"
        );
        Ok(request)
    }
}
