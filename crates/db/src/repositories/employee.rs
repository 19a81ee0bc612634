//! Employee repository.

use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, QueryFilter, Set};
use tessera_core::DomainResult;
use tessera_core::hr::{Employee, EmployeeInput, EmployeeStatus};
use tessera_shared::types::{PageRequest, PageResponse};
use uuid::Uuid;

use crate::convert::{apply_audit, audit_info, decode};
use crate::entities::employees;
use crate::error::RepoResult;
use crate::scope::{TenantScoped, fetch_page, find_scoped, insert_record, modify_scoped};

impl TryFrom<employees::Model> for Employee {
    type Error = DbErr;

    fn try_from(model: employees::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            tenant_id: model.tenant_id,
            audit: audit_info!(model),
            status: decode("employee status", &model.status, EmployeeStatus::parse)?,
            code: model.code,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            hire_date: model.hire_date,
            base_salary: model.base_salary,
            monthly_allowance: model.monthly_allowance,
            termination_date: model.termination_date,
        })
    }
}

impl From<&Employee> for employees::ActiveModel {
    fn from(employee: &Employee) -> Self {
        let mut active = Self {
            id: Set(employee.id),
            tenant_id: Set(employee.tenant_id),
            code: Set(employee.code.clone()),
            first_name: Set(employee.first_name.clone()),
            last_name: Set(employee.last_name.clone()),
            email: Set(employee.email.clone()),
            hire_date: Set(employee.hire_date),
            base_salary: Set(employee.base_salary),
            monthly_allowance: Set(employee.monthly_allowance),
            status: Set(employee.status.as_str().to_string()),
            termination_date: Set(employee.termination_date),
            ..Default::default()
        };
        apply_audit!(active, &employee.audit);
        active
    }
}

/// Loads every live employee of the tenant in one status.
pub async fn employees_in_status<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    status: EmployeeStatus,
) -> Result<Vec<Employee>, DbErr> {
    employees::Entity::scoped(tenant_id)
        .filter(employees::Column::Status.eq(status.as_str()))
        .all(db)
        .await?
        .into_iter()
        .map(Employee::try_from)
        .collect()
}

/// Employee repository.
#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    db: DatabaseConnection,
}

impl EmployeeRepository {
    /// Creates a new employee repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Hires an employee. Duplicate codes surface as a conflict.
    pub async fn create(&self, tenant_id: Uuid, input: EmployeeInput, actor: Option<Uuid>) -> RepoResult<Employee> {
        let employee = Employee::create(tenant_id, input, actor)?;
        insert_record::<employees::Entity, _, _>(&self.db, &employee).await?;
        tracing::info!(%tenant_id, employee_id = %employee.id, code = %employee.code, "employee created");
        Ok(employee)
    }

    /// Loads an employee.
    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> RepoResult<Employee> {
        Ok(find_scoped::<employees::Entity, _>(&self.db, tenant_id, id).await?.try_into()?)
    }

    /// Lists employees, optionally in one status.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        status: Option<EmployeeStatus>,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<Employee>> {
        let mut select = employees::Entity::scoped(tenant_id);
        if let Some(status) = status {
            select = select.filter(employees::Column::Status.eq(status.as_str()));
        }
        fetch_page(&self.db, select, page).await
    }

    /// Updates an employee.
    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: EmployeeInput,
        actor: Option<Uuid>,
    ) -> RepoResult<Employee> {
        modify_scoped::<employees::Entity, _, _>(&self.db, tenant_id, id, |employee| employee.update(input, actor)).await
    }

    /// Applies a status transition under a row lock.
    pub async fn transition<F>(&self, tenant_id: Uuid, id: Uuid, apply: F) -> RepoResult<Employee>
    where
        F: FnOnce(&mut Employee) -> DomainResult<()> + Send,
    {
        let employee = modify_scoped::<employees::Entity, _, _>(&self.db, tenant_id, id, apply).await?;
        tracing::info!(%tenant_id, employee_id = %employee.id, status = %employee.status, "employee status changed");
        Ok(employee)
    }
}
