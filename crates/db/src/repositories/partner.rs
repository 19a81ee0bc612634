//! Business partner repository.

use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, QueryFilter, Set};
use tessera_core::crm::{BusinessPartner, PartnerInput};
use tessera_shared::types::{PageRequest, PageResponse};
use uuid::Uuid;

use crate::convert::{apply_audit, audit_info};
use crate::entities::business_partners;
use crate::error::RepoResult;
use crate::scope::{TenantScoped, fetch_page, find_scoped, insert_record, modify_scoped};

impl TryFrom<business_partners::Model> for BusinessPartner {
    type Error = DbErr;

    fn try_from(model: business_partners::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            tenant_id: model.tenant_id,
            audit: audit_info!(model),
            code: model.code,
            name: model.name,
            is_customer: model.is_customer,
            is_supplier: model.is_supplier,
            email: model.email,
            phone: model.phone,
            tax_number: model.tax_number,
            credit_limit: model.credit_limit,
            is_active: model.is_active,
        })
    }
}

impl From<&BusinessPartner> for business_partners::ActiveModel {
    fn from(partner: &BusinessPartner) -> Self {
        let mut active = Self {
            id: Set(partner.id),
            tenant_id: Set(partner.tenant_id),
            code: Set(partner.code.clone()),
            name: Set(partner.name.clone()),
            is_customer: Set(partner.is_customer),
            is_supplier: Set(partner.is_supplier),
            email: Set(partner.email.clone()),
            phone: Set(partner.phone.clone()),
            tax_number: Set(partner.tax_number.clone()),
            credit_limit: Set(partner.credit_limit),
            is_active: Set(partner.is_active),
            ..Default::default()
        };
        apply_audit!(active, &partner.audit);
        active
    }
}

/// Loads a partner and checks it can appear on sales documents.
pub async fn active_customer<C: ConnectionTrait>(db: &C, tenant_id: Uuid, id: Uuid) -> RepoResult<BusinessPartner> {
    let partner = BusinessPartner::try_from(find_scoped::<business_partners::Entity, _>(db, tenant_id, id).await?)?;
    partner.ensure_customer()?;
    Ok(partner)
}

/// Loads a partner and checks it can appear on purchase documents.
pub async fn active_supplier<C: ConnectionTrait>(db: &C, tenant_id: Uuid, id: Uuid) -> RepoResult<BusinessPartner> {
    let partner = BusinessPartner::try_from(find_scoped::<business_partners::Entity, _>(db, tenant_id, id).await?)?;
    partner.ensure_supplier()?;
    Ok(partner)
}

/// Partner role filter for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartnerRole {
    /// Customers only.
    Customer,
    /// Suppliers only.
    Supplier,
}

/// Business partner repository.
#[derive(Debug, Clone)]
pub struct PartnerRepository {
    db: DatabaseConnection,
}

impl PartnerRepository {
    /// Creates a new partner repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a partner. Duplicate codes surface as a conflict.
    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: PartnerInput,
        actor: Option<Uuid>,
    ) -> RepoResult<BusinessPartner> {
        let partner = BusinessPartner::create(tenant_id, input, actor)?;
        insert_record::<business_partners::Entity, _, _>(&self.db, &partner).await?;
        tracing::info!(%tenant_id, partner_id = %partner.id, code = %partner.code, "business partner created");
        Ok(partner)
    }

    /// Loads a partner.
    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> RepoResult<BusinessPartner> {
        Ok(find_scoped::<business_partners::Entity, _>(&self.db, tenant_id, id).await?.try_into()?)
    }

    /// Lists partners, optionally restricted to customers or suppliers.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        role: Option<PartnerRole>,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<BusinessPartner>> {
        let select = match role {
            Some(PartnerRole::Customer) => {
                business_partners::Entity::scoped(tenant_id).filter(business_partners::Column::IsCustomer.eq(true))
            }
            Some(PartnerRole::Supplier) => {
                business_partners::Entity::scoped(tenant_id).filter(business_partners::Column::IsSupplier.eq(true))
            }
            None => business_partners::Entity::scoped(tenant_id),
        };
        fetch_page(&self.db, select, page).await
    }

    /// Updates a partner.
    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: PartnerInput,
        actor: Option<Uuid>,
    ) -> RepoResult<BusinessPartner> {
        modify_scoped::<business_partners::Entity, _, _>(&self.db, tenant_id, id, |partner| {
            partner.update(input, actor)
        })
        .await
    }

    /// Activates or deactivates a partner.
    pub async fn set_active(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        active: bool,
        actor: Option<Uuid>,
    ) -> RepoResult<BusinessPartner> {
        let partner = modify_scoped::<business_partners::Entity, _, _>(&self.db, tenant_id, id, |partner| {
            if active {
                partner.activate(actor);
            } else {
                partner.deactivate(actor);
            }
            Ok(())
        })
        .await?;
        tracing::info!(%tenant_id, partner_id = %partner.id, active, "business partner activation changed");
        Ok(partner)
    }
}
