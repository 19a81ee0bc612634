//! Shipment repository.

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, QueryFilter, Set, TransactionTrait};
use tessera_core::DomainResult;
use tessera_core::sales::{Shipment, ShipmentInput, ShipmentStatus};
use tessera_shared::types::{PageRequest, PageResponse};
use uuid::Uuid;

use crate::convert::{apply_audit, audit_info, decode};
use crate::entities::shipments;
use crate::error::RepoResult;
use crate::repositories::sales_order::load_order;
use crate::scope::{TenantScoped, fetch_page, find_scoped, insert_record, modify_scoped};
use crate::sequence::{next_number, prefix};

impl TryFrom<shipments::Model> for Shipment {
    type Error = DbErr;

    fn try_from(model: shipments::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            tenant_id: model.tenant_id,
            audit: audit_info!(model),
            status: decode("shipment status", &model.status, ShipmentStatus::parse)?,
            number: model.number,
            order_id: model.order_id,
            partner_id: model.partner_id,
            carrier: model.carrier,
            tracking_number: model.tracking_number,
            shipped_at: model.shipped_at,
            delivered_at: model.delivered_at,
        })
    }
}

impl From<&Shipment> for shipments::ActiveModel {
    fn from(shipment: &Shipment) -> Self {
        let mut active = Self {
            id: Set(shipment.id),
            tenant_id: Set(shipment.tenant_id),
            number: Set(shipment.number.clone()),
            order_id: Set(shipment.order_id),
            partner_id: Set(shipment.partner_id),
            carrier: Set(shipment.carrier.clone()),
            tracking_number: Set(shipment.tracking_number.clone()),
            status: Set(shipment.status.as_str().to_string()),
            shipped_at: Set(shipment.shipped_at),
            delivered_at: Set(shipment.delivered_at),
            ..Default::default()
        };
        apply_audit!(active, &shipment.audit);
        active
    }
}

/// Shipment repository.
#[derive(Debug, Clone)]
pub struct ShipmentRepository {
    db: DatabaseConnection,
}

impl ShipmentRepository {
    /// Creates a new shipment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a pending shipment for a confirmed order.
    pub async fn create(&self, tenant_id: Uuid, input: ShipmentInput, actor: Option<Uuid>) -> RepoResult<Shipment> {
        let txn = self.db.begin().await?;
        let order = load_order(&txn, tenant_id, input.order_id, false).await?;
        let number = next_number(&txn, tenant_id, prefix::SHIPMENT).await?;
        let shipment = Shipment::create(tenant_id, number, &order, input.carrier, actor)?;
        insert_record::<shipments::Entity, _, _>(&txn, &shipment).await?;
        txn.commit().await?;

        tracing::info!(%tenant_id, shipment_id = %shipment.id, order_id = %order.id, "shipment created");
        Ok(shipment)
    }

    /// Loads a shipment.
    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> RepoResult<Shipment> {
        Ok(find_scoped::<shipments::Entity, _>(&self.db, tenant_id, id).await?.try_into()?)
    }

    /// Lists shipments, optionally for one order.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        order_id: Option<Uuid>,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<Shipment>> {
        let mut select = shipments::Entity::scoped(tenant_id);
        if let Some(order_id) = order_id {
            select = select.filter(shipments::Column::OrderId.eq(order_id));
        }
        fetch_page(&self.db, select, page).await
    }

    /// Applies a status transition under a row lock.
    pub async fn transition<F>(&self, tenant_id: Uuid, id: Uuid, apply: F) -> RepoResult<Shipment>
    where
        F: FnOnce(&mut Shipment) -> DomainResult<()> + Send,
    {
        let shipment = modify_scoped::<shipments::Entity, _, _>(&self.db, tenant_id, id, apply).await?;
        tracing::info!(%tenant_id, shipment_id = %shipment.id, status = %shipment.status, "shipment status changed");
        Ok(shipment)
    }
}
