//! Outbound shipments against sales orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::AuditInfo;
use crate::error::DomainResult;
use crate::guard::{self, ensure_status};
use crate::macros::text_enum;
use crate::sales::order::{OrderStatus, SalesOrder};

text_enum! {
    /// Shipment status.
    ShipmentStatus {
        /// Awaiting packing.
        Pending => "pending",
        /// Packed, not yet handed to the carrier.
        Packed => "packed",
        /// With the carrier.
        Shipped => "shipped",
        /// Received by the customer.
        Delivered => "delivered",
        /// Cancelled before dispatch.
        Cancelled => "cancelled",
    }
}

/// A delivery of goods for an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Document number.
    pub number: String,
    /// Order being fulfilled.
    pub order_id: Uuid,
    /// Customer.
    pub partner_id: Uuid,
    /// Carrier name.
    pub carrier: Option<String>,
    /// Carrier tracking number.
    pub tracking_number: Option<String>,
    /// Current status.
    pub status: ShipmentStatus,
    /// When it left.
    pub shipped_at: Option<DateTime<Utc>>,
    /// When it arrived.
    pub delivered_at: Option<DateTime<Utc>>,
    /// Audit stamps.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Input for creating a shipment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentInput {
    /// Order being fulfilled.
    pub order_id: Uuid,
    /// Carrier name.
    pub carrier: Option<String>,
}

impl Shipment {
    const ENTITY: &'static str = "shipment";

    /// Creates a pending shipment for a confirmed order.
    ///
    /// # Errors
    ///
    /// Fails unless the order is confirmed.
    pub fn create(
        tenant_id: Uuid,
        number: String,
        order: &SalesOrder,
        carrier: Option<String>,
        actor: Option<Uuid>,
    ) -> DomainResult<Self> {
        ensure_status("sales order", order.status, &[OrderStatus::Confirmed], "ship")?;
        Ok(Self {
            id: Uuid::now_v7(),
            tenant_id,
            number,
            order_id: order.id,
            partner_id: order.partner_id,
            carrier: guard::optional(carrier),
            tracking_number: None,
            status: ShipmentStatus::Pending,
            shipped_at: None,
            delivered_at: None,
            audit: AuditInfo::new(actor),
        })
    }

    /// pending → packed
    ///
    /// # Errors
    ///
    /// Fails unless pending.
    pub fn pack(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[ShipmentStatus::Pending], "pack")?;
        self.status = ShipmentStatus::Packed;
        self.audit.touch(actor);
        Ok(())
    }

    /// packed → shipped
    ///
    /// # Errors
    ///
    /// Fails unless packed or if the tracking number is blank.
    pub fn ship(&mut self, tracking_number: &str, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[ShipmentStatus::Packed], "ship")?;
        self.tracking_number = Some(guard::required("tracking number", tracking_number)?);
        self.status = ShipmentStatus::Shipped;
        self.shipped_at = Some(Utc::now());
        self.audit.touch(actor);
        Ok(())
    }

    /// shipped → delivered
    ///
    /// # Errors
    ///
    /// Fails unless shipped.
    pub fn deliver(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[ShipmentStatus::Shipped], "deliver")?;
        self.status = ShipmentStatus::Delivered;
        self.delivered_at = Some(Utc::now());
        self.audit.touch(actor);
        Ok(())
    }

    /// pending | packed → cancelled
    ///
    /// # Errors
    ///
    /// Fails once shipped.
    pub fn cancel(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(
            Self::ENTITY,
            self.status,
            &[ShipmentStatus::Pending, ShipmentStatus::Packed],
            "cancel",
        )?;
        self.status = ShipmentStatus::Cancelled;
        self.audit.touch(actor);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sales::order::tests::order;
    use rstest::rstest;

    fn shipment(status: ShipmentStatus) -> Shipment {
        let o = order(OrderStatus::Confirmed);
        let mut s = Shipment::create(o.tenant_id, "SH-000001".to_string(), &o, Some("DHL".to_string()), None)
            .unwrap();
        s.status = status;
        s
    }

    #[test]
    fn test_requires_confirmed_order() {
        let o = order(OrderStatus::Draft);
        assert!(Shipment::create(o.tenant_id, "SH-1".to_string(), &o, None, None).is_err());
    }

    #[test]
    fn test_full_flow_stamps_times() {
        let mut s = shipment(ShipmentStatus::Pending);
        s.pack(None).unwrap();
        assert!(s.ship("  ", None).is_err());
        assert_eq!(s.status, ShipmentStatus::Packed);
        s.ship("1Z999", None).unwrap();
        assert!(s.shipped_at.is_some());
        s.deliver(None).unwrap();
        assert_eq!(s.status, ShipmentStatus::Delivered);
        assert!(s.delivered_at.is_some());
    }

    #[rstest]
    #[case(ShipmentStatus::Pending, true)]
    #[case(ShipmentStatus::Packed, true)]
    #[case(ShipmentStatus::Shipped, false)]
    #[case(ShipmentStatus::Delivered, false)]
    #[case(ShipmentStatus::Cancelled, false)]
    fn test_cancel_guard(#[case] from: ShipmentStatus, #[case] ok: bool) {
        let mut s = shipment(from);
        assert_eq!(s.cancel(None).is_ok(), ok);
        assert_eq!(s.status, if ok { ShipmentStatus::Cancelled } else { from });
    }

    #[rstest]
    #[case(ShipmentStatus::Pending)]
    #[case(ShipmentStatus::Shipped)]
    #[case(ShipmentStatus::Cancelled)]
    fn test_ship_requires_packed(#[case] from: ShipmentStatus) {
        let mut s = shipment(from);
        assert!(s.ship("1Z999", None).is_err());
        assert_eq!(s.status, from);
        assert!(s.shipped_at.is_none());
    }
}
