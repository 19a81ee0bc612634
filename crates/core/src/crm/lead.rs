//! Leads and their conversion into opportunities.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::AuditInfo;
use crate::crm::opportunity::{Opportunity, OpportunityInput};
use crate::error::DomainResult;
use crate::guard::{self, ensure_status};
use crate::macros::text_enum;

text_enum! {
    /// Lead qualification status.
    LeadStatus {
        /// Just captured.
        New => "new",
        /// First contact made.
        Contacted => "contacted",
        /// Worth pursuing.
        Qualified => "qualified",
        /// Turned into an opportunity.
        Converted => "converted",
        /// Not worth pursuing.
        Disqualified => "disqualified",
    }
}

/// A prospective customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Contact name.
    pub name: String,
    /// Company.
    pub company: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Where the lead came from.
    pub source: Option<String>,
    /// Current status.
    pub status: LeadStatus,
    /// Why the lead was disqualified.
    pub disqualified_reason: Option<String>,
    /// Opportunity created on conversion.
    pub converted_opportunity_id: Option<Uuid>,
    /// Audit stamps.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Input for capturing a lead.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadInput {
    /// Contact name.
    pub name: String,
    /// Company.
    pub company: Option<String>,
    /// Email.
    pub email: Option<String>,
    /// Phone.
    pub phone: Option<String>,
    /// Source.
    pub source: Option<String>,
}

impl Lead {
    const ENTITY: &'static str = "lead";

    /// Captures a new lead.
    ///
    /// # Errors
    ///
    /// Fails for an empty name.
    pub fn create(tenant_id: Uuid, input: LeadInput, actor: Option<Uuid>) -> DomainResult<Self> {
        Ok(Self {
            id: Uuid::now_v7(),
            tenant_id,
            name: guard::required("name", &input.name)?,
            company: guard::optional(input.company),
            email: guard::optional(input.email).map(|e| e.to_lowercase()),
            phone: guard::optional(input.phone),
            source: guard::optional(input.source),
            status: LeadStatus::New,
            disqualified_reason: None,
            converted_opportunity_id: None,
            audit: AuditInfo::new(actor),
        })
    }

    /// new → contacted
    ///
    /// # Errors
    ///
    /// Fails unless new.
    pub fn contact(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[LeadStatus::New], "contact")?;
        self.status = LeadStatus::Contacted;
        self.audit.touch(actor);
        Ok(())
    }

    /// new | contacted → qualified
    ///
    /// # Errors
    ///
    /// Fails from any other status.
    pub fn qualify(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(
            Self::ENTITY,
            self.status,
            &[LeadStatus::New, LeadStatus::Contacted],
            "qualify",
        )?;
        self.status = LeadStatus::Qualified;
        self.audit.touch(actor);
        Ok(())
    }

    /// new | contacted | qualified → disqualified
    ///
    /// # Errors
    ///
    /// Fails from any other status or with an empty reason.
    pub fn disqualify(&mut self, reason: &str, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(
            Self::ENTITY,
            self.status,
            &[LeadStatus::New, LeadStatus::Contacted, LeadStatus::Qualified],
            "disqualify",
        )?;
        let reason = guard::required("reason", reason)?;
        self.status = LeadStatus::Disqualified;
        self.disqualified_reason = Some(reason);
        self.audit.touch(actor);
        Ok(())
    }

    /// qualified → converted, returning the new opportunity.
    ///
    /// # Errors
    ///
    /// Fails unless qualified or if the opportunity input is invalid.
    pub fn convert(&mut self, input: OpportunityInput, actor: Option<Uuid>) -> DomainResult<Opportunity> {
        ensure_status(Self::ENTITY, self.status, &[LeadStatus::Qualified], "convert")?;
        let opportunity = Opportunity::create(self.tenant_id, input, Some(self.id), actor)?;
        self.status = LeadStatus::Converted;
        self.converted_opportunity_id = Some(opportunity.id);
        self.audit.touch(actor);
        Ok(opportunity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn lead_in(status: LeadStatus) -> Lead {
        let mut lead = Lead::create(
            Uuid::new_v4(),
            LeadInput {
                name: "Grace Hopper".to_string(),
                company: Some("Navy".to_string()),
                email: None,
                phone: None,
                source: Some("web".to_string()),
            },
            None,
        )
        .unwrap();
        lead.status = status;
        lead
    }

    fn opp_input() -> OpportunityInput {
        OpportunityInput {
            name: "Compiler licence".to_string(),
            partner_id: None,
            estimated_value: dec!(5000),
            expected_close_date: None,
            currency: "USD".to_string(),
        }
    }

    #[rstest]
    #[case(LeadStatus::New, true)]
    #[case(LeadStatus::Contacted, true)]
    #[case(LeadStatus::Qualified, false)]
    #[case(LeadStatus::Converted, false)]
    #[case(LeadStatus::Disqualified, false)]
    fn test_qualify_guard(#[case] from: LeadStatus, #[case] ok: bool) {
        let mut lead = lead_in(from);
        assert_eq!(lead.qualify(None).is_ok(), ok);
        assert_eq!(lead.status, if ok { LeadStatus::Qualified } else { from });
    }

    #[rstest]
    #[case(LeadStatus::New, true)]
    #[case(LeadStatus::Qualified, true)]
    #[case(LeadStatus::Converted, false)]
    fn test_disqualify_guard(#[case] from: LeadStatus, #[case] ok: bool) {
        let mut lead = lead_in(from);
        assert_eq!(lead.disqualify("No budget", None).is_ok(), ok);
    }

    #[test]
    fn test_contact_only_from_new() {
        let mut lead = lead_in(LeadStatus::New);
        lead.contact(None).unwrap();
        assert!(lead.contact(None).is_err());
    }

    #[test]
    fn test_convert_creates_opportunity() {
        let mut lead = lead_in(LeadStatus::Contacted);
        assert!(lead.convert(opp_input(), None).is_err());
        lead.qualify(None).unwrap();
        let opp = lead.convert(opp_input(), None).unwrap();
        assert_eq!(lead.status, LeadStatus::Converted);
        assert_eq!(lead.converted_opportunity_id, Some(opp.id));
        assert_eq!(opp.lead_id, Some(lead.id));
        assert_eq!(opp.weighted_value, dec!(500));
    }
}
