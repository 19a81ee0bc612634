//! Sales pipeline opportunities.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tessera_shared::types::round_money;
use uuid::Uuid;

use crate::audit::AuditInfo;
use crate::error::{DomainError, DomainResult};
use crate::guard;
use crate::macros::text_enum;

text_enum! {
    /// Pipeline stage.
    OpportunityStage {
        /// Initial discovery.
        Discovery => "discovery",
        /// Need and budget confirmed.
        Qualification => "qualification",
        /// Proposal sent.
        Proposal => "proposal",
        /// Terms under negotiation.
        Negotiation => "negotiation",
        /// Closed won.
        Won => "won",
        /// Closed lost.
        Lost => "lost",
    }
}

impl OpportunityStage {
    /// Default win probability (percent) for the stage.
    #[must_use]
    pub fn default_probability(&self) -> Decimal {
        Decimal::from(match self {
            Self::Discovery => 10,
            Self::Qualification => 25,
            Self::Proposal => 50,
            Self::Negotiation => 75,
            Self::Won => 100,
            Self::Lost => 0,
        })
    }

    /// Returns true for won and lost.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// A potential deal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Deal name.
    pub name: String,
    /// Customer, once known.
    pub partner_id: Option<Uuid>,
    /// Originating lead.
    pub lead_id: Option<Uuid>,
    /// Current stage.
    pub stage: OpportunityStage,
    /// Expected deal value.
    pub estimated_value: Decimal,
    /// Win probability in percent.
    pub probability: Decimal,
    /// `estimated_value * probability / 100`, rounded.
    pub weighted_value: Decimal,
    /// Expected close date.
    pub expected_close_date: Option<NaiveDate>,
    /// Deal currency.
    pub currency: String,
    /// When the deal was won or lost.
    pub closed_at: Option<DateTime<Utc>>,
    /// Why the deal was lost.
    pub lost_reason: Option<String>,
    /// Audit stamps.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Input for creating or editing an opportunity.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityInput {
    /// Deal name.
    pub name: String,
    /// Customer.
    pub partner_id: Option<Uuid>,
    /// Expected value.
    pub estimated_value: Decimal,
    /// Expected close date.
    pub expected_close_date: Option<NaiveDate>,
    /// Deal currency.
    pub currency: String,
}

impl Opportunity {
    const ENTITY: &'static str = "opportunity";

    /// Creates an opportunity in `Discovery`.
    ///
    /// # Errors
    ///
    /// Fails for an empty name, negative value, or malformed currency.
    pub fn create(
        tenant_id: Uuid,
        input: OpportunityInput,
        lead_id: Option<Uuid>,
        actor: Option<Uuid>,
    ) -> DomainResult<Self> {
        let stage = OpportunityStage::Discovery;
        let mut opportunity = Self {
            id: Uuid::now_v7(),
            tenant_id,
            name: guard::required("name", &input.name)?,
            partner_id: input.partner_id,
            lead_id,
            stage,
            estimated_value: guard::non_negative("estimated value", input.estimated_value)?,
            probability: stage.default_probability(),
            weighted_value: Decimal::ZERO,
            expected_close_date: input.expected_close_date,
            currency: guard::currency(&input.currency)?,
            closed_at: None,
            lost_reason: None,
            audit: AuditInfo::new(actor),
        };
        opportunity.recompute();
        Ok(opportunity)
    }

    fn recompute(&mut self) {
        self.weighted_value = round_money(self.estimated_value * self.probability / Decimal::ONE_HUNDRED);
    }

    fn ensure_open(&self, action: &'static str) -> DomainResult<()> {
        if self.stage.is_closed() {
            return Err(DomainError::InvalidTransition {
                entity: Self::ENTITY,
                from: self.stage.to_string(),
                action,
            });
        }
        Ok(())
    }

    /// Edits the deal details of an open opportunity.
    ///
    /// # Errors
    ///
    /// Fails on closed opportunities or invalid fields.
    pub fn update(&mut self, input: OpportunityInput, actor: Option<Uuid>) -> DomainResult<()> {
        self.ensure_open("update")?;
        let name = guard::required("name", &input.name)?;
        let estimated_value = guard::non_negative("estimated value", input.estimated_value)?;
        let currency = guard::currency(&input.currency)?;
        self.name = name;
        self.partner_id = input.partner_id;
        self.estimated_value = estimated_value;
        self.expected_close_date = input.expected_close_date;
        self.currency = currency;
        self.recompute();
        self.audit.touch(actor);
        Ok(())
    }

    /// Moves to another stage, applying its default probability.
    ///
    /// Moving to `Lost` requires a reason.
    ///
    /// # Errors
    ///
    /// Fails when the opportunity is already won or lost.
    pub fn move_to_stage(
        &mut self,
        stage: OpportunityStage,
        lost_reason: Option<String>,
        actor: Option<Uuid>,
    ) -> DomainResult<()> {
        self.ensure_open("change stage of")?;
        if stage == OpportunityStage::Lost {
            let reason = guard::optional(lost_reason)
                .ok_or_else(|| DomainError::validation("lost reason is required"))?;
            self.lost_reason = Some(reason);
        }
        self.stage = stage;
        self.probability = stage.default_probability();
        if stage.is_closed() {
            self.closed_at = Some(Utc::now());
        }
        self.recompute();
        self.audit.touch(actor);
        Ok(())
    }

    /// Overrides the probability on an open stage.
    ///
    /// # Errors
    ///
    /// Fails when closed or when the value is outside `0..=100`.
    pub fn set_probability(&mut self, probability: Decimal, actor: Option<Uuid>) -> DomainResult<()> {
        self.ensure_open("override probability of")?;
        self.probability = guard::percentage("probability", probability)?;
        self.recompute();
        self.audit.touch(actor);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn opportunity(value: Decimal) -> Opportunity {
        Opportunity::create(
            Uuid::new_v4(),
            OpportunityInput {
                name: "ERP rollout".to_string(),
                partner_id: None,
                estimated_value: value,
                expected_close_date: None,
                currency: "USD".to_string(),
            },
            None,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_discovery_defaults() {
        let opp = opportunity(dec!(1000));
        assert_eq!(opp.stage, OpportunityStage::Discovery);
        assert_eq!(opp.probability, dec!(10));
        assert_eq!(opp.weighted_value, dec!(100));
    }

    #[test]
    fn test_won_sets_full_probability() {
        let mut opp = opportunity(dec!(1000));
        opp.move_to_stage(OpportunityStage::Won, None, None).unwrap();
        assert_eq!(opp.probability, dec!(100));
        assert_eq!(opp.weighted_value, dec!(1000));
        assert!(opp.closed_at.is_some());
    }

    #[rstest]
    #[case(OpportunityStage::Qualification, dec!(25))]
    #[case(OpportunityStage::Proposal, dec!(50))]
    #[case(OpportunityStage::Negotiation, dec!(75))]
    fn test_stage_probabilities(#[case] stage: OpportunityStage, #[case] expected: Decimal) {
        let mut opp = opportunity(dec!(999.99));
        opp.move_to_stage(stage, None, None).unwrap();
        assert_eq!(opp.probability, expected);
        assert_eq!(opp.weighted_value, round_money(dec!(999.99) * expected / dec!(100)));
    }

    #[test]
    fn test_closed_stages_are_terminal() {
        let mut opp = opportunity(dec!(500));
        assert!(opp.move_to_stage(OpportunityStage::Lost, None, None).is_err());
        opp.move_to_stage(OpportunityStage::Lost, Some("Budget cut".to_string()), None)
            .unwrap();
        assert_eq!(opp.weighted_value, Decimal::ZERO);
        assert!(opp.move_to_stage(OpportunityStage::Proposal, None, None).is_err());
        assert!(opp.set_probability(dec!(40), None).is_err());
        assert_eq!(opp.stage, OpportunityStage::Lost);
    }

    #[test]
    fn test_probability_override() {
        let mut opp = opportunity(dec!(2000));
        opp.set_probability(dec!(33), None).unwrap();
        assert_eq!(opp.weighted_value, dec!(660));
        assert!(opp.set_probability(dec!(101), None).is_err());
        assert_eq!(opp.probability, dec!(33));
    }
}
