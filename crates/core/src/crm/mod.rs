//! CRM: business partners, leads, and the opportunity pipeline.

pub mod lead;
pub mod opportunity;
pub mod partner;

pub use lead::{Lead, LeadInput, LeadStatus};
pub use opportunity::{Opportunity, OpportunityInput, OpportunityStage};
pub use partner::{BusinessPartner, PartnerInput};
