//! CRM routes: business partners, leads, and opportunities.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{StatusFilter, created};
use crate::{ApiResult, AppState, middleware::AuthUser};
use tessera_core::crm::{
    BusinessPartner, Lead, LeadInput, LeadStatus, Opportunity, OpportunityInput, OpportunityStage, PartnerInput,
};
use tessera_db::{LeadRepository, OpportunityRepository, PartnerRepository, PartnerRole};
use tessera_shared::types::{PageRequest, PageResponse};

/// Creates the CRM routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/partners", get(list_partners).post(create_partner))
        .route("/partners/{id}", get(get_partner).put(update_partner).delete(deactivate_partner))
        .route("/partners/{id}/activate", post(activate_partner))
        .route("/leads", get(list_leads).post(create_lead))
        .route("/leads/{id}", get(get_lead))
        .route("/leads/{id}/contact", post(contact_lead))
        .route("/leads/{id}/qualify", post(qualify_lead))
        .route("/leads/{id}/disqualify", post(disqualify_lead))
        .route("/leads/{id}/convert", post(convert_lead))
        .route("/opportunities", get(list_opportunities).post(create_opportunity))
        .route("/opportunities/{id}", get(get_opportunity).put(update_opportunity))
        .route("/opportunities/{id}/stage", post(move_opportunity_stage))
        .route("/opportunities/{id}/probability", post(set_opportunity_probability))
}

// ---------------------------------------------------------------------------
// Partners
// ---------------------------------------------------------------------------

/// Partner role in query strings.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleParam {
    /// Customers.
    Customer,
    /// Suppliers.
    Supplier,
}

impl From<RoleParam> for PartnerRole {
    fn from(role: RoleParam) -> Self {
        match role {
            RoleParam::Customer => Self::Customer,
            RoleParam::Supplier => Self::Supplier,
        }
    }
}

/// `?role=` filter.
#[derive(Debug, Deserialize)]
pub struct PartnerFilter {
    /// Only partners acting in this role.
    pub role: Option<RoleParam>,
}

/// GET /crm/partners
async fn list_partners(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(filter): Query<PartnerFilter>,
) -> ApiResult<Json<PageResponse<BusinessPartner>>> {
    auth.require("crm.partners.read")?;
    Ok(Json(
        PartnerRepository::new(state.conn())
            .list(auth.tenant_id(), filter.role.map(Into::into), &page)
            .await?,
    ))
}

/// POST /crm/partners
async fn create_partner(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<PartnerInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require("crm.partners.create")?;
    let partner = PartnerRepository::new(state.conn())
        .create(auth.tenant_id(), payload, auth.actor())
        .await?;
    Ok(created(partner))
}

/// GET /crm/partners/{id}
async fn get_partner(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BusinessPartner>> {
    auth.require("crm.partners.read")?;
    Ok(Json(PartnerRepository::new(state.conn()).find(auth.tenant_id(), id).await?))
}

/// PUT /crm/partners/{id}
async fn update_partner(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<PartnerInput>,
) -> ApiResult<Json<BusinessPartner>> {
    auth.require("crm.partners.update")?;
    Ok(Json(
        PartnerRepository::new(state.conn())
            .update(auth.tenant_id(), id, payload, auth.actor())
            .await?,
    ))
}

/// DELETE /crm/partners/{id} - partners referenced by documents are only deactivated.
async fn deactivate_partner(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BusinessPartner>> {
    auth.require("crm.partners.delete")?;
    Ok(Json(
        PartnerRepository::new(state.conn())
            .set_active(auth.tenant_id(), id, false, auth.actor())
            .await?,
    ))
}

/// POST /crm/partners/{id}/activate
async fn activate_partner(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BusinessPartner>> {
    auth.require("crm.partners.update")?;
    Ok(Json(
        PartnerRepository::new(state.conn())
            .set_active(auth.tenant_id(), id, true, auth.actor())
            .await?,
    ))
}

// ---------------------------------------------------------------------------
// Leads
// ---------------------------------------------------------------------------

/// Body for disqualifying a lead.
#[derive(Debug, Deserialize)]
pub struct DisqualifyRequest {
    /// Why the lead was dropped.
    pub reason: String,
}

/// A converted lead and the opportunity it produced.
#[derive(Debug, Serialize)]
pub struct ConversionResponse {
    /// The lead, now converted.
    pub lead: Lead,
    /// The new opportunity.
    pub opportunity: Opportunity,
}

/// GET /crm/leads
async fn list_leads(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(filter): Query<StatusFilter<LeadStatus>>,
) -> ApiResult<Json<PageResponse<Lead>>> {
    auth.require("crm.leads.read")?;
    Ok(Json(
        LeadRepository::new(state.conn())
            .list(auth.tenant_id(), filter.status, &page)
            .await?,
    ))
}

/// POST /crm/leads
async fn create_lead(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<LeadInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require("crm.leads.create")?;
    let lead = LeadRepository::new(state.conn())
        .create(auth.tenant_id(), payload, auth.actor())
        .await?;
    Ok(created(lead))
}

/// GET /crm/leads/{id}
async fn get_lead(State(state): State<AppState>, auth: AuthUser, Path(id): Path<Uuid>) -> ApiResult<Json<Lead>> {
    auth.require("crm.leads.read")?;
    Ok(Json(LeadRepository::new(state.conn()).find(auth.tenant_id(), id).await?))
}

/// POST /crm/leads/{id}/contact
async fn contact_lead(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Lead>> {
    auth.require("crm.leads.update")?;
    let actor = auth.actor();
    Ok(Json(
        LeadRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |lead| lead.contact(actor))
            .await?,
    ))
}

/// POST /crm/leads/{id}/qualify
async fn qualify_lead(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Lead>> {
    auth.require("crm.leads.update")?;
    let actor = auth.actor();
    Ok(Json(
        LeadRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |lead| lead.qualify(actor))
            .await?,
    ))
}

/// POST /crm/leads/{id}/disqualify
async fn disqualify_lead(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<DisqualifyRequest>,
) -> ApiResult<Json<Lead>> {
    auth.require("crm.leads.update")?;
    let actor = auth.actor();
    Ok(Json(
        LeadRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |lead| lead.disqualify(&payload.reason, actor))
            .await?,
    ))
}

/// POST /crm/leads/{id}/convert - qualified leads only.
async fn convert_lead(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<OpportunityInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require("crm.leads.convert")?;
    let (lead, opportunity) = LeadRepository::new(state.conn())
        .convert(auth.tenant_id(), id, payload, auth.actor())
        .await?;
    Ok(created(ConversionResponse { lead, opportunity }))
}

// ---------------------------------------------------------------------------
// Opportunities
// ---------------------------------------------------------------------------

/// `?stage=` filter.
#[derive(Debug, Deserialize)]
pub struct StageFilter {
    /// Only opportunities in this stage.
    pub stage: Option<OpportunityStage>,
}

/// Body for moving an opportunity through the pipeline.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageRequest {
    /// Target stage.
    pub stage: OpportunityStage,
    /// Required when the target is `lost`.
    pub lost_reason: Option<String>,
}

/// Body for overriding the win probability.
#[derive(Debug, Deserialize)]
pub struct ProbabilityRequest {
    /// Percentage between 0 and 100.
    pub probability: Decimal,
}

/// GET /crm/opportunities
async fn list_opportunities(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(filter): Query<StageFilter>,
) -> ApiResult<Json<PageResponse<Opportunity>>> {
    auth.require("crm.opportunities.read")?;
    Ok(Json(
        OpportunityRepository::new(state.conn())
            .list(auth.tenant_id(), filter.stage, &page)
            .await?,
    ))
}

/// POST /crm/opportunities
async fn create_opportunity(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<OpportunityInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require("crm.opportunities.create")?;
    let opportunity = OpportunityRepository::new(state.conn())
        .create(auth.tenant_id(), payload, auth.actor())
        .await?;
    Ok(created(opportunity))
}

/// GET /crm/opportunities/{id}
async fn get_opportunity(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Opportunity>> {
    auth.require("crm.opportunities.read")?;
    Ok(Json(OpportunityRepository::new(state.conn()).find(auth.tenant_id(), id).await?))
}

/// PUT /crm/opportunities/{id}
async fn update_opportunity(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<OpportunityInput>,
) -> ApiResult<Json<Opportunity>> {
    auth.require("crm.opportunities.update")?;
    Ok(Json(
        OpportunityRepository::new(state.conn())
            .update(auth.tenant_id(), id, payload, auth.actor())
            .await?,
    ))
}

/// POST /crm/opportunities/{id}/stage
async fn move_opportunity_stage(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<StageRequest>,
) -> ApiResult<Json<Opportunity>> {
    auth.require("crm.opportunities.update")?;
    let actor = auth.actor();
    Ok(Json(
        OpportunityRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |o| {
                o.move_to_stage(payload.stage, payload.lost_reason, actor)
            })
            .await?,
    ))
}

/// POST /crm/opportunities/{id}/probability
async fn set_opportunity_probability(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProbabilityRequest>,
) -> ApiResult<Json<Opportunity>> {
    auth.require("crm.opportunities.update")?;
    let actor = auth.actor();
    Ok(Json(
        OpportunityRepository::new(state.conn())
            .transition(auth.tenant_id(), id, |o| o.set_probability(payload.probability, actor))
            .await?,
    ))
}
