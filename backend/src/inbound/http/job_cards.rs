//! Job card HTTP handlers.
//!
//! ```text
//! GET    /api/v1/jobs/{id}/card
//! PATCH  /api/v1/jobs/{id}/card
//! POST   /api/v1/jobs/{id}/card/helpers
//! DELETE /api/v1/jobs/{id}/card/helpers/{index}
//! PUT    /api/v1/jobs/{id}/card/items/{itemId}
//! PUT    /api/v1/jobs/{id}/card/working-time
//! POST   /api/v1/jobs/{id}/card/working-time/confirm
//! POST   /api/v1/jobs/{id}/card/images
//! PUT    /api/v1/jobs/{id}/card/instructions
//! ```
//!
//! Every edit answers with the whole card so clients can replace their copy
//! and pick up the new revision.

use actix_web::{delete, get, patch, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    CompanyProfile, Error, JobCard, JobCardMutation, JobCardPatch, JobId, ServiceItem,
    TechnicianId, TechnicianRef, WorkingTime,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::actor::ActorContext;
use crate::inbound::http::jobs::TechnicianRefBody;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Checklist entry on a card.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceItemBody {
    #[schema(format = "uuid", value_type = String)]
    pub id: Uuid,
    pub name: String,
    pub quantity: u32,
    pub used: bool,
}

impl From<&ServiceItem> for ServiceItemBody {
    fn from(value: &ServiceItem) -> Self {
        Self {
            id: value.id,
            name: value.name.clone(),
            quantity: value.quantity,
            used: value.used,
        }
    }
}

/// Planned and recorded hours.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct WorkingTimeBody {
    #[schema(example = 4.0)]
    pub default: f64,
    #[schema(example = 3.5)]
    pub actual: f64,
    pub confirmed: bool,
}

impl From<WorkingTime> for WorkingTimeBody {
    fn from(value: WorkingTime) -> Self {
        Self {
            default: value.default_hours,
            actual: value.actual_hours,
            confirmed: value.confirmed,
        }
    }
}

/// Client and site snapshot taken when the card was opened.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfileBody {
    pub client_name: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub property_name: String,
    pub property_address: String,
    pub special_instructions: String,
}

impl From<&CompanyProfile> for CompanyProfileBody {
    fn from(value: &CompanyProfile) -> Self {
        Self {
            client_name: value.client_name.clone(),
            contact_person: value.contact_person.clone(),
            email: value.email.clone(),
            phone: value.phone.clone(),
            property_name: value.property_name.clone(),
            property_address: value.property_address.clone(),
            special_instructions: value.special_instructions.clone(),
        }
    }
}

/// Job card response payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobCardBody {
    #[schema(value_type = String, example = "JOB-100")]
    pub job_id: JobId,
    #[schema(example = "Maintenance - Main Office Building")]
    pub title: String,
    pub assigned_technicians: Vec<TechnicianRefBody>,
    pub service_instructions: String,
    pub service_items: Vec<ServiceItemBody>,
    pub working_time: WorkingTimeBody,
    pub company_profile: CompanyProfileBody,
    pub additional_details: String,
    pub uploaded_images: Vec<String>,
    pub helpers: Vec<String>,
    /// Optimistic concurrency revision.
    pub revision: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&JobCard> for JobCardBody {
    fn from(card: &JobCard) -> Self {
        Self {
            job_id: card.job_id().clone(),
            title: card.title().to_owned(),
            assigned_technicians: card
                .assigned_technicians()
                .iter()
                .map(TechnicianRefBody::from)
                .collect(),
            service_instructions: card.service_instructions().to_owned(),
            service_items: card.service_items().iter().map(ServiceItemBody::from).collect(),
            working_time: card.working_time().into(),
            company_profile: card.company_profile().into(),
            additional_details: card.additional_details().to_owned(),
            uploaded_images: card.uploaded_images().to_vec(),
            helpers: card.helpers().to_vec(),
            revision: card.revision(),
            created_at: card.created_at(),
            updated_at: card.updated_at(),
        }
    }
}

/// Technician entry in a card patch.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianRefRequestBody {
    #[schema(example = "TECH-002")]
    pub id: String,
    #[schema(example = "Lisa Brown")]
    pub name: String,
}

/// Partial card update; absent fields are left alone.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobCardPatchBody {
    pub service_instructions: Option<String>,
    pub additional_details: Option<String>,
    pub actual_working_hours: Option<f64>,
    /// Replacement technician set; admins only.
    pub assigned_technicians: Option<Vec<TechnicianRefRequestBody>>,
}

/// Helper to append.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct HelperRequestBody {
    #[schema(example = "Tom")]
    pub name: String,
}

/// New `used` flag for a service item.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ServiceItemRequestBody {
    pub used: bool,
}

/// Actual working hours.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct WorkingTimeRequestBody {
    #[schema(example = 3.5)]
    pub hours: f64,
}

/// Photo reference to append.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ImageRequestBody {
    #[schema(example = "uploads/job-100/boiler.jpg")]
    pub reference: String,
}

/// Replacement service instructions.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct InstructionsRequestBody {
    pub text: String,
}

fn parse_job_id(raw: &str) -> Result<JobId, Error> {
    parse_id(raw, FieldName::new("id"), JobId::parse)
}

fn parse_patch(body: JobCardPatchBody) -> Result<JobCardPatch, Error> {
    let assigned_technicians = body
        .assigned_technicians
        .map(|technicians| {
            technicians
                .into_iter()
                .map(|tech| {
                    Ok(TechnicianRef {
                        id: parse_id(
                            &tech.id,
                            FieldName::new("assignedTechnicians"),
                            TechnicianId::parse,
                        )?,
                        name: tech.name,
                    })
                })
                .collect::<Result<Vec<_>, Error>>()
        })
        .transpose()?;
    Ok(JobCardPatch {
        service_instructions: body.service_instructions,
        additional_details: body.additional_details,
        actual_working_hours: body.actual_working_hours,
        assigned_technicians,
    })
}

async fn mutate(
    state: &HttpState,
    actor: &ActorContext,
    raw_id: &str,
    mutation: JobCardMutation,
) -> ApiResult<web::Json<JobCardBody>> {
    let job_id = parse_job_id(raw_id)?;
    let card = state
        .job_cards
        .mutate_job_card(actor.actor(), &job_id, mutation)
        .await?;
    Ok(web::Json(JobCardBody::from(&card)))
}

/// Fetch the card of a started job.
#[utoipa::path(
    get,
    path = "/api/v1/jobs/{id}/card",
    params(("id" = String, Path, description = "Job id")),
    responses(
        (status = 200, description = "The job card", body = JobCardBody),
        (status = 403, description = "Not on the job", body = ErrorSchema),
        (status = 404, description = "Unknown job or job not started", body = ErrorSchema)
    ),
    tags = ["job-cards"],
    operation_id = "getJobCard",
    security(("ActorHeaders" = []))
)]
#[get("/jobs/{id}/card")]
pub async fn get_job_card(
    state: web::Data<HttpState>,
    actor: ActorContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<JobCardBody>> {
    let job_id = parse_job_id(&path)?;
    let card = state.job_cards.get_job_card(actor.actor(), &job_id).await?;
    Ok(web::Json(JobCardBody::from(&card)))
}

/// Update several card fields at once.
#[utoipa::path(
    patch,
    path = "/api/v1/jobs/{id}/card",
    params(("id" = String, Path, description = "Job id")),
    request_body = JobCardPatchBody,
    responses(
        (status = 200, description = "Updated card", body = JobCardBody),
        (status = 400, description = "Invalid field", body = ErrorSchema),
        (status = 403, description = "Not permitted", body = ErrorSchema),
        (status = 404, description = "Unknown job or card", body = ErrorSchema),
        (status = 409, description = "Card locked or changed concurrently", body = ErrorSchema)
    ),
    tags = ["job-cards"],
    operation_id = "updateJobCard",
    security(("ActorHeaders" = []))
)]
#[patch("/jobs/{id}/card")]
pub async fn update_job_card(
    state: web::Data<HttpState>,
    actor: ActorContext,
    path: web::Path<String>,
    payload: web::Json<JobCardPatchBody>,
) -> ApiResult<web::Json<JobCardBody>> {
    let patch = parse_patch(payload.into_inner())?;
    mutate(&state, &actor, &path, JobCardMutation::Update(patch)).await
}

/// Append a helper name.
#[utoipa::path(
    post,
    path = "/api/v1/jobs/{id}/card/helpers",
    params(("id" = String, Path, description = "Job id")),
    request_body = HelperRequestBody,
    responses(
        (status = 200, description = "Updated card", body = JobCardBody),
        (status = 400, description = "Blank name", body = ErrorSchema),
        (status = 403, description = "Not permitted", body = ErrorSchema),
        (status = 409, description = "Card locked", body = ErrorSchema)
    ),
    tags = ["job-cards"],
    operation_id = "addHelper",
    security(("ActorHeaders" = []))
)]
#[post("/jobs/{id}/card/helpers")]
pub async fn add_helper(
    state: web::Data<HttpState>,
    actor: ActorContext,
    path: web::Path<String>,
    payload: web::Json<HelperRequestBody>,
) -> ApiResult<web::Json<JobCardBody>> {
    let HelperRequestBody { name } = payload.into_inner();
    mutate(&state, &actor, &path, JobCardMutation::AddHelper { name }).await
}

/// Remove the helper at a zero-based position.
#[utoipa::path(
    delete,
    path = "/api/v1/jobs/{id}/card/helpers/{index}",
    params(
        ("id" = String, Path, description = "Job id"),
        ("index" = usize, Path, description = "Zero-based helper position")
    ),
    responses(
        (status = 200, description = "Updated card", body = JobCardBody),
        (status = 400, description = "No helper at that position", body = ErrorSchema),
        (status = 403, description = "Not permitted", body = ErrorSchema),
        (status = 409, description = "Card locked", body = ErrorSchema)
    ),
    tags = ["job-cards"],
    operation_id = "removeHelper",
    security(("ActorHeaders" = []))
)]
#[delete("/jobs/{id}/card/helpers/{index}")]
pub async fn remove_helper(
    state: web::Data<HttpState>,
    actor: ActorContext,
    path: web::Path<(String, usize)>,
) -> ApiResult<web::Json<JobCardBody>> {
    let (id, index) = path.into_inner();
    mutate(&state, &actor, &id, JobCardMutation::RemoveHelper { index }).await
}

/// Mark a service item used or unused.
#[utoipa::path(
    put,
    path = "/api/v1/jobs/{id}/card/items/{itemId}",
    params(
        ("id" = String, Path, description = "Job id"),
        ("itemId" = String, Path, format = "uuid", description = "Service item id")
    ),
    request_body = ServiceItemRequestBody,
    responses(
        (status = 200, description = "Updated card", body = JobCardBody),
        (status = 400, description = "Malformed item id", body = ErrorSchema),
        (status = 404, description = "Unknown item", body = ErrorSchema),
        (status = 409, description = "Card locked", body = ErrorSchema)
    ),
    tags = ["job-cards"],
    operation_id = "toggleServiceItem",
    security(("ActorHeaders" = []))
)]
#[put("/jobs/{id}/card/items/{item_id}")]
pub async fn toggle_service_item(
    state: web::Data<HttpState>,
    actor: ActorContext,
    path: web::Path<(String, String)>,
    payload: web::Json<ServiceItemRequestBody>,
) -> ApiResult<web::Json<JobCardBody>> {
    let (id, raw_item) = path.into_inner();
    let item_id = Uuid::parse_str(&raw_item).map_err(|_| {
        Error::invalid_request("itemId must be a UUID").with_details(serde_json::json!({
            "field": "itemId",
            "value": raw_item,
            "code": "invalid_identifier",
        }))
    })?;
    let mutation = JobCardMutation::ToggleServiceItem {
        item_id,
        used: payload.used,
    };
    mutate(&state, &actor, &id, mutation).await
}

/// Record actual working hours; clears confirmation.
#[utoipa::path(
    put,
    path = "/api/v1/jobs/{id}/card/working-time",
    params(("id" = String, Path, description = "Job id")),
    request_body = WorkingTimeRequestBody,
    responses(
        (status = 200, description = "Updated card", body = JobCardBody),
        (status = 400, description = "Negative or non-finite hours", body = ErrorSchema),
        (status = 409, description = "Card locked", body = ErrorSchema)
    ),
    tags = ["job-cards"],
    operation_id = "setWorkingTime",
    security(("ActorHeaders" = []))
)]
#[put("/jobs/{id}/card/working-time")]
pub async fn set_working_time(
    state: web::Data<HttpState>,
    actor: ActorContext,
    path: web::Path<String>,
    payload: web::Json<WorkingTimeRequestBody>,
) -> ApiResult<web::Json<JobCardBody>> {
    let mutation = JobCardMutation::SetActualWorkingTime {
        hours: payload.hours,
    };
    mutate(&state, &actor, &path, mutation).await
}

/// Confirm the recorded working hours.
#[utoipa::path(
    post,
    path = "/api/v1/jobs/{id}/card/working-time/confirm",
    params(("id" = String, Path, description = "Job id")),
    responses(
        (status = 200, description = "Updated card", body = JobCardBody),
        (status = 409, description = "Card locked", body = ErrorSchema)
    ),
    tags = ["job-cards"],
    operation_id = "confirmWorkingTime",
    security(("ActorHeaders" = []))
)]
#[post("/jobs/{id}/card/working-time/confirm")]
pub async fn confirm_working_time(
    state: web::Data<HttpState>,
    actor: ActorContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<JobCardBody>> {
    mutate(&state, &actor, &path, JobCardMutation::ConfirmWorkingTime).await
}

/// Append a progress photo reference.
#[utoipa::path(
    post,
    path = "/api/v1/jobs/{id}/card/images",
    params(("id" = String, Path, description = "Job id")),
    request_body = ImageRequestBody,
    responses(
        (status = 200, description = "Updated card", body = JobCardBody),
        (status = 400, description = "Blank reference", body = ErrorSchema),
        (status = 409, description = "Card locked", body = ErrorSchema)
    ),
    tags = ["job-cards"],
    operation_id = "appendImage",
    security(("ActorHeaders" = []))
)]
#[post("/jobs/{id}/card/images")]
pub async fn append_image(
    state: web::Data<HttpState>,
    actor: ActorContext,
    path: web::Path<String>,
    payload: web::Json<ImageRequestBody>,
) -> ApiResult<web::Json<JobCardBody>> {
    let ImageRequestBody { reference } = payload.into_inner();
    mutate(&state, &actor, &path, JobCardMutation::AppendImage { reference }).await
}

/// Replace the service instructions.
#[utoipa::path(
    put,
    path = "/api/v1/jobs/{id}/card/instructions",
    params(("id" = String, Path, description = "Job id")),
    request_body = InstructionsRequestBody,
    responses(
        (status = 200, description = "Updated card", body = JobCardBody),
        (status = 409, description = "Card locked", body = ErrorSchema)
    ),
    tags = ["job-cards"],
    operation_id = "updateInstructions",
    security(("ActorHeaders" = []))
)]
#[put("/jobs/{id}/card/instructions")]
pub async fn update_instructions(
    state: web::Data<HttpState>,
    actor: ActorContext,
    path: web::Path<String>,
    payload: web::Json<InstructionsRequestBody>,
) -> ApiResult<web::Json<JobCardBody>> {
    let InstructionsRequestBody { text } = payload.into_inner();
    mutate(&state, &actor, &path, JobCardMutation::UpdateInstructions { text }).await
}

#[cfg(test)]
#[path = "job_cards_tests.rs"]
mod tests;
