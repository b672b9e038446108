//! Job HTTP handlers.
//!
//! ```text
//! POST  /api/v1/jobs
//! GET   /api/v1/jobs?search&status&technician&page&pageSize
//! GET   /api/v1/jobs/{id}
//! PATCH /api/v1/jobs/{id}
//! POST  /api/v1/jobs/{id}/transitions
//! POST  /api/v1/jobs/{id}/review
//! PUT   /api/v1/jobs/{id}/technician
//! GET   /api/v1/jobs/{id}/timeline
//! POST  /api/v1/jobs/{id}/timeline
//! ```

use actix_web::{HttpRequest, HttpResponse, get, patch, post, put, web};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{
    AssignJobRequest, CreateJobRequest, ReviewJobRequest, TimelineNoteRequest,
    TransitionJobRequest, UpdateJobRequest,
};
use crate::domain::{
    ClientId, Error, Job, JobAction, JobFilter, JobId, JobStatus, PlannedItem, PrimaryStatus,
    Priority, PropertyId, Review, ReviewDecision, ServiceType, StatusChange, StatusFilter,
    StatusLabel, TechnicianId, TechnicianRef, TimelineEvent, TimelineEventKind,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::actor::ActorContext;
use crate::inbound::http::schemas::{ErrorSchema, JobPageSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, page_request, parse_date, parse_id, parse_named,
    parse_optional_date, parse_optional_named, parse_optional_time, parse_time,
};

/// Planned item payload.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlannedItemBody {
    #[schema(example = "Air filter")]
    pub name: String,
    #[schema(example = 2)]
    pub quantity: u32,
}

impl From<&PlannedItem> for PlannedItemBody {
    fn from(value: &PlannedItem) -> Self {
        Self {
            name: value.name.clone(),
            quantity: value.quantity,
        }
    }
}

/// Request payload for creating a job.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequestBody {
    /// Caller-chosen id; `JOB-NNN` is generated when absent.
    #[schema(example = "JOB-100")]
    pub job_id: Option<String>,
    #[schema(example = "CLIENT-001")]
    pub client_id: String,
    #[schema(example = "PROP-001")]
    pub property_id: String,
    #[schema(example = "Maintenance")]
    pub service_type: String,
    pub description: String,
    pub location: Option<String>,
    #[schema(format = "date", example = "2024-03-14")]
    pub scheduled_date: String,
    #[schema(example = "09:00")]
    pub scheduled_time: String,
    #[schema(example = "medium")]
    pub priority: Option<String>,
    #[schema(example = "TECH-001")]
    pub technician_id: Option<String>,
    pub estimated_hours: Option<f64>,
    #[serde(default)]
    pub planned_items: Vec<PlannedItemBody>,
}

/// Request payload for editing job details.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequestBody {
    /// New client; `propertyId` must accompany it.
    pub client_id: Option<String>,
    pub property_id: Option<String>,
    pub service_type: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    #[schema(format = "date")]
    pub scheduled_date: Option<String>,
    pub scheduled_time: Option<String>,
    pub priority: Option<String>,
    pub estimated_hours: Option<f64>,
}

/// Request payload for a status action.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequestBody {
    /// One of `start`, `submit_for_approval`, `approve`, `reject`, `cancel`.
    #[schema(example = "start")]
    pub action: String,
    /// Status the caller last saw; a mismatch is a conflict.
    #[schema(example = "pending")]
    pub expected_status: Option<String>,
    pub notes: Option<String>,
}

/// Request payload for an approval decision.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequestBody {
    /// `approve` or `reject`.
    #[schema(example = "reject")]
    pub decision: String,
    #[schema(example = "needs more photos")]
    pub notes: Option<String>,
}

/// Request payload for (re)assigning a technician.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequestBody {
    #[schema(example = "TECH-002")]
    pub technician_id: String,
}

/// Request payload for a note or image timeline entry.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntryRequestBody {
    pub content: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Query parameters for listing jobs.
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct JobListQuery {
    /// Substring over job id, client name and technician name.
    pub search: Option<String>,
    /// `all`, a primary status, or an exact status.
    pub status: Option<String>,
    /// Exact technician name; `all` disables the criterion.
    pub technician: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// Technician reference in responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianRefBody {
    #[schema(value_type = String, example = "TECH-001")]
    pub id: TechnicianId,
    #[schema(example = "Mike Johnson")]
    pub name: String,
}

impl From<&TechnicianRef> for TechnicianRefBody {
    fn from(value: &TechnicianRef) -> Self {
        Self {
            id: value.id.clone(),
            name: value.name.clone(),
        }
    }
}

/// Latest review outcome.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewBody {
    #[schema(value_type = String, example = "reject")]
    pub decision: ReviewDecision,
    pub notes: Option<String>,
    pub reviewer: String,
    pub reviewed_at: DateTime<Utc>,
}

impl From<&Review> for ReviewBody {
    fn from(value: &Review) -> Self {
        Self {
            decision: value.decision,
            notes: value.notes.clone(),
            reviewer: value.reviewer.clone(),
            reviewed_at: value.reviewed_at,
        }
    }
}

/// Job response payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobBody {
    #[schema(value_type = String, example = "JOB-100")]
    pub id: JobId,
    #[schema(value_type = String, example = "CLIENT-001")]
    pub client_id: ClientId,
    #[schema(example = "Acme Corp")]
    pub client_name: String,
    #[schema(value_type = String, example = "PROP-001")]
    pub property_id: PropertyId,
    #[schema(example = "Main Office Building")]
    pub property_name: String,
    pub property_address: String,
    #[schema(value_type = String, example = "Maintenance")]
    pub service_type: ServiceType,
    pub description: String,
    pub location: String,
    pub scheduled_date: NaiveDate,
    #[schema(value_type = String, example = "09:00:00")]
    pub scheduled_time: NaiveTime,
    #[schema(value_type = String, example = "medium")]
    pub priority: Priority,
    pub assigned_technician: Option<TechnicianRefBody>,
    #[schema(value_type = String, example = "pending_approval")]
    pub status: JobStatus,
    /// Coarse status; both approval states read as `completed`.
    #[schema(value_type = String, example = "completed")]
    pub primary_status: PrimaryStatus,
    pub estimated_hours: Option<f64>,
    pub planned_items: Vec<PlannedItemBody>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency revision.
    pub revision: u64,
    pub last_review: Option<ReviewBody>,
    pub completion_notes: Option<String>,
}

impl From<&Job> for JobBody {
    fn from(job: &Job) -> Self {
        let site = job.site();
        Self {
            id: job.id().clone(),
            client_id: site.client_id.clone(),
            client_name: site.client_name.clone(),
            property_id: site.property_id.clone(),
            property_name: site.property_name.clone(),
            property_address: site.property_address.clone(),
            service_type: job.service_type(),
            description: job.description().to_owned(),
            location: job.location().to_owned(),
            scheduled_date: job.scheduled_date(),
            scheduled_time: job.scheduled_time(),
            priority: job.priority(),
            assigned_technician: job.assigned_technician().map(TechnicianRefBody::from),
            status: job.status(),
            primary_status: job.status().primary(),
            estimated_hours: job.estimated_hours(),
            planned_items: job.planned_items().iter().map(PlannedItemBody::from).collect(),
            created_by: job.created_by().to_owned(),
            created_at: job.created_at(),
            updated_at: job.updated_at(),
            revision: job.revision(),
            last_review: job.last_review().map(ReviewBody::from),
            completion_notes: job.completion_notes().map(str::to_owned),
        }
    }
}

/// Status movement of a `status_change` event.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusChangeBody {
    #[schema(value_type = String, example = "pending_approval")]
    pub from: StatusLabel,
    #[schema(value_type = String, example = "rejected")]
    pub to: StatusLabel,
}

impl From<StatusChange> for StatusChangeBody {
    fn from(value: StatusChange) -> Self {
        Self {
            from: value.from,
            to: value.to,
        }
    }
}

/// Timeline event payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEventBody {
    #[schema(format = "uuid", value_type = String)]
    pub id: uuid::Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    #[schema(value_type = String, example = "status_change")]
    pub kind: TimelineEventKind,
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_change: Option<StatusChangeBody>,
}

impl From<&TimelineEvent> for TimelineEventBody {
    fn from(event: &TimelineEvent) -> Self {
        Self {
            id: event.id,
            timestamp: event.timestamp,
            kind: event.kind,
            user: event.user.clone(),
            content: event.content.clone(),
            images: event.images.clone(),
            status_change: event.status_change.map(StatusChangeBody::from),
        }
    }
}

fn parse_job_id(raw: &str) -> Result<JobId, Error> {
    parse_id(raw, FieldName::new("id"), JobId::parse)
}

fn parse_planned_items(items: Vec<PlannedItemBody>) -> Vec<PlannedItem> {
    items
        .into_iter()
        .map(|item| PlannedItem {
            name: item.name,
            quantity: item.quantity,
        })
        .collect()
}

fn parse_create_request(body: CreateJobRequestBody) -> Result<CreateJobRequest, Error> {
    Ok(CreateJobRequest {
        job_id: body.job_id,
        client_id: parse_id(&body.client_id, FieldName::new("clientId"), ClientId::parse)?,
        property_id: parse_id(&body.property_id, FieldName::new("propertyId"), PropertyId::parse)?,
        service_type: parse_named(&body.service_type, FieldName::new("serviceType"))?,
        description: body.description,
        location: body.location,
        scheduled_date: parse_date(&body.scheduled_date, FieldName::new("scheduledDate"))?,
        scheduled_time: parse_time(&body.scheduled_time, FieldName::new("scheduledTime"))?,
        priority: parse_optional_named(body.priority.as_deref(), FieldName::new("priority"))?,
        technician_id: body
            .technician_id
            .map(|raw| parse_id(&raw, FieldName::new("technicianId"), TechnicianId::parse))
            .transpose()?,
        estimated_hours: body.estimated_hours,
        planned_items: parse_planned_items(body.planned_items),
    })
}

fn parse_update_request(
    job_id: JobId,
    body: UpdateJobRequestBody,
) -> Result<UpdateJobRequest, Error> {
    let client_id = body
        .client_id
        .map(|raw| parse_id(&raw, FieldName::new("clientId"), ClientId::parse))
        .transpose()?;
    let property_id = body
        .property_id
        .map(|raw| parse_id(&raw, FieldName::new("propertyId"), PropertyId::parse))
        .transpose()?;
    if client_id.is_some() && property_id.is_none() {
        return Err(missing_field_error(FieldName::new("propertyId")));
    }
    Ok(UpdateJobRequest {
        job_id,
        client_id,
        property_id,
        service_type: parse_optional_named(
            body.service_type.as_deref(),
            FieldName::new("serviceType"),
        )?,
        description: body.description,
        location: body.location,
        scheduled_date: parse_optional_date(body.scheduled_date, FieldName::new("scheduledDate"))?,
        scheduled_time: parse_optional_time(body.scheduled_time, FieldName::new("scheduledTime"))?,
        priority: parse_optional_named(body.priority.as_deref(), FieldName::new("priority"))?,
        estimated_hours: body.estimated_hours,
    })
}

fn parse_filter(query: &JobListQuery) -> Result<JobFilter, Error> {
    let status: Option<StatusFilter> =
        parse_optional_named(query.status.as_deref(), FieldName::new("status"))?;
    Ok(JobFilter {
        search: query.search.clone(),
        status: status.unwrap_or_default(),
        technician: query.technician.clone(),
    })
}

/// Create a pending job.
#[utoipa::path(
    post,
    path = "/api/v1/jobs",
    request_body = CreateJobRequestBody,
    responses(
        (status = 201, description = "Job created", body = JobBody),
        (status = 400, description = "Invalid request or job id taken", body = ErrorSchema),
        (status = 401, description = "Missing actor", body = ErrorSchema),
        (status = 403, description = "Not permitted", body = ErrorSchema),
        (status = 404, description = "Unknown client, property or technician", body = ErrorSchema)
    ),
    tags = ["jobs"],
    operation_id = "createJob",
    security(("ActorHeaders" = []))
)]
#[post("/jobs")]
pub async fn create_job(
    state: web::Data<HttpState>,
    actor: ActorContext,
    payload: web::Json<CreateJobRequestBody>,
) -> ApiResult<HttpResponse> {
    let request = parse_create_request(payload.into_inner())?;
    let job = state.jobs.create_job(actor.actor(), request).await?;
    Ok(HttpResponse::Created().json(JobBody::from(&job)))
}

/// List the jobs visible to the caller.
#[utoipa::path(
    get,
    path = "/api/v1/jobs",
    params(JobListQuery),
    responses(
        (status = 200, description = "One page of jobs", body = JobPageSchema),
        (status = 400, description = "Invalid filter or paging", body = ErrorSchema),
        (status = 401, description = "Missing actor", body = ErrorSchema)
    ),
    tags = ["jobs"],
    operation_id = "listJobs",
    security(("ActorHeaders" = []))
)]
#[get("/jobs")]
pub async fn list_jobs(
    state: web::Data<HttpState>,
    actor: ActorContext,
    req: HttpRequest,
    query: web::Query<JobListQuery>,
) -> ApiResult<HttpResponse> {
    let filter = parse_filter(&query)?;
    let page = page_request(query.page, query.page_size, state.paging)?;
    let jobs = state
        .jobs_query
        .list_jobs(actor.actor(), filter, page)
        .await?;
    let envelope = jobs
        .map(|job| JobBody::from(&job))
        .into_envelope(&req.full_url());
    Ok(HttpResponse::Ok().json(envelope))
}

/// Fetch one job.
#[utoipa::path(
    get,
    path = "/api/v1/jobs/{id}",
    params(("id" = String, Path, description = "Job id")),
    responses(
        (status = 200, description = "The job", body = JobBody),
        (status = 403, description = "Not assigned to the caller", body = ErrorSchema),
        (status = 404, description = "Unknown job", body = ErrorSchema)
    ),
    tags = ["jobs"],
    operation_id = "getJob",
    security(("ActorHeaders" = []))
)]
#[get("/jobs/{id}")]
pub async fn get_job(
    state: web::Data<HttpState>,
    actor: ActorContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<JobBody>> {
    let job_id = parse_job_id(&path)?;
    let job = state.jobs_query.get_job(actor.actor(), &job_id).await?;
    Ok(web::Json(JobBody::from(&job)))
}

/// Edit job details while the job is pending or ongoing.
#[utoipa::path(
    patch,
    path = "/api/v1/jobs/{id}",
    params(("id" = String, Path, description = "Job id")),
    request_body = UpdateJobRequestBody,
    responses(
        (status = 200, description = "Updated job", body = JobBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Not permitted", body = ErrorSchema),
        (status = 404, description = "Unknown job, client or property", body = ErrorSchema),
        (status = 409, description = "Job no longer editable", body = ErrorSchema)
    ),
    tags = ["jobs"],
    operation_id = "updateJob",
    security(("ActorHeaders" = []))
)]
#[patch("/jobs/{id}")]
pub async fn update_job(
    state: web::Data<HttpState>,
    actor: ActorContext,
    path: web::Path<String>,
    payload: web::Json<UpdateJobRequestBody>,
) -> ApiResult<web::Json<JobBody>> {
    let request = parse_update_request(parse_job_id(&path)?, payload.into_inner())?;
    let job = state.jobs.update_job(actor.actor(), request).await?;
    Ok(web::Json(JobBody::from(&job)))
}

/// Apply a status action.
#[utoipa::path(
    post,
    path = "/api/v1/jobs/{id}/transitions",
    params(("id" = String, Path, description = "Job id")),
    request_body = TransitionRequestBody,
    responses(
        (status = 200, description = "Job after the transition", body = JobBody),
        (status = 400, description = "Unknown action", body = ErrorSchema),
        (status = 403, description = "Not permitted", body = ErrorSchema),
        (status = 404, description = "Unknown job", body = ErrorSchema),
        (status = 409, description = "Action not valid from the current status", body = ErrorSchema)
    ),
    tags = ["jobs"],
    operation_id = "transitionJob",
    security(("ActorHeaders" = []))
)]
#[post("/jobs/{id}/transitions")]
pub async fn transition_job(
    state: web::Data<HttpState>,
    actor: ActorContext,
    path: web::Path<String>,
    payload: web::Json<TransitionRequestBody>,
) -> ApiResult<web::Json<JobBody>> {
    let TransitionRequestBody {
        action,
        expected_status,
        notes,
    } = payload.into_inner();
    let request = TransitionJobRequest {
        job_id: parse_job_id(&path)?,
        action: parse_named::<JobAction>(&action, FieldName::new("action"))?,
        expected_status: parse_optional_named(
            expected_status.as_deref(),
            FieldName::new("expectedStatus"),
        )?,
        notes,
    };
    let job = state.jobs.transition_job(actor.actor(), request).await?;
    Ok(web::Json(JobBody::from(&job)))
}

/// Approve or reject a job awaiting approval.
#[utoipa::path(
    post,
    path = "/api/v1/jobs/{id}/review",
    params(("id" = String, Path, description = "Job id")),
    request_body = ReviewRequestBody,
    responses(
        (status = 200, description = "Job after the review", body = JobBody),
        (status = 400, description = "Unknown decision", body = ErrorSchema),
        (status = 403, description = "Admins only", body = ErrorSchema),
        (status = 404, description = "Unknown job", body = ErrorSchema),
        (status = 409, description = "Job is not awaiting approval", body = ErrorSchema)
    ),
    tags = ["jobs"],
    operation_id = "reviewJob",
    security(("ActorHeaders" = []))
)]
#[post("/jobs/{id}/review")]
pub async fn review_job(
    state: web::Data<HttpState>,
    actor: ActorContext,
    path: web::Path<String>,
    payload: web::Json<ReviewRequestBody>,
) -> ApiResult<web::Json<JobBody>> {
    let ReviewRequestBody { decision, notes } = payload.into_inner();
    let request = ReviewJobRequest {
        job_id: parse_job_id(&path)?,
        decision: parse_named::<ReviewDecision>(&decision, FieldName::new("decision"))?,
        notes,
    };
    let job = state.jobs.review_job(actor.actor(), request).await?;
    Ok(web::Json(JobBody::from(&job)))
}

/// Assign or reassign the technician.
#[utoipa::path(
    put,
    path = "/api/v1/jobs/{id}/technician",
    params(("id" = String, Path, description = "Job id")),
    request_body = AssignRequestBody,
    responses(
        (status = 200, description = "Job after assignment", body = JobBody),
        (status = 403, description = "Admins only", body = ErrorSchema),
        (status = 404, description = "Unknown job or technician", body = ErrorSchema),
        (status = 409, description = "Job already finished", body = ErrorSchema)
    ),
    tags = ["jobs"],
    operation_id = "assignJob",
    security(("ActorHeaders" = []))
)]
#[put("/jobs/{id}/technician")]
pub async fn assign_job(
    state: web::Data<HttpState>,
    actor: ActorContext,
    path: web::Path<String>,
    payload: web::Json<AssignRequestBody>,
) -> ApiResult<web::Json<JobBody>> {
    let request = AssignJobRequest {
        job_id: parse_job_id(&path)?,
        technician_id: parse_id(
            &payload.technician_id,
            FieldName::new("technicianId"),
            TechnicianId::parse,
        )?,
    };
    let job = state.jobs.assign_job(actor.actor(), request).await?;
    Ok(web::Json(JobBody::from(&job)))
}

/// Timeline of one job, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/jobs/{id}/timeline",
    params(("id" = String, Path, description = "Job id")),
    responses(
        (status = 200, description = "Timeline events", body = [TimelineEventBody]),
        (status = 403, description = "Not assigned to the caller", body = ErrorSchema),
        (status = 404, description = "Unknown job", body = ErrorSchema)
    ),
    tags = ["jobs"],
    operation_id = "getTimeline",
    security(("ActorHeaders" = []))
)]
#[get("/jobs/{id}/timeline")]
pub async fn get_timeline(
    state: web::Data<HttpState>,
    actor: ActorContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<TimelineEventBody>>> {
    let job_id = parse_job_id(&path)?;
    let timeline = state.jobs_query.timeline(actor.actor(), &job_id).await?;
    Ok(web::Json(
        timeline.events().iter().map(TimelineEventBody::from).collect(),
    ))
}

/// Add a note or image event to the timeline.
#[utoipa::path(
    post,
    path = "/api/v1/jobs/{id}/timeline",
    params(("id" = String, Path, description = "Job id")),
    request_body = TimelineEntryRequestBody,
    responses(
        (status = 201, description = "Recorded event", body = TimelineEventBody),
        (status = 400, description = "Empty entry", body = ErrorSchema),
        (status = 403, description = "Not assigned to the caller", body = ErrorSchema),
        (status = 404, description = "Unknown job", body = ErrorSchema)
    ),
    tags = ["jobs"],
    operation_id = "addTimelineEntry",
    security(("ActorHeaders" = []))
)]
#[post("/jobs/{id}/timeline")]
pub async fn add_timeline_entry(
    state: web::Data<HttpState>,
    actor: ActorContext,
    path: web::Path<String>,
    payload: web::Json<TimelineEntryRequestBody>,
) -> ApiResult<HttpResponse> {
    let TimelineEntryRequestBody { content, images } = payload.into_inner();
    let request = TimelineNoteRequest {
        job_id: parse_job_id(&path)?,
        content,
        images,
    };
    let event = state
        .jobs
        .add_timeline_entry(actor.actor(), request)
        .await?;
    Ok(HttpResponse::Created().json(TimelineEventBody::from(&event)))
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;
