//! Client and technician directory handlers.
//!
//! ```text
//! GET   /api/v1/clients?search&page&pageSize
//! POST  /api/v1/clients
//! GET   /api/v1/clients/{id}
//! POST  /api/v1/clients/{id}/properties
//! GET   /api/v1/technicians?search&status&page&pageSize
//! POST  /api/v1/technicians
//! PATCH /api/v1/technicians/{id}
//! ```

use actix_web::{HttpRequest, HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Client, ClientDraft, ClientId, Error, Property, PropertyDraft, PropertyId, Technician,
    TechnicianDraft, TechnicianId, TechnicianStatus, TechnicianUpdate, TechnicianView,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::actor::ActorContext;
use crate::inbound::http::schemas::{ClientPageSchema, ErrorSchema, TechnicianPageSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, page_request, parse_id, parse_optional_named,
};

/// Property of a client.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyBody {
    #[schema(value_type = String, example = "PROP-001")]
    pub id: PropertyId,
    #[schema(example = "Main Office Building")]
    pub name: String,
    pub address: String,
    pub special_instructions: String,
}

impl From<&Property> for PropertyBody {
    fn from(value: &Property) -> Self {
        Self {
            id: value.id.clone(),
            name: value.name.clone(),
            address: value.address.clone(),
            special_instructions: value.special_instructions.clone(),
        }
    }
}

/// Client response payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientBody {
    #[schema(value_type = String, example = "CLIENT-001")]
    pub id: ClientId,
    #[schema(example = "Acme Corp")]
    pub name: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub main_address: String,
    pub properties: Vec<PropertyBody>,
}

impl From<&Client> for ClientBody {
    fn from(client: &Client) -> Self {
        Self {
            id: client.id.clone(),
            name: client.name.clone(),
            contact_person: client.contact_person.clone(),
            email: client.email.clone(),
            phone: client.phone.clone(),
            main_address: client.main_address.clone(),
            properties: client.properties().iter().map(PropertyBody::from).collect(),
        }
    }
}

/// Technician with the workload derived from current jobs.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianBody {
    #[schema(value_type = String, example = "TECH-001")]
    pub id: TechnicianId,
    #[schema(example = "Mike Johnson")]
    pub name: String,
    pub email: String,
    pub phone: String,
    #[schema(example = "Senior Technician")]
    pub role: String,
    #[schema(value_type = String, example = "active")]
    pub status: TechnicianStatus,
    pub can_create_jobs: bool,
    /// Jobs pending or ongoing. Absent on write responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_jobs: Option<usize>,
    /// Jobs awaiting approval or approved. Absent on write responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_jobs: Option<usize>,
}

impl From<&Technician> for TechnicianBody {
    fn from(value: &Technician) -> Self {
        Self {
            id: value.id.clone(),
            name: value.name.clone(),
            email: value.email.clone(),
            phone: value.phone.clone(),
            role: value.role.clone(),
            status: value.status,
            can_create_jobs: value.can_create_jobs,
            active_jobs: None,
            completed_jobs: None,
        }
    }
}

impl From<&TechnicianView> for TechnicianBody {
    fn from(view: &TechnicianView) -> Self {
        Self {
            active_jobs: Some(view.workload.active_jobs),
            completed_jobs: Some(view.workload.completed_jobs),
            ..Self::from(&view.technician)
        }
    }
}

/// New client.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientRequestBody {
    pub name: String,
    pub contact_person: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub main_address: String,
}

/// New property under a client.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRequestBody {
    pub name: String,
    pub address: String,
    pub special_instructions: Option<String>,
}

/// New technician.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianRequestBody {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub role: String,
    #[serde(default)]
    pub can_create_jobs: bool,
}

/// Technician changes; absent fields are left alone.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianUpdateBody {
    pub phone: Option<String>,
    pub role: Option<String>,
    /// `active` or `inactive`.
    pub status: Option<String>,
    pub can_create_jobs: Option<bool>,
}

/// Client list parameters.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ClientListQuery {
    /// Substring of the name, contact or email.
    pub search: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// Technician list parameters.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct TechnicianListQuery {
    /// Substring of the name, email or role.
    pub search: Option<String>,
    /// `active` or `inactive`.
    pub status: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

fn parse_client_id(raw: &str) -> Result<ClientId, Error> {
    parse_id(raw, FieldName::new("id"), ClientId::parse)
}

/// Search and page clients.
#[utoipa::path(
    get,
    path = "/api/v1/clients",
    params(ClientListQuery),
    responses(
        (status = 200, description = "One page of clients", body = ClientPageSchema),
        (status = 400, description = "Invalid paging", body = ErrorSchema),
        (status = 403, description = "Not permitted", body = ErrorSchema)
    ),
    tags = ["directory"],
    operation_id = "listClients",
    security(("ActorHeaders" = []))
)]
#[get("/clients")]
pub async fn list_clients(
    state: web::Data<HttpState>,
    actor: ActorContext,
    req: HttpRequest,
    query: web::Query<ClientListQuery>,
) -> ApiResult<HttpResponse> {
    let ClientListQuery {
        search,
        page,
        page_size,
    } = query.into_inner();
    let page = page_request(page, page_size, state.paging)?;
    let clients = state
        .directory_query
        .list_clients(actor.actor(), search, page)
        .await?;
    let envelope = clients
        .map(|client| ClientBody::from(&client))
        .into_envelope(&req.full_url());
    Ok(HttpResponse::Ok().json(envelope))
}

/// Create a client with no properties.
#[utoipa::path(
    post,
    path = "/api/v1/clients",
    request_body = ClientRequestBody,
    responses(
        (status = 201, description = "Client created", body = ClientBody),
        (status = 400, description = "Invalid client", body = ErrorSchema),
        (status = 403, description = "Admins only", body = ErrorSchema)
    ),
    tags = ["directory"],
    operation_id = "createClient",
    security(("ActorHeaders" = []))
)]
#[post("/clients")]
pub async fn create_client(
    state: web::Data<HttpState>,
    actor: ActorContext,
    payload: web::Json<ClientRequestBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let draft = ClientDraft {
        name: body.name,
        contact_person: body.contact_person,
        email: body.email,
        phone: body.phone,
        main_address: body.main_address,
    };
    let client = state.directory.create_client(actor.actor(), draft).await?;
    Ok(HttpResponse::Created().json(ClientBody::from(&client)))
}

/// Fetch one client with its properties.
#[utoipa::path(
    get,
    path = "/api/v1/clients/{id}",
    params(("id" = String, Path, description = "Client id")),
    responses(
        (status = 200, description = "The client", body = ClientBody),
        (status = 403, description = "Not permitted", body = ErrorSchema),
        (status = 404, description = "Unknown client", body = ErrorSchema)
    ),
    tags = ["directory"],
    operation_id = "getClient",
    security(("ActorHeaders" = []))
)]
#[get("/clients/{id}")]
pub async fn get_client(
    state: web::Data<HttpState>,
    actor: ActorContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ClientBody>> {
    let client_id = parse_client_id(&path)?;
    let client = state
        .directory_query
        .get_client(actor.actor(), &client_id)
        .await?;
    Ok(web::Json(ClientBody::from(&client)))
}

/// Add a property to a client.
#[utoipa::path(
    post,
    path = "/api/v1/clients/{id}/properties",
    params(("id" = String, Path, description = "Client id")),
    request_body = PropertyRequestBody,
    responses(
        (status = 201, description = "Client with the new property", body = ClientBody),
        (status = 400, description = "Invalid property", body = ErrorSchema),
        (status = 403, description = "Admins only", body = ErrorSchema),
        (status = 404, description = "Unknown client", body = ErrorSchema),
        (status = 409, description = "Property name already used", body = ErrorSchema)
    ),
    tags = ["directory"],
    operation_id = "addProperty",
    security(("ActorHeaders" = []))
)]
#[post("/clients/{id}/properties")]
pub async fn add_property(
    state: web::Data<HttpState>,
    actor: ActorContext,
    path: web::Path<String>,
    payload: web::Json<PropertyRequestBody>,
) -> ApiResult<HttpResponse> {
    let client_id = parse_client_id(&path)?;
    let PropertyRequestBody {
        name,
        address,
        special_instructions,
    } = payload.into_inner();
    let draft = PropertyDraft {
        name,
        address,
        special_instructions,
    };
    let client = state
        .directory
        .add_property(actor.actor(), &client_id, draft)
        .await?;
    Ok(HttpResponse::Created().json(ClientBody::from(&client)))
}

/// Search and page technicians with their workload.
#[utoipa::path(
    get,
    path = "/api/v1/technicians",
    params(TechnicianListQuery),
    responses(
        (status = 200, description = "One page of technicians", body = TechnicianPageSchema),
        (status = 400, description = "Invalid status or paging", body = ErrorSchema),
        (status = 403, description = "Not permitted", body = ErrorSchema)
    ),
    tags = ["directory"],
    operation_id = "listTechnicians",
    security(("ActorHeaders" = []))
)]
#[get("/technicians")]
pub async fn list_technicians(
    state: web::Data<HttpState>,
    actor: ActorContext,
    req: HttpRequest,
    query: web::Query<TechnicianListQuery>,
) -> ApiResult<HttpResponse> {
    let TechnicianListQuery {
        search,
        status,
        page,
        page_size,
    } = query.into_inner();
    let status = parse_optional_named(status.as_deref(), FieldName::new("status"))?;
    let page = page_request(page, page_size, state.paging)?;
    let technicians = state
        .directory_query
        .list_technicians(actor.actor(), search, status, page)
        .await?;
    let envelope = technicians
        .map(|view| TechnicianBody::from(&view))
        .into_envelope(&req.full_url());
    Ok(HttpResponse::Ok().json(envelope))
}

/// Add an active technician.
#[utoipa::path(
    post,
    path = "/api/v1/technicians",
    request_body = TechnicianRequestBody,
    responses(
        (status = 201, description = "Technician registered", body = TechnicianBody),
        (status = 400, description = "Invalid technician", body = ErrorSchema),
        (status = 403, description = "Admins only", body = ErrorSchema)
    ),
    tags = ["directory"],
    operation_id = "registerTechnician",
    security(("ActorHeaders" = []))
)]
#[post("/technicians")]
pub async fn register_technician(
    state: web::Data<HttpState>,
    actor: ActorContext,
    payload: web::Json<TechnicianRequestBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let draft = TechnicianDraft {
        name: body.name,
        email: body.email,
        phone: body.phone,
        role: body.role,
        can_create_jobs: body.can_create_jobs,
    };
    let technician = state
        .directory
        .register_technician(actor.actor(), draft)
        .await?;
    Ok(HttpResponse::Created().json(TechnicianBody::from(&technician)))
}

/// Change a technician's role, phone, status or job-creation right.
#[utoipa::path(
    patch,
    path = "/api/v1/technicians/{id}",
    params(("id" = String, Path, description = "Technician id")),
    request_body = TechnicianUpdateBody,
    responses(
        (status = 200, description = "Updated technician", body = TechnicianBody),
        (status = 400, description = "Invalid update", body = ErrorSchema),
        (status = 403, description = "Admins only", body = ErrorSchema),
        (status = 404, description = "Unknown technician", body = ErrorSchema)
    ),
    tags = ["directory"],
    operation_id = "updateTechnician",
    security(("ActorHeaders" = []))
)]
#[patch("/technicians/{id}")]
pub async fn update_technician(
    state: web::Data<HttpState>,
    actor: ActorContext,
    path: web::Path<String>,
    payload: web::Json<TechnicianUpdateBody>,
) -> ApiResult<web::Json<TechnicianBody>> {
    let technician_id = parse_id(&path, FieldName::new("id"), TechnicianId::parse)?;
    let body = payload.into_inner();
    let update = TechnicianUpdate {
        phone: body.phone,
        role: body.role,
        status: parse_optional_named(body.status.as_deref(), FieldName::new("status"))?,
        can_create_jobs: body.can_create_jobs,
    };
    let technician = state
        .directory
        .update_technician(actor.actor(), &technician_id, update)
        .await?;
    Ok(web::Json(TechnicianBody::from(&technician)))
}
