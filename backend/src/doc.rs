//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! document for the REST API. It registers:
//!
//! - **Paths**: every `/api/v1` handler plus the health probes
//! - **Schemas**: request and response bodies, and wrappers
//!   ([`ErrorSchema`], [`ErrorCodeSchema`], the page envelopes) that describe
//!   domain or generic types without coupling them to utoipa
//! - **Security**: the actor header scheme
//!
//! The generated document is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::directory::{
    ClientBody, ClientRequestBody, PropertyBody, PropertyRequestBody, TechnicianBody,
    TechnicianRequestBody, TechnicianUpdateBody,
};
use crate::inbound::http::health::{ProbeBody, ProbeStatus};
use crate::inbound::http::job_cards::{
    CompanyProfileBody, HelperRequestBody, ImageRequestBody, InstructionsRequestBody,
    JobCardBody, JobCardPatchBody, ServiceItemBody, ServiceItemRequestBody,
    TechnicianRefRequestBody, WorkingTimeBody, WorkingTimeRequestBody,
};
use crate::inbound::http::jobs::{
    AssignRequestBody, CreateJobRequestBody, JobBody, PlannedItemBody, ReviewBody,
    ReviewRequestBody, StatusChangeBody, TechnicianRefBody, TimelineEntryRequestBody,
    TimelineEventBody, TransitionRequestBody, UpdateJobRequestBody,
};
use crate::inbound::http::products::{
    CatalogueSummaryBody, ProductBody, ProductRequestBody, ProductUpdateBody,
};
use crate::inbound::http::schemas::{
    ClientPageSchema, CompanyPageSchema, ErrorCodeSchema, ErrorSchema, JobPageSchema,
    PaginationLinksSchema, ProductPageSchema, TechnicianPageSchema,
};
use crate::inbound::http::subscriptions::{
    CompanyBody, CompanyPlanRequestBody, CompanyRequestBody, PlanBody, PlanRequestBody,
    PlanStatusRequestBody, UsageReportBody, UsageWarningBody,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the actor header security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "ActorHeaders",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "x-actor-role",
                "Caller role (admin, technician or super_admin), sent with x-actor-id \
                 and x-actor-name by the upstream gateway.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Fieldcrew backend API",
        description = "HTTP interface for field-service jobs, approvals, job cards, \
                       the client and technician directory, the product catalogue, \
                       and subscriptions.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("ActorHeaders" = [])),
    paths(
        crate::inbound::http::jobs::create_job,
        crate::inbound::http::jobs::list_jobs,
        crate::inbound::http::jobs::get_job,
        crate::inbound::http::jobs::update_job,
        crate::inbound::http::jobs::transition_job,
        crate::inbound::http::jobs::review_job,
        crate::inbound::http::jobs::assign_job,
        crate::inbound::http::jobs::get_timeline,
        crate::inbound::http::jobs::add_timeline_entry,
        crate::inbound::http::job_cards::get_job_card,
        crate::inbound::http::job_cards::update_job_card,
        crate::inbound::http::job_cards::add_helper,
        crate::inbound::http::job_cards::remove_helper,
        crate::inbound::http::job_cards::toggle_service_item,
        crate::inbound::http::job_cards::set_working_time,
        crate::inbound::http::job_cards::confirm_working_time,
        crate::inbound::http::job_cards::append_image,
        crate::inbound::http::job_cards::update_instructions,
        crate::inbound::http::directory::list_clients,
        crate::inbound::http::directory::create_client,
        crate::inbound::http::directory::get_client,
        crate::inbound::http::directory::add_property,
        crate::inbound::http::directory::list_technicians,
        crate::inbound::http::directory::register_technician,
        crate::inbound::http::directory::update_technician,
        crate::inbound::http::products::list_products,
        crate::inbound::http::products::catalogue_summary,
        crate::inbound::http::products::create_product,
        crate::inbound::http::products::get_product,
        crate::inbound::http::products::update_product,
        crate::inbound::http::products::delete_product,
        crate::inbound::http::subscriptions::list_plans,
        crate::inbound::http::subscriptions::create_plan,
        crate::inbound::http::subscriptions::set_plan_status,
        crate::inbound::http::subscriptions::list_companies,
        crate::inbound::http::subscriptions::register_company,
        crate::inbound::http::subscriptions::change_company_plan,
        crate::inbound::http::subscriptions::company_usage,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        PaginationLinksSchema,
        JobPageSchema,
        ClientPageSchema,
        TechnicianPageSchema,
        ProductPageSchema,
        CompanyPageSchema,
        JobBody,
        PlannedItemBody,
        TechnicianRefBody,
        ReviewBody,
        StatusChangeBody,
        TimelineEventBody,
        CreateJobRequestBody,
        UpdateJobRequestBody,
        TransitionRequestBody,
        ReviewRequestBody,
        AssignRequestBody,
        TimelineEntryRequestBody,
        JobCardBody,
        ServiceItemBody,
        WorkingTimeBody,
        CompanyProfileBody,
        JobCardPatchBody,
        TechnicianRefRequestBody,
        HelperRequestBody,
        ServiceItemRequestBody,
        WorkingTimeRequestBody,
        ImageRequestBody,
        InstructionsRequestBody,
        ClientBody,
        PropertyBody,
        TechnicianBody,
        ClientRequestBody,
        PropertyRequestBody,
        TechnicianRequestBody,
        TechnicianUpdateBody,
        ProductBody,
        CatalogueSummaryBody,
        ProductRequestBody,
        ProductUpdateBody,
        PlanBody,
        CompanyBody,
        UsageReportBody,
        UsageWarningBody,
        PlanRequestBody,
        PlanStatusRequestBody,
        CompanyRequestBody,
        CompanyPlanRequestBody,
        ProbeBody,
        ProbeStatus,
    )),
    tags(
        (name = "jobs", description = "Job records, status transitions and approvals"),
        (name = "job-cards", description = "Technician work sheets for started jobs"),
        (name = "directory", description = "Clients, properties and technicians"),
        (name = "products", description = "Stocked parts and equipment"),
        (name = "subscriptions", description = "Platform plans and subscribing companies"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
