//! OpenAPI schema definitions for types that do not derive `ToSchema`.
//!
//! The API error lives in the domain and stays framework-agnostic, and the
//! pagination envelope is generic; the wrappers here mirror their wire shape
//! for documentation only.

use utoipa::ToSchema;

use crate::inbound::http::directory::{ClientBody, TechnicianBody};
use crate::inbound::http::jobs::JobBody;
use crate::inbound::http::products::ProductBody;
use crate::inbound::http::subscriptions::CompanyBody;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Actor headers are missing or malformed.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// The actor may not perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The action does not apply in the current state, or the record changed
    /// concurrently.
    #[schema(rename = "conflict")]
    Conflict,
    /// A backing store is temporarily unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "conflict")]
    code: ErrorCodeSchema,
    /// Human-readable message.
    #[schema(example = "cannot approve job JOB-100 while it is ongoing")]
    message: String,
    /// Trace identifier of the failing request.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary details; `details.code` names the precise rule.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`pagination::PaginationLinks`].
#[derive(ToSchema)]
#[schema(as = pagination::PaginationLinks)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PaginationLinksSchema {
    /// Current page.
    #[schema(rename = "self", example = "http://localhost:8080/api/v1/jobs?page=2&pageSize=10")]
    self_: String,
    /// Following page, absent on the last page.
    next: Option<String>,
    /// Preceding page, absent on the first page.
    prev: Option<String>,
}

macro_rules! page_schema {
    ($(#[$meta:meta])* $name:ident, $item:ty) => {
        $(#[$meta])*
        #[derive(ToSchema)]
        #[schema(rename_all = "camelCase")]
        #[expect(
            dead_code,
            reason = "Used only for OpenAPI schema generation via utoipa"
        )]
        pub struct $name {
            /// Items on the page.
            data: Vec<$item>,
            /// 1-indexed page number.
            page: usize,
            /// Page size.
            page_size: usize,
            /// Size of the filtered collection.
            total: usize,
            /// `ceil(total / pageSize)`.
            page_count: usize,
            /// Navigation links.
            links: PaginationLinksSchema,
        }
    };
}

page_schema!(
    /// One page of jobs.
    JobPageSchema,
    JobBody
);
page_schema!(
    /// One page of clients.
    ClientPageSchema,
    ClientBody
);
page_schema!(
    /// One page of technicians.
    TechnicianPageSchema,
    TechnicianBody
);
page_schema!(
    /// One page of products.
    ProductPageSchema,
    ProductBody
);
page_schema!(
    /// One page of companies.
    CompanyPageSchema,
    CompanyBody
);
