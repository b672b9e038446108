//! Domain model for field-service job management.
//!
//! Aggregates and their rules live in submodules ([`jobs`], [`job_card`],
//! [`directory`], [`catalogue`], [`subscriptions`]). Services implement the
//! driving ports in [`ports`] on top of the driven repository ports. Nothing
//! here performs I/O directly.
//!
//! Public surface:
//! - Error (alias to `error::Error`) is the transport-agnostic API error.
//! - Job, JobCard, Client, Technician, Product and the subscription types.
//! - The `*Service` types implementing the driving ports.

pub mod actor;
pub mod catalogue;
pub mod directory;
pub mod error;
pub mod failure;
pub mod identifier;
pub mod job_card;
pub mod jobs;
pub mod ports;
pub mod subscriptions;
pub mod trace_id;

mod catalogue_service;
mod directory_service;
mod job_card_service;
mod job_lifecycle_service;
mod service_support;
mod subscription_service;

pub use self::actor::{Actor, Role, UnknownRole};
pub use self::catalogue::{
    CatalogueError, CatalogueSummary, Product, ProductDraft, ProductId, ProductUpdate,
    filter_products,
};
pub use self::catalogue_service::CatalogueService;
pub use self::directory::{
    Client, ClientDraft, ClientId, DirectoryError, Property, PropertyDraft, PropertyId,
    SiteSelection, Technician, TechnicianDraft, TechnicianId, TechnicianStatus, TechnicianUpdate,
    TechnicianView, TechnicianWorkload, filter_clients, filter_technicians,
};
pub use self::directory_service::DirectoryService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::failure::{DomainFailure, FailureKind};
pub use self::identifier::InvalidIdentifier;
pub use self::job_card::{
    CompanyProfile, JobCard, JobCardMutation, JobCardPatch, ServiceItem, WorkingTime,
};
pub use self::job_card_service::JobCardService;
pub use self::job_lifecycle_service::{DEFAULT_WORKING_HOURS, JobLifecycleService};
pub use self::jobs::{
    Job, JobAction, JobError, JobFilter, JobId, JobSite, JobStatus, JobUpdate, NewJob,
    PlannedItem, PrimaryStatus, Priority, Review, ReviewDecision, ServiceType, StatusChange,
    StatusFilter, StatusLabel, TechnicianRef, Timeline, TimelineEntry, TimelineEvent,
    TimelineEventKind, UnknownStatusName, filter_by_search_term, filter_by_status,
    filter_by_technician,
};
pub use self::subscription_service::SubscriptionService;
pub use self::subscriptions::{
    Company, CompanyDraft, CompanyId, CompanyStatus, JobAllowance, PlanDraft, PlanId, PlanStatus,
    PlanSummary, SubscriptionError, SubscriptionPlan, UsageLimit, UsageReport, UsageWarning,
};
pub use self::trace_id::TraceId;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use fieldcrew::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
