//! Driving port for job mutations.
//!
//! Every call names the acting [`Actor`]; services enforce the permission
//! rules and the status transition table.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use crate::domain::{
    Actor, ClientId, Error, Job, JobAction, JobId, JobStatus, PlannedItem, Priority, PropertyId,
    ReviewDecision, ServiceType, TechnicianId, TimelineEvent,
};

/// Request to create a job.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateJobRequest {
    /// Caller-chosen identifier; generated as `JOB-NNN` when absent.
    pub job_id: Option<String>,
    /// Client the job is for.
    pub client_id: ClientId,
    /// Property of that client.
    pub property_id: PropertyId,
    /// Kind of work.
    pub service_type: ServiceType,
    /// Work description.
    pub description: String,
    /// Free-text location; defaults to the property address.
    pub location: Option<String>,
    /// Scheduled day.
    pub scheduled_date: NaiveDate,
    /// Scheduled time.
    pub scheduled_time: NaiveTime,
    /// Priority; medium when absent.
    pub priority: Option<Priority>,
    /// Technician to assign.
    pub technician_id: Option<TechnicianId>,
    /// Expected effort in hours.
    pub estimated_hours: Option<f64>,
    /// Items expected to be used.
    pub planned_items: Vec<PlannedItem>,
}

/// Request to edit job details. `None` leaves a field unchanged.
///
/// Changing the client discards the current property, so `property_id` is
/// required whenever `client_id` is given.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateJobRequest {
    /// Job to edit.
    pub job_id: JobId,
    /// New client.
    pub client_id: Option<ClientId>,
    /// New property.
    pub property_id: Option<PropertyId>,
    /// New service type.
    pub service_type: Option<ServiceType>,
    /// New description.
    pub description: Option<String>,
    /// New location.
    pub location: Option<String>,
    /// New day.
    pub scheduled_date: Option<NaiveDate>,
    /// New time.
    pub scheduled_time: Option<NaiveTime>,
    /// New priority.
    pub priority: Option<Priority>,
    /// New estimate.
    pub estimated_hours: Option<f64>,
}

/// Request to apply a status action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionJobRequest {
    /// Target job.
    pub job_id: JobId,
    /// Action to apply.
    pub action: JobAction,
    /// Status the caller believes the job is in.
    pub expected_status: Option<JobStatus>,
    /// Completion or review notes.
    pub notes: Option<String>,
}

/// Request to review a submitted job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewJobRequest {
    /// Target job.
    pub job_id: JobId,
    /// Decision.
    pub decision: ReviewDecision,
    /// Reviewer notes.
    pub notes: Option<String>,
}

/// Request to (re)assign a technician.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignJobRequest {
    /// Target job.
    pub job_id: JobId,
    /// Technician to assign.
    pub technician_id: TechnicianId,
}

/// Request to add a note or images to the timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineNoteRequest {
    /// Target job.
    pub job_id: JobId,
    /// Note text.
    pub content: Option<String>,
    /// Image references.
    pub images: Vec<String>,
}

/// Job mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobCommand: Send + Sync {
    /// Create a pending job.
    async fn create_job(&self, actor: &Actor, request: CreateJobRequest) -> Result<Job, Error>;

    /// Edit details of a pending or ongoing job.
    async fn update_job(&self, actor: &Actor, request: UpdateJobRequest) -> Result<Job, Error>;

    /// Apply a status action.
    async fn transition_job(
        &self,
        actor: &Actor,
        request: TransitionJobRequest,
    ) -> Result<Job, Error>;

    /// Approve or reject a job awaiting approval.
    async fn review_job(&self, actor: &Actor, request: ReviewJobRequest) -> Result<Job, Error>;

    /// Assign or reassign the technician.
    async fn assign_job(&self, actor: &Actor, request: AssignJobRequest) -> Result<Job, Error>;

    /// Append a note or image event.
    async fn add_timeline_entry(
        &self,
        actor: &Actor,
        request: TimelineNoteRequest,
    ) -> Result<TimelineEvent, Error>;
}
