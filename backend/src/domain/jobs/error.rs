//! Failures raised by job and job card rules.

use serde_json::{Map, Value, json};
use uuid::Uuid;

use super::{JobAction, JobId, JobStatus};
use crate::domain::failure::{DomainFailure, FailureKind, to_api_error};

/// Business-rule failures for jobs and their cards.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum JobError {
    /// No job has the identifier.
    #[error("job {0} not found")]
    JobNotFound(JobId),
    /// The job has not been started, so it has no card yet.
    #[error("job {0} has no job card")]
    JobCardNotFound(JobId),
    /// The card has no service item with the identifier.
    #[error("service item {item} not found on job card {job}")]
    ItemNotFound {
        /// Card owner.
        job: JobId,
        /// Requested item.
        item: Uuid,
    },
    /// The transition table has no entry for the pair.
    #[error("cannot {action} a job that is {current}")]
    InvalidTransition {
        /// Status at the time of the request.
        current: JobStatus,
        /// Requested action.
        action: JobAction,
    },
    /// A review was requested for a job that is not awaiting one.
    #[error("job is {current}, not awaiting approval")]
    NotAwaitingApproval {
        /// Status at the time of the request.
        current: JobStatus,
    },
    /// The card is frozen because the job is no longer ongoing.
    #[error("job card is read-only while the job is {status}")]
    JobCardLocked {
        /// Status of the owning job.
        status: JobStatus,
    },
    /// Job details can no longer be edited.
    #[error("job details cannot change while the job is {status}")]
    NotEditable {
        /// Status of the job.
        status: JobStatus,
    },
    /// A supplied value failed validation.
    #[error("invalid {field}: {reason}")]
    InvalidInput {
        /// Field that failed validation.
        field: &'static str,
        /// Human-readable reason.
        reason: String,
    },
    /// A list index was past the end.
    #[error("index {index} is out of range for {len} entries")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// List length.
        len: usize,
    },
    /// A caller-supplied job id is already taken.
    #[error("job id {0} is already in use")]
    DuplicateJobId(JobId),
    /// The actor may not perform the operation.
    #[error("{actor} may not {operation}")]
    PermissionDenied {
        /// Who asked.
        actor: String,
        /// What they asked for.
        operation: &'static str,
    },
}

impl JobError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn denied(actor: &crate::domain::Actor, operation: &'static str) -> Self {
        Self::PermissionDenied {
            actor: actor.to_string(),
            operation,
        }
    }
}

impl DomainFailure for JobError {
    fn kind(&self) -> FailureKind {
        match self {
            Self::JobNotFound(_) | Self::JobCardNotFound(_) | Self::ItemNotFound { .. } => {
                FailureKind::NotFound
            }
            Self::InvalidTransition { .. }
            | Self::NotAwaitingApproval { .. }
            | Self::JobCardLocked { .. }
            | Self::NotEditable { .. } => FailureKind::InvalidTransition,
            Self::InvalidInput { .. } | Self::IndexOutOfRange { .. } | Self::DuplicateJobId(_) => {
                FailureKind::InvalidInput
            }
            Self::PermissionDenied { .. } => FailureKind::PermissionDenied,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::JobNotFound(_) => "job_not_found",
            Self::JobCardNotFound(_) => "job_card_not_found",
            Self::ItemNotFound { .. } => "item_not_found",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::NotAwaitingApproval { .. } => "not_awaiting_approval",
            Self::JobCardLocked { .. } => "job_card_locked",
            Self::NotEditable { .. } => "job_not_editable",
            Self::InvalidInput { .. } => "invalid_input",
            Self::IndexOutOfRange { .. } => "index_out_of_range",
            Self::DuplicateJobId(_) => "duplicate_job_id",
            Self::PermissionDenied { .. } => "permission_denied",
        }
    }

    fn detail_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        match self {
            Self::InvalidTransition { current, action } => {
                fields.insert("current".to_owned(), json!(current.as_str()));
                fields.insert("action".to_owned(), json!(action.as_str()));
            }
            Self::NotAwaitingApproval { current } => {
                fields.insert("current".to_owned(), json!(current.as_str()));
            }
            Self::JobCardLocked { status } | Self::NotEditable { status } => {
                fields.insert("status".to_owned(), json!(status.as_str()));
            }
            Self::InvalidInput { field, .. } => {
                fields.insert("field".to_owned(), json!(field));
            }
            Self::IndexOutOfRange { index, len } => {
                fields.insert("index".to_owned(), json!(index));
                fields.insert("len".to_owned(), json!(len));
            }
            _ => {}
        }
        fields
    }
}

impl From<JobError> for crate::domain::Error {
    fn from(value: JobError) -> Self {
        to_api_error(&value)
    }
}
