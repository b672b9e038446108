//! Job aggregate: lifecycle, approval workflow and activity timeline.

mod error;
mod filter;
mod job;
mod permissions;
mod status;
mod timeline;

pub use error::JobError;
pub use filter::{
    JobFilter, StatusFilter, filter_by_search_term, filter_by_status, filter_by_technician,
};
pub use job::{
    Job, JobSite, JobUpdate, NewJob, PlannedItem, Priority, Review, ServiceType, TechnicianRef,
};
pub use permissions::{authorize_transition, can_view};
pub use status::{
    JobAction, JobStatus, PrimaryStatus, ReviewDecision, StatusLabel, UnknownStatusName,
};
pub use timeline::{
    StatusChange, Timeline, TimelineEntry, TimelineEvent, TimelineEventKind,
};

use super::identifier::string_identifier;

string_identifier!(
    /// Job identifier such as `JOB-001`.
    JobId, prefix = "JOB"
);

#[cfg(test)]
mod tests;
