//! Who may do what to a job.

use super::{Job, JobAction, JobError};
use crate::domain::Actor;

/// Check that `actor` may perform `action` on `job`.
///
/// Start is open to admins and the assigned technician, submission to the
/// assigned technician only, and review or cancellation to admins only.
pub fn authorize_transition(job: &Job, action: JobAction, actor: &Actor) -> Result<(), JobError> {
    let assigned = actor
        .technician_id()
        .is_some_and(|id| job.is_assigned_to(id));
    let allowed = match action {
        JobAction::Start => actor.is_admin() || assigned,
        JobAction::SubmitForApproval => assigned,
        JobAction::Approve | JobAction::Reject | JobAction::Cancel => actor.is_admin(),
    };
    if allowed {
        Ok(())
    } else {
        Err(JobError::denied(actor, action_operation(action)))
    }
}

fn action_operation(action: JobAction) -> &'static str {
    match action {
        JobAction::Start => "start this job",
        JobAction::SubmitForApproval => "submit this job for approval",
        JobAction::Approve => "approve jobs",
        JobAction::Reject => "reject jobs",
        JobAction::Cancel => "cancel jobs",
    }
}

/// Whether `actor` may read `job`. Technicians see only their own jobs.
pub fn can_view(job: &Job, actor: &Actor) -> bool {
    match actor.technician_id() {
        Some(id) => job.is_assigned_to(id),
        None => actor.is_admin(),
    }
}
