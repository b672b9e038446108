//! Edits that can be applied to a job card.

use uuid::Uuid;

use super::{JobCard, distinct_technicians};
use crate::domain::Actor;
use crate::domain::jobs::{JobError, TechnicianRef};

/// Partial card update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobCardPatch {
    /// Replacement instructions.
    pub service_instructions: Option<String>,
    /// Replacement free-text log.
    pub additional_details: Option<String>,
    /// New actual working hours; clears confirmation.
    pub actual_working_hours: Option<f64>,
    /// Replacement technician set. Admin only.
    pub assigned_technicians: Option<Vec<TechnicianRef>>,
}

/// A single card edit.
#[derive(Debug, Clone, PartialEq)]
pub enum JobCardMutation {
    /// Append a helper name.
    AddHelper {
        /// Helper name; trimmed, must not be blank.
        name: String,
    },
    /// Remove the helper at a position.
    RemoveHelper {
        /// Zero-based position.
        index: usize,
    },
    /// Set the `used` flag of a service item.
    ToggleServiceItem {
        /// Item identifier.
        item_id: Uuid,
        /// New flag value.
        used: bool,
    },
    /// Record actual hours, clearing confirmation.
    SetActualWorkingTime {
        /// Hours worked.
        hours: f64,
    },
    /// Confirm the actual hours.
    ConfirmWorkingTime,
    /// Append a progress photo reference.
    AppendImage {
        /// Image reference.
        reference: String,
    },
    /// Replace the service instructions.
    UpdateInstructions {
        /// New text.
        text: String,
    },
    /// Apply several field updates at once.
    Update(JobCardPatch),
}

fn checked_hours(hours: f64) -> Result<f64, JobError> {
    if hours.is_finite() && hours >= 0.0 {
        Ok(hours)
    } else {
        Err(JobError::invalid(
            "actualWorkingHours",
            "must be a finite number of hours, at least 0",
        ))
    }
}

impl JobCardMutation {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddHelper { .. } => "add_helper",
            Self::RemoveHelper { .. } => "remove_helper",
            Self::ToggleServiceItem { .. } => "toggle_service_item",
            Self::SetActualWorkingTime { .. } => "set_actual_working_time",
            Self::ConfirmWorkingTime => "confirm_working_time",
            Self::AppendImage { .. } => "append_image",
            Self::UpdateInstructions { .. } => "update_instructions",
            Self::Update(_) => "update",
        }
    }

    pub(super) fn apply_to(self, card: &mut JobCard, actor: &Actor) -> Result<(), JobError> {
        match self {
            Self::AddHelper { name } => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(JobError::invalid("name", "helper name must not be blank"));
                }
                card.helpers.push(name.to_owned());
            }
            Self::RemoveHelper { index } => {
                let len = card.helpers.len();
                if index >= len {
                    return Err(JobError::IndexOutOfRange { index, len });
                }
                card.helpers.remove(index);
            }
            Self::ToggleServiceItem { item_id, used } => {
                let item = card
                    .service_items
                    .iter_mut()
                    .find(|item| item.id == item_id)
                    .ok_or_else(|| JobError::ItemNotFound {
                        job: card.job_id.clone(),
                        item: item_id,
                    })?;
                item.used = used;
            }
            Self::SetActualWorkingTime { hours } => {
                card.working_time.actual_hours = checked_hours(hours)?;
                card.working_time.confirmed = false;
            }
            Self::ConfirmWorkingTime => card.working_time.confirmed = true,
            Self::AppendImage { reference } => {
                let reference = reference.trim();
                if reference.is_empty() {
                    return Err(JobError::invalid("reference", "image reference must not be blank"));
                }
                card.uploaded_images.push(reference.to_owned());
            }
            Self::UpdateInstructions { text } => card.service_instructions = text,
            Self::Update(patch) => apply_patch(card, patch, actor)?,
        }
        Ok(())
    }
}

fn apply_patch(card: &mut JobCard, patch: JobCardPatch, actor: &Actor) -> Result<(), JobError> {
    let JobCardPatch {
        service_instructions,
        additional_details,
        actual_working_hours,
        assigned_technicians,
    } = patch;

    let hours = actual_working_hours.map(checked_hours).transpose()?;
    if assigned_technicians.is_some() && !actor.is_admin() {
        return Err(JobError::denied(actor, "change the technicians on a job card"));
    }

    if let Some(text) = service_instructions {
        card.service_instructions = text;
    }
    if let Some(text) = additional_details {
        card.additional_details = text;
    }
    if let Some(hours) = hours {
        card.working_time.actual_hours = hours;
        card.working_time.confirmed = false;
    }
    if let Some(technicians) = assigned_technicians {
        card.assigned_technicians = distinct_technicians(technicians);
    }
    Ok(())
}
