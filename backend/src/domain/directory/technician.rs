//! Technician roster entries and their derived workload.

use serde::{Deserialize, Serialize};

use super::{DirectoryError, TechnicianId, email_address, required_text};

/// Whether a technician can receive work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechnicianStatus {
    /// Available for assignment.
    Active,
    /// Kept for history only.
    Inactive,
}

impl std::str::FromStr for TechnicianStatus {
    type Err = DirectoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(DirectoryError::invalid("status", "must be active or inactive")),
        }
    }
}

/// A field technician.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Technician {
    /// Technician identifier.
    pub id: TechnicianId,
    /// Display name; job filters match it exactly.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Job title, e.g. "Senior Technician".
    pub role: String,
    /// Availability.
    pub status: TechnicianStatus,
    /// Whether the technician may create jobs.
    pub can_create_jobs: bool,
}

/// Unvalidated input for a new technician.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechnicianDraft {
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Job title.
    pub role: String,
    /// Whether the technician may create jobs.
    pub can_create_jobs: bool,
}

/// Partial update applied by an admin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TechnicianUpdate {
    /// New contact phone.
    pub phone: Option<String>,
    /// New job title.
    pub role: Option<String>,
    /// New availability.
    pub status: Option<TechnicianStatus>,
    /// New job-creation permission.
    pub can_create_jobs: Option<bool>,
}

impl Technician {
    /// Validate a draft into an active technician.
    pub fn new(id: TechnicianId, draft: TechnicianDraft) -> Result<Self, DirectoryError> {
        Ok(Self {
            id,
            name: required_text("name", &draft.name)?,
            email: email_address("email", &draft.email)?,
            phone: draft.phone.trim().to_owned(),
            role: required_text("role", &draft.role)?,
            status: TechnicianStatus::Active,
            can_create_jobs: draft.can_create_jobs,
        })
    }

    /// Apply an admin update.
    pub fn apply(&mut self, update: TechnicianUpdate) -> Result<(), DirectoryError> {
        if let Some(role) = update.role {
            self.role = required_text("role", &role)?;
        }
        if let Some(phone) = update.phone {
            self.phone = phone.trim().to_owned();
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(flag) = update.can_create_jobs {
            self.can_create_jobs = flag;
        }
        Ok(())
    }

    /// Whether the technician may create jobs right now.
    pub fn may_create_jobs(&self) -> bool {
        self.can_create_jobs && self.status == TechnicianStatus::Active
    }
}

/// Job counters computed from the job store on every read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianWorkload {
    /// Assigned jobs that are pending or ongoing.
    pub active_jobs: usize,
    /// Assigned jobs whose primary status is completed.
    pub completed_jobs: usize,
}

/// A technician together with their derived workload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechnicianView {
    /// Roster entry.
    pub technician: Technician,
    /// Derived counters.
    pub workload: TechnicianWorkload,
}

/// Search technicians by name, email or role, optionally by status.
///
/// The term is matched case-insensitively; a blank term matches everyone.
pub fn filter_technicians<'a>(
    technicians: &'a [TechnicianView],
    term: &str,
    status: Option<TechnicianStatus>,
) -> Vec<&'a TechnicianView> {
    let needle = term.trim().to_lowercase();
    technicians
        .iter()
        .filter(|view| status.is_none_or(|wanted| view.technician.status == wanted))
        .filter(|view| {
            let tech = &view.technician;
            needle.is_empty()
                || [&tech.name, &tech.email, &tech.role]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}
