//! The job card: the working record of a started job.
//!
//! A card is opened when its job first moves to `ongoing`. Technicians edit
//! it while the job is ongoing; afterwards only admins can. The
//! [`CompanyProfile`] is copied at opening time and never refreshed.

mod mutation;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use mutation::{JobCardMutation, JobCardPatch};

use crate::domain::Actor;
use crate::domain::directory::Client;
use crate::domain::jobs::{Job, JobError, JobId, JobStatus, TechnicianRef};

/// Consumable or part on the card's checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceItem {
    /// Item identifier.
    pub id: Uuid,
    /// Item name.
    pub name: String,
    /// Quantity, at least 1.
    pub quantity: u32,
    /// Whether the technician used it.
    pub used: bool,
}

/// Planned versus recorded working time, in hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkingTime {
    /// Admin estimate; fixed once the card exists.
    #[serde(rename = "default")]
    pub default_hours: f64,
    /// Technician-entered value.
    #[serde(rename = "actual")]
    pub actual_hours: f64,
    /// Whether `actual` has been confirmed since it last changed.
    pub confirmed: bool,
}

impl WorkingTime {
    fn seeded(hours: f64) -> Self {
        Self {
            default_hours: hours,
            actual_hours: hours,
            confirmed: false,
        }
    }

    /// The confirmed actual hours, if any.
    pub fn confirmed_hours(&self) -> Option<f64> {
        self.confirmed.then_some(self.actual_hours)
    }
}

/// Snapshot of the client and site details shown on the card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    /// Client name.
    pub client_name: String,
    /// Client contact.
    pub contact_person: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Property name.
    pub property_name: String,
    /// Property address.
    pub property_address: String,
    /// Access notes.
    pub special_instructions: String,
}

/// Working record attached to a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCard {
    job_id: JobId,
    title: String,
    assigned_technicians: Vec<TechnicianRef>,
    service_instructions: String,
    service_items: Vec<ServiceItem>,
    working_time: WorkingTime,
    company_profile: CompanyProfile,
    additional_details: String,
    uploaded_images: Vec<String>,
    helpers: Vec<String>,
    revision: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Deduplicate technicians by id, keeping the first occurrence.
pub(crate) fn distinct_technicians(technicians: Vec<TechnicianRef>) -> Vec<TechnicianRef> {
    let mut distinct: Vec<TechnicianRef> = Vec::with_capacity(technicians.len());
    for technician in technicians {
        if !distinct.iter().any(|seen| seen.id == technician.id) {
            distinct.push(technician);
        }
    }
    distinct
}

impl JobCard {
    /// Open the card for `job` using `client` for the profile snapshot.
    ///
    /// The default working time comes from the job estimate, falling back to
    /// `fallback_hours`.
    pub fn open(job: &Job, client: &Client, fallback_hours: f64, now: DateTime<Utc>) -> Self {
        let site = job.site();
        let special_instructions = client
            .property(&site.property_id)
            .map(|property| property.special_instructions.clone())
            .unwrap_or_default();
        let service_items = job
            .planned_items()
            .iter()
            .map(|item| ServiceItem {
                id: Uuid::new_v4(),
                name: item.name.clone(),
                quantity: item.quantity,
                used: false,
            })
            .collect();
        Self {
            job_id: job.id().clone(),
            title: format!("{} - {}", job.service_type().as_str(), site.property_name),
            assigned_technicians: job.assigned_technician().cloned().into_iter().collect(),
            service_instructions: job.description().to_owned(),
            service_items,
            working_time: WorkingTime::seeded(job.estimated_hours().unwrap_or(fallback_hours)),
            company_profile: CompanyProfile {
                client_name: site.client_name.clone(),
                contact_person: client.contact_person.clone(),
                email: client.email.clone(),
                phone: client.phone.clone(),
                property_name: site.property_name.clone(),
                property_address: site.property_address.clone(),
                special_instructions,
            },
            additional_details: String::new(),
            uploaded_images: Vec::new(),
            helpers: Vec::new(),
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check that `actor` may edit the card while its job is `status`.
    ///
    /// Admins may always edit. Technicians must be on the card and the job
    /// must be ongoing.
    pub fn ensure_editable(&self, status: JobStatus, actor: &Actor) -> Result<(), JobError> {
        if actor.is_admin() {
            return Ok(());
        }
        let on_card = actor
            .technician_id()
            .is_some_and(|id| self.assigned_technicians.iter().any(|tech| &tech.id == id));
        if !on_card {
            return Err(JobError::denied(actor, "edit this job card"));
        }
        if status != JobStatus::Ongoing {
            return Err(JobError::JobCardLocked { status });
        }
        Ok(())
    }

    /// Whether `actor` may read the card.
    pub fn is_visible_to(&self, actor: &Actor) -> bool {
        match actor.technician_id() {
            Some(id) => self.assigned_technicians.iter().any(|tech| &tech.id == id),
            None => actor.is_admin(),
        }
    }

    /// Validate and apply a mutation. The card is unchanged on failure.
    pub fn apply(
        &mut self,
        mutation: JobCardMutation,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<(), JobError> {
        mutation.apply_to(self, actor)?;
        self.updated_at = self.updated_at.max(now);
        Ok(())
    }

    /// Bump the revision before a save, returning the revision that was read.
    pub fn touch(&mut self) -> u64 {
        let read = self.revision;
        self.revision = read.saturating_add(1);
        read
    }

    /// Owning job.
    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Card heading, `"<service type> - <property>"`.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Technicians on the card, without duplicates.
    pub fn assigned_technicians(&self) -> &[TechnicianRef] {
        self.assigned_technicians.as_slice()
    }

    /// Instructions for the technician.
    pub fn service_instructions(&self) -> &str {
        self.service_instructions.as_str()
    }

    /// Item checklist in planned order.
    pub fn service_items(&self) -> &[ServiceItem] {
        self.service_items.as_slice()
    }

    /// Working time.
    pub fn working_time(&self) -> WorkingTime {
        self.working_time
    }

    /// Client and site snapshot.
    pub fn company_profile(&self) -> &CompanyProfile {
        &self.company_profile
    }

    /// Free-text log.
    pub fn additional_details(&self) -> &str {
        self.additional_details.as_str()
    }

    /// Progress photos in upload order.
    pub fn uploaded_images(&self) -> &[String] {
        self.uploaded_images.as_slice()
    }

    /// Helper names in the order they were added.
    pub fn helpers(&self) -> &[String] {
        self.helpers.as_slice()
    }

    /// Optimistic concurrency counter.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// When the card was opened.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last modification time.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
