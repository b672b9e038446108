//! The job record and the rules that mutate it.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::permissions::authorize_transition;
use super::{
    JobAction, JobError, JobId, JobStatus, ReviewDecision, StatusLabel, Timeline, TimelineEntry,
    TimelineEvent, TimelineEventKind,
};
use crate::domain::Actor;
use crate::domain::directory::{ClientId, PropertyId, TechnicianId};

/// Kind of work requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    /// New equipment.
    Installation,
    /// Scheduled upkeep.
    Maintenance,
    /// Fault repair.
    Repair,
    /// Survey or compliance check.
    Inspection,
    /// Urgent call-out.
    Emergency,
}

impl ServiceType {
    /// Display name of the service type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Installation => "Installation",
            Self::Maintenance => "Maintenance",
            Self::Repair => "Repair",
            Self::Inspection => "Inspection",
            Self::Emergency => "Emergency",
        }
    }
}

impl std::str::FromStr for ServiceType {
    type Err = JobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "installation" => Ok(Self::Installation),
            "maintenance" => Ok(Self::Maintenance),
            "repair" => Ok(Self::Repair),
            "inspection" => Ok(Self::Inspection),
            "emergency" => Ok(Self::Emergency),
            _ => Err(JobError::invalid(
                "serviceType",
                "must be Installation, Maintenance, Repair, Inspection or Emergency",
            )),
        }
    }
}

/// Scheduling priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Do first.
    High,
    /// Default.
    #[default]
    Medium,
    /// Whenever convenient.
    Low,
}

impl Priority {
    /// Wire name of the priority.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = JobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(JobError::invalid("priority", "must be high, medium or low")),
        }
    }
}

/// Technician identity snapshot held by a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TechnicianRef {
    /// Technician identifier.
    pub id: TechnicianId,
    /// Name at assignment time.
    pub name: String,
}

/// Client and property the job is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSite {
    /// Owning client.
    pub client_id: ClientId,
    /// Client name snapshot.
    pub client_name: String,
    /// Property of that client.
    pub property_id: PropertyId,
    /// Property name snapshot.
    pub property_name: String,
    /// Property address snapshot.
    pub property_address: String,
}

/// Item planned for the job, copied onto the card when work starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedItem {
    /// Item name.
    pub name: String,
    /// Quantity, at least 1.
    pub quantity: u32,
}

/// Outcome of the latest admin review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Decision taken.
    pub decision: ReviewDecision,
    /// Reviewer notes.
    pub notes: Option<String>,
    /// Reviewer display name.
    pub reviewer: String,
    /// When the decision was recorded.
    pub reviewed_at: DateTime<Utc>,
}

/// Validated input for a new job.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    /// Where the work happens.
    pub site: JobSite,
    /// Kind of work.
    pub service_type: ServiceType,
    /// Work description; becomes the card's instructions.
    pub description: String,
    /// Free-text location; defaults to the property address when blank.
    pub location: Option<String>,
    /// Scheduled day.
    pub scheduled_date: NaiveDate,
    /// Scheduled start time.
    pub scheduled_time: NaiveTime,
    /// Priority, defaulting to medium.
    pub priority: Option<Priority>,
    /// Technician to assign at creation.
    pub technician: Option<TechnicianRef>,
    /// Expected effort in hours.
    pub estimated_hours: Option<f64>,
    /// Items expected to be used.
    pub planned_items: Vec<PlannedItem>,
}

/// Admin edit of job details; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobUpdate {
    /// New site, already validated against the directory.
    pub site: Option<JobSite>,
    /// New service type.
    pub service_type: Option<ServiceType>,
    /// New description.
    pub description: Option<String>,
    /// New location.
    pub location: Option<String>,
    /// New scheduled day.
    pub scheduled_date: Option<NaiveDate>,
    /// New scheduled time.
    pub scheduled_time: Option<NaiveTime>,
    /// New priority.
    pub priority: Option<Priority>,
    /// New estimate.
    pub estimated_hours: Option<f64>,
}

/// A unit of field work.
///
/// Jobs are never deleted; they end in `approved` or `cancelled`.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    id: JobId,
    site: JobSite,
    service_type: ServiceType,
    description: String,
    location: String,
    scheduled_date: NaiveDate,
    scheduled_time: NaiveTime,
    priority: Priority,
    assigned_technician: Option<TechnicianRef>,
    status: JobStatus,
    estimated_hours: Option<f64>,
    planned_items: Vec<PlannedItem>,
    created_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    revision: u64,
    last_review: Option<Review>,
    completion_notes: Option<String>,
    timeline: Timeline,
}

fn validate_hours(field: &'static str, hours: Option<f64>) -> Result<Option<f64>, JobError> {
    match hours {
        Some(value) if !value.is_finite() || value < 0.0 => {
            Err(JobError::invalid(field, "must be a finite number of hours, at least 0"))
        }
        other => Ok(other),
    }
}

fn validate_items(items: Vec<PlannedItem>) -> Result<Vec<PlannedItem>, JobError> {
    items
        .into_iter()
        .map(|item| {
            let name = item.name.trim().to_owned();
            if name.is_empty() {
                return Err(JobError::invalid("plannedItems", "item names must not be blank"));
            }
            if item.quantity == 0 {
                return Err(JobError::invalid("plannedItems", "quantities must be at least 1"));
            }
            Ok(PlannedItem {
                name,
                quantity: item.quantity,
            })
        })
        .collect()
}

fn location_or_address(location: Option<String>, site: &JobSite) -> String {
    location
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| site.property_address.clone())
}

impl Job {
    /// Create a pending job and record the `created` event.
    ///
    /// Assigning a technician at creation does not add a separate
    /// `assigned` event.
    pub fn create(
        id: JobId,
        draft: NewJob,
        creator: &Actor,
        now: DateTime<Utc>,
    ) -> Result<Self, JobError> {
        let NewJob {
            site,
            service_type,
            description,
            location,
            scheduled_date,
            scheduled_time,
            priority,
            technician,
            estimated_hours,
            planned_items,
        } = draft;

        let estimated_hours = validate_hours("estimatedHours", estimated_hours)?;
        let planned_items = validate_items(planned_items)?;
        let location = location_or_address(location, &site);

        let summary = match &technician {
            Some(tech) => format!("Job created and assigned to {}", tech.name),
            None => "Job created".to_owned(),
        };
        let mut timeline = Timeline::default();
        timeline.append(
            TimelineEntry::new(TimelineEventKind::Created, creator.display_name())
                .with_content(Some(summary)),
            now,
        );

        Ok(Self {
            id,
            site,
            service_type,
            description: description.trim().to_owned(),
            location,
            scheduled_date,
            scheduled_time,
            priority: priority.unwrap_or_default(),
            assigned_technician: technician,
            status: JobStatus::Pending,
            estimated_hours,
            planned_items,
            created_by: creator.display_name().to_owned(),
            created_at: now,
            updated_at: now,
            revision: 0,
            last_review: None,
            completion_notes: None,
            timeline,
        })
    }

    /// Apply a status action.
    ///
    /// The transition table is consulted before permissions, so a pair the
    /// table does not allow is always [`JobError::InvalidTransition`]. On
    /// failure the job is left unchanged.
    pub fn transition(
        &mut self,
        action: JobAction,
        actor: &Actor,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<JobStatus, JobError> {
        let previous = self.status;
        let next = previous
            .apply(action)
            .ok_or(JobError::InvalidTransition {
                current: previous,
                action,
            })?;
        authorize_transition(self, action, actor)?;

        let target_label = match action {
            JobAction::Reject => StatusLabel::Rejected,
            _ => StatusLabel::from(next),
        };
        let event = self.timeline.append(
            TimelineEntry::status_change(actor.display_name(), previous.into(), target_label)
                .with_content(notes),
            now,
        );

        match action {
            JobAction::SubmitForApproval => self.completion_notes = event.content,
            JobAction::Approve | JobAction::Reject => {
                let decision = if action == JobAction::Approve {
                    ReviewDecision::Approve
                } else {
                    ReviewDecision::Reject
                };
                self.last_review = Some(Review {
                    decision,
                    notes: event.content,
                    reviewer: actor.display_name().to_owned(),
                    reviewed_at: event.timestamp,
                });
            }
            JobAction::Start | JobAction::Cancel => {}
        }

        self.status = next;
        self.updated_at = now;
        Ok(previous)
    }

    /// Record an admin decision on a job awaiting approval.
    pub fn review(
        &mut self,
        decision: ReviewDecision,
        actor: &Actor,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), JobError> {
        if self.status != JobStatus::PendingApproval {
            return Err(JobError::NotAwaitingApproval {
                current: self.status,
            });
        }
        self.transition(decision.action(), actor, notes, now)?;
        Ok(())
    }

    /// Assign or reassign the technician. Re-assigning the same technician
    /// is a no-op.
    pub fn assign(
        &mut self,
        technician: TechnicianRef,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<bool, JobError> {
        if !actor.is_admin() {
            return Err(JobError::denied(actor, "assign technicians"));
        }
        if !self.status.is_active() {
            return Err(JobError::NotEditable {
                status: self.status,
            });
        }
        if self
            .assigned_technician
            .as_ref()
            .is_some_and(|current| current.id == technician.id)
        {
            return Ok(false);
        }
        self.timeline.append(
            TimelineEntry::new(TimelineEventKind::Assigned, actor.display_name())
                .with_content(Some(format!("Assigned to {}", technician.name))),
            now,
        );
        self.assigned_technician = Some(technician);
        self.updated_at = now;
        Ok(true)
    }

    /// Append a note or image event.
    pub fn record_activity(
        &mut self,
        actor: &Actor,
        content: Option<String>,
        images: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<TimelineEvent, JobError> {
        if !self.is_visible_to(actor) {
            return Err(JobError::denied(actor, "comment on this job"));
        }
        let images: Vec<String> = images
            .into_iter()
            .map(|image| image.trim().to_owned())
            .filter(|image| !image.is_empty())
            .collect();
        let entry = if images.is_empty() {
            TimelineEntry::new(TimelineEventKind::Note, actor.display_name())
        } else {
            TimelineEntry::new(TimelineEventKind::Image, actor.display_name()).with_images(images)
        }
        .with_content(content);
        if entry.content.is_none() && entry.images.is_empty() {
            return Err(JobError::invalid("content", "a note needs text or images"));
        }
        let event = self.timeline.append(entry, now);
        self.updated_at = now;
        Ok(event)
    }

    /// Apply an admin edit while the job is pending or ongoing.
    pub fn update(
        &mut self,
        update: JobUpdate,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<(), JobError> {
        if !actor.is_admin() {
            return Err(JobError::denied(actor, "edit job details"));
        }
        if !self.status.is_active() {
            return Err(JobError::NotEditable {
                status: self.status,
            });
        }
        let estimated_hours = validate_hours("estimatedHours", update.estimated_hours)?;

        if let Some(site) = update.site {
            let follows_address = self.location == self.site.property_address;
            if follows_address {
                self.location.clone_from(&site.property_address);
            }
            self.site = site;
        }
        if let Some(service_type) = update.service_type {
            self.service_type = service_type;
        }
        if let Some(description) = update.description {
            self.description = description.trim().to_owned();
        }
        if let Some(location) = update.location {
            self.location = location_or_address(Some(location), &self.site);
        }
        if let Some(date) = update.scheduled_date {
            self.scheduled_date = date;
        }
        if let Some(time) = update.scheduled_time {
            self.scheduled_time = time;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if estimated_hours.is_some() {
            self.estimated_hours = estimated_hours;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Bump the revision before a save, returning the revision that was read.
    pub fn touch(&mut self, now: DateTime<Utc>) -> u64 {
        let read = self.revision;
        self.revision = read.saturating_add(1);
        self.updated_at = self.updated_at.max(now);
        read
    }

    /// Whether `technician` is the assigned technician.
    pub fn is_assigned_to(&self, technician: &TechnicianId) -> bool {
        self.assigned_technician
            .as_ref()
            .is_some_and(|assigned| &assigned.id == technician)
    }

    /// Whether `actor` may read the job.
    pub fn is_visible_to(&self, actor: &Actor) -> bool {
        super::permissions::can_view(self, actor)
    }

    /// Job identifier.
    pub fn id(&self) -> &JobId {
        &self.id
    }

    /// Client and property.
    pub fn site(&self) -> &JobSite {
        &self.site
    }

    /// Client name snapshot.
    pub fn client_name(&self) -> &str {
        self.site.client_name.as_str()
    }

    /// Kind of work.
    pub fn service_type(&self) -> ServiceType {
        self.service_type
    }

    /// Work description.
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Free-text location.
    pub fn location(&self) -> &str {
        self.location.as_str()
    }

    /// Scheduled day.
    pub fn scheduled_date(&self) -> NaiveDate {
        self.scheduled_date
    }

    /// Scheduled start time.
    pub fn scheduled_time(&self) -> NaiveTime {
        self.scheduled_time
    }

    /// Priority.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Assigned technician, if any.
    pub fn assigned_technician(&self) -> Option<&TechnicianRef> {
        self.assigned_technician.as_ref()
    }

    /// Current status.
    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// Expected effort.
    pub fn estimated_hours(&self) -> Option<f64> {
        self.estimated_hours
    }

    /// Planned items.
    pub fn planned_items(&self) -> &[PlannedItem] {
        self.planned_items.as_slice()
    }

    /// Name of whoever created the job.
    pub fn created_by(&self) -> &str {
        self.created_by.as_str()
    }

    /// Creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last modification time.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Optimistic concurrency counter.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Latest review outcome.
    pub fn last_review(&self) -> Option<&Review> {
        self.last_review.as_ref()
    }

    /// Notes supplied when the technician submitted the work.
    pub fn completion_notes(&self) -> Option<&str> {
        self.completion_notes.as_deref()
    }

    /// Activity timeline.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }
}
