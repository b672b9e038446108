//! Job lifecycle service.
//!
//! Implements [`JobCommand`] and [`JobQuery`] over the job and directory
//! repositories. Every mutation follows the same shape: load, apply the
//! aggregate rule, bump the revision, then save conditionally on the
//! revision that was read.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::{info, warn};

use super::ports::{
    AssignJobRequest, CreateJobRequest, DirectoryRepository, JobCommand, JobQuery, JobRepository,
    JobRepositoryError, ReviewJobRequest, TimelineNoteRequest, TransitionJobRequest,
    UpdateJobRequest,
};
use super::service_support::{load_client, load_job, load_technician, map_job_repository_error};
use super::{
    Actor, Client, DirectoryError, Error, Job, JobAction, JobCard, JobCardMutation, JobCardPatch,
    JobError, JobFilter, JobId, JobSite, JobUpdate, NewJob, SiteSelection, TechnicianId,
    TechnicianRef, TechnicianStatus, Timeline, TimelineEvent,
};

/// Working hours seeded onto a job card when the job has no estimate.
pub const DEFAULT_WORKING_HOURS: f64 = 4.0;

/// Attempts made to claim a generated job id before giving up.
const MAX_ID_ATTEMPTS: usize = 16;

/// Job lifecycle service implementing the job driving ports.
#[derive(Clone)]
pub struct JobLifecycleService<J, D> {
    jobs: Arc<J>,
    directory: Arc<D>,
    clock: Arc<dyn Clock>,
    default_working_hours: f64,
}

impl<J, D> JobLifecycleService<J, D> {
    /// Create a service using [`DEFAULT_WORKING_HOURS`].
    pub fn new(jobs: Arc<J>, directory: Arc<D>, clock: Arc<dyn Clock>) -> Self {
        Self {
            jobs,
            directory,
            clock,
            default_working_hours: DEFAULT_WORKING_HOURS,
        }
    }

    /// Override the hours seeded onto cards of jobs without an estimate.
    #[must_use]
    pub fn with_default_working_hours(mut self, hours: f64) -> Self {
        if hours.is_finite() && hours >= 0.0 {
            self.default_working_hours = hours;
        }
        self
    }
}

fn site_for(client: &Client, selection: &SiteSelection) -> Result<JobSite, DirectoryError> {
    let (client, property) = selection.resolve(client)?;
    Ok(JobSite {
        client_id: client.id.clone(),
        client_name: client.name.clone(),
        property_id: property.id.clone(),
        property_name: property.name.clone(),
        property_address: property.address.clone(),
    })
}

fn parse_job_id(raw: &str) -> Result<JobId, JobError> {
    JobId::parse(raw).map_err(|err| JobError::invalid("jobId", err.to_string()))
}

impl<J, D> JobLifecycleService<J, D>
where
    J: JobRepository,
    D: DirectoryRepository,
{
    async fn assignable(&self, id: &TechnicianId) -> Result<TechnicianRef, Error> {
        let technician = load_technician(self.directory.as_ref(), id).await?;
        if technician.status != TechnicianStatus::Active {
            return Err(
                DirectoryError::invalid("technicianId", "technician is inactive").into(),
            );
        }
        Ok(TechnicianRef {
            id: technician.id,
            name: technician.name,
        })
    }

    async fn ensure_may_create(&self, actor: &Actor) -> Result<(), Error> {
        if actor.is_admin() {
            return Ok(());
        }
        let Some(id) = actor.technician_id() else {
            return Err(JobError::denied(actor, "create jobs").into());
        };
        let technician = load_technician(self.directory.as_ref(), id).await?;
        if technician.may_create_jobs() {
            Ok(())
        } else {
            Err(JobError::denied(actor, "create jobs").into())
        }
    }

    async fn insert_new(
        &self,
        job_id: Option<&str>,
        draft: NewJob,
        actor: &Actor,
    ) -> Result<Job, Error> {
        let now = self.clock.utc();
        if let Some(raw) = job_id {
            let id = parse_job_id(raw)?;
            let job = Job::create(id.clone(), draft, actor, now)?;
            return match self.jobs.insert(&job).await {
                Ok(()) => Ok(job),
                Err(JobRepositoryError::Duplicate { .. }) => {
                    Err(JobError::DuplicateJobId(id).into())
                }
                Err(err) => Err(map_job_repository_error(err)),
            };
        }

        for _ in 0..MAX_ID_ATTEMPTS {
            let sequence = self
                .jobs
                .next_job_sequence()
                .await
                .map_err(map_job_repository_error)?;
            let job = Job::create(JobId::from_sequence(sequence), draft.clone(), actor, now)?;
            match self.jobs.insert(&job).await {
                Ok(()) => return Ok(job),
                Err(JobRepositoryError::Duplicate { id }) => {
                    warn!(job_id = %id, "generated job id already taken, retrying");
                }
                Err(err) => return Err(map_job_repository_error(err)),
            }
        }
        Err(Error::internal("could not allocate a job id"))
    }

    /// Save a transitioned job, reporting a concurrent write as an invalid
    /// transition against the status now stored.
    async fn persist_transition(
        &self,
        mut job: Job,
        action: JobAction,
        card: Option<JobCard>,
    ) -> Result<Job, Error> {
        let read = job.touch(self.clock.utc());
        let outcome = match &card {
            Some(card) => self.jobs.save_with_card(&job, read, card, None).await,
            None => self.jobs.save(&job, read).await,
        };
        match outcome {
            Ok(()) => Ok(job),
            Err(JobRepositoryError::RevisionMismatch { .. }) => {
                let fresh = load_job(self.jobs.as_ref(), job.id()).await?;
                warn!(job_id = %job.id(), action = %action, "concurrent job update detected");
                Err(JobError::InvalidTransition {
                    current: fresh.status(),
                    action,
                }
                .into())
            }
            Err(err) => Err(map_job_repository_error(err)),
        }
    }

    async fn card_to_open(&self, job: &Job) -> Result<Option<JobCard>, Error> {
        let existing = self
            .jobs
            .find_card(job.id())
            .await
            .map_err(map_job_repository_error)?;
        if existing.is_some() {
            return Ok(None);
        }
        let client = load_client(self.directory.as_ref(), &job.site().client_id).await?;
        Ok(Some(JobCard::open(
            job,
            &client,
            self.default_working_hours,
            self.clock.utc(),
        )))
    }

    async fn save_edit(&self, mut job: Job) -> Result<Job, Error> {
        let read = job.touch(self.clock.utc());
        self.jobs
            .save(&job, read)
            .await
            .map_err(map_job_repository_error)?;
        Ok(job)
    }

    async fn resolve_site_change(
        &self,
        job: &Job,
        request: &UpdateJobRequest,
    ) -> Result<Option<JobSite>, Error> {
        let property_id = match (&request.client_id, &request.property_id) {
            (None, None) => return Ok(None),
            (Some(_), None) => {
                return Err(DirectoryError::invalid(
                    "propertyId",
                    "a property is required when the client changes",
                )
                .into());
            }
            (_, Some(property)) => property,
        };
        let client_id = request
            .client_id
            .as_ref()
            .unwrap_or(&job.site().client_id);
        let client = load_client(self.directory.as_ref(), client_id).await?;
        let mut selection = SiteSelection::new();
        selection.select_client(&client);
        selection.select_property(&client, property_id)?;
        Ok(Some(site_for(&client, &selection)?))
    }
}

#[async_trait]
impl<J, D> JobCommand for JobLifecycleService<J, D>
where
    J: JobRepository,
    D: DirectoryRepository,
{
    async fn create_job(&self, actor: &Actor, request: CreateJobRequest) -> Result<Job, Error> {
        self.ensure_may_create(actor).await?;

        let client = load_client(self.directory.as_ref(), &request.client_id).await?;
        let mut selection = SiteSelection::new();
        selection.select_client(&client);
        selection.select_property(&client, &request.property_id)?;
        let site = site_for(&client, &selection)?;

        // Technicians creating work without naming anyone take it themselves.
        let technician_id = request
            .technician_id
            .clone()
            .or_else(|| actor.technician_id().cloned());
        let technician = match technician_id {
            Some(id) => Some(self.assignable(&id).await?),
            None => None,
        };

        let draft = NewJob {
            site,
            service_type: request.service_type,
            description: request.description,
            location: request.location,
            scheduled_date: request.scheduled_date,
            scheduled_time: request.scheduled_time,
            priority: request.priority,
            technician,
            estimated_hours: request.estimated_hours,
            planned_items: request.planned_items,
        };
        let job = self
            .insert_new(request.job_id.as_deref(), draft, actor)
            .await?;
        info!(job_id = %job.id(), actor = %actor, "job created");
        Ok(job)
    }

    async fn update_job(&self, actor: &Actor, request: UpdateJobRequest) -> Result<Job, Error> {
        let mut job = load_job(self.jobs.as_ref(), &request.job_id).await?;
        let site = self.resolve_site_change(&job, &request).await?;
        let update = JobUpdate {
            site,
            service_type: request.service_type,
            description: request.description,
            location: request.location,
            scheduled_date: request.scheduled_date,
            scheduled_time: request.scheduled_time,
            priority: request.priority,
            estimated_hours: request.estimated_hours,
        };
        job.update(update, actor, self.clock.utc())?;
        let job = self.save_edit(job).await?;
        info!(job_id = %job.id(), actor = %actor, "job details updated");
        Ok(job)
    }

    async fn transition_job(
        &self,
        actor: &Actor,
        request: TransitionJobRequest,
    ) -> Result<Job, Error> {
        let TransitionJobRequest {
            job_id,
            action,
            expected_status,
            notes,
        } = request;
        let mut job = load_job(self.jobs.as_ref(), &job_id).await?;
        if expected_status.is_some_and(|expected| expected != job.status()) {
            return Err(JobError::InvalidTransition {
                current: job.status(),
                action,
            }
            .into());
        }

        let previous = job.transition(action, actor, notes, self.clock.utc())?;
        let card = if action == JobAction::Start {
            self.card_to_open(&job).await?
        } else {
            None
        };
        let job = self.persist_transition(job, action, card).await?;
        info!(
            job_id = %job.id(),
            from = %previous,
            to = %job.status(),
            actor = %actor,
            "job status changed"
        );
        Ok(job)
    }

    async fn review_job(&self, actor: &Actor, request: ReviewJobRequest) -> Result<Job, Error> {
        let mut job = load_job(self.jobs.as_ref(), &request.job_id).await?;
        job.review(request.decision, actor, request.notes, self.clock.utc())?;
        let job = self
            .persist_transition(job, request.decision.action(), None)
            .await?;
        info!(
            job_id = %job.id(),
            decision = ?request.decision,
            actor = %actor,
            "job reviewed"
        );
        Ok(job)
    }

    async fn assign_job(&self, actor: &Actor, request: AssignJobRequest) -> Result<Job, Error> {
        let mut job = load_job(self.jobs.as_ref(), &request.job_id).await?;
        if !actor.is_admin() {
            return Err(JobError::denied(actor, "assign technicians").into());
        }
        let technician = self.assignable(&request.technician_id).await?;
        let now = self.clock.utc();
        let previous = job.assigned_technician().map(|current| current.id.clone());
        if !job.assign(technician.clone(), actor, now)? {
            return Ok(job);
        }

        let card = self
            .jobs
            .find_card(job.id())
            .await
            .map_err(map_job_repository_error)?;
        let read = job.touch(now);
        match card {
            Some(mut card) => {
                // The outgoing assignee leaves the card. Technicians an admin
                // added by hand stay.
                let mut technicians = card.assigned_technicians().to_vec();
                technicians.retain(|tech| {
                    previous.as_ref() != Some(&tech.id) && tech.id != technician.id
                });
                technicians.push(technician);
                card.apply(
                    JobCardMutation::Update(JobCardPatch {
                        assigned_technicians: Some(technicians),
                        ..JobCardPatch::default()
                    }),
                    actor,
                    now,
                )?;
                let card_read = card.touch();
                self.jobs
                    .save_with_card(&job, read, &card, Some(card_read))
                    .await
                    .map_err(map_job_repository_error)?;
            }
            None => self
                .jobs
                .save(&job, read)
                .await
                .map_err(map_job_repository_error)?,
        }
        info!(job_id = %job.id(), technician = %request.technician_id, "job assigned");
        Ok(job)
    }

    async fn add_timeline_entry(
        &self,
        actor: &Actor,
        request: TimelineNoteRequest,
    ) -> Result<TimelineEvent, Error> {
        let mut job = load_job(self.jobs.as_ref(), &request.job_id).await?;
        let event = job.record_activity(actor, request.content, request.images, self.clock.utc())?;
        self.save_edit(job).await?;
        Ok(event)
    }
}

#[async_trait]
impl<J, D> JobQuery for JobLifecycleService<J, D>
where
    J: JobRepository,
    D: DirectoryRepository,
{
    async fn get_job(&self, actor: &Actor, job_id: &JobId) -> Result<Job, Error> {
        let job = load_job(self.jobs.as_ref(), job_id).await?;
        if !job.is_visible_to(actor) {
            return Err(JobError::denied(actor, "view this job").into());
        }
        Ok(job)
    }

    async fn list_jobs(
        &self,
        actor: &Actor,
        filter: JobFilter,
        page: PageRequest,
    ) -> Result<Page<Job>, Error> {
        if actor.is_super_admin() {
            return Err(JobError::denied(actor, "list jobs").into());
        }
        let jobs = self.jobs.list().await.map_err(map_job_repository_error)?;
        let matching: Vec<Job> = jobs
            .into_iter()
            .filter(|job| job.is_visible_to(actor) && filter.matches(job))
            .collect();
        Ok(Page::slice(matching, page))
    }

    async fn timeline(&self, actor: &Actor, job_id: &JobId) -> Result<Timeline, Error> {
        let job = self.get_job(actor, job_id).await?;
        Ok(job.timeline().clone())
    }
}

#[cfg(test)]
#[path = "job_lifecycle_service_tests.rs"]
mod tests;
