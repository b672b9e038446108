//! Job card service implementing [`JobCardCommand`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use super::ports::{JobCardCommand, JobRepository, JobRepositoryError};
use super::service_support::{load_job, map_job_repository_error};
use super::{Actor, Error, JobCard, JobCardMutation, JobError, JobId};

/// Job card service.
#[derive(Clone)]
pub struct JobCardService<J> {
    jobs: Arc<J>,
    clock: Arc<dyn Clock>,
}

impl<J> JobCardService<J> {
    /// Create a new service over the job repository.
    pub fn new(jobs: Arc<J>, clock: Arc<dyn Clock>) -> Self {
        Self { jobs, clock }
    }
}

impl<J: JobRepository> JobCardService<J> {
    async fn load_card(&self, job_id: &JobId) -> Result<JobCard, Error> {
        self.jobs
            .find_card(job_id)
            .await
            .map_err(map_job_repository_error)?
            .ok_or_else(|| JobError::JobCardNotFound(job_id.clone()).into())
    }

    /// Explain a rejected card save against a fresh read.
    ///
    /// When the job changed status mid-edit the caller sees the lock, not a
    /// bare revision conflict.
    async fn explain_failed_save(
        &self,
        actor: &Actor,
        job_id: &JobId,
        error: JobRepositoryError,
    ) -> Error {
        if !matches!(error, JobRepositoryError::RevisionMismatch { .. }) {
            return map_job_repository_error(error);
        }
        warn!(job_id = %job_id, "job card changed during edit");
        let job = match load_job(self.jobs.as_ref(), job_id).await {
            Ok(job) => job,
            Err(reload) => return reload,
        };
        let card = match self.load_card(job_id).await {
            Ok(card) => card,
            Err(reload) => return reload,
        };
        match card.ensure_editable(job.status(), actor) {
            Err(locked) => locked.into(),
            Ok(()) => map_job_repository_error(error),
        }
    }
}

#[async_trait]
impl<J: JobRepository> JobCardCommand for JobCardService<J> {
    async fn get_job_card(&self, actor: &Actor, job_id: &JobId) -> Result<JobCard, Error> {
        let job = load_job(self.jobs.as_ref(), job_id).await?;
        let card = self.load_card(job_id).await?;
        if !card.is_visible_to(actor) && !job.is_visible_to(actor) {
            return Err(JobError::denied(actor, "view this job card").into());
        }
        Ok(card)
    }

    async fn mutate_job_card(
        &self,
        actor: &Actor,
        job_id: &JobId,
        mutation: JobCardMutation,
    ) -> Result<JobCard, Error> {
        let job = load_job(self.jobs.as_ref(), job_id).await?;
        let mut card = self.load_card(job_id).await?;
        card.ensure_editable(job.status(), actor)?;

        let operation = mutation.name();
        card.apply(mutation, actor, self.clock.utc())?;
        let read = card.touch();
        if let Err(error) = self.jobs.save_card(&card, read, job.revision()).await {
            return Err(self.explain_failed_save(actor, job_id, error).await);
        }
        info!(job_id = %job_id, operation, revision = card.revision(), "job card updated");
        Ok(card)
    }
}

#[cfg(test)]
#[path = "job_card_service_tests.rs"]
mod tests;
