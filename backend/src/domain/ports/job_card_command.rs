//! Driving port for job cards, addressed by job id.

use async_trait::async_trait;

use crate::domain::{Actor, Error, JobCard, JobCardMutation, JobId};

/// Job card reads and edits.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobCardCommand: Send + Sync {
    /// Fetch the card of a started job.
    async fn get_job_card(&self, actor: &Actor, job_id: &JobId) -> Result<JobCard, Error>;

    /// Apply one edit and return the stored card.
    async fn mutate_job_card(
        &self,
        actor: &Actor,
        job_id: &JobId,
        mutation: JobCardMutation,
    ) -> Result<JobCard, Error>;
}
