//! Driving port for reading jobs.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Actor, Error, Job, JobFilter, JobId, Timeline};

/// Job reads. Technicians only see jobs assigned to them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobQuery: Send + Sync {
    /// Fetch one job.
    async fn get_job(&self, actor: &Actor, job_id: &JobId) -> Result<Job, Error>;

    /// Filter and page the jobs visible to `actor`, in creation order.
    async fn list_jobs(
        &self,
        actor: &Actor,
        filter: JobFilter,
        page: PageRequest,
    ) -> Result<Page<Job>, Error>;

    /// Timeline of one job.
    async fn timeline(&self, actor: &Actor, job_id: &JobId) -> Result<Timeline, Error>;
}
