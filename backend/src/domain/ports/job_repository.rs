//! Driven port for job and job card storage.
//!
//! A job and its card are stored together and share one lock in adapters.
//! Writes are conditional on the revision the caller read: callers bump the
//! revision with `touch` before saving and pass the value they read.

use async_trait::async_trait;

use crate::domain::{Job, JobCard, JobId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by job repository adapters.
    pub enum JobRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "job repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "job repository query failed: {message}",
        /// A job with the identifier already exists.
        Duplicate { id: String } =>
            "job {id} already exists",
        /// The stored revision differs from the one the caller read.
        RevisionMismatch { id: String, expected: u64, actual: u64 } =>
            "revision mismatch on {id}: expected {expected}, found {actual}",
    }
}

/// Storage for jobs and their cards.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Reserve the next number for a generated `JOB-NNN` identifier.
    async fn next_job_sequence(&self) -> Result<u64, JobRepositoryError>;

    /// Store a new job. Fails with `Duplicate` when the id is taken.
    async fn insert(&self, job: &Job) -> Result<(), JobRepositoryError>;

    /// Fetch a job by id.
    async fn find(&self, id: &JobId) -> Result<Option<Job>, JobRepositoryError>;

    /// All jobs in insertion order.
    async fn list(&self) -> Result<Vec<Job>, JobRepositoryError>;

    /// Replace a job if its stored revision is still `expected_revision`.
    async fn save(&self, job: &Job, expected_revision: u64) -> Result<(), JobRepositoryError>;

    /// Replace a job and its card in one step.
    ///
    /// `expected_card_revision` is `None` when the card is being opened and
    /// must not exist yet.
    async fn save_with_card(
        &self,
        job: &Job,
        expected_revision: u64,
        card: &JobCard,
        expected_card_revision: Option<u64>,
    ) -> Result<(), JobRepositoryError>;

    /// Fetch the card of a job.
    async fn find_card(&self, job_id: &JobId) -> Result<Option<JobCard>, JobRepositoryError>;

    /// Replace a card if its stored revision is still `expected_revision`
    /// and its job is still at `job_revision`.
    ///
    /// The job check stops an edit that was validated against a job status
    /// which has since changed, such as a submit landing mid-edit.
    async fn save_card(
        &self,
        card: &JobCard,
        expected_revision: u64,
        job_revision: u64,
    ) -> Result<(), JobRepositoryError>;
}
