//! In-memory job and job card storage.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{JobRepository, JobRepositoryError};
use crate::domain::{Job, JobCard, JobId};

#[derive(Debug, Default)]
struct JobStore {
    sequence: u64,
    jobs: Vec<Job>,
    cards: HashMap<JobId, JobCard>,
}

impl JobStore {
    fn position(&self, id: &JobId) -> Option<usize> {
        self.jobs.iter().position(|job| job.id() == id)
    }

    /// Index of the stored job, provided its revision is `expected`.
    fn check_job(&self, id: &JobId, expected: u64) -> Result<usize, JobRepositoryError> {
        let index = self
            .position(id)
            .ok_or_else(|| JobRepositoryError::query(format!("job {id} is not stored")))?;
        let actual = self.jobs[index].revision();
        if actual != expected {
            return Err(JobRepositoryError::revision_mismatch(
                id.as_str(),
                expected,
                actual,
            ));
        }
        Ok(index)
    }

    fn check_card(&self, card: &JobCard, expected: Option<u64>) -> Result<(), JobRepositoryError> {
        let id = card.job_id();
        match (self.cards.get(id), expected) {
            (None, None) => Ok(()),
            (Some(_), None) => Err(JobRepositoryError::duplicate(format!("{id}/card"))),
            (None, Some(_)) => Err(JobRepositoryError::query(format!(
                "job card for {id} is not stored"
            ))),
            (Some(stored), Some(expected)) if stored.revision() != expected => Err(
                JobRepositoryError::revision_mismatch(id.as_str(), expected, stored.revision()),
            ),
            (Some(_), Some(_)) => Ok(()),
        }
    }
}

/// Jobs and their cards behind one mutex.
///
/// The lock is never held across an `.await`, so a job and its card always
/// change together.
#[derive(Debug, Default)]
pub struct InMemoryJobRepository {
    store: Mutex<JobStore>,
}

impl InMemoryJobRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, JobStore>, JobRepositoryError> {
        self.store
            .lock()
            .map_err(|_| JobRepositoryError::query("job store lock poisoned"))
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn next_job_sequence(&self) -> Result<u64, JobRepositoryError> {
        let mut store = self.lock()?;
        store.sequence += 1;
        Ok(store.sequence)
    }

    async fn insert(&self, job: &Job) -> Result<(), JobRepositoryError> {
        let mut store = self.lock()?;
        if store.position(job.id()).is_some() {
            return Err(JobRepositoryError::duplicate(job.id().as_str()));
        }
        store.jobs.push(job.clone());
        Ok(())
    }

    async fn find(&self, id: &JobId) -> Result<Option<Job>, JobRepositoryError> {
        let store = self.lock()?;
        Ok(store.position(id).map(|index| store.jobs[index].clone()))
    }

    async fn list(&self) -> Result<Vec<Job>, JobRepositoryError> {
        Ok(self.lock()?.jobs.clone())
    }

    async fn save(&self, job: &Job, expected_revision: u64) -> Result<(), JobRepositoryError> {
        let mut store = self.lock()?;
        let index = store.check_job(job.id(), expected_revision)?;
        store.jobs[index] = job.clone();
        Ok(())
    }

    async fn save_with_card(
        &self,
        job: &Job,
        expected_revision: u64,
        card: &JobCard,
        expected_card_revision: Option<u64>,
    ) -> Result<(), JobRepositoryError> {
        let mut store = self.lock()?;
        let index = store.check_job(job.id(), expected_revision)?;
        store.check_card(card, expected_card_revision)?;
        store.jobs[index] = job.clone();
        store.cards.insert(card.job_id().clone(), card.clone());
        Ok(())
    }

    async fn find_card(&self, job_id: &JobId) -> Result<Option<JobCard>, JobRepositoryError> {
        Ok(self.lock()?.cards.get(job_id).cloned())
    }

    async fn save_card(
        &self,
        card: &JobCard,
        expected_revision: u64,
        job_revision: u64,
    ) -> Result<(), JobRepositoryError> {
        let mut store = self.lock()?;
        store.check_job(card.job_id(), job_revision)?;
        store.check_card(card, Some(expected_revision))?;
        store.cards.insert(card.job_id().clone(), card.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::{
        Actor, Client, ClientDraft, ClientId, JobAction, JobSite, NewJob, PropertyDraft,
        PropertyId, ServiceType,
    };

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 14, 8, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn job(id: &str) -> Job {
        Job::create(
            JobId::new(id),
            NewJob {
                site: JobSite {
                    client_id: ClientId::new("CLIENT-001"),
                    client_name: "Acme Corp".to_owned(),
                    property_id: PropertyId::new("PROP-001"),
                    property_name: "Main Office Building".to_owned(),
                    property_address: "123 Business Ave".to_owned(),
                },
                service_type: ServiceType::Maintenance,
                description: "Replace filters".to_owned(),
                location: None,
                scheduled_date: NaiveDate::from_ymd_opt(2024, 3, 14).expect("valid date"),
                scheduled_time: NaiveTime::from_hms_opt(9, 0, 0).expect("valid time"),
                priority: None,
                technician: None,
                estimated_hours: None,
                planned_items: Vec::new(),
            },
            &Actor::admin("Admin"),
            now(),
        )
        .expect("valid job")
    }

    fn client() -> Client {
        let mut client = Client::new(
            ClientId::new("CLIENT-001"),
            ClientDraft {
                name: "Acme Corp".to_owned(),
                contact_person: "John Smith".to_owned(),
                email: "john@acme.com".to_owned(),
                ..ClientDraft::default()
            },
        )
        .expect("valid client");
        client
            .add_property(
                PropertyId::new("PROP-001"),
                PropertyDraft {
                    name: "Main Office Building".to_owned(),
                    address: "123 Business Ave".to_owned(),
                    special_instructions: None,
                },
            )
            .expect("unique property");
        client
    }

    #[fixture]
    fn repository() -> InMemoryJobRepository {
        InMemoryJobRepository::new()
    }

    #[rstest]
    #[tokio::test]
    async fn sequence_counts_up(repository: InMemoryJobRepository) {
        let first = repository.next_job_sequence().await.expect("sequence");
        let second = repository.next_job_sequence().await.expect("sequence");
        assert_eq!((first, second), (1, 2));
    }

    #[rstest]
    #[tokio::test]
    async fn insert_rejects_taken_ids(repository: InMemoryJobRepository) {
        repository.insert(&job("JOB-001")).await.expect("first insert");
        let err = repository
            .insert(&job("JOB-001"))
            .await
            .expect_err("duplicate");
        assert_eq!(err, JobRepositoryError::duplicate("JOB-001"));
    }

    #[rstest]
    #[tokio::test]
    async fn list_keeps_insertion_order(repository: InMemoryJobRepository) {
        for id in ["JOB-003", "JOB-001", "JOB-002"] {
            repository.insert(&job(id)).await.expect("insert");
        }
        let ids: Vec<String> = repository
            .list()
            .await
            .expect("list")
            .iter()
            .map(|job| job.id().to_string())
            .collect();
        assert_eq!(ids, ["JOB-003", "JOB-001", "JOB-002"]);
    }

    #[rstest]
    #[tokio::test]
    async fn stale_saves_are_rejected(repository: InMemoryJobRepository) {
        repository.insert(&job("JOB-001")).await.expect("insert");
        let mut first = repository
            .find(&JobId::new("JOB-001"))
            .await
            .expect("find")
            .expect("stored");
        let mut second = first.clone();

        let read = first.touch(now());
        repository.save(&first, read).await.expect("first save");

        let read = second.touch(now());
        let err = repository
            .save(&second, read)
            .await
            .expect_err("stale");
        assert_eq!(err, JobRepositoryError::revision_mismatch("JOB-001", 0_u64, 1_u64));
    }

    #[rstest]
    #[tokio::test]
    async fn job_and_card_are_saved_together(repository: InMemoryJobRepository) {
        repository.insert(&job("JOB-001")).await.expect("insert");
        let mut stored = repository
            .find(&JobId::new("JOB-001"))
            .await
            .expect("find")
            .expect("stored");
        stored
            .transition(JobAction::Start, &Actor::admin("Admin"), None, now())
            .expect("start");
        let card = JobCard::open(&stored, &client(), 4.0, now());
        let read = stored.touch(now());

        repository
            .save_with_card(&stored, read, &card, None)
            .await
            .expect("saved");
        let err = repository
            .save_with_card(&stored, read, &card, None)
            .await
            .expect_err("job revision moved on");
        assert!(matches!(err, JobRepositoryError::RevisionMismatch { .. }));
        let found = repository
            .find_card(&JobId::new("JOB-001"))
            .await
            .expect("find card");
        assert_eq!(found, Some(card));
    }

    #[rstest]
    #[tokio::test]
    async fn card_saves_check_the_card_revision(repository: InMemoryJobRepository) {
        repository.insert(&job("JOB-001")).await.expect("insert");
        let mut stored = repository
            .find(&JobId::new("JOB-001"))
            .await
            .expect("find")
            .expect("stored");
        let card = JobCard::open(&stored, &client(), 4.0, now());
        let read = stored.touch(now());
        repository
            .save_with_card(&stored, read, &card, None)
            .await
            .expect("saved");

        let mut edited = card.clone();
        let read = edited.touch();
        repository
            .save_card(&edited, read, stored.revision())
            .await
            .expect("fresh save");

        let mut stale = card;
        let read = stale.touch();
        let err = repository
            .save_card(&stale, read, stored.revision())
            .await
            .expect_err("stale card");
        assert_eq!(err, JobRepositoryError::revision_mismatch("JOB-001", 0_u64, 1_u64));
    }

    #[rstest]
    #[tokio::test]
    async fn card_saves_fail_once_the_job_moves_on(repository: InMemoryJobRepository) {
        repository.insert(&job("JOB-001")).await.expect("insert");
        let mut stored = repository
            .find(&JobId::new("JOB-001"))
            .await
            .expect("find")
            .expect("stored");
        let card = JobCard::open(&stored, &client(), 4.0, now());
        let read = stored.touch(now());
        repository
            .save_with_card(&stored, read, &card, None)
            .await
            .expect("saved");
        let job_read = stored.revision();

        let read = stored.touch(now());
        repository.save(&stored, read).await.expect("job edited");

        let mut edited = card;
        let read = edited.touch();
        let err = repository
            .save_card(&edited, read, job_read)
            .await
            .expect_err("job changed under the card");
        assert_eq!(err, JobRepositoryError::revision_mismatch("JOB-001", 1_u64, 2_u64));
        let kept = repository
            .find_card(&JobId::new("JOB-001"))
            .await
            .expect("find card")
            .expect("stored card");
        assert_eq!(kept.revision(), 0);
    }
}
