//! Racing transitions against one job: exactly one caller wins.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Utc};
use fieldcrew::domain::ports::{
    CreateJobRequest, DirectoryCommand, JobCardCommand, JobCommand, JobQuery, JobRepository,
    JobRepositoryError, TransitionJobRequest,
};
use fieldcrew::domain::{
    Actor, ClientDraft, ClientId, DirectoryService, ErrorCode, Job, JobAction, JobCard,
    JobCardMutation, JobCardService, JobId, JobLifecycleService, JobStatus, PropertyDraft,
    PropertyId, ServiceType, TechnicianDraft, TechnicianId,
};
use fieldcrew::outbound::memory::{InMemoryDirectoryRepository, InMemoryJobRepository};
use futures::future::join_all;
use mockable::DefaultClock;
use rstest::rstest;

const RACERS: usize = 8;

fn admin() -> Actor {
    Actor::admin("Sarah Wilson")
}

fn mike() -> Actor {
    Actor::technician(TechnicianId::new("TECH-001"), "Mike Johnson")
}

struct Services<J> {
    jobs: Arc<JobLifecycleService<J, InMemoryDirectoryRepository>>,
    cards: Arc<JobCardService<J>>,
}

async fn services_with_pending_job<J: JobRepository + 'static>(job_store: Arc<J>) -> Services<J> {
    let clock = Arc::new(DefaultClock);
    let directory_store = Arc::new(InMemoryDirectoryRepository::new());
    let directory = DirectoryService::new(directory_store.clone(), job_store.clone());

    let client = directory
        .create_client(
            &admin(),
            ClientDraft {
                name: "Acme Corp".to_owned(),
                contact_person: "John Smith".to_owned(),
                email: "john@acme.com".to_owned(),
                phone: String::new(),
                main_address: "123 Business Ave".to_owned(),
            },
        )
        .await
        .expect("client created");
    directory
        .add_property(
            &admin(),
            &client.id,
            PropertyDraft {
                name: "Main Office Building".to_owned(),
                address: "123 Business Ave".to_owned(),
                special_instructions: None,
            },
        )
        .await
        .expect("property added");
    directory
        .register_technician(
            &admin(),
            TechnicianDraft {
                name: "Mike Johnson".to_owned(),
                email: "mike@fieldcrew.test".to_owned(),
                phone: String::new(),
                role: "Technician".to_owned(),
                can_create_jobs: false,
            },
        )
        .await
        .expect("technician registered");

    let jobs = Arc::new(JobLifecycleService::new(
        job_store.clone(),
        directory_store,
        clock.clone(),
    ));
    jobs.create_job(
        &admin(),
        CreateJobRequest {
            job_id: Some("JOB-100".to_owned()),
            client_id: ClientId::new("CLIENT-001"),
            property_id: PropertyId::new("PROP-001"),
            service_type: ServiceType::Repair,
            description: "Replace the lobby thermostat".to_owned(),
            location: None,
            scheduled_date: NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid date"),
            scheduled_time: NaiveTime::from_hms_opt(9, 0, 0).expect("valid time"),
            priority: None,
            technician_id: Some(TechnicianId::new("TECH-001")),
            estimated_hours: None,
            planned_items: Vec::new(),
        },
    )
    .await
    .expect("job created");

    Services {
        jobs,
        cards: Arc::new(JobCardService::new(job_store, clock)),
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn one_start_wins_the_race() {
    let services = services_with_pending_job(Arc::new(InMemoryJobRepository::new())).await;
    let job_id = JobId::new("JOB-100");

    let attempts = (0..RACERS).map(|_| {
        let jobs = services.jobs.clone();
        let job_id = job_id.clone();
        tokio::spawn(async move {
            jobs.transition_job(
                &mike(),
                TransitionJobRequest {
                    job_id,
                    action: JobAction::Start,
                    expected_status: Some(JobStatus::Pending),
                    notes: None,
                },
            )
            .await
        })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.expect("task completes"))
        .collect();

    let winners = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(winners, 1);
    assert!(
        results
            .iter()
            .filter_map(|result| result.as_ref().err())
            .all(|err| err.code() == ErrorCode::Conflict)
    );

    let timeline = services
        .jobs
        .timeline(&admin(), &job_id)
        .await
        .expect("timeline");
    assert_eq!(timeline.len(), 2);
    let card = services
        .cards
        .get_job_card(&admin(), &job_id)
        .await
        .expect("card opened once");
    assert_eq!(card.revision(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_card_edits_never_lose_a_helper_silently() {
    let services = services_with_pending_job(Arc::new(InMemoryJobRepository::new())).await;
    let job_id = JobId::new("JOB-100");
    services
        .jobs
        .transition_job(
            &mike(),
            TransitionJobRequest {
                job_id: job_id.clone(),
                action: JobAction::Start,
                expected_status: None,
                notes: None,
            },
        )
        .await
        .expect("job started");

    let attempts = (0..RACERS).map(|n| {
        let cards = services.cards.clone();
        let job_id = job_id.clone();
        tokio::spawn(async move {
            cards
                .mutate_job_card(
                    &mike(),
                    &job_id,
                    JobCardMutation::AddHelper {
                        name: format!("Helper {n}"),
                    },
                )
                .await
        })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.expect("task completes"))
        .collect();

    let accepted = results.iter().filter(|result| result.is_ok()).count();
    assert!(accepted >= 1);
    assert!(
        results
            .iter()
            .filter_map(|result| result.as_ref().err())
            .all(|err| err.code() == ErrorCode::Conflict)
    );

    let card = services
        .cards
        .get_job_card(&admin(), &job_id)
        .await
        .expect("card");
    assert_eq!(card.helpers().len(), accepted);
}

/// Job store that submits the job for approval the next time a card is
/// read, after the card service has already checked the job status.
#[derive(Default)]
struct SubmitOnCardRead {
    inner: InMemoryJobRepository,
    armed: AtomicBool,
}

impl SubmitOnCardRead {
    async fn submit(&self, job_id: &JobId) -> Result<(), JobRepositoryError> {
        let mut job = self
            .inner
            .find(job_id)
            .await?
            .ok_or_else(|| JobRepositoryError::query(format!("job {job_id} is not stored")))?;
        job.transition(JobAction::SubmitForApproval, &mike(), None, Utc::now())
            .map_err(|err| JobRepositoryError::query(err.to_string()))?;
        let read = job.touch(Utc::now());
        self.inner.save(&job, read).await
    }
}

#[async_trait]
impl JobRepository for SubmitOnCardRead {
    async fn next_job_sequence(&self) -> Result<u64, JobRepositoryError> {
        self.inner.next_job_sequence().await
    }

    async fn insert(&self, job: &Job) -> Result<(), JobRepositoryError> {
        self.inner.insert(job).await
    }

    async fn find(&self, id: &JobId) -> Result<Option<Job>, JobRepositoryError> {
        self.inner.find(id).await
    }

    async fn list(&self) -> Result<Vec<Job>, JobRepositoryError> {
        self.inner.list().await
    }

    async fn save(&self, job: &Job, expected_revision: u64) -> Result<(), JobRepositoryError> {
        self.inner.save(job, expected_revision).await
    }

    async fn save_with_card(
        &self,
        job: &Job,
        expected_revision: u64,
        card: &JobCard,
        expected_card_revision: Option<u64>,
    ) -> Result<(), JobRepositoryError> {
        self.inner
            .save_with_card(job, expected_revision, card, expected_card_revision)
            .await
    }

    async fn find_card(&self, job_id: &JobId) -> Result<Option<JobCard>, JobRepositoryError> {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.submit(job_id).await?;
        }
        self.inner.find_card(job_id).await
    }

    async fn save_card(
        &self,
        card: &JobCard,
        expected_revision: u64,
        job_revision: u64,
    ) -> Result<(), JobRepositoryError> {
        self.inner
            .save_card(card, expected_revision, job_revision)
            .await
    }
}

#[rstest]
#[tokio::test]
async fn a_submit_mid_edit_freezes_the_card() {
    let store = Arc::new(SubmitOnCardRead::default());
    let services = services_with_pending_job(store.clone()).await;
    let job_id = JobId::new("JOB-100");
    services
        .jobs
        .transition_job(
            &mike(),
            TransitionJobRequest {
                job_id: job_id.clone(),
                action: JobAction::Start,
                expected_status: None,
                notes: None,
            },
        )
        .await
        .expect("job started");
    store.armed.store(true, Ordering::SeqCst);

    let error = services
        .cards
        .mutate_job_card(
            &mike(),
            &job_id,
            JobCardMutation::AddHelper {
                name: "Late Helper".to_owned(),
            },
        )
        .await
        .expect_err("card frozen by the submit");
    assert_eq!(error.code(), ErrorCode::Conflict);

    let job = services.jobs.get_job(&admin(), &job_id).await.expect("job");
    assert_eq!(job.status(), JobStatus::PendingApproval);
    let card = services
        .cards
        .get_job_card(&admin(), &job_id)
        .await
        .expect("card");
    assert!(card.helpers().is_empty());
}
