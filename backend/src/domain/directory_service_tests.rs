//! Tests for the directory service.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    DirectoryRepositoryError, MockDirectoryRepository, MockJobRepository,
};
use crate::domain::{
    ErrorCode, JobAction, JobId, JobSite, NewJob, ServiceType, TechnicianRef,
};

fn acme() -> Client {
    Client::new(
        ClientId::new("CLIENT-001"),
        ClientDraft {
            name: "Acme Corp".to_owned(),
            contact_person: "John Smith".to_owned(),
            email: "john@acme.com".to_owned(),
            phone: "(555) 123-4567".to_owned(),
            main_address: "123 Business Ave".to_owned(),
        },
    )
    .expect("valid client")
}

fn technician(id: &str, name: &str) -> Technician {
    Technician::new(
        TechnicianId::new(id),
        TechnicianDraft {
            name: name.to_owned(),
            email: format!("{}@fieldcrew.test", id.to_lowercase()),
            phone: String::new(),
            role: "Senior Technician".to_owned(),
            can_create_jobs: false,
        },
    )
    .expect("valid technician")
}

fn job_for(id: &str, technician: &Technician, actions: &[JobAction]) -> Job {
    let admin = Actor::admin("Admin");
    let now = Utc
        .with_ymd_and_hms(2024, 3, 14, 8, 0, 0)
        .single()
        .expect("valid timestamp");
    let mut job = Job::create(
        JobId::new(id),
        NewJob {
            site: JobSite {
                client_id: ClientId::new("CLIENT-001"),
                client_name: "Acme Corp".to_owned(),
                property_id: PropertyId::new("PROP-001"),
                property_name: "Main Office Building".to_owned(),
                property_address: "123 Business Ave".to_owned(),
            },
            service_type: ServiceType::Inspection,
            description: "Quarterly inspection".to_owned(),
            location: None,
            scheduled_date: NaiveDate::from_ymd_opt(2024, 3, 14).expect("valid date"),
            scheduled_time: NaiveTime::from_hms_opt(9, 0, 0).expect("valid time"),
            priority: None,
            technician: Some(TechnicianRef {
                id: technician.id.clone(),
                name: technician.name.clone(),
            }),
            estimated_hours: None,
            planned_items: Vec::new(),
        },
        &admin,
        now,
    )
    .expect("valid job");
    let worker = Actor::technician(technician.id.clone(), technician.name.clone());
    for action in actions {
        let actor = if *action == JobAction::SubmitForApproval {
            &worker
        } else {
            &admin
        };
        job.transition(*action, actor, None, now).expect("allowed");
    }
    job
}

#[fixture]
fn admin() -> Actor {
    Actor::admin("Admin")
}

fn make_service(
    directory: MockDirectoryRepository,
    jobs: MockJobRepository,
) -> DirectoryService<MockDirectoryRepository, MockJobRepository> {
    DirectoryService::new(Arc::new(directory), Arc::new(jobs))
}

#[rstest]
#[tokio::test]
async fn create_client_issues_sequential_id(admin: Actor) {
    let mut directory = MockDirectoryRepository::new();
    directory
        .expect_next_sequence()
        .withf(|sequence| *sequence == DirectorySequence::Client)
        .return_once(|_| Ok(7));
    directory
        .expect_save_client()
        .withf(|client| client.id.as_str() == "CLIENT-007")
        .times(1)
        .return_once(|_| Ok(()));

    let client = make_service(directory, MockJobRepository::new())
        .create_client(
            &admin,
            ClientDraft {
                name: " Acme Corp ".to_owned(),
                contact_person: "John Smith".to_owned(),
                email: "john@acme.com".to_owned(),
                phone: String::new(),
                main_address: String::new(),
            },
        )
        .await
        .expect("client created");
    assert_eq!(client.name, "Acme Corp");
    assert!(client.properties().is_empty());
}

#[rstest]
#[tokio::test]
async fn technicians_cannot_edit_the_directory() {
    let mut directory = MockDirectoryRepository::new();
    directory.expect_next_sequence().never();
    directory.expect_save_client().never();
    let actor = Actor::technician(TechnicianId::new("TECH-001"), "Mike Johnson");

    let error = make_service(directory, MockJobRepository::new())
        .create_client(&actor, ClientDraft::default())
        .await
        .expect_err("forbidden");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn duplicate_property_name_is_rejected(admin: Actor) {
    let mut client = acme();
    client
        .add_property(
            PropertyId::new("PROP-001"),
            PropertyDraft {
                name: "Main Office Building".to_owned(),
                address: "123 Business Ave".to_owned(),
                special_instructions: None,
            },
        )
        .expect("first property");
    let mut directory = MockDirectoryRepository::new();
    directory
        .expect_find_client()
        .return_once(move |_| Ok(Some(client)));
    directory.expect_next_sequence().return_once(|_| Ok(2));
    directory.expect_save_client().never();

    let error = make_service(directory, MockJobRepository::new())
        .add_property(
            &admin,
            &ClientId::new("CLIENT-001"),
            PropertyDraft {
                name: "main office building".to_owned(),
                address: "Elsewhere".to_owned(),
                special_instructions: None,
            },
        )
        .await
        .expect_err("duplicate");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn add_property_saves_the_client(admin: Actor) {
    let mut directory = MockDirectoryRepository::new();
    directory
        .expect_find_client()
        .return_once(|_| Ok(Some(acme())));
    directory
        .expect_next_sequence()
        .withf(|sequence| *sequence == DirectorySequence::Property)
        .return_once(|_| Ok(4));
    directory
        .expect_save_client()
        .withf(|client| client.properties().len() == 1)
        .times(1)
        .return_once(|_| Ok(()));

    let client = make_service(directory, MockJobRepository::new())
        .add_property(
            &admin,
            &ClientId::new("CLIENT-001"),
            PropertyDraft {
                name: "Warehouse".to_owned(),
                address: "9 Dock Rd".to_owned(),
                special_instructions: Some("Gate code 1234".to_owned()),
            },
        )
        .await
        .expect("property added");
    let property = &client.properties()[0];
    assert_eq!(property.id.as_str(), "PROP-004");
    assert_eq!(property.special_instructions, "Gate code 1234");
}

#[rstest]
#[tokio::test]
async fn workloads_are_counted_from_jobs(admin: Actor) {
    let mike = technician("TECH-001", "Mike Johnson");
    let sarah = technician("TECH-002", "Sarah Davis");
    let jobs_list = vec![
        job_for("JOB-001", &mike, &[]),
        job_for("JOB-002", &mike, &[JobAction::Start]),
        job_for(
            "JOB-003",
            &mike,
            &[JobAction::Start, JobAction::SubmitForApproval, JobAction::Approve],
        ),
        job_for(
            "JOB-004",
            &mike,
            &[JobAction::Start, JobAction::SubmitForApproval],
        ),
        job_for("JOB-005", &sarah, &[JobAction::Cancel]),
    ];
    let roster = vec![mike, sarah];
    let mut directory = MockDirectoryRepository::new();
    directory
        .expect_list_technicians()
        .return_once(move || Ok(roster));
    let mut jobs = MockJobRepository::new();
    jobs.expect_list().return_once(move || Ok(jobs_list));

    let page = make_service(directory, jobs)
        .list_technicians(&admin, None, None, PageRequest::default())
        .await
        .expect("listed");
    let counts: Vec<_> = page
        .items()
        .iter()
        .map(|view| (view.workload.active_jobs, view.workload.completed_jobs))
        .collect();
    assert_eq!(counts, [(2, 2), (0, 0)]);
}

#[rstest]
#[tokio::test]
async fn technician_search_respects_status(admin: Actor) {
    let mut retired = technician("TECH-003", "Mike Retired");
    retired.status = TechnicianStatus::Inactive;
    let roster = vec![technician("TECH-001", "Mike Johnson"), retired];
    let mut directory = MockDirectoryRepository::new();
    directory
        .expect_list_technicians()
        .return_once(move || Ok(roster));
    let mut jobs = MockJobRepository::new();
    jobs.expect_list().return_once(|| Ok(Vec::new()));

    let page = make_service(directory, jobs)
        .list_technicians(
            &admin,
            Some("mike".to_owned()),
            Some(TechnicianStatus::Inactive),
            PageRequest::default(),
        )
        .await
        .expect("listed");
    assert_eq!(page.total(), 1);
    assert_eq!(page.items()[0].technician.id.as_str(), "TECH-003");
}

#[rstest]
#[tokio::test]
async fn client_search_pages_matches() {
    let clients: Vec<Client> = (1..=12)
        .map(|n| {
            Client::new(
                ClientId::from_sequence(n),
                ClientDraft {
                    name: format!("Client {n}"),
                    contact_person: "Pat".to_owned(),
                    email: format!("c{n}@example.com"),
                    ..ClientDraft::default()
                },
            )
            .expect("valid client")
        })
        .collect();
    let mut directory = MockDirectoryRepository::new();
    directory
        .expect_list_clients()
        .return_once(move || Ok(clients));
    let actor = Actor::technician(TechnicianId::new("TECH-001"), "Mike Johnson");

    let page = make_service(directory, MockJobRepository::new())
        .list_clients(
            &actor,
            Some("client".to_owned()),
            PageRequest::new(2, 10).expect("valid page"),
        )
        .await
        .expect("listed");
    assert_eq!(page.total(), 12);
    assert_eq!(page.items().len(), 2);
}

#[rstest]
#[tokio::test]
async fn directory_outage_is_unavailable(admin: Actor) {
    let mut directory = MockDirectoryRepository::new();
    directory
        .expect_find_client()
        .return_once(|_| Err(DirectoryRepositoryError::connection("refused")));

    let error = make_service(directory, MockJobRepository::new())
        .get_client(&admin, &ClientId::new("CLIENT-001"))
        .await
        .expect_err("unavailable");
    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn updating_unknown_technician_is_not_found(admin: Actor) {
    let mut directory = MockDirectoryRepository::new();
    directory.expect_find_technician().return_once(|_| Ok(None));
    directory.expect_save_technician().never();

    let error = make_service(directory, MockJobRepository::new())
        .update_technician(
            &admin,
            &TechnicianId::new("TECH-404"),
            TechnicianUpdate {
                status: Some(TechnicianStatus::Inactive),
                ..TechnicianUpdate::default()
            },
        )
        .await
        .expect_err("missing");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn super_admins_do_not_read_the_directory() {
    let error = make_service(MockDirectoryRepository::new(), MockJobRepository::new())
        .get_client(&Actor::super_admin("Ops"), &ClientId::new("CLIENT-001"))
        .await
        .expect_err("forbidden");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}
