//! Tests for the job aggregate, its permissions and list filters.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::Actor;
use crate::domain::directory::{ClientId, PropertyId, TechnicianId};

fn at(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + seconds, 0)
        .single()
        .expect("valid timestamp")
}

fn mike() -> TechnicianRef {
    TechnicianRef {
        id: TechnicianId::new("TECH-001"),
        name: "Mike Johnson".to_owned(),
    }
}

fn sarah() -> TechnicianRef {
    TechnicianRef {
        id: TechnicianId::new("TECH-002"),
        name: "Sarah Davis".to_owned(),
    }
}

fn acme_site() -> JobSite {
    JobSite {
        client_id: ClientId::new("CLIENT-001"),
        client_name: "Acme Corp".to_owned(),
        property_id: PropertyId::new("PROP-001"),
        property_name: "Main Office Building".to_owned(),
        property_address: "123 Business Ave".to_owned(),
    }
}

fn draft(technician: Option<TechnicianRef>) -> NewJob {
    NewJob {
        site: acme_site(),
        service_type: ServiceType::Maintenance,
        description: "Quarterly HVAC service".to_owned(),
        location: None,
        scheduled_date: NaiveDate::from_ymd_opt(2024, 3, 14).expect("valid date"),
        scheduled_time: NaiveTime::from_hms_opt(9, 30, 0).expect("valid time"),
        priority: None,
        technician,
        estimated_hours: None,
        planned_items: vec![PlannedItem {
            name: "Air filter".to_owned(),
            quantity: 2,
        }],
    }
}

#[fixture]
fn admin() -> Actor {
    Actor::admin("Admin")
}

#[fixture]
fn technician() -> Actor {
    Actor::technician(mike().id, "Mike Johnson")
}

#[fixture]
fn job(admin: Actor) -> Job {
    Job::create(JobId::new("JOB-100"), draft(Some(mike())), &admin, at(0)).expect("valid job")
}

fn job_in(status: JobStatus, admin: &Actor, tech: &Actor) -> Job {
    let mut job = Job::create(JobId::new("JOB-100"), draft(Some(mike())), admin, at(0))
        .expect("valid job");
    let path: &[JobAction] = match status {
        JobStatus::Pending => &[],
        JobStatus::Ongoing => &[JobAction::Start],
        JobStatus::PendingApproval => &[JobAction::Start, JobAction::SubmitForApproval],
        JobStatus::Approved => &[
            JobAction::Start,
            JobAction::SubmitForApproval,
            JobAction::Approve,
        ],
        JobStatus::Cancelled => &[JobAction::Cancel],
    };
    for (step, action) in path.iter().enumerate() {
        let actor = if *action == JobAction::SubmitForApproval {
            tech
        } else {
            admin
        };
        job.transition(*action, actor, None, at(step as i64 + 1))
            .expect("scripted transition");
    }
    job
}

#[rstest]
fn create_defaults_priority_and_location(job: Job) {
    assert_eq!(job.status(), JobStatus::Pending);
    assert_eq!(job.priority(), Priority::Medium);
    assert_eq!(job.location(), "123 Business Ave");
    assert_eq!(job.revision(), 0);
    assert_eq!(job.created_by(), "Admin");
    let events = job.timeline().events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, TimelineEventKind::Created);
    assert_eq!(
        events[0].content.as_deref(),
        Some("Job created and assigned to Mike Johnson")
    );
}

#[rstest]
#[case(Some(-1.0))]
#[case(Some(f64::NAN))]
#[case(Some(f64::INFINITY))]
fn create_rejects_bad_estimates(admin: Actor, #[case] hours: Option<f64>) {
    let mut input = draft(None);
    input.estimated_hours = hours;
    let err = Job::create(JobId::new("JOB-001"), input, &admin, at(0)).expect_err("invalid");
    assert!(matches!(err, JobError::InvalidInput { field: "estimatedHours", .. }));
}

#[rstest]
fn create_rejects_zero_quantity_items(admin: Actor) {
    let mut input = draft(None);
    input.planned_items.push(PlannedItem {
        name: "Coolant".to_owned(),
        quantity: 0,
    });
    let err = Job::create(JobId::new("JOB-001"), input, &admin, at(0)).expect_err("invalid");
    assert!(matches!(err, JobError::InvalidInput { field: "plannedItems", .. }));
}

#[rstest]
fn every_disallowed_pair_is_an_invalid_transition(admin: Actor, technician: Actor) {
    let statuses = [
        JobStatus::Pending,
        JobStatus::Ongoing,
        JobStatus::PendingApproval,
        JobStatus::Approved,
        JobStatus::Cancelled,
    ];
    let actions = [
        JobAction::Start,
        JobAction::SubmitForApproval,
        JobAction::Approve,
        JobAction::Reject,
        JobAction::Cancel,
    ];
    for status in statuses {
        for action in actions {
            if status.apply(action).is_some() {
                continue;
            }
            let mut job = job_in(status, &admin, &technician);
            let before = job.clone();
            // Even the wrong role sees the state-machine failure first.
            let err = job
                .transition(action, &technician, None, at(100))
                .expect_err("disallowed pair");
            assert_eq!(
                err,
                JobError::InvalidTransition {
                    current: status,
                    action
                }
            );
            assert_eq!(job, before, "{status} + {action} must not mutate");
        }
    }
}

#[rstest]
fn reject_returns_to_ongoing_and_records_review(admin: Actor, technician: Actor) {
    let mut job = job_in(JobStatus::PendingApproval, &admin, &technician);
    job.review(
        ReviewDecision::Reject,
        &admin,
        Some("needs more photos".to_owned()),
        at(50),
    )
    .expect("reject");

    assert_eq!(job.status(), JobStatus::Ongoing);
    let last = job.timeline().last().expect("event");
    assert_eq!(
        last.status_change,
        Some(StatusChange {
            from: StatusLabel::PendingApproval,
            to: StatusLabel::Rejected,
        })
    );
    assert_eq!(last.content.as_deref(), Some("needs more photos"));
    let review = job.last_review().expect("review stored");
    assert_eq!(review.decision, ReviewDecision::Reject);
    assert_eq!(review.reviewer, "Admin");
}

#[rstest]
fn approval_round_trip_orders_events(admin: Actor, technician: Actor) {
    let mut job = job_in(JobStatus::PendingApproval, &admin, &technician);
    job.review(ReviewDecision::Approve, &admin, None, at(60))
        .expect("approve");

    let changes: Vec<_> = job
        .timeline()
        .events()
        .iter()
        .filter_map(|event| event.status_change)
        .map(|change| (change.from, change.to))
        .collect();
    assert_eq!(
        changes,
        vec![
            (StatusLabel::Pending, StatusLabel::Ongoing),
            (StatusLabel::Ongoing, StatusLabel::PendingApproval),
            (StatusLabel::PendingApproval, StatusLabel::Approved),
        ]
    );
    assert!(job.status().is_terminal());
}

#[rstest]
#[case(JobStatus::Pending)]
#[case(JobStatus::Ongoing)]
#[case(JobStatus::Approved)]
fn review_requires_pending_approval(
    admin: Actor,
    technician: Actor,
    #[case] status: JobStatus,
) {
    let mut job = job_in(status, &admin, &technician);
    let err = job
        .review(ReviewDecision::Approve, &admin, None, at(70))
        .expect_err("not awaiting approval");
    assert_eq!(err, JobError::NotAwaitingApproval { current: status });
}

#[rstest]
fn only_the_assigned_technician_submits(admin: Actor) {
    let mut job = job_in(JobStatus::Ongoing, &admin, &admin);
    let other = Actor::technician(sarah().id, "Sarah Davis");

    let err = job
        .transition(JobAction::SubmitForApproval, &other, None, at(10))
        .expect_err("not assigned");
    assert!(matches!(err, JobError::PermissionDenied { .. }));

    let err = job
        .transition(JobAction::SubmitForApproval, &admin, None, at(10))
        .expect_err("admins do not submit");
    assert!(matches!(err, JobError::PermissionDenied { .. }));
}

#[rstest]
fn technicians_cannot_cancel(mut job: Job, technician: Actor) {
    let err = job
        .transition(JobAction::Cancel, &technician, None, at(5))
        .expect_err("admin only");
    assert!(matches!(err, JobError::PermissionDenied { operation: "cancel jobs", .. }));
    assert_eq!(job.status(), JobStatus::Pending);
}

#[rstest]
fn submission_keeps_completion_notes(admin: Actor, technician: Actor) {
    let mut job = job_in(JobStatus::Ongoing, &admin, &technician);
    job.transition(
        JobAction::SubmitForApproval,
        &technician,
        Some(" All filters replaced ".to_owned()),
        at(20),
    )
    .expect("submit");
    assert_eq!(job.completion_notes(), Some("All filters replaced"));
}

#[rstest]
fn reassignment_appends_event_once(mut job: Job, admin: Actor) {
    assert!(!job.assign(mike(), &admin, at(3)).expect("same technician"));
    assert!(job.assign(sarah(), &admin, at(4)).expect("reassign"));
    assert_eq!(job.assigned_technician(), Some(&sarah()));
    assert_eq!(
        job.timeline().last().map(|event| event.kind),
        Some(TimelineEventKind::Assigned)
    );
    assert_eq!(job.timeline().len(), 2);
}

#[rstest]
fn finished_jobs_reject_edits(admin: Actor, technician: Actor) {
    let mut job = job_in(JobStatus::PendingApproval, &admin, &technician);
    let update = JobUpdate {
        description: Some("changed".to_owned()),
        ..JobUpdate::default()
    };
    let err = job.update(update, &admin, at(90)).expect_err("locked");
    assert_eq!(
        err,
        JobError::NotEditable {
            status: JobStatus::PendingApproval
        }
    );
}

#[rstest]
fn changing_site_moves_a_defaulted_location(mut job: Job, admin: Actor) {
    let mut site = acme_site();
    site.property_id = PropertyId::new("PROP-002");
    site.property_name = "Warehouse".to_owned();
    site.property_address = "456 Industrial Blvd".to_owned();
    job.update(
        JobUpdate {
            site: Some(site),
            ..JobUpdate::default()
        },
        &admin,
        at(8),
    )
    .expect("update");
    assert_eq!(job.location(), "456 Industrial Blvd");
}

#[rstest]
fn notes_need_text_or_images(mut job: Job, technician: Actor) {
    let err = job
        .record_activity(&technician, Some("  ".to_owned()), vec![], at(6))
        .expect_err("empty note");
    assert!(matches!(err, JobError::InvalidInput { field: "content", .. }));

    let event = job
        .record_activity(&technician, None, vec!["photo-1.jpg".to_owned()], at(7))
        .expect("image event");
    assert_eq!(event.kind, TimelineEventKind::Image);
}

#[rstest]
fn strangers_cannot_see_or_comment(mut job: Job) {
    let other = Actor::technician(sarah().id, "Sarah Davis");
    assert!(!can_view(&job, &other));
    assert!(!can_view(&job, &Actor::super_admin("Ops")));
    let err = job
        .record_activity(&other, Some("hi".to_owned()), vec![], at(9))
        .expect_err("not assigned");
    assert!(matches!(err, JobError::PermissionDenied { .. }));
}

#[rstest]
fn touch_bumps_revision(mut job: Job) {
    assert_eq!(job.touch(at(1)), 0);
    assert_eq!(job.touch(at(2)), 1);
    assert_eq!(job.revision(), 2);
}

fn listing(admin: &Actor, technician: &Actor) -> Vec<Job> {
    let mut jobs = Vec::new();
    let specs = [
        ("JOB-001", Some(mike()), JobStatus::Pending),
        ("JOB-002", Some(sarah()), JobStatus::Ongoing),
        ("JOB-003", Some(mike()), JobStatus::PendingApproval),
        ("JOB-004", None, JobStatus::Cancelled),
        ("JOB-005", Some(mike()), JobStatus::Approved),
    ];
    for (id, tech, status) in specs {
        let mut job = Job::create(JobId::new(id), draft(tech.clone()), admin, at(0))
            .expect("valid job");
        let acting = match &tech {
            Some(assigned) => Actor::technician(assigned.id.clone(), assigned.name.clone()),
            None => technician.clone(),
        };
        let path: &[JobAction] = match status {
            JobStatus::Pending => &[],
            JobStatus::Ongoing => &[JobAction::Start],
            JobStatus::PendingApproval => &[JobAction::Start, JobAction::SubmitForApproval],
            JobStatus::Approved => &[
                JobAction::Start,
                JobAction::SubmitForApproval,
                JobAction::Approve,
            ],
            JobStatus::Cancelled => &[JobAction::Cancel],
        };
        for action in path {
            let actor = if *action == JobAction::SubmitForApproval {
                &acting
            } else {
                admin
            };
            job.transition(*action, actor, None, at(1)).expect("scripted");
        }
        jobs.push(job);
    }
    jobs
}

fn ids(jobs: &[&Job]) -> Vec<String> {
    jobs.iter().map(|job| job.id().to_string()).collect()
}

#[rstest]
#[case("", &["JOB-001", "JOB-002", "JOB-003", "JOB-004", "JOB-005"])]
#[case("sarah", &["JOB-002"])]
#[case("job-00", &["JOB-001", "JOB-002", "JOB-003", "JOB-004", "JOB-005"])]
#[case("ACME", &["JOB-001", "JOB-002", "JOB-003", "JOB-004", "JOB-005"])]
#[case("nobody", &[])]
fn search_term_filters(
    admin: Actor,
    technician: Actor,
    #[case] term: &str,
    #[case] expected: &[&str],
) {
    let jobs = listing(&admin, &technician);
    assert_eq!(ids(&filter_by_search_term(&jobs, term)), expected);
}

#[rstest]
#[case("all", &["JOB-001", "JOB-002", "JOB-003", "JOB-004", "JOB-005"])]
#[case("completed", &["JOB-003", "JOB-005"])]
#[case("pending_approval", &["JOB-003"])]
#[case("cancelled", &["JOB-004"])]
fn status_filters(
    admin: Actor,
    technician: Actor,
    #[case] raw: &str,
    #[case] expected: &[&str],
) {
    let jobs = listing(&admin, &technician);
    let status: StatusFilter = raw.parse().expect("known status");
    assert_eq!(ids(&filter_by_status(&jobs, status)), expected);
}

#[rstest]
fn technician_filter_matches_exact_names(admin: Actor, technician: Actor) {
    let jobs = listing(&admin, &technician);
    assert_eq!(
        ids(&filter_by_technician(&jobs, "Mike Johnson")),
        ["JOB-001", "JOB-003", "JOB-005"]
    );
    assert!(filter_by_technician(&jobs, "mike johnson").is_empty());
    assert_eq!(filter_by_technician(&jobs, "all").len(), jobs.len());
}

#[rstest]
fn combined_filter_is_a_conjunction(admin: Actor, technician: Actor) {
    let jobs = listing(&admin, &technician);
    let filter = JobFilter {
        search: Some("job".to_owned()),
        status: "completed".parse().expect("known status"),
        technician: Some("Mike Johnson".to_owned()),
    };
    let combined = ids(&filter.apply(&jobs));

    let by_status = filter_by_status(&jobs, filter.status);
    let owned: Vec<Job> = by_status.into_iter().cloned().collect();
    let by_tech = filter_by_technician(&owned, "Mike Johnson");
    let owned: Vec<Job> = by_tech.into_iter().cloned().collect();
    let reordered = ids(&filter_by_search_term(&owned, "job"));

    assert_eq!(combined, reordered);
    assert_eq!(combined, ["JOB-003", "JOB-005"]);
}

#[rstest]
fn unknown_status_filter_is_rejected() {
    assert!("archived".parse::<StatusFilter>().is_err());
    assert_eq!(" ".parse::<StatusFilter>(), Ok(StatusFilter::All));
}
