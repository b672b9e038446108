use rstest::{fixture, rstest};

use super::*;
use crate::domain::ErrorCode;

fn join_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).expect("valid date")
}

#[fixture]
fn professional() -> SubscriptionPlan {
    SubscriptionPlan::new(
        PlanId::new("PLAN-002"),
        PlanDraft {
            name: "Professional".to_owned(),
            price: 59,
            max_technicians: 10,
            max_jobs: JobAllowance::Limited(500),
            features: vec!["GPS Tracking".to_owned(), " ".to_owned()],
            restrictions: vec!["No API Access".to_owned()],
        },
    )
    .expect("valid plan")
}

fn company(plan: &SubscriptionPlan, technicians: u32, jobs: u32) -> Company {
    Company::new(
        CompanyId::new("COMP-001"),
        CompanyDraft {
            name: "TechCorp Solutions".to_owned(),
            email: "admin@techcorp.com".to_owned(),
            phone: "+1 234-567-8900".to_owned(),
            plan_id: plan.id.clone(),
            technicians,
            jobs_this_month: jobs,
        },
        plan,
        join_date(),
    )
    .expect("valid company")
}

#[rstest]
fn blank_features_are_dropped(professional: SubscriptionPlan) {
    assert_eq!(professional.features, ["GPS Tracking"]);
    assert_eq!(professional.status, PlanStatus::Active);
}

#[rstest]
#[case(-1, JobAllowance::Unlimited)]
#[case(0, JobAllowance::Limited(0))]
#[case(500, JobAllowance::Limited(500))]
fn job_allowance_reads_sentinel(#[case] raw: i64, #[case] expected: JobAllowance) {
    assert_eq!(JobAllowance::try_from(raw), Ok(expected));
    assert_eq!(i64::from(expected), raw);
}

#[rstest]
fn job_allowance_rejects_other_negatives() {
    assert!(JobAllowance::try_from(-2).is_err());
    assert!(serde_json::from_value::<JobAllowance>(serde_json::json!(-5)).is_err());
}

#[rstest]
fn within_limits_has_no_warnings(professional: SubscriptionPlan) {
    let report = company(&professional, 8, 45).usage(&professional);
    assert!(report.warnings.is_empty());
}

#[rstest]
fn exceeding_limits_warns_without_rejecting(professional: SubscriptionPlan) {
    let report = company(&professional, 12, 501).usage(&professional);
    let limits: Vec<_> = report.warnings.iter().map(|w| w.limit).collect();
    assert_eq!(limits, [UsageLimit::Technicians, UsageLimit::JobsPerMonth]);
    assert_eq!(report.warnings[0].allowed, 10);
}

#[rstest]
fn unlimited_jobs_never_warn(mut professional: SubscriptionPlan) {
    professional.max_jobs = JobAllowance::Unlimited;
    let report = company(&professional, 1, u32::MAX).usage(&professional);
    assert!(report.warnings.is_empty());
}

#[rstest]
fn inactive_plans_cannot_be_chosen(professional: SubscriptionPlan) {
    let mut retired = professional.clone();
    retired.id = PlanId::new("PLAN-004");
    retired.status = PlanStatus::Inactive;

    let mut subscriber = company(&professional, 2, 3);
    let err = subscriber.change_plan(&retired).expect_err("inactive");
    assert_eq!(err, SubscriptionError::PlanInactive(PlanId::new("PLAN-004")));
    assert_eq!(subscriber.plan_id, professional.id);
    assert_eq!(crate::domain::Error::from(err).code(), ErrorCode::Conflict);
}

#[rstest]
fn summary_derives_revenue(professional: SubscriptionPlan) {
    let companies = vec![company(&professional, 1, 1), company(&professional, 2, 2)];
    let summary = PlanSummary::derive(professional, &companies);
    assert_eq!(summary.subscribers, 2);
    assert_eq!(summary.monthly_revenue, 118);
    let value = serde_json::to_value(&summary).expect("serialise");
    assert_eq!(value["maxJobs"], 500);
    assert_eq!(value["monthlyRevenue"], 118);
}
