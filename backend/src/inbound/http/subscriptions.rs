//! Super-admin subscription console.
//!
//! ```text
//! GET  /api/v1/plans
//! POST /api/v1/plans
//! PUT  /api/v1/plans/{id}/status
//! GET  /api/v1/companies?page&pageSize
//! POST /api/v1/companies
//! PUT  /api/v1/companies/{id}/plan
//! GET  /api/v1/companies/{id}/usage
//! ```

use actix_web::{HttpRequest, HttpResponse, get, post, put, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Company, CompanyDraft, CompanyId, CompanyStatus, Error, JobAllowance, PlanDraft, PlanId,
    PlanStatus, PlanSummary, SubscriptionPlan, UsageLimit, UsageReport, UsageWarning,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::actor::ActorContext;
use crate::inbound::http::schemas::{CompanyPageSchema, ErrorSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, page_request, parse_id, parse_named};

/// Subscription plan payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanBody {
    #[schema(value_type = String, example = "PLAN-001")]
    pub id: PlanId,
    #[schema(example = "Basic")]
    pub name: String,
    /// Monthly price in whole currency units.
    pub price: u32,
    pub max_technicians: u32,
    /// Monthly job allowance; `-1` means unlimited.
    #[schema(example = 100)]
    pub max_jobs: i64,
    pub features: Vec<String>,
    pub restrictions: Vec<String>,
    #[schema(value_type = String, example = "active")]
    pub status: PlanStatus,
    /// Companies on the plan. Listing only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribers: Option<u32>,
    /// Subscribers times price. Listing only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_revenue: Option<u64>,
}

impl From<&SubscriptionPlan> for PlanBody {
    fn from(plan: &SubscriptionPlan) -> Self {
        Self {
            id: plan.id.clone(),
            name: plan.name.clone(),
            price: plan.price,
            max_technicians: plan.max_technicians,
            max_jobs: plan.max_jobs.into(),
            features: plan.features.clone(),
            restrictions: plan.restrictions.clone(),
            status: plan.status,
            subscribers: None,
            monthly_revenue: None,
        }
    }
}

impl From<&PlanSummary> for PlanBody {
    fn from(summary: &PlanSummary) -> Self {
        Self {
            subscribers: Some(summary.subscribers),
            monthly_revenue: Some(summary.monthly_revenue),
            ..Self::from(&summary.plan)
        }
    }
}

/// Subscribing company payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyBody {
    #[schema(value_type = String, example = "COMP-001")]
    pub id: CompanyId,
    #[schema(example = "TechCorp Solutions")]
    pub name: String,
    pub email: String,
    pub phone: String,
    #[schema(value_type = String, example = "PLAN-002")]
    pub plan_id: PlanId,
    #[schema(value_type = String, example = "active")]
    pub status: CompanyStatus,
    pub technicians: u32,
    pub jobs_this_month: u32,
    pub join_date: NaiveDate,
}

impl From<&Company> for CompanyBody {
    fn from(company: &Company) -> Self {
        Self {
            id: company.id.clone(),
            name: company.name.clone(),
            email: company.email.clone(),
            phone: company.phone.clone(),
            plan_id: company.plan_id.clone(),
            status: company.status,
            technicians: company.technicians,
            jobs_this_month: company.jobs_this_month,
            join_date: company.join_date,
        }
    }
}

/// A limit the company is over.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UsageWarningBody {
    #[schema(value_type = String, example = "technicians")]
    pub limit: UsageLimit,
    pub used: u32,
    pub allowed: i64,
}

impl From<&UsageWarning> for UsageWarningBody {
    fn from(value: &UsageWarning) -> Self {
        Self {
            limit: value.limit,
            used: value.used,
            allowed: value.allowed,
        }
    }
}

/// Usage compared with plan limits.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UsageReportBody {
    #[schema(value_type = String, example = "COMP-001")]
    pub company_id: CompanyId,
    #[schema(value_type = String, example = "PLAN-001")]
    pub plan_id: PlanId,
    pub technicians: u32,
    pub max_technicians: u32,
    pub jobs_this_month: u32,
    pub max_jobs: i64,
    pub warnings: Vec<UsageWarningBody>,
}

impl From<&UsageReport> for UsageReportBody {
    fn from(report: &UsageReport) -> Self {
        Self {
            company_id: report.company_id.clone(),
            plan_id: report.plan_id.clone(),
            technicians: report.technicians,
            max_technicians: report.max_technicians,
            jobs_this_month: report.jobs_this_month,
            max_jobs: report.max_jobs.into(),
            warnings: report.warnings.iter().map(UsageWarningBody::from).collect(),
        }
    }
}

/// New plan.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequestBody {
    pub name: String,
    pub price: u32,
    pub max_technicians: u32,
    /// `-1` for unlimited.
    pub max_jobs: i64,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub restrictions: Vec<String>,
}

/// Plan availability change.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct PlanStatusRequestBody {
    /// `active` or `inactive`.
    #[schema(example = "inactive")]
    pub status: String,
}

/// New company.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRequestBody {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub plan_id: String,
    #[serde(default)]
    pub technicians: u32,
    #[serde(default)]
    pub jobs_this_month: u32,
}

/// Target plan for a company.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyPlanRequestBody {
    pub plan_id: String,
}

/// Company list parameters.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct CompanyListQuery {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

fn parse_plan_id(raw: &str, field: FieldName) -> Result<PlanId, Error> {
    parse_id(raw, field, PlanId::parse)
}

fn parse_company_id(raw: &str) -> Result<CompanyId, Error> {
    parse_id(raw, FieldName::new("id"), CompanyId::parse)
}

fn parse_allowance(raw: i64) -> Result<JobAllowance, Error> {
    JobAllowance::try_from(raw).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(serde_json::json!({
            "field": "maxJobs",
            "value": raw,
            "code": "invalid_value",
        }))
    })
}

/// Plans with subscriber counts and monthly revenue.
#[utoipa::path(
    get,
    path = "/api/v1/plans",
    responses(
        (status = 200, description = "Every plan", body = [PlanBody]),
        (status = 403, description = "Super admins only", body = ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "listPlans",
    security(("ActorHeaders" = []))
)]
#[get("/plans")]
pub async fn list_plans(
    state: web::Data<HttpState>,
    actor: ActorContext,
) -> ApiResult<web::Json<Vec<PlanBody>>> {
    let plans = state.subscriptions.list_plans(actor.actor()).await?;
    Ok(web::Json(plans.iter().map(PlanBody::from).collect()))
}

/// Create an active plan.
#[utoipa::path(
    post,
    path = "/api/v1/plans",
    request_body = PlanRequestBody,
    responses(
        (status = 201, description = "Plan created", body = PlanBody),
        (status = 400, description = "Invalid plan", body = ErrorSchema),
        (status = 403, description = "Super admins only", body = ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "createPlan",
    security(("ActorHeaders" = []))
)]
#[post("/plans")]
pub async fn create_plan(
    state: web::Data<HttpState>,
    actor: ActorContext,
    payload: web::Json<PlanRequestBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let draft = PlanDraft {
        name: body.name,
        price: body.price,
        max_technicians: body.max_technicians,
        max_jobs: parse_allowance(body.max_jobs)?,
        features: body.features,
        restrictions: body.restrictions,
    };
    let plan = state.subscriptions.create_plan(actor.actor(), draft).await?;
    Ok(HttpResponse::Created().json(PlanBody::from(&plan)))
}

/// Open or withdraw a plan.
#[utoipa::path(
    put,
    path = "/api/v1/plans/{id}/status",
    params(("id" = String, Path, description = "Plan id")),
    request_body = PlanStatusRequestBody,
    responses(
        (status = 200, description = "Updated plan", body = PlanBody),
        (status = 400, description = "Unknown status", body = ErrorSchema),
        (status = 403, description = "Super admins only", body = ErrorSchema),
        (status = 404, description = "Unknown plan", body = ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "setPlanStatus",
    security(("ActorHeaders" = []))
)]
#[put("/plans/{id}/status")]
pub async fn set_plan_status(
    state: web::Data<HttpState>,
    actor: ActorContext,
    path: web::Path<String>,
    payload: web::Json<PlanStatusRequestBody>,
) -> ApiResult<web::Json<PlanBody>> {
    let plan_id = parse_plan_id(&path, FieldName::new("id"))?;
    let status: PlanStatus = parse_named(&payload.status, FieldName::new("status"))?;
    let plan = state
        .subscriptions
        .set_plan_status(actor.actor(), &plan_id, status)
        .await?;
    Ok(web::Json(PlanBody::from(&plan)))
}

/// Page through subscribing companies.
#[utoipa::path(
    get,
    path = "/api/v1/companies",
    params(CompanyListQuery),
    responses(
        (status = 200, description = "One page of companies", body = CompanyPageSchema),
        (status = 400, description = "Invalid paging", body = ErrorSchema),
        (status = 403, description = "Super admins only", body = ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "listCompanies",
    security(("ActorHeaders" = []))
)]
#[get("/companies")]
pub async fn list_companies(
    state: web::Data<HttpState>,
    actor: ActorContext,
    req: HttpRequest,
    query: web::Query<CompanyListQuery>,
) -> ApiResult<HttpResponse> {
    let page = page_request(query.page, query.page_size, state.paging)?;
    let companies = state
        .subscriptions
        .list_companies(actor.actor(), page)
        .await?;
    let envelope = companies
        .map(|company| CompanyBody::from(&company))
        .into_envelope(&req.full_url());
    Ok(HttpResponse::Ok().json(envelope))
}

/// Register a company on an active plan.
#[utoipa::path(
    post,
    path = "/api/v1/companies",
    request_body = CompanyRequestBody,
    responses(
        (status = 201, description = "Company registered", body = CompanyBody),
        (status = 400, description = "Invalid company", body = ErrorSchema),
        (status = 403, description = "Super admins only", body = ErrorSchema),
        (status = 404, description = "Unknown plan", body = ErrorSchema),
        (status = 409, description = "Plan not taking subscribers", body = ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "registerCompany",
    security(("ActorHeaders" = []))
)]
#[post("/companies")]
pub async fn register_company(
    state: web::Data<HttpState>,
    actor: ActorContext,
    payload: web::Json<CompanyRequestBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let draft = CompanyDraft {
        plan_id: parse_plan_id(&body.plan_id, FieldName::new("planId"))?,
        name: body.name,
        email: body.email,
        phone: body.phone,
        technicians: body.technicians,
        jobs_this_month: body.jobs_this_month,
    };
    let company = state
        .subscriptions
        .register_company(actor.actor(), draft)
        .await?;
    Ok(HttpResponse::Created().json(CompanyBody::from(&company)))
}

/// Move a company to another active plan.
#[utoipa::path(
    put,
    path = "/api/v1/companies/{id}/plan",
    params(("id" = String, Path, description = "Company id")),
    request_body = CompanyPlanRequestBody,
    responses(
        (status = 200, description = "Updated company", body = CompanyBody),
        (status = 403, description = "Super admins only", body = ErrorSchema),
        (status = 404, description = "Unknown company or plan", body = ErrorSchema),
        (status = 409, description = "Plan not taking subscribers", body = ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "changeCompanyPlan",
    security(("ActorHeaders" = []))
)]
#[put("/companies/{id}/plan")]
pub async fn change_company_plan(
    state: web::Data<HttpState>,
    actor: ActorContext,
    path: web::Path<String>,
    payload: web::Json<CompanyPlanRequestBody>,
) -> ApiResult<web::Json<CompanyBody>> {
    let company_id = parse_company_id(&path)?;
    let plan_id = parse_plan_id(&payload.plan_id, FieldName::new("planId"))?;
    let company = state
        .subscriptions
        .change_company_plan(actor.actor(), &company_id, &plan_id)
        .await?;
    Ok(web::Json(CompanyBody::from(&company)))
}

/// Compare a company's usage with its plan limits.
#[utoipa::path(
    get,
    path = "/api/v1/companies/{id}/usage",
    params(("id" = String, Path, description = "Company id")),
    responses(
        (status = 200, description = "Usage report", body = UsageReportBody),
        (status = 403, description = "Super admins only", body = ErrorSchema),
        (status = 404, description = "Unknown company", body = ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "companyUsage",
    security(("ActorHeaders" = []))
)]
#[get("/companies/{id}/usage")]
pub async fn company_usage(
    state: web::Data<HttpState>,
    actor: ActorContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<UsageReportBody>> {
    let company_id = parse_company_id(&path)?;
    let report = state
        .subscriptions
        .company_usage(actor.actor(), &company_id)
        .await?;
    Ok(web::Json(UsageReportBody::from(&report)))
}

#[cfg(test)]
mod tests {
    //! Subscription console tests over the seeded in-memory stores.

    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use serde_json::{Value, json};

    use crate::inbound::http::test_utils::{admin, as_actor, operator, seeded_state, test_app};

    fn company(plan_id: &str, technicians: u32) -> Value {
        json!({
            "name": "TechCorp Solutions",
            "email": "admin@techcorp.com",
            "planId": plan_id,
            "technicians": technicians,
            "jobsThisMonth": 12
        })
    }

    #[actix_web::test]
    async fn company_admins_are_turned_away() {
        let app = test::init_service(test_app(seeded_state().await)).await;

        let req = as_actor(TestRequest::get().uri("/api/v1/plans"), &admin()).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn plan_listing_reports_revenue() {
        let app = test::init_service(test_app(seeded_state().await)).await;
        for _ in 0..2 {
            let req = as_actor(TestRequest::post().uri("/api/v1/companies"), &operator())
                .set_json(company("PLAN-001", 2))
                .to_request();
            assert_eq!(
                test::call_service(&app, req).await.status(),
                StatusCode::CREATED
            );
        }

        let req = as_actor(TestRequest::get().uri("/api/v1/plans"), &operator()).to_request();
        let plans: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0]["subscribers"], 2);
        assert_eq!(plans[0]["monthlyRevenue"], 58);
        assert_eq!(plans[0]["maxJobs"], 100);
    }

    #[actix_web::test]
    async fn unlimited_plans_round_trip_as_minus_one() {
        let app = test::init_service(test_app(seeded_state().await)).await;

        let req = as_actor(TestRequest::post().uri("/api/v1/plans"), &operator())
            .set_json(json!({
                "name": "Enterprise",
                "price": 199,
                "maxTechnicians": 50,
                "maxJobs": -1,
                "features": ["Priority support"]
            }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let plan: Value = test::read_body_json(res).await;
        assert_eq!(plan["id"], "PLAN-002");
        assert_eq!(plan["maxJobs"], -1);
        assert_eq!(plan["status"], "active");
        assert!(plan.get("subscribers").is_none());

        let req = as_actor(TestRequest::post().uri("/api/v1/plans"), &operator())
            .set_json(json!({
                "name": "Broken",
                "price": 1,
                "maxTechnicians": 1,
                "maxJobs": -5
            }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn withdrawn_plans_take_no_new_companies() {
        let app = test::init_service(test_app(seeded_state().await)).await;

        let req = as_actor(TestRequest::put().uri("/api/v1/plans/PLAN-001/status"), &operator())
            .set_json(json!({ "status": "inactive" }))
            .to_request();
        let plan: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(plan["status"], "inactive");

        let req = as_actor(TestRequest::post().uri("/api/v1/companies"), &operator())
            .set_json(company("PLAN-001", 1))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn usage_warns_without_blocking() {
        let app = test::init_service(test_app(seeded_state().await)).await;
        let req = as_actor(TestRequest::post().uri("/api/v1/companies"), &operator())
            .set_json(company("PLAN-001", 5))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(created["id"], "COMP-001");
        assert_eq!(created["joinDate"], "2024-03-14");

        let req = as_actor(
            TestRequest::get().uri("/api/v1/companies/COMP-001/usage"),
            &operator(),
        )
        .to_request();
        let report: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(report["maxTechnicians"], 3);
        assert_eq!(report["warnings"][0]["limit"], "technicians");
        assert_eq!(report["warnings"][0]["used"], 5);
        assert_eq!(report["warnings"][0]["allowed"], 3);

        let req = as_actor(TestRequest::get().uri("/api/v1/companies?pageSize=1"), &operator())
            .to_request();
        let page: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(page["total"], 1);
        assert_eq!(page["data"][0]["technicians"], 5);
    }

    #[actix_web::test]
    async fn moving_to_an_unknown_plan_is_not_found() {
        let app = test::init_service(test_app(seeded_state().await)).await;
        let req = as_actor(TestRequest::post().uri("/api/v1/companies"), &operator())
            .set_json(company("PLAN-001", 1))
            .to_request();
        test::call_service(&app, req).await;

        let req = as_actor(
            TestRequest::put().uri("/api/v1/companies/COMP-001/plan"),
            &operator(),
        )
        .set_json(json!({ "planId": "PLAN-404" }))
        .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
