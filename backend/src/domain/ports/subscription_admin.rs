//! Driving port for the super-admin subscription console.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{
    Actor, Company, CompanyDraft, CompanyId, Error, PlanDraft, PlanId, PlanStatus, PlanSummary,
    SubscriptionPlan, UsageReport,
};

/// Plan and company administration. Super-admin only.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionAdmin: Send + Sync {
    /// Plans with subscriber counts and revenue.
    async fn list_plans(&self, actor: &Actor) -> Result<Vec<PlanSummary>, Error>;

    /// Create an active plan.
    async fn create_plan(&self, actor: &Actor, draft: PlanDraft)
    -> Result<SubscriptionPlan, Error>;

    /// Open or withdraw a plan.
    async fn set_plan_status(
        &self,
        actor: &Actor,
        plan_id: &PlanId,
        status: PlanStatus,
    ) -> Result<SubscriptionPlan, Error>;

    /// Page through companies.
    async fn list_companies(&self, actor: &Actor, page: PageRequest)
    -> Result<Page<Company>, Error>;

    /// Register a company on an active plan.
    async fn register_company(&self, actor: &Actor, draft: CompanyDraft)
    -> Result<Company, Error>;

    /// Move a company to another active plan.
    async fn change_company_plan(
        &self,
        actor: &Actor,
        company_id: &CompanyId,
        plan_id: &PlanId,
    ) -> Result<Company, Error>;

    /// Compare a company's usage with its plan limits.
    async fn company_usage(&self, actor: &Actor, company_id: &CompanyId)
    -> Result<UsageReport, Error>;
}
