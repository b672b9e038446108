//! Subscription service implementing [`SubscriptionAdmin`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::{info, warn};

use super::ports::{SubscriptionAdmin, SubscriptionRepository, SubscriptionSequence};
use super::service_support::map_subscription_repository_error;
use super::{
    Actor, Company, CompanyDraft, CompanyId, Error, PlanDraft, PlanId, PlanStatus, PlanSummary,
    SubscriptionError, SubscriptionPlan, UsageReport,
};

/// Subscription service.
#[derive(Clone)]
pub struct SubscriptionService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> SubscriptionService<S> {
    /// Create a new service over the subscription repository.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

fn require_super_admin(actor: &Actor) -> Result<(), SubscriptionError> {
    if actor.is_super_admin() {
        Ok(())
    } else {
        Err(SubscriptionError::PermissionDenied(actor.to_string()))
    }
}

impl<S: SubscriptionRepository> SubscriptionService<S> {
    async fn load_plan(&self, id: &PlanId) -> Result<SubscriptionPlan, Error> {
        self.store
            .find_plan(id)
            .await
            .map_err(map_subscription_repository_error)?
            .ok_or_else(|| SubscriptionError::PlanNotFound(id.clone()).into())
    }

    async fn load_company(&self, id: &CompanyId) -> Result<Company, Error> {
        self.store
            .find_company(id)
            .await
            .map_err(map_subscription_repository_error)?
            .ok_or_else(|| SubscriptionError::CompanyNotFound(id.clone()).into())
    }

    async fn next_id(&self, sequence: SubscriptionSequence) -> Result<u64, Error> {
        self.store
            .next_sequence(sequence)
            .await
            .map_err(map_subscription_repository_error)
    }
}

#[async_trait]
impl<S: SubscriptionRepository> SubscriptionAdmin for SubscriptionService<S> {
    async fn list_plans(&self, actor: &Actor) -> Result<Vec<PlanSummary>, Error> {
        require_super_admin(actor)?;
        let plans = self
            .store
            .list_plans()
            .await
            .map_err(map_subscription_repository_error)?;
        let companies = self
            .store
            .list_companies()
            .await
            .map_err(map_subscription_repository_error)?;
        Ok(plans
            .into_iter()
            .map(|plan| PlanSummary::derive(plan, &companies))
            .collect())
    }

    async fn create_plan(
        &self,
        actor: &Actor,
        draft: PlanDraft,
    ) -> Result<SubscriptionPlan, Error> {
        require_super_admin(actor)?;
        let id = PlanId::from_sequence(self.next_id(SubscriptionSequence::Plan).await?);
        let plan = SubscriptionPlan::new(id, draft)?;
        self.store
            .save_plan(&plan)
            .await
            .map_err(map_subscription_repository_error)?;
        info!(plan_id = %plan.id, price = plan.price, "plan created");
        Ok(plan)
    }

    async fn set_plan_status(
        &self,
        actor: &Actor,
        plan_id: &PlanId,
        status: PlanStatus,
    ) -> Result<SubscriptionPlan, Error> {
        require_super_admin(actor)?;
        let mut plan = self.load_plan(plan_id).await?;
        if plan.status == status {
            return Ok(plan);
        }
        plan.status = status;
        self.store
            .save_plan(&plan)
            .await
            .map_err(map_subscription_repository_error)?;
        info!(plan_id = %plan.id, status = ?status, "plan status changed");
        Ok(plan)
    }

    async fn list_companies(
        &self,
        actor: &Actor,
        page: PageRequest,
    ) -> Result<Page<Company>, Error> {
        require_super_admin(actor)?;
        let companies = self
            .store
            .list_companies()
            .await
            .map_err(map_subscription_repository_error)?;
        Ok(Page::slice(companies, page))
    }

    async fn register_company(
        &self,
        actor: &Actor,
        draft: CompanyDraft,
    ) -> Result<Company, Error> {
        require_super_admin(actor)?;
        let plan = self.load_plan(&draft.plan_id).await?;
        let id = CompanyId::from_sequence(self.next_id(SubscriptionSequence::Company).await?);
        let company = Company::new(id, draft, &plan, self.clock.utc().date_naive())?;
        self.store
            .save_company(&company)
            .await
            .map_err(map_subscription_repository_error)?;
        let usage = company.usage(&plan);
        if !usage.warnings.is_empty() {
            warn!(
                company_id = %company.id,
                warnings = usage.warnings.len(),
                "company registered over plan limits"
            );
        }
        info!(company_id = %company.id, plan_id = %plan.id, "company registered");
        Ok(company)
    }

    async fn change_company_plan(
        &self,
        actor: &Actor,
        company_id: &CompanyId,
        plan_id: &PlanId,
    ) -> Result<Company, Error> {
        require_super_admin(actor)?;
        let mut company = self.load_company(company_id).await?;
        let plan = self.load_plan(plan_id).await?;
        company.change_plan(&plan)?;
        self.store
            .save_company(&company)
            .await
            .map_err(map_subscription_repository_error)?;
        info!(company_id = %company.id, plan_id = %plan.id, "company plan changed");
        Ok(company)
    }

    async fn company_usage(
        &self,
        actor: &Actor,
        company_id: &CompanyId,
    ) -> Result<UsageReport, Error> {
        require_super_admin(actor)?;
        let company = self.load_company(company_id).await?;
        let plan = self.load_plan(&company.plan_id).await?;
        Ok(company.usage(&plan))
    }
}

#[cfg(test)]
#[path = "subscription_service_tests.rs"]
mod tests;
