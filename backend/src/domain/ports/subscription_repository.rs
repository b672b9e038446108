//! Driven port for subscription plans and companies.

use async_trait::async_trait;

use crate::domain::{Company, CompanyId, PlanId, SubscriptionPlan};

use super::define_port_error;

define_port_error! {
    /// Errors raised by subscription repository adapters.
    pub enum SubscriptionRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "subscription repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "subscription repository query failed: {message}",
    }
}

/// Sequence used when issuing subscription identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionSequence {
    /// `PLAN-NNN`.
    Plan,
    /// `COMP-NNN`.
    Company,
}

/// Storage for plans and companies. Lists keep insertion order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Reserve the next number in `sequence`.
    async fn next_sequence(
        &self,
        sequence: SubscriptionSequence,
    ) -> Result<u64, SubscriptionRepositoryError>;

    /// All plans.
    async fn list_plans(&self) -> Result<Vec<SubscriptionPlan>, SubscriptionRepositoryError>;

    /// Fetch a plan.
    async fn find_plan(
        &self,
        id: &PlanId,
    ) -> Result<Option<SubscriptionPlan>, SubscriptionRepositoryError>;

    /// Insert or replace a plan.
    async fn save_plan(&self, plan: &SubscriptionPlan) -> Result<(), SubscriptionRepositoryError>;

    /// All companies.
    async fn list_companies(&self) -> Result<Vec<Company>, SubscriptionRepositoryError>;

    /// Fetch a company.
    async fn find_company(
        &self,
        id: &CompanyId,
    ) -> Result<Option<Company>, SubscriptionRepositoryError>;

    /// Insert or replace a company.
    async fn save_company(&self, company: &Company) -> Result<(), SubscriptionRepositoryError>;
}
