//! In-memory subscription plans and companies.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use super::upsert;
use crate::domain::ports::{
    SubscriptionRepository, SubscriptionRepositoryError, SubscriptionSequence,
};
use crate::domain::{Company, CompanyId, PlanId, SubscriptionPlan};

#[derive(Debug, Default)]
struct SubscriptionStore {
    sequences: HashMap<SubscriptionSequence, u64>,
    plans: Vec<SubscriptionPlan>,
    companies: Vec<Company>,
}

/// Plans and companies behind a read/write lock.
#[derive(Debug, Default)]
pub struct InMemorySubscriptionRepository {
    store: RwLock<SubscriptionStore>,
}

impl InMemorySubscriptionRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, SubscriptionStore>, SubscriptionRepositoryError> {
        self.store
            .read()
            .map_err(|_| SubscriptionRepositoryError::query("subscription lock poisoned"))
    }

    fn write(
        &self,
    ) -> Result<RwLockWriteGuard<'_, SubscriptionStore>, SubscriptionRepositoryError> {
        self.store
            .write()
            .map_err(|_| SubscriptionRepositoryError::query("subscription lock poisoned"))
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn next_sequence(
        &self,
        sequence: SubscriptionSequence,
    ) -> Result<u64, SubscriptionRepositoryError> {
        let mut store = self.write()?;
        let counter = store.sequences.entry(sequence).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    async fn list_plans(&self) -> Result<Vec<SubscriptionPlan>, SubscriptionRepositoryError> {
        Ok(self.read()?.plans.clone())
    }

    async fn find_plan(
        &self,
        id: &PlanId,
    ) -> Result<Option<SubscriptionPlan>, SubscriptionRepositoryError> {
        Ok(self.read()?.plans.iter().find(|plan| &plan.id == id).cloned())
    }

    async fn save_plan(&self, plan: &SubscriptionPlan) -> Result<(), SubscriptionRepositoryError> {
        upsert(&mut self.write()?.plans, plan, |p| &p.id);
        Ok(())
    }

    async fn list_companies(&self) -> Result<Vec<Company>, SubscriptionRepositoryError> {
        Ok(self.read()?.companies.clone())
    }

    async fn find_company(
        &self,
        id: &CompanyId,
    ) -> Result<Option<Company>, SubscriptionRepositoryError> {
        Ok(self
            .read()?
            .companies
            .iter()
            .find(|company| &company.id == id)
            .cloned())
    }

    async fn save_company(&self, company: &Company) -> Result<(), SubscriptionRepositoryError> {
        upsert(&mut self.write()?.companies, company, |c| &c.id);
        Ok(())
    }
}
