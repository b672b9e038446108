//! Builders wiring the in-memory stores and domain services into HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use fieldcrew::domain::{
    CatalogueService, DirectoryService, JobCardService, JobLifecycleService, SubscriptionService,
};
use fieldcrew::inbound::http::state::{HttpState, HttpStatePorts, PagingSettings};
use fieldcrew::outbound::memory::{
    InMemoryDirectoryRepository, InMemoryJobRepository, InMemoryProductRepository,
    InMemorySubscriptionRepository,
};

/// Service tuning applied when wiring the ports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceSettings {
    /// List page sizes.
    pub paging: PagingSettings,
    /// Fallback job card hours for jobs without an estimate.
    pub default_working_hours: f64,
}

/// Wire every driving port over fresh process-local stores.
pub fn build_http_state(settings: ServiceSettings) -> web::Data<HttpState> {
    build_http_state_with_clock(settings, Arc::new(DefaultClock))
}

fn build_http_state_with_clock(
    settings: ServiceSettings,
    clock: Arc<dyn Clock>,
) -> web::Data<HttpState> {
    let jobs = Arc::new(InMemoryJobRepository::new());
    let directory = Arc::new(InMemoryDirectoryRepository::new());
    let subscriptions = Arc::new(InMemorySubscriptionRepository::new());
    let products = Arc::new(InMemoryProductRepository::new());

    let lifecycle = Arc::new(
        JobLifecycleService::new(jobs.clone(), directory.clone(), clock.clone())
            .with_default_working_hours(settings.default_working_hours),
    );
    let directory_service = Arc::new(DirectoryService::new(directory, jobs.clone()));

    web::Data::new(HttpState::with_paging(
        HttpStatePorts {
            jobs: lifecycle.clone(),
            jobs_query: lifecycle,
            job_cards: Arc::new(JobCardService::new(jobs, clock.clone())),
            directory: directory_service.clone(),
            directory_query: directory_service,
            subscriptions: Arc::new(SubscriptionService::new(subscriptions, clock)),
            products: Arc::new(CatalogueService::new(products)),
        },
        settings.paging,
    ))
}
