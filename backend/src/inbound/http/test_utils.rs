//! Test helpers for inbound HTTP components.
//!
//! Handler tests run against the real services over the in-memory stores,
//! seeded with one client, one property and two technicians.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::test::TestRequest;
use actix_web::{App, web};
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{DirectoryCommand, ProductCatalogue, SubscriptionAdmin};
use crate::domain::{
    Actor, CatalogueService, ClientDraft, DirectoryService, JobAllowance, JobCardService,
    JobLifecycleService, PlanDraft, ProductDraft, PropertyDraft, SubscriptionService,
    TechnicianDraft, TechnicianId,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::memory::{
    InMemoryDirectoryRepository, InMemoryJobRepository, InMemoryProductRepository,
    InMemorySubscriptionRepository,
};

/// Clock frozen at 2024-03-14 08:00 UTC.
pub struct FixedClock;

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 14, 8, 0, 0)
            .single()
            .expect("valid fixture timestamp")
    }
}

pub fn admin() -> Actor {
    Actor::admin("Sarah Wilson")
}

pub fn mike() -> Actor {
    Actor::technician(TechnicianId::new("TECH-001"), "Mike Johnson")
}

pub fn operator() -> Actor {
    Actor::super_admin("Platform Ops")
}

/// Attach the actor headers for `actor`.
pub fn as_actor(request: TestRequest, actor: &Actor) -> TestRequest {
    let id = actor
        .technician_id()
        .map_or_else(|| actor.display_name().to_owned(), |id| id.to_string());
    request
        .insert_header(("x-actor-role", actor.role().as_str()))
        .insert_header(("x-actor-id", id))
        .insert_header(("x-actor-name", actor.display_name().to_owned()))
}

/// Wire the services over fresh in-memory stores.
pub fn in_memory_state() -> HttpState {
    let clock: Arc<dyn Clock> = Arc::new(FixedClock);
    let jobs = Arc::new(InMemoryJobRepository::new());
    let directory = Arc::new(InMemoryDirectoryRepository::new());
    let subscriptions = Arc::new(InMemorySubscriptionRepository::new());
    let lifecycle = Arc::new(JobLifecycleService::new(
        jobs.clone(),
        directory.clone(),
        clock.clone(),
    ));
    let directory_service = Arc::new(DirectoryService::new(directory, jobs.clone()));
    HttpState::new(HttpStatePorts {
        jobs: lifecycle.clone(),
        jobs_query: lifecycle,
        job_cards: Arc::new(JobCardService::new(jobs, clock.clone())),
        directory: directory_service.clone(),
        directory_query: directory_service,
        subscriptions: Arc::new(SubscriptionService::new(subscriptions, clock)),
        products: Arc::new(CatalogueService::new(Arc::new(
            InMemoryProductRepository::new(),
        ))),
    })
}

/// In-memory state holding CLIENT-001 Acme Corp with PROP-001, TECH-001 Mike
/// Johnson and TECH-002 Lisa Brown, the PLAN-001 Basic plan and the PRODUCT-001
/// security camera.
pub async fn seeded_state() -> HttpState {
    let state = in_memory_state();
    let client = state
        .directory
        .create_client(
            &admin(),
            ClientDraft {
                name: "Acme Corp".to_owned(),
                contact_person: "John Smith".to_owned(),
                email: "john@acme.com".to_owned(),
                phone: "+1 555-0100".to_owned(),
                main_address: "123 Business Ave".to_owned(),
            },
        )
        .await
        .expect("client created");
    state
        .directory
        .add_property(
            &admin(),
            &client.id,
            PropertyDraft {
                name: "Main Office Building".to_owned(),
                address: "123 Business Ave".to_owned(),
                special_instructions: Some("Check in at reception".to_owned()),
            },
        )
        .await
        .expect("property added");
    for (name, email) in [
        ("Mike Johnson", "mike@fieldcrew.test"),
        ("Lisa Brown", "lisa@fieldcrew.test"),
    ] {
        state
            .directory
            .register_technician(
                &admin(),
                TechnicianDraft {
                    name: name.to_owned(),
                    email: email.to_owned(),
                    phone: String::new(),
                    role: "Technician".to_owned(),
                    can_create_jobs: false,
                },
            )
            .await
            .expect("technician registered");
    }
    state
        .subscriptions
        .create_plan(
            &operator(),
            PlanDraft {
                name: "Basic".to_owned(),
                price: 29,
                max_technicians: 3,
                max_jobs: JobAllowance::Limited(100),
                features: vec!["Job scheduling".to_owned()],
                restrictions: Vec::new(),
            },
        )
        .await
        .expect("plan created");
    state
        .products
        .create_product(
            &admin(),
            ProductDraft {
                name: "Security Camera".to_owned(),
                brand: "Hikvision".to_owned(),
                price_cents: 29_999,
                stock_quantity: 45,
                description: "IP camera with night vision".to_owned(),
                image: None,
            },
        )
        .await
        .expect("product created");
    state
}

/// App exposing every `/api/v1` handler over `state`.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(super::json_config())
        .app_data(super::query_config())
        .app_data(super::path_config())
        .service(super::api_scope())
}
