//! HTTP inbound adapter exposing the REST API under `/api/v1`.
//!
//! Handlers resolve the caller with [`actor::ActorContext`], translate
//! request bodies into driving-port requests, and map domain results into
//! camelCase JSON.

use actix_web::{Scope, error::JsonPayloadError, web};

use crate::domain::Error;

pub mod actor;
pub mod directory;
pub mod error;
pub mod health;
pub mod job_cards;
pub mod jobs;
pub mod products;
pub mod schemas;
pub mod state;
pub mod subscriptions;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;

/// Routes served under `/api/v1`.
pub fn api_scope() -> Scope {
    web::scope("/api/v1")
        .service(jobs::create_job)
        .service(jobs::list_jobs)
        .service(jobs::get_job)
        .service(jobs::update_job)
        .service(jobs::transition_job)
        .service(jobs::review_job)
        .service(jobs::assign_job)
        .service(jobs::get_timeline)
        .service(jobs::add_timeline_entry)
        .service(job_cards::get_job_card)
        .service(job_cards::update_job_card)
        .service(job_cards::add_helper)
        .service(job_cards::remove_helper)
        .service(job_cards::toggle_service_item)
        .service(job_cards::set_working_time)
        .service(job_cards::confirm_working_time)
        .service(job_cards::append_image)
        .service(job_cards::update_instructions)
        .service(directory::list_clients)
        .service(directory::create_client)
        .service(directory::get_client)
        .service(directory::add_property)
        .service(directory::list_technicians)
        .service(directory::register_technician)
        .service(directory::update_technician)
        .service(products::list_products)
        .service(products::catalogue_summary)
        .service(products::create_product)
        .service(products::get_product)
        .service(products::update_product)
        .service(products::delete_product)
        .service(subscriptions::list_plans)
        .service(subscriptions::create_plan)
        .service(subscriptions::set_plan_status)
        .service(subscriptions::list_companies)
        .service(subscriptions::register_company)
        .service(subscriptions::change_company_plan)
        .service(subscriptions::company_usage)
}

/// JSON body extractor rendering malformed payloads as `invalid_request`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = match &err {
            JsonPayloadError::ContentType => "expected an application/json body".to_owned(),
            other => format!("malformed JSON body: {other}"),
        };
        Error::invalid_request(message).into()
    })
}

/// Query string extractor rendering malformed parameters as `invalid_request`.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("malformed query string: {err}")).into()
    })
}

/// Path extractor rendering unparsable segments as `invalid_request`.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("malformed path segment: {err}")).into()
    })
}
