//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{ServerSettings, SettingsError};
pub use state_builders::ServiceSettings;

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use fieldcrew::Trace;
#[cfg(debug_assertions)]
use fieldcrew::doc::ApiDoc;
use fieldcrew::inbound::http::health::{HealthState, live, ready};
use fieldcrew::inbound::http::state::HttpState;
use fieldcrew::inbound::http::{api_scope, json_config, path_config, query_config};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .wrap(Trace)
        .service(api_scope())
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and settings.
///
/// # Parameters
/// - `health_state`: shared readiness state, marked ready by the caller once
///   the listener is bound.
/// - `settings`: validated [`ServerSettings`].
///
/// # Returns
/// A [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails, and rejects
/// inconsistent settings as [`std::io::ErrorKind::InvalidInput`].
pub fn create_server(
    health_state: web::Data<HealthState>,
    settings: &ServerSettings,
) -> std::io::Result<Server> {
    let services = ServiceSettings {
        paging: settings.paging().map_err(invalid_settings)?,
        default_working_hours: settings.working_hours().map_err(invalid_settings)?,
    };
    let http_state = build_http_state(services);

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: health_state.clone(),
            http_state: http_state.clone(),
        })
    })
    .bind(settings.bind_addr())?;

    info!(
        host = %settings.host,
        port = settings.port,
        "listening"
    );
    Ok(server.run())
}

fn invalid_settings(err: SettingsError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, err)
}
