//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::DefaultClock;

use travel_auth::Trace;
#[cfg(debug_assertions)]
use travel_auth::doc::ApiDoc;
use travel_auth::domain::AccessGate;
use travel_auth::inbound::http::access::RequireSession;
use travel_auth::inbound::http::accounts::{reset_password, signup};
use travel_auth::inbound::http::federated::{google_callback, google_login};
use travel_auth::inbound::http::health::{HealthState, live, ready};
use travel_auth::inbound::http::session_config::SessionSettings;
use travel_auth::inbound::http::state::HttpState;
use travel_auth::inbound::http::users::{current_user, login, logout};
use travel_auth::outbound::memory::InMemorySessionStore;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    session: SessionSettings,
    session_store: InMemorySessionStore,
    login_path: String,
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
        session,
        session_store,
        login_path,
    } = deps;

    let gate = AccessGate::new(Arc::clone(&http_state.sessions));
    let me = web::resource("/me")
        .wrap(RequireSession::new(gate, &login_path))
        .route(web::get().to(current_user));

    let api = web::scope("/api/v1")
        .service(signup)
        .service(reset_password)
        .service(login)
        .service(logout)
        .service(me);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(session.middleware(session_store))
        .wrap(Trace)
        .service(ready)
        .service(live)
        .service(google_login)
        .service(google_callback)
        .service(api);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when the identity provider client cannot be
/// built or binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(build_http_state(&config)?);
    let ServerConfig {
        session,
        bind_addr,
        login_path,
        ..
    } = config;

    // One store shared by every worker so a session is valid on all of them.
    let session_store = InMemorySessionStore::new(Arc::new(DefaultClock));
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            session: session.clone(),
            session_store: session_store.clone(),
            login_path: login_path.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
