//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::body::BoxBody;
use actix_web::{App, HttpServer, web};
use tracing::info;

use vault::domain::AdminBootstrap;
use vault::inbound::http::configure;
use vault::inbound::http::state::HttpState;
use vault::middleware::{Recover, Trace};

fn build_app(
    http_state: web::Data<HttpState>,
    session: SessionMiddleware<CookieSessionStore>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<BoxBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(http_state)
        .wrap(session)
        .wrap(Recover)
        .wrap(Trace)
        .configure(configure)
}

/// Build the services, bootstrap the administrator, and bind the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when the admin bootstrap fails or the socket
/// cannot be bound.
pub async fn create_server(config: ServerConfig, admin_password: &str) -> std::io::Result<Server> {
    let (accounts, http_state) = build_http_state(&config);
    match accounts
        .ensure_admin(admin_password)
        .await
        .map_err(|err| std::io::Error::other(format!("admin bootstrap failed: {err}")))?
    {
        AdminBootstrap::Created(user_id) => info!(%user_id, "administrator account created"),
        AdminBootstrap::AlreadyPresent => info!("administrator account present"),
    }

    let http_state = web::Data::new(http_state);
    let ServerConfig {
        session,
        bind_addr,
        ..
    } = config;

    let server = HttpServer::new(move || build_app(http_state.clone(), session.middleware()))
        .bind(bind_addr)?
        .run();
    info!(%bind_addr, "vault listening");
    Ok(server)
}
