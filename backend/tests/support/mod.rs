//! Shared helpers for the vault integration suites.

#![allow(dead_code, reason = "each suite uses a different subset of helpers")]

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header;
use actix_web::{App, test, web};

use vault::inbound::http::configure;
use vault::inbound::http::session_config::SESSION_COOKIE_NAME;
use vault::inbound::http::state::HttpState;
use vault::inbound::http::test_utils::test_session_middleware;
use vault::middleware::{Recover, Trace};

/// Response type produced by [`vault_app`].
pub type VaultResponse = ServiceResponse<BoxBody>;

/// PNG signature followed by the start of an IHDR chunk.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR\x00\x00\x00\x01";

const BOUNDARY: &str = "vault-integration-boundary";

/// Environment variable naming a disposable PostgreSQL database.
pub const TEST_DATABASE_URL_ENV: &str = "VAULT_TEST_DATABASE_URL";

/// Initialise the full vault app the way the server does, with a test
/// session key.
pub async fn vault_app(
    state: HttpState,
) -> impl Service<Request, Response = VaultResponse, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .wrap(test_session_middleware())
            .wrap(Recover)
            .wrap(Trace)
            .configure(configure),
    )
    .await
}

/// Browser-like client that replays the latest session cookie.
#[derive(Default)]
pub struct Browser {
    session: Option<Cookie<'static>>,
}

impl Browser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Send `request`, attaching and then updating the session cookie.
    pub async fn send<S>(&mut self, app: &S, request: test::TestRequest) -> VaultResponse
    where
        S: Service<Request, Response = VaultResponse, Error = actix_web::Error>,
    {
        let request = match &self.session {
            Some(cookie) => request.cookie(cookie.clone()),
            None => request,
        };
        let response = test::call_service(app, request.to_request()).await;
        if let Some(cookie) = response
            .response()
            .cookies()
            .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        {
            self.session = if cookie.value().is_empty() {
                None
            } else {
                Some(cookie.into_owned())
            };
        }
        response
    }

    pub async fn register<S>(&mut self, app: &S, username: &str, password: &str) -> VaultResponse
    where
        S: Service<Request, Response = VaultResponse, Error = actix_web::Error>,
    {
        self.send(
            app,
            test::TestRequest::post().uri("/register").set_form([
                ("username", username),
                ("password", password),
                ("confirm_password", password),
            ]),
        )
        .await
    }

    pub async fn login<S>(&mut self, app: &S, username: &str, password: &str) -> VaultResponse
    where
        S: Service<Request, Response = VaultResponse, Error = actix_web::Error>,
    {
        self.send(
            app,
            test::TestRequest::post()
                .uri("/login")
                .set_form([("username", username), ("password", password)]),
        )
        .await
    }

    pub async fn upload<S>(&mut self, app: &S, filename: &str, bytes: &[u8]) -> VaultResponse
    where
        S: Service<Request, Response = VaultResponse, Error = actix_web::Error>,
    {
        let (content_type, body) = multipart_file(filename, bytes);
        self.send(
            app,
            test::TestRequest::post()
                .uri("/upload-file")
                .insert_header((header::CONTENT_TYPE, content_type))
                .set_payload(body),
        )
        .await
    }
}

/// Build a `multipart/form-data` body with a single `file` field.
pub fn multipart_file(filename: &str, bytes: &[u8]) -> (String, Vec<u8>) {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
         filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

pub fn location(response: &VaultResponse) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

pub async fn body_text(response: VaultResponse) -> String {
    String::from_utf8(test::read_body(response).await.to_vec()).expect("utf8 body")
}

/// Return the disposable database URL, or `None` with a skip marker when
/// it is unset.
pub fn test_database_url() -> Option<String> {
    match std::env::var(TEST_DATABASE_URL_ENV) {
        Ok(url) if !url.trim().is_empty() => Some(url),
        _ => {
            eprintln!("SKIP-TEST-DATABASE: {TEST_DATABASE_URL_ENV} is not set");
            None
        }
    }
}
