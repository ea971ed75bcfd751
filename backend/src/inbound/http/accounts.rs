//! Account lifecycle handlers.
//!
//! ```text
//! GET  /                home page
//! GET  /register        registration form
//! POST /register        username=alice&password=pw1&confirm_password=pw1
//! GET  /login           login form
//! POST /login           username=alice&password=pw1
//! POST /logout
//! GET  /delete-account  confirmation form
//! POST /delete-account  (also DELETE)
//! GET  /goodbye
//! ```
//!
//! These flows answer with HTML pages rather than JSON error bodies.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, get, post, route, web};
use serde::Deserialize;
use tracing::info;

use crate::domain::{
    CredentialsValidationError, ErrorCode, LoginCredentials, RegistrationRequest,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::pages::{self, message_page, see_other};
use crate::inbound::http::session::{CurrentUser, SessionContext};
use crate::inbound::http::state::HttpState;

/// Form body for `POST /register`.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    /// Requested username.
    pub username: String,
    /// Chosen password.
    pub password: String,
    /// Must repeat `password`.
    pub confirm_password: String,
}

/// Form body for `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Account username.
    pub username: String,
    /// Account password.
    pub password: String,
}

fn validation_message(err: &CredentialsValidationError) -> String {
    match err {
        CredentialsValidationError::EmptyUsername => "Username must not be empty.".to_owned(),
        CredentialsValidationError::EmptyPassword => "Password must not be empty.".to_owned(),
        CredentialsValidationError::InvalidUsername(inner) => format!("Invalid username: {inner}."),
    }
}

/// Public landing page.
#[get("/")]
pub async fn home() -> HttpResponse {
    pages::home()
}

/// Registration form.
#[get("/register")]
pub async fn register_page() -> HttpResponse {
    pages::register_form()
}

/// Create a standard account.
///
/// Answers `200` on success, `409` when the username is taken, and `400`
/// for mismatched passwords or invalid input.
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    form: web::Form<RegisterForm>,
) -> ApiResult<HttpResponse> {
    const HEADING: &str = "Registration";
    let retry = ("/register", "Try again");

    let request = match RegistrationRequest::try_from_parts(
        &form.username,
        &form.password,
        &form.confirm_password,
    ) {
        Ok(request) => request,
        Err(err) => {
            return Ok(message_page(
                StatusCode::BAD_REQUEST,
                HEADING,
                &validation_message(&err),
                retry,
            ));
        }
    };

    match state.accounts.register(&request).await {
        Ok(_) => Ok(message_page(
            StatusCode::OK,
            HEADING,
            "Your account has been created.",
            ("/login", "Log in"),
        )),
        Err(err) if err.code() == ErrorCode::Conflict => Ok(message_page(
            StatusCode::CONFLICT,
            HEADING,
            "That username is already taken.",
            retry,
        )),
        Err(err) if err.code() == ErrorCode::InvalidRequest => Ok(message_page(
            StatusCode::BAD_REQUEST,
            HEADING,
            "The passwords do not match.",
            retry,
        )),
        Err(err) => Err(err),
    }
}

/// Login form.
#[get("/login")]
pub async fn login_page() -> HttpResponse {
    pages::login_form()
}

/// Authenticate and start a session, then redirect to `/welcome`.
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<LoginForm>,
) -> ApiResult<HttpResponse> {
    const HEADING: &str = "Log in";
    let retry = ("/login", "Try again");

    let credentials = match LoginCredentials::try_from_parts(&form.username, &form.password) {
        Ok(credentials) => credentials,
        Err(err) => {
            return Ok(message_page(
                StatusCode::BAD_REQUEST,
                HEADING,
                &validation_message(&err),
                retry,
            ));
        }
    };

    match state.accounts.authenticate(&credentials).await {
        Ok(user) => {
            session.persist_user(&user)?;
            info!(user_id = %user.user_id, "user logged in");
            Ok(see_other("/welcome"))
        }
        Err(err) if err.code() == ErrorCode::Unauthorized => Ok(message_page(
            StatusCode::UNAUTHORIZED,
            HEADING,
            "User not found or wrong password.",
            retry,
        )),
        Err(err) => Err(err),
    }
}

/// End the session and return home.
#[post("/logout")]
pub async fn logout(CurrentUser(user): CurrentUser, session: SessionContext) -> HttpResponse {
    session.destroy();
    info!(user_id = %user.user_id, "user logged out");
    see_other("/")
}

/// Confirmation page for deleting the signed-in account.
#[get("/delete-account")]
pub async fn delete_account_page(_user: CurrentUser) -> HttpResponse {
    pages::delete_account_form()
}

/// Delete the signed-in account along with its notes and files.
#[route("/delete-account", method = "POST", method = "DELETE")]
pub async fn delete_account(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    state.accounts.delete_account(&user).await?;
    session.destroy();
    info!(user_id = %user.user_id, "account deleted by owner");
    Ok(see_other("/goodbye"))
}

/// Shown after an account is deleted.
#[get("/goodbye")]
pub async fn goodbye() -> HttpResponse {
    pages::goodbye()
}

#[cfg(test)]
#[path = "accounts_tests.rs"]
mod tests;
