//! HTTP inbound adapter: HTML flows and JSON endpoints over the driving ports.

pub mod accounts;
pub mod admin;
pub mod dashboard;
pub mod error;
pub mod files;
pub mod notes;
pub mod pages;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;

use actix_web::web;

pub use error::ApiResult;

/// Register every vault route on `cfg`.
///
/// Callers wrap the app with the session middleware; handlers expect
/// `web::Data<state::HttpState>` in app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(accounts::home)
        .service(accounts::register_page)
        .service(accounts::register)
        .service(accounts::login_page)
        .service(accounts::login)
        .service(accounts::logout)
        .service(accounts::delete_account_page)
        .service(accounts::delete_account)
        .service(accounts::goodbye)
        .service(dashboard::welcome)
        .service(notes::create_note_page)
        .service(notes::create_note)
        .service(notes::delete_note)
        .service(files::upload_page)
        .service(files::upload_file)
        .service(files::view_file)
        .service(files::delete_file_by_name)
        .service(files::delete_file_by_id)
        .service(admin::list_users)
        .service(admin::delete_user_page)
        .service(admin::delete_user);
}
