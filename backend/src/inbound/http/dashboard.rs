//! `GET /welcome`: the signed-in landing page.

use actix_web::{HttpResponse, get, web};

use crate::inbound::http::ApiResult;
use crate::inbound::http::pages;
use crate::inbound::http::session::CurrentUser;
use crate::inbound::http::state::HttpState;

/// Administrators get the admin dashboard; everyone else sees their notes,
/// files, and the upload form.
#[get("/welcome")]
pub async fn welcome(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<HttpResponse> {
    if user.role.is_admin() {
        return Ok(pages::admin_dashboard(user.username.as_ref()));
    }

    let notes = state.notes_query.list_notes(&user.user_id).await?;
    let files = state.files_query.list_files(&user.user_id).await?;
    Ok(pages::user_dashboard(
        user.username.as_ref(),
        &notes,
        &files,
    ))
}
