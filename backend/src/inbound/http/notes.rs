//! Note handlers.
//!
//! ```text
//! GET  /create-note
//! POST /create-note       title=Groceries&content=eggs
//! POST /delete-note/{id}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{Error, Note, NoteDraft, NoteId, NoteValidationError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::pages;
use crate::inbound::http::session::CurrentUser;
use crate::inbound::http::state::HttpState;

/// Form body for `POST /create-note`.
#[derive(Debug, Deserialize)]
pub struct NoteForm {
    /// Note title; must not be blank.
    pub title: String,
    /// Note body.
    #[serde(default)]
    pub content: String,
}

/// JSON echo of a created note.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    /// Note identifier.
    pub id: String,
    /// Stored title.
    pub title: String,
    /// Stored body.
    pub content: String,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id.to_string(),
            title: note.title,
            content: note.content,
        }
    }
}

fn map_note_validation_error(err: &NoteValidationError) -> Error {
    match err {
        NoteValidationError::EmptyTitle => Error::invalid_request("title must not be empty")
            .with_details(json!({ "field": "title", "code": "empty_title" })),
        NoteValidationError::InvalidId => Error::invalid_request("note id must be a valid UUID")
            .with_details(json!({ "field": "id", "code": "invalid_note_id" })),
    }
}

/// Form for a new note.
#[get("/create-note")]
pub async fn create_note_page(_user: CurrentUser) -> HttpResponse {
    pages::create_note_form()
}

/// Create a note for the caller and echo it back as JSON.
#[post("/create-note")]
pub async fn create_note(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
    form: web::Form<NoteForm>,
) -> ApiResult<web::Json<NoteResponse>> {
    let draft = NoteDraft::try_from_parts(&form.title, &form.content)
        .map_err(|err| map_note_validation_error(&err))?;
    let note = state.notes.create_note(&user.user_id, draft).await?;
    Ok(web::Json(note.into()))
}

/// Delete one of the caller's notes; other users' notes are `404`.
#[post("/delete-note/{id}")]
pub async fn delete_note(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = NoteId::new(&path.into_inner()).map_err(|err| map_note_validation_error(&err))?;
    state.notes.delete_note(&user.user_id, &id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "note deleted" })))
}
