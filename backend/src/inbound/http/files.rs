//! File handlers.
//!
//! ```text
//! GET    /upload-file
//! POST   /upload-file              multipart/form-data, field `file`
//! GET    /view-file/{file_name}
//! POST   /delete-file/{file_name}
//! DELETE /files/{id}
//! ```
//!
//! Content types served by `view-file` come from sniffing the stored bytes,
//! never from what the uploader claimed.

use actix_multipart::{Field, Multipart};
use actix_web::http::header::{self, ContentType};
use actix_web::{HttpResponse, delete, get, post, web};
use futures_util::TryStreamExt;
use serde_json::json;
use tracing::info;

use crate::domain::{Error, FileId, FileName, FileValidationError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::pages::{self, see_other};
use crate::inbound::http::session::CurrentUser;
use crate::inbound::http::state::HttpState;

/// Multipart field carrying the upload.
pub const UPLOAD_FIELD: &str = "file";
/// Body served for content that is neither a document, an image, nor text.
pub const UNSUPPORTED_CONTENT: &str = "Unsupported file content";

fn map_file_validation_error(err: &FileValidationError) -> Error {
    let code = match err {
        FileValidationError::InvalidId => "invalid_file_id",
        FileValidationError::EmptyName => "empty_file_name",
        FileValidationError::NameTooLong { .. } => "file_name_too_long",
        FileValidationError::NameInvalidCharacters => "file_name_invalid_characters",
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "code": code }))
}

async fn read_capped(field: &mut Field, limit: usize) -> ApiResult<Vec<u8>> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await? {
        if bytes.len() + chunk.len() > limit {
            return Err(Error::invalid_request(format!(
                "file exceeds the upload limit of {limit} bytes"
            ))
            .with_details(json!({ "code": "upload_too_large", "limit": limit })));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

/// Pull the `file` field out of the form, ignoring any other fields.
async fn read_upload(payload: &mut Multipart, limit: usize) -> ApiResult<(FileName, Vec<u8>)> {
    while let Some(mut field) = payload.try_next().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let raw_name = field
            .content_disposition()
            .and_then(|disposition| disposition.get_filename())
            .unwrap_or_default()
            .to_owned();
        let filename = FileName::new(raw_name).map_err(|err| map_file_validation_error(&err))?;
        let bytes = read_capped(&mut field, limit).await?;
        return Ok((filename, bytes));
    }
    Err(Error::invalid_request("missing `file` field")
        .with_details(json!({ "field": UPLOAD_FIELD, "code": "missing_field" })))
}

/// Upload form showing the size limit.
#[get("/upload-file")]
pub async fn upload_page(state: web::Data<HttpState>, _user: CurrentUser) -> HttpResponse {
    pages::upload_form(state.max_upload_bytes)
}

/// Store an upload and return to the dashboard.
#[post("/upload-file")]
pub async fn upload_file(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
    mut payload: Multipart,
) -> ApiResult<HttpResponse> {
    let (filename, bytes) = read_upload(&mut payload, state.max_upload_bytes).await?;
    let size = bytes.len();
    let stored = state.files.save_file(&user.user_id, filename, bytes).await?;
    info!(user_id = %user.user_id, file_id = %stored.id, size, "file uploaded");
    Ok(see_other("/welcome"))
}

/// Serve a stored file with its sniffed content type.
#[get("/view-file/{file_name}")]
pub async fn view_file(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let filename =
        FileName::new(path.into_inner()).map_err(|err| map_file_validation_error(&err))?;
    let content = state.files_query.read_file(&user.user_id, &filename).await?;

    let mut response = HttpResponse::Ok();
    response.insert_header((header::X_CONTENT_TYPE_OPTIONS, "nosniff"));
    Ok(match content.kind.mime() {
        Some(mime) => response.content_type(mime).body(content.bytes),
        None => response
            .content_type(ContentType::plaintext())
            .body(UNSUPPORTED_CONTENT),
    })
}

/// Delete one of the caller's files by its display name.
#[post("/delete-file/{file_name}")]
pub async fn delete_file_by_name(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let filename =
        FileName::new(path.into_inner()).map_err(|err| map_file_validation_error(&err))?;
    state
        .files
        .delete_file_by_name(&user.user_id, &filename)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "file deleted" })))
}

/// Delete one of the caller's files by metadata id.
#[delete("/files/{id}")]
pub async fn delete_file_by_id(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = FileId::new(&path.into_inner()).map_err(|err| map_file_validation_error(&err))?;
    state.files.delete_file_by_id(&user.user_id, &id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "file deleted" })))
}

#[cfg(test)]
#[path = "files_tests.rs"]
mod tests;
