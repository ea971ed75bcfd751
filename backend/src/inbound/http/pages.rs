//! Inline HTML fragments for the browser-facing routes.
//!
//! Every user-supplied value passes through [`escape_html`] before it is
//! interpolated; file names placed in URLs are percent-encoded as a single
//! path segment.

use actix_web::http::StatusCode;
use actix_web::http::header::{self, ContentType};
use actix_web::HttpResponse;
use chrono::{DateTime, Utc};
use url::Url;

use crate::domain::{Note, StoredFile, User};

/// Escape text for safe inclusion in HTML element content or attributes.
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Build `<prefix>/<name>` with `name` percent-encoded as one segment.
fn encoded_path(prefix: &str, name: &str) -> String {
    let Ok(mut url) = Url::parse("http://vault.invalid/") else {
        return format!("/{prefix}");
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push(prefix).push(name);
    }
    url.path().to_owned()
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        escape_html(title)
    )
}

/// Render a full page with the given status.
pub fn html(status: StatusCode, title: &str, body: &str) -> HttpResponse {
    HttpResponse::build(status)
        .content_type(ContentType::html())
        .body(document(title, body))
}

/// `303 See Other` pointing at `location`.
pub fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Short page with a heading, a message, and a follow-up link.
pub fn message_page(
    status: StatusCode,
    heading: &str,
    message: &str,
    link: (&str, &str),
) -> HttpResponse {
    let (href, label) = link;
    let body = format!(
        "<h1>{}</h1>\n<p>{}</p>\n<a href=\"{}\">{}</a>",
        escape_html(heading),
        escape_html(message),
        escape_html(href),
        escape_html(label)
    );
    html(status, heading, &body)
}

/// Landing page with register and login links.
pub fn home() -> HttpResponse {
    html(
        StatusCode::OK,
        "Vault",
        "<h1>Vault</h1>\n<p>Keep your notes and files in one place.</p>\n\
         <ul>\n<li><a href=\"/login\">Log in</a></li>\n\
         <li><a href=\"/register\">Create an account</a></li>\n</ul>",
    )
}

/// Registration form.
pub fn register_form() -> HttpResponse {
    html(
        StatusCode::OK,
        "Register",
        "<h1>Create an account</h1>\n\
         <form action=\"/register\" method=\"post\">\n\
         <input type=\"text\" name=\"username\" placeholder=\"Username\" required>\n\
         <input type=\"password\" name=\"password\" placeholder=\"Password\" required>\n\
         <input type=\"password\" name=\"confirm_password\" placeholder=\"Confirm password\" required>\n\
         <button type=\"submit\">Register</button>\n</form>\n\
         <a href=\"/login\">Already registered? Log in</a>",
    )
}

/// Login form.
pub fn login_form() -> HttpResponse {
    html(
        StatusCode::OK,
        "Log in",
        "<h1>Log in</h1>\n\
         <form action=\"/login\" method=\"post\">\n\
         <input type=\"text\" name=\"username\" placeholder=\"Username\" required>\n\
         <input type=\"password\" name=\"password\" placeholder=\"Password\" required>\n\
         <button type=\"submit\">Log in</button>\n</form>\n\
         <a href=\"/register\">Create an account</a>",
    )
}

// Only server-generated identifiers reach the script, via `data-*` attributes.
const DASHBOARD_SCRIPT: &str = "<script>\n\
function deleteNote(button) {\n\
  fetch('/delete-note/' + button.dataset.noteId, { method: 'POST' }).then(() => location.reload());\n\
}\n\
function deleteFile(button) {\n\
  fetch('/files/' + button.dataset.fileId, { method: 'DELETE' }).then(() => location.reload());\n\
}\n\
</script>";

/// Dashboard for a standard user: notes, files, and the upload form.
pub fn user_dashboard(username: &str, notes: &[Note], files: &[StoredFile]) -> HttpResponse {
    let mut body = format!("<h1>Welcome, {}</h1>\n", escape_html(username));

    body.push_str("<h2>Your notes</h2>\n");
    if notes.is_empty() {
        body.push_str("<p>No notes yet.</p>\n");
    }
    for note in notes {
        body.push_str(&format!(
            "<div class=\"note\"><strong>{}</strong><br>{}\
             <button data-note-id=\"{}\" onclick=\"deleteNote(this)\">Delete</button></div>\n",
            escape_html(&note.title),
            escape_html(&note.content),
            note.id
        ));
    }
    body.push_str("<a href=\"/create-note\">New note</a>\n");

    body.push_str("<h2>Your files</h2>\n");
    if files.is_empty() {
        body.push_str("<p>No files yet.</p>\n");
    }
    for file in files {
        let name = file.filename.as_ref();
        body.push_str(&format!(
            "<div class=\"file\"><a href=\"{}\" target=\"_blank\">{}</a> \
             <button data-file-id=\"{}\" onclick=\"deleteFile(this)\">Delete</button></div>\n",
            escape_html(&encoded_path("view-file", name)),
            escape_html(name),
            file.id
        ));
    }

    body.push_str(
        "<h2>Upload a file</h2>\n\
         <form action=\"/upload-file\" method=\"post\" enctype=\"multipart/form-data\">\n\
         <input type=\"file\" name=\"file\" required>\n\
         <button type=\"submit\">Upload</button>\n</form>\n\
         <form action=\"/logout\" method=\"post\"><button type=\"submit\">Log out</button></form>\n\
         <a href=\"/delete-account\">Delete my account</a>\n",
    );
    body.push_str(DASHBOARD_SCRIPT);
    html(StatusCode::OK, "Welcome", &body)
}

/// Dashboard for the administrator.
pub fn admin_dashboard(username: &str) -> HttpResponse {
    let body = format!(
        "<h1>Administration</h1>\n<p>Signed in as {}.</p>\n<ul>\n\
         <li><a href=\"/users\">List users</a></li>\n\
         <li><a href=\"/delete\">Delete a user</a></li>\n</ul>\n\
         <form action=\"/logout\" method=\"post\"><button type=\"submit\">Log out</button></form>",
        escape_html(username)
    );
    html(StatusCode::OK, "Administration", &body)
}

/// New note form.
pub fn create_note_form() -> HttpResponse {
    html(
        StatusCode::OK,
        "New note",
        "<h1>New note</h1>\n\
         <form action=\"/create-note\" method=\"post\">\n\
         <input type=\"text\" name=\"title\" placeholder=\"Title\" required><br>\n\
         <textarea name=\"content\" rows=\"5\" cols=\"50\" placeholder=\"Content\"></textarea><br>\n\
         <button type=\"submit\">Save</button>\n</form>\n\
         <a href=\"/welcome\">Back</a>",
    )
}

/// Standalone upload form stating the size limit.
pub fn upload_form(max_upload_bytes: usize) -> HttpResponse {
    let body = format!(
        "<h1>Upload a file</h1>\n<p>Files up to {max_upload_bytes} bytes are accepted.</p>\n\
         <form action=\"/upload-file\" method=\"post\" enctype=\"multipart/form-data\">\n\
         <input type=\"file\" name=\"file\" required>\n\
         <button type=\"submit\">Upload</button>\n</form>\n\
         <a href=\"/welcome\">Back</a>"
    );
    html(StatusCode::OK, "Upload a file", &body)
}

/// Confirmation form for deleting the signed-in account.
pub fn delete_account_form() -> HttpResponse {
    html(
        StatusCode::OK,
        "Delete account",
        "<h1>Delete account</h1>\n\
         <p>This removes your notes and files permanently.</p>\n\
         <form action=\"/delete-account\" method=\"post\">\n\
         <button type=\"submit\">Yes, delete my account</button>\n</form>\n\
         <a href=\"/welcome\">No, take me back</a>",
    )
}

/// Farewell page after account deletion.
pub fn goodbye() -> HttpResponse {
    html(
        StatusCode::OK,
        "Goodbye",
        "<h1>Goodbye</h1>\n<p>Your account has been deleted.</p>\n<a href=\"/\">Home</a>",
    )
}

/// Account listing with roles and creation times.
pub fn users_list(users: &[User]) -> HttpResponse {
    let mut body = String::from("<h1>Users</h1>\n<ul>\n");
    for user in users {
        body.push_str(&format!(
            "<li>{} ({}) created {}</li>\n",
            escape_html(user.username().as_ref()),
            user.role(),
            format_timestamp(user.created_at())
        ));
    }
    body.push_str("</ul>\n<a href=\"/welcome\">Back</a>");
    html(StatusCode::OK, "Users", &body)
}

/// Admin form naming the account to delete and its password.
pub fn delete_user_form() -> HttpResponse {
    html(
        StatusCode::OK,
        "Delete a user",
        "<h1>Delete a user</h1>\n\
         <form action=\"/delete\" method=\"post\">\n\
         <input type=\"text\" name=\"username\" placeholder=\"Username\" required>\n\
         <input type=\"password\" name=\"password\" placeholder=\"Password\" required>\n\
         <button type=\"submit\">Delete user</button>\n</form>\n\
         <a href=\"/welcome\">Back</a>",
    )
}
