//! Administrator handlers.
//!
//! ```text
//! GET  /users    account listing
//! GET  /delete   delete-user form
//! POST /delete   username=bob&password=pw
//! ```
//!
//! Deleting another account requires re-entering that account's password.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, get, post, web};
use tracing::info;

use crate::domain::{ErrorCode, LoginCredentials};
use crate::inbound::http::ApiResult;
use crate::inbound::http::accounts::LoginForm;
use crate::inbound::http::pages::{self, message_page, see_other};
use crate::inbound::http::session::AdminUser;
use crate::inbound::http::state::HttpState;

/// List every account. Admin only.
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    _admin: AdminUser,
) -> ApiResult<HttpResponse> {
    let users = state.users.list_users().await?;
    Ok(pages::users_list(&users))
}

/// Form for deleting another account.
#[get("/delete")]
pub async fn delete_user_page(_admin: AdminUser) -> HttpResponse {
    pages::delete_user_form()
}

/// Delete the named account after verifying its password.
///
/// Unknown users answer `400`, a wrong password `401`, and the administrator
/// account itself `403`. Success returns to the listing.
#[post("/delete")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    AdminUser(admin): AdminUser,
    form: web::Form<LoginForm>,
) -> ApiResult<HttpResponse> {
    const HEADING: &str = "Delete a user";
    let retry = ("/delete", "Try again");

    let Ok(credentials) = LoginCredentials::try_from_parts(&form.username, &form.password) else {
        return Ok(message_page(
            StatusCode::BAD_REQUEST,
            HEADING,
            "Username and password are required.",
            retry,
        ));
    };

    let (status, message) = match state.accounts.delete_with_credentials(&credentials).await {
        Ok(()) => {
            info!(
                admin_id = %admin.user_id,
                username = %credentials.username(),
                "account deleted by administrator"
            );
            return Ok(see_other("/users"));
        }
        Err(err) => match err.code() {
            ErrorCode::NotFound => (StatusCode::BAD_REQUEST, "That user does not exist."),
            ErrorCode::Unauthorized => (StatusCode::UNAUTHORIZED, "Wrong password."),
            ErrorCode::Forbidden => (
                StatusCode::FORBIDDEN,
                "The administrator account cannot be deleted.",
            ),
            _ => return Err(err),
        },
    };
    Ok(message_page(status, HEADING, message, retry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockAccountsCommand, MockUsersQuery};
    use crate::domain::{Error, Role, User, UserId, Username};
    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};
    use crate::test_support::{
        fixture_session_user, fixture_timestamp, sign_in_route, stub_http_state,
    };
    use actix_web::dev::ServiceResponse;
    use actix_web::http::header;
    use actix_web::{App, test};
    use rstest::rstest;
    use std::sync::Arc;

    async fn call_as(role: Role, state: HttpState, request: test::TestRequest) -> ServiceResponse {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .wrap(test_session_middleware())
                .service(sign_in_route(fixture_session_user(role)))
                .service(list_users)
                .service(delete_user_page)
                .service(delete_user),
        )
        .await;
        let signed_in =
            test::call_service(&app, test::TestRequest::get().uri("/sign-in").to_request()).await;
        test::call_service(&app, request.cookie(session_cookie(&signed_in)).to_request()).await
    }

    fn delete_request(username: &str, password: &str) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/delete")
            .set_form([("username", username), ("password", password)])
    }

    #[actix_web::test]
    async fn lists_every_username_escaped() {
        let mut users = MockUsersQuery::new();
        users.expect_list_users().times(1).returning(|| {
            Ok(vec![
                User::new(
                    UserId::random(),
                    Username::admin(),
                    Role::Admin,
                    fixture_timestamp(),
                ),
                User::new(
                    UserId::random(),
                    Username::new("bob<i>").expect("valid username"),
                    Role::Standard,
                    fixture_timestamp(),
                ),
            ])
        });
        let mut state = stub_http_state();
        state.users = Arc::new(users);

        let res = call_as(Role::Admin, state, test::TestRequest::get().uri("/users")).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = String::from_utf8(test::read_body(res).await.to_vec()).expect("utf8 body");
        assert!(body.contains("admin (admin)"));
        assert!(body.contains("bob&lt;i&gt; (standard)"));
    }

    #[rstest]
    #[case("/users")]
    #[case("/delete")]
    #[actix_web::test]
    async fn standard_users_are_forbidden(#[case] path: &str) {
        let res = call_as(
            Role::Standard,
            stub_http_state(),
            test::TestRequest::get().uri(path),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn successful_delete_returns_to_listing() {
        let mut accounts = MockAccountsCommand::new();
        accounts
            .expect_delete_with_credentials()
            .withf(|credentials| {
                credentials.username().as_ref() == "bob" && credentials.password() == "pw"
            })
            .times(1)
            .return_once(|_| Ok(()));
        let mut state = stub_http_state();
        state.accounts = Arc::new(accounts);

        let res = call_as(Role::Admin, state, delete_request("bob", "pw")).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            res.headers()
                .get(header::LOCATION)
                .and_then(|value| value.to_str().ok()),
            Some("/users")
        );
    }

    #[rstest]
    #[case(Error::not_found("user does not exist"), StatusCode::BAD_REQUEST)]
    #[case(Error::unauthorized("wrong password"), StatusCode::UNAUTHORIZED)]
    #[case(Error::forbidden("admin"), StatusCode::FORBIDDEN)]
    #[case(Error::service_unavailable("db down"), StatusCode::SERVICE_UNAVAILABLE)]
    #[actix_web::test]
    async fn failed_deletes_map_to_status(#[case] error: Error, #[case] expected: StatusCode) {
        let mut accounts = MockAccountsCommand::new();
        accounts
            .expect_delete_with_credentials()
            .times(1)
            .return_once(move |_| Err(error));
        let mut state = stub_http_state();
        state.accounts = Arc::new(accounts);

        let res = call_as(Role::Admin, state, delete_request("bob", "pw")).await;
        assert_eq!(res.status(), expected);
    }

    #[actix_web::test]
    async fn blank_fields_are_rejected_before_lookup() {
        let mut accounts = MockAccountsCommand::new();
        accounts.expect_delete_with_credentials().never();
        let mut state = stub_http_state();
        state.accounts = Arc::new(accounts);

        let res = call_as(Role::Admin, state, delete_request(" ", "pw")).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
