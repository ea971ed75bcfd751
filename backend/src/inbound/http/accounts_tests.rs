use super::*;
use crate::domain::ports::MockAccountsCommand;
use crate::domain::{Error, Role, UserId};
use crate::inbound::http::session_config::SESSION_COOKIE_NAME;
use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};
use crate::test_support::{fixture_session_user, sign_in_route, stub_http_state};
use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use actix_web::{App, test};
use rstest::rstest;
use std::sync::Arc;

fn state_with(accounts: MockAccountsCommand) -> HttpState {
    let mut state = stub_http_state();
    state.accounts = Arc::new(accounts);
    state
}

async fn call(state: HttpState, request: test::TestRequest) -> ServiceResponse {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .wrap(test_session_middleware())
            .service(register)
            .service(login),
    )
    .await;
    test::call_service(&app, request.to_request()).await
}

async fn call_signed_in(
    state: HttpState,
    role: Role,
    request: test::TestRequest,
) -> ServiceResponse {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .wrap(test_session_middleware())
            .service(sign_in_route(fixture_session_user(role)))
            .service(logout)
            .service(delete_account),
    )
    .await;
    let signed_in =
        test::call_service(&app, test::TestRequest::get().uri("/sign-in").to_request()).await;
    test::call_service(&app, request.cookie(session_cookie(&signed_in)).to_request()).await
}

fn location(res: &ServiceResponse) -> Option<&str> {
    res.headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

async fn body_text(res: ServiceResponse) -> String {
    String::from_utf8(test::read_body(res).await.to_vec()).expect("utf8 body")
}

fn register_form(password: &str, confirm: &str) -> test::TestRequest {
    test::TestRequest::post().uri("/register").set_form([
        ("username", "alice"),
        ("password", password),
        ("confirm_password", confirm),
    ])
}

#[rstest]
#[case::created(Ok(UserId::random()), StatusCode::OK, "account has been created")]
#[case::taken(Err(Error::conflict("username already exists")), StatusCode::CONFLICT, "already taken")]
#[case::mismatch(
    Err(Error::invalid_request("passwords do not match")),
    StatusCode::BAD_REQUEST,
    "do not match"
)]
#[actix_web::test]
async fn register_renders_outcome_page(
    #[case] outcome: Result<UserId, Error>,
    #[case] expected: StatusCode,
    #[case] fragment: &str,
) {
    let mut accounts = MockAccountsCommand::new();
    accounts
        .expect_register()
        .withf(|request| request.username().as_ref() == "alice")
        .times(1)
        .return_once(move |_| outcome);

    let res = call(state_with(accounts), register_form("pw1", "pw1")).await;
    assert_eq!(res.status(), expected);
    assert!(body_text(res).await.contains(fragment));
}

#[rstest]
#[case::blank_username(
    test::TestRequest::post().uri("/register").set_form([
        ("username", "  "),
        ("password", "pw"),
        ("confirm_password", "pw"),
    ])
)]
#[case::blank_password(register_form("", ""))]
#[actix_web::test]
async fn register_rejects_invalid_input_without_calling_service(
    #[case] request: test::TestRequest,
) {
    let mut accounts = MockAccountsCommand::new();
    accounts.expect_register().never();

    let res = call(state_with(accounts), request).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn register_surfaces_unexpected_failures() {
    let mut accounts = MockAccountsCommand::new();
    accounts
        .expect_register()
        .times(1)
        .return_once(|_| Err(Error::service_unavailable("database down")));

    let res = call(state_with(accounts), register_form("pw1", "pw1")).await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn login_sets_session_and_redirects_to_welcome() {
    let mut accounts = MockAccountsCommand::new();
    accounts
        .expect_authenticate()
        .withf(|credentials| {
            credentials.username().as_ref() == "alice" && credentials.password() == "pw1"
        })
        .times(1)
        .return_once(|_| Ok(fixture_session_user(Role::Standard)));

    let res = call(
        state_with(accounts),
        test::TestRequest::post()
            .uri("/login")
            .set_form([("username", "alice"), ("password", "pw1")]),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), Some("/welcome"));
    let cookie = session_cookie(&res);
    assert_eq!(cookie.http_only(), Some(true));
}

#[actix_web::test]
async fn login_failure_is_unauthorized_without_a_session() {
    let mut accounts = MockAccountsCommand::new();
    accounts
        .expect_authenticate()
        .times(1)
        .return_once(|_| Err(Error::unauthorized("invalid credentials")));

    let res = call(
        state_with(accounts),
        test::TestRequest::post()
            .uri("/login")
            .set_form([("username", "alice"), ("password", "nope")]),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(
        res.response()
            .cookies()
            .all(|cookie| cookie.name() != SESSION_COOKIE_NAME)
    );
    assert!(body_text(res).await.contains("wrong password"));
}

#[actix_web::test]
async fn login_with_blank_fields_is_a_bad_request() {
    let mut accounts = MockAccountsCommand::new();
    accounts.expect_authenticate().never();

    let res = call(
        state_with(accounts),
        test::TestRequest::post()
            .uri("/login")
            .set_form([("username", "alice"), ("password", "")]),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn logout_clears_the_session_and_goes_home() {
    let res = call_signed_in(
        stub_http_state(),
        Role::Standard,
        test::TestRequest::post().uri("/logout"),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), Some("/"));
    let cookie = session_cookie(&res);
    assert_eq!(cookie.value(), "");
}

#[rstest]
#[case::post(test::TestRequest::post().uri("/delete-account"))]
#[case::delete(test::TestRequest::delete().uri("/delete-account"))]
#[actix_web::test]
async fn delete_account_removes_the_caller(#[case] request: test::TestRequest) {
    let caller = fixture_session_user(Role::Standard);
    let mut accounts = MockAccountsCommand::new();
    accounts
        .expect_delete_account()
        .withf(move |user| *user == caller)
        .times(1)
        .return_once(|_| Ok(()));

    let res = call_signed_in(state_with(accounts), Role::Standard, request).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), Some("/goodbye"));
}

#[actix_web::test]
async fn admin_cannot_delete_own_account() {
    let mut accounts = MockAccountsCommand::new();
    accounts
        .expect_delete_account()
        .times(1)
        .return_once(|_| Err(Error::forbidden("the administrator account cannot be deleted")));

    let res = call_signed_in(
        state_with(accounts),
        Role::Admin,
        test::TestRequest::post().uri("/delete-account"),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn anonymous_logout_redirects_to_login() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(stub_http_state()))
            .wrap(test_session_middleware())
            .service(logout),
    )
    .await;
    let res = test::call_service(&app, test::TestRequest::post().uri("/logout").to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), Some("/login"));
}
