//! Session helpers and authorization extractors.
//!
//! [`SessionContext`] wraps the Actix cookie session so handlers deal in
//! [`SessionUser`] values. [`CurrentUser`] and [`AdminUser`] gate routes:
//! a missing session redirects to `/login`, a non-admin gets `403`.

use actix_session::Session;
use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, Role, SessionUser, UserId, Username};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const USERNAME_KEY: &str = "username";
pub(crate) const ROLE_KEY: &str = "role";

/// Path unauthenticated visitors are sent to.
pub const LOGIN_PATH: &str = "/login";

fn read_error(error: impl std::fmt::Display) -> Error {
    Error::internal(format!("failed to read session: {error}"))
}

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store the authenticated user in the cookie, issuing a fresh session.
    pub fn persist_user(&self, user: &SessionUser) -> Result<(), Error> {
        self.0.renew();
        let persist_error =
            |error| Error::internal(format!("failed to persist session: {error}"));
        self.0
            .insert(USER_ID_KEY, user.user_id.to_string())
            .map_err(persist_error)?;
        self.0
            .insert(USERNAME_KEY, user.username.as_ref())
            .map_err(persist_error)?;
        self.0
            .insert(ROLE_KEY, user.role.as_str())
            .map_err(persist_error)
    }

    /// Fetch the signed-in user, if any.
    ///
    /// Values that fail validation are treated as an anonymous visitor.
    pub fn current_user(&self) -> Result<Option<SessionUser>, Error> {
        let Some(raw_id) = self.0.get::<String>(USER_ID_KEY).map_err(read_error)? else {
            return Ok(None);
        };
        let raw_name = self.0.get::<String>(USERNAME_KEY).map_err(read_error)?;
        let raw_role = self.0.get::<String>(ROLE_KEY).map_err(read_error)?;

        let user_id = match UserId::new(&raw_id) {
            Ok(id) => id,
            Err(error) => {
                warn!(%error, "invalid user id in session cookie");
                return Ok(None);
            }
        };
        let Some(username) = raw_name.and_then(|name| Username::new(name).ok()) else {
            warn!(user_id = %user_id, "invalid username in session cookie");
            return Ok(None);
        };
        let Some(role) = raw_role.and_then(|role| role.parse::<Role>().ok()) else {
            warn!(user_id = %user_id, "invalid role in session cookie");
            return Ok(None);
        };

        Ok(Some(SessionUser {
            user_id,
            username,
            role,
        }))
    }

    /// Drop every session value and expire the cookie.
    pub fn destroy(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

/// Rejection for routes that need a signed-in user.
#[derive(Debug, thiserror::Error)]
#[error("login required")]
pub struct LoginRequired;

impl ResponseError for LoginRequired {
    fn status_code(&self) -> StatusCode {
        StatusCode::SEE_OTHER
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::SeeOther()
            .insert_header((header::LOCATION, LOGIN_PATH))
            .finish()
    }
}

/// Extractor for the signed-in user.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub SessionUser);

impl FromRequest for CurrentUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = SessionContext::from_request(req, payload);
        Box::pin(async move {
            let session = fut.await?;
            match session.current_user()? {
                Some(user) => Ok(CurrentUser(user)),
                None => Err(LoginRequired.into()),
            }
        })
    }
}

/// Extractor for a signed-in administrator.
#[derive(Debug, Clone)]
pub struct AdminUser(pub SessionUser);

impl FromRequest for AdminUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = CurrentUser::from_request(req, payload);
        Box::pin(async move {
            let CurrentUser(user) = fut.await?;
            if user.role.is_admin() {
                Ok(AdminUser(user))
            } else {
                warn!(user_id = %user.user_id, "non-admin attempted an admin route");
                Err(Error::forbidden("administrator access required").into())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};
    use actix_web::{App, test, web};
    use rstest::rstest;

    const ALICE_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    fn alice(role: Role) -> SessionUser {
        SessionUser {
            user_id: UserId::new(ALICE_ID).expect("fixture id"),
            username: Username::new("alice").expect("fixture username"),
            role,
        }
    }

    fn session_test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(test_session_middleware())
            .route(
                "/as-standard",
                web::get().to(|session: SessionContext| async move {
                    session.persist_user(&alice(Role::Standard))?;
                    Ok::<_, Error>(HttpResponse::Ok())
                }),
            )
            .route(
                "/as-admin",
                web::get().to(|session: SessionContext| async move {
                    session.persist_user(&alice(Role::Admin))?;
                    Ok::<_, Error>(HttpResponse::Ok())
                }),
            )
            .route(
                "/tamper",
                web::get().to(|session: Session| async move {
                    session
                        .insert(USER_ID_KEY, "not-a-uuid")
                        .expect("set invalid user id");
                    HttpResponse::Ok()
                }),
            )
            .route(
                "/whoami",
                web::get().to(|CurrentUser(user): CurrentUser| async move {
                    HttpResponse::Ok().body(format!("{}:{}", user.username, user.role))
                }),
            )
            .route(
                "/admin",
                web::get().to(|AdminUser(_): AdminUser| async { HttpResponse::Ok() }),
            )
            .route(
                "/logout",
                web::get().to(|session: SessionContext| async move {
                    session.destroy();
                    HttpResponse::Ok()
                }),
            )
    }

    #[actix_web::test]
    async fn round_trips_session_user() {
        let app = test::init_service(session_test_app()).await;
        let set = test::call_service(
            &app,
            test::TestRequest::get().uri("/as-standard").to_request(),
        )
        .await;
        let cookie = session_cookie(&set);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/whoami")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, "alice:standard");
    }

    #[rstest]
    #[case("/whoami")]
    #[case("/admin")]
    #[actix_web::test]
    async fn anonymous_visitors_are_sent_to_login(#[case] path: &str) {
        let app = test::init_service(session_test_app()).await;
        let res = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;

        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            res.headers().get(header::LOCATION).map(|v| v.as_bytes()),
            Some(LOGIN_PATH.as_bytes())
        );
    }

    #[actix_web::test]
    async fn tampered_session_counts_as_anonymous() {
        let app = test::init_service(session_test_app()).await;
        let set =
            test::call_service(&app, test::TestRequest::get().uri("/tamper").to_request()).await;
        let cookie = session_cookie(&set);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/whoami")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
    }

    #[rstest]
    #[case("/as-standard", StatusCode::FORBIDDEN)]
    #[case("/as-admin", StatusCode::OK)]
    #[actix_web::test]
    async fn admin_routes_check_role(#[case] sign_in_path: &str, #[case] expected: StatusCode) {
        let app = test::init_service(session_test_app()).await;
        let set = test::call_service(
            &app,
            test::TestRequest::get().uri(sign_in_path).to_request(),
        )
        .await;
        let cookie = session_cookie(&set);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/admin")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), expected);
    }

    #[actix_web::test]
    async fn destroy_expires_the_cookie() {
        let app = test::init_service(session_test_app()).await;
        let set = test::call_service(
            &app,
            test::TestRequest::get().uri("/as-standard").to_request(),
        )
        .await;
        let cookie = session_cookie(&set);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/logout")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let cleared = session_cookie(&res);
        assert!(cleared.value().is_empty());
    }
}
