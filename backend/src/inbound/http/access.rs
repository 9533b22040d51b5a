//! Access-gate middleware and the `CurrentUser` extractor.
//!
//! [`RequireSession`] wraps protected scopes. It reads the session token,
//! asks the domain [`AccessGate`] for a decision and either forwards the
//! request with the resolved user in its extensions or answers
//! `303 See Other` pointing at the login page.

use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

use actix_session::SessionExt;
use actix_web::body::{BoxBody, EitherBody};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::debug;

use crate::domain::{Access, AccessGate, Error, User};
use crate::inbound::http::session::SessionContext;

/// Middleware factory enforcing an authenticated session.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use actix_web::{App, web};
/// use travel_auth::domain::{AccessGate, SessionIdentityManager};
/// use travel_auth::inbound::http::access::RequireSession;
/// use travel_auth::outbound::memory::InMemoryCredentialStore;
///
/// let sessions = Arc::new(SessionIdentityManager::new(Arc::new(
///     InMemoryCredentialStore::new(),
/// )));
/// let gate = AccessGate::new(sessions);
/// let _app = App::new().service(
///     web::scope("/bookings").wrap(RequireSession::new(gate, "/login")),
/// );
/// ```
#[derive(Clone)]
pub struct RequireSession {
    gate: Arc<AccessGate>,
    login_path: Rc<str>,
}

impl RequireSession {
    /// Gate requests with `gate`, sending denied ones to `login_path`.
    pub fn new(gate: AccessGate, login_path: impl AsRef<str>) -> Self {
        Self {
            gate: Arc::new(gate),
            login_path: Rc::from(login_path.as_ref()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireSession
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = RequireSessionMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireSessionMiddleware {
            service: Rc::new(service),
            gate: Arc::clone(&self.gate),
            login_path: Rc::clone(&self.login_path),
        }))
    }
}

/// Service wrapper produced by [`RequireSession`].
pub struct RequireSessionMiddleware<S> {
    service: Rc<S>,
    gate: Arc<AccessGate>,
    login_path: Rc<str>,
}

impl<S, B> Service<ServiceRequest> for RequireSessionMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let gate = Arc::clone(&self.gate);
        let login_path = Rc::clone(&self.login_path);

        Box::pin(async move {
            let session = SessionContext::new(req.get_session());
            let (decision, had_token) = match session.token() {
                Ok(token) => (gate.check(token.as_ref()).await, token.is_some()),
                Err(error) => (Err(error), false),
            };

            match decision {
                Ok(Access::Allow(user)) => {
                    req.extensions_mut().insert(CurrentUser(user));
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Ok(Access::Deny) => {
                    if had_token {
                        // The session names a user that no longer resolves.
                        session.purge();
                    }
                    debug!(path = %req.path(), "redirecting unauthenticated request to login");
                    let redirect = HttpResponse::SeeOther()
                        .insert_header((header::LOCATION, &*login_path))
                        .finish();
                    Ok(req.into_response(redirect).map_into_right_body())
                }
                Err(error) => {
                    let response = error.error_response();
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

/// The user admitted by [`RequireSession`].
///
/// Extracting it outside a gated scope fails with `401 Unauthorized`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    /// Unwrap the user record.
    pub fn into_inner(self) -> User {
        self.0
    }
}

impl FromRequest for CurrentUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<CurrentUser>()
                .cloned()
                .ok_or_else(|| Error::unauthorized("login required")),
        )
    }
}
