//! Federated login endpoints (Google OAuth 2.0 authorisation-code flow).
//!
//! ```text
//! GET /auth/google                        -> 302 to the provider
//! GET /auth/google/redirect?code&state    -> 302 to /
//! ```
//!
//! Both routes answer `404` when no identity provider is configured.

use std::sync::Arc;

use actix_web::http::header;
use actix_web::{HttpResponse, get, web};
use serde::Deserialize;
use tracing::{info, warn};
use utoipa::IntoParams;

use crate::domain::ports::FederatedLoginService;
use crate::domain::{AuthorizationCode, Error, OAuthState};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::establish_session;

/// Where the browser lands after a successful federated login.
const POST_LOGIN_REDIRECT: &str = "/";

/// Query parameters the provider appends to the callback URL.
#[derive(Debug, Deserialize, IntoParams)]
pub struct CallbackQuery {
    /// Authorisation code to exchange.
    pub code: Option<String>,
    /// Echo of the `state` sent with the authorisation redirect.
    pub state: Option<String>,
    /// Set by the provider when the user declined or the request failed.
    pub error: Option<String>,
}

fn provider(state: &HttpState) -> ApiResult<Arc<dyn FederatedLoginService>> {
    state
        .federated
        .clone()
        .ok_or_else(|| Error::not_found("federated login is not configured"))
}

fn found(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Start a federated login.
///
/// Stores a fresh `state` in the session and redirects to the provider.
#[utoipa::path(
    get,
    path = "/auth/google",
    responses(
        (status = 302, description = "Redirect to the identity provider"),
        (status = 404, description = "Federated login not configured", body = Error)
    ),
    tags = ["federated"],
    operation_id = "googleLogin",
    security([])
)]
#[get("/auth/google")]
pub async fn google_login(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let federated = provider(&state)?;
    let oauth_state = OAuthState::generate();
    session.store_oauth_state(&oauth_state)?;
    let url = federated.authorization_url(&oauth_state);
    Ok(found(url.as_str()))
}

/// Complete a federated login.
///
/// Checks `state`, exchanges `code` for a profile, finds or creates the
/// matching account and establishes the session.
#[utoipa::path(
    get,
    path = "/auth/google/redirect",
    params(CallbackQuery),
    responses(
        (status = 302, description = "Logged in; redirect to the application root"),
        (status = 400, description = "Missing authorisation code", body = Error),
        (status = 401, description = "State mismatch or provider refusal", body = Error),
        (status = 404, description = "Federated login not configured", body = Error),
        (status = 409, description = "Email already registered to another account", body = Error),
        (status = 503, description = "Provider or credential store unavailable", body = Error)
    ),
    tags = ["federated"],
    operation_id = "googleCallback",
    security([])
)]
#[get("/auth/google/redirect")]
pub async fn google_callback(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<CallbackQuery>,
) -> ApiResult<HttpResponse> {
    let federated = provider(&state)?;
    let CallbackQuery {
        code,
        state: returned_state,
        error,
    } = query.into_inner();

    let expected = session.take_oauth_state();
    let state_matches = matches!(
        (&expected, &returned_state),
        (Some(expected), Some(returned)) if expected.as_str() == returned.as_str()
    );
    if !state_matches {
        warn!("federated callback rejected: state mismatch");
        return Err(Error::unauthorized("oauth state mismatch"));
    }

    if let Some(reason) = error {
        info!(reason = %reason, "identity provider declined the login");
        return Err(Error::unauthorized("identity provider declined the login"));
    }

    let code = code
        .as_deref()
        .and_then(AuthorizationCode::new)
        .ok_or_else(|| Error::invalid_request("missing authorisation code"))?;

    let user = federated.complete(&code).await?;
    establish_session(&state, &session, &user)?;
    info!(user_id = %user.id(), "federated login succeeded");
    Ok(found(POST_LOGIN_REDIRECT))
}
