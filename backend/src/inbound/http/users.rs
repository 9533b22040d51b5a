//! Session endpoints for local accounts.
//!
//! ```text
//! POST /api/v1/login {"email":"ada@example.com","password":"..."}
//! POST /api/v1/logout
//! GET  /api/v1/me
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::ports::VerifyResult;
use crate::domain::{Error, LoginCredentials, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::access::CurrentUser;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::invalid_payload;

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Login request body for `POST /api/v1/login`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub password: String,
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Whether the account can sign in with a password.
    pub has_password: bool,
    /// Whether the account is linked to an identity provider.
    pub federated: bool,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            name: user.name().to_string(),
            email: user.email().map(ToString::to_string),
            thumbnail: user.thumbnail().map(ToString::to_string),
            has_password: user.password_hash().is_some(),
            federated: user.federated_id().is_some(),
        }
    }
}

/// Bind the session to `user` and renew the cookie.
pub(crate) fn establish_session(
    state: &HttpState,
    session: &SessionContext,
    user: &User,
) -> ApiResult<()> {
    let token = state.sessions.serialize(user);
    session.establish(&token)
}

/// Verify email and password and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = UserResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 503, description = "Credential store unavailable", body = Error)
    ),
    tags = ["session"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&email, &password).map_err(|err| invalid_payload(&err))?;

    match state.login.verify(&credentials).await? {
        VerifyResult::Success(user) => {
            establish_session(&state, &session, &user)?;
            info!(user_id = %user.id(), "login succeeded");
            Ok(web::Json(UserResponse::from(&user)))
        }
        VerifyResult::InvalidCredentials => Err(Error::unauthorized(INVALID_CREDENTIALS)),
    }
}

/// End the session.
///
/// Always succeeds, with or without a session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["session"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

/// The user behind the current session.
///
/// Mounted as `GET /me` on a resource wrapped in the access gate.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 303, description = "No session; redirected to the login page"),
        (status = 503, description = "Credential store unavailable", body = Error)
    ),
    tags = ["session"],
    operation_id = "currentUser",
    security(("SessionCookie" = []))
)]
pub async fn current_user(current: CurrentUser) -> web::Json<UserResponse> {
    web::Json(UserResponse::from(&current.0))
}
