//! Local account endpoints: signup and password reset.
//!
//! ```text
//! POST /api/v1/signup         {"name":"Ada","email":"ada@example.com","password":"..."}
//! POST /api/v1/password-reset {"name":"Ada","email":"ada@example.com","password":"..."}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, PasswordResetRequest, SignupRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::UserResponse;
use crate::inbound::http::validation::invalid_payload;

/// Body shared by signup and password reset.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountRequest {
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub password: String,
}

/// Register a local account.
///
/// Does not log the new user in.
#[utoipa::path(
    post,
    path = "/api/v1/signup",
    request_body = AccountRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 503, description = "Credential store unavailable", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "signup",
    security([])
)]
#[post("/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    payload: web::Json<AccountRequest>,
) -> ApiResult<HttpResponse> {
    let AccountRequest {
        name,
        email,
        password,
    } = payload.into_inner();
    let request = SignupRequest::try_from_parts(&name, &email, &password)
        .map_err(|err| invalid_payload(&err))?;
    let user = state.registration.sign_up(&request).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// Replace the password of the account matching name and email.
#[utoipa::path(
    post,
    path = "/api/v1/password-reset",
    request_body = AccountRequest,
    responses(
        (status = 204, description = "Password replaced"),
        (status = 400, description = "Invalid request or unknown name/email", body = Error),
        (status = 409, description = "Account changed concurrently", body = Error),
        (status = 503, description = "Credential store unavailable", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "resetPassword",
    security([])
)]
#[post("/password-reset")]
pub async fn reset_password(
    state: web::Data<HttpState>,
    payload: web::Json<AccountRequest>,
) -> ApiResult<HttpResponse> {
    let AccountRequest {
        name,
        email,
        password,
    } = payload.into_inner();
    let request = PasswordResetRequest::try_from_parts(&name, &email, &password)
        .map_err(|err| invalid_payload(&err))?;
    state.password_reset.reset_password(&request).await?;
    Ok(HttpResponse::NoContent().finish())
}
