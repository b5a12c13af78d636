use crate::extract::{AuthUser, JsonBody};
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;
use axum::Router;
use axum::extract::State;
use axum::routing::{get, post};
use serde_json::json;
use tracing::info;
use ucrud_core::Error;
use ucrud_core::models::{Credentials, Registration};
use ucrud_core::validation::Validate;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/verify", get(verify))
}

async fn register(
    State(state): State<AppState>,
    JsonBody(registration): JsonBody<Registration>,
) -> ApiResult {
    let registration = registration.normalized();
    registration.validate()?;

    if state
        .users
        .exists(&registration.username, &registration.email)
        .await?
    {
        return Err(Error::Conflict(
            "User with this username or email already exists".to_string(),
        )
        .into());
    }

    let password_hash = state
        .authenticator
        .hash_password(&registration.password)
        .await?;
    let user = state.users.create(&registration, &password_hash).await?;
    let token = state
        .authenticator
        .issue_token(user.id, &user.username, &user.role)?;
    info!("registered user {}", user.username);

    Ok(ApiResponse::created(json!({ "user": user, "token": token }))
        .with_message("User registered successfully"))
}

async fn login(
    State(state): State<AppState>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> ApiResult {
    credentials.validate()?;

    let invalid = || Error::Unauthorized("Invalid credentials".to_string());
    let stored = state
        .users
        .find_by_login(credentials.username.trim())
        .await?
        .ok_or_else(invalid)?;
    if !state
        .authenticator
        .verify_password(&credentials.password, &stored.password_hash)
        .await?
    {
        return Err(invalid().into());
    }

    let user = stored.user;
    let token = state
        .authenticator
        .issue_token(user.id, &user.username, &user.role)?;

    Ok(ApiResponse::ok(json!({ "user": user, "token": token })).with_message("Login successful"))
}

async fn verify(AuthUser(user): AuthUser) -> ApiResult {
    Ok(ApiResponse::ok(json!({ "user": user })))
}
