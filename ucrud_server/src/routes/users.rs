use crate::extract::{AdminUser, AuthUser, JsonBody, QueryParams, parse_id};
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use serde_json::json;
use tracing::info;
use ucrud_core::Error;
use ucrud_core::models::{PasswordChange, User, UserChanges, UserQuery};
use ucrud_core::pagination::Pagination;
use ucrud_core::validation::Validate;

const RESOURCE: &str = "user";

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/me", get(me))
        .route("/:id", get(find).put(update).delete(delete))
        .route("/:id/change-password", post(change_password))
}

fn not_found() -> Error {
    Error::NotFound("User not found".to_string())
}

/// Admins may act on any user; everyone else only on themselves
fn check_owner_or_admin(user: &User, id: i64, action: &str) -> ApiResult<()> {
    if user.is_admin() || user.id == id {
        return Ok(());
    }
    Err(Error::Forbidden(format!("Access denied: You can only {action}")).into())
}

async fn list(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    QueryParams(query): QueryParams<UserQuery>,
) -> ApiResult {
    query.validate()?;

    let request = query.page_request();
    let (users, total) = state.users.list(&query.filter(), request).await?;
    let pagination = Pagination::new(request, total);

    Ok(ApiResponse::ok(
        json!({ "users": users, "pagination": pagination }),
    ))
}

async fn me(AuthUser(user): AuthUser) -> ApiResult {
    Ok(ApiResponse::ok(json!({ "user": user })))
}

async fn find(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult {
    let id = parse_id(&id, RESOURCE)?;
    check_owner_or_admin(&user, id, "view your own profile")?;

    let found = state.users.find_by_id(id).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::ok(json!({ "user": found })))
}

async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    JsonBody(changes): JsonBody<UserChanges>,
) -> ApiResult {
    let changes = changes.normalized();
    changes.validate()?;
    let id = parse_id(&id, RESOURCE)?;
    check_owner_or_admin(&user, id, "update your own profile")?;
    if !user.is_admin() && changes.role.is_some() {
        return Err(
            Error::Forbidden("Access denied: You cannot change your own role".to_string()).into(),
        );
    }
    if state.users.find_by_id(id).await?.is_none() {
        return Err(not_found().into());
    }

    if let Some(username) = &changes.username {
        if state.users.username_taken(username, id).await? {
            return Err(Error::Conflict("Username already exists".to_string()).into());
        }
    }
    if let Some(email) = &changes.email {
        if state.users.email_taken(email, id).await? {
            return Err(Error::Conflict("Email already exists".to_string()).into());
        }
    }

    state.users.update(id, &changes).await?;
    let updated = state.users.find_by_id(id).await?.ok_or_else(not_found)?;
    info!("user {} updated user {id}", user.username);

    Ok(ApiResponse::ok(json!({ "user": updated })).with_message("User updated successfully"))
}

async fn change_password(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    JsonBody(change): JsonBody<PasswordChange>,
) -> ApiResult {
    change.validate()?;
    let id = parse_id(&id, RESOURCE)?;
    check_owner_or_admin(&user, id, "change your own password")?;

    let password_hash = state.users.password_hash(id).await?.ok_or_else(not_found)?;
    // admins resetting another user's password skip the current password check
    if (!user.is_admin() || user.id == id)
        && !state
            .authenticator
            .verify_password(&change.current_password, &password_hash)
            .await?
    {
        return Err(Error::Unauthorized("Current password is incorrect".to_string()).into());
    }

    let password_hash = state
        .authenticator
        .hash_password(&change.new_password)
        .await?;
    state.users.set_password(id, &password_hash).await?;
    info!("user {} changed the password of user {id}", user.username);

    Ok(ApiResponse::message("Password changed successfully"))
}

async fn delete(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult {
    let id = parse_id(&id, RESOURCE)?;
    if admin.id == id {
        return Err(
            Error::Validation(vec!["You cannot delete your own account".to_string()]).into(),
        );
    }

    let deleted = state.users.find_by_id(id).await?.ok_or_else(not_found)?;
    state.users.delete(id).await?;
    info!("user {} deleted user {id}", admin.username);

    Ok(ApiResponse::ok(json!({ "deleted_user": deleted })).with_message("User deleted successfully"))
}
