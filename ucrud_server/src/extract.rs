use crate::response::ApiError;
use crate::state::AppState;
use async_trait::async_trait;
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use ucrud_core::Error;
use ucrud_core::models::User;

/// The user named by a valid `Authorization: Bearer` token
#[derive(Clone, Debug)]
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::Unauthorized("Access token required".to_string()))?;

        let identity = state.authenticator.verify_token(token)?;
        let user = state
            .users
            .find_by_id(identity.user_id)
            .await?
            .ok_or_else(|| Error::Unauthorized("User not found".to_string()))?;
        Ok(Self(user))
    }
}

/// An authenticated user holding the admin role
#[derive(Clone, Debug)]
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(Error::Forbidden("Insufficient permissions".to_string()).into());
        }
        Ok(Self(user))
    }
}

/// [`Json`] with rejections reported as validation failures
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(request, state)
            .await
            .map_err(|rejection: JsonRejection| Error::Validation(vec![rejection.body_text()]))?;
        Ok(Self(value))
    }
}

/// [`Query`] with rejections reported as validation failures
#[derive(Debug)]
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: QueryRejection| Error::Validation(vec![rejection.body_text()]))?;
        Ok(Self(value))
    }
}

/// Parse a positive identifier from a path segment
///
/// # Errors
/// * [`Validation`](Error::Validation) if the segment is not a positive integer
pub fn parse_id(segment: &str, resource: &str) -> Result<i64, ApiError> {
    segment
        .parse::<i64>()
        .ok()
        .filter(|id| *id >= 1)
        .ok_or_else(|| Error::Validation(vec![format!("Invalid {resource} ID")]).into())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert!(matches!(parse_id("42", "product"), Ok(42)));
        assert!(parse_id("0", "product").is_err());
        assert!(parse_id("-3", "product").is_err());
        assert!(parse_id("abc", "category").is_err());
    }

    #[test]
    fn test_parse_id_message() {
        let Err(ApiError(Error::Validation(messages))) = parse_id("abc", "category") else {
            panic!("expected validation error");
        };
        assert_eq!(messages, vec!["Invalid category ID"]);
    }
}
