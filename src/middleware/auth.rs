//! Caller identity extraction.
//!
//! Authentication itself lives in front of this service; a verified user id
//! arrives as the `x-user-id` header. These extractors only surface presence
//! or absence of that identity.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: String,
}

impl AuthUser {
    fn from_parts(parts: &Parts) -> Option<Self> {
        let id = parts
            .headers
            .get(USER_ID_HEADER)?
            .to_str()
            .ok()?
            .trim()
            .to_string();
        if id.is_empty() {
            return None;
        }
        Some(Self { id })
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        AuthUser::from_parts(parts).ok_or(AppError::Unauthorized)
    }
}

/// Optional identity for read paths: browsing without credentials is a valid,
/// non-exceptional state, so this never rejects.
pub struct OptionalAuthUser(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for OptionalAuthUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuthUser(AuthUser::from_parts(parts)))
    }
}
