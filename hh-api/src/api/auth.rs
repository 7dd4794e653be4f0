//! Bearer token authentication for hh-api
//!
//! Handlers opt in by taking an extractor:
//! - [`AuthUser`] requires a valid `Authorization: Bearer <jwt>` header
//! - [`MaybeUser`] accepts guests, but a header that is present must be valid
//!
//! Both load the user row, so a token for a deleted account is rejected.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use hh_common::auth::{verify_token, TokenError};
use hh_common::db::User;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::{db, AppState};

/// The authenticated caller
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// The caller if a token was sent, `None` for guests
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        match bearer_token(parts)? {
            Some(token) => authenticate(&state, &token).await.map(AuthUser),
            None => {
                debug!("Rejected request without token: {}", parts.uri.path());
                Err(unauthorized())
            }
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        match bearer_token(parts)? {
            Some(token) => Ok(MaybeUser(Some(authenticate(&state, &token).await?))),
            None => Ok(MaybeUser(None)),
        }
    }
}

fn unauthorized() -> ApiError {
    ApiError::Unauthorized("Unauthorized".to_string())
}

/// Token from the Authorization header
///
/// `Ok(None)` when the header is absent; an error when it is present but not
/// a bearer token.
fn bearer_token(parts: &Parts) -> Result<Option<String>, ApiError> {
    let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value.to_str().map_err(|_| unauthorized())?;
    let (scheme, token) = value.trim().split_once(' ').ok_or_else(unauthorized)?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        warn!("Rejected malformed Authorization header");
        return Err(unauthorized());
    }

    Ok(Some(token.to_string()))
}

async fn authenticate(state: &AppState, token: &str) -> Result<User, ApiError> {
    let claims = verify_token(token, &state.jwt_secret).map_err(|e| {
        match &e {
            TokenError::Expired => debug!("Rejected expired token"),
            TokenError::Invalid(reason) => warn!("Rejected token: {}", reason),
        }
        unauthorized()
    })?;

    let user_id = claims.user_id().ok_or_else(|| {
        warn!("Token subject is not a user id: {}", claims.sub);
        unauthorized()
    })?;

    db::users::find_user_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| {
            warn!("Token for unknown user {}", user_id);
            unauthorized()
        })
}
