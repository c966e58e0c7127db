//! Requester identity.
//!
//! Authentication itself happens upstream (gateway / identity provider); it
//! forwards the verified user id in the `X-User-Id` header. Ownership checks
//! are plain string equality against that id.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated user making the request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Requester(pub String);

impl Requester {
    pub fn id(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Requester
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| Requester(v.to_string()))
            .ok_or(AppError::Unauthenticated)
    }
}
