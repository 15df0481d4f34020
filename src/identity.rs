//! Participant identity from the `X-User` header.
//!
//! Authentication happens upstream; the proxy forwards the resolved user as
//! a small JSON object such as `{"id":42}`. Requests without a usable id are
//! turned away before any WebSocket upgrade.

use crate::games::battleship::PlayerId;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use derive_more::{Display, Error};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

/// Header carrying the authenticated user.
pub const USER_HEADER: &str = "X-User";

#[derive(Debug, Deserialize)]
struct UserHeader {
    id: i64,
}

/// Identity resolved from a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerIdentity(PlayerId);

impl PlayerIdentity {
    /// The resolved identity.
    pub fn id(&self) -> PlayerId {
        self.0
    }

    /// Reads the identity from request headers.
    ///
    /// # Errors
    ///
    /// [`IdentityRejection::Missing`] without the header,
    /// [`IdentityRejection::NotAnInteger`] if it carries no integer id.
    #[instrument(skip(headers))]
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, IdentityRejection> {
        let raw = headers.get(USER_HEADER).ok_or_else(|| {
            warn!("Request without user header");
            IdentityRejection::Missing
        })?;

        let user: UserHeader = raw
            .to_str()
            .ok()
            .and_then(|value| serde_json::from_str(value).ok())
            .ok_or_else(|| {
                warn!(header = ?raw, "User header has no integer id");
                IdentityRejection::NotAnInteger
            })?;

        debug!(player = user.id, "Identity resolved");
        Ok(Self(PlayerId::from(user.id)))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for PlayerIdentity {
    type Rejection = IdentityRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers)
    }
}

/// Why a request was refused an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum IdentityRejection {
    /// No `X-User` header.
    #[display("unauthorized request")]
    Missing,
    /// Header present but without an integer id.
    #[display("user ID is not an integer")]
    NotAnInteger,
}

impl IdentityRejection {
    /// HTTP status sent back for this rejection.
    pub fn status(&self) -> StatusCode {
        match self {
            IdentityRejection::Missing => StatusCode::UNAUTHORIZED,
            IdentityRejection::NotAnInteger => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for IdentityRejection {
    fn into_response(self) -> Response {
        (self.status(), format!("Error: {}", self)).into_response()
    }
}
