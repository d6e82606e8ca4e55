//! Actor extraction
//!
//! The session collaborator (out of scope here) authenticates the browser
//! session and forwards the identity as `x-user-id` / `x-user-role`
//! headers. This extractor is the seam where it plugs in.

use axum::extract::FromRequestParts;
use http::request::Parts;
use shared::error::{StoreError, StoreResult};
use shared::models::{Actor, Role};

/// The acting identity behind the current request
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = StoreError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header_str(parts, "x-user-id")
            .ok_or_else(|| StoreError::forbidden("missing x-user-id header"))?;
        let role: Role = header_str(parts, "x-user-role")
            .and_then(|raw| raw.parse().ok())
            .ok_or_else(|| StoreError::forbidden("missing or invalid x-user-role header"))?;
        Ok(CurrentActor(Actor {
            id: id.to_string(),
            role,
        }))
    }
}

fn header_str<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
}

/// Reject non-admin actors
pub fn ensure_admin(actor: &Actor) -> StoreResult<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(StoreError::forbidden("admin role required"))
    }
}
