//! Caller identity forwarded by the authenticating proxy.

use axum::{extract::FromRequestParts, http::request::Parts};
use turnover_core::domain::access::Actor;
use turnover_model::UserId;
use uuid::Uuid;

use crate::infra::errors::AppError;

pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";
pub const ACTOR_ID_HEADER: &str = "x-actor-id";

/// The [`Actor`] named by the `x-actor-role` / `x-actor-id` headers.
#[derive(Debug, Clone, Copy)]
pub struct RequestActor(pub Actor);

impl<S> FromRequestParts<S> for RequestActor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let role = header(parts, ACTOR_ROLE_HEADER)
            .ok_or_else(|| AppError::unauthorized("missing x-actor-role header"))?;
        let id = header(parts, ACTOR_ID_HEADER)
            .ok_or_else(|| AppError::unauthorized("missing x-actor-id header"))?;
        let id = Uuid::parse_str(id)
            .map(UserId)
            .map_err(|_| AppError::bad_request("x-actor-id must be a UUID"))?;

        let actor = match role.to_ascii_lowercase().as_str() {
            "admin" => Actor::Admin { id },
            "owner" => Actor::Owner { id },
            other => {
                return Err(AppError::bad_request(format!(
                    "unknown actor role '{other}'"
                )));
            }
        };
        Ok(RequestActor(actor))
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
