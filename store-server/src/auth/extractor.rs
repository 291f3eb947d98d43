//! Caller identity extractors
//!
//! The upstream auth layer authenticates the session and forwards the caller
//! id in a header; these extractors turn it into an [`Actor`].

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::error::ErrorCode;
use shared::order::Actor;

use crate::security_log;
use crate::utils::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const ADMIN_ID_HEADER: &str = "x-admin-id";

fn header_id(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Signed-in customer
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentCustomer(pub String);

impl CurrentCustomer {
    pub fn user_id(&self) -> &str {
        &self.0
    }

    pub fn actor(&self) -> Actor {
        Actor::customer(self.0.clone())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentCustomer {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match header_id(parts, USER_ID_HEADER) {
            Some(user_id) => Ok(Self(user_id)),
            None => {
                security_log!("WARN", "auth_missing", uri = format!("{:?}", parts.uri));
                Err(AppError::not_authenticated())
            }
        }
    }
}

/// Signed-in admin
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentAdmin(pub String);

impl CurrentAdmin {
    pub fn actor(&self) -> Actor {
        Actor::admin(self.0.clone())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(admin_id) = header_id(parts, ADMIN_ID_HEADER) {
            return Ok(Self(admin_id));
        }
        if let Some(user_id) = header_id(parts, USER_ID_HEADER) {
            security_log!(
                "WARN",
                "admin_required",
                user_id = user_id,
                uri = format!("{:?}", parts.uri)
            );
            return Err(AppError::new(ErrorCode::AdminRequired));
        }
        security_log!("WARN", "auth_missing", uri = format!("{:?}", parts.uri));
        Err(AppError::not_authenticated())
    }
}

/// Either caller; the admin header wins when both are present
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentActor(pub Actor);

impl<S: Send + Sync> FromRequestParts<S> for CurrentActor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(admin_id) = header_id(parts, ADMIN_ID_HEADER) {
            return Ok(Self(Actor::admin(admin_id)));
        }
        if let Some(user_id) = header_id(parts, USER_ID_HEADER) {
            return Ok(Self(Actor::customer(user_id)));
        }
        security_log!("WARN", "auth_missing", uri = format!("{:?}", parts.uri));
        Err(AppError::not_authenticated())
    }
}
