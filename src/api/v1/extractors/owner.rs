/*
 * Responsibility
 * - identity-scoped な操作のための extractor
 * - claimed identity (query `email` → header `email` の順) と検証済み identity を gate で比較
 * - handler の引数に `Owner` があれば、persistence に触る前に gate を通過済み
 */
use axum::{extract::FromRequestParts, http::request::Parts};
use url::form_urlencoded;

use crate::error::AppError;
use crate::services::auth::{VerifiedIdentity, gate, gate::GateError};

use super::AuthCtx;

const CLAIM_FIELD: &str = "email";

/// The caller's identity, proven equal to the one claimed in the request.
#[derive(Debug, Clone)]
pub struct Owner(pub VerifiedIdentity);

impl Owner {
    pub fn email(&self) -> &str {
        self.0.as_str()
    }
}

/// Claimed identity: the `email` query parameter, or the `email` header when the query has none.
///
/// A query carrying `email` more than once is rejected rather than resolved.
fn claimed_identity(parts: &Parts) -> Result<Option<String>, GateError> {
    let mut from_query = form_urlencoded::parse(parts.uri.query().unwrap_or_default().as_bytes())
        .filter(|(key, _)| key == CLAIM_FIELD)
        .map(|(_, value)| value.into_owned());

    match (from_query.next(), from_query.next()) {
        (Some(_), Some(_)) => Err(GateError::AmbiguousClaim),
        (Some(value), None) => Ok(Some(value)),
        (None, _) => Ok(parts
            .headers
            .get(CLAIM_FIELD)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)),
    }
}

impl<S> FromRequestParts<S> for Owner
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts
            .extensions
            .get::<AuthCtx>()
            .cloned()
            .ok_or(AppError::Unauthenticated)?;

        let claimed = claimed_identity(parts)?;
        gate::authorize(claimed.as_deref(), &ctx.identity)?;

        Ok(Owner(ctx.identity))
    }
}
