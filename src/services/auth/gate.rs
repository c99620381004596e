//! Authorization gate for identity-scoped operations.
//!
//! Pure decision: the caller-supplied (claimed) identity must equal the verified one,
//! byte for byte. A missing claim never matches.

use thiserror::Error;

use crate::services::auth::access_jwt::VerifiedIdentity;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("no claimed identity supplied")]
    MissingClaim,
    #[error("claimed identity supplied more than once")]
    AmbiguousClaim,
    #[error("claimed identity does not match the token")]
    Mismatch,
}

pub fn authorize(claimed: Option<&str>, verified: &VerifiedIdentity) -> Result<(), GateError> {
    match claimed {
        None => Err(GateError::MissingClaim),
        Some(claimed) if claimed == verified.as_str() => Ok(()),
        Some(_) => Err(GateError::Mismatch),
    }
}
