use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;
use tracing::error;

use crate::error::AppError;

#[derive(Clone)]
pub struct JwtIssuer {
    ttl_seconds: u64,
    encoding_key: EncodingKey,
}

impl JwtIssuer {
    /// `secret` is the shared HS256 secret also used by the verifier.
    pub fn new(secret: &str, ttl_seconds: u64) -> Self {
        Self {
            ttl_seconds,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    pub fn sign<T: Serialize>(&self, claims: &T) -> Result<String, AppError> {
        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign JWT");
            AppError::Internal
        })
    }
}
