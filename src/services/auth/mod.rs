pub mod access_jwt;
pub mod factory;
pub mod gate;
pub mod jwt;
pub mod token_issuer;

use std::fmt;

pub use access_jwt::{AccessTokenVerifier, VerifiedAccessToken, VerifiedIdentity};
pub use factory::build_auth_service;
pub use token_issuer::TokenIssuer;

/// Verifier + issuer sharing one secret. Built once at startup, shared via `Arc`.
#[derive(Clone)]
pub struct AuthService {
    verifier: AccessTokenVerifier,
    issuer: TokenIssuer,
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService")
            .field("verifier", &self.verifier)
            .field("ttl_seconds", &self.issuer.access_token_ttl_seconds())
            .finish()
    }
}

impl AuthService {
    pub fn new(verifier: AccessTokenVerifier, issuer: TokenIssuer) -> Self {
        Self { verifier, issuer }
    }

    pub fn verifier(&self) -> &AccessTokenVerifier {
        &self.verifier
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }
}
