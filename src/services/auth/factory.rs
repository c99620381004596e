/// Factory: build `AuthService` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{AccessTokenVerifier, AuthService, TokenIssuer, jwt::JwtIssuer};

pub fn build_auth_service(config: &Config) -> Arc<AuthService> {
    let verifier = AccessTokenVerifier::new(
        &config.access_token_secret,
        config.access_token_leeway_seconds,
    );
    let issuer = TokenIssuer::new(JwtIssuer::new(
        &config.access_token_secret,
        config.access_token_ttl_seconds,
    ));

    Arc::new(AuthService::new(verifier, issuer))
}
