use crate::error::AppError;
use crate::services::auth::access_jwt::AccessClaims;
use crate::services::auth::jwt::JwtIssuer;

#[derive(Clone)]
pub struct TokenIssuer {
    jwt: JwtIssuer,
}

impl TokenIssuer {
    pub fn new(jwt: JwtIssuer) -> Self {
        Self { jwt }
    }

    /// Issue an access token for `email`.
    ///
    /// The only place an identity is minted. Called after the user record was upserted.
    pub fn issue_access_token(&self, email: &str) -> Result<String, AppError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::bad_request("email is required"));
        }

        let now = chrono::Utc::now().timestamp();
        let exp = i64::try_from(self.jwt.ttl_seconds())
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .ok_or_else(|| {
                tracing::error!(ttl = self.jwt.ttl_seconds(), "token expiry out of range");
                AppError::Internal
            })?;

        let claims = AccessClaims {
            email: email.to_string(),
            iat: now,
            exp,
        };

        self.jwt.sign(&claims)
    }

    pub fn access_token_ttl_seconds(&self) -> u64 {
        self.jwt.ttl_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::access_jwt::AccessTokenVerifier;

    fn issuer(secret: &str) -> TokenIssuer {
        TokenIssuer::new(JwtIssuer::new(secret, 600))
    }

    #[test]
    fn issued_token_verifies_to_same_identity() {
        let verifier = AccessTokenVerifier::new("s3cret", 0);
        let issuer = issuer("s3cret");

        let first = issuer.issue_access_token("a@x.com").unwrap();
        let second = issuer.issue_access_token("a@x.com").unwrap();

        let a = verifier.verify_verified(&first).unwrap();
        let b = verifier.verify_verified(&second).unwrap();
        assert_eq!(a.identity, b.identity);
        assert_eq!(a.identity.as_str(), "a@x.com");
    }

    #[test]
    fn issued_token_carries_expiry() {
        let verifier = AccessTokenVerifier::new("s3cret", 0);
        let token = issuer("s3cret").issue_access_token("a@x.com").unwrap();

        let claims = verifier.verify(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 600);
    }

    #[test]
    fn unrepresentable_expiry_is_an_error() {
        let issuer = TokenIssuer::new(JwtIssuer::new("s3cret", u64::MAX));
        assert!(matches!(
            issuer.issue_access_token("a@x.com"),
            Err(AppError::Internal)
        ));
    }

    #[test]
    fn blank_identity_is_not_issued() {
        assert!(matches!(
            issuer("s3cret").issue_access_token("  "),
            Err(AppError::BadRequest(_))
        ));
    }
}
