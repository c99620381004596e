use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::{error::Error as StdError, fmt};

// Errors returned by access-token verification + strict claim validation.
#[derive(Debug)]
pub enum AccessJwtError {
    Jwt(jsonwebtoken::errors::Error),
    EmptyClaim(&'static str),
}

impl fmt::Display for AccessJwtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jwt(e) => write!(f, "jwt verification failed: {}", e),
            Self::EmptyClaim(name) => write!(f, "empty '{}' claim", name),
        }
    }
}

impl StdError for AccessJwtError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Jwt(e) => Some(e),
            _ => None,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AccessJwtError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        Self::Jwt(e)
    }
}

/// Access token (JWT) claims.
///
/// - `email` is the identity claim. It is the only identity this service understands.
/// - `exp` is mandatory; tokens without it are rejected.
/// - `iat` is informational.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Identity recovered from a valid bearer token. Lives for one request only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity(String);

impl VerifiedIdentity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VerifiedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the verifier hands to the rest of the request.
#[derive(Debug, Clone)]
pub struct VerifiedAccessToken {
    pub identity: VerifiedIdentity,
    pub expires_at: i64,
}

/// Pull the token out of an `Authorization` header value.
///
/// The token is the header value with an optional, case-insensitive `Bearer ` scheme removed.
/// Returns `None` when nothing usable is present (absent or blank header).
pub fn bearer_token(header_value: Option<&str>) -> Option<&str> {
    let raw = header_value?.trim();

    let token = match raw.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ => raw,
    };

    if token.is_empty() || token.eq_ignore_ascii_case("bearer") {
        None
    } else {
        Some(token)
    }
}

/// HS256 access-token verifier (shared secret).
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct AccessTokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for AccessTokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("AccessTokenVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl AccessTokenVerifier {
    pub fn new(secret: &str, leeway_seconds: u64) -> Self {
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        validation.validate_exp = true;
        validation.leeway = leeway_seconds;

        Self {
            decoding_key,
            validation,
        }
    }

    // Verify and decode a JWT access token (signature + exp).
    pub fn verify(&self, token: &str) -> Result<AccessClaims, jsonwebtoken::errors::Error> {
        let data = jsonwebtoken::decode::<AccessClaims>(token, &self.decoding_key, &self.validation)?;

        Ok(data.claims)
    }

    /// Verify, then require a usable identity claim.
    ///
    /// This is the entry-point for the access middleware.
    pub fn verify_verified(&self, token: &str) -> Result<VerifiedAccessToken, AccessJwtError> {
        let claims = self.verify(token)?;

        // blank claims are rejected, but the identity is kept exactly as signed
        if claims.email.trim().is_empty() {
            return Err(AccessJwtError::EmptyClaim("email"));
        }

        Ok(VerifiedAccessToken {
            identity: VerifiedIdentity(claims.email),
            expires_at: claims.exp,
        })
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header};
    use serde::Serialize;

    use super::*;

    const SECRET: &str = "test-secret";

    fn sign<T: Serialize>(claims: &T, secret: &str) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims_for(email: &str, exp_offset: i64) -> AccessClaims {
        let now = chrono::Utc::now().timestamp();
        AccessClaims {
            email: email.to_string(),
            iat: now,
            exp: now + exp_offset,
        }
    }

    #[test]
    fn bearer_scheme_is_optional() {
        assert_eq!(bearer_token(Some("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(Some("bearer   abc")), Some("abc"));
        assert_eq!(bearer_token(Some("abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(Some("  abc  ")), Some("abc"));
    }

    #[test]
    fn blank_or_missing_header_has_no_token() {
        assert_eq!(bearer_token(None), None);
        assert_eq!(bearer_token(Some("")), None);
        assert_eq!(bearer_token(Some("   ")), None);
        assert_eq!(bearer_token(Some("Bearer")), None);
        assert_eq!(bearer_token(Some("Bearer   ")), None);
    }

    #[test]
    fn valid_token_yields_identity() {
        let verifier = AccessTokenVerifier::new(SECRET, 0);
        let claims = claims_for("a@x.com", 600);
        let token = sign(&claims, SECRET);

        let verified = verifier.verify_verified(&token).unwrap();
        assert_eq!(verified.identity.as_str(), "a@x.com");
        assert_eq!(verified.expires_at, claims.exp);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let verifier = AccessTokenVerifier::new(SECRET, 0);
        let token = sign(&claims_for("a@x.com", 600), "another-secret");

        assert!(matches!(
            verifier.verify_verified(&token),
            Err(AccessJwtError::Jwt(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let verifier = AccessTokenVerifier::new(SECRET, 30);
        let token = sign(&claims_for("a@x.com", -3600), SECRET);

        assert!(verifier.verify_verified(&token).is_err());
    }

    #[test]
    fn token_without_exp_is_rejected() {
        #[derive(Serialize)]
        struct NoExp<'a> {
            email: &'a str,
        }

        let verifier = AccessTokenVerifier::new(SECRET, 0);
        let token = sign(&NoExp { email: "a@x.com" }, SECRET);

        assert!(verifier.verify_verified(&token).is_err());
    }

    #[test]
    fn empty_email_claim_is_rejected() {
        let verifier = AccessTokenVerifier::new(SECRET, 0);
        let token = sign(&claims_for("   ", 600), SECRET);

        assert!(matches!(
            verifier.verify_verified(&token),
            Err(AccessJwtError::EmptyClaim("email"))
        ));
    }

    #[test]
    fn identity_keeps_claim_verbatim() {
        let verifier = AccessTokenVerifier::new(SECRET, 0);
        let token = sign(&claims_for(" a@x.com ", 600), SECRET);

        let verified = verifier.verify_verified(&token).unwrap();
        assert_eq!(verified.identity.as_str(), " a@x.com ");
    }

    #[test]
    fn garbage_is_rejected() {
        let verifier = AccessTokenVerifier::new(SECRET, 0);
        assert!(verifier.verify_verified("not-a-jwt").is_err());
    }
}
