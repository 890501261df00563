use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

/// Claim distinguishing access from refresh credentials.
///
/// Wire names are part of the token format: a token minted for refresh can
/// never pass an access check and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenScope {
    #[serde(rename = "access_token")]
    Access,
    #[serde(rename = "refresh_token")]
    Refresh,
}

/// Claims carried by access and refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
    scope: TokenScope,
}

/// Claims carried by one-shot email-confirmation tokens (scope-less).
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EmailClaims {
    sub: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token signature or format is invalid")]
    BadSignature,

    #[error("token presented with the wrong scope")]
    WrongScope,

    #[error("refresh token reuse detected")]
    ReuseDetected,

    #[error("token signing failed: {0}")]
    Signing(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenConfigError {
    #[error("signing secret must not be empty")]
    EmptySecret,

    #[error("unsupported signing algorithm '{0}' (expected HS256, HS384 or HS512)")]
    UnsupportedAlgorithm(String),
}

/// Signing configuration injected at construction.
///
/// There is deliberately no process-global signing state: every
/// [`TokenService`] owns exactly the secret and lifetimes it was built with.
pub struct TokenConfig {
    secret: Zeroizing<String>,
    algorithm: Algorithm,
    access_ttl: Duration,
    refresh_ttl: Duration,
    email_ttl: Duration,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("algorithm", &self.algorithm)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("email_ttl", &self.email_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenConfig {
    pub const DEFAULT_ACCESS_TTL_SECS: i64 = 3_600;
    pub const DEFAULT_REFRESH_TTL_SECS: i64 = 604_800;
    pub const DEFAULT_EMAIL_TTL_SECS: i64 = 86_400;

    /// Build a configuration from loosely-typed parts, as they arrive from a
    /// settings file. `None` lifetimes take the defaults above.
    pub fn from_parts(
        secret: &str,
        algorithm: &str,
        access_ttl: Option<std::time::Duration>,
        refresh_ttl: Option<std::time::Duration>,
        email_ttl: Option<std::time::Duration>,
    ) -> Result<Self, TokenConfigError> {
        if secret.is_empty() {
            return Err(TokenConfigError::EmptySecret);
        }
        let algorithm = match algorithm {
            "HS256" => Algorithm::HS256,
            "HS384" => Algorithm::HS384,
            "HS512" => Algorithm::HS512,
            other => return Err(TokenConfigError::UnsupportedAlgorithm(other.to_string())),
        };

        let to_chrono = |ttl: Option<std::time::Duration>, default_secs: i64| {
            ttl.and_then(|d| Duration::from_std(d).ok())
                .unwrap_or_else(|| Duration::seconds(default_secs))
        };

        Ok(Self {
            secret: Zeroizing::new(secret.to_string()),
            algorithm,
            access_ttl: to_chrono(access_ttl, Self::DEFAULT_ACCESS_TTL_SECS),
            refresh_ttl: to_chrono(refresh_ttl, Self::DEFAULT_REFRESH_TTL_SECS),
            email_ttl: to_chrono(email_ttl, Self::DEFAULT_EMAIL_TTL_SECS),
        })
    }
}

/// Issues and verifies the three token kinds.
///
/// Verification is pure CPU work; every failure is a typed value the caller
/// must branch on, never a panic.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    access_ttl: Duration,
    refresh_ttl: Duration,
    email_ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.algorithm)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("email_ttl", &self.email_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Consumes the configuration; the raw secret is wiped once the derived
    /// keys exist.
    pub fn new(config: TokenConfig) -> Self {
        let encoding = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            encoding,
            decoding,
            algorithm: config.algorithm,
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
            email_ttl: config.email_ttl,
        }
    }

    /// Issue an access token for `subject`, optionally overriding the
    /// configured lifetime.
    pub fn issue_access_token(
        &self,
        subject: &str,
        ttl: Option<Duration>,
    ) -> Result<String, TokenError> {
        self.issue_scoped(subject, TokenScope::Access, ttl.unwrap_or(self.access_ttl))
    }

    /// Issue a refresh token for `subject`.
    pub fn issue_refresh_token(
        &self,
        subject: &str,
        ttl: Option<Duration>,
    ) -> Result<String, TokenError> {
        self.issue_scoped(subject, TokenScope::Refresh, ttl.unwrap_or(self.refresh_ttl))
    }

    /// Verify an access token and return its subject.
    pub fn verify_access_token(&self, token: &str) -> Result<String, TokenError> {
        self.decode_scoped(token, TokenScope::Access)
    }

    /// Decode a refresh token and return its subject.
    ///
    /// This only checks signature, expiry and scope; whether the token is
    /// still the live one for the account is the auth service's business.
    pub fn decode_refresh_token(&self, token: &str) -> Result<String, TokenError> {
        self.decode_scoped(token, TokenScope::Refresh)
    }

    /// Issue a one-shot email-confirmation token.
    pub fn issue_email_token(&self, subject: &str) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = EmailClaims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + self.email_ttl).timestamp(),
        };
        encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(|err| TokenError::Signing(err.to_string()))
    }

    /// Decode an email-confirmation token and return its subject.
    pub fn decode_email_token(&self, token: &str) -> Result<String, TokenError> {
        let data = decode::<EmailClaims>(token, &self.decoding, &self.validation())
            .map_err(map_decode_error)?;
        Ok(data.claims.sub)
    }

    fn issue_scoped(
        &self,
        subject: &str,
        scope: TokenScope,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            scope,
        };
        encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(|err| TokenError::Signing(err.to_string()))
    }

    fn decode_scoped(&self, token: &str, expected: TokenScope) -> Result<String, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation())
            .map_err(map_decode_error)?;
        if data.claims.scope != expected {
            return Err(TokenError::WrongScope);
        }
        Ok(data.claims.sub)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is an exact bound here, not a fuzzy one.
        validation.leeway = 0;
        validation
    }
}

fn map_decode_error(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::BadSignature,
    }
}
