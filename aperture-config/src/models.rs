use std::time::Duration;

use aperture_core::auth::tokens::{TokenConfig, TokenConfigError};

/// Resolved settings for the token core.
#[derive(Debug, Clone)]
pub struct Settings {
    pub auth: AuthSettings,
}

/// Signing and lifetime settings, fully defaulted except the secret.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub jwt_algorithm: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub email_token_ttl: Duration,
}

impl AuthSettings {
    pub const DEFAULT_ALGORITHM: &'static str = "HS256";
    pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(3_600);
    pub const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(604_800);
    pub const DEFAULT_EMAIL_TTL: Duration = Duration::from_secs(86_400);

    /// Convert into the core's injected token configuration.
    pub fn token_config(&self) -> Result<TokenConfig, TokenConfigError> {
        TokenConfig::from_parts(
            &self.jwt_secret,
            &self.jwt_algorithm,
            Some(self.access_token_ttl),
            Some(self.refresh_token_ttl),
            Some(self.email_token_ttl),
        )
    }
}
