use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub secret: String,
    pub token_ttl_hours: i64,
    /// Role assigned to newly registered users: "admin" or "user".
    pub registration_role: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;

        let registration_role =
            std::env::var("AUTH_REGISTRATION_ROLE").unwrap_or_else(|_| "admin".into());
        anyhow::ensure!(
            matches!(registration_role.as_str(), "admin" | "user"),
            "AUTH_REGISTRATION_ROLE must be \"admin\" or \"user\", got {registration_role:?}"
        );

        let auth = AuthConfig {
            secret: std::env::var("AUTH_SECRET").context("AUTH_SECRET is not set")?,
            token_ttl_hours: std::env::var("AUTH_TOKEN_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(24),
            registration_role,
        };

        Ok(Self { database_url, auth })
    }
}
