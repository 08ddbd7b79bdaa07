use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::auth::dto::TokenPair;
use crate::auth::repo::User;
use crate::config::AuthConfig;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims embedded in a signed token. Identity fields are a snapshot taken at
/// issuance; verification returns them as asserted, without consulting the
/// store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    pub kind: TokenKind,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl: Duration::hours(config.token_ttl_hours),
        }
    }

    fn sign_with_kind(&self, user: &User, kind: TokenKind) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + self.ttl;
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
            kind,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user.id, kind = ?kind, "token signed");
        Ok(token)
    }

    pub fn sign_access(&self, user: &User) -> anyhow::Result<String> {
        self.sign_with_kind(user, TokenKind::Access)
    }

    pub fn sign_refresh(&self, user: &User) -> anyhow::Result<String> {
        self.sign_with_kind(user, TokenKind::Refresh)
    }

    /// Issues a fresh access/refresh pair embedding the user's current
    /// email and role. Previously issued tokens stay valid until their own
    /// expiry; there is no revocation list.
    pub fn sign_pair(&self, user: &User) -> anyhow::Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.sign_access(user)?,
            refresh_token: self.sign_refresh(user)?,
        })
    }

    /// Checks signature, structure and expiry. Zero leeway: tokens are
    /// accepted up to and including `iat + ttl` and rejected past it.
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, kind = ?data.claims.kind, "token verified");
        Ok(data.claims)
    }

    pub fn verify_refresh(&self, token: &str) -> anyhow::Result<Claims> {
        let claims = self.verify(token)?;
        if claims.kind != TokenKind::Refresh {
            anyhow::bail!("not a refresh token");
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::User;

    fn test_config(secret: &str) -> AuthConfig {
        AuthConfig {
            secret: secret.into(),
            token_ttl_hours: 24,
            registration_role: "admin".into(),
        }
    }

    fn test_user() -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id: Uuid::new_v4(),
            email: "owner@example.com".into(),
            username: "owner".into(),
            password_hash: "unused".into(),
            role: "admin".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn sign_and_verify_round_trips_claims() {
        let keys = TokenKeys::from_config(&test_config("dev-secret"));
        let user = test_user();

        let token = keys.sign_access(&user).expect("sign access");
        let claims = keys.verify(&token).expect("verify");

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role, user.role);
        assert_eq!(claims.kind, TokenKind::Access);
    }

    #[test]
    fn expiry_window_matches_configured_ttl() {
        let keys = TokenKeys::from_config(&test_config("dev-secret"));
        let token = keys.sign_access(&test_user()).expect("sign access");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = TokenKeys::from_config(&test_config("dev-secret"));
        let user = test_user();
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let stale = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
            kind: TokenKind::Access,
            iat: (now - 25 * 60 * 60) as usize,
            exp: (now - 60 * 60) as usize,
        };
        let token = encode(&Header::default(), &stale, &keys.encoding).expect("encode");
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let good = TokenKeys::from_config(&test_config("secret-a"));
        let forged = TokenKeys::from_config(&test_config("secret-b"));
        let token = forged.sign_access(&test_user()).expect("sign access");
        assert!(good.verify(&token).is_err());
    }

    #[test]
    fn verify_refresh_rejects_access_tokens() {
        let keys = TokenKeys::from_config(&test_config("dev-secret"));
        let token = keys.sign_access(&test_user()).expect("sign access");
        let err = keys.verify_refresh(&token).unwrap_err();
        assert!(err.to_string().contains("not a refresh token"));
    }

    #[test]
    fn sign_pair_yields_distinct_access_and_refresh() {
        let keys = TokenKeys::from_config(&test_config("dev-secret"));
        let pair = keys.sign_pair(&test_user()).expect("sign pair");
        assert_ne!(pair.access_token, pair.refresh_token);
        let refresh = keys.verify_refresh(&pair.refresh_token).expect("verify refresh");
        assert_eq!(refresh.kind, TokenKind::Refresh);
    }
}
