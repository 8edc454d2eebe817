use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::UserIdentity;
use crate::config::Config;

/// Claims embedded in the session token stored in the session cookie.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user ID as a UUID string.
    pub sub: String,
    pub email: String,
    /// `"user"` or `"admin"` at the time the token was issued.
    pub role: String,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued-at time (Unix timestamp).
    pub iat: i64,
    pub jti: String,
}

impl Claims {
    /// Parse the subject back into a user id.
    ///
    /// # Errors
    ///
    /// Returns an error if `sub` is not a UUID.
    pub fn user_id(&self) -> anyhow::Result<Uuid> {
        self.sub
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid token subject: {e}"))
    }
}

/// Issue a session token for `identity`, valid for `config.session_ttl_secs`.
///
/// # Errors
///
/// Returns an error if JWT encoding fails.
pub fn issue_session_token(identity: &UserIdentity, config: &Config) -> anyhow::Result<String> {
    let now = Utc::now().timestamp();
    let ttl = i64::try_from(config.session_ttl_secs).unwrap_or(i64::MAX / 2);

    let claims = Claims {
        sub: identity.id.to_string(),
        email: identity.email.clone(),
        role: identity.role.as_str().to_string(),
        exp: now.saturating_add(ttl),
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    encode(&Header::default(), &claims, &key)
        .map_err(|e| anyhow::anyhow!("Failed to encode session token: {e}"))
}

/// Validate a session token and return its claims.
///
/// # Errors
///
/// Returns an error if the token is malformed, signed with another key, or expired.
pub fn validate_session_token(token: &str, secret: &str) -> anyhow::Result<Claims> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &key, &Validation::default())
        .map_err(|e| anyhow::anyhow!("Invalid session token: {e}"))?;
    Ok(token_data.claims)
}

/// Claims for OAuth CSRF state tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct OAuthStateClaims {
    pub csrf: String,
    /// Provider the flow was started for; a callback for another provider is rejected.
    pub provider: String,
    pub redirect_uri: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

/// Generate a short-lived JWT for OAuth CSRF state (10 minutes).
///
/// # Errors
///
/// Returns an error if JWT encoding fails.
pub fn generate_oauth_state(
    secret: &str,
    provider: &str,
    redirect_uri: Option<&str>,
) -> anyhow::Result<String> {
    let now = Utc::now().timestamp();

    let claims = OAuthStateClaims {
        csrf: Uuid::new_v4().to_string(),
        provider: provider.to_string(),
        redirect_uri: redirect_uri.map(String::from),
        exp: now + 600,
        iat: now,
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key)
        .map_err(|e| anyhow::anyhow!("Failed to encode OAuth state: {e}"))
}

/// Validate an OAuth CSRF state token issued for `provider`.
///
/// # Errors
///
/// Returns an error if the state token is invalid, expired, or belongs to another provider.
pub fn validate_oauth_state(
    state: &str,
    secret: &str,
    provider: &str,
) -> anyhow::Result<OAuthStateClaims> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<OAuthStateClaims>(state, &key, &Validation::default())
        .map_err(|e| anyhow::anyhow!("Invalid OAuth state: {e}"))?;

    if token_data.claims.provider != provider {
        return Err(anyhow::anyhow!("OAuth state was issued for another provider"));
    }

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use crate::entities::Role;

    const SECRET: &str = "test-secret-key-for-testing-only-32chars";

    fn config() -> Config {
        Config {
            database_url: String::new(),
            server_host: std::net::IpAddr::from([127, 0, 0, 1]),
            server_port: 0,
            environment: Environment::Development,
            log_level: "warn".to_string(),
            jwt_secret: SECRET.to_string(),
            session_ttl_secs: 3600,
            google_client_id: String::new(),
            google_client_secret: String::new(),
            google_redirect_uri: String::new(),
            github_client_id: String::new(),
            github_client_secret: String::new(),
            github_redirect_uri: String::new(),
            frontend_url: String::new(),
            upload_dir: String::new(),
        }
    }

    fn identity() -> UserIdentity {
        UserIdentity {
            id: Uuid::new_v4(),
            email: "kari@example.com".to_string(),
            role: Role::Admin,
        }
    }

    #[test]
    fn session_token_carries_identity() {
        let who = identity();
        let token = issue_session_token(&who, &config()).unwrap_or_default();
        let claims = validate_session_token(&token, SECRET);

        assert!(claims.is_ok());
        if let Ok(claims) = claims {
            assert_eq!(claims.user_id().ok(), Some(who.id));
            assert_eq!(claims.email, "kari@example.com");
            assert_eq!(claims.role, "admin");
            assert_eq!(claims.exp - claims.iat, 3600);
        }
    }

    #[test]
    fn session_token_rejects_wrong_secret() {
        let token = issue_session_token(&identity(), &config()).unwrap_or_default();
        assert!(validate_session_token(&token, "another-secret").is_err());
    }

    #[test]
    fn oauth_state_is_bound_to_provider() {
        let state =
            generate_oauth_state(SECRET, "google", Some("http://localhost/cb")).unwrap_or_default();

        let claims = validate_oauth_state(&state, SECRET, "google");
        assert!(claims.is_ok());
        if let Ok(claims) = claims {
            assert_eq!(claims.redirect_uri.as_deref(), Some("http://localhost/cb"));
        }
        assert!(validate_oauth_state(&state, SECRET, "github").is_err());
    }
}
