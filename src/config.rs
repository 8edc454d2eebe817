use std::net::{IpAddr, SocketAddr};

/// Secret used for session tokens when `JWT_SECRET` is unset outside production.
const DEV_JWT_SECRET: &str = "studio-api-development-secret-do-not-deploy";

/// Thirty days.
const DEFAULT_SESSION_TTL_SECS: u64 = 2_592_000;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: IpAddr,
    pub server_port: u16,
    pub environment: Environment,
    pub log_level: String,
    pub jwt_secret: String,
    pub session_ttl_secs: u64,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_redirect_uri: String,
    pub github_client_id: String,
    pub github_client_secret: String,
    pub github_redirect_uri: String,
    pub frontend_url: String,
    pub upload_dir: String,
}

/// Deployment environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required: `DATABASE_URL`, and `JWT_SECRET` when `ENVIRONMENT=production`.
    /// Optional with defaults: `SERVER_HOST`, `SERVER_PORT`, `ENVIRONMENT`, `LOG_LEVEL`,
    /// `SESSION_TTL_SECS`, `FRONTEND_URL`, `UPLOAD_DIR`, and the `GOOGLE_*` / `GITHUB_*`
    /// OAuth credentials (an empty client id disables that provider).
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a numeric/IP value is malformed.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let environment = match std::env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string())
            .as_str()
        {
            "production" => Environment::Production,
            "staging" => Environment::Staging,
            _ => Environment::Development,
        };

        let server_port = std::env::var("PORT")
            .or_else(|_| std::env::var("SERVER_PORT"))
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| anyhow::anyhow!("SERVER_PORT / PORT must be a valid u16"))?;

        let default_host = if environment == Environment::Production {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        };

        let server_host = std::env::var("SERVER_HOST")
            .unwrap_or_else(|_| default_host.to_string())
            .parse::<IpAddr>()
            .map_err(|_| anyhow::anyhow!("SERVER_HOST must be a valid IP address"))?;

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if environment == Environment::Production => {
                return Err(anyhow::anyhow!("JWT_SECRET must be set in production"));
            }
            _ => DEV_JWT_SECRET.to_string(),
        };

        let session_ttl_secs = match std::env::var("SESSION_TTL_SECS") {
            Ok(v) => v
                .parse::<u64>()
                .map_err(|_| anyhow::anyhow!("SESSION_TTL_SECS must be a positive integer"))?,
            Err(_) => DEFAULT_SESSION_TTL_SECS,
        };

        let var_or_empty = |key: &str| std::env::var(key).unwrap_or_default();

        Ok(Self {
            database_url,
            server_host,
            server_port,
            environment,
            log_level,
            jwt_secret,
            session_ttl_secs,
            google_client_id: var_or_empty("GOOGLE_CLIENT_ID"),
            google_client_secret: var_or_empty("GOOGLE_CLIENT_SECRET"),
            google_redirect_uri: var_or_empty("GOOGLE_REDIRECT_URI"),
            github_client_id: var_or_empty("GITHUB_CLIENT_ID"),
            github_client_secret: var_or_empty("GITHUB_CLIENT_SECRET"),
            github_redirect_uri: var_or_empty("GITHUB_REDIRECT_URI"),
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3001".to_string()),
            upload_dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
        })
    }

    /// Build the socket address for the server to bind to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server_host, self.server_port)
    }

    /// Whether the session token was signed with the built-in development secret.
    #[must_use]
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    /// Session cookies carry the `Secure` attribute outside development.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.environment != Environment::Development
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(environment: Environment) -> Config {
        Config {
            database_url: String::new(),
            server_host: IpAddr::from([127, 0, 0, 1]),
            server_port: 3000,
            environment,
            log_level: "info".to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
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

    #[test]
    fn test_socket_addr() {
        let addr = config(Environment::Development).socket_addr();
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn secure_cookies_only_outside_development() {
        assert!(!config(Environment::Development).secure_cookies());
        assert!(config(Environment::Staging).secure_cookies());
        assert!(config(Environment::Production).secure_cookies());
    }

    #[test]
    fn detects_dev_secret() {
        let mut cfg = config(Environment::Development);
        assert!(cfg.uses_dev_secret());
        cfg.jwt_secret = "something-else".to_string();
        assert!(!cfg.uses_dev_secret());
    }
}
