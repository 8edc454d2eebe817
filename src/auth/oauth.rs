use oauth2::basic::{BasicErrorResponseType, BasicTokenType};
use oauth2::{
    AuthUrl, AuthorizationCode, Client, ClientId, ClientSecret, CsrfToken, EmptyExtraTokenFields,
    EndpointNotSet, EndpointSet, RedirectUrl, RevocationErrorResponseType, Scope,
    StandardErrorResponse, StandardRevocableToken, StandardTokenIntrospectionResponse,
    StandardTokenResponse, TokenResponse, TokenUrl,
};
use serde::Deserialize;

use crate::config::Config;

const USER_AGENT: &str = "studio-api";

/// Fully configured `OAuth2` client type (auth URI, token URI, and redirect URI all set).
pub type ConfiguredClient = Client<
    StandardErrorResponse<BasicErrorResponseType>,
    StandardTokenResponse<EmptyExtraTokenFields, BasicTokenType>,
    StandardTokenIntrospectionResponse<EmptyExtraTokenFields, BasicTokenType>,
    StandardRevocableToken,
    StandardErrorResponse<RevocationErrorResponseType>,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

/// External identity providers users can sign in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Google,
    GitHub,
}

impl Provider {
    /// Parse the `{provider}` path segment.
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "google" => Some(Self::Google),
            "github" => Some(Self::GitHub),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::GitHub => "github",
        }
    }

    /// A provider is enabled once its client id is configured.
    #[must_use]
    pub const fn is_configured(self, config: &Config) -> bool {
        match self {
            Self::Google => !config.google_client_id.is_empty(),
            Self::GitHub => !config.github_client_id.is_empty(),
        }
    }

    /// Build the `OAuth2` client for this provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the OAuth URLs are malformed.
    pub fn client(self, config: &Config) -> anyhow::Result<ConfiguredClient> {
        let (id, secret, auth, token, redirect) = match self {
            Self::Google => (
                &config.google_client_id,
                &config.google_client_secret,
                "https://accounts.google.com/o/oauth2/v2/auth",
                "https://oauth2.googleapis.com/token",
                &config.google_redirect_uri,
            ),
            Self::GitHub => (
                &config.github_client_id,
                &config.github_client_secret,
                "https://github.com/login/oauth/authorize",
                "https://github.com/login/oauth/access_token",
                &config.github_redirect_uri,
            ),
        };

        let client = Client::new(ClientId::new(id.clone()))
            .set_client_secret(ClientSecret::new(secret.clone()))
            .set_auth_uri(AuthUrl::new(auth.to_string())?)
            .set_token_uri(TokenUrl::new(token.to_string())?)
            .set_redirect_uri(RedirectUrl::new(redirect.clone())?);
        Ok(client)
    }

    const fn scopes(self) -> &'static [&'static str] {
        match self {
            Self::Google => &["openid", "email", "profile"],
            Self::GitHub => &["user:email"],
        }
    }

    /// Build the provider's consent URL carrying `state` as the CSRF token.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be configured.
    pub fn authorize_url(self, config: &Config, state: String) -> anyhow::Result<String> {
        let client = self.client(config)?;
        let mut request = client.authorize_url(|| CsrfToken::new(state));
        for scope in self.scopes() {
            request = request.add_scope(Scope::new((*scope).to_string()));
        }
        let (url, _csrf) = request.url();
        Ok(url.to_string())
    }

    /// Exchange an authorization code and fetch the signed-in account's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the code exchange or any profile request fails.
    pub async fn fetch_profile(self, config: &Config, code: String) -> anyhow::Result<OAuthProfile> {
        let http = reqwest::Client::new();
        let token = self
            .client(config)?
            .exchange_code(AuthorizationCode::new(code))
            .request_async(&http)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to exchange authorization code: {e}"))?;
        let access_token = token.access_token().secret().clone();

        match self {
            Self::Google => {
                let info = fetch_google_userinfo(&http, &access_token).await?;
                Ok(OAuthProfile {
                    provider_account_id: info.sub,
                    email: info.email,
                    name: info.name,
                })
            }
            Self::GitHub => {
                let info = fetch_github_userinfo(&http, &access_token).await?;
                let email = match info.email {
                    Some(email) => email,
                    None => fetch_github_primary_email(&http, &access_token).await?,
                };
                Ok(OAuthProfile {
                    provider_account_id: info.id.to_string(),
                    email,
                    name: info.name,
                })
            }
        }
    }
}

/// Provider-neutral view of an external account.
#[derive(Debug, Clone)]
pub struct OAuthProfile {
    pub provider_account_id: String,
    pub email: String,
    pub name: Option<String>,
}

impl OAuthProfile {
    /// Split the display name into first and last name on the last space.
    #[must_use]
    pub fn split_name(&self) -> (Option<String>, Option<String>) {
        let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) else {
            return (None, None);
        };
        match name.rsplit_once(' ') {
            Some((first, last)) => (Some(first.trim().to_string()), Some(last.to_string())),
            None => (Some(name.to_string()), None),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    email: String,
    name: Option<String>,
}

async fn fetch_google_userinfo(
    http: &reqwest::Client,
    access_token: &str,
) -> anyhow::Result<GoogleUserInfo> {
    let resp = http
        .get("https://www.googleapis.com/oauth2/v3/userinfo")
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to fetch Google userinfo: {e}"))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(anyhow::anyhow!(
            "Google userinfo request failed ({status}): {body}"
        ));
    }

    resp.json::<GoogleUserInfo>()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to parse Google userinfo: {e}"))
}

#[derive(Debug, Deserialize)]
struct GitHubUserInfo {
    id: i64,
    email: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubEmail {
    email: String,
    primary: bool,
    verified: bool,
}

async fn fetch_github_userinfo(
    http: &reqwest::Client,
    access_token: &str,
) -> anyhow::Result<GitHubUserInfo> {
    let resp = http
        .get("https://api.github.com/user")
        .bearer_auth(access_token)
        .header("User-Agent", USER_AGENT)
        .header("Accept", "application/vnd.github+json")
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to fetch GitHub userinfo: {e}"))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(anyhow::anyhow!(
            "GitHub userinfo request failed ({status}): {body}"
        ));
    }

    resp.json::<GitHubUserInfo>()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to parse GitHub userinfo: {e}"))
}

/// Accounts with a private e-mail only expose it through `/user/emails`.
async fn fetch_github_primary_email(
    http: &reqwest::Client,
    access_token: &str,
) -> anyhow::Result<String> {
    let resp = http
        .get("https://api.github.com/user/emails")
        .bearer_auth(access_token)
        .header("User-Agent", USER_AGENT)
        .header("Accept", "application/vnd.github+json")
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to fetch GitHub emails: {e}"))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(anyhow::anyhow!(
            "GitHub emails request failed ({status}): {body}"
        ));
    }

    let emails: Vec<GitHubEmail> = resp
        .json()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to parse GitHub emails: {e}"))?;

    emails
        .into_iter()
        .find(|e| e.primary && e.verified)
        .map(|e| e.email)
        .ok_or_else(|| anyhow::anyhow!("No primary verified email found on GitHub account"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: Option<&str>) -> OAuthProfile {
        OAuthProfile {
            provider_account_id: "1".to_string(),
            email: "x@example.com".to_string(),
            name: name.map(String::from),
        }
    }

    #[test]
    fn provider_slugs() {
        assert_eq!(Provider::from_slug("google"), Some(Provider::Google));
        assert_eq!(Provider::from_slug("github"), Some(Provider::GitHub));
        assert_eq!(Provider::from_slug("facebook"), None);
        assert_eq!(Provider::GitHub.as_str(), "github");
    }

    #[test]
    fn split_name_variants() {
        assert_eq!(
            profile(Some("Kari Anne Nordmann")).split_name(),
            (Some("Kari Anne".to_string()), Some("Nordmann".to_string()))
        );
        assert_eq!(profile(Some("Kari")).split_name(), (Some("Kari".to_string()), None));
        assert_eq!(profile(Some("  ")).split_name(), (None, None));
        assert_eq!(profile(None).split_name(), (None, None));
    }
}
