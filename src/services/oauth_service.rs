// ============================================================================
// OAUTH (GitHub)
// ============================================================================
//
// Flux :
//   1. /start     : state aléatoire dans le cookie `oauth_state`, redirection GitHub
//   2. /callback  : vérifie le state, échange le code, lit le profil
//   3. provisioning du compte local au premier passage
//   4. session émise, redirection vers le frontend avec le token
//
// Rien n'est écrit en base avant l'étape 3, qui est une seule insertion.
//
// ============================================================================

use async_trait::async_trait;
use rand::Rng;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use subtle::ConstantTimeEq;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::services::user_service::UserService;

const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const GITHUB_PROFILE_URL: &str = "https://api.github.com/user";
const GITHUB_SCOPE: &str = "read:user user:email";
const USER_AGENT: &str = "pong-backend";

/// Identité renvoyée par le fournisseur.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderProfile {
    pub id: serde_json::Value,
    pub login: String,
    pub avatar_url: Option<String>,
}

impl ProviderProfile {
    /// GitHub renvoie des ids numériques ; stockés en texte dans tous les cas.
    pub fn provider_id(&self) -> String {
        match &self.id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[async_trait]
pub trait OAuthProvider: Send + Sync {
    fn is_configured(&self) -> bool;

    fn authorize_url(&self, redirect_uri: &str, state: &str) -> AppResult<String>;

    /// Échange le code d'autorisation contre un access token.
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> AppResult<String>;

    async fn fetch_profile(&self, access_token: &str) -> AppResult<ProviderProfile>;
}

pub struct GithubProvider {
    client: reqwest::Client,
    client_id: Option<String>,
    client_secret: Option<String>,
}

impl GithubProvider {
    pub fn new(client_id: Option<String>, client_secret: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id,
            client_secret,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.github_client_id.clone(), config.github_client_secret.clone())
    }

    fn credentials(&self) -> AppResult<(&str, &str)> {
        match (self.client_id.as_deref(), self.client_secret.as_deref()) {
            (Some(id), Some(secret)) => Ok((id, secret)),
            _ => Err(AppError::Internal("GitHub OAuth not configured".to_string())),
        }
    }
}

#[async_trait]
impl OAuthProvider for GithubProvider {
    fn is_configured(&self) -> bool {
        self.credentials().is_ok()
    }

    fn authorize_url(&self, redirect_uri: &str, state: &str) -> AppResult<String> {
        let (client_id, _) = self.credentials()?;
        Ok(format!(
            "{}?client_id={}&redirect_uri={}&scope={}&state={}",
            GITHUB_AUTHORIZE_URL,
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(GITHUB_SCOPE),
            urlencoding::encode(state),
        ))
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> AppResult<String> {
        let (client_id, client_secret) = self.credentials()?;
        let body: TokenResponse = self
            .client
            .post(GITHUB_TOKEN_URL)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&serde_json::json!({
                "client_id": client_id,
                "client_secret": client_secret,
                "code": code,
                "redirect_uri": redirect_uri,
            }))
            .send()
            .await?
            .json()
            .await?;

        body.access_token.ok_or_else(|| {
            tracing::warn!("GitHub token exchange returned no access token");
            AppError::OAuth("OAuth token exchange failed".to_string())
        })
    }

    async fn fetch_profile(&self, access_token: &str) -> AppResult<ProviderProfile> {
        let profile = self
            .client
            .get(GITHUB_PROFILE_URL)
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(profile)
    }
}

/// Vérifie les paramètres du callback contre le cookie `oauth_state` et
/// renvoie le code d'autorisation.
pub fn validate_callback(
    code: Option<&str>,
    state: Option<&str>,
    expected_state: Option<&str>,
) -> AppResult<String> {
    let invalid = || AppError::OAuth("Invalid OAuth state".to_string());

    let code = code.filter(|c| !c.is_empty()).ok_or_else(invalid)?;
    let state = state.filter(|s| !s.is_empty()).ok_or_else(invalid)?;
    let expected = expected_state.filter(|s| !s.is_empty()).ok_or_else(invalid)?;

    if !bool::from(state.as_bytes().ct_eq(expected.as_bytes())) {
        tracing::debug!("OAuth state mismatch");
        return Err(invalid());
    }
    Ok(code.to_string())
}

/// URL de callback donnée au fournisseur : valeur configurée, sinon déduite
/// de l'hôte de la requête.
pub fn redirect_uri(config: &AppConfig, scheme: &str, host: &str) -> AppResult<String> {
    if let Some(uri) = config.github_redirect_uri.as_deref() {
        return Ok(uri.to_string());
    }
    if host.is_empty() {
        return Err(AppError::Internal(
            "GITHUB_REDIRECT_URI or Host header required".to_string(),
        ));
    }
    Ok(format!("{}://{}/api/oauth/callback", scheme, host))
}

/// Route du frontend qui reçoit le token quand les cookies tiers sont bloqués.
pub fn completion_redirect(frontend_origin: &str, token: &str) -> String {
    format!(
        "{}/#/menu?token={}",
        frontend_origin.trim_end_matches('/'),
        urlencoding::encode(token)
    )
}

pub struct OAuthService;

impl OAuthService {
    /// Username local d'une identité fournisseur. Un compte connu est réutilisé ; au
    /// premier passage un compte est créé, avec un suffixe si le login est pris.
    pub async fn resolve_identity(db: &DatabaseConnection, profile: &ProviderProfile) -> AppResult<String> {
        let provider_id = profile.provider_id();
        if let Some(username) = UserService::find_github_user(db, &provider_id).await? {
            tracing::debug!(username = %username, "Known GitHub account");
            return Ok(username);
        }

        let mut candidate = profile.login.clone();
        if UserService::is_taken(db, &candidate).await? {
            candidate = format!("{}_{}", candidate, rand::thread_rng().gen_range(0..10000));
        }
        UserService::register_github(db, &candidate, &provider_id, profile.avatar_url.as_deref()).await?;
        Ok(candidate)
    }

    /// Étapes 2 et 3 du flux : échange du code, profil et compte local.
    pub async fn complete_login(
        db: &DatabaseConnection,
        provider: &dyn OAuthProvider,
        code: &str,
        redirect_uri: &str,
    ) -> AppResult<String> {
        let access_token = provider.exchange_code(code, redirect_uri).await?;
        let profile = provider.fetch_profile(&access_token).await?;
        let username = Self::resolve_identity(db, &profile).await?;
        tracing::info!(username = %username, "GitHub login");
        Ok(username)
    }
}
