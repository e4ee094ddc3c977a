//! Configuration de l'application, lue dans les variables d'environnement.
//!
//! Tout sauf `DATABASE_URL` a une valeur par défaut : le backend démarre
//! en local avec un `.env` minimal.

use std::env;
use std::fs;

const DEV_SESSION_SECRET: &str = "dev-session-secret-change-me";

// Bornes des durées lues dans l'environnement, en minutes
pub const SESSION_TTL_RANGE: (i64, i64) = (1, 60 * 24 * 30);
pub const ABANDONED_GRACE_RANGE: (i64, i64) = (1, 60 * 24 * 7);
pub const JANITOR_INTERVAL_RANGE_SECS: (u64, u64) = (1, 60 * 60 * 24);

/// Clé de signature et préfixe de version porté par ses jetons.
#[derive(Clone)]
pub struct SessionKey {
    pub version: u32,
    pub secret: String,
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKey")
            .field("version", &self.version)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Env : `DATABASE_URL` (obligatoire)
    pub database_url: String,

    /// Env : `HOST`, défaut `0.0.0.0`
    pub host: String,

    /// Env : `PORT`, défaut `4000`
    pub port: u16,

    /// Clé qui signe les nouveaux jetons.
    /// Env : `SESSION_SECRET` + `SESSION_KEY_VERSION` (version 1 par défaut)
    pub session_key: SessionKey,

    /// Clés encore acceptées en vérification après une rotation.
    /// Env : `SESSION_RETIRED_KEYS`, format `version:secret,version:secret`
    pub retired_session_keys: Vec<SessionKey>,

    /// Env : `SESSION_TTL_MINUTES`, défaut `60`
    pub session_ttl_minutes: i64,

    /// Force les cookies `SameSite=None; Secure` même sans HTTPS détecté.
    /// Env : `APP_ENV=production`
    pub production: bool,

    /// Env : `FRONTEND_ORIGIN`
    pub frontend_origin: Option<String>,

    /// Env : `GITHUB_CLIENT_ID`, ou fichier `/run/secrets/github_client_id`
    pub github_client_id: Option<String>,

    /// Env : `GITHUB_CLIENT_SECRET`, ou fichier `/run/secrets/github_client_secret`
    pub github_client_secret: Option<String>,

    /// Env : `GITHUB_REDIRECT_URI` ; sinon déduite du header Host.
    pub github_redirect_uri: Option<String>,

    /// Délai avant qu'un lobby jamais démarré soit balayé.
    /// Env : `ABANDONED_TOURNAMENT_MINUTES`, défaut `3`
    pub abandoned_tournament_minutes: i64,

    /// Env : `JANITOR_INTERVAL_SECS`, défaut `60`
    pub janitor_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            host: "0.0.0.0".to_string(),
            port: 4000,
            session_key: SessionKey {
                version: 1,
                secret: DEV_SESSION_SECRET.to_string(),
            },
            retired_session_keys: Vec::new(),
            session_ttl_minutes: 60,
            production: false,
            frontend_origin: None,
            github_client_id: None,
            github_client_secret: None,
            github_redirect_uri: None,
            abandoned_tournament_minutes: 3,
            janitor_interval_secs: 60,
        }
    }
}

impl AppConfig {
    /// Charge `.env`, puis l'environnement du process, avec les valeurs par défaut sinon.
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        let mut config = Self::default();

        config.database_url =
            env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        if let Ok(host) = env::var("HOST") {
            config.host = host;
        }
        if let Some(port) = parse_var::<u16>("PORT") {
            config.port = port;
        }

        match non_empty_var("SESSION_SECRET") {
            Some(secret) => config.session_key.secret = secret,
            None => tracing::warn!("SESSION_SECRET not set, using development default"),
        }
        if let Some(version) = parse_var::<u32>("SESSION_KEY_VERSION") {
            config.session_key.version = version;
        }
        if let Some(raw) = non_empty_var("SESSION_RETIRED_KEYS") {
            config.retired_session_keys = parse_retired_keys(&raw);
        }
        if let Some(ttl) = parse_var::<i64>("SESSION_TTL_MINUTES") {
            config.session_ttl_minutes = clamp_var("SESSION_TTL_MINUTES", ttl, SESSION_TTL_RANGE);
        }

        config.production = env::var("APP_ENV").map(|v| v == "production").unwrap_or(false);

        config.frontend_origin =
            non_empty_var("FRONTEND_ORIGIN").map(|o| o.trim_end_matches('/').to_string());
        config.github_client_id = non_empty_var("GITHUB_CLIENT_ID")
            .or_else(|| read_secret_file("/run/secrets/github_client_id"));
        config.github_client_secret = non_empty_var("GITHUB_CLIENT_SECRET")
            .or_else(|| read_secret_file("/run/secrets/github_client_secret"));
        config.github_redirect_uri = non_empty_var("GITHUB_REDIRECT_URI");

        if let Some(minutes) = parse_var::<i64>("ABANDONED_TOURNAMENT_MINUTES") {
            config.abandoned_tournament_minutes =
                clamp_var("ABANDONED_TOURNAMENT_MINUTES", minutes, ABANDONED_GRACE_RANGE);
        }
        if let Some(secs) = parse_var::<u64>("JANITOR_INTERVAL_SECS") {
            config.janitor_interval_secs =
                clamp_var("JANITOR_INTERVAL_SECS", secs, JANITOR_INTERVAL_RANGE_SECS);
        }

        Ok(config)
    }

    pub fn github_configured(&self) -> bool {
        self.github_client_id.is_some() && self.github_client_secret.is_some()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = non_empty_var(name)?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "Invalid value, using default");
            None
        }
    }
}

/// Ramène `value` dans `[min, max]`, avec un warning si elle en sortait.
fn clamp_var<T>(name: &str, value: T, (min, max): (T, T)) -> T
where
    T: Ord + Copy + std::fmt::Display,
{
    let clamped = value.clamp(min, max);
    if clamped != value {
        tracing::warn!(var = name, value = %value, clamped = %clamped, "Value out of range, clamped");
    }
    clamped
}

fn read_secret_file(path: &str) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse `1:old-secret,2:older-secret`. Les entrées mal formées sont ignorées.
fn parse_retired_keys(raw: &str) -> Vec<SessionKey> {
    raw.split(',')
        .filter_map(|entry| {
            let (version, secret) = entry.trim().split_once(':')?;
            match version.trim().parse::<u32>() {
                Ok(version) if !secret.is_empty() => Some(SessionKey {
                    version,
                    secret: secret.to_string(),
                }),
                _ => {
                    tracing::warn!("Ignoring malformed SESSION_RETIRED_KEYS entry");
                    None
                }
            }
        })
        .collect()
}
