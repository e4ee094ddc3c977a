// Jetons de session signés.
//
// Format : v<version>.<base64url(payload json)>.<base64url(hmac-sha256)>
// La signature couvre tout ce qui précède le dernier point, préfixe de version compris.
// Rien n'est stocké côté serveur : un jeton est valide tant que sa signature
// correspond à une version de clé connue et que `exp` est dans le futur.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::collections::HashMap;
use subtle::ConstantTimeEq;

use crate::config::{AppConfig, SessionKey};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPayload {
    pub username: String,
    pub exp: i64, // secondes unix
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub max_age_sec: i64,
}

/// Émet et vérifie les jetons de session. En lecture seule après le démarrage.
#[derive(Clone)]
pub struct SessionCodec {
    current: SessionKey,
    keys: HashMap<u32, String>,
    default_ttl_minutes: i64,
}

impl SessionCodec {
    pub fn new(current: SessionKey, retired: Vec<SessionKey>, default_ttl_minutes: i64) -> Self {
        let mut keys: HashMap<u32, String> = retired
            .into_iter()
            .map(|k| (k.version, k.secret))
            .collect();
        keys.insert(current.version, current.secret.clone());

        Self {
            current,
            keys,
            default_ttl_minutes,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.session_key.clone(),
            config.retired_session_keys.clone(),
            config.session_ttl_minutes,
        )
    }

    pub fn default_ttl_minutes(&self) -> i64 {
        self.default_ttl_minutes
    }

    /// Émet un jeton pour `username`, valide `ttl_minutes` minutes.
    pub fn issue(&self, username: &str, ttl_minutes: i64) -> IssuedToken {
        self.issue_at(username, ttl_minutes, Utc::now().timestamp())
    }

    pub fn issue_at(&self, username: &str, ttl_minutes: i64, now: i64) -> IssuedToken {
        let exp = now.saturating_add(ttl_minutes.saturating_mul(60));
        let payload = serde_json::json!({ "username": username, "exp": exp }).to_string();

        let signed = format!(
            "v{}.{}",
            self.current.version,
            URL_SAFE_NO_PAD.encode(payload.as_bytes())
        );
        let sig = sign(&signed, &self.current.secret);

        IssuedToken {
            token: format!("{}.{}", signed, sig),
            max_age_sec: exp - now,
        }
    }

    /// Vérifie signature et expiration. Jamais d'erreur : tout problème donne `None`.
    pub fn verify(&self, token: &str) -> Option<SessionPayload> {
        self.verify_at(token, Utc::now().timestamp())
    }

    pub fn verify_at(&self, token: &str, now: i64) -> Option<SessionPayload> {
        if token.is_empty() {
            tracing::debug!("Session token empty");
            return None;
        }

        let Some((signed, sig)) = token.rsplit_once('.') else {
            tracing::debug!("Session token has no separator");
            return None;
        };

        let Some((version, payload_b64)) = signed.split_once('.') else {
            tracing::debug!("Session token has no key version");
            return None;
        };
        let Some(secret) = version
            .strip_prefix('v')
            .and_then(|v| v.parse::<u32>().ok())
            .and_then(|v| self.keys.get(&v))
        else {
            tracing::debug!(version, "Session token signed with unknown key version");
            return None;
        };

        let expected = sign(signed, secret);
        if sig.len() != expected.len() {
            tracing::debug!("Session token signature length mismatch");
            return None;
        }
        if sig.as_bytes().ct_eq(expected.as_bytes()).unwrap_u8() != 1 {
            tracing::debug!("Session token signature invalid");
            return None;
        }

        let payload: SessionPayload = match URL_SAFE_NO_PAD
            .decode(payload_b64)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        {
            Some(payload) => payload,
            None => {
                tracing::debug!("Session token payload does not decode");
                return None;
            }
        };

        if payload.username.is_empty() {
            tracing::debug!("Session token payload has no username");
            return None;
        }
        if payload.exp <= now {
            tracing::debug!(exp = payload.exp, now, "Session token expired");
            return None;
        }

        Some(payload)
    }
}

fn sign(data: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(data.as_bytes());
    URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
}
