use std::collections::HashMap;

use actix_web::cookie::time::Duration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header::{self, HeaderMap};
use actix_web::{web, HttpRequest};

pub const SESSION_COOKIE: &str = "sid";
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

const OAUTH_STATE_MAX_AGE_SECS: i64 = 600;

/// Découpe un header `Cookie` en paires nom/valeur.
///
/// Les segments sans `=` sont ignorés et les valeurs sont décodées (percent-encoding).
/// Quand un nom apparaît deux fois, la dernière occurrence l'emporte.
pub fn parse_cookies(header: &str) -> HashMap<String, String> {
    let mut out = HashMap::new();

    for part in header.split(';') {
        let Some((name, value)) = part.split_once('=') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        match urlencoding::decode(value.trim()) {
            Ok(decoded) => {
                out.insert(name.to_string(), decoded.into_owned());
            }
            Err(_) => tracing::debug!(cookie = name, "Skipping undecodable cookie value"),
        }
    }

    out
}

/// Lit un cookie dans tous les headers `Cookie` de la requête.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let joined = headers
        .get_all(header::COOKIE)
        .filter_map(|v| v.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ");

    parse_cookies(&joined)
        .remove(name)
        .filter(|v| !v.is_empty())
}

pub fn is_websocket_upgrade(headers: &HeaderMap) -> bool {
    headers
        .get(header::UPGRADE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("websocket"))
        .unwrap_or(false)
}

/// Cherche le jeton de session : cookie `sid`, puis `Authorization: Bearer`, puis
/// (handshake WebSocket uniquement) le paramètre `token` de la query.
pub fn token_from_parts(headers: &HeaderMap, query: &str) -> Option<String> {
    if let Some(sid) = read_cookie(headers, SESSION_COOKIE) {
        return Some(sid);
    }

    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    if is_websocket_upgrade(headers) {
        return web::Query::<HashMap<String, String>>::from_query(query)
            .ok()
            .and_then(|q| q.into_inner().remove("token"))
            .filter(|t| !t.is_empty());
    }

    None
}

pub fn token_from_request(req: &HttpRequest) -> Option<String> {
    token_from_parts(req.headers(), req.query_string())
}

/// HTTPS direct ou derrière un proxy (`X-Forwarded-Proto`), ou forcé par la config.
pub fn is_secure_context(req: &HttpRequest, production: bool) -> bool {
    production || req.connection_info().scheme() == "https"
}

fn base_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    // En cross-origin il faut SameSite=None, que les navigateurs n'acceptent qu'avec Secure.
    let same_site = if secure { SameSite::None } else { SameSite::Lax };
    Cookie::build(name, value)
        .path("/")
        .http_only(true)
        .same_site(same_site)
        .secure(secure)
        .finish()
}

pub fn session_cookie(token: &str, secure: bool, max_age_sec: i64) -> Cookie<'static> {
    let mut cookie = base_cookie(SESSION_COOKIE, token.to_string(), secure);
    if max_age_sec > 0 {
        cookie.set_max_age(Duration::seconds(max_age_sec));
    }
    cookie
}

pub fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = base_cookie(SESSION_COOKIE, String::new(), secure);
    cookie.set_max_age(Duration::ZERO);
    cookie
}

pub fn oauth_state_cookie(state: &str, secure: bool) -> Cookie<'static> {
    let mut cookie = base_cookie(OAUTH_STATE_COOKIE, state.to_string(), false);
    // Le callback est une redirection top-level : Lax suffit, même en cross-origin.
    cookie.set_secure(secure);
    cookie.set_max_age(Duration::seconds(OAUTH_STATE_MAX_AGE_SECS));
    cookie
}

pub fn clear_oauth_state_cookie() -> Cookie<'static> {
    let mut cookie = base_cookie(OAUTH_STATE_COOKIE, String::new(), false);
    cookie.set_max_age(Duration::ZERO);
    cookie
}
