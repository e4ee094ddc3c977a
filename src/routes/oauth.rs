use actix_web::{get, http::header, web, HttpRequest, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::services::oauth_service::{self, OAuthProvider, OAuthService};
use crate::utils::cookies;
use crate::utils::session::SessionCodec;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

fn provider_redirect_uri(req: &HttpRequest, config: &AppConfig) -> AppResult<String> {
    // Tient compte de X-Forwarded-Proto derrière un proxy
    let scheme = req.connection_info().scheme().to_string();
    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();
    oauth_service::redirect_uri(config, &scheme, host)
}

/// GET /auth/github/start - Redirection vers GitHub
#[get("/auth/github/start")]
pub async fn github_start(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    provider: web::Data<dyn OAuthProvider>,
) -> AppResult<HttpResponse> {
    if !provider.is_configured() {
        return Err(AppError::Internal("GitHub OAuth not configured".to_string()));
    }
    let redirect_uri = provider_redirect_uri(&req, &config)?;

    let state = Uuid::new_v4().to_string();
    let location = provider.authorize_url(&redirect_uri, &state)?;
    let secure = cookies::is_secure_context(&req, config.production);

    Ok(HttpResponse::Found()
        .cookie(cookies::oauth_state_cookie(&state, secure))
        .insert_header((header::LOCATION, location))
        .finish())
}

/// GET /auth/github/callback et /oauth/callback - Retour de GitHub
#[get("/auth/github/callback")]
pub async fn github_callback(
    req: HttpRequest,
    query: web::Query<CallbackQuery>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    codec: web::Data<SessionCodec>,
    provider: web::Data<dyn OAuthProvider>,
) -> AppResult<HttpResponse> {
    complete(req, query, db, config, codec, provider).await
}

#[get("/oauth/callback")]
pub async fn oauth_callback(
    req: HttpRequest,
    query: web::Query<CallbackQuery>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    codec: web::Data<SessionCodec>,
    provider: web::Data<dyn OAuthProvider>,
) -> AppResult<HttpResponse> {
    complete(req, query, db, config, codec, provider).await
}

async fn complete(
    req: HttpRequest,
    query: web::Query<CallbackQuery>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    codec: web::Data<SessionCodec>,
    provider: web::Data<dyn OAuthProvider>,
) -> AppResult<HttpResponse> {
    let expected = cookies::read_cookie(req.headers(), cookies::OAUTH_STATE_COOKIE);
    let code = oauth_service::validate_callback(
        query.code.as_deref(),
        query.state.as_deref(),
        expected.as_deref(),
    )?;

    let frontend_origin = config
        .frontend_origin
        .as_deref()
        .ok_or_else(|| AppError::Internal("FRONTEND_ORIGIN not configured".to_string()))?;
    let redirect_uri = provider_redirect_uri(&req, &config)?;

    let username = OAuthService::complete_login(&db, provider.get_ref(), &code, &redirect_uri).await?;

    let issued = codec.issue(&username, codec.default_ttl_minutes());
    let secure = cookies::is_secure_context(&req, config.production);

    Ok(HttpResponse::Found()
        .cookie(cookies::session_cookie(&issued.token, secure, issued.max_age_sec))
        .cookie(cookies::clear_oauth_state_cookie())
        .insert_header((
            header::LOCATION,
            oauth_service::completion_redirect(frontend_origin, &issued.token),
        ))
        .finish())
}

pub fn oauth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(github_start)
        .service(github_callback)
        .service(oauth_callback);
}
