use actix_web::{get, patch, post, web, HttpRequest, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::dto::{
    ChangePasswordRequest, CredentialsRequest, PublicUser, SessionResponse, UpdateProfileRequest,
};
use crate::models::users;
use crate::routes::{check_username, validate_body};
use crate::services::user_service::UserService;
use crate::utils::cookies;
use crate::utils::password;
use crate::utils::session::SessionCodec;

/// Ouvre une session pour `user` : cookie `sid` et token dans le body.
fn session_response(
    req: &HttpRequest,
    config: &AppConfig,
    codec: &SessionCodec,
    user: users::Model,
    status: actix_web::http::StatusCode,
) -> HttpResponse {
    let issued = codec.issue(&user.username, codec.default_ttl_minutes());
    let secure = cookies::is_secure_context(req, config.production);

    HttpResponse::build(status)
        .cookie(cookies::session_cookie(&issued.token, secure, issued.max_age_sec))
        .json(SessionResponse {
            success: true,
            user: PublicUser::from(user),
            token: issued.token,
            max_age_sec: issued.max_age_sec,
        })
}

fn username_taken() -> AppError {
    AppError::Conflict("Username already exists".to_string())
}

fn invalid_credentials() -> AppError {
    AppError::BadRequest("Invalid username or password".to_string())
}

/// POST /user/register - Créer un compte (PUBLIC)
#[post("/register")]
pub async fn register(
    req: HttpRequest,
    body: web::Json<CredentialsRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    codec: web::Data<SessionCodec>,
) -> AppResult<HttpResponse> {
    validate_body(&*body)?;
    check_username(&body.username)?;

    if UserService::is_taken(&db, &body.username).await? {
        return Err(username_taken());
    }

    let password_hash = password::hash_password(&body.password).map_err(AppError::Internal)?;
    UserService::register_local(&db, &body.username, &password_hash, body.avatar.as_deref()).await?;

    let user = UserService::get_by_username(&db, &body.username).await?;
    Ok(session_response(&req, &config, &codec, user, actix_web::http::StatusCode::CREATED))
}

/// POST /user/login - Se connecter (PUBLIC)
#[post("/login")]
pub async fn login(
    req: HttpRequest,
    body: web::Json<CredentialsRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    codec: web::Data<SessionCodec>,
) -> AppResult<HttpResponse> {
    let user = match UserService::get_by_username(&db, &body.username).await {
        Ok(user) => user,
        Err(AppError::NotFound(_)) => return Err(invalid_credentials()),
        Err(e) => return Err(e),
    };

    // Les comptes GitHub ont un mot de passe aléatoire : refusés ici
    let valid = user.provider == users::PROVIDER_LOCAL
        && password::verify_password(&body.password, &user.password_hash).map_err(AppError::Internal)?;
    if !valid {
        tracing::debug!(username = %body.username, "Login refused");
        return Err(invalid_credentials());
    }

    tracing::info!(username = %user.username, "Login");
    Ok(session_response(&req, &config, &codec, user, actix_web::http::StatusCode::OK))
}

/// POST /user/logout - Efface le cookie de session (PUBLIC)
#[post("/logout")]
pub async fn logout(req: HttpRequest, config: web::Data<AppConfig>) -> HttpResponse {
    let secure = cookies::is_secure_context(&req, config.production);
    HttpResponse::Ok()
        .cookie(cookies::clear_session_cookie(secure))
        .json(serde_json::json!({ "success": true }))
}

/// GET /user/me - Utilisateur courant (PROTÉGÉE)
#[get("/me")]
pub async fn me(auth_user: AuthUser, db: web::Data<DatabaseConnection>) -> AppResult<HttpResponse> {
    let user = UserService::get_by_username(&db, &auth_user.username).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "user": PublicUser::from(user),
        "exp": auth_user.exp,
    })))
}

/// POST /user/change-password - Changer son mot de passe (PROTÉGÉE)
#[post("/change-password")]
pub async fn change_password(
    auth_user: AuthUser,
    body: web::Json<ChangePasswordRequest>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    validate_body(&*body)?;

    let user = UserService::get_by_username(&db, &auth_user.username).await?;
    if user.provider != users::PROVIDER_LOCAL {
        return Err(AppError::BadRequest("Password is managed by the OAuth provider".to_string()));
    }
    if !password::verify_password(&body.current_password, &user.password_hash).map_err(AppError::Internal)? {
        return Err(AppError::BadRequest("Current password is incorrect".to_string()));
    }

    let new_hash = password::hash_password(&body.new_password).map_err(AppError::Internal)?;
    UserService::update_password(&db, &user.username, &new_hash).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Password changed successfully"
    })))
}

/// PATCH /user/update - Avatar et/ou username (PROTÉGÉE)
///
/// Tout est vérifié avant la première écriture. Un renommage réémet la session :
/// l'ancien jeton désigne un utilisateur qui n'existe plus.
#[patch("/update")]
pub async fn update_profile(
    req: HttpRequest,
    auth_user: AuthUser,
    body: web::Json<UpdateProfileRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    codec: web::Data<SessionCodec>,
) -> AppResult<HttpResponse> {
    validate_body(&*body)?;
    if body.username.is_none() && body.avatar.is_none() {
        return Err(AppError::BadRequest("Nothing to update".to_string()));
    }

    let rename = body.username.as_deref().filter(|n| *n != auth_user.username);
    if let Some(new_name) = rename {
        check_username(new_name)?;
        if UserService::is_taken(&db, new_name).await? {
            return Err(username_taken());
        }
    }

    if let Some(avatar) = body.avatar.as_deref() {
        UserService::update_avatar(&db, &auth_user.username, avatar).await?;
    }

    if let Some(new_name) = rename {
        UserService::update_username(&db, &auth_user.username, new_name, codec.default_ttl_minutes()).await?;
        let user = UserService::get_by_username(&db, new_name).await?;
        return Ok(session_response(&req, &config, &codec, user, actix_web::http::StatusCode::OK));
    }

    let user = UserService::get_by_username(&db, &auth_user.username).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "user": PublicUser::from(user),
    })))
}

/// Routes de compte, montées dans le scope `/user`.
pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(logout)
        .service(me)
        .service(change_password)
        .service(update_profile);
}
