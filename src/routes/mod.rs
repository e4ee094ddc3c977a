pub mod auth;
pub mod chat;
pub mod health;
pub mod matches;
pub mod oauth;
pub mod tournaments;
pub mod users;
pub mod ws;

use actix_web::web;
use validator::Validate;

use crate::error::{AppError, AppResult};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(health::health_check)
            .configure(users::user_routes)
            .configure(oauth::oauth_routes)
            .configure(tournaments::tournament_routes)
            .configure(matches::match_routes)
            .configure(chat::chat_routes)
    );
}

/// Applique les règles `validator` d'un body.
pub(crate) fn validate_body<T: Validate>(body: &T) -> AppResult<()> {
    body.validate()
        .map_err(|errors| AppError::BadRequest(errors.to_string()))
}

/// Les usernames passent dans les URLs et le chat : lettres, chiffres, `_` et `-` seulement.
pub(crate) fn check_username(username: &str) -> AppResult<()> {
    if username.is_empty()
        || !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(AppError::BadRequest(
            "Username may only contain letters, digits, '_' and '-'".to_string(),
        ));
    }
    Ok(())
}
