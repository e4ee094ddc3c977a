use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::utils::cookies;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(DbErr),

    /// Une lecture attendait exactement une ligne et n'en a trouvé aucune.
    #[error("{0} not found")]
    NotFound(String),

    /// Une écriture devait toucher une ligne et n'en a touché aucune.
    #[error("No rows affected: {0}")]
    NoRowsAffected(String),

    #[error("Integrity error: {0}")]
    Integrity(String),

    /// Session absente, invalide ou expirée. La réponse efface le cookie `sid`
    /// avec les attributs du contexte (`secure`).
    #[error("Unauthorized")]
    Unauthorized { secure: bool },

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("OAuth error: {0}")]
    OAuth(String),

    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => AppError::Conflict(detail),
            _ => AppError::Database(err),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::OAuth(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_)
            | AppError::NoRowsAffected(_)
            | AppError::Integrity(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Database(_)
            | AppError::NoRowsAffected(_)
            | AppError::Integrity(_)
            | AppError::Internal(_) => {
                tracing::error!(error = %self, "Request failed");
                "Internal server error".to_string()
            }
            AppError::Upstream(_) => {
                tracing::warn!(error = %self, "Upstream call failed");
                "Upstream service unavailable".to_string()
            }
            _ => self.to_string(),
        };

        let mut response = HttpResponse::build(self.status_code());
        if let AppError::Unauthorized { secure } = self {
            response.cookie(cookies::clear_session_cookie(*secure));
        }
        response.json(serde_json::json!({
            "success": false,
            "error": message
        }))
    }
}
