use actix_web::{dev::Payload, web, Error, FromRequest, HttpRequest, HttpResponse, ResponseError};
use async_trait::async_trait;
use futures::future::{ready, Ready};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::utils::cookies;
use crate::utils::session::{SessionCodec, SessionPayload};

pub const WS_UNAUTHORIZED_CODE: u16 = 4401;

/// Appelant authentifié d'une route protégée.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub username: String,
    pub exp: i64,
}

impl From<SessionPayload> for AuthUser {
    fn from(payload: SessionPayload) -> Self {
        Self {
            username: payload.username,
            exp: payload.exp,
        }
    }
}

/// Extrait et vérifie le jeton de session d'une requête HTTP.
pub fn authenticate_request(req: &HttpRequest, codec: &SessionCodec) -> Option<SessionPayload> {
    let Some(token) = cookies::token_from_request(req) else {
        tracing::debug!(path = req.path(), "No session token");
        return None;
    };
    codec.verify(&token)
}

/// 401 qui efface aussi le cookie de session. Effacer un cookie absent ne
/// change rien côté navigateur : il est envoyé à chaque échec.
pub fn unauthorized(req: &HttpRequest) -> AppError {
    let production = req
        .app_data::<web::Data<AppConfig>>()
        .map(|c| c.production)
        .unwrap_or(false);
    AppError::Unauthorized {
        secure: cookies::is_secure_context(req, production),
    }
}

pub fn unauthorized_response(req: &HttpRequest) -> HttpResponse {
    unauthorized(req).error_response()
}

impl FromRequest for AuthUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(codec) = req.app_data::<web::Data<SessionCodec>>() else {
            tracing::error!("SessionCodec missing from app data");
            return ready(Err(actix_web::error::ErrorInternalServerError(
                "Session codec not configured",
            )));
        };

        match authenticate_request(req, codec) {
            Some(payload) => ready(Ok(payload.into())),
            None => ready(Err(unauthorized(req).into())),
        }
    }
}

/// Ce qui sait fermer un WebSocket avec un code applicatif.
#[async_trait(?Send)]
pub trait WsCloser: Sized {
    async fn close_with(self, code: u16, reason: &str);
}

#[async_trait(?Send)]
impl WsCloser for actix_ws::Session {
    async fn close_with(self, code: u16, reason: &str) {
        let close = actix_ws::CloseReason {
            code: actix_ws::CloseCode::Other(code),
            description: Some(reason.to_string()),
        };
        if self.close(Some(close)).await.is_err() {
            tracing::debug!("WebSocket already closed");
        }
    }
}

/// Vérifie la poignée de main WebSocket. En cas d'échec la socket est fermée avec 4401
/// "Unauthorized" et `None` est renvoyé ; sinon la session est rendue à l'appelant.
pub async fn authenticate_websocket<S: WsCloser>(
    req: &HttpRequest,
    codec: &SessionCodec,
    socket: S,
) -> Option<(SessionPayload, S)> {
    match cookies::token_from_request(req).and_then(|token| codec.verify(&token)) {
        Some(payload) => Some((payload, socket)),
        None => {
            tracing::debug!("Rejecting unauthenticated WebSocket");
            socket.close_with(WS_UNAUTHORIZED_CODE, "Unauthorized").await;
            None
        }
    }
}
