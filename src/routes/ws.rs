use actix_web::{get, web, HttpRequest, HttpResponse};
use actix_ws::Message;
use chrono::Utc;
use futures::StreamExt;
use sea_orm::DatabaseConnection;
use serde::Serialize;

use crate::middleware::auth::{authenticate_websocket, WsCloser, WS_UNAUTHORIZED_CODE};
use crate::models::dto::ChatHistory;
use crate::services::chat_service::ChatService;
use crate::utils::session::SessionCodec;

/// Frames envoyées au client.
#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerFrame {
    ChatHistory(ChatHistory),
}

/// Frame client qui redemande l'historique du chat.
fn wants_history(text: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(|t| t == "chat_history"))
        .unwrap_or(false)
}

async fn send_history(session: &mut actix_ws::Session, db: &DatabaseConnection, username: &str) -> bool {
    let frame = ServerFrame::ChatHistory(ChatService::build_history(db, username).await);
    match serde_json::to_string(&frame) {
        Ok(text) => session.text(text).await.is_ok(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode chat history");
            true
        }
    }
}

/// GET /user/ws - WebSocket utilisateur
///
/// L'upgrade réussit toujours ; l'authentification suit immédiatement et
/// une session invalide ferme la socket avec 4401. Le token peut venir du
/// cookie, d'un header bearer ou de `?token=`.
#[get("/ws")]
pub async fn user_socket(
    req: HttpRequest,
    body: web::Payload,
    db: web::Data<DatabaseConnection>,
    codec: web::Data<SessionCodec>,
) -> Result<HttpResponse, actix_web::Error> {
    let (response, session, mut stream) = actix_ws::handle(&req, body)?;
    let db = db.into_inner();
    let codec = codec.into_inner();

    actix_web::rt::spawn(async move {
        let Some((payload, mut session)) = authenticate_websocket(&req, &codec, session).await else {
            return;
        };
        let username = payload.username;
        tracing::info!(username = %username, "WebSocket connected");

        if !send_history(&mut session, &db, &username).await {
            return;
        }

        while let Some(Ok(msg)) = stream.next().await {
            if payload.exp <= Utc::now().timestamp() {
                tracing::debug!(username = %username, "Session expired on open socket");
                session.close_with(WS_UNAUTHORIZED_CODE, "Unauthorized").await;
                return;
            }

            match msg {
                Message::Ping(bytes) => {
                    if session.pong(&bytes).await.is_err() {
                        break;
                    }
                }
                Message::Text(text) if wants_history(&text) => {
                    if !send_history(&mut session, &db, &username).await {
                        break;
                    }
                }
                Message::Close(reason) => {
                    let _ = session.close(reason).await;
                    tracing::info!(username = %username, "WebSocket closed");
                    return;
                }
                _ => {}
            }
        }
        tracing::info!(username = %username, "WebSocket disconnected");
    });

    Ok(response)
}
