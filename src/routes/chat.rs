use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::dto::SendMessageRequest;
use crate::models::messages::MessageKind;
use crate::routes::validate_body;
use crate::services::chat_service::ChatService;
use crate::services::message_service::{MessageService, NewMessage};
use crate::services::tournament_service::TournamentService;
use crate::services::user_service::UserService;

/// GET /chat/history - Historique global, privé et tournoi de l'utilisateur
#[get("/history")]
pub async fn history(auth_user: AuthUser, db: web::Data<DatabaseConnection>) -> HttpResponse {
    HttpResponse::Ok().json(ChatService::build_history(&db, &auth_user.username).await)
}

/// POST /chat/messages - Envoyer un message
#[post("/messages")]
pub async fn send_message(
    auth_user: AuthUser,
    body: web::Json<SendMessageRequest>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    validate_body(&*body)?;
    let body = body.into_inner();
    let sender = auth_user.username.as_str();

    let message = match body.kind {
        MessageKind::Broadcast => NewMessage::broadcast(sender, &body.content),
        MessageKind::Private => {
            let receiver = body
                .receiver
                .as_deref()
                .ok_or_else(|| AppError::BadRequest("A private message needs a receiver".to_string()))?;
            // Un destinataire qui a bloqué l'expéditeur ne reçoit rien
            if UserService::blocked(&db, receiver).await?.iter().any(|u| u == sender) {
                return Err(AppError::BadRequest(format!("{} does not accept your messages", receiver)));
            }
            NewMessage::private(sender, receiver, &body.content)
        }
        MessageKind::Tournament => {
            let tournament_id = body
                .game_id
                .as_deref()
                .ok_or_else(|| AppError::BadRequest("A tournament message needs a tournament id".to_string()))?;
            let members = TournamentService::players_for(&db, tournament_id).await?;
            if !members.iter().any(|p| p.username == sender) {
                return Err(AppError::BadRequest("Not a member of this tournament".to_string()));
            }
            // Le chat d'un tournoi terminé a été vidé, il reste fermé
            if TournamentService::get_by_id(&db, tournament_id).await?.ended_at.is_some() {
                return Err(AppError::Conflict(format!("Tournament {} is over", tournament_id)));
            }
            NewMessage::tournament(sender, body.receiver.as_deref(), tournament_id, &body.content)
        }
    };

    let stored = MessageService::add(&db, message).await?;
    Ok(HttpResponse::Created().json(stored))
}

pub fn chat_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/chat")
            .service(history)
            .service(send_message)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_connection;
    use crate::routes::test_support::{app_data, bearer};
    use actix_web::http::StatusCode;
    use actix_web::{test, App};

    macro_rules! app {
        ($db:expr) => {{
            let (db, config, codec) = app_data($db);
            test::init_service(
                App::new()
                    .app_data(db)
                    .app_data(config)
                    .app_data(codec)
                    .service(web::scope("/api").configure(chat_routes)),
            )
            .await
        }};
    }

    async fn seeded() -> DatabaseConnection {
        let db = test_connection().await;
        for name in ["alice", "bob"] {
            UserService::register_local(&db, name, "hash", None).await.unwrap();
        }
        db
    }

    #[actix_web::test]
    async fn test_send_then_read_history() {
        let app = app!(seeded().await);

        let req = test::TestRequest::post()
            .uri("/api/chat/messages")
            .insert_header(bearer("alice"))
            .set_json(serde_json::json!({ "type": "broadcast", "content": "hello all" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/api/chat/messages")
            .insert_header(bearer("alice"))
            .set_json(serde_json::json!({ "type": "private", "receiver": "bob", "content": "hi bob" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::get()
            .uri("/api/chat/history")
            .insert_header(bearer("bob"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["user"], "bob");
        assert_eq!(body["global"][0]["content"], "hello all");
        assert_eq!(body["private"][0]["content"], "hi bob");
        assert_eq!(body["private"][0]["type"], "private");
        assert_eq!(body["tournament"], serde_json::json!([]));
    }

    #[actix_web::test]
    async fn test_blocked_sender_is_refused() {
        let db = seeded().await;
        UserService::block(&db, "bob", "alice").await.unwrap();
        let app = app!(db);

        let req = test::TestRequest::post()
            .uri("/api/chat/messages")
            .insert_header(bearer("alice"))
            .set_json(serde_json::json!({ "type": "private", "receiver": "bob", "content": "hey" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_tournament_message_requires_membership() {
        let app = app!(seeded().await);
        let req = test::TestRequest::post()
            .uri("/api/chat/messages")
            .insert_header(bearer("alice"))
            .set_json(serde_json::json!({ "type": "tournament", "gameId": "t1", "content": "gl" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_ended_tournament_chat_is_closed() {
        let db = seeded().await;
        TournamentService::create(&db, "t1", "Duel", 2, None).await.unwrap();
        TournamentService::add_player(&db, "t1", "alice", "alice").await.unwrap();
        TournamentService::end(&db, "t1", Some("alice")).await.unwrap();
        let app = app!(db);

        let req = test::TestRequest::post()
            .uri("/api/chat/messages")
            .insert_header(bearer("alice"))
            .set_json(serde_json::json!({ "type": "tournament", "gameId": "t1", "content": "gg" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);
    }
}
