use sea_orm::DatabaseConnection;

use crate::models::dto::ChatHistory;
use crate::services::message_service::MessageService;

pub struct ChatService;

impl ChatService {
    /// Construit les trois vues de chat d'un utilisateur. Chaque vue est chargée seule :
    /// une vue en échec reste vide et son erreur va dans `faults` ; les autres
    /// vues sont renvoyées quand même.
    pub async fn build_history(db: &DatabaseConnection, username: &str) -> ChatHistory {
        let mut history = ChatHistory {
            user: username.to_string(),
            ..Default::default()
        };

        match MessageService::global(db).await {
            Ok(messages) => history.global = messages,
            Err(e) => history.faults.push(format!("global: {}", e)),
        }

        match MessageService::private_for(db, username).await {
            Ok(messages) => history.private = messages,
            Err(e) => history.faults.push(format!("private: {}", e)),
        }

        match MessageService::tournament_chat_for(db, username).await {
            Ok(Some(tournament_id)) => {
                match MessageService::tournament_messages(db, &tournament_id).await {
                    Ok(messages) => history.tournament = messages,
                    Err(e) => history.faults.push(format!("tournament: {}", e)),
                }
            }
            Ok(None) => {}
            Err(e) => history.faults.push(format!("tournament: {}", e)),
        }

        if !history.is_complete() {
            tracing::warn!(user = username, faults = ?history.faults, "Partial chat history");
        }
        history
    }
}
