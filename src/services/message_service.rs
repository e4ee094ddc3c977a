use chrono::{NaiveDateTime, Utc};
use sea_orm::sea_query::Query;
use sea_orm::*;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::messages::{self, MessageKind};
use crate::models::tournaments;

pub struct MessageService;

/// Message de chat avant attribution de son id.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender: String,
    pub receiver: Option<String>,
    pub kind: MessageKind,
    pub content: String,
    pub game_id: Option<String>,
    pub sent_at: NaiveDateTime,
}

impl NewMessage {
    pub fn broadcast(sender: &str, content: &str) -> Self {
        Self::build(sender, None, MessageKind::Broadcast, content, None)
    }

    pub fn private(sender: &str, receiver: &str, content: &str) -> Self {
        Self::build(sender, Some(receiver), MessageKind::Private, content, None)
    }

    pub fn tournament(sender: &str, receiver: Option<&str>, tournament_id: &str, content: &str) -> Self {
        Self::build(sender, receiver, MessageKind::Tournament, content, Some(tournament_id))
    }

    fn build(
        sender: &str,
        receiver: Option<&str>,
        kind: MessageKind,
        content: &str,
        game_id: Option<&str>,
    ) -> Self {
        Self {
            sender: sender.to_string(),
            receiver: receiver.map(str::to_string),
            kind,
            content: content.to_string(),
            game_id: game_id.map(str::to_string),
            sent_at: Utc::now().naive_utc(),
        }
    }

    pub fn at(mut self, sent_at: NaiveDateTime) -> Self {
        self.sent_at = sent_at;
        self
    }

    /// Un broadcast n'a pas de destinataire, un message privé en exige un, un
    /// message de tournoi exige l'id du tournoi.
    pub fn validate(&self) -> AppResult<()> {
        match self.kind {
            MessageKind::Broadcast if self.receiver.is_some() => {
                Err(AppError::BadRequest("A broadcast message has no receiver".to_string()))
            }
            MessageKind::Private if self.receiver.is_none() => {
                Err(AppError::BadRequest("A private message needs a receiver".to_string()))
            }
            MessageKind::Tournament if self.game_id.is_none() => {
                Err(AppError::BadRequest("A tournament message needs a tournament id".to_string()))
            }
            _ => Ok(()),
        }
    }
}

impl MessageService {
    pub async fn add(db: &DatabaseConnection, new: NewMessage) -> AppResult<messages::Model> {
        new.validate()?;

        let model = messages::Model {
            id: Uuid::new_v4().to_string(),
            sender: new.sender,
            receiver: new.receiver,
            kind: new.kind,
            content: new.content,
            game_id: new.game_id,
            sent_at: new.sent_at,
        };
        let rows = messages::Entity::insert(model.clone().into_active_model().reset_all())
            .exec_without_returning(db)
            .await?;
        if rows == 0 {
            return Err(AppError::NoRowsAffected(format!("add {:?} message", model.kind)));
        }
        tracing::debug!(id = %model.id, kind = ?model.kind, sender = %model.sender, "Message stored");
        Ok(model)
    }

    pub async fn remove(db: &DatabaseConnection, id: &str) -> AppResult<()> {
        let result = messages::Entity::delete_by_id(id.to_string()).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NoRowsAffected(format!("remove message {}", id)));
        }
        tracing::info!(id, "Message removed");
        Ok(())
    }

    pub async fn remove_tournament_messages(db: &DatabaseConnection, tournament_id: &str) -> AppResult<u64> {
        let result = messages::Entity::delete_many()
            .filter(messages::Column::Kind.eq(MessageKind::Tournament))
            .filter(messages::Column::GameId.eq(tournament_id))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NoRowsAffected(format!(
                "remove messages of tournament {}",
                tournament_id
            )));
        }
        tracing::info!(tournament = tournament_id, rows = result.rows_affected, "Tournament chat removed");
        Ok(result.rows_affected)
    }

    /// Vide le chat d'un tournoi qui se termine. Un tournoi sans chat n'est pas une erreur.
    pub async fn clear_tournament_chat(db: &DatabaseConnection, tournament_id: &str) -> AppResult<u64> {
        match Self::remove_tournament_messages(db, tournament_id).await {
            Err(AppError::NoRowsAffected(_)) => Ok(0),
            other => other,
        }
    }

    /// Supprime les messages de tournoi dont le tournoi n'existe plus
    /// (lobbies balayés, parties interrompues au redémarrage).
    pub async fn remove_orphaned_tournament_chat(db: &DatabaseConnection) -> AppResult<u64> {
        let live = Query::select()
            .column(tournaments::Column::Id)
            .from(tournaments::Entity)
            .to_owned();
        let result = messages::Entity::delete_many()
            .filter(messages::Column::Kind.eq(MessageKind::Tournament))
            .filter(messages::Column::GameId.not_in_subquery(live))
            .exec(db)
            .await?;
        if result.rows_affected > 0 {
            tracing::info!(rows = result.rows_affected, "Orphaned tournament chat removed");
        }
        Ok(result.rows_affected)
    }

    fn chronological() -> Select<messages::Entity> {
        messages::Entity::find()
            .order_by_asc(messages::Column::SentAt)
            .order_by_asc(messages::Column::Id)
    }

    pub async fn all(db: &DatabaseConnection) -> AppResult<Vec<messages::Model>> {
        Ok(Self::chronological().all(db).await?)
    }

    pub async fn global(db: &DatabaseConnection) -> AppResult<Vec<messages::Model>> {
        Ok(Self::chronological()
            .filter(messages::Column::Kind.eq(MessageKind::Broadcast))
            .all(db)
            .await?)
    }

    /// Messages privés envoyés ou reçus par l'utilisateur.
    pub async fn private_for(db: &DatabaseConnection, username: &str) -> AppResult<Vec<messages::Model>> {
        Ok(Self::chronological()
            .filter(messages::Column::Kind.eq(MessageKind::Private))
            .filter(messages::Column::Receiver.is_not_null())
            .filter(
                Condition::any()
                    .add(messages::Column::Sender.eq(username))
                    .add(messages::Column::Receiver.eq(username)),
            )
            .all(db)
            .await?)
    }

    pub async fn sent_by(db: &DatabaseConnection, username: &str) -> AppResult<Vec<messages::Model>> {
        Ok(Self::chronological()
            .filter(messages::Column::Sender.eq(username))
            .all(db)
            .await?)
    }

    pub async fn received_by(db: &DatabaseConnection, username: &str) -> AppResult<Vec<messages::Model>> {
        Ok(Self::chronological()
            .filter(messages::Column::Receiver.eq(username))
            .all(db)
            .await?)
    }

    /// Tournoi dont l'utilisateur partage le chat de groupe, s'il y en a un.
    /// Un utilisateur n'est que dans un chat de tournoi ; plusieurs ids = erreur d'intégrité.
    pub async fn tournament_chat_for(db: &DatabaseConnection, username: &str) -> AppResult<Option<String>> {
        let rows = Self::chronological()
            .filter(messages::Column::Kind.eq(MessageKind::Tournament))
            .filter(
                Condition::any()
                    .add(messages::Column::Sender.eq(username))
                    .add(messages::Column::Receiver.eq(username)),
            )
            .all(db)
            .await?;

        let mut game_id: Option<String> = None;
        for found in rows.into_iter().filter_map(|m| m.game_id) {
            if let Some(current) = &game_id {
                if *current != found {
                    return Err(AppError::Integrity(format!(
                        "Messages for multiple tournaments for {}",
                        username
                    )));
                }
            } else {
                game_id = Some(found);
            }
        }
        Ok(game_id)
    }

    pub async fn tournament_messages(db: &DatabaseConnection, tournament_id: &str) -> AppResult<Vec<messages::Model>> {
        Ok(Self::chronological()
            .filter(messages::Column::Kind.eq(MessageKind::Tournament))
            .filter(messages::Column::GameId.eq(tournament_id))
            .all(db)
            .await?)
    }
}
