use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::*;

use crate::error::{AppError, AppResult};
use crate::models::matches::{self, MatchMode, Side};

pub const GUEST_WIN_NOTE: &str = "The winner is the guest";

pub struct MatchService;

/// Match à insérer : partie seule, ou case d'un tableau de tournoi.
#[derive(Debug, Clone)]
pub struct NewMatch {
    pub id: String,
    pub mode: MatchMode,
    pub bracket: Option<BracketSlot>,
}

#[derive(Debug, Clone)]
pub struct BracketSlot {
    pub tournament_id: String,
    pub round: i32,
    pub kind: String,
    pub placement_range: (i32, i32),
}

impl NewMatch {
    pub fn standalone(id: impl Into<String>, mode: MatchMode) -> Self {
        Self { id: id.into(), mode, bracket: None }
    }

    pub fn bracket_slot(
        id: impl Into<String>,
        tournament_id: impl Into<String>,
        round: i32,
        kind: impl Into<String>,
        placement_range: (i32, i32),
    ) -> Self {
        Self {
            id: id.into(),
            mode: MatchMode::Tournament,
            bracket: Some(BracketSlot {
                tournament_id: tournament_id.into(),
                round,
                kind: kind.into(),
                placement_range,
            }),
        }
    }
}

impl MatchService {
    pub async fn create(db: &DatabaseConnection, new: NewMatch) -> AppResult<()> {
        let (tournament_id, round, kind, range) = match &new.bracket {
            Some(slot) => (
                Some(slot.tournament_id.clone()),
                slot.round,
                Some(slot.kind.clone()),
                Some(serde_json::to_string(&[slot.placement_range.0, slot.placement_range.1])
                    .map_err(|e| AppError::Internal(e.to_string()))?),
            ),
            None => (None, 0, None, None),
        };

        let model = matches::ActiveModel {
            id: Set(new.id.clone()),
            mode: Set(new.mode),
            player_left: Set(None),
            player_right: Set(None),
            tournament_id: Set(tournament_id),
            round: Set(round),
            in_tournament_type: Set(kind),
            in_tournament_placement_range: Set(range),
            score_left: Set(0),
            score_right: Set(0),
            winner: Set(None),
            started_at: Set(None),
            ended_at: Set(None),
            notes: Set(None),
        };
        let rows = matches::Entity::insert(model).exec_without_returning(db).await?;
        if rows == 0 {
            return Err(AppError::NoRowsAffected(format!("create match {}", new.id)));
        }

        match &new.bracket {
            Some(slot) => tracing::info!(
                match_id = %new.id,
                tournament = %slot.tournament_id,
                round = slot.round,
                "Created tournament match"
            ),
            None => tracing::info!(match_id = %new.id, mode = ?new.mode, "Created single game"),
        }
        Ok(())
    }

    fn side_column(side: Side) -> matches::Column {
        match side {
            Side::Left => matches::Column::PlayerLeft,
            Side::Right => matches::Column::PlayerRight,
        }
    }

    async fn set_side(
        db: &DatabaseConnection,
        id: &str,
        side: Side,
        player: Option<&str>,
    ) -> AppResult<()> {
        let result = matches::Entity::update_many()
            .col_expr(Self::side_column(side), Expr::value(player.map(str::to_string)))
            .filter(matches::Column::Id.eq(id))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NoRowsAffected(format!(
                "set {} player of match {}",
                side.as_str(),
                id
            )));
        }
        Ok(())
    }

    pub async fn add_player(db: &DatabaseConnection, id: &str, username: &str, side: Side) -> AppResult<()> {
        Self::set_side(db, id, side, Some(username)).await?;
        tracing::info!(match_id = id, username, side = side.as_str(), "Player attached");
        Ok(())
    }

    /// Libère un côté, par exemple quand un joueur quitte une partie qui attend encore son adversaire.
    pub async fn remove_player(db: &DatabaseConnection, id: &str, side: Side) -> AppResult<()> {
        Self::set_side(db, id, side, None).await?;
        tracing::info!(match_id = id, side = side.as_str(), "Player detached");
        Ok(())
    }

    /// Renseigne `started_at` une seule fois.
    pub async fn start(db: &DatabaseConnection, id: &str) -> AppResult<()> {
        let result = matches::Entity::update_many()
            .col_expr(matches::Column::StartedAt, Expr::value(Utc::now().naive_utc()))
            .filter(matches::Column::Id.eq(id))
            .filter(matches::Column::StartedAt.is_null())
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            Self::get_by_id(db, id)
                .await
                .map_err(|_| AppError::NoRowsAffected(format!("start match {}", id)))?;
            tracing::debug!(match_id = id, "Match already started");
            return Ok(());
        }
        tracing::info!(match_id = id, "Match started");
        Ok(())
    }

    /// Enregistre le score courant. Un score ne baisse jamais et un match terminé est figé.
    pub async fn update_score(db: &DatabaseConnection, id: &str, left: i32, right: i32) -> AppResult<()> {
        let current = Self::get_by_id(db, id).await?;
        if current.ended_at.is_some() {
            return Err(AppError::Conflict(format!("Match {} is already over", id)));
        }
        if left < current.score_left || right < current.score_right {
            return Err(AppError::BadRequest(format!(
                "Score of match {} cannot go from {}-{} to {}-{}",
                id, current.score_left, current.score_right, left, right
            )));
        }

        let result = matches::Entity::update_many()
            .col_expr(matches::Column::ScoreLeft, Expr::value(left))
            .col_expr(matches::Column::ScoreRight, Expr::value(right))
            .filter(matches::Column::Id.eq(id))
            .filter(matches::Column::EndedAt.is_null())
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NoRowsAffected(format!("update match {}", id)));
        }
        tracing::debug!(match_id = id, left, right, "Score updated");
        Ok(())
    }

    /// Termine le match, `side` gagnant. La colonne winner contient le
    /// username du joueur, ou le nom du côté quand ce côté est un invité.
    /// N'exige pas `started_at`. Une deuxième fin est refusée.
    pub async fn end(db: &DatabaseConnection, id: &str, side: Side) -> AppResult<matches::Model> {
        let current = Self::get_by_id(db, id).await?;
        let winner = current.player(side).unwrap_or(side.as_str()).to_string();
        let notes = (current.mode == MatchMode::Local && side == Side::Right)
            .then(|| GUEST_WIN_NOTE.to_string());

        let result = matches::Entity::update_many()
            .col_expr(matches::Column::Winner, Expr::value(winner.clone()))
            .col_expr(matches::Column::Notes, Expr::value(notes))
            .col_expr(matches::Column::EndedAt, Expr::value(Utc::now().naive_utc()))
            .filter(matches::Column::Id.eq(id))
            .filter(matches::Column::EndedAt.is_null())
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NoRowsAffected(format!("end match {}", id)));
        }
        tracing::info!(match_id = id, winner = %winner, "Match ended");
        Self::get_by_id(db, id).await
    }

    pub async fn forfeit(db: &DatabaseConnection, id: &str, player: &str) -> AppResult<()> {
        let result = matches::Entity::update_many()
            .col_expr(
                matches::Column::Notes,
                Expr::value(format!("Match forfeited: player {} left", player)),
            )
            .col_expr(matches::Column::EndedAt, Expr::value(Utc::now().naive_utc()))
            .filter(matches::Column::Id.eq(id))
            .filter(matches::Column::EndedAt.is_null())
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NoRowsAffected(format!("forfeit match {}", id)));
        }
        tracing::info!(match_id = id, player, "Match forfeited");
        Ok(())
    }

    pub async fn remove(db: &DatabaseConnection, id: &str) -> AppResult<()> {
        let result = matches::Entity::delete_by_id(id.to_string()).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NoRowsAffected(format!("remove match {}", id)));
        }
        tracing::info!(match_id = id, "Match removed");
        Ok(())
    }

    pub async fn get_by_id(db: &DatabaseConnection, id: &str) -> AppResult<matches::Model> {
        matches::Entity::find_by_id(id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Match {}", id)))
    }

    pub async fn all(db: &DatabaseConnection) -> AppResult<Vec<matches::Model>> {
        Ok(matches::Entity::find()
            .order_by_asc(matches::Column::Id)
            .all(db)
            .await?)
    }

    /// Parties hors tournoi jouées par l'utilisateur, d'un côté ou de l'autre.
    pub async fn standalone_for_user(db: &DatabaseConnection, username: &str) -> AppResult<Vec<matches::Model>> {
        Ok(matches::Entity::find()
            .filter(matches::Column::TournamentId.is_null())
            .filter(
                Condition::any()
                    .add(matches::Column::PlayerLeft.eq(username))
                    .add(matches::Column::PlayerRight.eq(username)),
            )
            .order_by_desc(matches::Column::StartedAt)
            .all(db)
            .await?)
    }

    /// Matchs d'un tournoi, dans l'ordre du tableau.
    pub async fn for_tournament(db: &DatabaseConnection, tournament_id: &str) -> AppResult<Vec<matches::Model>> {
        Ok(matches::Entity::find()
            .filter(matches::Column::TournamentId.eq(tournament_id))
            .order_by_asc(matches::Column::Round)
            .order_by_asc(matches::Column::Id)
            .all(db)
            .await?)
    }
}
