use std::collections::HashMap;

use chrono::{Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::*;

use crate::error::{AppError, AppResult};
use crate::models::dto::{HistoryMatch, OpenTournament, PlayerView, TournamentHistory, TournamentWithPlayers};
use crate::models::{matches, tournament_players, tournaments};
use crate::services::message_service::MessageService;

pub struct TournamentService;

impl TournamentService {
    pub async fn create(
        db: &DatabaseConnection,
        id: &str,
        name: &str,
        size: i32,
        creator: Option<&str>,
    ) -> AppResult<()> {
        let tournament = tournaments::ActiveModel {
            id: Set(id.to_string()),
            name: Set(name.to_string()),
            size: Set(size),
            creator: Set(creator.map(str::to_string)),
            winner: Set(None),
            created_at: Set(Utc::now().naive_utc()),
            started_at: Set(None),
            ended_at: Set(None),
            notes: Set(None),
        };
        let rows = tournaments::Entity::insert(tournament)
            .exec_without_returning(db)
            .await?;
        if rows == 0 {
            return Err(AppError::NoRowsAffected(format!("create tournament {}", id)));
        }
        tracing::info!(tournament = id, title = name, size, "Created tournament");
        Ok(())
    }

    /// Renseigne `started_at`. Un tournoi déjà démarré garde sa première date.
    pub async fn start(db: &DatabaseConnection, id: &str) -> AppResult<()> {
        let result = tournaments::Entity::update_many()
            .col_expr(tournaments::Column::StartedAt, Expr::value(Utc::now().naive_utc()))
            .filter(tournaments::Column::Id.eq(id))
            .filter(tournaments::Column::StartedAt.is_null())
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            // Déjà démarré : pas une erreur. Absent : erreur.
            Self::get_by_id(db, id)
                .await
                .map_err(|_| AppError::NoRowsAffected(format!("start tournament {}", id)))?;
            tracing::debug!(tournament = id, "Tournament already started");
            return Ok(());
        }
        tracing::info!(tournament = id, "Started tournament");
        Ok(())
    }

    /// Termine un tournoi en cours. Une deuxième fin est refusée.
    pub async fn end(db: &DatabaseConnection, id: &str, winner: Option<&str>) -> AppResult<()> {
        let result = tournaments::Entity::update_many()
            .col_expr(tournaments::Column::Winner, Expr::value(winner.map(str::to_string)))
            .col_expr(tournaments::Column::EndedAt, Expr::value(Utc::now().naive_utc()))
            .filter(tournaments::Column::Id.eq(id))
            .filter(tournaments::Column::EndedAt.is_null())
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NoRowsAffected(format!("end tournament {}", id)));
        }
        MessageService::clear_tournament_chat(db, id).await?;
        tracing::info!(tournament = id, winner = winner.unwrap_or("none"), "Tournament ended");
        Ok(())
    }

    pub async fn forfeit(db: &DatabaseConnection, id: &str, player: &str) -> AppResult<()> {
        let result = tournaments::Entity::update_many()
            .col_expr(
                tournaments::Column::Notes,
                Expr::value(format!("Tournament forfeited: player {} left", player)),
            )
            .col_expr(tournaments::Column::EndedAt, Expr::value(Utc::now().naive_utc()))
            .filter(tournaments::Column::Id.eq(id))
            .filter(tournaments::Column::EndedAt.is_null())
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NoRowsAffected(format!("forfeit tournament {}", id)));
        }
        MessageService::clear_tournament_chat(db, id).await?;
        tracing::info!(tournament = id, player, "Tournament forfeited");
        Ok(())
    }

    /// Supprime un tournoi avec ses inscriptions et ses matchs. Un id absent est ignoré.
    pub async fn remove(db: &DatabaseConnection, id: &str) -> AppResult<()> {
        MessageService::clear_tournament_chat(db, id).await?;
        let result = tournaments::Entity::delete_by_id(id.to_string()).exec(db).await?;
        tracing::info!(tournament = id, rows = result.rows_affected, "Tournament removed");
        Ok(())
    }

    pub async fn get_by_id(db: &DatabaseConnection, id: &str) -> AppResult<tournaments::Model> {
        tournaments::Entity::find_by_id(id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tournament {}", id)))
    }

    pub async fn all(db: &DatabaseConnection) -> AppResult<Vec<tournaments::Model>> {
        Ok(tournaments::Entity::find()
            .order_by_asc(tournaments::Column::CreatedAt)
            .order_by_asc(tournaments::Column::Id)
            .all(db)
            .await?)
    }

    /// Lobbies qui attendent encore des joueurs.
    pub async fn open(db: &DatabaseConnection) -> AppResult<Vec<OpenTournament>> {
        let rows = tournaments::Entity::find()
            .filter(tournaments::Column::StartedAt.is_null())
            .order_by_asc(tournaments::Column::CreatedAt)
            .order_by_asc(tournaments::Column::Id)
            .all(db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|t| OpenTournament { id: t.id, name: t.name, size: t.size })
            .collect())
    }

    pub async fn count_by_creator(db: &DatabaseConnection, creator: &str) -> AppResult<u64> {
        Ok(tournaments::Entity::find()
            .filter(tournaments::Column::Creator.eq(creator))
            .count(db)
            .await?)
    }

    pub async fn with_players(db: &DatabaseConnection, id: &str) -> AppResult<TournamentWithPlayers> {
        let mut rows = tournaments::Entity::find_by_id(id.to_string())
            .find_with_related(tournament_players::Entity)
            .all(db)
            .await?;

        let (tournament, players) = rows
            .pop()
            .ok_or_else(|| AppError::NotFound(format!("Tournament {}", id)))?;
        Ok(TournamentWithPlayers::new(tournament, players.into_iter().map(player_view).collect()))
    }

    /// Tous les tournois avec leurs joueurs, les plus récemment démarrés d'abord.
    pub async fn all_with_players(db: &DatabaseConnection) -> AppResult<Vec<TournamentWithPlayers>> {
        let rows = tournaments::Entity::find()
            .find_with_related(tournament_players::Entity)
            .all(db)
            .await?;

        let mut list: Vec<TournamentWithPlayers> = rows
            .into_iter()
            .map(|(t, players)| {
                TournamentWithPlayers::new(t, players.into_iter().map(player_view).collect())
            })
            .collect();
        // Les lobbies (started_at NULL) en premier, comme NULLS FIRST en DESC sous PostgreSQL
        list.sort_by(|a, b| match (a.started_at, b.started_at) {
            (None, None) => a.created_at.cmp(&b.created_at),
            (None, Some(_)) => std::cmp::Ordering::Less,
            (Some(_), None) => std::cmp::Ordering::Greater,
            (Some(x), Some(y)) => y.cmp(&x),
        });
        Ok(list)
    }

    /// Tournois rejoints par l'utilisateur, du plus récent au plus ancien, chacun avec les
    /// matchs qu'il y a joués, finale en premier.
    pub async fn history_for_user(
        db: &DatabaseConnection,
        username: &str,
    ) -> AppResult<Vec<TournamentHistory>> {
        let joined = tournaments::Entity::find()
            .inner_join(tournament_players::Entity)
            .filter(tournament_players::Column::Username.eq(username))
            .order_by_desc(tournaments::Column::CreatedAt)
            .all(db)
            .await?;
        if joined.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = joined.iter().map(|t| t.id.clone()).collect();
        let played = matches::Entity::find()
            .filter(matches::Column::TournamentId.is_in(ids))
            .filter(
                Condition::any()
                    .add(matches::Column::PlayerLeft.eq(username))
                    .add(matches::Column::PlayerRight.eq(username)),
            )
            .order_by_desc(matches::Column::Round)
            .order_by_desc(matches::Column::Id)
            .all(db)
            .await?;

        let mut by_tournament: HashMap<String, Vec<HistoryMatch>> = HashMap::new();
        for m in played {
            if let Some(tid) = m.tournament_id.clone() {
                by_tournament.entry(tid).or_default().push(HistoryMatch::from(m));
            }
        }

        Ok(joined
            .into_iter()
            .map(|t| TournamentHistory {
                matches: by_tournament.remove(&t.id).unwrap_or_default(),
                id: t.id,
                name: t.name,
                winner: t.winner,
                created_at: t.created_at,
                notes: t.notes,
            })
            .collect())
    }

    // ------------------------------------------------------------------
    // Inscriptions
    // ------------------------------------------------------------------

    /// Inscrit un joueur. Une double inscription viole la clé primaire.
    pub async fn add_player(
        db: &DatabaseConnection,
        tournament_id: &str,
        username: &str,
        display_name: &str,
    ) -> AppResult<()> {
        let member = tournament_players::ActiveModel {
            tournament_id: Set(tournament_id.to_string()),
            username: Set(username.to_string()),
            display_name: Set(display_name.to_string()),
        };
        let rows = tournament_players::Entity::insert(member)
            .exec_without_returning(db)
            .await?;
        if rows == 0 {
            return Err(AppError::NoRowsAffected(format!(
                "add {} to tournament {}",
                username, tournament_id
            )));
        }
        tracing::info!(tournament = tournament_id, username, "Player joined tournament");
        Ok(())
    }

    /// Retire une inscription pour permettre de revenir plus tard. Un non-inscrit est ignoré.
    pub async fn remove_player(db: &DatabaseConnection, tournament_id: &str, username: &str) -> AppResult<()> {
        let result = tournament_players::Entity::delete_many()
            .filter(tournament_players::Column::TournamentId.eq(tournament_id))
            .filter(tournament_players::Column::Username.eq(username))
            .exec(db)
            .await?;
        tracing::info!(
            tournament = tournament_id,
            username,
            rows = result.rows_affected,
            "Player left tournament"
        );
        Ok(())
    }

    pub async fn all_players(db: &DatabaseConnection) -> AppResult<Vec<tournament_players::Model>> {
        Ok(tournament_players::Entity::find()
            .order_by_asc(tournament_players::Column::TournamentId)
            .order_by_asc(tournament_players::Column::Username)
            .all(db)
            .await?)
    }

    pub async fn players_for(db: &DatabaseConnection, tournament_id: &str) -> AppResult<Vec<PlayerView>> {
        let rows = tournament_players::Entity::find()
            .filter(tournament_players::Column::TournamentId.eq(tournament_id))
            .order_by_asc(tournament_players::Column::Username)
            .all(db)
            .await?;
        if rows.is_empty() {
            return Err(AppError::NotFound(format!("Players of tournament {}", tournament_id)));
        }
        Ok(rows.into_iter().map(player_view).collect())
    }

    pub async fn player_count(db: &DatabaseConnection, tournament_id: &str) -> AppResult<u64> {
        Ok(tournament_players::Entity::find()
            .filter(tournament_players::Column::TournamentId.eq(tournament_id))
            .count(db)
            .await?)
    }

    pub async fn tournaments_for_user(
        db: &DatabaseConnection,
        username: &str,
    ) -> AppResult<Vec<tournaments::Model>> {
        let rows = tournaments::Entity::find()
            .inner_join(tournament_players::Entity)
            .filter(tournament_players::Column::Username.eq(username))
            .order_by_desc(tournaments::Column::StartedAt)
            .all(db)
            .await?;
        if rows.is_empty() {
            return Err(AppError::NotFound(format!("Tournaments of user {}", username)));
        }
        Ok(rows)
    }

    /// Tournoi non terminé (lobby ou en cours) auquel l'utilisateur est inscrit.
    pub async fn active_for_user(db: &DatabaseConnection, username: &str) -> AppResult<Option<tournaments::Model>> {
        Ok(tournaments::Entity::find()
            .inner_join(tournament_players::Entity)
            .filter(tournament_players::Column::Username.eq(username))
            .filter(tournaments::Column::EndedAt.is_null())
            .order_by_desc(tournaments::Column::CreatedAt)
            .one(db)
            .await?)
    }

    /// Supprime les lobbies jamais démarrés créés il y a plus de
    /// `minutes` minutes. Un tournoi démarré n'est jamais touché.
    pub async fn sweep_abandoned(db: &DatabaseConnection, minutes: i64) -> AppResult<u64> {
        let cutoff = Utc::now().naive_utc() - Duration::minutes(minutes);
        let result = tournaments::Entity::delete_many()
            .filter(tournaments::Column::StartedAt.is_null())
            .filter(tournaments::Column::CreatedAt.lt(cutoff))
            .exec(db)
            .await?;
        if result.rows_affected > 0 {
            tracing::info!(
                deleted = result.rows_affected,
                minutes,
                "Cleaned up abandoned tournaments"
            );
        }
        MessageService::remove_orphaned_tournament_chat(db).await?;
        Ok(result.rows_affected)
    }
}

fn player_view(p: tournament_players::Model) -> PlayerView {
    PlayerView { username: p.username, display_name: p.display_name }
}

#[cfg(test)]
pub(crate) async fn backdate(db: &DatabaseConnection, id: &str, minutes: i64) {
    tournaments::Entity::update_many()
        .col_expr(
            tournaments::Column::CreatedAt,
            Expr::value(Utc::now().naive_utc() - Duration::minutes(minutes)),
        )
        .filter(tournaments::Column::Id.eq(id))
        .exec(db)
        .await
        .unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_connection;
    use crate::models::matches::{MatchMode, Side};
    use crate::services::match_service::{MatchService, NewMatch};
    use crate::services::message_service::NewMessage;
    use crate::services::user_service::UserService;

    async fn seed_users(db: &DatabaseConnection, names: &[&str]) {
        for name in names {
            UserService::register_local(db, name, "hash", None).await.unwrap();
        }
    }

    #[actix_web::test]
    async fn test_full_lobby_lists_sorted_players() {
        let db = test_connection().await;
        seed_users(&db, &["alice", "bob", "carol", "dave"]).await;
        TournamentService::create(&db, "t1", "Cup", 4, Some("alice")).await.unwrap();

        for name in ["dave", "alice", "carol", "bob"] {
            TournamentService::add_player(&db, "t1", name, name).await.unwrap();
        }
        TournamentService::start(&db, "t1").await.unwrap();

        let t = TournamentService::with_players(&db, "t1").await.unwrap();
        let names: Vec<&str> = t.players.iter().map(|p| p.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob", "carol", "dave"]);
        assert!(t.started_at.is_some());
    }

    #[actix_web::test]
    async fn test_membership_is_unique_and_removal_tolerant() {
        let db = test_connection().await;
        seed_users(&db, &["alice", "bob"]).await;
        TournamentService::create(&db, "t1", "Cup", 4, Some("alice")).await.unwrap();

        TournamentService::add_player(&db, "t1", "alice", "Alice").await.unwrap();
        assert!(TournamentService::add_player(&db, "t1", "alice", "Alice").await.is_err());

        TournamentService::remove_player(&db, "t1", "bob").await.unwrap();
        TournamentService::remove_player(&db, "t1", "alice").await.unwrap();
        // Peut rejoindre de nouveau après avoir quitté
        TournamentService::add_player(&db, "t1", "alice", "Alice").await.unwrap();
        assert_eq!(TournamentService::player_count(&db, "t1").await.unwrap(), 1);
    }

    #[actix_web::test]
    async fn test_unknown_tournament() {
        let db = test_connection().await;
        assert!(matches!(
            TournamentService::with_players(&db, "nope").await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            TournamentService::start(&db, "nope").await.unwrap_err(),
            AppError::NoRowsAffected(_)
        ));
        assert!(TournamentService::players_for(&db, "nope").await.is_err());
        TournamentService::remove(&db, "nope").await.unwrap();
    }

    #[actix_web::test]
    async fn test_start_keeps_first_stamp() {
        let db = test_connection().await;
        TournamentService::create(&db, "t1", "Cup", 2, None).await.unwrap();
        TournamentService::start(&db, "t1").await.unwrap();
        let first = TournamentService::get_by_id(&db, "t1").await.unwrap().started_at;

        TournamentService::start(&db, "t1").await.unwrap();
        let second = TournamentService::get_by_id(&db, "t1").await.unwrap().started_at;
        assert_eq!(first, second);
    }

    #[actix_web::test]
    async fn test_end_and_forfeit_only_once() {
        let db = test_connection().await;
        seed_users(&db, &["alice"]).await;
        TournamentService::create(&db, "t1", "Cup", 2, None).await.unwrap();
        TournamentService::create(&db, "t2", "Cup", 2, None).await.unwrap();

        TournamentService::end(&db, "t1", Some("alice")).await.unwrap();
        assert!(TournamentService::end(&db, "t1", Some("alice")).await.is_err());

        TournamentService::forfeit(&db, "t2", "bob").await.unwrap();
        let t2 = TournamentService::get_by_id(&db, "t2").await.unwrap();
        assert_eq!(t2.notes.as_deref(), Some("Tournament forfeited: player bob left"));
        assert!(t2.ended_at.is_some());
        assert!(TournamentService::forfeit(&db, "t2", "bob").await.is_err());
    }

    #[actix_web::test]
    async fn test_open_lists_unstarted_only() {
        let db = test_connection().await;
        TournamentService::create(&db, "a", "A", 4, None).await.unwrap();
        TournamentService::create(&db, "b", "B", 8, None).await.unwrap();
        TournamentService::start(&db, "a").await.unwrap();

        let open = TournamentService::open(&db).await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, "b");
        assert_eq!(open[0].size, 8);
    }

    #[actix_web::test]
    async fn test_count_by_creator() {
        let db = test_connection().await;
        seed_users(&db, &["alice"]).await;
        TournamentService::create(&db, "a", "A", 4, Some("alice")).await.unwrap();
        TournamentService::create(&db, "b", "B", 4, Some("alice")).await.unwrap();
        TournamentService::create(&db, "c", "C", 4, None).await.unwrap();
        assert_eq!(TournamentService::count_by_creator(&db, "alice").await.unwrap(), 2);
        assert_eq!(TournamentService::count_by_creator(&db, "bob").await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn test_sweep_spares_started_tournaments() {
        let db = test_connection().await;
        TournamentService::create(&db, "stale", "Stale", 4, None).await.unwrap();
        TournamentService::create(&db, "fresh", "Fresh", 4, None).await.unwrap();
        TournamentService::create(&db, "running", "Running", 4, None).await.unwrap();
        TournamentService::start(&db, "running").await.unwrap();

        backdate(&db, "stale", 10).await;
        backdate(&db, "running", 600).await;

        assert_eq!(TournamentService::sweep_abandoned(&db, 3).await.unwrap(), 1);
        assert!(TournamentService::get_by_id(&db, "stale").await.is_err());
        assert!(TournamentService::get_by_id(&db, "fresh").await.is_ok());
        assert!(TournamentService::get_by_id(&db, "running").await.is_ok());
    }

    #[actix_web::test]
    async fn test_sweep_and_remove_drop_tournament_chat() {
        let db = test_connection().await;
        seed_users(&db, &["alice", "bob"]).await;
        TournamentService::create(&db, "stale", "Stale", 4, None).await.unwrap();
        TournamentService::create(&db, "gone", "Gone", 4, None).await.unwrap();
        MessageService::add(&db, NewMessage::tournament("alice", None, "stale", "anyone?")).await.unwrap();
        MessageService::add(&db, NewMessage::tournament("bob", None, "gone", "hi")).await.unwrap();
        backdate(&db, "stale", 10).await;

        TournamentService::sweep_abandoned(&db, 3).await.unwrap();
        assert!(MessageService::tournament_messages(&db, "stale").await.unwrap().is_empty());
        assert_eq!(MessageService::tournament_messages(&db, "gone").await.unwrap().len(), 1);

        TournamentService::remove(&db, "gone").await.unwrap();
        assert!(MessageService::tournament_messages(&db, "gone").await.unwrap().is_empty());
        // Un tournoi sans chat se supprime sans erreur
        TournamentService::create(&db, "quiet", "Quiet", 2, None).await.unwrap();
        TournamentService::remove(&db, "quiet").await.unwrap();
    }

    #[actix_web::test]
    async fn test_remove_cascades_to_members_and_matches() {
        let db = test_connection().await;
        seed_users(&db, &["alice"]).await;
        TournamentService::create(&db, "t1", "Cup", 2, None).await.unwrap();
        TournamentService::add_player(&db, "t1", "alice", "alice").await.unwrap();
        MatchService::create(&db, NewMatch::bracket_slot("m1", "t1", 1, "final", (1, 2)))
            .await
            .unwrap();

        TournamentService::remove(&db, "t1").await.unwrap();
        assert_eq!(TournamentService::player_count(&db, "t1").await.unwrap(), 0);
        assert!(MatchService::get_by_id(&db, "m1").await.is_err());
    }

    #[actix_web::test]
    async fn test_history_groups_matches_by_tournament() {
        let db = test_connection().await;
        seed_users(&db, &["alice", "bob", "carol", "dave"]).await;
        TournamentService::create(&db, "t1", "Cup", 4, Some("alice")).await.unwrap();
        for name in ["alice", "bob", "carol", "dave"] {
            TournamentService::add_player(&db, "t1", name, name).await.unwrap();
        }

        MatchService::create(&db, NewMatch::bracket_slot("semi-1", "t1", 1, "semi", (1, 4)))
            .await
            .unwrap();
        MatchService::create(&db, NewMatch::bracket_slot("semi-2", "t1", 1, "semi", (1, 4)))
            .await
            .unwrap();
        MatchService::create(&db, NewMatch::bracket_slot("final", "t1", 2, "final", (1, 2)))
            .await
            .unwrap();
        MatchService::add_player(&db, "semi-1", "alice", Side::Left).await.unwrap();
        MatchService::add_player(&db, "semi-1", "bob", Side::Right).await.unwrap();
        MatchService::add_player(&db, "semi-2", "carol", Side::Left).await.unwrap();
        MatchService::add_player(&db, "semi-2", "dave", Side::Right).await.unwrap();
        MatchService::add_player(&db, "final", "alice", Side::Left).await.unwrap();
        MatchService::add_player(&db, "final", "carol", Side::Right).await.unwrap();

        // Un match seul n'apparaît pas dans l'historique des tournois
        MatchService::create(&db, NewMatch::standalone("solo", MatchMode::Online)).await.unwrap();
        MatchService::add_player(&db, "solo", "alice", Side::Left).await.unwrap();

        let history = TournamentService::history_for_user(&db, "alice").await.unwrap();
        assert_eq!(history.len(), 1);
        let ids: Vec<&str> = history[0].matches.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["final", "semi-1"]);
        assert_eq!(history[0].matches[0].placement_range.as_deref(), Some("[1,2]"));

        assert!(TournamentService::history_for_user(&db, "nobody").await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_tournaments_for_user_requires_membership() {
        let db = test_connection().await;
        seed_users(&db, &["alice"]).await;
        assert!(TournamentService::tournaments_for_user(&db, "alice").await.is_err());

        TournamentService::create(&db, "t1", "Cup", 2, None).await.unwrap();
        TournamentService::add_player(&db, "t1", "alice", "alice").await.unwrap();
        let list = TournamentService::tournaments_for_user(&db, "alice").await.unwrap();
        assert_eq!(list.len(), 1);
    }

    #[actix_web::test]
    async fn test_all_players_across_tournaments() {
        let db = test_connection().await;
        seed_users(&db, &["alice", "bob"]).await;
        TournamentService::create(&db, "t2", "Late", 2, None).await.unwrap();
        TournamentService::create(&db, "t1", "Early", 2, None).await.unwrap();
        TournamentService::add_player(&db, "t2", "bob", "bob").await.unwrap();
        TournamentService::add_player(&db, "t1", "bob", "bob").await.unwrap();
        TournamentService::add_player(&db, "t1", "alice", "alice").await.unwrap();

        let rows: Vec<(String, String)> = TournamentService::all_players(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|p| (p.tournament_id, p.username))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("t1".to_string(), "alice".to_string()),
                ("t1".to_string(), "bob".to_string()),
                ("t2".to_string(), "bob".to_string()),
            ]
        );
    }
}
