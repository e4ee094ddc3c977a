// Orchestration des événements de jeu : lobby, inscriptions, score, fin, abandon.
// Chaque opération se traduit en appels aux services de persistance.

use sea_orm::DatabaseConnection;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::dto::TournamentWithPlayers;
use crate::models::matches::{self, Side};
use crate::services::match_service::{MatchService, NewMatch};
use crate::services::tournament_service::TournamentService;

pub const MIN_TOURNAMENT_SIZE: i32 = 2;
pub const MAX_TOURNAMENT_SIZE: i32 = 16;

/// Résultat d'une inscription : encore en attente, ou le lobby vient d'être rempli
/// et le tournoi a démarré.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JoinOutcome {
    Waiting { players: u64, size: i32 },
    Started,
}

pub struct LifecycleService;

impl LifecycleService {
    /// Un tableau à élimination directe exige une puissance de deux joueurs.
    pub fn validate_size(size: i32) -> AppResult<()> {
        if !(MIN_TOURNAMENT_SIZE..=MAX_TOURNAMENT_SIZE).contains(&size) || size.count_ones() != 1 {
            return Err(AppError::BadRequest(format!(
                "Tournament size must be a power of two between {} and {}",
                MIN_TOURNAMENT_SIZE, MAX_TOURNAMENT_SIZE
            )));
        }
        Ok(())
    }

    /// Ouvre un lobby avec un nouvel id ; le créateur en est le premier joueur.
    pub async fn create_lobby(
        db: &DatabaseConnection,
        name: &str,
        size: i32,
        creator: &str,
    ) -> AppResult<TournamentWithPlayers> {
        Self::validate_size(size)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("Tournament name is required".to_string()));
        }

        Self::ensure_free(db, creator).await?;

        let id = Uuid::new_v4().to_string();
        TournamentService::create(db, &id, name, size, Some(creator)).await?;
        TournamentService::add_player(db, &id, creator, creator).await?;
        TournamentService::with_players(db, &id).await
    }

    /// Inscrit un joueur ; l'inscription qui remplit le lobby démarre le tournoi.
    pub async fn join(
        db: &DatabaseConnection,
        tournament_id: &str,
        username: &str,
        display_name: &str,
    ) -> AppResult<JoinOutcome> {
        let tournament = TournamentService::get_by_id(db, tournament_id).await?;
        if tournament.started_at.is_some() {
            return Err(AppError::Conflict(format!("Tournament {} already started", tournament_id)));
        }
        Self::ensure_free(db, username).await?;
        let players = TournamentService::player_count(db, tournament_id).await?;
        if players >= tournament.size as u64 {
            return Err(AppError::Conflict(format!("Tournament {} is full", tournament_id)));
        }

        TournamentService::add_player(db, tournament_id, username, display_name).await?;
        let players = players + 1;

        if players == tournament.size as u64 {
            TournamentService::start(db, tournament_id).await?;
            return Ok(JoinOutcome::Started);
        }
        Ok(JoinOutcome::Waiting { players, size: tournament.size })
    }

    /// Un joueur ne participe qu'à un tournoi (et donc un chat de tournoi) à la fois.
    async fn ensure_free(db: &DatabaseConnection, username: &str) -> AppResult<()> {
        if let Some(current) = TournamentService::active_for_user(db, username).await? {
            return Err(AppError::Conflict(format!(
                "{} is already registered in tournament {}",
                username, current.id
            )));
        }
        Ok(())
    }

    /// Un joueur s'en va. Dans un lobby son inscription est retirée (et un lobby
    /// vide supprimé) ; dans un tournoi en cours c'est un abandon.
    pub async fn leave(db: &DatabaseConnection, tournament_id: &str, username: &str) -> AppResult<()> {
        let tournament = TournamentService::get_by_id(db, tournament_id).await?;

        if tournament.started_at.is_none() {
            TournamentService::remove_player(db, tournament_id, username).await?;
            if TournamentService::player_count(db, tournament_id).await? == 0 {
                TournamentService::remove(db, tournament_id).await?;
            }
            return Ok(());
        }

        if tournament.ended_at.is_none() {
            TournamentService::forfeit(db, tournament_id, username).await?;
        }
        Ok(())
    }

    /// Crée et démarre une partie hors tournoi avec les joueurs donnés.
    pub async fn start_single_game(
        db: &DatabaseConnection,
        mode: matches::MatchMode,
        left: &str,
        right: Option<&str>,
    ) -> AppResult<matches::Model> {
        match (mode, right) {
            (matches::MatchMode::Tournament, _) => {
                return Err(AppError::BadRequest(
                    "Tournament matches are scheduled from their tournament".to_string(),
                ));
            }
            (matches::MatchMode::Online, None) => {
                return Err(AppError::BadRequest("An online game needs an opponent".to_string()));
            }
            (matches::MatchMode::Online, Some(opponent)) if opponent == left => {
                return Err(AppError::BadRequest("A player cannot face themselves".to_string()));
            }
            (matches::MatchMode::Local, Some(_)) => {
                return Err(AppError::BadRequest("A local game is played against a guest".to_string()));
            }
            _ => {}
        }

        let id = Uuid::new_v4().to_string();
        MatchService::create(db, NewMatch::standalone(&id, mode)).await?;
        MatchService::add_player(db, &id, left, Side::Left).await?;
        if let Some(right) = right {
            MatchService::add_player(db, &id, right, Side::Right).await?;
        }
        MatchService::start(db, &id).await?;
        MatchService::get_by_id(db, &id).await
    }

    /// Programme un match de tableau entre deux inscrits d'un tournoi en cours.
    pub async fn schedule_match(
        db: &DatabaseConnection,
        tournament_id: &str,
        round: i32,
        kind: &str,
        placement_range: (i32, i32),
        left: &str,
        right: &str,
    ) -> AppResult<matches::Model> {
        let tournament = TournamentService::get_by_id(db, tournament_id).await?;
        if tournament.started_at.is_none() || tournament.ended_at.is_some() {
            return Err(AppError::Conflict(format!("Tournament {} is not running", tournament_id)));
        }
        if left == right {
            return Err(AppError::BadRequest("A player cannot face themselves".to_string()));
        }
        let (best, worst) = placement_range;
        if round < 1 || best < 1 || best >= worst || worst > tournament.size {
            return Err(AppError::BadRequest(format!(
                "Invalid bracket slot: round {} placements {}-{}",
                round, best, worst
            )));
        }
        let members = TournamentService::players_for(db, tournament_id).await?;
        for player in [left, right] {
            if !members.iter().any(|p| p.username == player) {
                return Err(AppError::BadRequest(format!(
                    "{} is not registered in tournament {}",
                    player, tournament_id
                )));
            }
        }

        let id = Uuid::new_v4().to_string();
        MatchService::create(db, NewMatch::bracket_slot(&id, tournament_id, round, kind, placement_range)).await?;
        MatchService::add_player(db, &id, left, Side::Left).await?;
        MatchService::add_player(db, &id, right, Side::Right).await?;
        MatchService::get_by_id(db, &id).await
    }

    pub async fn record_score(db: &DatabaseConnection, match_id: &str, left: i32, right: i32) -> AppResult<()> {
        MatchService::update_score(db, match_id, left, right).await
    }

    /// Termine un match. Si c'est la finale d'un tournoi (placement
    /// `[1,2]`), le tournoi se termine aussi, avec le même vainqueur.
    pub async fn finish_match(db: &DatabaseConnection, match_id: &str, side: Side) -> AppResult<matches::Model> {
        let ended = MatchService::end(db, match_id, side).await?;

        if let Some(tournament_id) = ended.tournament_id.as_deref() {
            if is_final(&ended) {
                TournamentService::end(db, tournament_id, ended.player(side)).await?;
            }
        }
        Ok(ended)
    }

    /// Un joueur quitte en cours de partie. Un match de tournoi entraîne le tournoi avec lui.
    pub async fn forfeit_match(db: &DatabaseConnection, match_id: &str, player: &str) -> AppResult<()> {
        let current = MatchService::get_by_id(db, match_id).await?;
        MatchService::forfeit(db, match_id, player).await?;

        if let Some(tournament_id) = current.tournament_id.as_deref() {
            let tournament = TournamentService::get_by_id(db, tournament_id).await?;
            if tournament.ended_at.is_none() {
                TournamentService::forfeit(db, tournament_id, player).await?;
            }
        }
        Ok(())
    }
}

fn is_final(m: &matches::Model) -> bool {
    m.in_tournament_placement_range
        .as_deref()
        .and_then(|raw| serde_json::from_str::<[i32; 2]>(raw).ok())
        .map(|range| range == [1, 2])
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_connection;
    use crate::models::matches::MatchMode;
    use crate::services::chat_service::ChatService;
    use crate::services::message_service::{MessageService, NewMessage};
    use crate::services::user_service::UserService;

    async fn seed(db: &DatabaseConnection, names: &[&str]) {
        for name in names {
            UserService::register_local(db, name, "hash", None).await.unwrap();
        }
    }

    #[test]
    fn test_validate_size() {
        for ok in [2, 4, 8, 16] {
            assert!(LifecycleService::validate_size(ok).is_ok());
        }
        for bad in [0, 1, 3, 6, 32, -4] {
            assert!(LifecycleService::validate_size(bad).is_err());
        }
    }

    #[actix_web::test]
    async fn test_fourth_join_starts_tournament() {
        let db = test_connection().await;
        seed(&db, &["alice", "bob", "carol", "dave"]).await;

        let lobby = LifecycleService::create_lobby(&db, "Cup", 4, "alice").await.unwrap();
        assert_eq!(lobby.players.len(), 1);
        assert!(lobby.started_at.is_none());

        assert_eq!(
            LifecycleService::join(&db, &lobby.id, "bob", "Bobby").await.unwrap(),
            JoinOutcome::Waiting { players: 2, size: 4 }
        );
        LifecycleService::join(&db, &lobby.id, "carol", "carol").await.unwrap();
        assert_eq!(
            LifecycleService::join(&db, &lobby.id, "dave", "dave").await.unwrap(),
            JoinOutcome::Started
        );

        let t = TournamentService::with_players(&db, &lobby.id).await.unwrap();
        assert!(t.started_at.is_some());
        let names: Vec<&str> = t.players.iter().map(|p| p.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob", "carol", "dave"]);
        assert_eq!(t.players[1].display_name, "Bobby");
    }

    #[actix_web::test]
    async fn test_join_rules() {
        let db = test_connection().await;
        seed(&db, &["alice", "bob", "carol"]).await;
        let lobby = LifecycleService::create_lobby(&db, "Duel", 2, "alice").await.unwrap();

        assert!(LifecycleService::join(&db, &lobby.id, "alice", "alice").await.is_err());
        LifecycleService::join(&db, &lobby.id, "bob", "bob").await.unwrap();
        assert!(matches!(
            LifecycleService::join(&db, &lobby.id, "carol", "carol").await.unwrap_err(),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            LifecycleService::join(&db, "missing", "carol", "carol").await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[actix_web::test]
    async fn test_leave_lobby_then_rejoin() {
        let db = test_connection().await;
        seed(&db, &["alice", "bob"]).await;
        let lobby = LifecycleService::create_lobby(&db, "Cup", 4, "alice").await.unwrap();
        LifecycleService::join(&db, &lobby.id, "bob", "bob").await.unwrap();

        LifecycleService::leave(&db, &lobby.id, "alice").await.unwrap();
        LifecycleService::join(&db, &lobby.id, "alice", "alice").await.unwrap();
        assert_eq!(TournamentService::player_count(&db, &lobby.id).await.unwrap(), 2);

        LifecycleService::leave(&db, &lobby.id, "alice").await.unwrap();
        LifecycleService::leave(&db, &lobby.id, "bob").await.unwrap();
        assert!(TournamentService::get_by_id(&db, &lobby.id).await.is_err());
    }

    #[actix_web::test]
    async fn test_leave_running_tournament_forfeits() {
        let db = test_connection().await;
        seed(&db, &["alice", "bob"]).await;
        let lobby = LifecycleService::create_lobby(&db, "Duel", 2, "alice").await.unwrap();
        LifecycleService::join(&db, &lobby.id, "bob", "bob").await.unwrap();

        LifecycleService::leave(&db, &lobby.id, "bob").await.unwrap();
        let t = TournamentService::get_by_id(&db, &lobby.id).await.unwrap();
        assert_eq!(t.notes.as_deref(), Some("Tournament forfeited: player bob left"));
        // Deuxième départ : rien à faire
        LifecycleService::leave(&db, &lobby.id, "alice").await.unwrap();
    }

    #[actix_web::test]
    async fn test_final_ends_tournament() {
        let db = test_connection().await;
        seed(&db, &["alice", "bob"]).await;
        let lobby = LifecycleService::create_lobby(&db, "Duel", 2, "alice").await.unwrap();
        LifecycleService::join(&db, &lobby.id, "bob", "bob").await.unwrap();

        MatchService::create(&db, NewMatch::bracket_slot("final", &lobby.id, 1, "final", (1, 2)))
            .await
            .unwrap();
        MatchService::add_player(&db, "final", "alice", Side::Left).await.unwrap();
        MatchService::add_player(&db, "final", "bob", Side::Right).await.unwrap();
        MatchService::start(&db, "final").await.unwrap();
        LifecycleService::record_score(&db, "final", 3, 5).await.unwrap();

        let ended = LifecycleService::finish_match(&db, "final", Side::Right).await.unwrap();
        assert_eq!(ended.winner.as_deref(), Some("bob"));
        let t = TournamentService::get_by_id(&db, &lobby.id).await.unwrap();
        assert_eq!(t.winner.as_deref(), Some("bob"));
        assert!(t.ended_at.is_some());
    }

    #[actix_web::test]
    async fn test_semi_final_keeps_tournament_running() {
        let db = test_connection().await;
        seed(&db, &["alice", "bob"]).await;
        TournamentService::create(&db, "t1", "Cup", 4, None).await.unwrap();
        MatchService::create(&db, NewMatch::bracket_slot("semi", "t1", 1, "semi", (1, 4)))
            .await
            .unwrap();
        MatchService::add_player(&db, "semi", "alice", Side::Left).await.unwrap();

        LifecycleService::finish_match(&db, "semi", Side::Left).await.unwrap();
        assert!(TournamentService::get_by_id(&db, "t1").await.unwrap().ended_at.is_none());
    }

    #[actix_web::test]
    async fn test_forfeit_tournament_match() {
        let db = test_connection().await;
        seed(&db, &["alice", "bob"]).await;
        TournamentService::create(&db, "t1", "Cup", 2, None).await.unwrap();
        MatchService::create(&db, NewMatch::bracket_slot("m", "t1", 1, "final", (1, 2)))
            .await
            .unwrap();

        LifecycleService::forfeit_match(&db, "m", "bob").await.unwrap();
        let t = TournamentService::get_by_id(&db, "t1").await.unwrap();
        assert!(t.ended_at.is_some());
        assert_eq!(t.notes.as_deref(), Some("Tournament forfeited: player bob left"));
    }

    async fn play_duel(db: &DatabaseConnection, name: &str) -> String {
        let lobby = LifecycleService::create_lobby(db, name, 2, "alice").await.unwrap();
        LifecycleService::join(db, &lobby.id, "bob", "bob").await.unwrap();
        MessageService::add(db, NewMessage::tournament("alice", None, &lobby.id, "glhf"))
            .await
            .unwrap();

        let final_id = format!("{}-final", lobby.id);
        MatchService::create(db, NewMatch::bracket_slot(&final_id, &lobby.id, 1, "final", (1, 2)))
            .await
            .unwrap();
        MatchService::add_player(db, &final_id, "alice", Side::Left).await.unwrap();
        MatchService::add_player(db, &final_id, "bob", Side::Right).await.unwrap();
        lobby.id
    }

    #[actix_web::test]
    async fn test_second_tournament_gets_a_clean_chat() {
        let db = test_connection().await;
        seed(&db, &["alice", "bob"]).await;

        let first = play_duel(&db, "First").await;
        LifecycleService::finish_match(&db, &format!("{}-final", first), Side::Left)
            .await
            .unwrap();
        assert!(MessageService::tournament_messages(&db, &first).await.unwrap().is_empty());

        let second = play_duel(&db, "Second").await;
        let history = ChatService::build_history(&db, "alice").await;
        assert!(history.is_complete(), "faults: {:?}", history.faults);
        assert_eq!(history.tournament.len(), 1);
        assert_eq!(history.tournament[0].game_id.as_deref(), Some(second.as_str()));
    }

    #[actix_web::test]
    async fn test_forfeit_clears_tournament_chat() {
        let db = test_connection().await;
        seed(&db, &["alice", "bob"]).await;
        let id = play_duel(&db, "Duel").await;

        LifecycleService::forfeit_match(&db, &format!("{}-final", id), "bob").await.unwrap();
        assert!(MessageService::tournament_messages(&db, &id).await.unwrap().is_empty());
        assert!(MessageService::tournament_chat_for(&db, "alice").await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn test_one_unfinished_tournament_per_player() {
        let db = test_connection().await;
        seed(&db, &["alice", "bob"]).await;
        let first = LifecycleService::create_lobby(&db, "First", 2, "alice").await.unwrap();
        let second = LifecycleService::create_lobby(&db, "Second", 2, "bob").await.unwrap();

        assert!(matches!(
            LifecycleService::create_lobby(&db, "Third", 2, "alice").await.unwrap_err(),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            LifecycleService::join(&db, &second.id, "alice", "alice").await.unwrap_err(),
            AppError::Conflict(_)
        ));

        LifecycleService::leave(&db, &first.id, "alice").await.unwrap();
        LifecycleService::join(&db, &second.id, "alice", "alice").await.unwrap();
    }

    #[actix_web::test]
    async fn test_schedule_match_rules() {
        let db = test_connection().await;
        seed(&db, &["alice", "bob", "carol"]).await;
        let lobby = LifecycleService::create_lobby(&db, "Duel", 2, "alice").await.unwrap();

        assert!(matches!(
            LifecycleService::schedule_match(&db, &lobby.id, 1, "final", (1, 2), "alice", "bob")
                .await
                .unwrap_err(),
            AppError::Conflict(_)
        ));

        LifecycleService::join(&db, &lobby.id, "bob", "bob").await.unwrap();
        assert!(LifecycleService::schedule_match(&db, &lobby.id, 1, "final", (1, 2), "alice", "carol")
            .await
            .is_err());
        assert!(LifecycleService::schedule_match(&db, &lobby.id, 1, "final", (2, 1), "alice", "bob")
            .await
            .is_err());

        let m = LifecycleService::schedule_match(&db, &lobby.id, 1, "final", (1, 2), "alice", "bob")
            .await
            .unwrap();
        assert_eq!(m.tournament_id.as_deref(), Some(lobby.id.as_str()));
        assert_eq!(m.player(Side::Right), Some("bob"));
        assert_eq!(m.in_tournament_placement_range.as_deref(), Some("[1,2]"));
    }

    #[actix_web::test]
    async fn test_single_game_modes() {
        let db = test_connection().await;
        seed(&db, &["alice", "bob"]).await;
        assert!(LifecycleService::start_single_game(&db, MatchMode::Tournament, "alice", Some("bob"))
            .await
            .is_err());
        assert!(LifecycleService::start_single_game(&db, MatchMode::Online, "alice", None)
            .await
            .is_err());
        assert!(LifecycleService::start_single_game(&db, MatchMode::Online, "alice", Some("alice"))
            .await
            .is_err());
        assert!(LifecycleService::start_single_game(&db, MatchMode::Local, "alice", Some("bob"))
            .await
            .is_err());

        let game = LifecycleService::start_single_game(&db, MatchMode::Online, "alice", Some("bob"))
            .await
            .unwrap();
        assert_eq!(game.player(Side::Right), Some("bob"));
    }

    #[actix_web::test]
    async fn test_single_game() {
        let db = test_connection().await;
        seed(&db, &["alice"]).await;
        let game = LifecycleService::start_single_game(&db, MatchMode::Local, "alice", None)
            .await
            .unwrap();
        assert!(game.started_at.is_some());
        assert_eq!(game.player_right, None);

        let ended = LifecycleService::finish_match(&db, &game.id, Side::Right).await.unwrap();
        assert_eq!(ended.winner.as_deref(), Some("right"));
    }
}
