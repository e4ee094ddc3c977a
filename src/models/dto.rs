// Vues agrégées renvoyées par l'API. Calculées à chaque requête, jamais mises en cache.
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::matches::{MatchMode, Side};
use super::messages::MessageKind;
use super::{matches, messages, tournaments, users};

// ----------------------------------------------------------------------------
// Requêtes
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CredentialsRequest {
    #[validate(length(min = 3, max = 20))]
    pub username: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(url)]
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 3, max = 20))]
    pub username: Option<String>,
    #[validate(url)]
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTournamentRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    pub size: i32,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct JoinTournamentRequest {
    #[serde(rename = "displayName")]
    #[validate(length(min = 1, max = 30))]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub receiver: Option<String>,
    #[serde(rename = "gameId")]
    pub game_id: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct StartMatchRequest {
    pub mode: MatchMode,
    #[validate(length(min = 3, max = 20))]
    pub opponent: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ScheduleMatchRequest {
    #[validate(range(min = 1))]
    pub round: i32,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 30))]
    pub kind: String,
    #[serde(rename = "placementRange")]
    pub placement_range: (i32, i32),
    pub left: String,
    pub right: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ScoreRequest {
    #[validate(range(min = 0))]
    pub left: i32,
    #[validate(range(min = 0))]
    pub right: i32,
}

#[derive(Debug, Deserialize)]
pub struct FinishMatchRequest {
    pub winner: Side,
}

// ----------------------------------------------------------------------------
// Réponses
// ----------------------------------------------------------------------------

/// Réponse d'une connexion réussie. Le token est aussi posé dans le cookie `sid` ;
/// les clients sans cookies cross-site le renvoient en bearer.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub user: PublicUser,
    pub token: String,
    #[serde(rename = "maxAgeSec")]
    pub max_age_sec: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub username: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

/// Un tournoi et ses joueurs, triés par username.
#[derive(Debug, Clone, Serialize)]
pub struct TournamentWithPlayers {
    pub id: String,
    pub name: String,
    pub size: i32,
    pub creator: Option<String>,
    pub winner: Option<String>,
    pub created_at: NaiveDateTime,
    pub started_at: Option<NaiveDateTime>,
    pub ended_at: Option<NaiveDateTime>,
    pub notes: Option<String>,
    pub players: Vec<PlayerView>,
}

impl TournamentWithPlayers {
    pub fn new(tournament: tournaments::Model, mut players: Vec<PlayerView>) -> Self {
        players.sort_by(|a, b| a.username.cmp(&b.username));
        Self {
            id: tournament.id,
            name: tournament.name,
            size: tournament.size,
            creator: tournament.creator,
            winner: tournament.winner,
            created_at: tournament.created_at,
            started_at: tournament.started_at,
            ended_at: tournament.ended_at,
            notes: tournament.notes,
            players,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenTournament {
    pub id: String,
    pub name: String,
    pub size: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryMatch {
    pub id: String,
    pub player_left: Option<String>,
    pub player_right: Option<String>,
    pub score_left: i32,
    pub score_right: i32,
    pub round: i32,
    pub winner: Option<String>,
    pub placement_range: Option<String>,
    pub started_at: Option<NaiveDateTime>,
    pub ended_at: Option<NaiveDateTime>,
}

impl From<matches::Model> for HistoryMatch {
    fn from(m: matches::Model) -> Self {
        Self {
            id: m.id,
            player_left: m.player_left,
            player_right: m.player_right,
            score_left: m.score_left,
            score_right: m.score_right,
            round: m.round,
            winner: m.winner,
            placement_range: m.in_tournament_placement_range,
            started_at: m.started_at,
            ended_at: m.ended_at,
        }
    }
}

/// Une entrée de l'historique de tournois : le tournoi et les matchs
/// que l'utilisateur y a joués, finale en premier.
#[derive(Debug, Clone, Serialize)]
pub struct TournamentHistory {
    pub id: String,
    pub name: String,
    pub winner: Option<String>,
    pub created_at: NaiveDateTime,
    pub notes: Option<String>,
    pub matches: Vec<HistoryMatch>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub username: String,
    pub avatar: Option<String>,
    pub provider: String,
    pub stats: Option<serde_json::Value>,
    pub created_at: NaiveDateTime,
}

impl From<users::Model> for PublicUser {
    fn from(user: users::Model) -> Self {
        Self {
            username: user.username,
            avatar: user.avatar,
            provider: user.provider,
            stats: user.stats.and_then(|s| serde_json::from_str(&s).ok()),
            created_at: user.created_at,
        }
    }
}

/// Vues de chat d'un utilisateur. Une vue qui n'a pas pu être chargée reste vide et
/// l'échec est listé dans `faults`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatHistory {
    pub user: String,
    pub global: Vec<messages::Model>,
    pub private: Vec<messages::Model>,
    pub tournament: Vec<messages::Model>,
    pub faults: Vec<String>,
}

impl ChatHistory {
    pub fn is_complete(&self) -> bool {
        self.faults.is_empty()
    }
}
