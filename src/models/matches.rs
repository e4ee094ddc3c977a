// ============================================================================
// MODEL: MATCHES
// ============================================================================
//
// Un match est soit seul (tournament_id NULL, round 0), soit une case d'un
// tableau de tournoi (tournament_id, round > 0, type de case, placement).
// Plus le round est grand, plus on est tard dans le tableau.
//
// Colonnes :
//   - player_left / player_right : NULL tant qu'aucun joueur n'est placé ; en local
//     le côté droit est un invité et reste NULL
//   - score_left / score_right   : score courant, ne baisse jamais
//   - winner                     : username du côté gagnant, ou le nom du côté
//                                  quand le gagnant est un invité
//   - notes                      : renseigné sur abandon ou victoire de l'invité
//
// ON DELETE CASCADE depuis tournaments.
//
// ============================================================================

use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    #[sea_orm(string_value = "local")]
    Local,
    #[sea_orm(string_value = "online")]
    Online,
    #[sea_orm(string_value = "tournament")]
    Tournament,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "matches")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub mode: MatchMode,
    pub player_left: Option<String>,
    pub player_right: Option<String>,
    pub tournament_id: Option<String>,
    pub round: i32,
    pub in_tournament_type: Option<String>,
    pub in_tournament_placement_range: Option<String>, // JSON, ex: [1,2]
    pub score_left: i32,
    pub score_right: i32,
    pub winner: Option<String>,
    pub started_at: Option<DateTime>,
    pub ended_at: Option<DateTime>,
    pub notes: Option<String>,
}

impl Model {
    pub fn player(&self, side: Side) -> Option<&str> {
        match side {
            Side::Left => self.player_left.as_deref(),
            Side::Right => self.player_right.as_deref(),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tournaments::Entity",
        from = "Column::TournamentId",
        to = "super::tournaments::Column::Id",
        on_delete = "Cascade",
        fk_name = "fk_matches_tournament"
    )]
    Tournament,

    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::PlayerLeft",
        to = "super::users::Column::Username",
        on_update = "Cascade",
        fk_name = "fk_matches_player_left"
    )]
    PlayerLeft,

    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::PlayerRight",
        to = "super::users::Column::Username",
        on_update = "Cascade",
        fk_name = "fk_matches_player_right"
    )]
    PlayerRight,
}

impl Related<super::tournaments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tournament.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
