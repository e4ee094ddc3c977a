use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // pbkdf2:sha256:iterations$salt$hash
    pub provider: String,      // 'local' | 'github'
    #[serde(skip_serializing)]
    pub provider_id: Option<String>,
    pub avatar: Option<String>,
    pub stats: Option<String>, // JSON fourni par le client de jeu
    pub created_at: DateTime,
}

pub const PROVIDER_LOCAL: &str = "local";
pub const PROVIDER_GITHUB: &str = "github";

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::tournament_players::Entity")]
    TournamentPlayers,
}

impl Related<super::tournament_players::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TournamentPlayers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
