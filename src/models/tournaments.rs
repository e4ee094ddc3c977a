use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tournaments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub size: i32,
    pub creator: Option<String>,
    pub winner: Option<String>,
    pub created_at: DateTime,
    pub started_at: Option<DateTime>, // NULL tant que le lobby n'est pas plein
    pub ended_at: Option<DateTime>,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::tournament_players::Entity")]
    TournamentPlayers,

    #[sea_orm(has_many = "super::matches::Entity")]
    Matches,

    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::Winner",
        to = "super::users::Column::Username",
        on_update = "Cascade",
        fk_name = "fk_tournaments_winner"
    )]
    Winner,
}

impl Related<super::tournament_players::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TournamentPlayers.def()
    }
}

impl Related<super::matches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Matches.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
