use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

/// Une inscription par (tournoi, utilisateur). La ligne est supprimée quand le joueur
/// s'en va, pour qu'il puisse revenir.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tournament_players")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub tournament_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub display_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tournaments::Entity",
        from = "Column::TournamentId",
        to = "super::tournaments::Column::Id",
        on_delete = "Cascade",
        fk_name = "fk_tournament_players_tournament"
    )]
    Tournament,

    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::Username",
        to = "super::users::Column::Username",
        on_update = "Cascade",
        fk_name = "fk_tournament_players_user"
    )]
    User,
}

impl Related<super::tournaments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tournament.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
