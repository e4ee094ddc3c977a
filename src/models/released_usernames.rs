// ============================================================================
// MODEL: RELEASED USERNAMES
// ============================================================================
//
// Noms libérés par un renommage ou une suppression de compte. Les jetons de
// session émis sous l'ancien nom restent valides jusqu'à leur expiration :
// le nom est réservé jusqu'à `held_until` pour qu'aucun nouveau compte ne
// les récupère.
//
// ============================================================================

use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "released_usernames")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub held_until: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
