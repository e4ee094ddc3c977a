// ============================================================================
// MODEL: USER RELATIONS
// ============================================================================
//
// Amis et utilisateurs bloqués, une ligne par (owner, target, kind).
// La clé primaire composite rend l'ajout idempotent au niveau du stockage :
// deux ajouts concurrents de la même paire ne perdent rien.
//
// Les deux colonnes référencent users(username) en ON UPDATE/ON DELETE CASCADE :
// renommer ou supprimer un utilisateur se répercute sur toutes les listes.
//
// ============================================================================

use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    #[sea_orm(string_value = "friend")]
    Friend,
    #[sea_orm(string_value = "blocked")]
    Blocked,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_relations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub owner: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub target: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub kind: RelationKind,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::Owner",
        to = "super::users::Column::Username",
        on_update = "Cascade",
        on_delete = "Cascade",
        fk_name = "fk_user_relations_owner"
    )]
    Owner,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::Target",
        to = "super::users::Column::Username",
        on_update = "Cascade",
        on_delete = "Cascade",
        fk_name = "fk_user_relations_target"
    )]
    Target,
}

impl ActiveModelBehavior for ActiveModel {}
