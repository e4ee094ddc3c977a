use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[sea_orm(string_value = "broadcast")]
    Broadcast,
    #[sea_orm(string_value = "private")]
    Private,
    #[sea_orm(string_value = "tournament")]
    Tournament,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "messages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub sender: String,
    pub receiver: Option<String>, // NULL <=> broadcast
    #[serde(rename = "type")]
    #[sea_orm(column_name = "type")]
    pub kind: MessageKind,
    pub content: String,
    pub game_id: Option<String>, // id du tournoi quand type = tournament
    pub sent_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::Sender",
        to = "super::users::Column::Username",
        on_update = "Cascade",
        fk_name = "fk_messages_sender"
    )]
    Sender,

    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::Receiver",
        to = "super::users::Column::Username",
        on_update = "Cascade",
        fk_name = "fk_messages_receiver"
    )]
    Receiver,
}

impl ActiveModelBehavior for ActiveModel {}
