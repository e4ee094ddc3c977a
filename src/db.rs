// connexion BD + schéma

use sea_orm::{
    ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    Schema,
};

use crate::models::{
    matches, messages, released_usernames, tournament_players, tournaments, user_relations, users,
};

pub async fn establish_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let mut stmt = Schema::new(backend).create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(backend.build(&stmt)).await?;
    Ok(())
}

/// Crée les tables manquantes. Parents avant enfants à cause des clés étrangères.
pub async fn init_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, users::Entity).await?;
    create_table(db, user_relations::Entity).await?;
    create_table(db, tournaments::Entity).await?;
    create_table(db, tournament_players::Entity).await?;
    create_table(db, matches::Entity).await?;
    create_table(db, messages::Entity).await?;
    create_table(db, released_usernames::Entity).await?;
    tracing::info!("Database schema ready");
    Ok(())
}

/// Les parties en cours à l'arrêt du process ne finiront jamais :
/// on supprime matchs et tournois sans vainqueur ni notes.
pub async fn cleanup_incomplete_games(db: &DatabaseConnection) -> Result<(u64, u64), DbErr> {
    let deleted_matches = matches::Entity::delete_many()
        .filter(matches::Column::Winner.is_null())
        .filter(matches::Column::Notes.is_null())
        .exec(db)
        .await?
        .rows_affected;

    let deleted_tournaments = tournaments::Entity::delete_many()
        .filter(tournaments::Column::Winner.is_null())
        .filter(tournaments::Column::Notes.is_null())
        .exec(db)
        .await?
        .rows_affected;

    tracing::info!(
        matches = deleted_matches,
        tournaments = deleted_tournaments,
        "Removed unfinished games"
    );
    Ok((deleted_matches, deleted_tournaments))
}

/// Base SQLite en mémoire, avec le schéma de production.
#[cfg(test)]
pub async fn test_connection() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    init_schema(&db).await.expect("schema");
    db
}
