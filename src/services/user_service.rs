use chrono::{Duration, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::*;

use crate::error::{AppError, AppResult};
use crate::models::user_relations::{self, RelationKind};
use crate::models::{released_usernames, users};
use crate::utils::password;

pub struct UserService;

impl UserService {
    pub async fn all(db: &DatabaseConnection) -> AppResult<Vec<users::Model>> {
        Ok(users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(db)
            .await?)
    }

    pub async fn get_by_username(db: &DatabaseConnection, username: &str) -> AppResult<users::Model> {
        users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {}", username)))
    }

    pub async fn exists(db: &DatabaseConnection, username: &str) -> AppResult<bool> {
        let count = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .count(db)
            .await?;
        Ok(count > 0)
    }

    /// Nom déjà pris par un compte, ou encore réservé après avoir été libéré.
    pub async fn is_taken(db: &DatabaseConnection, username: &str) -> AppResult<bool> {
        if Self::exists(db, username).await? {
            return Ok(true);
        }
        let held = released_usernames::Entity::find_by_id(username.to_string())
            .filter(released_usernames::Column::HeldUntil.gt(Utc::now().naive_utc()))
            .count(db)
            .await?;
        Ok(held > 0)
    }

    /// Réserve un nom libéré pendant `hold_minutes` (la durée de vie d'une session).
    async fn hold_username(db: &DatabaseConnection, username: &str, hold_minutes: i64) -> AppResult<()> {
        let held = released_usernames::ActiveModel {
            username: Set(username.to_string()),
            held_until: Set(Utc::now().naive_utc() + Duration::minutes(hold_minutes)),
        };
        released_usernames::Entity::insert(held)
            .on_conflict(
                OnConflict::column(released_usernames::Column::Username)
                    .update_column(released_usernames::Column::HeldUntil)
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
        tracing::debug!(username, hold_minutes, "Username held");
        Ok(())
    }

    pub async fn register_local(
        db: &DatabaseConnection,
        username: &str,
        password_hash: &str,
        avatar: Option<&str>,
    ) -> AppResult<()> {
        Self::insert(db, username, password_hash.to_string(), users::PROVIDER_LOCAL, None, avatar)
            .await?;
        tracing::info!(username, "Registered new user");
        Ok(())
    }

    /// Crée un compte GitHub. Les comptes OAuth reçoivent un mot de passe aléatoire inutilisable.
    pub async fn register_github(
        db: &DatabaseConnection,
        username: &str,
        provider_id: &str,
        avatar: Option<&str>,
    ) -> AppResult<()> {
        Self::insert(
            db,
            username,
            password::placeholder_password(),
            users::PROVIDER_GITHUB,
            Some(provider_id),
            avatar,
        )
        .await?;
        tracing::info!(username, "Registered new GitHub user");
        Ok(())
    }

    async fn insert(
        db: &DatabaseConnection,
        username: &str,
        password_hash: String,
        provider: &str,
        provider_id: Option<&str>,
        avatar: Option<&str>,
    ) -> AppResult<()> {
        let user = users::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(password_hash),
            provider: Set(provider.to_string()),
            provider_id: Set(provider_id.map(str::to_string)),
            avatar: Set(avatar.map(str::to_string)),
            stats: Set(None),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        };
        let rows = users::Entity::insert(user).exec_without_returning(db).await?;
        if rows == 0 {
            return Err(AppError::NoRowsAffected(format!("register user {}", username)));
        }
        Ok(())
    }

    pub async fn find_github_user(
        db: &DatabaseConnection,
        provider_id: &str,
    ) -> AppResult<Option<String>> {
        Ok(users::Entity::find()
            .filter(users::Column::Provider.eq(users::PROVIDER_GITHUB))
            .filter(users::Column::ProviderId.eq(provider_id))
            .one(db)
            .await?
            .map(|u| u.username))
    }

    async fn update_column(
        db: &DatabaseConnection,
        username: &str,
        column: users::Column,
        value: Option<String>,
        what: &str,
    ) -> AppResult<()> {
        let result = users::Entity::update_many()
            .col_expr(column, Expr::value(value))
            .filter(users::Column::Username.eq(username))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NoRowsAffected(format!("update {} for user {}", what, username)));
        }
        tracing::info!(username, field = what, "User updated");
        Ok(())
    }

    /// Renomme un utilisateur. Inscriptions, matchs et messages suivent par ON UPDATE CASCADE ;
    /// l'ancien nom reste réservé `hold_minutes`.
    pub async fn update_username(
        db: &DatabaseConnection,
        username: &str,
        new_username: &str,
        hold_minutes: i64,
    ) -> AppResult<()> {
        Self::update_column(db, username, users::Column::Username, Some(new_username.to_string()), "username")
            .await?;
        Self::hold_username(db, username, hold_minutes).await
    }

    pub async fn update_password(db: &DatabaseConnection, username: &str, password_hash: &str) -> AppResult<()> {
        Self::update_column(db, username, users::Column::PasswordHash, Some(password_hash.to_string()), "password").await
    }

    pub async fn update_avatar(db: &DatabaseConnection, username: &str, avatar: &str) -> AppResult<()> {
        Self::update_column(db, username, users::Column::Avatar, Some(avatar.to_string()), "avatar").await
    }

    pub async fn update_stats(db: &DatabaseConnection, username: &str, stats: &serde_json::Value) -> AppResult<()> {
        Self::update_column(db, username, users::Column::Stats, Some(stats.to_string()), "stats").await
    }

    /// Supprime un utilisateur. Un utilisateur absent n'est pas une erreur ; un
    /// utilisateur encore référencé est refusé par les clés étrangères.
    pub async fn remove(db: &DatabaseConnection, username: &str, hold_minutes: i64) -> AppResult<()> {
        let result = users::Entity::delete_many()
            .filter(users::Column::Username.eq(username))
            .exec(db)
            .await?;
        tracing::info!(username, rows = result.rows_affected, "User removed");
        if result.rows_affected > 0 {
            Self::hold_username(db, username, hold_minutes).await?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Amis / bloqués
    // ------------------------------------------------------------------

    async fn add_relation(
        db: &DatabaseConnection,
        owner: &str,
        target: &str,
        kind: RelationKind,
    ) -> AppResult<()> {
        if owner == target {
            return Err(AppError::BadRequest("A user cannot target themselves".to_string()));
        }
        let relation = user_relations::ActiveModel {
            owner: Set(owner.to_string()),
            target: Set(target.to_string()),
            kind: Set(kind),
        };
        let rows = user_relations::Entity::insert(relation)
            .on_conflict(
                OnConflict::columns([
                    user_relations::Column::Owner,
                    user_relations::Column::Target,
                    user_relations::Column::Kind,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
        tracing::info!(owner, other = target, ?kind, new = rows > 0, "Relation added");
        Ok(())
    }

    async fn remove_relation(
        db: &DatabaseConnection,
        owner: &str,
        target: &str,
        kind: RelationKind,
    ) -> AppResult<()> {
        let result = user_relations::Entity::delete_many()
            .filter(user_relations::Column::Owner.eq(owner))
            .filter(user_relations::Column::Target.eq(target))
            .filter(user_relations::Column::Kind.eq(kind))
            .exec(db)
            .await?;
        tracing::info!(owner, other = target, ?kind, rows = result.rows_affected, "Relation removed");
        Ok(())
    }

    async fn relations(
        db: &DatabaseConnection,
        owner: &str,
        kind: RelationKind,
    ) -> AppResult<Vec<String>> {
        // Même contrat que les autres lectures : utilisateur inconnu = erreur
        Self::get_by_username(db, owner).await?;

        Ok(user_relations::Entity::find()
            .filter(user_relations::Column::Owner.eq(owner))
            .filter(user_relations::Column::Kind.eq(kind))
            .order_by_asc(user_relations::Column::Target)
            .all(db)
            .await?
            .into_iter()
            .map(|r| r.target)
            .collect())
    }

    pub async fn add_friend(db: &DatabaseConnection, username: &str, friend: &str) -> AppResult<()> {
        Self::add_relation(db, username, friend, RelationKind::Friend).await
    }

    pub async fn remove_friend(db: &DatabaseConnection, username: &str, friend: &str) -> AppResult<()> {
        Self::remove_relation(db, username, friend, RelationKind::Friend).await
    }

    pub async fn friends(db: &DatabaseConnection, username: &str) -> AppResult<Vec<String>> {
        Self::relations(db, username, RelationKind::Friend).await
    }

    pub async fn block(db: &DatabaseConnection, username: &str, enemy: &str) -> AppResult<()> {
        Self::add_relation(db, username, enemy, RelationKind::Blocked).await
    }

    pub async fn unblock(db: &DatabaseConnection, username: &str, enemy: &str) -> AppResult<()> {
        Self::remove_relation(db, username, enemy, RelationKind::Blocked).await
    }

    pub async fn blocked(db: &DatabaseConnection, username: &str) -> AppResult<Vec<String>> {
        Self::relations(db, username, RelationKind::Blocked).await
    }
}
