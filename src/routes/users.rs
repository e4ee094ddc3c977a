use actix_web::{delete, get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::models::dto::{HistoryMatch, PublicUser};
use crate::routes::{auth, ws};
use crate::services::match_service::MatchService;
use crate::services::tournament_service::TournamentService;
use crate::services::user_service::UserService;

/// GET /user/friends - Mes amis (PROTÉGÉE)
#[get("/friends")]
pub async fn list_friends(auth_user: AuthUser, db: web::Data<DatabaseConnection>) -> AppResult<HttpResponse> {
    let friends = UserService::friends(&db, &auth_user.username).await?;
    Ok(HttpResponse::Ok().json(friends))
}

#[post("/friends/{username}")]
pub async fn add_friend(
    auth_user: AuthUser,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    let friend = path.into_inner();
    UserService::get_by_username(&db, &friend).await?;
    UserService::add_friend(&db, &auth_user.username, &friend).await?;
    Ok(HttpResponse::Ok().json(UserService::friends(&db, &auth_user.username).await?))
}

#[delete("/friends/{username}")]
pub async fn remove_friend(
    auth_user: AuthUser,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    UserService::remove_friend(&db, &auth_user.username, &path).await?;
    Ok(HttpResponse::Ok().json(UserService::friends(&db, &auth_user.username).await?))
}

/// GET /user/blocked - Utilisateurs bloqués (PROTÉGÉE)
#[get("/blocked")]
pub async fn list_blocked(auth_user: AuthUser, db: web::Data<DatabaseConnection>) -> AppResult<HttpResponse> {
    let blocked = UserService::blocked(&db, &auth_user.username).await?;
    Ok(HttpResponse::Ok().json(blocked))
}

#[post("/blocked/{username}")]
pub async fn block_user(
    auth_user: AuthUser,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    let enemy = path.into_inner();
    UserService::get_by_username(&db, &enemy).await?;
    UserService::block(&db, &auth_user.username, &enemy).await?;
    Ok(HttpResponse::Ok().json(UserService::blocked(&db, &auth_user.username).await?))
}

#[delete("/blocked/{username}")]
pub async fn unblock_user(
    auth_user: AuthUser,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    UserService::unblock(&db, &auth_user.username, &path).await?;
    Ok(HttpResponse::Ok().json(UserService::blocked(&db, &auth_user.username).await?))
}

/// GET /user/{username} - Profil public (PROTÉGÉE)
#[get("/{username}")]
pub async fn get_profile(
    _auth_user: AuthUser,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    let user = UserService::get_by_username(&db, &path).await?;
    Ok(HttpResponse::Ok().json(PublicUser::from(user)))
}

/// GET /user/{username}/matches - Parties hors tournoi
#[get("/{username}/matches")]
pub async fn get_matches(
    _auth_user: AuthUser,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    UserService::get_by_username(&db, &path).await?;
    let matches: Vec<HistoryMatch> = MatchService::standalone_for_user(&db, &path)
        .await?
        .into_iter()
        .map(HistoryMatch::from)
        .collect();
    Ok(HttpResponse::Ok().json(matches))
}

/// GET /user/{username}/tournaments - Historique des tournois
#[get("/{username}/tournaments")]
pub async fn get_tournaments(
    _auth_user: AuthUser,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    UserService::get_by_username(&db, &path).await?;
    let history = TournamentService::history_for_user(&db, &path).await?;
    Ok(HttpResponse::Ok().json(history))
}

/// Tout `/user`. Les routes `/{username}` viennent en dernier pour que les chemins fixes passent avant.
pub fn user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user")
            .configure(auth::auth_routes)
            .service(ws::user_socket)
            .service(list_friends)
            .service(add_friend)
            .service(remove_friend)
            .service(list_blocked)
            .service(block_user)
            .service(unblock_user)
            .service(get_matches)
            .service(get_tournaments)
            .service(get_profile)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_connection;
    use crate::models::matches::{MatchMode, Side};
    use crate::routes::test_support::{app_data, bearer};
    use crate::services::match_service::NewMatch;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};

    macro_rules! app {
        ($db:expr) => {{
            let (db, config, codec) = app_data($db);
            test::init_service(
                App::new()
                    .app_data(db)
                    .app_data(config)
                    .app_data(codec)
                    .service(web::scope("/api").configure(user_routes)),
            )
            .await
        }};
    }

    async fn seeded() -> DatabaseConnection {
        let db = test_connection().await;
        for name in ["alice", "bob"] {
            UserService::register_local(&db, name, "hash", None).await.unwrap();
        }
        db
    }

    #[actix_web::test]
    async fn test_profile_and_missing_user() {
        let app = app!(seeded().await);

        let req = test::TestRequest::get()
            .uri("/api/user/bob")
            .insert_header(bearer("alice"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["username"], "bob");
        assert_eq!(body["provider"], "local");

        let req = test::TestRequest::get()
            .uri("/api/user/ghost")
            .insert_header(bearer("alice"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_friend_routes() {
        let app = app!(seeded().await);

        let req = test::TestRequest::post()
            .uri("/api/user/friends/bob")
            .insert_header(bearer("alice"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, serde_json::json!(["bob"]));

        let req = test::TestRequest::post()
            .uri("/api/user/friends/ghost")
            .insert_header(bearer("alice"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::delete()
            .uri("/api/user/friends/bob")
            .insert_header(bearer("alice"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, serde_json::json!([]));
    }

    #[actix_web::test]
    async fn test_block_self_is_bad_request() {
        let app = app!(seeded().await);
        let req = test::TestRequest::post()
            .uri("/api/user/blocked/alice")
            .insert_header(bearer("alice"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_match_history() {
        let db = seeded().await;
        MatchService::create(&db, NewMatch::standalone("m1", MatchMode::Online)).await.unwrap();
        MatchService::add_player(&db, "m1", "alice", Side::Left).await.unwrap();
        MatchService::add_player(&db, "m1", "bob", Side::Right).await.unwrap();
        let app = app!(db);

        let req = test::TestRequest::get()
            .uri("/api/user/bob/matches")
            .insert_header(bearer("alice"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body[0]["id"], "m1");

        let req = test::TestRequest::get()
            .uri("/api/user/bob/tournaments")
            .insert_header(bearer("alice"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, serde_json::json!([]));
    }

    #[actix_web::test]
    async fn test_routes_require_session() {
        let app = app!(seeded().await);
        let req = test::TestRequest::get().uri("/api/user/friends").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}
