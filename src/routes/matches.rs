use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::dto::{FinishMatchRequest, ScoreRequest, StartMatchRequest};
use crate::models::matches;
use crate::routes::validate_body;
use crate::services::lifecycle::LifecycleService;
use crate::services::match_service::MatchService;

/// Match en cours dont l'appelant est l'un des joueurs.
async fn own_running_match(
    db: &DatabaseConnection,
    id: &str,
    username: &str,
) -> AppResult<matches::Model> {
    let current = MatchService::get_by_id(db, id).await?;
    let plays = current.player_left.as_deref() == Some(username)
        || current.player_right.as_deref() == Some(username);
    if !plays {
        return Err(AppError::BadRequest(format!("{} does not play match {}", username, id)));
    }
    if current.ended_at.is_some() {
        return Err(AppError::Conflict(format!("Match {} is already over", id)));
    }
    Ok(current)
}

/// POST /matches - Lancer une partie hors tournoi (local contre un invité ou en ligne)
#[post("")]
pub async fn start_match(
    auth_user: AuthUser,
    body: web::Json<StartMatchRequest>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    validate_body(&*body)?;
    let game = LifecycleService::start_single_game(
        &db,
        body.mode,
        &auth_user.username,
        body.opponent.as_deref(),
    )
    .await?;
    Ok(HttpResponse::Created().json(game))
}

#[get("/{id}")]
pub async fn get_match(
    _auth_user: AuthUser,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(MatchService::get_by_id(&db, &path).await?))
}

/// POST /matches/{id}/score - Score courant, `{"left": 3, "right": 1}`
#[post("/{id}/score")]
pub async fn record_score(
    auth_user: AuthUser,
    path: web::Path<String>,
    body: web::Json<ScoreRequest>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    validate_body(&*body)?;
    own_running_match(&db, &path, &auth_user.username).await?;
    LifecycleService::record_score(&db, &path, body.left, body.right).await?;
    Ok(HttpResponse::Ok().json(MatchService::get_by_id(&db, &path).await?))
}

/// POST /matches/{id}/finish - Fin de partie, `{"winner": "left"}`
#[post("/{id}/finish")]
pub async fn finish_match(
    auth_user: AuthUser,
    path: web::Path<String>,
    body: web::Json<FinishMatchRequest>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    own_running_match(&db, &path, &auth_user.username).await?;
    let ended = LifecycleService::finish_match(&db, &path, body.winner).await?;
    Ok(HttpResponse::Ok().json(ended))
}

/// POST /matches/{id}/forfeit - L'appelant abandonne
#[post("/{id}/forfeit")]
pub async fn forfeit_match(
    auth_user: AuthUser,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    own_running_match(&db, &path, &auth_user.username).await?;
    LifecycleService::forfeit_match(&db, &path, &auth_user.username).await?;
    Ok(HttpResponse::Ok().json(MatchService::get_by_id(&db, &path).await?))
}

pub fn match_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/matches")
            .service(start_match)
            .service(record_score)
            .service(finish_match)
            .service(forfeit_match)
            .service(get_match)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_connection;
    use crate::routes::test_support::{app_data, bearer};
    use crate::services::tournament_service::TournamentService;
    use crate::services::user_service::UserService;
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
                    .service(web::scope("/api").configure(match_routes)),
            )
            .await
        }};
    }

    async fn seeded() -> DatabaseConnection {
        let db = test_connection().await;
        for name in ["alice", "bob", "carol"] {
            UserService::register_local(&db, name, "hash", None).await.unwrap();
        }
        db
    }

    #[actix_web::test]
    async fn test_online_game_from_start_to_finish() {
        let app = app!(seeded().await);

        let req = test::TestRequest::post()
            .uri("/api/matches")
            .insert_header(bearer("alice"))
            .set_json(serde_json::json!({ "mode": "online", "opponent": "bob" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let game: serde_json::Value = test::read_body_json(resp).await;
        let id = game["id"].as_str().unwrap().to_string();
        assert_eq!(game["player_right"], "bob");

        let req = test::TestRequest::post()
            .uri(&format!("/api/matches/{}/score", id))
            .insert_header(bearer("bob"))
            .set_json(serde_json::json!({ "left": 2, "right": 5 }))
            .to_request();
        let scored: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(scored["score_right"], 5);

        // Un spectateur ne pilote pas la partie
        let req = test::TestRequest::post()
            .uri(&format!("/api/matches/{}/finish", id))
            .insert_header(bearer("carol"))
            .set_json(serde_json::json!({ "winner": "left" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri(&format!("/api/matches/{}/finish", id))
            .insert_header(bearer("alice"))
            .set_json(serde_json::json!({ "winner": "right" }))
            .to_request();
        let ended: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(ended["winner"], "bob");

        let req = test::TestRequest::post()
            .uri(&format!("/api/matches/{}/forfeit", id))
            .insert_header(bearer("alice"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn test_forfeit_takes_tournament_down() {
        let db = seeded().await;
        TournamentService::create(&db, "t1", "Duel", 2, None).await.unwrap();
        TournamentService::add_player(&db, "t1", "alice", "alice").await.unwrap();
        TournamentService::add_player(&db, "t1", "bob", "bob").await.unwrap();
        TournamentService::start(&db, "t1").await.unwrap();
        let slot = LifecycleService::schedule_match(&db, "t1", 1, "final", (1, 2), "alice", "bob")
            .await
            .unwrap();
        let app = app!(db.clone());

        let req = test::TestRequest::post()
            .uri(&format!("/api/matches/{}/forfeit", slot.id))
            .insert_header(bearer("bob"))
            .to_request();
        let m: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(m["notes"], "Match forfeited: player bob left");

        let t = TournamentService::get_by_id(&db, "t1").await.unwrap();
        assert!(t.ended_at.is_some());
    }

    #[actix_web::test]
    async fn test_tournament_mode_is_refused() {
        let app = app!(seeded().await);
        let req = test::TestRequest::post()
            .uri("/api/matches")
            .insert_header(bearer("alice"))
            .set_json(serde_json::json!({ "mode": "tournament", "opponent": "bob" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
