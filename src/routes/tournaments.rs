use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::dto::{CreateTournamentRequest, JoinTournamentRequest, ScheduleMatchRequest};
use crate::routes::validate_body;
use crate::services::lifecycle::LifecycleService;
use crate::services::tournament_service::TournamentService;

/// GET /tournaments - Tous les tournois avec leurs joueurs
#[get("")]
pub async fn list_tournaments(_auth_user: AuthUser, db: web::Data<DatabaseConnection>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(TournamentService::all_with_players(&db).await?))
}

/// GET /tournaments/open - Lobbies en attente de joueurs
#[get("/open")]
pub async fn list_open(_auth_user: AuthUser, db: web::Data<DatabaseConnection>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(TournamentService::open(&db).await?))
}

/// POST /tournaments - Créer un lobby (le créateur est inscrit d'office)
#[post("")]
pub async fn create_tournament(
    auth_user: AuthUser,
    body: web::Json<CreateTournamentRequest>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    validate_body(&*body)?;
    let lobby = LifecycleService::create_lobby(&db, &body.name, body.size, &auth_user.username).await?;
    Ok(HttpResponse::Created().json(lobby))
}

#[get("/{id}")]
pub async fn get_tournament(
    _auth_user: AuthUser,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(TournamentService::with_players(&db, &path).await?))
}

/// POST /tournaments/{id}/join - Body optionnel : `{"displayName": "..."}`
#[post("/{id}/join")]
pub async fn join_tournament(
    auth_user: AuthUser,
    path: web::Path<String>,
    body: Option<web::Json<JoinTournamentRequest>>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    let body = body.map(|b| b.into_inner()).unwrap_or_default();
    validate_body(&body)?;

    let display_name = body.display_name.as_deref().unwrap_or(&auth_user.username);
    let outcome = LifecycleService::join(&db, &path, &auth_user.username, display_name).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

#[post("/{id}/leave")]
pub async fn leave_tournament(
    auth_user: AuthUser,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    LifecycleService::leave(&db, &path, &auth_user.username).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

/// POST /tournaments/{id}/matches - Programmer un match du tableau (joueurs inscrits uniquement)
#[post("/{id}/matches")]
pub async fn schedule_match(
    auth_user: AuthUser,
    path: web::Path<String>,
    body: web::Json<ScheduleMatchRequest>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    validate_body(&*body)?;
    let members = TournamentService::players_for(&db, &path).await?;
    if !members.iter().any(|p| p.username == auth_user.username) {
        return Err(AppError::BadRequest("Not a member of this tournament".to_string()));
    }
    let scheduled = LifecycleService::schedule_match(
        &db,
        &path,
        body.round,
        &body.kind,
        body.placement_range,
        &body.left,
        &body.right,
    )
    .await?;
    Ok(HttpResponse::Created().json(scheduled))
}

pub fn tournament_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/tournaments")
            .service(list_tournaments)
            .service(list_open)
            .service(create_tournament)
            .service(join_tournament)
            .service(leave_tournament)
            .service(schedule_match)
            .service(get_tournament)
    );
}
