use actix_web::{get, web, HttpResponse};
use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::models::health::HealthResponse;

/// Liveness et ping de la base. Répond 200 dans tous les cas ; `database`
/// porte le résultat du ping.
#[get("/health")]
pub async fn health_check(db: web::Data<DatabaseConnection>) -> HttpResponse {
    let database = match db.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database ping failed");
            false
        }
    };

    let response = HealthResponse {
        status: if database { "ok" } else { "degraded" }.to_string(),
        database,
        time: Utc::now(),
    };

    HttpResponse::Ok().json(response)
}
