use std::time::Duration;

use sea_orm::DatabaseConnection;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::services::tournament_service::TournamentService;

/// Supprime une fois les lobbies abandonnés. Les erreurs sont loggées, jamais propagées :
/// un balayage raté attend simplement le tick suivant.
pub async fn sweep_once(db: &DatabaseConnection, grace_minutes: i64) -> u64 {
    match TournamentService::sweep_abandoned(db, grace_minutes).await {
        Ok(deleted) => deleted,
        Err(e) => {
            tracing::error!(error = %e, "Abandoned tournament sweep failed");
            0
        }
    }
}

/// Balayage récurrent. Le premier passage a lieu `every` après l'appel, le démarrage
/// ayant déjà balayé une fois ; la boucle s'arrête dès que `shutdown` passe
/// à `true` ou que son émetteur disparaît.
pub async fn run(
    db: DatabaseConnection,
    grace_minutes: i64,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval_at(Instant::now() + every, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::info!(every_secs = every.as_secs(), grace_minutes, "Janitor started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                sweep_once(&db, grace_minutes).await;
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    tracing::info!("Janitor stopped");
}
