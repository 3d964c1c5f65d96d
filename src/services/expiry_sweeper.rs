// src/services/expiry_sweeper.rs - Periodic purge of long-expired links
use std::time::Duration as StdDuration;

use actix_web::{rt, web};
use chrono::Duration;
use log::{error, info};

use super::LinkServiceTrait;

/// Runs one purge pass, returning how many links were removed.
/// Failures are logged and reported as zero.
pub async fn sweep_once<S: LinkServiceTrait + ?Sized>(service: &S, retention: Duration) -> u64 {
    match service.purge_expired(retention).await {
        Ok(0) => 0,
        Ok(removed) => {
            info!("Expiry sweep removed {} links", removed);
            removed
        }
        Err(e) => {
            error!("Expiry sweep failed: {}", e);
            0
        }
    }
}

/// Spawns the sweeper on the current actix runtime
pub fn spawn<S: LinkServiceTrait + 'static>(
    service: web::Data<S>,
    every: StdDuration,
    retention: Duration,
) {
    info!(
        "Expiry sweeper every {}s, keeping expired links for {}h",
        every.as_secs(),
        retention.num_hours()
    );

    rt::spawn(async move {
        let mut ticker = rt::time::interval(every);
        loop {
            ticker.tick().await;
            sweep_once(service.get_ref(), retention).await;
        }
    });
}
