//! Periodic EPG refresh scheduler
//!
//! A single long-lived background loop: wait out a short startup delay, then
//! on every cycle fetch the playlists with a configured guide URL once and
//! refresh them sequentially. One playlist's failure never aborts the cycle
//! or touches the others; the periodic path is best-effort and self-healing
//! on the next cycle. The loop only ends with the process.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::database::repositories::PlaylistSeaOrmRepository;
use crate::services::EpgRefreshService;

/// Default pause between refresh cycles
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);

/// Default delay before the first cycle, letting startup settle
pub const DEFAULT_STARTUP_DELAY: Duration = Duration::from_secs(2);

/// Background scheduler driving the refresh service
pub struct EpgRefreshScheduler {
    playlists: PlaylistSeaOrmRepository,
    refresh: EpgRefreshService,
    interval: Duration,
    startup_delay: Duration,
}

impl EpgRefreshScheduler {
    pub fn new(
        playlists: PlaylistSeaOrmRepository,
        refresh: EpgRefreshService,
        interval: Duration,
        startup_delay: Duration,
    ) -> Self {
        Self {
            playlists,
            refresh,
            interval,
            startup_delay,
        }
    }

    /// Run forever, alternating between refreshing and idle-waiting
    pub async fn run(self) {
        info!(
            "EPG refresh scheduler started (interval: {}, startup delay: {})",
            humantime::format_duration(self.interval),
            humantime::format_duration(self.startup_delay),
        );
        sleep(self.startup_delay).await;

        loop {
            self.run_cycle().await;
            sleep(self.interval).await;
        }
    }

    /// One refresh pass over every playlist with a guide URL.
    ///
    /// Never returns an error: failures are logged and discarded so the
    /// loop survives anything short of process death.
    pub async fn run_cycle(&self) {
        let playlists = match self.playlists.list_with_epg_url().await {
            Ok(playlists) => playlists,
            Err(e) => {
                warn!("Skipping EPG refresh cycle, could not list playlists: {e}");
                return;
            }
        };

        if playlists.is_empty() {
            info!("EPG refresh cycle: no playlists with a guide URL");
            return;
        }

        let mut refreshed = 0usize;
        let mut failed = 0usize;

        for playlist in &playlists {
            // list_with_epg_url guarantees a non-empty URL
            let Some(epg_url) = playlist.epg_url.as_deref() else {
                continue;
            };

            match self.refresh.refresh(playlist.id, epg_url).await {
                Ok(outcome) => {
                    refreshed += 1;
                    info!(
                        "Refreshed playlist '{}' ({}): {} programmes",
                        playlist.name, playlist.id, outcome.programmes_inserted
                    );
                }
                Err(e) => {
                    failed += 1;
                    warn!(
                        "EPG refresh failed for playlist '{}' ({}): {e}",
                        playlist.name, playlist.id
                    );
                }
            }
        }

        info!("EPG refresh cycle complete: {refreshed} refreshed, {failed} failed");
    }
}
