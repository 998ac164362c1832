//! Background eviction of abandoned wizard sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info};

use crate::wizard::orchestrator::Wizard;
use crate::wizard::session::SessionStore;

/// Every `period`, drops sessions idle for at least `ttl`.
pub fn spawn_session_sweeper(
    sessions: Arc<SessionStore>,
    wizard: Wizard,
    ttl: Duration,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        info!("Session sweeper started (ttl {ttl:?}, every {period:?})");

        loop {
            ticker.tick().await;
            sweep_idle_sessions(&sessions, &wizard, ttl).await;
        }
    })
}

/// Evicts idle sessions and stops their timers. Returns how many were dropped.
pub async fn sweep_idle_sessions(sessions: &SessionStore, wizard: &Wizard, ttl: Duration) -> usize {
    let evicted = sessions.evict_idle(ttl).await;
    for (id, session) in &evicted {
        wizard.discard(session).await;
        debug!("Evicted idle wizard session {id}");
    }
    if !evicted.is_empty() {
        info!(
            "Evicted {} idle wizard sessions, {} remaining",
            evicted.len(),
            sessions.len().await
        );
    }
    evicted.len()
}
