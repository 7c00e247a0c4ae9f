use std::sync::Arc;

use log::{info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};

use crate::auth::session::Session;
use crate::storage_service::models::QuotaUsage;
use crate::storage_service::storage_client::StorageApi;

/// Default polling interval.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Latest usage-vs-limit reading. Replaced wholesale on every poll; no
/// history is kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuotaSnapshot {
    pub used_gb: f64,
    pub limit_gb: f64,
    pub percent: u8,
}

impl QuotaSnapshot {
    /// Derive a snapshot from a quota reading. Percent is
    /// `floor(used / limit * 100)` clamped to 0–100; a missing, zero or
    /// negative limit yields 0 rather than dividing by it.
    pub fn from_usage(usage: &QuotaUsage) -> Self {
        let limit_gb = usage.limit_gb.unwrap_or(0.0);
        let percent = if limit_gb > 0.0 {
            ((usage.used_gb / limit_gb) * 100.0).floor().clamp(0.0, 100.0) as u8
        } else {
            0
        };
        Self {
            used_gb: usage.used_gb,
            limit_gb,
            percent,
        }
    }
}

/// Periodic quota poll for the logged-in user.
///
/// Ticks are skipped while the session is logged out. Fetch failures are
/// logged and the previous snapshot is retained; polling problems never
/// surface as user-facing errors, unlike the strict reporting of file
/// operations. Stopped by [`QuotaPoller::stop`] or on drop; no tick fires
/// afterwards.
pub struct QuotaPoller {
    handle: JoinHandle<()>,
    receiver: watch::Receiver<Option<QuotaSnapshot>>,
}

impl QuotaPoller {
    pub fn start(api: Arc<dyn StorageApi>, session: Arc<Session>, every: Duration) -> Self {
        let (sender, receiver) = watch::channel(None);
        let handle = tokio::spawn(async move {
            let mut ticker = interval(every);
            loop {
                ticker.tick().await;
                if let Some(snapshot) = poll_once(api.as_ref(), &session).await {
                    // Receivers may already be gone during shutdown.
                    let _ = sender.send(Some(snapshot));
                }
            }
        });
        info!("quota poller started ({}s interval)", every.as_secs());
        Self { handle, receiver }
    }

    /// Subscribe to snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<Option<QuotaSnapshot>> {
        self.receiver.clone()
    }

    /// Most recent snapshot, if any poll has succeeded yet.
    pub fn latest(&self) -> Option<QuotaSnapshot> {
        *self.receiver.borrow()
    }

    /// Cancel the poller.
    pub fn stop(&self) {
        self.handle.abort();
        info!("quota poller stopped");
    }
}

impl Drop for QuotaPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// One poll: `None` while logged out or on a failed fetch. Public so a
/// caller can force an immediate re-poll after an upload batch.
pub async fn poll_once(api: &dyn StorageApi, session: &Session) -> Option<QuotaSnapshot> {
    let username = session.username().await?;
    match api.quota(&username).await {
        Ok(usage) => Some(QuotaSnapshot::from_usage(&usage)),
        Err(e) => {
            warn!("quota poll failed: {}", e);
            None
        }
    }
}
