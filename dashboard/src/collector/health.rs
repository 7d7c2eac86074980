use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Local};
use tracing::{info, warn};

use super::Shutdown;
use crate::api::GeoApi;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HealthSnapshot {
    pub connected: bool,
    pub last_checked: Option<DateTime<Local>>,
    pub consecutive_failures: u32,
}

impl HealthSnapshot {
    /// Record one health check; returns true when connectivity flipped.
    pub fn record(&mut self, healthy: bool) -> bool {
        let changed = self.last_checked.is_some() && self.connected != healthy;
        self.connected = healthy;
        self.last_checked = Some(Local::now());
        self.consecutive_failures = if healthy { 0 } else { self.consecutive_failures + 1 };
        changed
    }
}

pub fn check_once(api: &dyn GeoApi, snapshot: &Mutex<HealthSnapshot>) -> bool {
    let healthy = api.health();
    let mut snap = snapshot.lock().unwrap_or_else(PoisonError::into_inner);
    if snap.record(healthy) {
        if healthy {
            info!("backend reachable again");
        } else {
            warn!(failures = snap.consecutive_failures, "backend unreachable");
        }
    }
    healthy
}

/// Probe `/health` every `interval` until shutdown.
pub fn spawn_health_monitor(
    api: Arc<dyn GeoApi>,
    interval: Duration,
    snapshot: Arc<Mutex<HealthSnapshot>>,
    shutdown: Shutdown,
) -> thread::JoinHandle<()> {
    thread::spawn(move || loop {
        check_once(api.as_ref(), &snapshot);
        if !shutdown.wait(interval) {
            break;
        }
    })
}
