//! Background threads that keep shared dashboard state fresh.

pub mod evaluations;
pub mod health;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const SLICE: Duration = Duration::from_millis(100);

/// Stop flag shared by every collector thread.
#[derive(Clone, Debug, Default)]
pub struct Shutdown(Arc<AtomicBool>);

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Sleep for `interval`, waking early on shutdown. Returns false once
    /// shutdown has been requested.
    pub fn wait(&self, interval: Duration) -> bool {
        let deadline = Instant::now() + interval;
        while !self.is_triggered() {
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep(SLICE.min(deadline - now));
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_returns_early_after_trigger() {
        let shutdown = Shutdown::new();
        assert!(shutdown.wait(Duration::from_millis(10)));

        let remote = shutdown.clone();
        let handle = thread::spawn(move || remote.wait(Duration::from_secs(30)));
        shutdown.trigger();
        assert!(!handle.join().unwrap());
    }
}
