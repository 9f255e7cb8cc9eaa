//! Failed-login throttling
//!
//! Failures are counted per login identifier inside a sliding window. Once
//! the count reaches the limit the identifier is locked out; a successful
//! login clears its history. Records that are neither locked nor inside a
//! live window are swept out at most once per window.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::info;

/// Throttle configuration
#[derive(Debug, Clone)]
pub struct ThrottleConfig {
    /// Failures allowed inside one window
    pub max_attempts: u32,
    /// Window in seconds
    pub window_seconds: u64,
    /// Lockout duration in seconds
    pub lockout_seconds: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_seconds: 300,  // 5 minutes
            lockout_seconds: 900, // 15 minutes
        }
    }
}

/// Whether a login attempt may proceed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    Allowed,
    Locked { retry_after: Duration },
}

#[derive(Debug)]
struct FailureRecord {
    failures: u32,
    window_started: Instant,
    locked_until: Option<Instant>,
}

impl FailureRecord {
    /// Neither locked nor inside a live counting window
    fn is_stale(&self, now: Instant, window: Duration) -> bool {
        match self.locked_until {
            Some(until) => until <= now,
            None => now.duration_since(self.window_started) >= window,
        }
    }
}

#[derive(Debug)]
struct ThrottleState {
    records: HashMap<String, FailureRecord>,
    last_sweep: Instant,
}

impl ThrottleState {
    /// Drop stale records, at most once per window
    fn sweep(&mut self, now: Instant, window: Duration) {
        if now.duration_since(self.last_sweep) < window {
            return;
        }
        self.records.retain(|_, record| !record.is_stale(now, window));
        self.last_sweep = now;
    }
}

/// Per-identifier failure tracker
#[derive(Debug, Clone)]
pub struct LoginThrottle {
    config: ThrottleConfig,
    state: Arc<Mutex<ThrottleState>>,
}

impl LoginThrottle {
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(ThrottleState {
                records: HashMap::new(),
                last_sweep: Instant::now(),
            })),
        }
    }

    fn window(&self) -> Duration {
        Duration::from_secs(self.config.window_seconds)
    }

    /// Check whether `key` is currently locked out
    pub async fn check(&self, key: &str) -> ThrottleDecision {
        let mut state = self.state.lock().await;
        let now = Instant::now();
        state.sweep(now, self.window());

        let (stale, locked_until) = match state.records.get(key) {
            Some(record) => (record.is_stale(now, self.window()), record.locked_until),
            None => return ThrottleDecision::Allowed,
        };

        if stale {
            state.records.remove(key);
            return ThrottleDecision::Allowed;
        }

        match locked_until {
            Some(until) => ThrottleDecision::Locked {
                retry_after: until - now,
            },
            None => ThrottleDecision::Allowed,
        }
    }

    /// Count a failed attempt for `key`
    pub async fn record_failure(&self, key: &str) {
        let mut state = self.state.lock().await;
        let now = Instant::now();
        let window = self.window();
        state.sweep(now, window);

        let record = state.records.entry(key.to_string()).or_insert(FailureRecord {
            failures: 0,
            window_started: now,
            locked_until: None,
        });

        if record.is_stale(now, window) {
            record.failures = 0;
            record.window_started = now;
            record.locked_until = None;
        }

        record.failures += 1;

        if record.failures >= self.config.max_attempts {
            record.locked_until = Some(now + Duration::from_secs(self.config.lockout_seconds));
            info!(
                "Locked out login identifier for {} seconds",
                self.config.lockout_seconds
            );
        }
    }

    /// Forget the failure history of `key`
    pub async fn record_success(&self, key: &str) {
        self.state.lock().await.records.remove(key);
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.state.lock().await.records.len()
    }
}
