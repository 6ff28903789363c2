use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct ListenRateLimitConfig {
    /// Listen events allowed per identity within one window.
    pub quota: u32,
    pub window: Duration,
}

impl Default for ListenRateLimitConfig {
    fn default() -> Self {
        Self {
            quota: 30,
            window: Duration::from_secs(60),
        }
    }
}

/// Fixed quota per sliding time window, keyed by user identity (session
/// handle, or a network-address fallback). Exceeding the quota rejects the
/// event; nothing is queued.
pub struct ListenRateLimiter {
    config: ListenRateLimitConfig,
    states: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl ListenRateLimiter {
    pub fn new(config: ListenRateLimitConfig) -> ListenRateLimiter {
        ListenRateLimiter {
            config,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Checks the quota for `identity` and records the event if allowed.
    /// Returns Err(retry_after_secs) when the quota is spent.
    pub fn check_and_record(&self, identity: &str) -> Result<(), u32> {
        let now = Instant::now();
        let mut states = self.states.lock().unwrap();
        let events = states.entry(identity.to_owned()).or_default();

        while let Some(front) = events.front() {
            if now.duration_since(*front) > self.config.window {
                events.pop_front();
            } else {
                break;
            }
        }

        if events.len() >= self.config.quota as usize {
            let oldest = events.front().copied().unwrap_or(now);
            let retry_after = self
                .config
                .window
                .saturating_sub(now.duration_since(oldest))
                .as_secs() as u32;
            return Err(retry_after.max(1));
        }

        events.push_back(now);
        Ok(())
    }

    /// Drops identities with no recent events. Call periodically.
    pub fn cleanup_stale_entries(&self) {
        let now = Instant::now();
        let threshold = self.config.window * 2;
        let mut states = self.states.lock().unwrap();
        states.retain(|_, events| {
            events
                .back()
                .map(|last| now.duration_since(*last) < threshold)
                .unwrap_or(false)
        });
    }
}

impl Default for ListenRateLimiter {
    fn default() -> Self {
        Self::new(ListenRateLimitConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(quota: u32, window: Duration) -> ListenRateLimiter {
        ListenRateLimiter::new(ListenRateLimitConfig { quota, window })
    }

    #[test]
    fn allows_up_to_quota() {
        let limiter = limiter(5, Duration::from_secs(60));
        for _ in 0..5 {
            assert!(limiter.check_and_record("user:alice").is_ok());
        }
        assert!(limiter.check_and_record("user:alice").is_err());
    }

    #[test]
    fn rejection_reports_retry_after() {
        let limiter = limiter(1, Duration::from_secs(60));
        limiter.check_and_record("user:alice").unwrap();
        let retry_after = limiter.check_and_record("user:alice").unwrap_err();
        assert!(retry_after >= 1);
        assert!(retry_after <= 60);
    }

    #[test]
    fn identities_have_separate_quotas() {
        let limiter = limiter(2, Duration::from_secs(60));
        for _ in 0..2 {
            assert!(limiter.check_and_record("user:alice").is_ok());
        }
        assert!(limiter.check_and_record("user:alice").is_err());
        assert!(limiter.check_and_record("ip:127.0.0.1").is_ok());
    }

    #[test]
    fn window_slides() {
        let limiter = limiter(1, Duration::from_millis(20));
        assert!(limiter.check_and_record("user:alice").is_ok());
        assert!(limiter.check_and_record("user:alice").is_err());
        std::thread::sleep(Duration::from_millis(30));
        assert!(limiter.check_and_record("user:alice").is_ok());
    }

    #[test]
    fn cleanup_drops_idle_identities() {
        let limiter = limiter(1, Duration::from_millis(10));
        limiter.check_and_record("user:alice").unwrap();
        std::thread::sleep(Duration::from_millis(30));
        limiter.cleanup_stale_entries();
        assert!(limiter.states.lock().unwrap().is_empty());
    }
}
