use std::time::{Duration, Instant};

use dashmap::DashMap;

pub const MAX_BUCKETS: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Bucket {
    count: u32,
    window_start: Instant,
}

/// Fixed-window request counter keyed by caller bucket (client + action).
///
/// Buckets whose window has elapsed are pruned once the map grows past
/// `max_buckets`.
#[derive(Debug)]
pub struct RateLimiter {
    buckets: DashMap<String, Bucket>,
    max_buckets: usize,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(MAX_BUCKETS)
    }
}

impl RateLimiter {
    pub fn new(max_buckets: usize) -> Self {
        Self {
            buckets: DashMap::new(),
            max_buckets,
        }
    }

    pub fn allow(&self, key: &str, limit: u32, window: Duration) -> bool {
        self.allow_at(key, limit, window, Instant::now())
    }

    pub fn allow_at(&self, key: &str, limit: u32, window: Duration, now: Instant) -> bool {
        let count = {
            let mut bucket = self.buckets.entry(key.to_string()).or_insert(Bucket {
                count: 0,
                window_start: now,
            });
            if now.saturating_duration_since(bucket.window_start) >= window {
                bucket.count = 0;
                bucket.window_start = now;
            }
            bucket.count += 1;
            bucket.count
        };

        if self.buckets.len() > self.max_buckets {
            self.prune(now, window);
        }
        count <= limit
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    fn prune(&self, now: Instant, window: Duration) {
        let before = self.buckets.len();
        self.buckets
            .retain(|_, bucket| now.saturating_duration_since(bucket.window_start) < window);
        tracing::debug!(before, after = self.buckets.len(), "pruned rate limit buckets");
    }
}
