//! Token bucket used to pace outbound calls to third-party APIs.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    bucket: Mutex<Bucket>,
    capacity: f64,
    /// Tokens added per second; zero disables limiting.
    rate: f64,
}

impl RateLimiter {
    /// A bucket holding `capacity` tokens that regains one token every `interval`.
    #[must_use]
    pub fn new(capacity: u32, interval: Duration) -> Self {
        let capacity = f64::from(capacity.max(1));
        let rate = if interval.is_zero() {
            0.0
        } else {
            1.0 / interval.as_secs_f64()
        };

        Self {
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                last: Instant::now(),
            }),
            capacity,
            rate,
        }
    }

    /// At most one call per `interval`, no bursts.
    #[must_use]
    pub fn per_interval(interval: Duration) -> Self {
        Self::new(1, interval)
    }

    fn refill(&self, bucket: &mut Bucket) {
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.rate).min(self.capacity);
        bucket.last = now;
    }

    /// Waits until a token is available, then takes it.
    pub async fn acquire(&self) {
        if self.rate == 0.0 {
            return;
        }

        loop {
            let wait = {
                let mut bucket = self.bucket.lock().await;
                self.refill(&mut bucket);
                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    return;
                }
                Duration::from_secs_f64((1.0 - bucket.tokens) / self.rate)
            };

            tokio::time::sleep(wait).await;
        }
    }
}
