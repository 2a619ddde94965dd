//! Delay policies applied between harvested result links.
//!
//! The default policy sleeps a uniformly random 1–2 seconds between links.
//! Other policies trade that for a fixed pause, exponential backoff, or a
//! token bucket that allows short bursts.

use rand::{rng, Rng};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// How long to wait between successive link yields.
///
/// Deserialized from the `throttle` key of the YAML config, for example:
///
/// ```yaml
/// throttle:
///   kind: exponential
///   base_ms: 500
///   max_ms: 8000
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ThrottlePolicy {
    /// No delay at all.
    None,
    /// Always the same delay.
    Fixed { delay_ms: u64 },
    /// Uniformly random delay in `min_ms..=max_ms`.
    Uniform { min_ms: u64, max_ms: u64 },
    /// `base_ms * 2^n` for the n-th wait, capped at `max_ms`.
    Exponential { base_ms: u64, max_ms: u64 },
    /// Up to `capacity` immediate yields, refilled at one token per `refill_ms`.
    TokenBucket { capacity: u32, refill_ms: u64 },
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        ThrottlePolicy::Uniform {
            min_ms: 1000,
            max_ms: 2000,
        }
    }
}

impl ThrottlePolicy {
    /// Check the policy's parameters, returning a description of the first problem.
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            ThrottlePolicy::Uniform { min_ms, max_ms } if min_ms > max_ms => Err(format!(
                "throttle min_ms ({min_ms}) exceeds max_ms ({max_ms})"
            )),
            ThrottlePolicy::Exponential { base_ms, max_ms } if base_ms > max_ms => Err(format!(
                "throttle base_ms ({base_ms}) exceeds max_ms ({max_ms})"
            )),
            ThrottlePolicy::TokenBucket { capacity: 0, .. } => {
                Err("throttle token bucket capacity must be at least 1".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Running state for one [`ThrottlePolicy`].
///
/// A fresh throttle is created per search page so exponential backoff and the
/// token bucket start over for every keyword.
#[derive(Debug)]
pub struct Throttle {
    policy: ThrottlePolicy,
    waits: u32,
    tokens: f64,
    last_refill: Instant,
}

impl Throttle {
    pub fn new(policy: ThrottlePolicy) -> Self {
        let tokens = match policy {
            ThrottlePolicy::TokenBucket { capacity, .. } => f64::from(capacity),
            _ => 0.0,
        };
        Self {
            policy,
            waits: 0,
            tokens,
            last_refill: Instant::now(),
        }
    }

    /// Delay to apply before the next yield, advancing the policy state.
    pub fn next_delay(&mut self) -> Duration {
        let delay = match self.policy {
            ThrottlePolicy::None => Duration::ZERO,
            ThrottlePolicy::Fixed { delay_ms } => Duration::from_millis(delay_ms),
            ThrottlePolicy::Uniform { min_ms, max_ms } => {
                Duration::from_millis(rng().random_range(min_ms..=max_ms))
            }
            ThrottlePolicy::Exponential { base_ms, max_ms } => {
                let ms = base_ms.saturating_mul(1u64 << self.waits.min(62));
                Duration::from_millis(ms.min(max_ms))
            }
            ThrottlePolicy::TokenBucket {
                capacity,
                refill_ms,
            } => self.take_token(capacity, refill_ms),
        };
        self.waits = self.waits.saturating_add(1);
        delay
    }

    fn take_token(&mut self, capacity: u32, refill_ms: u64) -> Duration {
        if refill_ms > 0 {
            let refilled = self.last_refill.elapsed().as_millis() as f64 / refill_ms as f64;
            self.tokens = (self.tokens + refilled).min(f64::from(capacity));
        } else {
            self.tokens = f64::from(capacity);
        }
        self.last_refill = Instant::now();

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Duration::ZERO
        } else {
            // Wait for the missing fraction of a token, then spend it.
            let missing = 1.0 - self.tokens;
            self.tokens = 0.0;
            Duration::from_millis((missing * refill_ms as f64).ceil() as u64)
        }
    }

    /// Sleep for [`Throttle::next_delay`].
    pub async fn wait(&mut self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            tracing::debug!(?delay, "Throttling before next result link");
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_one_to_two_seconds() {
        let mut throttle = Throttle::new(ThrottlePolicy::default());
        for _ in 0..50 {
            let d = throttle.next_delay();
            assert!(d >= Duration::from_secs(1) && d <= Duration::from_secs(2), "{d:?}");
        }
    }

    #[test]
    fn fixed_never_varies() {
        let mut throttle = Throttle::new(ThrottlePolicy::Fixed { delay_ms: 250 });
        assert_eq!(throttle.next_delay(), Duration::from_millis(250));
        assert_eq!(throttle.next_delay(), Duration::from_millis(250));
    }

    #[test]
    fn exponential_doubles_and_caps() {
        let mut throttle = Throttle::new(ThrottlePolicy::Exponential {
            base_ms: 100,
            max_ms: 500,
        });
        let delays: Vec<u128> = (0..5).map(|_| throttle.next_delay().as_millis()).collect();
        assert_eq!(delays, vec![100, 200, 400, 500, 500]);
    }

    #[test]
    fn token_bucket_allows_burst_then_waits() {
        let mut throttle = Throttle::new(ThrottlePolicy::TokenBucket {
            capacity: 2,
            refill_ms: 60_000,
        });
        assert_eq!(throttle.next_delay(), Duration::ZERO);
        assert_eq!(throttle.next_delay(), Duration::ZERO);
        assert!(throttle.next_delay() > Duration::ZERO);
    }

    #[test]
    fn validate_rejects_inverted_range() {
        let policy = ThrottlePolicy::Uniform {
            min_ms: 5,
            max_ms: 1,
        };
        assert!(policy.validate().is_err());
        assert!(ThrottlePolicy::default().validate().is_ok());
    }

    #[test]
    fn deserializes_from_yaml() {
        let policy: ThrottlePolicy =
            serde_yaml::from_str("kind: fixed\ndelay_ms: 10\n").expect("valid yaml");
        assert_eq!(policy, ThrottlePolicy::Fixed { delay_ms: 10 });
    }
}
