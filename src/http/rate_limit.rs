//! Rate gate implementation
//!
//! Two throttles applied in sequence before every outbound call: a fixed
//! politeness interval between call starts, and an hourly token bucket
//! sized just under the provider's allowance. The gate never rejects a
//! call, it only delays it.
//!
//! All timing uses `tokio::time`, so a paused test runtime drives the gate
//! deterministically.

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Configuration for the rate gate
#[derive(Debug, Clone)]
pub struct RateGateConfig {
    /// Minimum spacing between call starts (zero disables)
    pub min_interval: Duration,
    /// Provider-side hourly allowance (zero disables the bucket)
    pub requests_per_hour: u32,
    /// Fraction of the allowance held back, in `[0, 1)`
    pub safety_margin: f64,
    /// Sleep taken when the bucket runs dry
    pub exhaustion_sleep: Duration,
}

impl Default for RateGateConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(100),
            requests_per_hour: 5000,
            safety_margin: 0.01,
            exhaustion_sleep: Duration::from_secs(15 * 60),
        }
    }
}

impl RateGateConfig {
    /// A gate that never waits
    pub fn unlimited() -> Self {
        Self {
            min_interval: Duration::ZERO,
            requests_per_hour: 0,
            safety_margin: 0.0,
            exhaustion_sleep: Duration::ZERO,
        }
    }

    /// Bucket size: `floor(requests_per_hour * (1 - safety_margin))`
    pub fn capacity(&self) -> u32 {
        let margin = self.safety_margin.clamp(0.0, 1.0);
        (f64::from(self.requests_per_hour) * (1.0 - margin)).floor() as u32
    }
}

/// Hourly token bucket state.
///
/// `tokens` stays within `[0, capacity]`; it drops by one per gated call
/// and grows with elapsed time at `refill_rate` tokens per second.
#[derive(Debug, Clone)]
pub struct RateBudget {
    capacity: u32,
    refill_rate: f64,
    tokens: f64,
    last_refill: Instant,
}

impl RateBudget {
    /// Create a full bucket, or `None` when the bucket would be inert
    pub fn new(capacity: u32) -> Option<Self> {
        if capacity == 0 {
            return None;
        }
        let refill_rate = f64::from(capacity) / 3600.0;
        Some(Self {
            capacity,
            refill_rate,
            tokens: f64::from(capacity),
            last_refill: Instant::now(),
        })
    }

    /// Token ceiling
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Tokens per second
    pub fn refill_rate(&self) -> f64 {
        self.refill_rate
    }

    /// Committed token count (as of the last gated call)
    pub fn tokens(&self) -> f64 {
        self.tokens
    }

    /// Tokens that would be available at `now`, without committing
    fn available_at(&self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        (self.tokens + elapsed * self.refill_rate).min(f64::from(self.capacity))
    }

    fn commit(&mut self, tokens: f64, now: Instant) {
        self.tokens = (tokens - 1.0).clamp(0.0, f64::from(self.capacity));
        self.last_refill = now;
    }
}

/// What a single pass through the gate cost
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateOutcome {
    /// Total time spent sleeping
    pub waited: Duration,
    /// Whether the hourly budget ran dry and forced the recovery sleep
    pub budget_exhausted: bool,
}

/// Politeness interval plus hourly token bucket.
///
/// Not synchronized: the owner must route every call through one
/// `&mut RateGate` (the HTTP client keeps it behind a single mutex).
#[derive(Debug)]
pub struct RateGate {
    min_interval: Duration,
    exhaustion_sleep: Duration,
    last_call: Option<Instant>,
    budget: Option<RateBudget>,
}

impl RateGate {
    /// Create a new gate with the given config
    pub fn new(config: &RateGateConfig) -> Self {
        Self {
            min_interval: config.min_interval,
            exhaustion_sleep: config.exhaustion_sleep,
            last_call: None,
            budget: RateBudget::new(config.capacity()),
        }
    }

    /// Current bucket, if the hourly throttle is active
    pub fn budget(&self) -> Option<&RateBudget> {
        self.budget.as_ref()
    }

    /// Wait until a call may proceed, then consume one token
    pub async fn acquire(&mut self) -> GateOutcome {
        let mut outcome = GateOutcome::default();

        if !self.min_interval.is_zero() {
            let mut now = Instant::now();
            if let Some(last) = self.last_call {
                let wait = self
                    .min_interval
                    .saturating_sub(now.saturating_duration_since(last));
                if !wait.is_zero() {
                    tokio::time::sleep(wait).await;
                    outcome.waited += wait;
                    now = Instant::now();
                }
            }
            self.last_call = Some(now);
        }

        let Some(budget) = self.budget.as_mut() else {
            return outcome;
        };

        let mut now = Instant::now();
        let mut tokens = budget.available_at(now);

        if tokens < 1.0 {
            let sleep = self.exhaustion_sleep;
            info!(
                sleep_secs = sleep.as_secs_f64(),
                expected_tokens = (sleep.as_secs_f64() * budget.refill_rate).round(),
                "Hourly request budget exhausted, sleeping"
            );
            tokio::time::sleep(sleep).await;
            outcome.waited += sleep;
            outcome.budget_exhausted = true;
            now = Instant::now();
            tokens = budget.available_at(now);
        }

        budget.commit(tokens, now);
        debug!(tokens_left = budget.tokens, "Rate gate passed");
        outcome
    }
}

#[cfg(test)]
mod rate_limit_tests {
    use super::*;

    fn bucket_only(requests_per_hour: u32) -> RateGateConfig {
        RateGateConfig {
            min_interval: Duration::ZERO,
            requests_per_hour,
            safety_margin: 0.0,
            exhaustion_sleep: Duration::from_secs(600),
        }
    }

    #[test]
    fn test_rate_gate_config_default() {
        let config = RateGateConfig::default();
        assert_eq!(config.min_interval, Duration::from_millis(100));
        assert_eq!(config.capacity(), 4950);
    }

    #[test]
    fn test_capacity_floors() {
        let config = RateGateConfig {
            requests_per_hour: 99,
            safety_margin: 0.5,
            ..RateGateConfig::default()
        };
        assert_eq!(config.capacity(), 49);
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_allows_capacity_then_sleeps() {
        let mut gate = RateGate::new(&bucket_only(10));
        assert_eq!(gate.budget().unwrap().capacity(), 10);

        let start = Instant::now();
        for _ in 0..10 {
            let outcome = gate.acquire().await;
            assert!(!outcome.budget_exhausted);
            assert_eq!(outcome.waited, Duration::ZERO);
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert!(gate.budget().unwrap().tokens() < 1.0);

        let outcome = gate.acquire().await;
        assert!(outcome.budget_exhausted);
        assert_eq!(outcome.waited, Duration::from_secs(600));
        assert!(start.elapsed() >= Duration::from_secs(600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_refills_over_time() {
        let mut gate = RateGate::new(&bucket_only(10));
        for _ in 0..10 {
            gate.acquire().await;
        }

        // 10/hour refills one token every 360 seconds
        tokio::time::advance(Duration::from_secs(360)).await;
        let outcome = gate.acquire().await;
        assert!(!outcome.budget_exhausted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokens_never_exceed_capacity() {
        let mut gate = RateGate::new(&bucket_only(10));
        gate.acquire().await;
        tokio::time::advance(Duration::from_secs(10 * 3600)).await;
        gate.acquire().await;
        let tokens = gate.budget().unwrap().tokens();
        assert!(tokens <= 9.0 + 1e-9);
        assert!(tokens >= 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovery_sleeps_fixed_window() {
        let mut config = bucket_only(10);
        config.exhaustion_sleep = Duration::from_secs(60);
        let mut gate = RateGate::new(&config);
        for _ in 0..10 {
            gate.acquire().await;
        }

        // 60s refills a sixth of a token; the call still proceeds and the
        // bucket bottoms out at zero
        let start = Instant::now();
        let outcome = gate.acquire().await;
        assert!(outcome.budget_exhausted);
        assert_eq!(outcome.waited, Duration::from_secs(60));
        assert!(start.elapsed() >= Duration::from_secs(60));
        assert_eq!(gate.budget().unwrap().tokens(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_politeness_interval() {
        let mut gate = RateGate::new(&RateGateConfig {
            min_interval: Duration::from_millis(100),
            ..RateGateConfig::unlimited()
        });

        let first = gate.acquire().await;
        assert_eq!(first.waited, Duration::ZERO);

        let second = gate.acquire().await;
        assert_eq!(second.waited, Duration::from_millis(100));

        tokio::time::advance(Duration::from_millis(250)).await;
        let third = gate.acquire().await;
        assert_eq!(third.waited, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_budget_is_noop() {
        let mut gate = RateGate::new(&RateGateConfig::unlimited());
        assert!(gate.budget().is_none());
        for _ in 0..100 {
            assert_eq!(gate.acquire().await, GateOutcome::default());
        }
    }
}
