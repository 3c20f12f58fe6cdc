//! Finality polling schedule.
//!
//! After submission the orchestrator reads the transaction status repeatedly,
//! sleeping between reads with exponential backoff. [`PollConfig`] sets the
//! schedule and how long to keep going.
//!
//! # Example
//!
//! ```rust
//! use aptos_transfer::poll::PollConfig;
//! use std::time::Duration;
//!
//! let config = PollConfig::builder()
//!     .initial_interval_ms(50)
//!     .max_interval_ms(500)
//!     .timeout(Duration::from_secs(20))
//!     .build();
//! assert_eq!(config.delay_for_attempt(0), Duration::from_millis(50));
//! assert_eq!(config.delay_for_attempt(10), Duration::from_millis(500));
//! ```

use std::time::Duration;

/// Configuration for status polling.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay after the first status read (in milliseconds).
    pub initial_interval_ms: u64,
    /// Maximum delay between reads (in milliseconds).
    pub max_interval_ms: u64,
    /// Base for exponential backoff.
    pub exponential_base: f64,
    /// Whether to add random jitter to delays.
    pub jitter: bool,
    /// Jitter factor (0.0 to 1.0) - how much randomness to add.
    pub jitter_factor: f64,
    /// Give up after this long, whatever the ledger says. `None` polls until
    /// the transaction is final or expired.
    pub timeout: Option<Duration>,
    /// Seconds past the expiration timestamp before a still-pending
    /// transaction is reported as expired. Absorbs clock skew between this
    /// host and the ledger.
    pub expiration_grace_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_interval_ms: 100,
            max_interval_ms: 1_000,
            exponential_base: 2.0,
            jitter: false,
            jitter_factor: 0.2,
            timeout: Some(Duration::from_secs(60)),
            expiration_grace_secs: 5,
        }
    }
}

impl PollConfig {
    /// Creates a new builder for PollConfig.
    pub fn builder() -> PollConfigBuilder {
        PollConfigBuilder::default()
    }

    /// Returns the expiration grace period.
    pub fn expiration_grace(&self) -> Duration {
        Duration::from_secs(self.expiration_grace_secs)
    }

    /// Calculates the delay after the given zero-based poll attempt.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let base_delay = self.initial_interval_ms as f64 * self.exponential_base.powi(exponent);

        let capped_delay = base_delay.min(self.max_interval_ms as f64);

        let final_delay = if self.jitter {
            let jitter_range = capped_delay * self.jitter_factor;
            let jitter = rand::random::<f64>() * jitter_range * 2.0 - jitter_range;
            (capped_delay + jitter).max(0.0)
        } else {
            capped_delay
        };

        Duration::from_millis(final_delay as u64)
    }
}

/// Builder for PollConfig.
#[derive(Debug, Clone, Default)]
pub struct PollConfigBuilder {
    initial_interval_ms: Option<u64>,
    max_interval_ms: Option<u64>,
    exponential_base: Option<f64>,
    jitter: Option<bool>,
    jitter_factor: Option<f64>,
    timeout: Option<Option<Duration>>,
    expiration_grace_secs: Option<u64>,
}

impl PollConfigBuilder {
    /// Sets the delay after the first read (in milliseconds).
    pub fn initial_interval_ms(mut self, ms: u64) -> Self {
        self.initial_interval_ms = Some(ms);
        self
    }

    /// Sets the maximum delay between reads (in milliseconds).
    pub fn max_interval_ms(mut self, ms: u64) -> Self {
        self.max_interval_ms = Some(ms);
        self
    }

    /// Sets the base for exponential backoff.
    pub fn exponential_base(mut self, base: f64) -> Self {
        self.exponential_base = Some(base);
        self
    }

    /// Enables or disables jitter.
    pub fn jitter(mut self, jitter: bool) -> Self {
        self.jitter = Some(jitter);
        self
    }

    /// Sets the jitter factor (0.0 to 1.0).
    pub fn jitter_factor(mut self, factor: f64) -> Self {
        self.jitter_factor = Some(factor.clamp(0.0, 1.0));
        self
    }

    /// Sets the overall polling deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(Some(timeout));
        self
    }

    /// Polls with no deadline of its own.
    pub fn no_timeout(mut self) -> Self {
        self.timeout = Some(None);
        self
    }

    /// Sets the expiration grace period in seconds.
    pub fn expiration_grace_secs(mut self, secs: u64) -> Self {
        self.expiration_grace_secs = Some(secs);
        self
    }

    /// Builds the PollConfig.
    pub fn build(self) -> PollConfig {
        let default = PollConfig::default();
        PollConfig {
            initial_interval_ms: self.initial_interval_ms.unwrap_or(default.initial_interval_ms),
            max_interval_ms: self.max_interval_ms.unwrap_or(default.max_interval_ms),
            exponential_base: self.exponential_base.unwrap_or(default.exponential_base),
            jitter: self.jitter.unwrap_or(default.jitter),
            jitter_factor: self.jitter_factor.unwrap_or(default.jitter_factor),
            timeout: self.timeout.unwrap_or(default.timeout),
            expiration_grace_secs: self
                .expiration_grace_secs
                .unwrap_or(default.expiration_grace_secs),
        }
    }
}
