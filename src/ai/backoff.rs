// src/ai/backoff.rs
//! Retry pacing for calls to the document service.
//!
//! The wait after failed attempt `n` (1-based) is
//! `base_delay * 2^n + max_jitter * U[0, 1)`, which with the defaults is
//! `2^n + random()` seconds. Sleeping and randomness are injected so tests
//! can observe the schedule without waiting for it.

use std::time::Duration;

use rand::{Rng, RngCore};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    /// Total attempts per phase, including the first
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_jitter: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_jitter: Duration::from_secs(1),
        }
    }
}

impl BackoffPolicy {
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Delay after failed attempt `attempt`, given a jitter sample in [0, 1).
    pub fn delay_for_attempt(&self, attempt: u32, jitter_unit: f64) -> Duration {
        let exponent = attempt.min(16);
        let backoff = self.base_delay.saturating_mul(1u32 << exponent);
        backoff + self.max_jitter.mul_f64(jitter_unit.clamp(0.0, 1.0))
    }
}

/// Something that can block the pipeline for a while.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// A policy bound to a sleeper and a random source.
pub struct Backoff {
    policy: BackoffPolicy,
    sleeper: Box<dyn Sleeper>,
    rng: Box<dyn RngCore>,
}

impl Backoff {
    pub fn new(policy: BackoffPolicy, sleeper: Box<dyn Sleeper>, rng: Box<dyn RngCore>) -> Self {
        Self {
            policy,
            sleeper,
            rng,
        }
    }

    /// Real sleeping and thread-local randomness.
    pub fn system(policy: BackoffPolicy) -> Self {
        Self::new(policy, Box::new(ThreadSleeper), Box::new(rand::rng()))
    }

    pub fn max_attempts(&self) -> u32 {
        self.policy.max_attempts
    }

    /// Sleep for the delay that follows failed attempt `attempt`; returns it.
    pub fn wait(&mut self, attempt: u32) -> Duration {
        let unit: f64 = self.rng.random();
        let delay = self.policy.delay_for_attempt(attempt, unit);
        self.sleeper.sleep(delay);
        delay
    }
}
