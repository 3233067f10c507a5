//! Spawn timers and the music fade envelope
//!
//! Time-based triggers that tick with the simulation.

use rand::Rng;

use crate::config::Interval;

/// Countdown that fires on a (possibly randomized) interval
#[derive(Debug, Clone)]
pub struct SpawnTimer {
    interval: Interval,
    /// Seconds until the next trigger
    remaining: f32,
    /// Total elapsed time in seconds
    elapsed: f32,
    paused: bool,
}

impl SpawnTimer {
    /// Create a timer whose first wait is sampled from `interval`
    pub fn new(interval: Interval, rng: &mut impl Rng) -> Self {
        let remaining = interval.sample(rng);
        Self::with_first_delay(interval, remaining)
    }

    /// Create a timer with an explicit first wait
    pub fn with_first_delay(interval: Interval, first_delay: f32) -> Self {
        Self {
            interval,
            remaining: first_delay,
            elapsed: 0.0,
            paused: false,
        }
    }

    /// Update time and return true if the timer fired.
    ///
    /// Fires at most once per call; a long tick does not queue triggers.
    pub fn update(&mut self, dt: f32, rng: &mut impl Rng) -> bool {
        if self.paused {
            return false;
        }
        self.elapsed += dt;
        self.remaining -= dt;

        if self.remaining <= 0.0 {
            self.remaining = self.interval.sample(rng);
            true
        } else {
            false
        }
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stop counting until [`SpawnTimer::restart`] is called
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume counting with a fresh wait of `delay`
    pub fn restart(&mut self, delay: f32) {
        self.remaining = delay;
        self.paused = false;
    }
}

/// Linear 0 → 1 envelope, used for the background music volume
#[derive(Debug, Clone)]
pub struct FadeIn {
    duration: f32,
    elapsed: f32,
}

impl FadeIn {
    pub fn new(duration: f32) -> Self {
        Self { duration, elapsed: 0.0 }
    }

    pub fn update(&mut self, dt: f32) {
        self.elapsed = (self.elapsed + dt).min(self.duration);
    }

    /// Current level in `[0, 1]`
    pub fn level(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }
}
