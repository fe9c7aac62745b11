//! Seeded environment with a virtual clock.
//!
//! Time only moves when something sleeps or the test calls
//! [`SimEnv::advance`], and randomness comes from a ChaCha stream seeded at
//! construction, so a run is fully determined by its seed and inputs.

use std::{
    ops::Sub,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use roovo_app::Environment;

/// Point on the virtual clock, measured from the start of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct SimInstant(Duration);

impl SimInstant {
    /// Time elapsed since the run started.
    pub fn elapsed_since_start(self) -> Duration {
        self.0
    }
}

impl Sub for SimInstant {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        self.0.saturating_sub(rhs.0)
    }
}

#[derive(Debug)]
struct Inner {
    rng: ChaCha8Rng,
    clock: Duration,
}

/// Deterministic [`Environment`].
///
/// Clones share the same clock and RNG stream.
#[derive(Debug, Clone)]
pub struct SimEnv {
    inner: Arc<Mutex<Inner>>,
}

impl SimEnv {
    /// Environment seeded with `seed`.
    pub fn with_seed(seed: u64) -> Self {
        let inner = Inner { rng: ChaCha8Rng::seed_from_u64(seed), clock: Duration::ZERO };
        Self { inner: Arc::new(Mutex::new(inner)) }
    }

    /// Move the virtual clock forward.
    pub fn advance(&self, duration: Duration) {
        let mut inner = self.lock();
        inner.clock = inner.clock.saturating_add(duration);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Environment for SimEnv {
    type Instant = SimInstant;

    fn now(&self) -> SimInstant {
        SimInstant(self.lock().clock)
    }

    async fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.lock().rng.fill_bytes(buffer);
    }
}
