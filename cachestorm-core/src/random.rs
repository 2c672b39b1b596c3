use rand::rngs::SmallRng;
use rand::{Rng as _, RngCore as _, SeedableRng as _};

/// Per-worker supplier of uniform draws and payload bytes.
///
/// Each worker owns its source exclusively; sources are never shared between workers.
pub trait RandomSource: Send {
    /// Uniform draw in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    fn fill_bytes(&mut self, buf: &mut [u8]);
}

/// Builds one independent [`RandomSource`] per worker id.
pub trait RandomSourceFactory {
    type Source: RandomSource + 'static;

    fn source_for(&self, worker_id: u64) -> Self::Source;
}

impl<F, R> RandomSourceFactory for F
where
    F: Fn(u64) -> R,
    R: RandomSource + 'static,
{
    type Source = R;

    fn source_for(&self, worker_id: u64) -> R {
        self(worker_id)
    }
}

#[derive(Debug, Clone)]
pub struct RngSource {
    rng: SmallRng,
}

impl RngSource {
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for RngSource {
    fn next_unit(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }

    fn fill_bytes(&mut self, buf: &mut [u8]) {
        self.rng.fill_bytes(buf);
    }
}

/// Default factory: entropy-seeded per worker, or `seed + worker_id` when a run seed is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeededRngFactory {
    seed: Option<u64>,
}

impl SeededRngFactory {
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        Self { seed }
    }
}

impl RandomSourceFactory for SeededRngFactory {
    type Source = RngSource;

    fn source_for(&self, worker_id: u64) -> RngSource {
        match self.seed {
            Some(seed) => RngSource::seeded(seed.wrapping_add(worker_id)),
            None => RngSource::from_entropy(),
        }
    }
}

/// Replays a fixed list of draws, cycling when exhausted. Payload bytes are a constant fill.
#[derive(Debug, Clone)]
pub struct SequenceSource {
    values: Vec<f64>,
    pos: usize,
    fill: u8,
}

impl SequenceSource {
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            pos: 0,
            fill: b'x',
        }
    }

    #[must_use]
    pub fn with_fill(mut self, fill: u8) -> Self {
        self.fill = fill;
        self
    }
}

impl RandomSource for SequenceSource {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.pos % self.values.len()];
        self.pos = self.pos.wrapping_add(1);
        v
    }

    fn fill_bytes(&mut self, buf: &mut [u8]) {
        buf.fill(self.fill);
    }
}
