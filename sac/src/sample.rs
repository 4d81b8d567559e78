use std::time::{SystemTime, UNIX_EPOCH};

use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};

use crate::error::{check_points, SacError};

/// Upper bound on random draws spent on a single minimal sample.
pub const MAX_DRAW_ATTEMPTS: usize = 4096;

/// Draws minimal samples: `k` distinct indices chosen uniformly from `0..n`.
///
/// Indices are kept in the order they were accepted, so the first accepted
/// draw is always the first point handed to the estimator.
#[derive(Debug, Clone)]
pub struct Sampler<R> {
    rng: R,
}

impl<R: RngCore> Sampler<R> {
    pub fn new(rng: R) -> Self {
        Sampler { rng }
    }

    #[inline]
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    #[inline]
    pub fn into_inner(self) -> R {
        self.rng
    }

    /// Fills `sample` with `k` distinct indices in `0..n`, replacing its
    /// previous contents. Collisions are redrawn, up to
    /// [`MAX_DRAW_ATTEMPTS`] draws in total.
    pub fn draw_into(
        &mut self,
        n: usize,
        k: usize,
        sample: &mut Vec<usize>,
    ) -> Result<(), SacError> {
        check_points(n, k)?;
        sample.clear();

        let mut attempts = 0;
        while sample.len() < k {
            if attempts == MAX_DRAW_ATTEMPTS {
                return Err(SacError::SamplingExhausted {
                    required: k,
                    attempts,
                });
            }
            attempts += 1;

            let index = self.rng.random_range(0..n);
            if !sample.contains(&index) {
                sample.push(index);
            }
        }
        Ok(())
    }

    pub fn draw(&mut self, n: usize, k: usize) -> Result<Vec<usize>, SacError> {
        let mut sample = Vec::with_capacity(k);
        self.draw_into(n, k, &mut sample)?;
        Ok(sample)
    }
}

pub fn clock_seed() -> u64 {
    { SystemTime::now().duration_since(UNIX_EPOCH) }
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

/// A fixed-seed generator, or a clock-seeded one when `seed` is `None`.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    StdRng::seed_from_u64(seed.unwrap_or_else(clock_seed))
}
