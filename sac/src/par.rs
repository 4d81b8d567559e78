use std::time::{Duration, Instant};

use log::debug;
use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;
use sample_consensus::Estimator;

use crate::{
    error::{check_points, check_tolerance, SacError},
    ransac::{run_trials, Fitted, RansacParams},
    sample::{clock_seed, Sampler},
};

/// RANSAC with its trial budget spread over a pool of rayon workers.
///
/// Every worker owns a generator seeded from the base seed and its worker
/// id, runs its share of the trials and keeps a local best. The local bests
/// are then reduced in worker order: the largest consensus set wins and ties
/// go to the lowest worker id. The result therefore depends only on the
/// seed and the worker count, never on scheduling.
#[derive(Debug, Clone, PartialEq)]
pub struct ParRansac {
    max_iterations: usize,
    distance_tol: f64,
    time_limit: Option<Duration>,
    seed: u64,
    workers: usize,
}

impl ParRansac {
    pub fn new(
        max_iterations: usize,
        distance_tol: f64,
        seed: Option<u64>,
        workers: usize,
    ) -> Self {
        ParRansac {
            max_iterations,
            distance_tol,
            time_limit: None,
            seed: seed.unwrap_or_else(clock_seed),
            workers,
        }
    }

    pub fn from_params(params: &RansacParams) -> Self {
        ParRansac {
            time_limit: params.time_limit,
            ..ParRansac::new(
                params.max_iterations,
                params.distance_tol,
                params.random_seed,
                rayon::current_num_threads(),
            )
        }
    }

    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = Some(time_limit);
        self
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.workers
    }

    // The remainder of an uneven split goes to the lowest ids.
    fn share(&self, worker: usize) -> usize {
        let base = self.max_iterations / self.workers;
        base + usize::from(worker < self.max_iterations % self.workers)
    }

    fn worker_seed(&self, worker: usize) -> u64 {
        self.seed ^ (worker as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }

    pub fn fit<E, Data>(
        &self,
        estimator: &E,
        points: &[Data],
    ) -> Result<Option<Fitted<E::Model>>, SacError>
    where
        E: Estimator<Data> + Sync,
        E::Model: Send,
        Data: Clone + Sync,
    {
        check_tolerance(self.distance_tol)?;
        if self.workers == 0 {
            return Err(SacError::InvalidWorkers);
        }
        if self.max_iterations == 0 {
            return Ok(None);
        }
        check_points(points.len(), E::MIN_SAMPLES)?;

        let start = Instant::now();
        let locals = { (0..self.workers).into_par_iter() }
            .map(|worker| {
                let mut sampler = Sampler::new(StdRng::seed_from_u64(self.worker_seed(worker)));
                run_trials(
                    estimator,
                    points,
                    self.share(worker),
                    self.distance_tol,
                    self.time_limit,
                    &mut sampler,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut iterations = 0;
        let mut best: Option<(E::Model, Vec<usize>)> = None;
        for (local, trials) in locals {
            iterations += trials;
            let Some((model, inliers)) = local else {
                continue;
            };
            if inliers.len() > best.as_ref().map_or(0, |(_, inliers)| inliers.len()) {
                best = Some((model, inliers));
            }
        }

        debug!(
            "parallel RANSAC kept {} of {} points after {} iterations on {} workers in {:?}",
            best.as_ref().map_or(0, |(_, inliers)| inliers.len()),
            points.len(),
            iterations,
            self.workers,
            start.elapsed()
        );
        Ok(best.map(|(model, inliers)| Fitted {
            model,
            inliers,
            iterations,
        }))
    }

    pub fn inliers<E, Data>(&self, estimator: &E, points: &[Data]) -> Result<Vec<usize>, SacError>
    where
        E: Estimator<Data> + Sync,
        E::Model: Send,
        Data: Clone + Sync,
    {
        let fitted = self.fit(estimator, points)?;
        Ok(fitted.map(|fitted| fitted.inliers).unwrap_or_default())
    }
}
