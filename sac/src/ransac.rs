use std::time::{Duration, Instant};

use log::{debug, trace, warn};
use rand::{rngs::StdRng, RngCore};
use sample_consensus::{Consensus, Estimator, Model};

use crate::{
    error::{check_points, check_tolerance, SacError},
    sample::{seeded_rng, Sampler},
};

/// Parameters of a fixed-budget RANSAC search.
#[derive(Debug, Clone, PartialEq)]
pub struct RansacParams {
    pub max_iterations: usize,
    /// Points strictly closer than this to a candidate are its inliers.
    pub distance_tol: f64,
    pub random_seed: Option<u64>,
    pub time_limit: Option<Duration>,
}

impl Default for RansacParams {
    fn default() -> Self {
        RansacParams {
            max_iterations: 100,
            distance_tol: 0.5,
            random_seed: None,
            time_limit: None,
        }
    }
}

/// The winning candidate of a search.
#[derive(Debug, Clone, PartialEq)]
pub struct Fitted<M> {
    pub model: M,
    /// Indices of the consensus set, ascending and unique.
    pub inliers: Vec<usize>,
    pub iterations: usize,
}

/// Classic RANSAC over a fixed number of independent trials.
///
/// Each trial draws a minimal sample, lets the estimator build candidates
/// from it and scores every point against every candidate. The best
/// consensus set is only replaced by a strictly larger one, so ties keep the
/// earliest candidate.
#[derive(Debug, Clone)]
pub struct Ransac<R = StdRng> {
    max_iterations: usize,
    distance_tol: f64,
    time_limit: Option<Duration>,
    sampler: Sampler<R>,
}

impl<R: RngCore> Ransac<R> {
    pub fn new(max_iterations: usize, distance_tol: f64, rng: R) -> Self {
        Ransac {
            max_iterations,
            distance_tol,
            time_limit: None,
            sampler: Sampler::new(rng),
        }
    }

    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = Some(time_limit);
        self
    }

    #[inline]
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    #[inline]
    pub fn distance_tol(&self) -> f64 {
        self.distance_tol
    }

    /// Runs the search over `points`.
    ///
    /// Returns `Ok(None)` when no trials are requested or no candidate ever
    /// collects an inlier, which callers should treat as "everything is an
    /// outlier".
    pub fn fit<E, Data>(
        &mut self,
        estimator: &E,
        points: &[Data],
    ) -> Result<Option<Fitted<E::Model>>, SacError>
    where
        E: Estimator<Data>,
        Data: Clone,
    {
        check_tolerance(self.distance_tol)?;
        if self.max_iterations == 0 {
            return Ok(None);
        }
        check_points(points.len(), E::MIN_SAMPLES)?;

        let start = Instant::now();
        let (best, iterations) = run_trials(
            estimator,
            points,
            self.max_iterations,
            self.distance_tol,
            self.time_limit,
            &mut self.sampler,
        )?;

        debug!(
            "RANSAC kept {} of {} points after {} iterations in {:?}",
            best.as_ref().map_or(0, |(_, inliers)| inliers.len()),
            points.len(),
            iterations,
            start.elapsed()
        );
        Ok(best.map(|(model, inliers)| Fitted {
            model,
            inliers,
            iterations,
        }))
    }

    pub fn inliers<E, Data>(
        &mut self,
        estimator: &E,
        points: &[Data],
    ) -> Result<Vec<usize>, SacError>
    where
        E: Estimator<Data>,
        Data: Clone,
    {
        let fitted = self.fit(estimator, points)?;
        Ok(fitted.map(|fitted| fitted.inliers).unwrap_or_default())
    }
}

impl Ransac<StdRng> {
    pub fn seeded(max_iterations: usize, distance_tol: f64, seed: Option<u64>) -> Self {
        Ransac::new(max_iterations, distance_tol, seeded_rng(seed))
    }

    pub fn from_params(params: &RansacParams) -> Self {
        Ransac {
            time_limit: params.time_limit,
            ..Ransac::seeded(params.max_iterations, params.distance_tol, params.random_seed)
        }
    }
}

impl<E, R, Data> Consensus<E, Data> for Ransac<R>
where
    E: Estimator<Data>,
    R: RngCore,
    Data: Clone,
{
    type Inliers = Vec<usize>;

    fn model<I>(&mut self, estimator: &E, data: I) -> Option<E::Model>
    where
        I: Iterator<Item = Data> + Clone,
    {
        self.model_inliers(estimator, data).map(|(model, _)| model)
    }

    fn model_inliers<I>(&mut self, estimator: &E, data: I) -> Option<(E::Model, Self::Inliers)>
    where
        I: Iterator<Item = Data> + Clone,
    {
        let points = data.collect::<Vec<_>>();
        match self.fit(estimator, &points) {
            Ok(fitted) => fitted.map(|fitted| (fitted.model, fitted.inliers)),
            Err(err) => {
                warn!("RANSAC rejected its input: {err}");
                None
            }
        }
    }
}

pub(crate) fn run_trials<E, Data, R>(
    estimator: &E,
    points: &[Data],
    trials: usize,
    distance_tol: f64,
    time_limit: Option<Duration>,
    sampler: &mut Sampler<R>,
) -> Result<(Option<(E::Model, Vec<usize>)>, usize), SacError>
where
    E: Estimator<Data>,
    Data: Clone,
    R: RngCore,
{
    let start = Instant::now();
    let mut sample = Vec::with_capacity(E::MIN_SAMPLES);
    let mut best: Option<(E::Model, Vec<usize>)> = None;

    let mut iterations = 0;
    while iterations < trials {
        if time_limit.is_some_and(|limit| start.elapsed() >= limit) {
            trace!("RANSAC time limit reached after {iterations} iterations");
            break;
        }
        iterations += 1;

        sampler.draw_into(points.len(), E::MIN_SAMPLES, &mut sample)?;
        let candidates = estimator.estimate(sample.iter().map(|&index| points[index].clone()));

        let mut scored = false;
        for model in candidates {
            let Some(inliers) = consensus(&model, points, &sample, distance_tol) else {
                continue;
            };
            scored = true;

            let best_len = best.as_ref().map_or(0, |(_, inliers)| inliers.len());
            if inliers.len() > best_len {
                trace!(
                    "iteration {iterations}: consensus grew from {best_len} to {}",
                    inliers.len()
                );
                best = Some((model, inliers));
            }
        }
        if !scored {
            trace!("iteration {iterations}: degenerate sample {sample:?} skipped");
        }
    }
    Ok((best, iterations))
}

/// Collects the consensus set of `model`: the defining sample plus every
/// point with a residual below `distance_tol`. A model that cannot measure
/// its own sample is degenerate and has no consensus set.
fn consensus<M, Data>(
    model: &M,
    points: &[Data],
    sample: &[usize],
    distance_tol: f64,
) -> Option<Vec<usize>>
where
    M: Model<Data>,
{
    if { sample.iter() }.any(|&index| !model.residual(&points[index]).is_finite()) {
        return None;
    }

    let inliers = { points.iter().enumerate() }
        .filter(|&(index, point)| model.residual(point) < distance_tol || sample.contains(&index))
        .map(|(index, _)| index)
        .collect();
    Some(inliers)
}
