use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::engine::compound_year;
use super::error::EngineError;
use super::generation::CancelToken;
use super::types::{FireSummary, MonteCarloPoint, Profile};

pub const DEFAULT_TRIALS: u32 = 1_000;
pub const MAX_TRIALS: u32 = 100_000;
pub const MAX_YEARS_TO_SHOW: u32 = 100;
pub const MAX_DEFAULT_YEARS_TO_SHOW: u32 = 30;
pub const YEARS_PAST_FIRE: u32 = 5;

const CANCEL_CHECK_INTERVAL: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonteCarloConfig {
    pub trials: u32,
    pub years_to_show: Option<u32>,
    pub seed: Option<u64>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            years_to_show: None,
            seed: None,
        }
    }
}

impl MonteCarloConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.trials == 0 || self.trials > MAX_TRIALS {
            return Err(EngineError::InvalidConfig(format!(
                "trials must be between 1 and {MAX_TRIALS}"
            )));
        }
        if self
            .years_to_show
            .is_some_and(|years| years > MAX_YEARS_TO_SHOW)
        {
            return Err(EngineError::InvalidConfig(format!(
                "yearsToShow must be <= {MAX_YEARS_TO_SHOW}"
            )));
        }
        Ok(())
    }
}

pub trait ReturnSampler {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R, mean_return: f64) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrwinHallReturns {
    pub spread: f64,
    pub floor: f64,
    pub ceiling: f64,
}

impl Default for IrwinHallReturns {
    fn default() -> Self {
        Self {
            spread: 0.6,
            floor: -0.5,
            ceiling: 1.0,
        }
    }
}

impl ReturnSampler for IrwinHallReturns {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R, mean_return: f64) -> f64 {
        let u = (rng.random::<f64>()
            + rng.random::<f64>()
            + rng.random::<f64>()
            + rng.random::<f64>())
            / 4.0;
        ((u - 0.5) * self.spread + mean_return).clamp(self.floor, self.ceiling)
    }
}

pub fn default_years_to_show(summary: &FireSummary) -> u32 {
    summary
        .years_to_fire
        .year_index()
        .saturating_add(YEARS_PAST_FIRE)
        .min(MAX_DEFAULT_YEARS_TO_SHOW)
}

pub fn run_monte_carlo(
    profile: &Profile,
    summary: &FireSummary,
    config: &MonteCarloConfig,
    cancel: &CancelToken,
) -> Result<Vec<MonteCarloPoint>, EngineError> {
    simulate_with_sampler(
        profile,
        summary,
        config,
        &IrwinHallReturns::default(),
        cancel,
    )
}

pub fn simulate_with_sampler<S: ReturnSampler>(
    profile: &Profile,
    summary: &FireSummary,
    config: &MonteCarloConfig,
    sampler: &S,
    cancel: &CancelToken,
) -> Result<Vec<MonteCarloPoint>, EngineError> {
    profile.validate()?;
    config.validate()?;

    let years = config
        .years_to_show
        .unwrap_or_else(|| default_years_to_show(summary));
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mean_return = profile.investment_return / 100.0;
    let annual_savings = profile.annual_savings();
    let mut by_year: Vec<Vec<f64>> = (0..=years)
        .map(|_| Vec::with_capacity(config.trials as usize))
        .collect();

    for trial in 0..config.trials {
        if trial % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
            debug!(trial, generation = cancel.generation(), "monte carlo cancelled");
            return Err(EngineError::Cancelled);
        }

        let mut balance = profile.current_savings;
        by_year[0].push(balance);
        for samples in by_year.iter_mut().skip(1) {
            let annual_return = sampler.sample(&mut rng, mean_return);
            balance = compound_year(balance, annual_return, annual_savings);
            samples.push(balance);
        }
    }

    let points = by_year
        .into_iter()
        .enumerate()
        .map(|(idx, mut samples)| {
            let year = idx as u32;
            samples.sort_by(|a, b| a.total_cmp(b));
            MonteCarloPoint {
                year,
                age: profile.current_age.saturating_add(year),
                p10: nearest_rank(&samples, 0.10),
                p25: nearest_rank(&samples, 0.25),
                p50: nearest_rank(&samples, 0.50),
                p75: nearest_rank(&samples, 0.75),
                p90: nearest_rank(&samples, 0.90),
                expected: summary.balance_at(year).unwrap_or(0.0),
            }
        })
        .collect::<Vec<_>>();

    debug!(
        trials = config.trials,
        years,
        seeded = config.seed.is_some(),
        "monte carlo complete"
    );
    Ok(points)
}

// Nearest rank, clamped to the last element.
fn nearest_rank(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() as f64 * p).floor() as usize).min(sorted.len() - 1);
    sorted[idx]
}
