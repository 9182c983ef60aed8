mod achievements;
mod engine;
mod error;
mod generation;
mod memo;
mod monte_carlo;
mod solver;
mod types;

pub use achievements::evaluate;
pub use engine::{compound_months, compound_year, project, project_with_horizon};
pub use error::EngineError;
pub use generation::{CancelToken, GenerationGate};
pub use memo::ProjectionMemo;
pub use monte_carlo::{
    DEFAULT_TRIALS, IrwinHallReturns, MAX_TRIALS, MAX_YEARS_TO_SHOW, MonteCarloConfig,
    ReturnSampler, default_years_to_show, run_monte_carlo, simulate_with_sampler,
};
pub use solver::{MAX_SOLVE_YEARS, analyze_scenarios, solve_years};
pub use types::{
    Achievement, AchievementId, DEFAULT_HORIZON_YEARS, FIRE_MULTIPLE, FireSummary, FireTiming,
    MonteCarloPoint, Profile, ProjectionPoint, Ratio, Scenario, ScenarioKind, UnreachableReason,
    YearsToGoal,
};
