use tracing::debug;

use super::error::EngineError;
use super::types::{
    DEFAULT_HORIZON_YEARS, FIRE_MULTIPLE, FireSummary, FireTiming, Profile, ProjectionPoint, Ratio,
};

pub fn project(profile: &Profile) -> Result<FireSummary, EngineError> {
    project_with_horizon(profile, DEFAULT_HORIZON_YEARS)
}

pub fn project_with_horizon(
    profile: &Profile,
    horizon_years: u32,
) -> Result<FireSummary, EngineError> {
    profile.validate()?;

    let fire_number = profile.annual_expenses() * FIRE_MULTIPLE;
    let monthly_return = profile.investment_return / 100.0 / 12.0;
    let withdrawal_rate = profile.safe_withdrawal_rate / 100.0;

    let mut projections = Vec::with_capacity(horizon_years as usize + 1);
    let mut balance = profile.current_savings;

    for year in 0..=horizon_years {
        let inflation = inflation_multiplier(profile.inflation_rate, year);
        let adjusted_fire_number = profile.annual_expenses() * inflation * FIRE_MULTIPLE;

        if year > 0 {
            balance = compound_months(balance, monthly_return, profile.monthly_savings, 12);
        }

        projections.push(ProjectionPoint {
            year,
            age: profile.current_age.saturating_add(year),
            balance,
            fire_number: adjusted_fire_number,
            fire_progress: progress_percent(balance, adjusted_fire_number),
            can_retire: balance >= adjusted_fire_number,
            monthly_income: balance * withdrawal_rate / 12.0,
        });
    }

    let years_to_fire = projections
        .iter()
        .find(|p| p.can_retire)
        .map(|p| FireTiming::Reached { year: p.year })
        .unwrap_or(FireTiming::BeyondHorizon {
            last_year: horizon_years,
        });

    debug!(
        fire_number,
        horizon_years,
        years_to_fire = years_to_fire.year_index(),
        reached = years_to_fire.is_reached(),
        "projected FIRE trajectory"
    );

    Ok(FireSummary {
        fire_number,
        current_net_worth: profile.current_savings,
        amount_needed: fire_number - profile.current_savings,
        savings_rate: Ratio::of(profile.annual_savings(), profile.current_income),
        progress_ratio: Ratio::of(profile.current_savings, fire_number),
        years_to_fire,
        years_until_target_age: profile.target_retirement_age - profile.current_age,
        projections,
        monthly_income_at_retirement: fire_number * withdrawal_rate / 12.0,
    })
}

/// Ordinary-annuity compounding: each month grows the balance, then adds the
/// contribution, so a contribution earns nothing in the month it is made.
pub fn compound_months(balance: f64, monthly_return: f64, contribution: f64, months: u32) -> f64 {
    (0..months).fold(balance, |acc, _| acc * (1.0 + monthly_return) + contribution)
}

pub fn compound_year(balance: f64, annual_return: f64, contribution: f64) -> f64 {
    balance * (1.0 + annual_return) + contribution
}

fn inflation_multiplier(inflation_rate_percent: f64, year: u32) -> f64 {
    (1.0 + inflation_rate_percent / 100.0).powi(year as i32)
}

fn progress_percent(balance: f64, target: f64) -> f64 {
    if balance >= target || target <= 0.0 {
        return 100.0;
    }
    let percent = balance / target * 100.0;
    if percent.is_nan() {
        return 0.0;
    }
    percent.clamp(0.0, 100.0)
}
