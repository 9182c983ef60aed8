use tracing::debug;

use super::engine::compound_year;
use super::types::{FireSummary, Profile, Scenario, ScenarioKind, UnreachableReason, YearsToGoal};

pub const MAX_SOLVE_YEARS: u32 = 100;

#[derive(Debug, Clone, Copy)]
struct ScenarioAssumption {
    kind: ScenarioKind,
    name: &'static str,
    annual_return_percent: f64,
    savings_factor: f64,
}

const SCENARIOS: [ScenarioAssumption; 3] = [
    ScenarioAssumption {
        kind: ScenarioKind::Conservative,
        name: "Conservative",
        annual_return_percent: 5.0,
        savings_factor: 0.8,
    },
    ScenarioAssumption {
        kind: ScenarioKind::Moderate,
        name: "Moderate",
        annual_return_percent: 7.0,
        savings_factor: 1.0,
    },
    ScenarioAssumption {
        kind: ScenarioKind::Aggressive,
        name: "Aggressive",
        annual_return_percent: 9.0,
        savings_factor: 1.2,
    },
];

/// Smallest whole number of yearly steps after which the balance covers
/// `fire_number`. Steps are annual, not monthly.
pub fn solve_years(
    fire_number: f64,
    current_savings: f64,
    annual_savings: f64,
    annual_return_rate: f64,
) -> YearsToGoal {
    if fire_number - current_savings <= 0.0 {
        return YearsToGoal::Reached { years: 0 };
    }
    if annual_savings <= 0.0 {
        return YearsToGoal::Unreachable {
            reason: UnreachableReason::NoContributions,
        };
    }
    if annual_return_rate <= 0.0 {
        return YearsToGoal::Unreachable {
            reason: UnreachableReason::NoGrowth,
        };
    }

    let mut balance = current_savings;
    let mut years = 0;
    while balance < fire_number && years < MAX_SOLVE_YEARS {
        balance = compound_year(balance, annual_return_rate, annual_savings);
        years += 1;
    }

    if balance >= fire_number {
        YearsToGoal::Reached { years }
    } else {
        YearsToGoal::Unreachable {
            reason: UnreachableReason::IterationCap,
        }
    }
}

pub fn analyze_scenarios(profile: &Profile, summary: &FireSummary) -> [Scenario; 3] {
    SCENARIOS.map(|assumption| {
        let annual_savings = profile.annual_savings() * assumption.savings_factor;
        let solved_years = solve_years(
            summary.fire_number,
            profile.current_savings,
            annual_savings,
            assumption.annual_return_percent / 100.0,
        );
        debug!(
            scenario = assumption.name,
            annual_savings,
            years = ?solved_years.years(),
            "solved scenario"
        );
        Scenario {
            kind: assumption.kind,
            name: assumption.name,
            annual_return_percent: assumption.annual_return_percent,
            annual_savings,
            solved_years,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::project;
    use crate::core::engine::tests::{assert_approx, sample_profile};
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    fn replay(current_savings: f64, annual_savings: f64, rate: f64, years: u32) -> f64 {
        (0..years).fold(current_savings, |acc, _| compound_year(acc, rate, annual_savings))
    }

    #[test]
    fn solved_years_replay_without_off_by_one() {
        let result = solve_years(500_000.0, 0.0, 24_000.0, 0.07);
        assert_eq!(result, YearsToGoal::Reached { years: 14 });

        let n = result.years().expect("reachable");
        assert!(replay(0.0, 24_000.0, 0.07, n) >= 500_000.0);
        assert!(replay(0.0, 24_000.0, 0.07, n - 1) < 500_000.0);
    }

    #[test]
    fn already_met_goal_needs_zero_years() {
        assert_eq!(
            solve_years(500_000.0, 500_000.0, 0.0, 0.0),
            YearsToGoal::Reached { years: 0 }
        );
        assert_eq!(
            solve_years(500_000.0, 750_000.0, 24_000.0, 0.07),
            YearsToGoal::Reached { years: 0 }
        );
    }

    #[test]
    fn guards_report_distinct_unreachable_reasons() {
        assert_eq!(
            solve_years(500_000.0, 0.0, 0.0, 0.07),
            YearsToGoal::Unreachable {
                reason: UnreachableReason::NoContributions
            }
        );
        assert_eq!(
            solve_years(500_000.0, 0.0, 24_000.0, 0.0),
            YearsToGoal::Unreachable {
                reason: UnreachableReason::NoGrowth
            }
        );
        assert_eq!(
            solve_years(1e15, 0.0, 1.0, 0.01),
            YearsToGoal::Unreachable {
                reason: UnreachableReason::IterationCap
            }
        );
    }

    #[test]
    fn goal_reached_exactly_at_cap_is_still_reported() {
        let rate = 0.01;
        let target = replay(0.0, 1.0, rate, MAX_SOLVE_YEARS);
        assert_eq!(
            solve_years(target, 0.0, 1.0, rate),
            YearsToGoal::Reached {
                years: MAX_SOLVE_YEARS
            }
        );
    }

    #[test]
    fn sample_profile_scenarios_match_hand_replay() {
        let profile = sample_profile();
        let summary = project(&profile).expect("valid profile");
        let scenarios = analyze_scenarios(&profile, &summary);

        assert_eq!(scenarios[0].kind, ScenarioKind::Conservative);
        assert_eq!(scenarios[1].kind, ScenarioKind::Moderate);
        assert_eq!(scenarios[2].kind, ScenarioKind::Aggressive);

        assert_approx(scenarios[0].annual_savings, 24_000.0);
        assert_approx(scenarios[1].annual_savings, 30_000.0);
        assert_approx(scenarios[2].annual_savings, 36_000.0);

        assert_eq!(scenarios[0].solved_years, YearsToGoal::Reached { years: 24 });
        assert_eq!(scenarios[1].solved_years, YearsToGoal::Reached { years: 19 });
        assert_eq!(scenarios[2].solved_years, YearsToGoal::Reached { years: 15 });
    }

    proptest! {
        #[test]
        fn prop_reached_years_are_minimal(
            fire_number in 1_000u32..3_000_000,
            current_savings in 0u32..1_000_000,
            annual_savings in 1u32..100_000,
            rate_bp in 1u32..1500
        ) {
            let fire_number = fire_number as f64;
            let current_savings = current_savings as f64;
            let annual_savings = annual_savings as f64;
            let rate = rate_bp as f64 / 10_000.0;

            match solve_years(fire_number, current_savings, annual_savings, rate) {
                YearsToGoal::Reached { years } => {
                    prop_assert!(years <= MAX_SOLVE_YEARS);
                    prop_assert!(replay(current_savings, annual_savings, rate, years) >= fire_number);
                    if years > 0 {
                        prop_assert!(
                            replay(current_savings, annual_savings, rate, years - 1) < fire_number
                        );
                    }
                }
                YearsToGoal::Unreachable { reason } => {
                    prop_assert_eq!(reason, UnreachableReason::IterationCap);
                    prop_assert!(
                        replay(current_savings, annual_savings, rate, MAX_SOLVE_YEARS) < fire_number
                    );
                }
            }
        }
    }
}
