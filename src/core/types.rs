use std::hash::{DefaultHasher, Hash, Hasher};

use serde::Serialize;

use super::error::EngineError;

pub const DEFAULT_HORIZON_YEARS: u32 = 40;
pub const FIRE_MULTIPLE: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Profile {
    pub current_age: u32,
    pub current_income: f64,
    pub current_savings: f64,
    pub monthly_expenses: f64,
    pub monthly_savings: f64,
    pub investment_return: f64,
    pub inflation_rate: f64,
    pub target_retirement_age: u32,
    pub safe_withdrawal_rate: f64,
}

impl Profile {
    pub fn validate(&self) -> Result<(), EngineError> {
        let numeric = [
            ("currentIncome", self.current_income),
            ("currentSavings", self.current_savings),
            ("monthlyExpenses", self.monthly_expenses),
            ("monthlySavings", self.monthly_savings),
            ("investmentReturn", self.investment_return),
            ("inflationRate", self.inflation_rate),
            ("safeWithdrawalRate", self.safe_withdrawal_rate),
        ];
        for (field, value) in numeric {
            if !value.is_finite() {
                return Err(EngineError::invalid_input(field, "must be a finite number"));
            }
        }

        let non_negative = [
            ("currentIncome", self.current_income),
            ("currentSavings", self.current_savings),
            ("monthlyExpenses", self.monthly_expenses),
            ("monthlySavings", self.monthly_savings),
            ("safeWithdrawalRate", self.safe_withdrawal_rate),
        ];
        for (field, value) in non_negative {
            if value < 0.0 {
                return Err(EngineError::invalid_input(field, "must be >= 0"));
            }
        }

        if self.inflation_rate <= -100.0 {
            return Err(EngineError::invalid_input("inflationRate", "must be > -100"));
        }

        if self.target_retirement_age < self.current_age {
            return Err(EngineError::invalid_input(
                "targetRetirementAge",
                "must be >= currentAge",
            ));
        }

        Ok(())
    }

    pub fn annual_expenses(&self) -> f64 {
        self.monthly_expenses * 12.0
    }

    pub fn annual_savings(&self) -> f64 {
        self.monthly_savings * 12.0
    }

    pub fn cache_key(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.current_age.hash(&mut hasher);
        self.target_retirement_age.hash(&mut hasher);
        for value in [
            self.current_income,
            self.current_savings,
            self.monthly_expenses,
            self.monthly_savings,
            self.investment_return,
            self.inflation_rate,
            self.safe_withdrawal_rate,
        ] {
            value.to_bits().hash(&mut hasher);
        }
        hasher.finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "camelCase")]
pub enum Ratio {
    Defined(f64),
    Undefined,
}

impl Ratio {
    pub fn of(numerator: f64, denominator: f64) -> Self {
        if denominator == 0.0 {
            return Ratio::Undefined;
        }
        let value = numerator / denominator;
        if value.is_finite() {
            Ratio::Defined(value)
        } else {
            Ratio::Undefined
        }
    }

    pub fn get(self) -> Option<f64> {
        match self {
            Ratio::Defined(v) => Some(v),
            Ratio::Undefined => None,
        }
    }

    pub fn value(self, ratio: &'static str) -> Result<f64, EngineError> {
        self.get().ok_or(EngineError::UndefinedRatio { ratio })
    }

    pub fn at_least(self, threshold: f64) -> bool {
        self.get().is_some_and(|v| v >= threshold)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum FireTiming {
    Reached { year: u32 },
    #[serde(rename_all = "camelCase")]
    BeyondHorizon { last_year: u32 },
}

impl FireTiming {
    pub fn year_index(self) -> u32 {
        match self {
            FireTiming::Reached { year } => year,
            FireTiming::BeyondHorizon { last_year } => last_year,
        }
    }

    pub fn is_reached(self) -> bool {
        matches!(self, FireTiming::Reached { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionPoint {
    pub year: u32,
    pub age: u32,
    pub balance: f64,
    pub fire_number: f64,
    pub fire_progress: f64,
    pub can_retire: bool,
    pub monthly_income: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FireSummary {
    pub fire_number: f64,
    pub current_net_worth: f64,
    pub amount_needed: f64,
    pub savings_rate: Ratio,
    pub progress_ratio: Ratio,
    pub years_to_fire: FireTiming,
    pub years_until_target_age: u32,
    pub projections: Vec<ProjectionPoint>,
    pub monthly_income_at_retirement: f64,
}

impl FireSummary {
    pub fn balance_at(&self, year: u32) -> Option<f64> {
        self.projections.get(year as usize).map(|p| p.balance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AchievementId {
    FirstTenThousand,
    HighSaver,
    SuperSaver,
    QuarterWay,
    HalfwayHero,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: AchievementId,
    pub name: &'static str,
    pub achieved: bool,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum UnreachableReason {
    NoContributions,
    NoGrowth,
    IterationCap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum YearsToGoal {
    Reached { years: u32 },
    Unreachable { reason: UnreachableReason },
}

impl YearsToGoal {
    pub fn years(self) -> Option<u32> {
        match self {
            YearsToGoal::Reached { years } => Some(years),
            YearsToGoal::Unreachable { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ScenarioKind {
    Conservative,
    Moderate,
    Aggressive,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub kind: ScenarioKind,
    pub name: &'static str,
    pub annual_return_percent: f64,
    pub annual_savings: f64,
    pub solved_years: YearsToGoal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonteCarloPoint {
    pub year: u32,
    pub age: u32,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub expected: f64,
}
