use super::types::{Achievement, AchievementId, FireSummary};

const FIRST_MILESTONE_SAVINGS: f64 = 10_000.0;

pub fn evaluate(summary: &FireSummary) -> [Achievement; 5] {
    [
        Achievement {
            id: AchievementId::FirstTenThousand,
            name: "First $10K",
            achieved: summary.current_net_worth >= FIRST_MILESTONE_SAVINGS,
            description: "Saved your first $10,000",
        },
        Achievement {
            id: AchievementId::HighSaver,
            name: "High Saver",
            achieved: summary.savings_rate.at_least(0.2),
            description: "Saving 20%+ of income",
        },
        Achievement {
            id: AchievementId::SuperSaver,
            name: "Super Saver",
            achieved: summary.savings_rate.at_least(0.5),
            description: "Saving 50%+ of income",
        },
        Achievement {
            id: AchievementId::QuarterWay,
            name: "Quarter Way",
            achieved: summary.progress_ratio.at_least(0.25),
            description: "25% to FIRE goal",
        },
        Achievement {
            id: AchievementId::HalfwayHero,
            name: "Halfway Hero",
            achieved: summary.progress_ratio.at_least(0.5),
            description: "50% to FIRE goal",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::project;
    use crate::core::engine::tests::sample_profile;
    use crate::core::types::Ratio;
    use proptest::prelude::{prop_assert_eq, proptest};

    fn achieved_ids(summary: &FireSummary) -> Vec<AchievementId> {
        evaluate(summary)
            .iter()
            .filter(|a| a.achieved)
            .map(|a| a.id)
            .collect()
    }

    #[test]
    fn sample_profile_is_high_saver_but_not_super_saver() {
        let summary = project(&sample_profile()).expect("valid profile");
        assert_eq!(
            achieved_ids(&summary),
            vec![AchievementId::FirstTenThousand, AchievementId::HighSaver]
        );
    }

    #[test]
    fn catalog_order_is_stable() {
        let summary = project(&sample_profile()).expect("valid profile");
        let ids: Vec<_> = evaluate(&summary).iter().map(|a| a.id).collect();
        assert_eq!(
            ids,
            vec![
                AchievementId::FirstTenThousand,
                AchievementId::HighSaver,
                AchievementId::SuperSaver,
                AchievementId::QuarterWay,
                AchievementId::HalfwayHero,
            ]
        );
    }

    #[test]
    fn progress_milestones_use_current_savings_over_fire_number() {
        let mut profile = sample_profile();
        profile.current_savings = 600_000.0;
        let summary = project(&profile).expect("valid profile");

        let ids = achieved_ids(&summary);
        assert!(ids.contains(&AchievementId::QuarterWay));
        assert!(ids.contains(&AchievementId::HalfwayHero));

        profile.current_savings = 300_000.0;
        let summary = project(&profile).expect("valid profile");
        let ids = achieved_ids(&summary);
        assert!(ids.contains(&AchievementId::QuarterWay));
        assert!(!ids.contains(&AchievementId::HalfwayHero));
    }

    #[test]
    fn undefined_ratios_are_not_achieved() {
        let mut summary = project(&sample_profile()).expect("valid profile");
        summary.savings_rate = Ratio::Undefined;
        summary.progress_ratio = Ratio::Undefined;

        assert_eq!(achieved_ids(&summary), vec![AchievementId::FirstTenThousand]);
    }

    proptest! {
        #[test]
        fn prop_catalog_always_has_five_entries(
            savings in 0u32..2_000_000,
            income in 0u32..200_000,
            expenses in 0u32..10_000,
            monthly_savings in 0u32..8_000
        ) {
            let mut profile = sample_profile();
            profile.current_savings = savings as f64;
            profile.current_income = income as f64;
            profile.monthly_expenses = expenses as f64;
            profile.monthly_savings = monthly_savings as f64;

            let summary = project(&profile).expect("valid profile");
            prop_assert_eq!(evaluate(&summary).len(), 5);
        }
    }
}
