use std::sync::Arc;

use tracing::debug;

use super::engine::project;
use super::error::EngineError;
use super::types::{FireSummary, Profile};

#[derive(Debug, Default)]
pub struct ProjectionMemo {
    entry: Option<(u64, Profile, Arc<FireSummary>)>,
    hits: u64,
    misses: u64,
}

impl ProjectionMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project(&mut self, profile: &Profile) -> Result<Arc<FireSummary>, EngineError> {
        let key = profile.cache_key();
        if let Some((cached_key, cached_profile, summary)) = &self.entry {
            if *cached_key == key && cached_profile == profile {
                self.hits += 1;
                return Ok(Arc::clone(summary));
            }
        }

        let summary = Arc::new(project(profile)?);
        self.misses += 1;
        debug!(key, misses = self.misses, "projection memo refreshed");
        self.entry = Some((key, *profile, Arc::clone(&summary)));
        Ok(summary)
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::tests::sample_profile;

    #[test]
    fn identical_profile_reuses_summary() {
        let mut memo = ProjectionMemo::new();
        let a = memo.project(&sample_profile()).expect("valid profile");
        let b = memo.project(&sample_profile()).expect("valid profile");

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(memo.hits(), 1);
        assert_eq!(memo.misses(), 1);
    }

    #[test]
    fn any_field_change_recomputes() {
        let mut memo = ProjectionMemo::new();
        let base = memo.project(&sample_profile()).expect("valid profile");

        let mut changed = sample_profile();
        changed.inflation_rate = 2.5;
        let updated = memo.project(&changed).expect("valid profile");

        assert!(!Arc::ptr_eq(&base, &updated));
        assert_eq!(memo.misses(), 2);

        let again = memo.project(&sample_profile()).expect("valid profile");
        assert!(!Arc::ptr_eq(&base, &again));
        assert_eq!(memo.misses(), 3);
    }

    #[test]
    fn invalid_profile_is_not_cached() {
        let mut memo = ProjectionMemo::new();
        let mut bad = sample_profile();
        bad.current_income = f64::NAN;

        assert!(memo.project(&bad).is_err());
        assert!(memo.project(&bad).is_err());
        assert_eq!(memo.misses(), 0);
    }

    #[test]
    fn cache_key_distinguishes_fields() {
        let base = sample_profile();
        let mut other = base;
        other.monthly_savings += 100.0;
        assert_ne!(base.cache_key(), other.cache_key());
        assert_eq!(base.cache_key(), sample_profile().cache_key());
    }
}
