use ft_util::{PlanError, PlanResult};
use serde::{Deserialize, Serialize};

/// Tuning knobs of the hierarchical factorization.
///
/// The defaults keep the factorization error at the level of a few units of machine
/// precision times the operator norm for sizes up to several thousand.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FmmConfig {
    /// Index ranges of at most this many entries are stored as dense eigenvector blocks.
    pub leaf_size: usize,
    /// Cauchy kernel blocks with a side of at most this length are stored densely.
    pub cauchy_leaf_size: usize,
    /// Largest interpolation rank accepted for a separated Cauchy kernel block; blocks
    /// needing more are subdivided.
    pub max_rank: usize,
    /// Kernel truncation tolerance as a multiple of the working precision's epsilon.
    pub tolerance_factor: f64,
}

impl Default for FmmConfig {
    fn default() -> Self {
        Self {
            leaf_size: 64,
            cauchy_leaf_size: 16,
            max_rank: 32,
            tolerance_factor: 1.0,
        }
    }
}

impl FmmConfig {
    pub fn validate(&self) -> PlanResult<()> {
        if self.leaf_size == 0 {
            return Err(PlanError::invalid_size("leaf_size", 0, "must be positive"));
        }
        if self.cauchy_leaf_size == 0 {
            return Err(PlanError::invalid_size(
                "cauchy_leaf_size",
                0,
                "must be positive",
            ));
        }
        if self.max_rank == 0 {
            return Err(PlanError::invalid_size("max_rank", 0, "must be positive"));
        }
        if !(self.tolerance_factor.is_finite() && self.tolerance_factor > 0.0) {
            return Err(PlanError::invalid_size(
                "tolerance_factor",
                self.tolerance_factor as i64,
                "must be a positive finite multiple of epsilon",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(FmmConfig::default().validate().is_ok());
        let bad = FmmConfig {
            leaf_size: 0,
            ..FmmConfig::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn round_trips_through_json() {
        let cfg = FmmConfig {
            max_rank: 12,
            ..FmmConfig::default()
        };
        let s = serde_json::to_string(&cfg).unwrap();
        assert_eq!(serde_json::from_str::<FmmConfig>(&s).unwrap(), cfg);
    }
}
