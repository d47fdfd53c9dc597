use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// How pairwise class distances are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistanceStrategy {
    /// Closed-form Gaussian W2. Mixtures fall back to sampling.
    ClosedForm,
    /// Exact discrete OT between sampled point clouds.
    #[default]
    Sampling,
}

impl FromStr for DistanceStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "closed-form" => Ok(Self::ClosedForm),
            "sampling" => Ok(Self::Sampling),
            other => Err(ConfigError::UnsupportedMode {
                kind: "distance strategy".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for DistanceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ClosedForm => "closed-form",
            Self::Sampling => "sampling",
        })
    }
}

/// Ground cost between two sampled points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroundCost {
    #[default]
    SquaredEuclidean,
    Euclidean,
}

impl GroundCost {
    pub fn cost(&self, a: &[f64], b: &[f64]) -> f64 {
        let sq: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
        match self {
            Self::SquaredEuclidean => sq,
            Self::Euclidean => sq.sqrt(),
        }
    }
}

/// Distance-matrix computation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub strategy: DistanceStrategy,
    pub ground_cost: GroundCost,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ground_costs() {
        let a = [0.0, 0.0];
        let b = [3.0, 4.0];
        assert_eq!(GroundCost::SquaredEuclidean.cost(&a, &b), 25.0);
        assert_eq!(GroundCost::Euclidean.cost(&a, &b), 5.0);
    }

    #[test]
    fn strategy_parse() {
        assert_eq!("closed-form".parse::<DistanceStrategy>().unwrap(), DistanceStrategy::ClosedForm);
        assert!("sinkhorn".parse::<DistanceStrategy>().is_err());
    }
}
