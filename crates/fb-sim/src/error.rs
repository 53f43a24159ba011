//! Error types for simulation operations.

use fb_core::FbError;
use fb_geometry::GeometryError;
use thiserror::Error;

/// Errors encountered while running the oscillator-driven linkage.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid parameter: {what}")]
    InvalidParameter { what: String },

    #[error("Invalid state: {what}")]
    InvalidState { what: &'static str },

    #[error("Geometry infeasible: {0}")]
    GeometryInfeasible(GeometryError),

    #[error("Not initialized: {what}")]
    NotInitialized { what: &'static str },

    #[error("Tick limit reached after {ticks} ticks without settling")]
    TickLimit { ticks: u64 },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<FbError> for SimError {
    fn from(e: FbError) -> Self {
        SimError::InvalidParameter {
            what: e.to_string(),
        }
    }
}

impl From<GeometryError> for SimError {
    fn from(e: GeometryError) -> Self {
        match e {
            GeometryError::InvalidParameter(inner) => inner.into(),
            infeasible @ GeometryError::Infeasible { .. } => {
                SimError::GeometryInfeasible(infeasible)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_errors_keep_their_kind() {
        let bad = GeometryError::InvalidParameter(FbError::NotPositive {
            what: "input link length",
            value: -1.0,
        });
        assert!(matches!(
            SimError::from(bad),
            SimError::InvalidParameter { .. }
        ));

        let infeasible = GeometryError::Infeasible {
            input_angle: 0.0,
            diagonal: 200.0,
            min_reach: 10.0,
            max_reach: 90.0,
        };
        assert!(matches!(
            SimError::from(infeasible),
            SimError::GeometryInfeasible(_)
        ));
    }
}
