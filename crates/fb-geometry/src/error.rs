//! Geometry-specific error types.

use fb_core::FbError;
use thiserror::Error;

/// Errors raised while configuring or solving the linkage.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A length, fraction or coordinate failed validation.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(#[from] FbError),

    /// The loop cannot close for this input angle and these lengths.
    #[error(
        "Linkage cannot close at input angle {input_angle} rad: diagonal {diagonal} \
         outside [{min_reach}, {max_reach}]"
    )]
    Infeasible {
        input_angle: f64,
        diagonal: f64,
        min_reach: f64,
        max_reach: f64,
    },
}

pub type GeometryResult<T> = Result<T, GeometryError>;
