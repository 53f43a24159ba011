//! Admissible range for manually driven input angles.

use fb_core::{ensure_in_range, normalize_degrees, rad_to_deg};
use nalgebra::Point2;

use crate::error::{SimError, SimResult};

/// Inclusive input-angle window in degrees, within [0, 360].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngleBounds {
    min_deg: f64,
    max_deg: f64,
}

impl AngleBounds {
    pub fn new(min_deg: f64, max_deg: f64) -> SimResult<Self> {
        let min_deg = ensure_in_range(min_deg, 0.0, 360.0, "minimum angle (deg)")?;
        let max_deg = ensure_in_range(max_deg, 0.0, 360.0, "maximum angle (deg)")?;
        if min_deg > max_deg {
            return Err(SimError::InvalidParameter {
                what: format!("minimum angle {min_deg} exceeds maximum angle {max_deg}"),
            });
        }
        Ok(Self { min_deg, max_deg })
    }

    pub fn min_deg(&self) -> f64 {
        self.min_deg
    }

    pub fn max_deg(&self) -> f64 {
        self.max_deg
    }

    pub fn contains(&self, angle_deg: f64) -> bool {
        (self.min_deg..=self.max_deg).contains(&angle_deg)
    }
}

impl Default for AngleBounds {
    fn default() -> Self {
        Self {
            min_deg: 0.0,
            max_deg: 180.0,
        }
    }
}

/// Outcome of checking a proposed angle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GateDecision {
    Accepted { angle_deg: f64 },
    Rejected { angle_deg: f64, bounds: AngleBounds },
}

impl GateDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, GateDecision::Accepted { .. })
    }
}

/// Screens angle changes that do not come from the oscillator.
#[derive(Clone, Debug, Default)]
pub struct AngleGate {
    bounds: AngleBounds,
}

impl AngleGate {
    pub fn new(bounds: AngleBounds) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> AngleBounds {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: AngleBounds) {
        self.bounds = bounds;
    }

    /// Angle of `scene_position` about the input pivot, in [0, 360).
    pub fn propose(&self, input_pivot: Point2<f64>, scene_position: Point2<f64>) -> f64 {
        let v = scene_position - input_pivot;
        normalize_degrees(rad_to_deg(v.y.atan2(v.x)))
    }

    pub fn check(&self, angle_deg: f64) -> GateDecision {
        if self.bounds.contains(angle_deg) {
            GateDecision::Accepted { angle_deg }
        } else {
            GateDecision::Rejected {
                angle_deg,
                bounds: self.bounds,
            }
        }
    }
}
