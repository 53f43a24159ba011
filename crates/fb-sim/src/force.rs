//! Dashpot force from consecutive length samples.

use fb_core::{ensure_finite, ensure_non_negative, ensure_positive};

use crate::error::{SimError, SimResult};

/// Backward-difference estimate of the dashpot force.
///
/// ```text
/// rate  = (L_now - L_prev) / dt
/// F     = c * rate
/// ```
///
/// No filtering is applied; the estimate follows every sample exactly.
#[derive(Clone, Debug, Default)]
pub struct ForceEstimator {
    previous_length: Option<f64>,
    last_rate: Option<f64>,
}

impl ForceEstimator {
    /// An estimator with no reference length yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// An estimator seeded with the resting dashpot length.
    pub fn seeded(length: f64) -> SimResult<Self> {
        let mut estimator = Self::new();
        estimator.seed(length)?;
        Ok(estimator)
    }

    /// Set the reference length for the next update.
    pub fn seed(&mut self, length: f64) -> SimResult<()> {
        self.previous_length = Some(ensure_non_negative(length, "dashpot length")?);
        self.last_rate = None;
        Ok(())
    }

    pub fn is_seeded(&self) -> bool {
        self.previous_length.is_some()
    }

    pub fn previous_length(&self) -> Option<f64> {
        self.previous_length
    }

    /// Length rate from the most recent update.
    pub fn last_rate(&self) -> Option<f64> {
        self.last_rate
    }

    /// Feed a new length sample and return the force.
    ///
    /// The sample becomes the reference for the next call.
    pub fn update(&mut self, current_length: f64, dt: f64, damping_coefficient: f64) -> SimResult<f64> {
        let previous = self.previous_length.ok_or(SimError::NotInitialized {
            what: "force estimator has no reference length",
        })?;
        let current = ensure_finite(current_length, "dashpot length")?;
        let dt = ensure_positive(dt, "force sample interval")?;
        let c = ensure_non_negative(damping_coefficient, "damping coefficient")?;

        let rate = (current - previous) / dt;
        self.previous_length = Some(current);
        self.last_rate = Some(rate);
        Ok(c * rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unseeded_update_is_not_initialized() {
        let mut est = ForceEstimator::new();
        assert!(matches!(
            est.update(10.0, 0.01, 5.0),
            Err(SimError::NotInitialized { .. })
        ));
        assert!(!est.is_seeded());
    }

    #[test]
    fn backward_difference_force() {
        let mut est = ForceEstimator::seeded(10.0).unwrap();
        let force = est.update(10.05, 0.01, 5.0).unwrap();
        assert!((est.last_rate().unwrap() - 5.0).abs() < 1e-9);
        assert!((force - 25.0).abs() < 1e-9);

        // Same length again: zero rate
        let force = est.update(10.05, 0.01, 5.0).unwrap();
        assert_eq!(force, 0.0);
        assert_eq!(est.last_rate(), Some(0.0));
    }

    #[test]
    fn shortening_gives_negative_force() {
        let mut est = ForceEstimator::seeded(10.0).unwrap();
        let force = est.update(9.9, 0.01, 2.0).unwrap();
        assert!((force + 20.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_dt_leaves_reference_untouched() {
        let mut est = ForceEstimator::seeded(10.0).unwrap();
        assert!(matches!(
            est.update(10.5, 0.0, 5.0),
            Err(SimError::InvalidParameter { .. })
        ));
        assert_eq!(est.previous_length(), Some(10.0));
    }

    #[test]
    fn reseeding_resets_reference() {
        let mut est = ForceEstimator::seeded(10.0).unwrap();
        est.update(11.0, 0.01, 1.0).unwrap();
        est.seed(20.0).unwrap();
        assert_eq!(est.previous_length(), Some(20.0));
        assert_eq!(est.last_rate(), None);
        assert!(est.seed(-1.0).is_err());
    }
}
