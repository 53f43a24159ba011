//! Linkage builder.

use std::f64::consts::FRAC_PI_2;

use crate::dashpot::DashpotSegment;
use crate::error::GeometryResult;
use crate::link::LinkLengths;
use crate::linkage::{Branch, Linkage};

/// Builder for a [`Linkage`].
///
/// Collects lengths, dashpot, assembly branch and the resting input angle,
/// then `build()` validates the lengths and closes the loop once so the
/// linkage always starts from a valid pose.
#[derive(Debug, Clone)]
pub struct LinkageBuilder {
    lengths: LinkLengths,
    dashpot: DashpotSegment,
    branch: Branch,
    initial_angle: f64,
}

impl LinkageBuilder {
    pub fn new(lengths: LinkLengths) -> Self {
        Self {
            lengths,
            dashpot: DashpotSegment::default(),
            branch: Branch::default(),
            initial_angle: FRAC_PI_2,
        }
    }

    pub fn dashpot(mut self, dashpot: DashpotSegment) -> Self {
        self.dashpot = dashpot;
        self
    }

    pub fn branch(mut self, branch: Branch) -> Self {
        self.branch = branch;
        self
    }

    /// Resting input angle in radians.
    pub fn initial_angle(mut self, angle: f64) -> Self {
        self.initial_angle = angle;
        self
    }

    pub fn build(self) -> GeometryResult<Linkage> {
        // Fields are public, so re-check what the caller handed over
        let l = self.lengths;
        let lengths = LinkLengths::new(l.ground, l.input, l.coupler, l.output)?;
        Linkage::from_parts(lengths, self.dashpot, self.branch, self.initial_angle)
    }
}

impl Default for LinkageBuilder {
    fn default() -> Self {
        Self::new(LinkLengths::default())
    }
}
