//! Dashpot segment between a ground anchor and a link-mounted point.

use fb_core::{ensure_finite, ensure_in_range};
use nalgebra::Point2;

use crate::error::GeometryResult;
use crate::link::LinkId;

/// A point fixed on a link, as a fraction of the way from its start joint
/// (0.0) to its end joint (1.0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkMount {
    pub link: LinkId,
    pub fraction: f64,
}

impl LinkMount {
    pub fn new(link: LinkId, fraction: f64) -> GeometryResult<Self> {
        let fraction = ensure_in_range(fraction, 0.0, 1.0, "dashpot mount fraction")?;
        Ok(Self { link, fraction })
    }

    /// Interpolate the mount position between the link's joints.
    pub fn locate(&self, start: Point2<f64>, end: Point2<f64>) -> Point2<f64> {
        start + (end - start) * self.fraction
    }
}

/// Damper between a fixed anchor and a point riding on a link.
///
/// The length is never stored; it is measured from the current configuration
/// every time it is asked for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashpotSegment {
    pub anchor: Point2<f64>,
    pub mount: LinkMount,
}

impl DashpotSegment {
    pub fn new(anchor: [f64; 2], mount: LinkMount) -> GeometryResult<Self> {
        let x = ensure_finite(anchor[0], "dashpot anchor x")?;
        let y = ensure_finite(anchor[1], "dashpot anchor y")?;
        Ok(Self {
            anchor: Point2::new(x, y),
            mount,
        })
    }
}

impl Default for DashpotSegment {
    /// Anchored below the ground link, mounted at the output link midpoint.
    fn default() -> Self {
        Self {
            anchor: Point2::new(50.0, -40.0),
            mount: LinkMount {
                link: LinkId::Output,
                fraction: 0.5,
            },
        }
    }
}
