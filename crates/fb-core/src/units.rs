// fb-core/src/units.rs

use uom::si::f64::Angle as UomAngle;

// Public canonical unit types (SI, f64)
pub type Angle = UomAngle;

#[inline]
pub fn rad(v: f64) -> Angle {
    use uom::si::angle::radian;
    Angle::new::<radian>(v)
}

#[inline]
pub fn deg(v: f64) -> Angle {
    use uom::si::angle::degree;
    Angle::new::<degree>(v)
}

#[inline]
pub fn to_rad(a: Angle) -> f64 {
    use uom::si::angle::radian;
    a.get::<radian>()
}

#[inline]
pub fn to_deg(a: Angle) -> f64 {
    use uom::si::angle::degree;
    a.get::<degree>()
}

#[inline]
pub fn deg_to_rad(v: f64) -> f64 {
    to_rad(deg(v))
}

#[inline]
pub fn rad_to_deg(v: f64) -> f64 {
    to_deg(rad(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn degree_radian_conversions() {
        assert!((deg_to_rad(180.0) - PI).abs() < 1e-12);
        assert!((rad_to_deg(FRAC_PI_2) - 90.0).abs() < 1e-9);
        assert!((to_deg(rad(PI)) - 180.0).abs() < 1e-9);
    }
}
