use std::f64::consts::{PI, TAU};

use crate::FbError;

/// Floating point type used throughout system
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, FbError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(FbError::NonFinite { what, value: v })
    }
}

/// Finite and strictly greater than zero.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, FbError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(FbError::NotPositive { what, value: v })
    }
}

/// Finite and zero or greater.
pub fn ensure_non_negative(v: Real, what: &'static str) -> Result<Real, FbError> {
    let v = ensure_finite(v, what)?;
    if v >= 0.0 {
        Ok(v)
    } else {
        Err(FbError::Negative { what, value: v })
    }
}

pub fn ensure_in_range(v: Real, min: Real, max: Real, what: &'static str) -> Result<Real, FbError> {
    let v = ensure_finite(v, what)?;
    if (min..=max).contains(&v) {
        Ok(v)
    } else {
        Err(FbError::OutOfRange {
            what,
            value: v,
            min,
            max,
        })
    }
}

/// Wrap an angle in radians into (-π, π].
pub fn wrap_to_pi(angle: Real) -> Real {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Pick the representative of `wrapped` closest to `previous`.
///
/// Keeps stored link angles continuous across the ±π seam.
pub fn unwrap_near(previous: Real, wrapped: Real) -> Real {
    previous + wrap_to_pi(wrapped - previous)
}

/// Normalize an angle in degrees into [0, 360).
pub fn normalize_degrees(deg: Real) -> Real {
    let d = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if d >= 360.0 { 0.0 } else { d }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_positive_rejects_zero_and_negative() {
        assert!(ensure_positive(1.0, "len").is_ok());
        assert_eq!(
            ensure_positive(0.0, "len"),
            Err(FbError::NotPositive {
                what: "len",
                value: 0.0
            })
        );
        assert!(ensure_positive(-1.0, "len").is_err());
        assert!(ensure_positive(Real::INFINITY, "len").is_err());
    }

    #[test]
    fn ensure_non_negative_allows_zero() {
        assert!(ensure_non_negative(0.0, "c").is_ok());
        assert!(ensure_non_negative(-1e-9, "c").is_err());
    }

    #[test]
    fn range_check_is_inclusive() {
        assert!(ensure_in_range(0.0, 0.0, 360.0, "deg").is_ok());
        assert!(ensure_in_range(360.0, 0.0, 360.0, "deg").is_ok());
        assert!(ensure_in_range(360.5, 0.0, 360.0, "deg").is_err());
    }

    #[test]
    fn wrap_to_pi_range() {
        assert!((wrap_to_pi(2.5 * PI) - 0.5 * PI).abs() < 1e-12);
        assert!((wrap_to_pi(-PI) - PI).abs() < 1e-12);
        assert!((wrap_to_pi(0.5) - 0.5).abs() < 1e-12);
        assert!((wrap_to_pi(TAU + 0.25) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn unwrap_crosses_seam_continuously() {
        // previous just below +π, new sample just above -π
        let prev = PI - 0.01;
        let next = unwrap_near(prev, -PI + 0.01);
        assert!((next - (PI + 0.01)).abs() < 1e-12);
    }

    #[test]
    fn normalize_degrees_range() {
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(720.0), 0.0);
        assert_eq!(normalize_degrees(45.0), 45.0);
    }
}
