//! Property tests for the damped oscillator.

use fb_sim::{Oscillator, OscillatorParams};
use proptest::prelude::*;
use std::f64::consts::{FRAC_PI_2, PI};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn amplitude_peaks_never_grow(
        mass in 1.0_f64..50.0,
        spring_constant in 1.0_f64..50.0,
        damping_coefficient in 0.5_f64..50.0,
    ) {
        let params = OscillatorParams {
            mass,
            spring_constant,
            damping_coefficient,
            equilibrium_angle: FRAC_PI_2,
            initial_angle: PI,
            dt: 0.01,
        };
        let mut osc = Oscillator::new();
        osc.start(params).unwrap();

        let initial = (PI - FRAC_PI_2).abs();
        let mut samples = vec![initial];
        for _ in 0..5000 {
            let theta = osc.step().unwrap();
            samples.push((theta - FRAC_PI_2).abs());
        }

        let mut last_peak = initial;
        for w in samples.windows(3) {
            if w[1] > w[0] && w[1] >= w[2] {
                prop_assert!(w[1] <= last_peak + 1e-12, "peak {} after {}", w[1], last_peak);
                last_peak = w[1];
            }
        }
        prop_assert!(*samples.last().unwrap() < initial);
    }

    #[test]
    fn undamped_energy_stays_bounded(
        mass in 1.0_f64..50.0,
        spring_constant in 1.0_f64..20.0,
    ) {
        let params = OscillatorParams {
            mass,
            spring_constant,
            damping_coefficient: 0.0,
            equilibrium_angle: 0.0,
            initial_angle: 1.0,
            dt: 0.01,
        };
        let mut osc = Oscillator::new();
        osc.start(params).unwrap();
        let e0 = params.energy(&osc.state().unwrap());
        for _ in 0..2000 {
            osc.step().unwrap();
            let e = params.energy(&osc.state().unwrap());
            // Semi-implicit stepping keeps energy within a few percent
            prop_assert!((e - e0).abs() <= 0.05 * e0);
        }
    }
}
