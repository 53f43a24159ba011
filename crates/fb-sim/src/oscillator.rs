//! Damped oscillator driving the input link angle.

use std::f64::consts::{FRAC_PI_2, PI};

use fb_core::{ensure_finite, ensure_non_negative, ensure_positive};

use crate::error::{SimError, SimResult};

/// State of the driven angle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OscillatorState {
    /// Angle (rad)
    pub theta: f64,
    /// Angular velocity (rad/s)
    pub omega: f64,
}

/// Parameters for one run. Fixed for the lifetime of the run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OscillatorParams {
    /// Inertia of the driven angle, must be positive
    pub mass: f64,
    /// Restoring stiffness toward the equilibrium angle
    pub spring_constant: f64,
    /// Viscous damping, shared with the dashpot force estimate
    pub damping_coefficient: f64,
    /// Equilibrium angle (rad)
    pub equilibrium_angle: f64,
    /// Angle at run start (rad)
    pub initial_angle: f64,
    /// Fixed integration step (s)
    pub dt: f64,
}

impl Default for OscillatorParams {
    fn default() -> Self {
        Self {
            mass: 10.0,
            spring_constant: 10.0,
            damping_coefficient: 5.0,
            equilibrium_angle: FRAC_PI_2,
            initial_angle: PI,
            dt: 0.01,
        }
    }
}

impl OscillatorParams {
    pub fn validate(&self) -> SimResult<()> {
        ensure_positive(self.mass, "mass")?;
        ensure_non_negative(self.spring_constant, "spring constant")?;
        ensure_non_negative(self.damping_coefficient, "damping coefficient")?;
        ensure_finite(self.equilibrium_angle, "equilibrium angle")?;
        ensure_finite(self.initial_angle, "initial angle")?;
        ensure_positive(self.dt, "integrator step")?;
        Ok(())
    }

    /// Net torque on the driven angle:
    ///
    /// ```text
    /// τ = -k (θ - θ_eq) - c ω
    /// ```
    pub fn torque(&self, state: &OscillatorState) -> f64 {
        -self.spring_constant * (state.theta - self.equilibrium_angle)
            - self.damping_coefficient * state.omega
    }

    /// Mechanical energy relative to equilibrium.
    pub fn energy(&self, state: &OscillatorState) -> f64 {
        let x = state.theta - self.equilibrium_angle;
        0.5 * self.mass * state.omega * state.omega + 0.5 * self.spring_constant * x * x
    }
}

#[derive(Clone, Debug)]
enum Phase {
    Idle,
    Running {
        params: OscillatorParams,
        state: OscillatorState,
    },
}

/// Single-DOF mass-spring-damper advanced by fixed steps.
///
/// Each step integrates explicitly, velocity first:
///
/// ```text
/// α  = τ / m
/// ω += α dt
/// θ += ω dt
/// ```
#[derive(Clone, Debug)]
pub struct Oscillator {
    phase: Phase,
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::new()
    }
}

impl Oscillator {
    pub fn new() -> Self {
        Self { phase: Phase::Idle }
    }

    /// Begin a run from `params.initial_angle` at rest.
    ///
    /// Replaces any run in progress. On invalid parameters the previous phase
    /// is kept.
    pub fn start(&mut self, params: OscillatorParams) -> SimResult<()> {
        params.validate()?;
        self.phase = Phase::Running {
            params,
            state: OscillatorState {
                theta: params.initial_angle,
                omega: 0.0,
            },
        };
        Ok(())
    }

    /// Advance one step and return the new angle.
    pub fn step(&mut self) -> SimResult<f64> {
        match &mut self.phase {
            Phase::Idle => Err(SimError::InvalidState {
                what: "oscillator step requires a running oscillator",
            }),
            Phase::Running { params, state } => {
                let alpha = params.torque(state) / params.mass;
                state.omega += alpha * params.dt;
                state.theta += state.omega * params.dt;
                Ok(state.theta)
            }
        }
    }

    /// Return to Idle. Returns whether a run was active.
    pub fn stop(&mut self) -> bool {
        let was_running = self.is_running();
        self.phase = Phase::Idle;
        was_running
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running { .. })
    }

    pub fn state(&self) -> Option<OscillatorState> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Running { state, .. } => Some(*state),
        }
    }

    pub fn params(&self) -> Option<&OscillatorParams> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Running { params, .. } => Some(params),
        }
    }
}
