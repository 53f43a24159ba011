//! Simulation context: oscillator, linkage, force estimate and angle gate.

use fb_core::{deg_to_rad, ensure_positive};
use fb_geometry::{Branch, LinkId, Linkage};
use nalgebra::Point2;

use crate::clock::TickClock;
use crate::error::{SimError, SimResult};
use crate::force::ForceEstimator;
use crate::gate::{AngleBounds, AngleGate, GateDecision};
use crate::observer::{SimEvent, SimObserver, TickFrame};
use crate::oscillator::{Oscillator, OscillatorParams, OscillatorState};

/// Thresholds for declaring the run settled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EquilibriumTolerance {
    /// Max |θ - θ_eq| (rad)
    pub theta: f64,
    /// Max |ω| (rad/s)
    pub omega: f64,
}

impl Default for EquilibriumTolerance {
    fn default() -> Self {
        Self {
            theta: 0.01,
            omega: 0.01,
        }
    }
}

impl EquilibriumTolerance {
    pub fn is_met(&self, state: &OscillatorState, equilibrium_angle: f64) -> bool {
        (state.theta - equilibrium_angle).abs() < self.theta && state.omega.abs() < self.omega
    }
}

/// Loop cadence and termination policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoopConfig {
    /// Wall-clock period between ticks (s), independent of the integrator step
    pub tick_period: f64,
    /// Halt after this many ticks without settling. `None` runs until settled.
    pub max_ticks: Option<u64>,
    pub equilibrium: EquilibriumTolerance,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick_period: 0.01,
            max_ticks: Some(100_000),
            equilibrium: EquilibriumTolerance::default(),
        }
    }
}

impl LoopConfig {
    pub fn validate(&self) -> SimResult<()> {
        ensure_positive(self.tick_period, "tick period")?;
        ensure_positive(self.equilibrium.theta, "equilibrium angle tolerance")?;
        ensure_positive(self.equilibrium.omega, "equilibrium rate tolerance")?;
        if self.max_ticks == Some(0) {
            return Err(SimError::InvalidParameter {
                what: "max ticks must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Lifecycle of the current run.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum RunStatus {
    /// No run started yet.
    #[default]
    Idle,
    Running,
    /// Reached equilibrium.
    Settled,
    /// Stopped on request.
    Stopped,
    /// Stopped by a failure; no further ticks until a new run starts.
    Halted(SimError),
}

/// Result of one call to [`Simulation::tick`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    Advanced(TickFrame),
    /// This tick met the equilibrium test; the run is over.
    Settled(TickFrame),
    /// This tick reached `max_ticks`; the run is halted.
    LimitReached(TickFrame),
    /// No run active, nothing done.
    Inactive,
}

impl TickOutcome {
    pub fn frame(&self) -> Option<&TickFrame> {
        match self {
            TickOutcome::Advanced(f) | TickOutcome::Settled(f) | TickOutcome::LimitReached(f) => {
                Some(f)
            }
            TickOutcome::Inactive => None,
        }
    }
}

/// Owned simulation context.
///
/// Every mutation of the linkage goes through `&mut self`, whether it comes
/// from a tick or from a gated manual move, so the two paths can never
/// interleave.
pub struct Simulation {
    linkage: Linkage,
    /// Input length as configured by the user, re-applied every tick.
    input_length: f64,
    oscillator: Oscillator,
    force: ForceEstimator,
    last_force: f64,
    gate: AngleGate,
    params: OscillatorParams,
    config: LoopConfig,
    clock: TickClock,
    status: RunStatus,
    ticks: u64,
    observers: Vec<Box<dyn SimObserver>>,
}

impl Simulation {
    /// Build a context around a solved linkage.
    ///
    /// The force estimator is seeded from the linkage's current (resting) pose.
    pub fn new(
        linkage: Linkage,
        params: OscillatorParams,
        bounds: AngleBounds,
        config: LoopConfig,
    ) -> SimResult<Self> {
        params.validate()?;
        config.validate()?;
        let force = ForceEstimator::seeded(linkage.dashpot_length())?;
        let clock = TickClock::new(config.tick_period, 0.0)?;
        Ok(Self {
            input_length: linkage.link_length(LinkId::Input),
            linkage,
            oscillator: Oscillator::new(),
            force,
            last_force: 0.0,
            gate: AngleGate::new(bounds),
            params,
            config,
            clock,
            status: RunStatus::Idle,
            ticks: 0,
            observers: Vec::new(),
        })
    }

    pub fn subscribe(&mut self, observer: Box<dyn SimObserver>) {
        self.observers.push(observer);
    }

    pub fn linkage(&self) -> &Linkage {
        &self.linkage
    }

    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == RunStatus::Running
    }

    /// Ticks executed in the current (or last) run.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn oscillator_state(&self) -> Option<OscillatorState> {
        self.oscillator.state()
    }

    pub fn params(&self) -> &OscillatorParams {
        &self.params
    }

    pub fn loop_config(&self) -> &LoopConfig {
        &self.config
    }

    pub fn clock(&self) -> &TickClock {
        &self.clock
    }

    pub fn bounds(&self) -> AngleBounds {
        self.gate.bounds()
    }

    pub fn set_bounds(&mut self, bounds: AngleBounds) {
        self.gate.set_bounds(bounds);
    }

    /// Most recent dashpot force, from a tick or an accepted manual move.
    pub fn last_force(&self) -> f64 {
        self.last_force
    }

    pub fn force_estimator(&self) -> &ForceEstimator {
        &self.force
    }

    /// Replace the run parameters used by the next [`Simulation::start_run`].
    ///
    /// Parameters are fixed while a run is active.
    pub fn set_params(&mut self, params: OscillatorParams) -> SimResult<()> {
        if self.is_running() {
            return Err(SimError::InvalidState {
                what: "run parameters cannot change during a run",
            });
        }
        params.validate()?;
        self.params = params;
        Ok(())
    }

    /// Start a fresh run from the configured parameters.
    ///
    /// The linkage is moved to the initial angle and the force estimator is
    /// reseeded there, so the first tick measures one step of motion. A run
    /// already in progress is replaced.
    pub fn start_run(&mut self) -> SimResult<()> {
        let params = self.params;
        params.validate()?;
        let config = self.linkage.solve(params.initial_angle)?;

        if self.is_running() {
            tracing::info!(ticks = self.ticks, "replacing active run");
        }
        self.oscillator.start(params)?;
        self.linkage.commit(config);
        self.force.seed(self.linkage.dashpot_length())?;
        self.last_force = 0.0;
        self.ticks = 0;
        self.clock.reset(0.0);
        self.status = RunStatus::Running;

        if params.damping_coefficient == 0.0 {
            tracing::warn!("damping is zero; the run will not settle on its own");
        }
        tracing::info!(
            mass = params.mass,
            k = params.spring_constant,
            c = params.damping_coefficient,
            "simulation run started"
        );
        self.publish(SimEvent::RunStarted { params });
        Ok(())
    }

    /// Set parameters and start a run.
    pub fn start_run_with(&mut self, params: OscillatorParams) -> SimResult<()> {
        self.stop();
        self.set_params(params)?;
        self.start_run()
    }

    /// Stop the active run. Returns whether anything was stopped.
    pub fn stop(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.oscillator.stop();
        self.status = RunStatus::Stopped;
        tracing::info!(ticks = self.ticks, "simulation stopped");
        self.publish(SimEvent::Stopped { ticks: self.ticks });
        true
    }

    /// Run one tick.
    ///
    /// Does nothing outside a run. A geometry failure halts the run and is
    /// returned; the last valid pose is kept.
    pub fn tick(&mut self) -> SimResult<TickOutcome> {
        if !self.is_running() {
            return Ok(TickOutcome::Inactive);
        }
        match self.advance() {
            Ok(outcome) => Ok(outcome),
            Err(error) => {
                self.halt(error.clone());
                Err(error)
            }
        }
    }

    /// Run every tick due at `now` (seconds since the run started).
    ///
    /// Returns how many ticks ran. Stops early once the run ends.
    pub fn advance_to(&mut self, now: f64) -> SimResult<usize> {
        let mut fired = 0;
        while self.is_running() && self.clock.should_tick(now) {
            self.clock.advance();
            self.tick()?;
            fired += 1;
        }
        Ok(fired)
    }

    fn advance(&mut self) -> SimResult<TickOutcome> {
        let params = self.params;

        let theta = self.oscillator.step()?;
        self.ticks += 1;

        // Intentional re-application: picks up input length edits made mid-run
        self.linkage.set_link_length(LinkId::Input, self.input_length)?;

        let config = self.linkage.solve(theta)?;
        self.linkage.commit(config);

        let dashpot_length = self.linkage.dashpot_length();
        let force = self
            .force
            .update(dashpot_length, params.dt, params.damping_coefficient)?;
        self.last_force = force;

        let state = self.oscillator.state().ok_or(SimError::InvalidState {
            what: "oscillator stopped during tick",
        })?;
        let frame = TickFrame {
            tick: self.ticks,
            time: self.ticks as f64 * params.dt,
            theta,
            omega: state.omega,
            config,
            dashpot_length,
            force,
        };
        self.publish(SimEvent::Tick(frame));

        if self.config.equilibrium.is_met(&state, params.equilibrium_angle) {
            self.oscillator.stop();
            self.status = RunStatus::Settled;
            tracing::info!(ticks = self.ticks, theta, "simulation reached equilibrium");
            self.publish(SimEvent::Settled {
                ticks: self.ticks,
                theta,
                omega: state.omega,
            });
            return Ok(TickOutcome::Settled(frame));
        }

        if let Some(limit) = self.config.max_ticks {
            if self.ticks >= limit {
                self.halt(SimError::TickLimit { ticks: self.ticks });
                return Ok(TickOutcome::LimitReached(frame));
            }
        }

        Ok(TickOutcome::Advanced(frame))
    }

    fn halt(&mut self, error: SimError) {
        self.oscillator.stop();
        tracing::warn!(ticks = self.ticks, %error, "simulation halted");
        self.status = RunStatus::Halted(error.clone());
        self.publish(SimEvent::Halted {
            ticks: self.ticks,
            error,
        });
    }

    /// Angle (deg, [0, 360)) that a scene position would give the input link.
    pub fn propose(&self, scene_position: Point2<f64>) -> f64 {
        let pivot = self.linkage.link(LinkId::Input).start;
        self.gate.propose(pivot, scene_position)
    }

    /// Commit a manual input angle if the gate admits it.
    ///
    /// Returns `Ok(false)` and reports the rejection to observers when the angle
    /// is out of bounds; nothing is changed in that case.
    pub fn accept(&mut self, angle_deg: f64) -> SimResult<bool> {
        match self.gate.check(angle_deg) {
            GateDecision::Rejected { angle_deg, bounds } => {
                tracing::info!(
                    angle_deg,
                    min = bounds.min_deg(),
                    max = bounds.max_deg(),
                    "input angle out of bounds"
                );
                self.publish(SimEvent::AngleRejected { angle_deg, bounds });
                Ok(false)
            }
            GateDecision::Accepted { angle_deg } => {
                let config = self.linkage.solve(deg_to_rad(angle_deg))?;
                self.linkage.commit(config);
                let dashpot_length = self.linkage.dashpot_length();
                let force = self.force.update(
                    dashpot_length,
                    self.params.dt,
                    self.params.damping_coefficient,
                )?;
                self.last_force = force;
                self.publish(SimEvent::AngleAccepted {
                    angle_deg,
                    config,
                    dashpot_length,
                    force,
                });
                Ok(true)
            }
        }
    }

    /// Convenience for [`Simulation::propose`] followed by [`Simulation::accept`].
    pub fn drag_to(&mut self, scene_position: Point2<f64>) -> SimResult<bool> {
        let angle_deg = self.propose(scene_position);
        self.accept(angle_deg)
    }

    /// Change a link length and re-close the loop at the current input angle.
    ///
    /// If the new length cannot close, the old one is restored and the error
    /// returned. The force estimator is reseeded: a length edit is not motion.
    pub fn set_link_length(&mut self, link: LinkId, length: f64) -> SimResult<()> {
        let previous = self.linkage.link_length(link);
        self.linkage.set_link_length(link, length)?;
        match self.linkage.solve(self.linkage.input_angle()) {
            Ok(config) => {
                self.linkage.commit(config);
                if link == LinkId::Input {
                    self.input_length = length;
                }
                self.force.seed(self.linkage.dashpot_length())?;
                Ok(())
            }
            Err(error) => {
                self.linkage.set_link_length(link, previous)?;
                Err(error.into())
            }
        }
    }

    /// Switch assembly mode. This is the only way the branch ever flips.
    pub fn set_branch(&mut self, branch: Branch) -> SimResult<()> {
        let previous = self.linkage.branch();
        self.linkage.set_branch(branch);
        match self.linkage.solve(self.linkage.input_angle()) {
            Ok(config) => {
                self.linkage.commit(config);
                self.force.seed(self.linkage.dashpot_length())?;
                Ok(())
            }
            Err(error) => {
                self.linkage.set_branch(previous);
                Err(error.into())
            }
        }
    }

    fn publish(&mut self, event: SimEvent) {
        for observer in &mut self.observers {
            observer.notify(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fb_geometry::{LinkLengths, LinkageBuilder};
    use std::cell::RefCell;
    use std::f64::consts::FRAC_PI_2;
    use std::rc::Rc;

    fn sim() -> Simulation {
        let linkage = LinkageBuilder::default().build().unwrap();
        Simulation::new(
            linkage,
            OscillatorParams::default(),
            AngleBounds::default(),
            LoopConfig::default(),
        )
        .unwrap()
    }

    fn recorded(sim: &mut Simulation) -> Rc<RefCell<Vec<SimEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        sim.subscribe(Box::new(move |e: &SimEvent| sink.borrow_mut().push(e.clone())));
        events
    }

    #[test]
    fn tick_without_run_is_inactive() {
        let mut sim = sim();
        assert_eq!(sim.tick().unwrap(), TickOutcome::Inactive);
        assert_eq!(sim.ticks(), 0);
        assert_eq!(*sim.status(), RunStatus::Idle);
    }

    #[test]
    fn start_moves_linkage_to_initial_angle() {
        let mut sim = sim();
        sim.start_run().unwrap();
        assert!(sim.is_running());
        assert!((sim.linkage().input_angle() - std::f64::consts::PI).abs() < 1e-12);
        assert_eq!(
            sim.force_estimator().previous_length(),
            Some(sim.linkage().dashpot_length())
        );
    }

    #[test]
    fn tick_publishes_frame_and_updates_force() {
        let mut sim = sim();
        let events = recorded(&mut sim);
        sim.start_run().unwrap();
        let before = sim.linkage().dashpot_length();

        let outcome = sim.tick().unwrap();
        let frame = *outcome.frame().unwrap();
        assert_eq!(frame.tick, 1);
        assert!((frame.time - 0.01).abs() < 1e-12);
        assert_eq!(frame.config, *sim.linkage().configuration());
        let expected = 5.0 * (frame.dashpot_length - before) / 0.01;
        assert!((frame.force - expected).abs() < 1e-9);
        assert_eq!(sim.last_force(), frame.force);

        let events = events.borrow();
        assert!(matches!(events[0], SimEvent::RunStarted { .. }));
        assert_eq!(events[1], SimEvent::Tick(frame));
    }

    #[test]
    fn run_settles_and_freezes_tick_count() {
        let mut sim = sim();
        sim.start_run().unwrap();
        let mut settled = false;
        for _ in 0..10_000 {
            if let TickOutcome::Settled(frame) = sim.tick().unwrap() {
                assert!((frame.theta - FRAC_PI_2).abs() < 0.01);
                assert!(frame.omega.abs() < 0.01);
                settled = true;
                break;
            }
        }
        assert!(settled);
        assert_eq!(*sim.status(), RunStatus::Settled);

        let frozen = sim.ticks();
        for _ in 0..10 {
            assert_eq!(sim.tick().unwrap(), TickOutcome::Inactive);
        }
        assert_eq!(sim.ticks(), frozen);
        assert!(sim.oscillator_state().is_none());
    }

    #[test]
    fn stop_is_immediate_and_idempotent() {
        let mut sim = sim();
        let events = recorded(&mut sim);
        sim.start_run().unwrap();
        sim.tick().unwrap();
        assert!(sim.stop());
        assert!(!sim.stop());
        assert_eq!(*sim.status(), RunStatus::Stopped);
        assert_eq!(sim.tick().unwrap(), TickOutcome::Inactive);
        assert_eq!(sim.ticks(), 1);

        let stops = events
            .borrow()
            .iter()
            .filter(|e| matches!(e, SimEvent::Stopped { .. }))
            .count();
        assert_eq!(stops, 1);
    }

    #[test]
    fn tick_limit_halts_run() {
        let linkage = LinkageBuilder::default().build().unwrap();
        let params = OscillatorParams {
            damping_coefficient: 0.0,
            ..OscillatorParams::default()
        };
        let config = LoopConfig {
            max_ticks: Some(50),
            ..LoopConfig::default()
        };
        let mut sim =
            Simulation::new(linkage, params, AngleBounds::default(), config).unwrap();
        sim.start_run().unwrap();

        let mut last = TickOutcome::Inactive;
        while sim.is_running() {
            last = sim.tick().unwrap();
        }
        assert!(matches!(last, TickOutcome::LimitReached(_)));
        assert_eq!(sim.ticks(), 50);
        assert_eq!(
            *sim.status(),
            RunStatus::Halted(SimError::TickLimit { ticks: 50 })
        );
    }

    #[test]
    fn infeasible_geometry_halts_and_keeps_pose() {
        // Closes near 0 rad but not past roughly +-1.1 rad
        let lengths = LinkLengths::new(100.0, 60.0, 50.0, 40.0).unwrap();
        let linkage = LinkageBuilder::new(lengths)
            .initial_angle(0.0)
            .build()
            .unwrap();
        let params = OscillatorParams {
            initial_angle: 0.5,
            equilibrium_angle: 3.0,
            spring_constant: 100.0,
            ..OscillatorParams::default()
        };
        let mut sim =
            Simulation::new(linkage, params, AngleBounds::default(), LoopConfig::default())
                .unwrap();
        let events = recorded(&mut sim);
        sim.start_run().unwrap();

        let err = loop {
            match sim.tick() {
                Ok(_) => continue,
                Err(err) => break err,
            }
        };
        assert!(matches!(err, SimError::GeometryInfeasible(_)));
        assert!(matches!(*sim.status(), RunStatus::Halted(_)));
        assert!(!sim.is_running());
        let pose = *sim.linkage().configuration();
        assert!(pose.closure_residual(sim.linkage().lengths()) < 1e-9);
        assert_eq!(sim.tick().unwrap(), TickOutcome::Inactive);
        assert!(events
            .borrow()
            .iter()
            .any(|e| matches!(e, SimEvent::Halted { .. })));
    }

    #[test]
    fn gate_accepts_inside_and_rejects_outside() {
        let mut sim = sim();
        let events = recorded(&mut sim);

        assert!(sim.accept(90.0).unwrap());
        assert!((sim.linkage().input_angle() - FRAC_PI_2).abs() < 1e-12);

        let before = *sim.linkage().configuration();
        let force_before = sim.last_force();
        assert!(!sim.accept(270.0).unwrap());
        assert_eq!(*sim.linkage().configuration(), before);
        assert_eq!(sim.last_force(), force_before);

        let events = events.borrow();
        assert!(matches!(events[0], SimEvent::AngleAccepted { .. }));
        assert_eq!(
            events[1],
            SimEvent::AngleRejected {
                angle_deg: 270.0,
                bounds: AngleBounds::default()
            }
        );
    }

    #[test]
    fn accepted_move_updates_force() {
        let mut sim = sim();
        let before = sim.linkage().dashpot_length();
        assert!(sim.accept(100.0).unwrap());
        let after = sim.linkage().dashpot_length();
        let expected = 5.0 * (after - before) / 0.01;
        assert!((sim.last_force() - expected).abs() < 1e-9);
    }

    #[test]
    fn drag_uses_angle_about_input_pivot() {
        let mut sim = sim();
        assert!(sim.drag_to(Point2::new(0.0, 30.0)).unwrap());
        assert!((sim.linkage().input_angle() - FRAC_PI_2).abs() < 1e-9);
        assert!(!sim.drag_to(Point2::new(0.0, -30.0)).unwrap());
    }

    #[test]
    fn negative_length_rejected_prior_kept() {
        let mut sim = sim();
        let err = sim.set_link_length(LinkId::Input, -1.0).unwrap_err();
        assert!(matches!(err, SimError::InvalidParameter { .. }));
        assert_eq!(sim.linkage().link_length(LinkId::Input), 60.0);
    }

    #[test]
    fn infeasible_length_restored() {
        let mut sim = sim();
        let before = *sim.linkage().configuration();
        // Coupler too short to reach the output link at 90 degrees
        let err = sim.set_link_length(LinkId::Coupler, 5.0).unwrap_err();
        assert!(matches!(err, SimError::GeometryInfeasible(_)));
        assert_eq!(sim.linkage().link_length(LinkId::Coupler), 100.0);
        assert_eq!(*sim.linkage().configuration(), before);
    }

    #[test]
    fn input_length_edit_applies_on_next_tick() {
        let mut sim = sim();
        sim.start_run().unwrap();
        sim.set_link_length(LinkId::Input, 50.0).unwrap();
        let frame = *sim.tick().unwrap().frame().unwrap();
        let tip = frame.config.input_tip - frame.config.input_pivot;
        assert!((tip.norm() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn params_locked_during_run() {
        let mut sim = sim();
        sim.start_run().unwrap();
        let params = OscillatorParams {
            mass: 2.0,
            ..OscillatorParams::default()
        };
        assert!(matches!(
            sim.set_params(params),
            Err(SimError::InvalidState { .. })
        ));
        sim.start_run_with(params).unwrap();
        assert_eq!(sim.params().mass, 2.0);
        assert!(sim.is_running());
    }

    #[test]
    fn branch_switch_is_explicit() {
        let mut sim = sim();
        sim.set_branch(Branch::Crossed).unwrap();
        assert_eq!(sim.linkage().configuration().branch, Branch::Crossed);
        assert!(sim.linkage().configuration().branch_side() < 0.0);
    }

    #[test]
    fn advance_to_runs_due_ticks_only() {
        let mut sim = sim();
        sim.start_run().unwrap();
        assert_eq!(sim.advance_to(0.005).unwrap(), 0);
        assert_eq!(sim.advance_to(0.0105).unwrap(), 1);
        assert_eq!(sim.advance_to(0.0505).unwrap(), 4);
        assert_eq!(sim.ticks(), 5);
    }
}
