//! Oscillator-driven four-bar simulation.
//!
//! Provides:
//! - Damped single-DOF oscillator with an explicit Idle/Running lifecycle
//! - Backward-difference dashpot force estimator
//! - Angle gate for manual (non-simulated) input moves
//! - Fixed-period tick clock
//! - `Simulation`, the owned context that serializes every mutation of the
//!   linkage and publishes per-tick frames to observers

pub mod clock;
pub mod error;
pub mod force;
pub mod gate;
pub mod observer;
pub mod oscillator;
pub mod sim;

// Re-exports for public API
pub use clock::TickClock;
pub use error::{SimError, SimResult};
pub use force::ForceEstimator;
pub use gate::{AngleBounds, AngleGate, GateDecision};
pub use observer::{ChannelObserver, SimEvent, SimObserver, TickFrame};
pub use oscillator::{Oscillator, OscillatorParams, OscillatorState};
pub use sim::{EquilibriumTolerance, LoopConfig, RunStatus, Simulation, TickOutcome};
