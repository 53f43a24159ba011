//! Shared application service layer for the four-bar simulator.
//!
//! Turns project files into runtime simulations and drives them headlessly.
//! Frontends call into here rather than wiring crates together themselves.

pub mod compile;
pub mod error;
pub mod gate_service;
pub mod progress;
pub mod project_service;
pub mod run_service;

pub use compile::{
    angle_bounds, build_linkage, compile_project, loop_config, oscillator_params,
};
pub use error::{AppError, AppResult};
pub use gate_service::{GateReport, GateRequest, apply_gate};
pub use progress::{RunProgressEvent, RunStage};
pub use run_service::{RunEnd, RunMode, RunOptions, RunSummary, run_project};
