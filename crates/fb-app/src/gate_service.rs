//! One-shot manual moves through the angle gate.

use fb_core::rad_to_deg;
use fb_project::Project;
use nalgebra::Point2;
use serde::Serialize;

use crate::compile;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy)]
pub enum GateRequest {
    /// Input angle in degrees.
    Angle(f64),
    /// Scene position to drag the input link toward.
    Point([f64; 2]),
}

/// Outcome of a gated move on the resting linkage.
#[derive(Debug, Clone, Serialize)]
pub struct GateReport {
    pub angle_deg: f64,
    pub accepted: bool,
    pub min_angle_deg: f64,
    pub max_angle_deg: f64,
    /// Pose after the move (unchanged if rejected), degrees
    pub input_angle_deg: f64,
    pub coupler_angle_deg: f64,
    pub output_angle_deg: f64,
    pub dashpot_length: f64,
    /// Force implied by moving from rest to the new pose in one integrator step
    pub force: f64,
}

pub fn apply_gate(project: &Project, request: GateRequest) -> AppResult<GateReport> {
    let mut sim = compile::compile_project(project)?;
    let angle_deg = match request {
        GateRequest::Angle(deg) if deg.is_finite() => deg,
        GateRequest::Angle(deg) => {
            return Err(AppError::InvalidInput(format!("angle {deg} is not finite")));
        }
        GateRequest::Point([x, y]) => sim.propose(Point2::new(x, y)),
    };

    let accepted = sim.accept(angle_deg)?;
    let bounds = sim.bounds();
    let config = *sim.linkage().configuration();
    Ok(GateReport {
        angle_deg,
        accepted,
        min_angle_deg: bounds.min_deg(),
        max_angle_deg: bounds.max_deg(),
        input_angle_deg: rad_to_deg(config.input_angle),
        coupler_angle_deg: rad_to_deg(config.coupler_angle),
        output_angle_deg: rad_to_deg(config.output_angle),
        dashpot_length: sim.linkage().dashpot_length(),
        force: sim.last_force(),
    })
}
