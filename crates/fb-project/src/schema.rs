//! Project schema definitions.
//!
//! Angles the user types are in degrees; run angles follow the integrator and
//! are in radians. Every section has defaults so a file only needs `version`
//! and `name`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub mechanism: MechanismDef,
    #[serde(default)]
    pub run: RunDef,
    #[serde(default)]
    pub gate: GateDef,
}

impl Project {
    /// Default mechanism and run under the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: crate::validate::LATEST_VERSION,
            name: name.into(),
            mechanism: MechanismDef::default(),
            run: RunDef::default(),
            gate: GateDef::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MechanismDef {
    pub lengths: LengthsDef,
    pub branch: BranchDef,
    /// Input angle the linkage is assembled at before any run.
    pub resting_angle_deg: f64,
    pub dashpot: DashpotDef,
}

impl Default for MechanismDef {
    fn default() -> Self {
        Self {
            lengths: LengthsDef::default(),
            branch: BranchDef::Open,
            resting_angle_deg: 90.0,
            dashpot: DashpotDef::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LengthsDef {
    pub ground: f64,
    pub input: f64,
    pub coupler: f64,
    pub output: f64,
}

impl Default for LengthsDef {
    fn default() -> Self {
        Self {
            ground: 100.0,
            input: 60.0,
            coupler: 100.0,
            output: 70.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BranchDef {
    #[default]
    Open,
    Crossed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LinkDef {
    Ground,
    Input,
    Coupler,
    Output,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DashpotDef {
    /// Fixed end, in scene coordinates.
    pub anchor: [f64; 2],
    pub link: LinkDef,
    /// Position along `link`, 0 at its first joint and 1 at its second.
    pub fraction: f64,
}

impl Default for DashpotDef {
    fn default() -> Self {
        Self {
            anchor: [50.0, -40.0],
            link: LinkDef::Output,
            fraction: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunDef {
    pub mass: f64,
    pub spring_constant: f64,
    pub damping_coefficient: f64,
    pub equilibrium_angle_rad: f64,
    pub initial_angle_rad: f64,
    pub integrator_step_s: f64,
    pub tick_period_s: f64,
    /// Written as `null` when unset; a missing field means the default limit.
    pub max_ticks: Option<u64>,
    pub theta_tolerance_rad: f64,
    pub omega_tolerance_rad_s: f64,
}

impl Default for RunDef {
    fn default() -> Self {
        Self {
            mass: 10.0,
            spring_constant: 10.0,
            damping_coefficient: 5.0,
            equilibrium_angle_rad: std::f64::consts::FRAC_PI_2,
            initial_angle_rad: std::f64::consts::PI,
            integrator_step_s: 0.01,
            tick_period_s: 0.01,
            max_ticks: Some(100_000),
            theta_tolerance_rad: 0.01,
            omega_tolerance_rad_s: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GateDef {
    pub min_angle_deg: f64,
    pub max_angle_deg: f64,
}

impl Default for GateDef {
    fn default() -> Self {
        Self {
            min_angle_deg: 0.0,
            max_angle_deg: 180.0,
        }
    }
}
