//! Project validation logic.

use crate::schema::{DashpotDef, GateDef, LengthsDef, MechanismDef, Project, RunDef};

pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version == 0 || project.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    validate_mechanism(&project.mechanism)?;
    validate_run(&project.run)?;
    validate_gate(&project.gate)?;
    Ok(())
}

fn validate_mechanism(mechanism: &MechanismDef) -> Result<(), ValidationError> {
    validate_lengths(&mechanism.lengths)?;
    validate_finite("mechanism.resting_angle_deg", mechanism.resting_angle_deg)?;
    validate_dashpot(&mechanism.dashpot)
}

fn validate_lengths(lengths: &LengthsDef) -> Result<(), ValidationError> {
    validate_positive_finite("mechanism.lengths.ground", lengths.ground)?;
    validate_positive_finite("mechanism.lengths.input", lengths.input)?;
    validate_positive_finite("mechanism.lengths.coupler", lengths.coupler)?;
    validate_positive_finite("mechanism.lengths.output", lengths.output)
}

fn validate_dashpot(dashpot: &DashpotDef) -> Result<(), ValidationError> {
    validate_finite("mechanism.dashpot.anchor[0]", dashpot.anchor[0])?;
    validate_finite("mechanism.dashpot.anchor[1]", dashpot.anchor[1])?;
    if !(0.0..=1.0).contains(&dashpot.fraction) {
        return Err(ValidationError::InvalidValue {
            field: "mechanism.dashpot.fraction".to_string(),
            value: dashpot.fraction.to_string(),
            reason: "must be within [0, 1]".to_string(),
        });
    }
    Ok(())
}

fn validate_run(run: &RunDef) -> Result<(), ValidationError> {
    validate_positive_finite("run.mass", run.mass)?;
    validate_non_negative_finite("run.spring_constant", run.spring_constant)?;
    validate_non_negative_finite("run.damping_coefficient", run.damping_coefficient)?;
    validate_finite("run.equilibrium_angle_rad", run.equilibrium_angle_rad)?;
    validate_finite("run.initial_angle_rad", run.initial_angle_rad)?;
    validate_positive_finite("run.integrator_step_s", run.integrator_step_s)?;
    validate_positive_finite("run.tick_period_s", run.tick_period_s)?;
    validate_positive_finite("run.theta_tolerance_rad", run.theta_tolerance_rad)?;
    validate_positive_finite("run.omega_tolerance_rad_s", run.omega_tolerance_rad_s)?;
    if run.max_ticks == Some(0) {
        return Err(ValidationError::InvalidValue {
            field: "run.max_ticks".to_string(),
            value: "0".to_string(),
            reason: "must be positive when set".to_string(),
        });
    }
    Ok(())
}

fn validate_gate(gate: &GateDef) -> Result<(), ValidationError> {
    for (field, value) in [
        ("gate.min_angle_deg", gate.min_angle_deg),
        ("gate.max_angle_deg", gate.max_angle_deg),
    ] {
        if !(0.0..=360.0).contains(&value) {
            return Err(ValidationError::InvalidValue {
                field: field.to_string(),
                value: value.to_string(),
                reason: "must be within [0, 360]".to_string(),
            });
        }
    }
    if gate.min_angle_deg > gate.max_angle_deg {
        return Err(ValidationError::InvalidValue {
            field: "gate.min_angle_deg".to_string(),
            value: gate.min_angle_deg.to_string(),
            reason: format!("exceeds gate.max_angle_deg ({})", gate.max_angle_deg),
        });
    }
    Ok(())
}

fn validate_finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be finite".to_string(),
        });
    }
    Ok(())
}

fn validate_positive_finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be positive and finite".to_string(),
        });
    }
    Ok(())
}

fn validate_non_negative_finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be non-negative and finite".to_string(),
        });
    }
    Ok(())
}
