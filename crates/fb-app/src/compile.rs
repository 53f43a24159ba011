//! Project definitions to runtime objects.

use fb_core::deg_to_rad;
use fb_geometry::{
    Branch, DashpotSegment, LinkId, LinkLengths, LinkMount, Linkage, LinkageBuilder,
};
use fb_project::schema::{BranchDef, GateDef, LinkDef, MechanismDef, Project, RunDef};
use fb_sim::{AngleBounds, EquilibriumTolerance, LoopConfig, OscillatorParams, Simulation};

use crate::error::AppResult;

fn link_id(link: LinkDef) -> LinkId {
    match link {
        LinkDef::Ground => LinkId::Ground,
        LinkDef::Input => LinkId::Input,
        LinkDef::Coupler => LinkId::Coupler,
        LinkDef::Output => LinkId::Output,
    }
}

fn branch(def: BranchDef) -> Branch {
    match def {
        BranchDef::Open => Branch::Open,
        BranchDef::Crossed => Branch::Crossed,
    }
}

/// Assemble the linkage at its resting angle.
pub fn build_linkage(mechanism: &MechanismDef) -> AppResult<Linkage> {
    let l = mechanism.lengths;
    let lengths = LinkLengths::new(l.ground, l.input, l.coupler, l.output)?;
    if !lengths.input_fully_rotates() {
        tracing::warn!(
            ground = l.ground,
            input = l.input,
            coupler = l.coupler,
            output = l.output,
            "input link cannot fully rotate; some angles will not close"
        );
    }

    let d = mechanism.dashpot;
    let dashpot = DashpotSegment::new(d.anchor, LinkMount::new(link_id(d.link), d.fraction)?)?;

    let linkage = LinkageBuilder::new(lengths)
        .dashpot(dashpot)
        .branch(branch(mechanism.branch))
        .initial_angle(deg_to_rad(mechanism.resting_angle_deg))
        .build()?;
    Ok(linkage)
}

pub fn oscillator_params(run: &RunDef) -> OscillatorParams {
    OscillatorParams {
        mass: run.mass,
        spring_constant: run.spring_constant,
        damping_coefficient: run.damping_coefficient,
        equilibrium_angle: run.equilibrium_angle_rad,
        initial_angle: run.initial_angle_rad,
        dt: run.integrator_step_s,
    }
}

pub fn loop_config(run: &RunDef) -> LoopConfig {
    LoopConfig {
        tick_period: run.tick_period_s,
        max_ticks: run.max_ticks,
        equilibrium: EquilibriumTolerance {
            theta: run.theta_tolerance_rad,
            omega: run.omega_tolerance_rad_s,
        },
    }
}

pub fn angle_bounds(gate: &GateDef) -> AppResult<AngleBounds> {
    Ok(AngleBounds::new(gate.min_angle_deg, gate.max_angle_deg)?)
}

/// Validate a project and build its simulation context, idle and ready to run.
pub fn compile_project(project: &Project) -> AppResult<Simulation> {
    crate::project_service::validate_project(project)?;
    let linkage = build_linkage(&project.mechanism)?;
    let sim = Simulation::new(
        linkage,
        oscillator_params(&project.run),
        angle_bounds(&project.gate)?,
        loop_config(&project.run),
    )?;
    tracing::debug!(name = %project.name, "project compiled");
    Ok(sim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn default_project_compiles() {
        let sim = compile_project(&Project::new("default")).unwrap();
        assert!(!sim.is_running());
        assert_eq!(sim.linkage().link_length(LinkId::Coupler), 100.0);
        assert_eq!(sim.linkage().branch(), Branch::Open);
        assert_eq!(sim.loop_config().max_ticks, Some(100_000));
        assert_eq!(sim.bounds(), AngleBounds::default());
    }

    #[test]
    fn dashpot_mount_follows_definition() {
        let mut project = Project::new("mount");
        project.mechanism.dashpot.link = LinkDef::Input;
        project.mechanism.dashpot.fraction = 1.0;
        project.mechanism.dashpot.anchor = [0.0, 0.0];
        let sim = compile_project(&project).unwrap();
        // Anchor at the input pivot, mount at the input tip
        assert!((sim.linkage().dashpot_length() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn unreachable_resting_pose_is_compile_error() {
        let mut project = Project::new("far");
        project.mechanism.lengths.coupler = 5.0;
        let Err(err) = compile_project(&project) else {
            panic!("coupler of 5 cannot close the resting pose");
        };
        assert!(matches!(err, AppError::Compile(_)));
    }

    #[test]
    fn invalid_project_is_rejected_before_building() {
        let mut project = Project::new("bad");
        project.run.mass = -1.0;
        assert!(matches!(
            compile_project(&project),
            Err(AppError::Project(_))
        ));
    }
}
