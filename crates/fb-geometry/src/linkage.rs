//! Four-bar closure solver.

use fb_core::{ensure_finite, unwrap_near};
use nalgebra::{Point2, Vector2};

use crate::dashpot::DashpotSegment;
use crate::error::{GeometryError, GeometryResult};
use crate::link::{LinkId, LinkLengths, LinkState, PointId};

/// Relative slack on the reach limits, so tangent poses still close.
const REACH_EPS: f64 = 1e-12;

/// Assembly mode of the loop.
///
/// For a given input angle the output tip can sit on either side of the
/// diagonal running from the input tip to the output pivot. `Open` keeps it on
/// the left of that diagonal (counterclockwise), `Crossed` on the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Branch {
    #[default]
    Open,
    Crossed,
}

impl Branch {
    fn sign(self) -> f64 {
        match self {
            Branch::Open => 1.0,
            Branch::Crossed => -1.0,
        }
    }
}

/// A closed pose of the mechanism.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkageConfiguration {
    /// Input link angle as requested (radians, unwrapped).
    pub input_angle: f64,
    /// Coupler direction, input tip to output tip (radians, unwrapped).
    pub coupler_angle: f64,
    /// Output direction, output pivot to output tip (radians, unwrapped).
    pub output_angle: f64,
    pub input_pivot: Point2<f64>,
    pub output_pivot: Point2<f64>,
    pub input_tip: Point2<f64>,
    pub output_tip: Point2<f64>,
    pub branch: Branch,
}

impl LinkageConfiguration {
    pub fn angle(&self, link: LinkId) -> f64 {
        match link {
            LinkId::Ground => {
                let g = self.output_pivot - self.input_pivot;
                g.y.atan2(g.x)
            }
            LinkId::Input => self.input_angle,
            LinkId::Coupler => self.coupler_angle,
            LinkId::Output => self.output_angle,
        }
    }

    /// Start and end joints of a link in this pose.
    pub fn endpoints(&self, link: LinkId) -> (Point2<f64>, Point2<f64>) {
        match link {
            LinkId::Ground => (self.input_pivot, self.output_pivot),
            LinkId::Input => (self.input_pivot, self.input_tip),
            LinkId::Coupler => (self.input_tip, self.output_tip),
            LinkId::Output => (self.output_pivot, self.output_tip),
        }
    }

    pub fn point(&self, id: PointId, dashpot: &DashpotSegment) -> Point2<f64> {
        match id {
            PointId::InputPivot => self.input_pivot,
            PointId::OutputPivot => self.output_pivot,
            PointId::InputTip => self.input_tip,
            PointId::OutputTip => self.output_tip,
            PointId::DashpotAnchor => dashpot.anchor,
            PointId::DashpotMount => {
                let (start, end) = self.endpoints(dashpot.mount.link);
                dashpot.mount.locate(start, end)
            }
        }
    }

    /// Largest deviation between a link's joint distance and its length.
    ///
    /// Zero (to rounding) for any pose produced by [`Linkage::solve`].
    pub fn closure_residual(&self, lengths: &LinkLengths) -> f64 {
        LinkId::ALL
            .iter()
            .map(|&link| {
                let (start, end) = self.endpoints(link);
                ((end - start).norm() - lengths.get(link)).abs()
            })
            .fold(0.0, f64::max)
    }

    /// Signed side of the output tip relative to the input tip → output pivot
    /// diagonal. Positive on the open branch, negative on the crossed one.
    pub fn branch_side(&self) -> f64 {
        let diag = self.output_pivot - self.input_tip;
        let to_tip = self.output_tip - self.input_tip;
        diag.perp(&to_tip)
    }
}

/// Four-bar mechanism with a committed pose and a dashpot.
///
/// The input pivot sits at the origin and the ground link runs along +x to the
/// output pivot.
#[derive(Debug, Clone)]
pub struct Linkage {
    lengths: LinkLengths,
    dashpot: DashpotSegment,
    branch: Branch,
    config: LinkageConfiguration,
}

impl Linkage {
    pub(crate) fn from_parts(
        lengths: LinkLengths,
        dashpot: DashpotSegment,
        branch: Branch,
        input_angle: f64,
    ) -> GeometryResult<Self> {
        let config = close_loop(&lengths, branch, input_angle, None)?;
        Ok(Self {
            lengths,
            dashpot,
            branch,
            config,
        })
    }

    pub fn lengths(&self) -> &LinkLengths {
        &self.lengths
    }

    pub fn link_length(&self, link: LinkId) -> f64 {
        self.lengths.get(link)
    }

    /// Change one link length.
    ///
    /// Rejects non-positive lengths and keeps the previous value. The committed
    /// pose is not re-solved; call [`Linkage::solve`] afterwards.
    pub fn set_link_length(&mut self, link: LinkId, length: f64) -> GeometryResult<()> {
        self.lengths.set(link, length)
    }

    pub fn branch(&self) -> Branch {
        self.branch
    }

    /// Explicitly request an assembly mode for subsequent solves.
    pub fn set_branch(&mut self, branch: Branch) {
        if branch != self.branch {
            tracing::debug!(?branch, "linkage branch switched");
        }
        self.branch = branch;
    }

    pub fn dashpot(&self) -> &DashpotSegment {
        &self.dashpot
    }

    pub fn configuration(&self) -> &LinkageConfiguration {
        &self.config
    }

    pub fn input_angle(&self) -> f64 {
        self.config.input_angle
    }

    /// Close the loop at `input_angle` on the active branch.
    ///
    /// Nothing is committed; pass the result to [`Linkage::commit`] to keep it.
    /// Fails with [`GeometryError::Infeasible`] when the coupler and output
    /// links cannot reach each other.
    pub fn solve(&self, input_angle: f64) -> GeometryResult<LinkageConfiguration> {
        close_loop(&self.lengths, self.branch, input_angle, Some(&self.config))
    }

    pub fn commit(&mut self, config: LinkageConfiguration) {
        self.branch = config.branch;
        self.config = config;
    }

    /// Solve and commit in one call. On failure the previous pose is kept.
    pub fn solve_and_commit(&mut self, input_angle: f64) -> GeometryResult<&LinkageConfiguration> {
        let config = self.solve(input_angle)?;
        self.commit(config);
        Ok(&self.config)
    }

    pub fn link(&self, id: LinkId) -> LinkState {
        let (start, end) = self.config.endpoints(id);
        LinkState {
            id,
            angle: self.config.angle(id),
            length: self.lengths.get(id),
            start,
            end,
        }
    }

    pub fn point(&self, id: PointId) -> Point2<f64> {
        self.config.point(id, &self.dashpot)
    }

    pub fn segment_length(&self, a: PointId, b: PointId) -> f64 {
        (self.point(b) - self.point(a)).norm()
    }

    pub fn dashpot_length(&self) -> f64 {
        self.segment_length(PointId::DashpotAnchor, PointId::DashpotMount)
    }
}

fn close_loop(
    lengths: &LinkLengths,
    branch: Branch,
    input_angle: f64,
    previous: Option<&LinkageConfiguration>,
) -> GeometryResult<LinkageConfiguration> {
    let input_angle = ensure_finite(input_angle, "input angle")?;

    let input_pivot = Point2::origin();
    let output_pivot = Point2::new(lengths.ground, 0.0);
    let input_tip = input_pivot + Vector2::new(input_angle.cos(), input_angle.sin()) * lengths.input;

    // Intersect circle(input_tip, coupler) with circle(output_pivot, output)
    let diag = output_pivot - input_tip;
    let d = diag.norm();
    let (r0, r1) = (lengths.coupler, lengths.output);
    let max_reach = r0 + r1;
    let min_reach = (r0 - r1).abs();
    let slack = REACH_EPS * max_reach;
    if d <= f64::EPSILON * max_reach || d > max_reach + slack || d < min_reach - slack {
        return Err(GeometryError::Infeasible {
            input_angle,
            diagonal: d,
            min_reach,
            max_reach,
        });
    }

    let a = (r0 * r0 - r1 * r1 + d * d) / (2.0 * d);
    let h = (r0 * r0 - a * a).max(0.0).sqrt();
    let u = diag / d;
    let left = Vector2::new(-u.y, u.x);
    let output_tip = input_tip + u * a + left * (h * branch.sign());

    let c = output_tip - input_tip;
    let o = output_tip - output_pivot;
    let mut coupler_angle = c.y.atan2(c.x);
    let mut output_angle = o.y.atan2(o.x);
    if let Some(prev) = previous {
        coupler_angle = unwrap_near(prev.coupler_angle, coupler_angle);
        output_angle = unwrap_near(prev.output_angle, output_angle);
    }

    Ok(LinkageConfiguration {
        input_angle,
        coupler_angle,
        output_angle,
        input_pivot,
        output_pivot,
        input_tip,
        output_tip,
        branch,
    })
}
