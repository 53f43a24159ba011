//! Link and point identifiers, link lengths.

use core::fmt;

use fb_core::ensure_positive;
use nalgebra::Point2;

use crate::error::GeometryResult;

/// The four rigid links of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkId {
    /// Fixed frame, from the input pivot to the output pivot.
    Ground,
    /// Driven crank, from the input pivot to the input tip.
    Input,
    /// Floating link, from the input tip to the output tip.
    Coupler,
    /// Follower, from the output pivot to the output tip.
    Output,
}

impl LinkId {
    pub const ALL: [LinkId; 4] = [
        LinkId::Ground,
        LinkId::Input,
        LinkId::Coupler,
        LinkId::Output,
    ];

    /// Start and end joints of the link.
    pub fn joints(self) -> (PointId, PointId) {
        match self {
            LinkId::Ground => (PointId::InputPivot, PointId::OutputPivot),
            LinkId::Input => (PointId::InputPivot, PointId::InputTip),
            LinkId::Coupler => (PointId::InputTip, PointId::OutputTip),
            LinkId::Output => (PointId::OutputPivot, PointId::OutputTip),
        }
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LinkId::Ground => "ground",
            LinkId::Input => "input",
            LinkId::Coupler => "coupler",
            LinkId::Output => "output",
        };
        f.write_str(name)
    }
}

/// Named points of the mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointId {
    InputPivot,
    OutputPivot,
    InputTip,
    OutputTip,
    /// Ground-fixed end of the dashpot.
    DashpotAnchor,
    /// Link-mounted end of the dashpot.
    DashpotMount,
}

/// Lengths of the four links. All strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkLengths {
    pub ground: f64,
    pub input: f64,
    pub coupler: f64,
    pub output: f64,
}

impl LinkLengths {
    pub fn new(ground: f64, input: f64, coupler: f64, output: f64) -> GeometryResult<Self> {
        Ok(Self {
            ground: ensure_positive(ground, "ground link length")?,
            input: ensure_positive(input, "input link length")?,
            coupler: ensure_positive(coupler, "coupler link length")?,
            output: ensure_positive(output, "output link length")?,
        })
    }

    pub fn get(&self, link: LinkId) -> f64 {
        match link {
            LinkId::Ground => self.ground,
            LinkId::Input => self.input,
            LinkId::Coupler => self.coupler,
            LinkId::Output => self.output,
        }
    }

    /// Set one length. Non-positive or non-finite values are rejected and the
    /// previous length is kept.
    pub fn set(&mut self, link: LinkId, length: f64) -> GeometryResult<()> {
        let what = match link {
            LinkId::Ground => "ground link length",
            LinkId::Input => "input link length",
            LinkId::Coupler => "coupler link length",
            LinkId::Output => "output link length",
        };
        let length = ensure_positive(length, what)?;
        match link {
            LinkId::Ground => self.ground = length,
            LinkId::Input => self.input = length,
            LinkId::Coupler => self.coupler = length,
            LinkId::Output => self.output = length,
        }
        Ok(())
    }

    /// Grashof condition: shortest + longest <= sum of the other two.
    pub fn is_grashof(&self) -> bool {
        let mut l = [self.ground, self.input, self.coupler, self.output];
        l.sort_by(f64::total_cmp);
        l[0] + l[3] <= l[1] + l[2]
    }

    /// Whether the input link can make full turns (crank-rocker or double crank).
    pub fn input_fully_rotates(&self) -> bool {
        let shortest = [self.ground, self.coupler, self.output]
            .into_iter()
            .fold(f64::INFINITY, f64::min);
        self.is_grashof() && (self.input <= shortest || self.ground <= self.input.min(shortest))
    }
}

impl Default for LinkLengths {
    /// Crank-rocker: input 60 and output 70 with ground 100 and coupler 100.
    fn default() -> Self {
        Self {
            ground: 100.0,
            input: 60.0,
            coupler: 100.0,
            output: 70.0,
        }
    }
}

/// Snapshot of one link in a solved configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkState {
    pub id: LinkId,
    /// Direction from start to end joint (radians, unwrapped).
    pub angle: f64,
    pub length: f64,
    pub start: Point2<f64>,
    pub end: Point2<f64>,
}

impl LinkState {
    pub fn angle_deg(&self) -> f64 {
        fb_core::rad_to_deg(self.angle)
    }
}
