//! Planar four-bar linkage geometry.
//!
//! This crate solves the closure of a single four-bar loop (ground, input,
//! coupler, output) for a given input angle, and measures an auxiliary dashpot
//! segment mounted between a ground anchor and a point on one of the links.
//!
//! The closure is computed analytically by intersecting the coupler circle
//! (about the input tip) with the output circle (about the output pivot). Of
//! the two intersections, the one on the active [`Branch`] is kept, so a
//! continuously driven input never flips the mechanism between its open and
//! crossed assemblies.

pub mod builder;
pub mod dashpot;
pub mod error;
pub mod link;
pub mod linkage;

pub use builder::LinkageBuilder;
pub use dashpot::{DashpotSegment, LinkMount};
pub use error::{GeometryError, GeometryResult};
pub use link::{LinkId, LinkLengths, LinkState, PointId};
pub use linkage::{Branch, Linkage, LinkageConfiguration};
