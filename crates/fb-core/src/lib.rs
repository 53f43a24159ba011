//! fb-core: stable foundation for the four-bar simulator.
//!
//! Contains:
//! - units (uom angle type + degree/radian constructors)
//! - numeric (Real + validators + angle helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{FbError, FbResult};
pub use numeric::*;
pub use units::*;
