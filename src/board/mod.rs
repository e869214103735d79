//! Board model: territories, force groups, and the standard layout.

pub mod layout;

mod force;
mod territory;

pub use force::{force_name, Force, SPECIAL_SUFFIX};
pub use territory::{HostedForces, Territory, OFF_STORM_TRACK};
