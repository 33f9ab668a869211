//! Mini Shooter: a fixed-tick arcade shooter simulation.
//!
//! - `entities`: entity data and single-entity behavior
//! - `collision`: bounding-box overlap tests
//! - `compute`: world construction, input handling and the per-tick update
//! - `settings`: tunable parameters loaded from JSON

pub mod collision;
pub mod compute;
pub mod entities;
pub mod settings;
