//! Perception module: smoothing of raw sensor readings
pub mod filters;

pub use self::filters::{Ewma, Filter, DEFAULT_ALPHA};
