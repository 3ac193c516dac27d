//! Procedural spiral-galaxy point cloud generation.
//!
//! [`generate`] is a pure function of a [`ParameterSet`] and an injected
//! [`RandomSource`]: it allocates four parallel attribute buffers and touches
//! nothing else.

pub mod color;
pub mod generator;
pub mod params;
pub mod random;

pub use color::{ColorParseError, Rgb};
pub use generator::{GenerateError, MAX_POINTS, PointAttributeSet, branch_angle, generate};
pub use params::ParameterSet;
pub use random::{GalaxyRng, RandomSource, RngSource};
