use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// Tunable inputs for one galaxy generation.
///
/// Defaults reproduce the classic look: eight arms of 40k points, warm core
/// fading to a blue rim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSet {
    /// Number of points to generate. Must be between 1 and [`crate::MAX_POINTS`].
    pub total_points: usize,
    /// Outer radius of the disc. Must be positive.
    pub radius: f32,
    /// Number of spiral arms. Must be at least 1.
    pub branch_count: u32,
    /// Jitter amplitude as a fraction of each point's orbital radius.
    pub randomness_spread: f32,
    /// Exponent applied to the jitter magnitude; higher values pull points
    /// tighter onto the arms.
    pub randomness_power: f32,
    /// Base point size in logical pixels, before pixel-ratio scaling.
    pub point_size: f32,
    pub brightness: f32,
    /// Multiplier from wall-clock seconds to shader time.
    pub animation_speed: f32,
    pub inside_color: Rgb,
    pub outside_color: Rgb,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            total_points: 40_000,
            radius: 6.0,
            branch_count: 8,
            randomness_spread: 0.1,
            randomness_power: 4.0,
            point_size: 20.0,
            brightness: 2.0,
            animation_speed: 0.5,
            inside_color: Rgb::new(1.0, 136.0 / 255.0, 34.0 / 255.0),
            outside_color: Rgb::new(34.0 / 255.0, 136.0 / 255.0, 1.0),
        }
    }
}
