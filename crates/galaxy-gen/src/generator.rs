//! Spiral-arm point placement, radial color gradient, and per-point shader
//! attributes.

use std::f32::consts::TAU;

use glam::Vec3;

use crate::color::Rgb;
use crate::params::ParameterSet;
use crate::random::RandomSource;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerateError {
    #[error("invalid parameter `{field}`: {reason}")]
    InvalidParameter {
        field: &'static str,
        reason: &'static str,
    },
}

/// Four parallel per-point buffers, all of the same length.
///
/// Only [`generate`] builds one, so the equal-length invariant always holds.
#[derive(Clone, Debug, PartialEq)]
pub struct PointAttributeSet {
    positions: Vec<Vec3>,
    colors: Vec<Rgb>,
    randomness_offsets: Vec<Vec3>,
    size_factors: Vec<f32>,
}

impl PointAttributeSet {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Base positions before any shader-side rotation or offset.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Offsets the shader adds after rotating the base position.
    pub fn randomness_offsets(&self) -> &[Vec3] {
        &self.randomness_offsets
    }

    /// Per-point size multipliers in `[0, 1)`.
    pub fn size_factors(&self) -> &[f32] {
        &self.size_factors
    }
}

/// Angle of the arm that point `index` belongs to.
///
/// Points are dealt round-robin across arms, so `index` and
/// `index + branch_count` always share an angle.
pub fn branch_angle(index: usize, branch_count: u32) -> f32 {
    let branch = (index % branch_count as usize) as f32;
    branch / branch_count as f32 * TAU
}

/// Signed jitter for one axis: `u^power`, a coin flip for sign, scaled by
/// `spread * axis_radius`. The magnitude is drawn before the sign.
fn jitter(rng: &mut impl RandomSource, power: f32, spread: f32, axis_radius: f32) -> f32 {
    let magnitude = rng.next_unit().powf(power);
    let sign = if rng.next_unit() > 0.5 { 1.0 } else { -1.0 };
    magnitude * sign * spread * axis_radius
}

/// Upper bound on `total_points`.
///
/// Every point becomes one 40-byte GPU instance drawn with a `u32` instance
/// count, and the whole instance buffer has to fit in the default 256 MiB
/// `max_buffer_size`.
pub const MAX_POINTS: usize = 1 << 22;

fn validate(params: &ParameterSet) -> Result<(), GenerateError> {
    if params.total_points < 1 {
        return Err(GenerateError::InvalidParameter {
            field: "total_points",
            reason: "must be at least 1",
        });
    }
    if params.total_points > MAX_POINTS {
        return Err(GenerateError::InvalidParameter {
            field: "total_points",
            reason: "exceeds the 4194304 point limit",
        });
    }
    if !(params.radius.is_finite() && params.radius > 0.0) {
        return Err(GenerateError::InvalidParameter {
            field: "radius",
            reason: "must be a positive finite number",
        });
    }
    if params.branch_count < 1 {
        return Err(GenerateError::InvalidParameter {
            field: "branch_count",
            reason: "must be at least 1",
        });
    }
    Ok(())
}

/// Generate a galaxy point cloud.
///
/// Draw order per point is: orbital radius, then position jitter for x, y
/// and z, then the three randomness offsets. Size factors are drawn in a
/// second pass once every position exists.
pub fn generate(
    params: &ParameterSet,
    rng: &mut impl RandomSource,
) -> Result<PointAttributeSet, GenerateError> {
    validate(params)?;

    let n = params.total_points;
    let power = params.randomness_power;
    let spread = params.randomness_spread;

    let mut positions = Vec::with_capacity(n);
    let mut colors = Vec::with_capacity(n);
    let mut randomness_offsets = Vec::with_capacity(n);

    for i in 0..n {
        let angle = branch_angle(i, params.branch_count);
        let r = params.radius * rng.next_unit();

        let dx = jitter(rng, power, spread, r);
        let dy = jitter(rng, power, spread, r);
        let dz = jitter(rng, power, spread, r);
        positions.push(Vec3::new(angle.cos() * r + dx, dy, angle.sin() * r + dz));

        colors.push(
            params
                .inside_color
                .lerp(&params.outside_color, r / params.radius),
        );

        randomness_offsets.push(Vec3::new(
            jitter(rng, power, spread, r),
            jitter(rng, power, spread, r),
            jitter(rng, power, spread, r),
        ));
    }

    let size_factors = (0..n).map(|_| rng.next_unit()).collect();

    log::debug!(
        "Generated galaxy: {n} points, {} arms, radius {}",
        params.branch_count,
        params.radius
    );

    Ok(PointAttributeSet {
        positions,
        colors,
        randomness_offsets,
        size_factors,
    })
}
