//! Declarative table of the tweakable galaxy parameters.
//!
//! The panel iterates [`GALAXY_CONTROLS`]; each entry says which field it
//! edits, its range, and whether finishing an edit rebuilds the galaxy.

use galaxy_gen::ParameterSet;

/// Hue rotation applied by one step of a color control.
pub const HUE_STEP_DEGREES: f32 = 30.0;

/// The [`ParameterSet`] field a control edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamField {
    TotalPoints,
    Radius,
    BranchCount,
    RandomnessSpread,
    RandomnessPower,
    PointSize,
    Brightness,
    AnimationSpeed,
    InsideColor,
    OutsideColor,
}

impl ParamField {
    /// The serialized field name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TotalPoints => "total_points",
            Self::Radius => "radius",
            Self::BranchCount => "branch_count",
            Self::RandomnessSpread => "randomness_spread",
            Self::RandomnessPower => "randomness_power",
            Self::PointSize => "point_size",
            Self::Brightness => "brightness",
            Self::AnimationSpeed => "animation_speed",
            Self::InsideColor => "inside_color",
            Self::OutsideColor => "outside_color",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlKind {
    Range { min: f32, max: f32, step: f32 },
    Color,
}

/// What happens when the user finishes changing a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishAction {
    Regenerate,
    /// The value is read every frame.
    Nothing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlSpec {
    pub field: ParamField,
    pub label: &'static str,
    pub kind: ControlKind,
    pub on_finish: FinishAction,
}

const fn range(
    field: ParamField,
    label: &'static str,
    min: f32,
    max: f32,
    step: f32,
    on_finish: FinishAction,
) -> ControlSpec {
    ControlSpec {
        field,
        label,
        kind: ControlKind::Range { min, max, step },
        on_finish,
    }
}

const fn color(field: ParamField, label: &'static str) -> ControlSpec {
    ControlSpec {
        field,
        label,
        kind: ControlKind::Color,
        on_finish: FinishAction::Regenerate,
    }
}

pub static GALAXY_CONTROLS: [ControlSpec; 10] = [
    range(ParamField::TotalPoints, "Points", 10_000.0, 100_000.0, 10_000.0, FinishAction::Regenerate),
    range(ParamField::Radius, "Radius", 1.0, 10.0, 1.0, FinishAction::Regenerate),
    range(ParamField::BranchCount, "Branches", 1.0, 10.0, 1.0, FinishAction::Regenerate),
    range(ParamField::RandomnessSpread, "Randomness", 0.0, 1.0, 0.1, FinishAction::Regenerate),
    range(ParamField::RandomnessPower, "Randomness power", 1.0, 10.0, 1.0, FinishAction::Regenerate),
    range(ParamField::PointSize, "Point size", 10.0, 40.0, 5.0, FinishAction::Regenerate),
    range(ParamField::Brightness, "Brightness", 0.0, 4.0, 0.5, FinishAction::Regenerate),
    range(ParamField::AnimationSpeed, "Speed", 0.0, 10.0, 1.0, FinishAction::Nothing),
    color(ParamField::InsideColor, "Inside color"),
    color(ParamField::OutsideColor, "Outside color"),
];

impl ControlSpec {
    pub fn regenerates(&self) -> bool {
        self.on_finish == FinishAction::Regenerate
    }

    /// Current numeric value, `None` for color controls.
    pub fn value(&self, params: &ParameterSet) -> Option<f32> {
        let value = match self.field {
            ParamField::TotalPoints => params.total_points as f32,
            ParamField::Radius => params.radius,
            ParamField::BranchCount => params.branch_count as f32,
            ParamField::RandomnessSpread => params.randomness_spread,
            ParamField::RandomnessPower => params.randomness_power,
            ParamField::PointSize => params.point_size,
            ParamField::Brightness => params.brightness,
            ParamField::AnimationSpeed => params.animation_speed,
            ParamField::InsideColor | ParamField::OutsideColor => return None,
        };
        Some(value)
    }

    /// Set a numeric value, clamped to the range and snapped to the step.
    /// Ignored for color controls.
    pub fn set_value(&self, params: &mut ParameterSet, value: f32) {
        let ControlKind::Range { min, max, step } = self.kind else {
            return;
        };
        let value = snap(value, min, max, step);
        match self.field {
            ParamField::TotalPoints => params.total_points = value.round() as usize,
            ParamField::Radius => params.radius = value,
            ParamField::BranchCount => params.branch_count = value.round() as u32,
            ParamField::RandomnessSpread => params.randomness_spread = value,
            ParamField::RandomnessPower => params.randomness_power = value,
            ParamField::PointSize => params.point_size = value,
            ParamField::Brightness => params.brightness = value,
            ParamField::AnimationSpeed => params.animation_speed = value,
            ParamField::InsideColor | ParamField::OutsideColor => {}
        }
    }

    /// Move the value `direction` steps (negative steps down). Color controls
    /// rotate their hue by [`HUE_STEP_DEGREES`] per step.
    pub fn step(&self, params: &mut ParameterSet, direction: i32) {
        match self.kind {
            ControlKind::Range { step, .. } => {
                if let Some(current) = self.value(params) {
                    self.set_value(params, current + direction as f32 * step);
                }
            }
            ControlKind::Color => {
                let degrees = direction as f32 * HUE_STEP_DEGREES;
                match self.field {
                    ParamField::InsideColor => {
                        params.inside_color = params.inside_color.rotate_hue(degrees);
                    }
                    ParamField::OutsideColor => {
                        params.outside_color = params.outside_color.rotate_hue(degrees);
                    }
                    _ => {}
                }
            }
        }
    }

    /// Display string for the current value.
    pub fn format_value(&self, params: &ParameterSet) -> String {
        match self.field {
            ParamField::InsideColor => params.inside_color.to_hex(),
            ParamField::OutsideColor => params.outside_color.to_hex(),
            ParamField::TotalPoints => params.total_points.to_string(),
            ParamField::BranchCount => params.branch_count.to_string(),
            _ => self
                .value(params)
                .map(|v| format!("{v:.1}"))
                .unwrap_or_default(),
        }
    }
}

fn snap(value: f32, min: f32, max: f32, step: f32) -> f32 {
    let steps = ((value - min) / step).round();
    (min + steps * step).clamp(min, max)
}

/// Look up the control editing `field`.
pub fn control_for(field: ParamField) -> Option<&'static ControlSpec> {
    GALAXY_CONTROLS.iter().find(|c| c.field == field)
}
