//! Keyboard-driven parameter panel over [`GALAXY_CONTROLS`].
//!
//! Up/Down (or Tab) select a control. Left/Right step the selected value on
//! every press and auto-repeat; releasing the key finishes the edit. The
//! window title doubles as the panel's display.

use galaxy_gen::ParameterSet;
use galaxy_input::KeyboardState;
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::controls::{ControlSpec, GALAXY_CONTROLS, ParamField};

const UP: PhysicalKey = PhysicalKey::Code(KeyCode::ArrowUp);
const DOWN: PhysicalKey = PhysicalKey::Code(KeyCode::ArrowDown);
const TAB: PhysicalKey = PhysicalKey::Code(KeyCode::Tab);
const LEFT: PhysicalKey = PhysicalKey::Code(KeyCode::ArrowLeft);
const RIGHT: PhysicalKey = PhysicalKey::Code(KeyCode::ArrowRight);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelEvent {
    /// A different control is now selected.
    Selected(ParamField),
    /// The value is changing.
    Changed(ParamField),
    /// The user finished changing the value.
    Finished { field: ParamField, regenerate: bool },
}

#[derive(Debug, Default)]
pub struct ParameterPanel {
    selected: usize,
    /// Set while a stepped value has not been finished yet.
    editing: bool,
}

impl ParameterPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> &'static ControlSpec {
        &GALAXY_CONTROLS[self.selected]
    }

    /// Apply this frame's key transitions to `params`.
    pub fn handle_input(
        &mut self,
        keyboard: &KeyboardState,
        params: &mut ParameterSet,
    ) -> Vec<PanelEvent> {
        let mut events = Vec::new();

        let mut moved = 0_isize;
        if keyboard.pressed_or_repeated(UP) {
            moved -= 1;
        }
        if keyboard.pressed_or_repeated(DOWN) || keyboard.pressed_or_repeated(TAB) {
            moved += 1;
        }
        if moved != 0 {
            self.finish(&mut events);
            let count = GALAXY_CONTROLS.len() as isize;
            self.selected = (self.selected as isize + moved).rem_euclid(count) as usize;
            events.push(PanelEvent::Selected(self.selected().field));
        }

        let mut direction = 0;
        if keyboard.pressed_or_repeated(LEFT) {
            direction -= 1;
        }
        if keyboard.pressed_or_repeated(RIGHT) {
            direction += 1;
        }
        if direction != 0 {
            self.selected().step(params, direction);
            self.editing = true;
            events.push(PanelEvent::Changed(self.selected().field));
        }

        let stepping_held = keyboard.is_pressed(LEFT) || keyboard.is_pressed(RIGHT);
        if (keyboard.just_released(LEFT) || keyboard.just_released(RIGHT)) && !stepping_held {
            self.finish(&mut events);
        }

        events
    }

    fn finish(&mut self, events: &mut Vec<PanelEvent>) {
        if std::mem::take(&mut self.editing) {
            let control = self.selected();
            events.push(PanelEvent::Finished {
                field: control.field,
                regenerate: control.regenerates(),
            });
        }
    }

    /// `"<label>: <value>"` for the selected control.
    pub fn status_line(&self, params: &ParameterSet) -> String {
        let control = self.selected();
        format!("{}: {}", control.label, control.format_value(params))
    }

    /// Window title with the panel state appended.
    pub fn title(&self, base: &str, params: &ParameterSet) -> String {
        format!(
            "{base} | {} [{}/{}]",
            self.status_line(params),
            self.selected + 1,
            GALAXY_CONTROLS.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use galaxy_input::RawKeyEvent;
    use winit::event::ElementState;

    fn press(kb: &mut KeyboardState, key: PhysicalKey) {
        kb.process_raw(RawKeyEvent {
            key,
            state: ElementState::Pressed,
            repeat: false,
        });
    }

    fn repeat(kb: &mut KeyboardState, key: PhysicalKey) {
        kb.process_raw(RawKeyEvent {
            key,
            state: ElementState::Pressed,
            repeat: true,
        });
    }

    fn release(kb: &mut KeyboardState, key: PhysicalKey) {
        kb.process_raw(RawKeyEvent {
            key,
            state: ElementState::Released,
            repeat: false,
        });
    }

    fn frame(panel: &mut ParameterPanel, kb: &mut KeyboardState, params: &mut ParameterSet) -> Vec<PanelEvent> {
        let events = panel.handle_input(kb, params);
        kb.clear_transients();
        events
    }

    #[test]
    fn test_starts_on_first_control() {
        let panel = ParameterPanel::new();
        assert_eq!(panel.selected().field, ParamField::TotalPoints);
    }

    #[test]
    fn test_selection_wraps() {
        let mut panel = ParameterPanel::new();
        let mut kb = KeyboardState::new();
        let mut params = ParameterSet::default();

        press(&mut kb, UP);
        let events = frame(&mut panel, &mut kb, &mut params);
        assert_eq!(events, vec![PanelEvent::Selected(ParamField::OutsideColor)]);

        release(&mut kb, UP);
        press(&mut kb, TAB);
        let events = frame(&mut panel, &mut kb, &mut params);
        assert_eq!(events, vec![PanelEvent::Selected(ParamField::TotalPoints)]);
    }

    #[test]
    fn test_press_changes_and_release_finishes() {
        let mut panel = ParameterPanel::new();
        let mut kb = KeyboardState::new();
        let mut params = ParameterSet::default();

        press(&mut kb, RIGHT);
        let events = frame(&mut panel, &mut kb, &mut params);
        assert_eq!(events, vec![PanelEvent::Changed(ParamField::TotalPoints)]);
        assert_eq!(params.total_points, 50_000);

        repeat(&mut kb, RIGHT);
        frame(&mut panel, &mut kb, &mut params);
        assert_eq!(params.total_points, 60_000);

        release(&mut kb, RIGHT);
        let events = frame(&mut panel, &mut kb, &mut params);
        assert_eq!(
            events,
            vec![PanelEvent::Finished {
                field: ParamField::TotalPoints,
                regenerate: true
            }]
        );
    }

    #[test]
    fn test_speed_finish_does_not_regenerate() {
        let mut panel = ParameterPanel::new();
        let mut kb = KeyboardState::new();
        let mut params = ParameterSet::default();

        for _ in 0..7 {
            press(&mut kb, DOWN);
            frame(&mut panel, &mut kb, &mut params);
            release(&mut kb, DOWN);
        }
        assert_eq!(panel.selected().field, ParamField::AnimationSpeed);

        press(&mut kb, RIGHT);
        frame(&mut panel, &mut kb, &mut params);
        assert_eq!(params.animation_speed, 2.0);
        release(&mut kb, RIGHT);
        let events = frame(&mut panel, &mut kb, &mut params);
        assert_eq!(
            events,
            vec![PanelEvent::Finished {
                field: ParamField::AnimationSpeed,
                regenerate: false
            }]
        );
    }

    #[test]
    fn test_release_without_change_is_silent() {
        let mut panel = ParameterPanel::new();
        let mut kb = KeyboardState::new();
        let mut params = ParameterSet::default();
        release(&mut kb, LEFT);
        assert!(frame(&mut panel, &mut kb, &mut params).is_empty());
    }

    #[test]
    fn test_switching_control_finishes_pending_edit() {
        let mut panel = ParameterPanel::new();
        let mut kb = KeyboardState::new();
        let mut params = ParameterSet::default();

        press(&mut kb, LEFT);
        frame(&mut panel, &mut kb, &mut params);
        press(&mut kb, DOWN);
        let events = frame(&mut panel, &mut kb, &mut params);
        assert_eq!(
            events,
            vec![
                PanelEvent::Finished {
                    field: ParamField::TotalPoints,
                    regenerate: true
                },
                PanelEvent::Selected(ParamField::Radius),
            ]
        );

        release(&mut kb, LEFT);
        assert!(frame(&mut panel, &mut kb, &mut params).is_empty());
    }

    #[test]
    fn test_title_shows_selected_value() {
        let panel = ParameterPanel::new();
        let params = ParameterSet::default();
        assert_eq!(panel.title("Galaxy", &params), "Galaxy | Points: 40000 [1/10]");
    }
}
