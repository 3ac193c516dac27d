//! Frame-coherent mouse state tracker: cursor position, drag delta, button
//! state, and wheel lines accumulated over one frame.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

/// Pixels of trackpad scroll counted as one wheel line.
const PIXELS_PER_LINE: f64 = 40.0;

#[derive(Debug, Clone, Copy, Default)]
struct ButtonFrame {
    pressed: bool,
    just_pressed: bool,
    just_released: bool,
}

fn button_index(button: MouseButton) -> Option<usize> {
    match button {
        MouseButton::Left => Some(0),
        MouseButton::Right => Some(1),
        MouseButton::Middle => Some(2),
        _ => None,
    }
}

/// Forward winit events through the `on_*` methods, query during the frame,
/// then call [`clear_transients`](Self::clear_transients).
#[derive(Debug, Clone, Default)]
pub struct MouseState {
    /// `None` until the first `CursorMoved` after entering the window, so the
    /// first motion does not produce a jump.
    position: Option<Vec2>,
    delta: Vec2,
    buttons: [ButtonFrame; 3],
    scroll: f32,
}

impl MouseState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        let new_pos = Vec2::new(x as f32, y as f32);
        if let Some(old) = self.position {
            self.delta += new_pos - old;
        }
        self.position = Some(new_pos);
    }

    pub fn on_cursor_left(&mut self) {
        self.position = None;
    }

    pub fn on_button(&mut self, button: MouseButton, state: ElementState) {
        let Some(idx) = button_index(button) else {
            return;
        };
        let frame = &mut self.buttons[idx];
        match state {
            ElementState::Pressed => {
                frame.pressed = true;
                frame.just_pressed = true;
            }
            ElementState::Released => {
                frame.pressed = false;
                frame.just_released = true;
            }
        }
    }

    pub fn on_scroll(&mut self, delta: MouseScrollDelta) {
        match delta {
            MouseScrollDelta::LineDelta(_x, y) => self.scroll += y,
            MouseScrollDelta::PixelDelta(pos) => self.scroll += (pos.y / PIXELS_PER_LINE) as f32,
        }
    }

    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    /// Cursor movement since the last [`clear_transients`](Self::clear_transients).
    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    /// Wheel lines since the last [`clear_transients`](Self::clear_transients);
    /// positive is away from the user.
    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    pub fn is_pressed(&self, button: MouseButton) -> bool {
        button_index(button).is_some_and(|i| self.buttons[i].pressed)
    }

    pub fn just_pressed(&self, button: MouseButton) -> bool {
        button_index(button).is_some_and(|i| self.buttons[i].just_pressed)
    }

    pub fn just_released(&self, button: MouseButton) -> bool {
        button_index(button).is_some_and(|i| self.buttons[i].just_released)
    }

    /// Drag delta while `button` is held, zero otherwise.
    pub fn drag_delta(&self, button: MouseButton) -> Vec2 {
        if self.is_pressed(button) {
            self.delta
        } else {
            Vec2::ZERO
        }
    }

    pub fn clear_transients(&mut self) {
        self.delta = Vec2::ZERO;
        self.scroll = 0.0;
        for frame in &mut self.buttons {
            frame.just_pressed = false;
            frame.just_released = false;
        }
    }
}
