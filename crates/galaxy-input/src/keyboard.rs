//! Frame-coherent keyboard state tracker.
//!
//! [`KeyboardState`] accumulates winit key events during a frame and answers,
//! per physical key: is it held, was it pressed this frame (including OS
//! auto-repeat, reported separately), and was it released this frame.

use std::collections::HashSet;

use winit::event::{ElementState, KeyEvent};
use winit::keyboard::PhysicalKey;

/// Minimal description of a key event.
#[derive(Debug, Clone, Copy)]
pub struct RawKeyEvent {
    pub key: PhysicalKey,
    pub state: ElementState,
    pub repeat: bool,
}

/// Per-frame keyboard state keyed by physical (scan-code) key.
///
/// Forward every [`KeyEvent`] to [`process_event`](Self::process_event),
/// query during the frame, then call
/// [`clear_transients`](Self::clear_transients).
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    pressed: HashSet<PhysicalKey>,
    just_pressed: HashSet<PhysicalKey>,
    repeated: HashSet<PhysicalKey>,
    just_released: HashSet<PhysicalKey>,
}

impl KeyboardState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_event(&mut self, event: &KeyEvent) {
        self.process_raw(RawKeyEvent {
            key: event.physical_key,
            state: event.state,
            repeat: event.repeat,
        });
    }

    pub fn process_raw(&mut self, event: RawKeyEvent) {
        match (event.state, event.repeat) {
            (ElementState::Pressed, true) => {
                self.repeated.insert(event.key);
            }
            (ElementState::Pressed, false) => {
                self.pressed.insert(event.key);
                self.just_pressed.insert(event.key);
            }
            (ElementState::Released, _) => {
                self.pressed.remove(&event.key);
                self.just_released.insert(event.key);
            }
        }
    }

    /// `true` while the key is held down.
    #[must_use]
    pub fn is_pressed(&self, key: PhysicalKey) -> bool {
        self.pressed.contains(&key)
    }

    /// `true` only during the frame the key went down.
    #[must_use]
    pub fn just_pressed(&self, key: PhysicalKey) -> bool {
        self.just_pressed.contains(&key)
    }

    /// `true` if the key went down or auto-repeated this frame.
    #[must_use]
    pub fn pressed_or_repeated(&self, key: PhysicalKey) -> bool {
        self.just_pressed.contains(&key) || self.repeated.contains(&key)
    }

    #[must_use]
    pub fn just_released(&self, key: PhysicalKey) -> bool {
        self.just_released.contains(&key)
    }

    /// Call at end of frame.
    pub fn clear_transients(&mut self) {
        self.just_pressed.clear();
        self.repeated.clear();
        self.just_released.clear();
    }

    /// Forget every held key, e.g. after the window loses focus and release
    /// events may never arrive.
    pub fn reset(&mut self) {
        tracing::trace!(held = self.pressed.len(), "Keyboard state reset");
        for key in self.pressed.drain() {
            self.just_released.insert(key);
        }
        self.just_pressed.clear();
        self.repeated.clear();
    }
}
