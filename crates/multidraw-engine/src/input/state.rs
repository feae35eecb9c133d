use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{InputEvent, Key, KeyState, PointerMoveEvent};

/// Current input state for a single window.
#[derive(Debug, Default)]
pub struct InputState {
    /// Pointer position in logical pixels; `None` while outside the window.
    pub pointer_pos: Option<(f32, f32)>,

    pub keys_down: HashSet<Key>,
}

impl InputState {
    /// Applies an input event and records new key presses in `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match ev {
            InputEvent::PointerMoved(PointerMoveEvent { x, y }) => {
                self.pointer_pos = Some((x, y));
            }

            InputEvent::PointerLeft => {
                self.pointer_pos = None;
            }

            InputEvent::Key { key, state } => match state {
                KeyState::Pressed => {
                    // Held keys repeat; only the first press counts.
                    if self.keys_down.insert(key) {
                        frame.keys_pressed.insert(key);
                    }
                }
                KeyState::Released => {
                    self.keys_down.remove(&key);
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: Key, state: KeyState) -> InputEvent {
        InputEvent::Key { key, state }
    }

    // ── keys ──────────────────────────────────────────────────────────────

    #[test]
    fn escape_press_is_recorded_in_frame() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, key(Key::Escape, KeyState::Pressed));

        assert!(state.keys_down.contains(&Key::Escape));
        assert!(frame.keys_pressed.contains(&Key::Escape));
    }

    #[test]
    fn held_key_is_pressed_once() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, key(Key::Escape, KeyState::Pressed));
        frame.clear();
        state.apply_event(&mut frame, key(Key::Escape, KeyState::Pressed));

        assert!(state.keys_down.contains(&Key::Escape));
        assert!(frame.keys_pressed.is_empty());
    }

    #[test]
    fn release_allows_a_new_press() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, key(Key::Escape, KeyState::Pressed));
        state.apply_event(&mut frame, key(Key::Escape, KeyState::Released));
        assert!(state.keys_down.is_empty());

        frame.clear();
        state.apply_event(&mut frame, key(Key::Escape, KeyState::Pressed));
        assert!(frame.keys_pressed.contains(&Key::Escape));
    }

    // ── pointer ───────────────────────────────────────────────────────────

    #[test]
    fn pointer_move_updates_position() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(
            &mut frame,
            InputEvent::PointerMoved(PointerMoveEvent { x: 400.0, y: 300.0 }),
        );

        assert_eq!(state.pointer_pos, Some((400.0, 300.0)));
        assert!(frame.keys_pressed.is_empty());
    }

    #[test]
    fn pointer_left_forgets_position() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(
            &mut frame,
            InputEvent::PointerMoved(PointerMoveEvent { x: 1.0, y: 2.0 }),
        );
        state.apply_event(&mut frame, InputEvent::PointerLeft);

        assert_eq!(state.pointer_pos, None);
    }
}
