use std::collections::HashSet;

use super::types::Key;

/// Per-frame input deltas.
///
/// `InputState` holds what is down right now; `InputFrame` holds the keys
/// that went down during the current frame.
#[derive(Debug, Default)]
pub struct InputFrame {
    pub keys_pressed: HashSet<Key>,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.keys_pressed.clear();
    }
}
