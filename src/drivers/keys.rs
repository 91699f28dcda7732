//! Polled, debounced front-panel keys.
//!
//! ## Hardware
//!
//! Three momentary switches.  Select and Up are active-low with pull-ups;
//! Down is the wake key and is active-high.  The main loop samples all
//! three once per control tick and hands them to [`KeyScanner::poll`]
//! already polarity-corrected.
//!
//! ## Behaviour
//!
//! | State      | Input              | Next       | Output          |
//! |------------|--------------------|------------|-----------------|
//! | Armed      | any key down       | Debounce   | —               |
//! | Debounce   | still down         | Latched    | highest key     |
//! | Debounce   | bounced            | Armed      | —               |
//! | Latched    | all keys up        | Armed      | —               |
//!
//! One action per press; holding a key never repeats.  When several keys
//! are down together Select wins over Up, Up over Down.

use crate::app::service::KeyAction;

/// Pressed state of each key for one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyLevels {
    pub select: bool,
    pub up: bool,
    pub down: bool,
}

impl KeyLevels {
    fn any(&self) -> bool {
        self.select || self.up || self.down
    }

    fn first(&self) -> Option<KeyAction> {
        if self.select {
            Some(KeyAction::Select)
        } else if self.up {
            Some(KeyAction::Up)
        } else if self.down {
            Some(KeyAction::Down)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Armed,
    Debounce,
    Latched,
}

pub struct KeyScanner {
    state: ScanState,
}

impl KeyScanner {
    pub const fn new() -> Self {
        Self {
            state: ScanState::Armed,
        }
    }

    /// Feed one sample.  Returns an action on the tick a press is confirmed.
    pub fn poll(&mut self, keys: KeyLevels) -> Option<KeyAction> {
        match self.state {
            ScanState::Armed => {
                if keys.any() {
                    self.state = ScanState::Debounce;
                }
                None
            }
            ScanState::Debounce => match keys.first() {
                Some(action) => {
                    self.state = ScanState::Latched;
                    Some(action)
                }
                None => {
                    self.state = ScanState::Armed;
                    None
                }
            },
            ScanState::Latched => {
                if !keys.any() {
                    self.state = ScanState::Armed;
                }
                None
            }
        }
    }
}

impl Default for KeyScanner {
    fn default() -> Self {
        Self::new()
    }
}
