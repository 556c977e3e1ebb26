use bincode::{Decode, Encode};

use crate::defs::Buttons;

/// One player's controls for a tick.
///
/// `x`/`y` is the aim point relative to the body, in pixels. `tick` is the
/// client's own tick counter, echoed back as the player's ping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct Input {
    pub x: i64,
    pub y: i64,
    pub buttons: Buttons,
    pub tick: u64,
}

impl Input {
    pub fn aim(x: i64, y: i64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    pub fn with(mut self, buttons: Buttons) -> Self {
        self.buttons |= buttons;
        self
    }

    #[inline]
    pub fn held(&self, b: Buttons) -> bool {
        self.buttons.contains(b)
    }

    /// Packet used when nothing arrived: all buttons up, aim kept.
    pub fn released(&self) -> Self {
        Self {
            buttons: Buttons::empty(),
            ..*self
        }
    }
}
