//! Input Snapshot
//!
//! One [`InputFrame`] per tick, delivered by the host's input layer. Held
//! state (movement, directional modifiers) and edge-triggered actions (jump,
//! attack, parry, shoot, interact, consult) are separate bits; edge-triggered
//! actions mean "pressed this tick", never "held", so a button held across
//! ticks fires once.

use serde::{Deserialize, Serialize};

/// Per-tick input state packed into flag bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFrame {
    /// Packed action flags, see the `FLAG_*` constants.
    pub flags: u16,
}

impl InputFrame {
    /// Move left is held.
    pub const FLAG_LEFT: u16 = 0x0001;
    /// Move right is held.
    pub const FLAG_RIGHT: u16 = 0x0002;
    /// Upward directional modifier is held.
    pub const FLAG_UP: u16 = 0x0004;
    /// Downward directional modifier is held.
    pub const FLAG_DOWN: u16 = 0x0008;
    /// Jump was pressed this tick.
    pub const FLAG_JUMP: u16 = 0x0010;
    /// Primary (melee) attack was pressed this tick.
    pub const FLAG_ATTACK: u16 = 0x0020;
    /// Parry was pressed this tick.
    pub const FLAG_PARRY: u16 = 0x0040;
    /// Ranged attack was pressed this tick.
    pub const FLAG_SHOOT: u16 = 0x0080;
    /// Interact (NPC) was pressed this tick.
    pub const FLAG_INTERACT: u16 = 0x0100;
    /// Consult-the-oracle was pressed this tick.
    pub const FLAG_CONSULT: u16 = 0x0200;

    /// An idle frame with nothing held or pressed.
    pub const fn new() -> Self {
        Self { flags: 0 }
    }

    #[inline]
    fn has(&self, flag: u16) -> bool {
        self.flags & flag != 0
    }

    #[inline]
    fn set(&mut self, flag: u16, on: bool) {
        if on {
            self.flags |= flag;
        } else {
            self.flags &= !flag;
        }
    }

    /// Move-left held.
    #[inline]
    pub fn left(&self) -> bool {
        self.has(Self::FLAG_LEFT)
    }

    /// Move-right held.
    #[inline]
    pub fn right(&self) -> bool {
        self.has(Self::FLAG_RIGHT)
    }

    /// Up modifier held.
    #[inline]
    pub fn up(&self) -> bool {
        self.has(Self::FLAG_UP)
    }

    /// Down modifier held.
    #[inline]
    pub fn down(&self) -> bool {
        self.has(Self::FLAG_DOWN)
    }

    /// Jump pressed this tick.
    #[inline]
    pub fn jump_pressed(&self) -> bool {
        self.has(Self::FLAG_JUMP)
    }

    /// Melee attack pressed this tick.
    #[inline]
    pub fn attack_pressed(&self) -> bool {
        self.has(Self::FLAG_ATTACK)
    }

    /// Parry pressed this tick.
    #[inline]
    pub fn parry_pressed(&self) -> bool {
        self.has(Self::FLAG_PARRY)
    }

    /// Shoot pressed this tick.
    #[inline]
    pub fn shoot_pressed(&self) -> bool {
        self.has(Self::FLAG_SHOOT)
    }

    /// Interact pressed this tick.
    #[inline]
    pub fn interact_pressed(&self) -> bool {
        self.has(Self::FLAG_INTERACT)
    }

    /// Consult pressed this tick.
    #[inline]
    pub fn consult_pressed(&self) -> bool {
        self.has(Self::FLAG_CONSULT)
    }

    /// Check if this is an idle frame.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.flags == 0
    }

    /// Set move-left held state.
    pub fn set_left(&mut self, on: bool) {
        self.set(Self::FLAG_LEFT, on);
    }

    /// Set move-right held state.
    pub fn set_right(&mut self, on: bool) {
        self.set(Self::FLAG_RIGHT, on);
    }

    /// Set up-modifier held state.
    pub fn set_up(&mut self, on: bool) {
        self.set(Self::FLAG_UP, on);
    }

    /// Set down-modifier held state.
    pub fn set_down(&mut self, on: bool) {
        self.set(Self::FLAG_DOWN, on);
    }

    /// Builder helper: add flags to a frame.
    pub const fn with(mut self, flags: u16) -> Self {
        self.flags |= flags;
        self
    }
}
