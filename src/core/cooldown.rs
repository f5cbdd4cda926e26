//! Tick-counted cooldown
//!
//! One primitive for every countdown in the game (attack cooldowns, parry
//! windows, invincibility, projectile lifetimes) so the semantics are
//! identical everywhere: decrements once per tick, clamps at zero, never goes
//! negative.

use serde::{Deserialize, Serialize};

/// A countdown measured in simulation ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cooldown {
    ticks: u32,
}

impl Cooldown {
    /// A cooldown that is already elapsed.
    pub const READY: Self = Self { ticks: 0 };

    /// Start a countdown of `ticks` ticks.
    #[inline]
    pub const fn start(ticks: u32) -> Self {
        Self { ticks }
    }

    /// Set the remaining ticks, replacing any running countdown.
    #[inline]
    pub fn set(&mut self, ticks: u32) {
        self.ticks = ticks;
    }

    /// Advance one tick. Clamped at zero.
    #[inline]
    pub fn tick(&mut self) {
        self.ticks = self.ticks.saturating_sub(1);
    }

    /// True once the countdown has reached zero.
    #[inline]
    pub fn ready(&self) -> bool {
        self.ticks == 0
    }

    /// True while the countdown is still running.
    #[inline]
    pub fn active(&self) -> bool {
        self.ticks > 0
    }

    /// Remaining ticks.
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.ticks
    }
}
