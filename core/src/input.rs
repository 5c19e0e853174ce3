use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Currently-pressed movement directions. The host keeps one of these
    /// per session, written by its key listeners and read once per tick.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct InputFlags: u8 {
        const UP    = 1;
        const DOWN  = 1 << 1;
        const LEFT  = 1 << 2;
        const RIGHT = 1 << 3;
    }
}

impl InputFlags {
    /// Per-axis direction signs. Opposing flags cancel; simultaneous
    /// orthogonal flags compose without normalization, so diagonal movement
    /// runs at full per-axis speed.
    pub fn axes(self) -> (i32, i32) {
        let mut dx = 0;
        let mut dz = 0;
        if self.contains(Self::LEFT) {
            dx -= 1;
        }
        if self.contains(Self::RIGHT) {
            dx += 1;
        }
        if self.contains(Self::UP) {
            dz -= 1;
        }
        if self.contains(Self::DOWN) {
            dz += 1;
        }
        (dx, dz)
    }
}
