use serde::{Deserialize, Serialize};

/// Two-phase search depth. `general` levels are full turns of exhaustive
/// expansion; once the battle collapses to isolated matchups, remaining
/// levels draw down `single` instead, letting endgames be read much deeper
/// than the midgame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Depth {
    pub general: u8,
    pub single: u8,
}

impl Depth {
    pub fn new(general: u8, single: u8) -> Self {
        Depth { general, single }
    }

    pub fn is_terminal(self) -> bool {
        self.general == 0 && self.single == 0
    }

    /// Levels left before the search bottoms out, across both phases.
    pub fn remaining(self) -> u8 {
        self.general + self.single
    }

    /// Depth after descending one turn. Small positions stop spending
    /// `general` and draw down `single`; the transition also forfeits any
    /// unspent `general` levels so the two phases never interleave.
    pub fn one_level_deeper(self, small_position: bool) -> Self {
        if small_position || self.general == 0 {
            Depth { general: 0, single: self.single.saturating_sub(1) }
        } else {
            Depth { general: self.general - 1, single: self.single }
        }
    }
}
