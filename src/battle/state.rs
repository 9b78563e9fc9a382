use crate::side::BattleSide;
use serde::{Deserialize, Serialize};

/// Terminal score for a won game, from the searching side's perspective.
/// Must dominate every value a leaf evaluator can produce.
pub const VICTORY: f64 = 10_000.0;

/// Which of the two sides a value refers to. `Ai` is always the searching
/// (maximizing) player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SideId {
    Ai,
    Foe,
}

impl SideId {
    pub fn opponent(self) -> SideId {
        match self {
            SideId::Ai => SideId::Foe,
            SideId::Foe => SideId::Ai,
        }
    }

    pub fn index(self) -> usize {
        match self {
            SideId::Ai => 0,
            SideId::Foe => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weather {
    Clear,
    Sandstorm,
}

/// Field state shared by both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub weather: Weather,
    pub turn: u32,
}

impl Default for Field {
    fn default() -> Self {
        Field {
            weather: Weather::Clear,
            turn: 1,
        }
    }
}

/// A complete, concrete game position: both sides plus the shared field.
///
/// Owned by value at every search node. Every branch point clones the state
/// before mutating it, so no branch ever observes another branch's changes.
/// Hashes structurally, which is what the transposition table keys on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameState {
    pub sides: [BattleSide; 2],
    pub field: Field,
}

impl GameState {
    pub fn new(ai: BattleSide, foe: BattleSide) -> Self {
        GameState {
            sides: [ai, foe],
            field: Field::default(),
        }
    }

    pub fn side(&self, id: SideId) -> &BattleSide {
        &self.sides[id.index()]
    }

    pub fn side_mut(&mut self, id: SideId) -> &mut BattleSide {
        &mut self.sides[id.index()]
    }

    /// Reset both sides' per-turn flags at a turn boundary.
    pub fn begin_turn(&mut self) {
        for side in &mut self.sides {
            side.begin_turn();
        }
    }
}

/// Terminal check: the signed terminal score if the game is over, or `None`
/// while both sides still have a living member. A double knockout is a tie.
pub fn win(state: &GameState) -> Option<f64> {
    let ai_alive = state.side(SideId::Ai).living_count() > 0;
    let foe_alive = state.side(SideId::Foe).living_count() > 0;

    match (ai_alive, foe_alive) {
        (false, false) => Some(0.0),
        (false, true) => Some(-VICTORY),
        (true, false) => Some(VICTORY),
        (true, true) => None,
    }
}
