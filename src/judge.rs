use crate::battle::state::{GameState, SideId};
use crate::pokemon::PokemonInst;

/// Static evaluation of a non-terminal position, from the AI side's point
/// of view. Positive favors the AI, negative the foe. Magnitudes must stay
/// well inside `VICTORY` so a heuristic edge never outranks an actual win.
pub trait Judge {
    fn judge(&self, state: &GameState) -> f64;
}

/// Material-count evaluation: each living battler is worth a flat amount
/// for being alive plus a share proportional to its remaining health, minus
/// a penalty for carrying a status condition.
#[derive(Debug, Clone)]
pub struct MaterialJudge {
    pub hp_weight: f64,
    pub alive_bonus: f64,
    pub status_penalty: f64,
}

impl Default for MaterialJudge {
    fn default() -> Self {
        MaterialJudge {
            hp_weight: 50.0,
            alive_bonus: 30.0,
            status_penalty: 12.0,
        }
    }
}

impl MaterialJudge {
    fn battler_value(&self, battler: &PokemonInst) -> f64 {
        if battler.is_fainted() {
            return 0.0;
        }
        let mut value = self.alive_bonus + self.hp_weight * battler.hp_fraction();
        if battler.status.is_some() {
            value -= self.status_penalty;
        }
        value
    }

    fn side_value(&self, state: &GameState, side: SideId) -> f64 {
        state
            .side(side)
            .team
            .iter()
            .map(|battler| self.battler_value(battler))
            .sum()
    }
}

impl Judge for MaterialJudge {
    fn judge(&self, state: &GameState) -> f64 {
        self.side_value(state, SideId::Ai) - self.side_value(state, SideId::Foe)
    }
}
