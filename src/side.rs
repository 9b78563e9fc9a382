use crate::pokemon::PokemonInst;
use serde::{Deserialize, Serialize};

/// One selectable action for one side on one turn.
///
/// `Pass` is a sentinel meaning "no new selection": the side has already
/// committed its action for this turn, or a stored action was discarded
/// because its target left the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Selection {
    /// Use the move in the active battler's slot (0-3).
    Move { slot: usize },
    /// Switch to the team member in the given slot (0-5).
    Switch { slot: usize },
    Pass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatType {
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
}

/// One player's half of the battle: the team, the active slot, the active
/// battler's stat stages, and the per-turn bookkeeping flags the search
/// relies on to derive legality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BattleSide {
    /// Up to 6 team members.
    pub team: Vec<PokemonInst>,
    /// Index into `team` of the battler currently on the field.
    pub active_index: usize,
    /// Stage (-6 to +6) per stat, indexed by `StatType`. Cleared on switch.
    pub stat_stages: [i8; 5],
    /// Set once this side's action has resolved this turn; legality then
    /// yields only `Pass`. Cleared at the start of each turn.
    pub acted_this_turn: bool,
    /// Set by a self-switching move; legality then yields bench switches
    /// (the "extra decision"). Cleared when the switch resolves.
    pub must_switch: bool,
}

impl BattleSide {
    pub fn new(team: Vec<PokemonInst>) -> Self {
        BattleSide {
            team,
            active_index: 0,
            stat_stages: [0; 5],
            acted_this_turn: false,
            must_switch: false,
        }
    }

    /// The battler currently on the field.
    pub fn active(&self) -> &PokemonInst {
        &self.team[self.active_index]
    }

    pub fn active_mut(&mut self) -> &mut PokemonInst {
        &mut self.team[self.active_index]
    }

    /// Number of team members that have not fainted.
    pub fn living_count(&self) -> usize {
        self.team.iter().filter(|member| !member.is_fainted()).count()
    }

    /// Indices of team members that could legally be switched in.
    pub fn bench_switches(&self) -> Vec<usize> {
        self.team
            .iter()
            .enumerate()
            .filter(|(i, member)| *i != self.active_index && !member.is_fainted())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn get_stat_stage(&self, stat: StatType) -> i8 {
        self.stat_stages[stat as usize]
    }

    /// Shift a stat stage by a delta, clamped to -6..=6.
    pub fn modify_stat_stage(&mut self, stat: StatType, delta: i8) {
        let current = self.stat_stages[stat as usize];
        self.stat_stages[stat as usize] = (current + delta).clamp(-6, 6);
    }

    /// Bring a bench member onto the field, clearing stage modifiers and
    /// the pending-switch flag. The caller has already validated the slot.
    pub fn switch_to(&mut self, slot: usize) {
        self.stat_stages = [0; 5];
        self.active_index = slot;
        self.must_switch = false;
    }

    /// Reset the per-turn flags at a turn boundary.
    pub fn begin_turn(&mut self) {
        self.acted_this_turn = false;
        self.must_switch = false;
    }

    /// Reduce the team to the single member at `slot`, making it active.
    /// Used by the endgame single-matchup enumeration.
    pub fn isolate(&mut self, slot: usize) {
        let member = self.team.swap_remove(slot);
        self.team = vec![member];
        self.active_index = 0;
        self.stat_stages = [0; 5];
        self.acted_this_turn = false;
        self.must_switch = false;
    }
}
