use std::cell::RefCell;

use crate::battle::mechanics::Mechanics;
use crate::battle::simulator::{ChanceBranch, Simulator};
use crate::battle::state::{GameState, SideId};
use crate::errors::MechanicsResult;
use crate::moves::Move;
use crate::pokemon::PokemonInst;
use crate::side::{BattleSide, Selection};

pub fn battler(name: &str, hp: u16, speed: u16, moves: Vec<Move>) -> PokemonInst {
    PokemonInst::new(name, hp, [100, 100, 100, 100, speed], moves)
}

pub fn wounded(mut battler: PokemonInst, current_hp: u16) -> PokemonInst {
    battler.current_hp = current_hp.min(battler.max_hp);
    battler
}

pub fn one_on_one(ai: PokemonInst, foe: PokemonInst) -> GameState {
    GameState::new(BattleSide::new(vec![ai]), BattleSide::new(vec![foe]))
}

pub fn teams(ai: Vec<PokemonInst>, foe: Vec<PokemonInst>) -> GameState {
    GameState::new(BattleSide::new(ai), BattleSide::new(foe))
}

/// Wraps the real mechanics and records every executed selection, letting
/// a test assert which lines of play the search explored.
pub struct RecordingSim {
    inner: Mechanics,
    allow_voluntary_switches: bool,
    pub applied: RefCell<Vec<(SideId, Selection)>>,
}

impl RecordingSim {
    pub fn new(inner: Mechanics) -> Self {
        RecordingSim { inner, allow_voluntary_switches: true, applied: RefCell::new(Vec::new()) }
    }

    /// Hides switches from legality unless the side is forced to replace
    /// its active, so any recorded switch must have come through a forced
    /// path.
    pub fn forced_switches_only(inner: Mechanics) -> Self {
        RecordingSim { inner, allow_voluntary_switches: false, applied: RefCell::new(Vec::new()) }
    }

    pub fn saw(&self, side: SideId, selection: Selection) -> bool {
        self.applied.borrow().contains(&(side, selection))
    }

    pub fn times_applied(&self, side: SideId, selection: Selection) -> usize {
        self.applied
            .borrow()
            .iter()
            .filter(|&&entry| entry == (side, selection))
            .count()
    }
}

impl Simulator for RecordingSim {
    fn legal_selections(&self, state: &GameState, side: SideId) -> Vec<Selection> {
        let mut selections = self.inner.legal_selections(state, side);
        let forced = state.side(side).must_switch || state.side(side).active().is_fainted();
        if !self.allow_voluntary_switches && !forced {
            selections.retain(|selection| !matches!(selection, Selection::Switch { .. }));
        }
        selections
    }

    fn apply(
        &self,
        state: &GameState,
        side: SideId,
        selection: Selection,
    ) -> MechanicsResult<Vec<ChanceBranch>> {
        self.applied.borrow_mut().push((side, selection));
        self.inner.apply(state, side, selection)
    }

    fn end_of_turn(&self, state: &GameState) -> MechanicsResult<GameState> {
        self.inner.end_of_turn(state)
    }
}

/// Delegates to the real mechanics but leaks probability mass from every
/// branch set, for exercising the conservation check.
pub struct LeakySim {
    inner: Mechanics,
}

impl LeakySim {
    pub fn new() -> Self {
        LeakySim { inner: Mechanics::gen1() }
    }
}

impl Simulator for LeakySim {
    fn legal_selections(&self, state: &GameState, side: SideId) -> Vec<Selection> {
        self.inner.legal_selections(state, side)
    }

    fn apply(
        &self,
        state: &GameState,
        side: SideId,
        selection: Selection,
    ) -> MechanicsResult<Vec<ChanceBranch>> {
        let mut branches = self.inner.apply(state, side, selection)?;
        for branch in &mut branches {
            branch.probability *= 0.9;
        }
        Ok(branches)
    }

    fn end_of_turn(&self, state: &GameState) -> MechanicsResult<GameState> {
        self.inner.end_of_turn(state)
    }
}
