use crate::battle::state::{GameState, SideId};
use crate::errors::MechanicsResult;
use crate::side::Selection;

/// Tolerance for the probability-conservation check on a set of chance
/// branches. Branch probabilities are products of a handful of factors, so
/// anything beyond rounding error indicates a mechanics bug.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// One probabilistic outcome of executing a selection.
#[derive(Debug, Clone)]
pub struct ChanceBranch {
    pub state: GameState,
    pub probability: f64,
}

impl ChanceBranch {
    pub fn certain(state: GameState) -> Self {
        ChanceBranch { state, probability: 1.0 }
    }
}

/// Battle rules as the search engine sees them. The engine never inspects
/// battle internals beyond `GameState`; everything it needs to know about
/// the game comes through these three calls.
pub trait Simulator {
    /// All selections the given side may legally make in the current state.
    /// Empty only when the side has no living battlers at all.
    fn legal_selections(&self, state: &GameState, side: SideId) -> Vec<Selection>;

    /// Execute one selection, returning every distinct outcome with its
    /// probability. Probabilities must sum to 1.
    fn apply(
        &self,
        state: &GameState,
        side: SideId,
        selection: Selection,
    ) -> MechanicsResult<Vec<ChanceBranch>>;

    /// Residual effects once both sides have acted: status chip damage,
    /// weather, turn counter.
    fn end_of_turn(&self, state: &GameState) -> MechanicsResult<GameState>;
}

/// Builds a branch set by multiplying in independent chance factors one at
/// a time. Each `split` forks every pending branch in two.
pub struct BranchAccumulator {
    branches: Vec<ChanceBranch>,
}

impl BranchAccumulator {
    pub fn new(state: GameState) -> Self {
        BranchAccumulator { branches: vec![ChanceBranch::certain(state)] }
    }

    /// Fork every branch on an independent event with probability `chance`.
    /// `on_hit` mutates the copy where the event occurs; the other copy is
    /// kept unchanged. Chances of 0 or 1 collapse to a single branch.
    pub fn split<F>(&mut self, chance: f64, mut on_hit: F)
    where
        F: FnMut(&mut GameState),
    {
        if chance <= 0.0 {
            return;
        }
        if chance >= 1.0 {
            for branch in &mut self.branches {
                on_hit(&mut branch.state);
            }
            return;
        }

        let mut forked = Vec::with_capacity(self.branches.len() * 2);
        for branch in self.branches.drain(..) {
            let mut hit = branch.clone();
            hit.probability *= chance;
            on_hit(&mut hit.state);
            forked.push(hit);

            let mut miss = branch;
            miss.probability *= 1.0 - chance;
            forked.push(miss);
        }
        self.branches = forked;
    }

    /// Mutate every branch unconditionally.
    pub fn each<F>(&mut self, mut apply: F)
    where
        F: FnMut(&mut GameState),
    {
        for branch in &mut self.branches {
            apply(&mut branch.state);
        }
    }

    pub fn finish(self) -> Vec<ChanceBranch> {
        self.branches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::Move;
    use crate::pokemon::PokemonInst;
    use crate::side::BattleSide;

    fn blank_state() -> GameState {
        let mon = || PokemonInst::new("Test", 100, [100, 100, 100, 100, 100], vec![Move::Tackle]);
        GameState::new(BattleSide::new(vec![mon()]), BattleSide::new(vec![mon()]))
    }

    #[test]
    fn splits_multiply_probabilities() {
        let mut acc = BranchAccumulator::new(blank_state());
        acc.split(0.5, |s| {
            s.sides[0].active_mut().take_damage(10);
        });
        acc.split(0.25, |s| {
            s.sides[1].active_mut().take_damage(10);
        });

        let branches = acc.finish();
        assert_eq!(branches.len(), 4);

        let total: f64 = branches.iter().map(|b| b.probability).sum();
        assert!((total - 1.0).abs() < PROBABILITY_TOLERANCE);
    }

    #[test]
    fn certain_and_impossible_events_do_not_fork() {
        let mut acc = BranchAccumulator::new(blank_state());
        acc.split(1.0, |s| {
            s.sides[0].active_mut().take_damage(10);
        });
        acc.split(0.0, |s| {
            s.sides[0].active_mut().take_damage(99);
        });

        let branches = acc.finish();
        assert_eq!(branches.len(), 1);
        assert_eq!(branches[0].state.sides[0].active().current_hp, 90);
        assert_eq!(branches[0].probability, 1.0);
    }
}
