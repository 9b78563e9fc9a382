use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::battle::state::GameState;
use crate::search::depth::Depth;
use crate::search::evaluate::BestMove;

/// Structural hash of a battle state. Two states that compare equal hash
/// equally; distinct states may collide, which trades a vanishing chance
/// of a wrong score for not storing full states in the table.
pub fn state_hash(state: &GameState) -> u64 {
    let mut hasher = DefaultHasher::new();
    state.hash(&mut hasher);
    hasher.finish()
}

/// Verdicts of already-evaluated decision nodes, keyed by state hash and
/// the exact depth they were evaluated at. A shallower or deeper entry for
/// the same state is a miss: scores at different depths are not
/// comparable, most visibly through the tempo bonus folded into terminal
/// values.
#[derive(Debug, Default)]
pub struct TranspositionTable {
    entries: HashMap<(u64, Depth), BestMove>,
}

impl TranspositionTable {
    pub fn new() -> Self {
        TranspositionTable::default()
    }

    pub fn probe(&self, hash: u64, depth: Depth) -> Option<BestMove> {
        self.entries.get(&(hash, depth)).copied()
    }

    pub fn store(&mut self, hash: u64, depth: Depth, best: BestMove) {
        self.entries.insert((hash, depth), best);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
