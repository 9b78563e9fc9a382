pub mod depth;
pub mod evaluate;
pub mod scores;
pub mod transposition;

#[cfg(test)]
mod tests;

pub use depth::Depth;
pub use evaluate::{BestMove, SearchSettings, Searcher};

use crate::battle::simulator::Simulator;
use crate::battle::state::GameState;
use crate::errors::SearchResult;
use crate::judge::Judge;

/// Search the position and return the selection to make this turn.
///
/// Errors if either side has no living battlers, and if the best the AI
/// can do is pass, since a pass is never a real turn-opening choice.
pub fn determine_best_move<S: Simulator, J: Judge>(
    sim: &S,
    judge: &J,
    state: &GameState,
    depth: Depth,
) -> SearchResult<BestMove> {
    Searcher::new(sim, judge, SearchSettings::default()).best_move(state, depth)
}
