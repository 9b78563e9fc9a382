//! Expectiminimax battle search for a two-player, simultaneous-choice
//! battle game with chance-driven mechanics.
//!
//! The engine sees the game only through the [`Simulator`] trait, which
//! enumerates legal selections and expands one selection into its
//! probability-weighted outcomes, and the [`Judge`] trait, which scores
//! non-terminal positions. [`search::determine_best_move`] runs an
//! iteratively-deepened alpha-beta search over simultaneous decision
//! nodes and chance nodes and returns the selection to make this turn.

pub mod battle;
pub mod errors;
pub mod judge;
pub mod moves;
pub mod pokemon;
pub mod search;
pub mod side;

pub use battle::mechanics::Mechanics;
pub use battle::simulator::{ChanceBranch, Simulator};
pub use battle::state::{GameState, SideId, VICTORY};
pub use errors::{SearchError, SearchResult};
pub use judge::{Judge, MaterialJudge};
pub use search::{determine_best_move, BestMove, Depth, SearchSettings, Searcher};
pub use side::Selection;
