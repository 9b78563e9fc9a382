use crate::battle::state::SideId;
use crate::moves::Move;
use std::fmt;

/// Main error type for the search engine.
///
/// Every variant here signals a precondition violation: a defect in the
/// caller or in a collaborator, never a recoverable runtime condition. The
/// engine performs no I/O, so a search either completes or surfaces one of
/// these unmodified to the top-level caller.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchError {
    /// A side with no living team members was passed into the search.
    EmptyTeam(SideId),
    /// The legality collaborator returned no selections for a side that
    /// still has a living member.
    NoLegalSelections(SideId),
    /// A set of chance branches did not have probabilities summing to 1.
    ProbabilityNotConserved { total: f64 },
    /// The best selection at the top level was the `Pass` sentinel. A
    /// `Pass`-only position must never reach the entry point.
    NoSelectableAction,
    /// Error raised by the battle mechanics collaborator.
    Mechanics(MechanicsError),
}

/// Errors raised by the reference battle mechanics when asked to apply a
/// selection that legality could never have sanctioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MechanicsError {
    /// The move slot index is out of bounds or empty.
    InvalidMoveSlot(usize),
    /// The move in the slot has no power points left.
    NoPowerPoints(Move),
    /// The switch target slot is empty, fainted, or already active.
    InvalidSwitchTarget(usize),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::EmptyTeam(side) => {
                write!(f, "side {:?} has no living team members", side)
            }
            SearchError::NoLegalSelections(side) => {
                write!(f, "no legal selections returned for side {:?}", side)
            }
            SearchError::ProbabilityNotConserved { total } => {
                write!(f, "chance branch probabilities sum to {} instead of 1", total)
            }
            SearchError::NoSelectableAction => {
                write!(f, "best selection at the top level was the Pass sentinel")
            }
            SearchError::Mechanics(err) => write!(f, "mechanics error: {}", err),
        }
    }
}

impl fmt::Display for MechanicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MechanicsError::InvalidMoveSlot(slot) => write!(f, "invalid move slot: {}", slot),
            MechanicsError::NoPowerPoints(move_) => {
                write!(f, "no power points remaining for {:?}", move_)
            }
            MechanicsError::InvalidSwitchTarget(slot) => {
                write!(f, "invalid switch target: {}", slot)
            }
        }
    }
}

impl std::error::Error for SearchError {}
impl std::error::Error for MechanicsError {}

impl From<MechanicsError> for SearchError {
    fn from(err: MechanicsError) -> Self {
        SearchError::Mechanics(err)
    }
}

/// Type alias for Results using SearchError.
pub type SearchResult<T> = Result<T, SearchError>;

/// Type alias for Results using MechanicsError.
pub type MechanicsResult<T> = Result<T, MechanicsError>;
