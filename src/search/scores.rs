use std::collections::HashMap;

use ordered_float::OrderedFloat;

use crate::side::Selection;

/// Remembered branch scores for one side at one decision node. Used to
/// order selections so earlier iterative-deepening passes steer later,
/// deeper ones toward the cutoffs first.
#[derive(Debug, Clone, Default)]
pub struct MoveScores {
    scores: HashMap<Selection, f64>,
}

impl MoveScores {
    pub fn new() -> Self {
        MoveScores { scores: HashMap::new() }
    }

    pub fn insert(&mut self, selection: Selection, score: f64) {
        self.scores.insert(selection, score);
    }

    pub fn get(&self, selection: Selection) -> Option<f64> {
        self.scores.get(&selection).copied()
    }

    /// Selections sorted best-first for the given side. A maximizer wants
    /// high scores first, a minimizer low scores first. Selections never
    /// scored sort ahead of everything, so unexplored branches are tried
    /// before revisiting known ones.
    pub fn ordered(&self, selections: &[Selection], maximizer: bool) -> Vec<Selection> {
        let unexplored_default = if maximizer { f64::INFINITY } else { f64::NEG_INFINITY };
        let mut ordered = selections.to_vec();
        ordered.sort_by_key(|&selection| {
            let score = self.get(selection).unwrap_or(unexplored_default);
            if maximizer {
                OrderedFloat(-score)
            } else {
                OrderedFloat(score)
            }
        });
        ordered
    }
}

/// Branch-score memory for both sides of a decision node.
#[derive(Debug, Clone, Default)]
pub struct MoveScoresPair {
    pub ai: MoveScores,
    pub foe: MoveScores,
}

impl MoveScoresPair {
    pub fn new() -> Self {
        MoveScoresPair::default()
    }
}
