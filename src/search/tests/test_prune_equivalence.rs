//! Pruning must never change the answer: on positions small enough to
//! evaluate exhaustively, the searched result has to match a naive
//! max-over-ours, min-over-theirs sweep of the full selection matrix.

use rand::Rng;

use crate::battle::mechanics::Mechanics;
use crate::battle::simulator::Simulator;
use crate::battle::state::{win, GameState, SideId};
use crate::battle::stats::first_to_act;
use crate::judge::{Judge, MaterialJudge};
use crate::moves::Move;
use crate::pokemon::PokemonInst;
use crate::search::tests::common::one_on_one;
use crate::search::{determine_best_move, Depth};
use crate::side::Selection;

const TEMPO_BONUS: f64 = 1.0;

/// Moves that resolve to exactly one outcome under zeroed chances: sure
/// accuracy, no secondary effects.
const SURE_MOVES: [Move; 4] = [Move::Tackle, Move::QuickAttack, Move::Swift, Move::Recover];

fn random_battler(rng: &mut impl Rng, name: &str) -> PokemonInst {
    let stats = [
        rng.random_range(50..=150),
        rng.random_range(50..=150),
        rng.random_range(50..=150),
        rng.random_range(50..=150),
        rng.random_range(50..=150),
    ];
    let max_hp = rng.random_range(60..=200);
    let mut battler = PokemonInst::new(name, max_hp, stats, SURE_MOVES.to_vec());
    battler.current_hp = rng.random_range(20..=max_hp);
    battler
}

fn only_branch(mechanics: &Mechanics, state: &GameState, side: SideId, selection: Selection) -> GameState {
    let mut branches = mechanics.apply(state, side, selection).unwrap();
    assert_eq!(branches.len(), 1, "sure moves must not fork");
    branches.remove(0).state
}

fn terminal(outcome: f64) -> f64 {
    if outcome == 0.0 {
        return 0.0;
    }
    // One depth level remains when a turn-one knockout lands.
    outcome + outcome.signum() * TEMPO_BONUS
}

fn resolve_ordered(
    mechanics: &Mechanics,
    judge: &MaterialJudge,
    state: &GameState,
    first: SideId,
    first_selection: Selection,
    second_selection: Selection,
) -> f64 {
    let after_first = only_branch(mechanics, state, first, first_selection);
    if let Some(outcome) = win(&after_first) {
        return terminal(outcome);
    }
    let after_second = only_branch(mechanics, &after_first, first.opponent(), second_selection);
    if let Some(outcome) = win(&after_second) {
        return terminal(outcome);
    }
    let ended = mechanics.end_of_turn(&after_second).unwrap();
    if let Some(outcome) = win(&ended) {
        return terminal(outcome);
    }
    judge.judge(&ended)
}

fn pair_value(
    mechanics: &Mechanics,
    judge: &MaterialJudge,
    state: &GameState,
    ai_selection: Selection,
    foe_selection: Selection,
) -> f64 {
    match first_to_act(state, ai_selection, foe_selection) {
        Some(SideId::Ai) => {
            resolve_ordered(mechanics, judge, state, SideId::Ai, ai_selection, foe_selection)
        }
        Some(SideId::Foe) => {
            resolve_ordered(mechanics, judge, state, SideId::Foe, foe_selection, ai_selection)
        }
        None => {
            let ai_first =
                resolve_ordered(mechanics, judge, state, SideId::Ai, ai_selection, foe_selection);
            let foe_first =
                resolve_ordered(mechanics, judge, state, SideId::Foe, foe_selection, ai_selection);
            (ai_first + foe_first) / 2.0
        }
    }
}

fn exhaustive_best(
    mechanics: &Mechanics,
    judge: &MaterialJudge,
    state: &GameState,
) -> (Selection, f64) {
    let ai_selections = mechanics.legal_selections(state, SideId::Ai);
    let foe_selections = mechanics.legal_selections(state, SideId::Foe);

    let mut best_selection = ai_selections[0];
    let mut best_value = f64::NEG_INFINITY;
    for &ai_selection in &ai_selections {
        let worst_case = foe_selections
            .iter()
            .map(|&foe_selection| pair_value(mechanics, judge, state, ai_selection, foe_selection))
            .fold(f64::INFINITY, f64::min);
        if worst_case > best_value {
            best_value = worst_case;
            best_selection = ai_selection;
        }
    }
    (best_selection, best_value)
}

#[test]
fn pruned_search_matches_the_exhaustive_matrix() {
    let mechanics = Mechanics::deterministic();
    let judge = MaterialJudge::default();
    let mut rng = rand::rng();

    for _ in 0..30 {
        let state = one_on_one(random_battler(&mut rng, "Ours"), random_battler(&mut rng, "Theirs"));
        let (expected_selection, expected_value) = exhaustive_best(&mechanics, &judge, &state);

        let best = determine_best_move(&mechanics, &judge, &state, Depth::new(1, 0)).unwrap();

        assert_eq!(best.selection, expected_selection, "state: {state:?}");
        assert!(
            (best.score - expected_value).abs() < 1e-9,
            "searched {} vs exhaustive {} in {state:?}",
            best.score,
            expected_value
        );
    }
}
