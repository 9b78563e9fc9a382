use log::{debug, trace};

use crate::battle::simulator::{Simulator, PROBABILITY_TOLERANCE};
use crate::battle::state::{win, GameState, SideId, VICTORY};
use crate::battle::stats::first_to_act;
use crate::errors::{SearchError, SearchResult};
use crate::judge::Judge;
use crate::search::depth::Depth;
use crate::search::scores::MoveScoresPair;
use crate::search::transposition::{state_hash, TranspositionTable};
use crate::side::Selection;

/// Tuning knobs for the search. Defaults match the values the engine was
/// calibrated with; tests override individual fields.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// Both sides at or below this many living battlers switches the
    /// search into single-matchup endgame enumeration.
    pub single_matchup_threshold: usize,
    /// Weight on the living-battler differential blended into enumerated
    /// endgame scores.
    pub team_blend_weight: f64,
    /// Per-remaining-level reward folded into terminal scores, so the
    /// search prefers winning sooner and losing later.
    pub tempo_bonus: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            single_matchup_threshold: 2,
            team_blend_weight: 15.0,
            tempo_bonus: 1.0,
        }
    }
}

/// The search's verdict: the selection to make now and its expected score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestMove {
    pub selection: Selection,
    pub score: f64,
}

/// A second action queued while the first resolves. `target_active`
/// records who stood across from the actor when the action was chosen, so
/// a later identity change can void it.
#[derive(Debug, Clone, Copy)]
struct Pending {
    side: SideId,
    selection: Selection,
    target_active: usize,
}

/// What a decision node is deciding. The same alpha-beta loop serves the
/// turn-opening pair of selections, a mid-turn extra decision, and the
/// replacement choices after faints.
#[derive(Debug, Clone, Copy)]
enum Continuation {
    FullTurn,
    ExtraDecision { pending: Pending },
    /// Replacement owed by a self-switching move that resolved second;
    /// nothing is queued behind it but the end of the turn.
    EndOfTurnSwitch { side: SideId },
    FaintReplacement,
}

/// What happens once an executed action's chance branches are resolved.
#[derive(Debug, Clone, Copy)]
enum AfterAction {
    /// The slower side's action is still queued.
    SecondAction(Pending),
    /// An extra decision just resolved; the queued action fires unless its
    /// target is gone.
    PendingAfterExtra(Pending),
    EndOfTurn,
    /// Replacement node: the foe's replacement (or pass) is still queued.
    FoeReplacement(Selection),
    TurnStart,
}

/// Expectiminimax over simultaneous selections. One searcher serves one
/// top-level call; the transposition table it owns dies with it.
pub struct Searcher<'a, S: Simulator, J: Judge> {
    sim: &'a S,
    judge: &'a J,
    settings: SearchSettings,
    table: TranspositionTable,
}

impl<'a, S: Simulator, J: Judge> Searcher<'a, S, J> {
    pub fn new(sim: &'a S, judge: &'a J, settings: SearchSettings) -> Self {
        Searcher { sim, judge, settings, table: TranspositionTable::new() }
    }

    /// Full search from a turn boundary, deepening one general level at a
    /// time. Scores from each pass order the selections of the next, and
    /// the root selection comes from the deepest pass.
    pub fn best_move(&mut self, state: &GameState, depth: Depth) -> SearchResult<BestMove> {
        for side in [SideId::Ai, SideId::Foe] {
            if state.side(side).living_count() == 0 {
                return Err(SearchError::EmptyTeam(side));
            }
        }

        let mut root = state.clone();
        root.begin_turn();
        let root_hash = state_hash(&root);

        let ai_selections = self.sim.legal_selections(&root, SideId::Ai);
        let foe_selections = self.sim.legal_selections(&root, SideId::Foe);
        if ai_selections.is_empty() {
            return Err(SearchError::NoLegalSelections(SideId::Ai));
        }
        if foe_selections.is_empty() {
            return Err(SearchError::NoLegalSelections(SideId::Foe));
        }

        let mut scores = MoveScoresPair::new();
        let mut deepest: Option<BestMove> = None;
        for general in 1..=depth.general.max(1) {
            let pass_depth = Depth::new(general.min(depth.general), depth.single);
            let best = self.select_move_branch(
                &root,
                &ai_selections,
                &foe_selections,
                pass_depth,
                &mut scores,
                Continuation::FullTurn,
            )?;
            self.table.store(root_hash, pass_depth, best);
            debug!(
                "pass general={} single={}: {:?} scores {:.2}",
                pass_depth.general, pass_depth.single, best.selection, best.score
            );
            deepest = Some(best);
        }

        let best = deepest.ok_or(SearchError::NoSelectableAction)?;
        if best.selection == Selection::Pass {
            return Err(SearchError::NoSelectableAction);
        }
        Ok(best)
    }

    /// Alpha-beta over one simultaneous decision node: maximize over our
    /// selections the minimum over the foe's. Scored branches feed back
    /// into `scores` so later visits try the strongest replies first.
    fn select_move_branch(
        &mut self,
        state: &GameState,
        ai_selections: &[Selection],
        foe_selections: &[Selection],
        depth: Depth,
        scores: &mut MoveScoresPair,
        continuation: Continuation,
    ) -> SearchResult<BestMove> {
        let ai_ordered = scores.ai.ordered(ai_selections, true);
        let mut best_selection = ai_ordered
            .first()
            .copied()
            .ok_or(SearchError::NoLegalSelections(SideId::Ai))?;
        if foe_selections.is_empty() {
            return Err(SearchError::NoLegalSelections(SideId::Foe));
        }

        let mut alpha = f64::NEG_INFINITY;
        for ai_selection in ai_ordered {
            let mut beta = f64::INFINITY;
            for foe_selection in scores.foe.ordered(foe_selections, false) {
                let value =
                    self.resolve_action_pair(state, ai_selection, foe_selection, depth, continuation)?;
                scores.foe.insert(foe_selection, value);
                beta = beta.min(value);
                // This row can no longer beat the best row found so far.
                if beta <= alpha {
                    break;
                }
            }
            scores.ai.insert(ai_selection, beta);
            if beta > alpha {
                alpha = beta;
                best_selection = ai_selection;
            }
            // No remaining row can beat the reachable-score bound.
            if alpha >= self.max_score(depth) {
                break;
            }
        }

        Ok(BestMove { selection: best_selection, score: alpha })
    }

    fn resolve_action_pair(
        &mut self,
        state: &GameState,
        ai_selection: Selection,
        foe_selection: Selection,
        depth: Depth,
        continuation: Continuation,
    ) -> SearchResult<f64> {
        match continuation {
            Continuation::FullTurn => self.order_branch(state, ai_selection, foe_selection, depth),
            Continuation::ExtraDecision { pending } => {
                let decider = pending.side.opponent();
                let selection = if decider == SideId::Ai { ai_selection } else { foe_selection };
                self.execute_move(state, decider, selection, depth, AfterAction::PendingAfterExtra(pending))
            }
            Continuation::EndOfTurnSwitch { side } => {
                let selection = if side == SideId::Ai { ai_selection } else { foe_selection };
                self.execute_move(state, side, selection, depth, AfterAction::EndOfTurn)
            }
            Continuation::FaintReplacement => self.execute_move(
                state,
                SideId::Ai,
                ai_selection,
                depth,
                AfterAction::FoeReplacement(foe_selection),
            ),
        }
    }

    /// Resolve who acts first. A true tie is worth the average of both
    /// orderings.
    fn order_branch(
        &mut self,
        state: &GameState,
        ai_selection: Selection,
        foe_selection: Selection,
        depth: Depth,
    ) -> SearchResult<f64> {
        match first_to_act(state, ai_selection, foe_selection) {
            Some(first) => self.use_move_branch(state, first, ai_selection, foe_selection, depth),
            None => {
                let ai_first =
                    self.use_move_branch(state, SideId::Ai, ai_selection, foe_selection, depth)?;
                let foe_first =
                    self.use_move_branch(state, SideId::Foe, ai_selection, foe_selection, depth)?;
                Ok((ai_first + foe_first) / 2.0)
            }
        }
    }

    fn use_move_branch(
        &mut self,
        state: &GameState,
        first: SideId,
        ai_selection: Selection,
        foe_selection: Selection,
        depth: Depth,
    ) -> SearchResult<f64> {
        let second = first.opponent();
        let (first_selection, second_selection) = match first {
            SideId::Ai => (ai_selection, foe_selection),
            SideId::Foe => (foe_selection, ai_selection),
        };
        let pending = Pending {
            side: second,
            selection: second_selection,
            target_active: state.side(first).active_index,
        };
        self.execute_move(state, first, first_selection, depth, AfterAction::SecondAction(pending))
    }

    /// Chance node: expand every branch of one executed selection and take
    /// the probability-weighted mean. A branch that ends the battle scores
    /// terminally; any other continues down the turn.
    fn execute_move(
        &mut self,
        state: &GameState,
        side: SideId,
        selection: Selection,
        depth: Depth,
        after: AfterAction,
    ) -> SearchResult<f64> {
        let branches = self.sim.apply(state, side, selection)?;
        let total: f64 = branches.iter().map(|branch| branch.probability).sum();
        if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(SearchError::ProbabilityNotConserved { total });
        }

        let mut expected = 0.0;
        for branch in branches {
            let value = match win(&branch.state) {
                Some(outcome) => self.tempo_adjusted(outcome, depth),
                None => self.continue_after(&branch.state, after, depth)?,
            };
            expected += branch.probability * value;
        }
        Ok(expected)
    }

    fn continue_after(
        &mut self,
        state: &GameState,
        after: AfterAction,
        depth: Depth,
    ) -> SearchResult<f64> {
        match after {
            AfterAction::SecondAction(pending) => self.second_move_branch(state, pending, depth),
            AfterAction::PendingAfterExtra(pending) => {
                // The queued action was aimed at whoever stood across when
                // it was chosen. If the extra decision replaced that
                // battler, the action is void.
                let target = pending.side.opponent();
                let selection = if state.side(target).active_index != pending.target_active {
                    Selection::Pass
                } else {
                    pending.selection
                };
                self.execute_move(state, pending.side, selection, depth, AfterAction::EndOfTurn)
            }
            AfterAction::EndOfTurn => self.resolve_pending_switches(state, depth),
            AfterAction::FoeReplacement(selection) => {
                self.execute_move(state, SideId::Foe, selection, depth, AfterAction::TurnStart)
            }
            AfterAction::TurnStart => self.next_turn_branch(state, depth),
        }
    }

    /// Between the two queued actions of a turn. A self-switching move
    /// grants its user an extra decision here before the second action
    /// resolves; a mid-turn faint does not, replacements wait for the end
    /// of the turn.
    fn second_move_branch(
        &mut self,
        state: &GameState,
        pending: Pending,
        depth: Depth,
    ) -> SearchResult<f64> {
        let mover = pending.side.opponent();
        if state.side(mover).must_switch {
            let replacements: Vec<Selection> = self
                .sim
                .legal_selections(state, mover)
                .into_iter()
                .filter(|&selection| selection != Selection::Pass)
                .collect();
            match replacements.len() {
                0 => {}
                1 => {
                    return self.execute_move(
                        state,
                        mover,
                        replacements[0],
                        depth,
                        AfterAction::PendingAfterExtra(pending),
                    );
                }
                _ => {
                    let (ai_selections, foe_selections) = match mover {
                        SideId::Ai => (replacements, vec![Selection::Pass]),
                        SideId::Foe => (vec![Selection::Pass], replacements),
                    };
                    let mut scores = MoveScoresPair::new();
                    let best = self.select_move_branch(
                        state,
                        &ai_selections,
                        &foe_selections,
                        depth,
                        &mut scores,
                        Continuation::ExtraDecision { pending },
                    )?;
                    return Ok(best.score);
                }
            }
        }
        self.execute_move(state, pending.side, pending.selection, depth, AfterAction::EndOfTurn)
    }

    /// Both actions have resolved. A self-switching move that resolved
    /// second still owes its user a replacement choice; honor it before
    /// residual effects run.
    fn resolve_pending_switches(&mut self, state: &GameState, depth: Depth) -> SearchResult<f64> {
        for side in [SideId::Ai, SideId::Foe] {
            if !state.side(side).must_switch {
                continue;
            }
            let replacements: Vec<Selection> = self
                .sim
                .legal_selections(state, side)
                .into_iter()
                .filter(|&selection| selection != Selection::Pass)
                .collect();
            match replacements.len() {
                0 => {}
                1 => {
                    return self.execute_move(
                        state,
                        side,
                        replacements[0],
                        depth,
                        AfterAction::EndOfTurn,
                    );
                }
                _ => {
                    let (ai_selections, foe_selections) = match side {
                        SideId::Ai => (replacements, vec![Selection::Pass]),
                        SideId::Foe => (vec![Selection::Pass], replacements),
                    };
                    let mut scores = MoveScoresPair::new();
                    let best = self.select_move_branch(
                        state,
                        &ai_selections,
                        &foe_selections,
                        depth,
                        &mut scores,
                        Continuation::EndOfTurnSwitch { side },
                    )?;
                    return Ok(best.score);
                }
            }
        }
        self.end_of_turn_branch(state, depth)
    }

    /// Residual effects, then either terminal scoring, a replacement node
    /// for fainted actives, or the next turn.
    fn end_of_turn_branch(&mut self, state: &GameState, depth: Depth) -> SearchResult<f64> {
        let advanced = self.sim.end_of_turn(state)?;
        if let Some(outcome) = win(&advanced) {
            return Ok(self.tempo_adjusted(outcome, depth));
        }

        let ai_down = advanced.side(SideId::Ai).active().is_fainted();
        let foe_down = advanced.side(SideId::Foe).active().is_fainted();
        if ai_down || foe_down {
            let ai_selections = self.replacement_selections(&advanced, SideId::Ai);
            let foe_selections = self.replacement_selections(&advanced, SideId::Foe);
            let mut scores = MoveScoresPair::new();
            let best = self.select_move_branch(
                &advanced,
                &ai_selections,
                &foe_selections,
                depth,
                &mut scores,
                Continuation::FaintReplacement,
            )?;
            return Ok(best.score);
        }

        self.next_turn_branch(&advanced, depth)
    }

    fn replacement_selections(&self, state: &GameState, side: SideId) -> Vec<Selection> {
        if state.side(side).active().is_fainted() {
            self.sim.legal_selections(state, side)
        } else {
            vec![Selection::Pass]
        }
    }

    /// A fresh turn begins: spend one depth level and either evaluate
    /// statically, enumerate endgame matchups, or open another decision
    /// node.
    fn next_turn_branch(&mut self, state: &GameState, depth: Depth) -> SearchResult<f64> {
        let mut next = state.clone();
        next.begin_turn();

        let ai_alive = next.side(SideId::Ai).living_count();
        let foe_alive = next.side(SideId::Foe).living_count();
        let small = ai_alive <= self.settings.single_matchup_threshold
            && foe_alive <= self.settings.single_matchup_threshold;

        if small && ai_alive * foe_alive > 1 {
            return self.single_matchup_value(&next, depth);
        }

        let deeper = depth.one_level_deeper(small);
        if deeper.is_terminal() {
            return Ok(self.judge.judge(&next));
        }
        Ok(self.turn_decision(&next, deeper)?.score)
    }

    /// Endgame enumeration: score every living pairing as an isolated 1v1
    /// and average, then blend in the material differential. Reading each
    /// duel separately is far cheaper than the combined position and close
    /// to as informative once teams are this small.
    fn single_matchup_value(&mut self, state: &GameState, depth: Depth) -> SearchResult<f64> {
        let living = |side: SideId| -> Vec<usize> {
            state
                .side(side)
                .team
                .iter()
                .enumerate()
                .filter(|(_, member)| !member.is_fainted())
                .map(|(slot, _)| slot)
                .collect()
        };
        let ai_living = living(SideId::Ai);
        let foe_living = living(SideId::Foe);

        let deeper = depth.one_level_deeper(true);
        let mut total = 0.0;
        for &ai_slot in &ai_living {
            for &foe_slot in &foe_living {
                let mut duel = state.clone();
                duel.sides[SideId::Ai.index()].isolate(ai_slot);
                duel.sides[SideId::Foe.index()].isolate(foe_slot);

                total += if deeper.is_terminal() {
                    self.judge.judge(&duel)
                } else {
                    self.turn_decision(&duel, deeper)?.score
                };
            }
        }

        let mean = total / (ai_living.len() * foe_living.len()) as f64;
        let differential = ai_living.len() as f64 - foe_living.len() as f64;
        Ok(mean + self.settings.team_blend_weight * differential)
    }

    /// Decision node at a turn boundary, memoized by state and exact depth.
    fn turn_decision(&mut self, state: &GameState, depth: Depth) -> SearchResult<BestMove> {
        let hash = state_hash(state);
        if let Some(best) = self.table.probe(hash, depth) {
            trace!("transposition hit, general={} single={}", depth.general, depth.single);
            return Ok(best);
        }

        let ai_selections = self.sim.legal_selections(state, SideId::Ai);
        let foe_selections = self.sim.legal_selections(state, SideId::Foe);
        let mut scores = MoveScoresPair::new();
        let best = self.select_move_branch(
            state,
            &ai_selections,
            &foe_selections,
            depth,
            &mut scores,
            Continuation::FullTurn,
        )?;
        self.table.store(hash, depth, best);
        Ok(best)
    }

    /// Fold the tempo bonus into a terminal outcome: wins earned with more
    /// levels unspent are worth more, losses deferred cost less. Draws are
    /// left at zero.
    fn tempo_adjusted(&self, outcome: f64, depth: Depth) -> f64 {
        if outcome == 0.0 {
            return 0.0;
        }
        outcome + outcome.signum() * self.settings.tempo_bonus * f64::from(depth.remaining())
    }

    /// Upper bound on any score reachable from this depth: either an
    /// immediate win with the full tempo bonus, or an endgame enumeration
    /// one level down in which every duel is won and the blend term is at
    /// its largest possible differential.
    fn max_score(&self, depth: Depth) -> f64 {
        let tempo = self.settings.tempo_bonus;
        let immediate = VICTORY + tempo * f64::from(depth.remaining());
        let blend_cap = self.settings.team_blend_weight
            * (self.settings.single_matchup_threshold as f64 - 1.0);
        let enumerated =
            VICTORY + tempo * f64::from(depth.remaining().saturating_sub(1)) + blend_cap;
        immediate.max(enumerated)
    }
}
