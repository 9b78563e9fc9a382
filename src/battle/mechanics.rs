use crate::battle::simulator::{BranchAccumulator, ChanceBranch, Simulator};
use crate::battle::state::{GameState, SideId, Weather};
use crate::battle::stats::{effective_attack, effective_defense};
use crate::errors::{MechanicsError, MechanicsResult};
use crate::moves::{get_move_data, MoveEffect};
use crate::pokemon::StatusCondition;
use crate::side::Selection;

/// Battle mechanics with tunable chance parameters. Holding the chances as
/// runtime values lets tests zero them out and keeps the search engine free
/// of any hardcoded rules knowledge.
#[derive(Debug, Clone)]
pub struct Mechanics {
    pub crit_chance: f64,
    pub crit_multiplier: f64,
    pub thaw_chance: f64,
    pub full_paralysis_chance: f64,
}

impl Mechanics {
    /// Classic parameters: 1/16 crits at double damage, 25% thaw, 25% full
    /// paralysis.
    pub fn gen1() -> Self {
        Mechanics {
            crit_chance: 0.0625,
            crit_multiplier: 2.0,
            thaw_chance: 0.25,
            full_paralysis_chance: 0.25,
        }
    }

    /// All incidental chances zeroed. Moves still branch on accuracy and
    /// secondary-effect chances, so probabilistic tests stay meaningful
    /// while damage numbers stay predictable.
    pub fn deterministic() -> Self {
        Mechanics {
            crit_chance: 0.0,
            crit_multiplier: 2.0,
            thaw_chance: 0.0,
            full_paralysis_chance: 0.0,
        }
    }

    fn move_branches(
        &self,
        state: &GameState,
        side: SideId,
        slot: usize,
    ) -> MechanicsResult<Vec<ChanceBranch>> {
        let mut base = state.clone();
        base.side_mut(side).acted_this_turn = true;

        // A battler that fainted before its turn came up simply loses the
        // action.
        if base.side(side).active().is_fainted() {
            return Ok(vec![ChanceBranch::certain(base)]);
        }

        let move_ = {
            let instance = base
                .side(side)
                .active()
                .move_at(slot)
                .ok_or(MechanicsError::InvalidMoveSlot(slot))?;
            if instance.pp == 0 {
                return Err(MechanicsError::NoPowerPoints(instance.move_));
            }
            instance.move_
        };
        if let Some(instance) = base.side_mut(side).active_mut().moves[slot].as_mut() {
            instance.spend_pp();
        }

        let data = get_move_data(move_);
        let defender = side.opponent();

        // Offensive and foe-targeting status moves fizzle against an empty
        // slot.
        let targets_foe = data.power.is_some()
            || matches!(
                data.effect,
                Some(MoveEffect::InflictStatus { .. }) | Some(MoveEffect::LowerStat { .. })
            );
        if targets_foe && base.side(defender).active().is_fainted() {
            return Ok(vec![ChanceBranch::certain(base)]);
        }

        let mut branches = Vec::new();
        let mut remaining = 1.0;

        // Frozen: either thaw and move, or stay put.
        if base.side(side).active().status == Some(StatusCondition::Freeze) {
            if self.thaw_chance <= 0.0 {
                return Ok(vec![ChanceBranch::certain(base)]);
            }
            if self.thaw_chance < 1.0 {
                branches.push(ChanceBranch {
                    state: base.clone(),
                    probability: remaining * (1.0 - self.thaw_chance),
                });
                remaining *= self.thaw_chance;
            }
            base.side_mut(side).active_mut().status = None;
        }

        // Full paralysis skips the move entirely.
        if base.side(side).active().status == Some(StatusCondition::Paralysis)
            && self.full_paralysis_chance > 0.0
        {
            branches.push(ChanceBranch {
                state: base.clone(),
                probability: remaining * self.full_paralysis_chance,
            });
            remaining *= 1.0 - self.full_paralysis_chance;
        }

        // Accuracy. `None` never misses.
        if let Some(accuracy) = data.accuracy {
            let hit_chance = f64::from(accuracy) / 100.0;
            if hit_chance < 1.0 {
                branches.push(ChanceBranch {
                    state: base.clone(),
                    probability: remaining * (1.0 - hit_chance),
                });
                remaining *= hit_chance;
            }
        }

        // The move connects.
        match data.power {
            Some(power) => {
                let attack = effective_attack(base.side(side), data.category);
                let defense = effective_defense(base.side(defender), data.category);
                let raw = (u32::from(power) * u32::from(attack)) / (u32::from(defense) * 2);
                let damage = u16::try_from(raw.max(1)).unwrap_or(u16::MAX);
                let crit_damage =
                    ((f64::from(damage) * self.crit_multiplier).round() as u16).max(damage);

                let crit_chance = self.crit_chance.clamp(0.0, 1.0);
                let outcomes = [(damage, 1.0 - crit_chance), (crit_damage, crit_chance)];
                for (dealt, chance) in outcomes {
                    if chance <= 0.0 {
                        continue;
                    }
                    let mut landed = base.clone();
                    self.resolve_damage(&mut landed, side, defender, move_, dealt);

                    let mut acc = BranchAccumulator::new(landed);
                    self.split_secondary_effect(&mut acc, defender, data.effect);
                    for mut branch in acc.finish() {
                        branch.probability *= remaining * chance;
                        branches.push(branch);
                    }
                }
            }
            None => {
                let mut acc = BranchAccumulator::new(base);
                match data.effect {
                    Some(MoveEffect::HealUser { fraction }) => {
                        acc.each(|s| {
                            let amount =
                                (f64::from(s.side(side).active().max_hp) * fraction).round() as u16;
                            s.side_mut(side).active_mut().heal(amount);
                        });
                    }
                    effect => self.split_secondary_effect(&mut acc, defender, effect),
                }
                for mut branch in acc.finish() {
                    branch.probability *= remaining;
                    branches.push(branch);
                }
            }
        }

        Ok(branches)
    }

    fn resolve_damage(
        &self,
        state: &mut GameState,
        attacker: SideId,
        defender: SideId,
        move_: crate::moves::Move,
        damage: u16,
    ) {
        state.side_mut(defender).active_mut().take_damage(damage);

        let data = get_move_data(move_);
        match data.effect {
            Some(MoveEffect::Recoil { fraction }) => {
                let recoil = ((f64::from(damage) * fraction).round() as u16).max(1);
                state.side_mut(attacker).active_mut().take_damage(recoil);
            }
            Some(MoveEffect::SwitchesUser) => {
                let side = state.side_mut(attacker);
                if !side.active().is_fainted() && !side.bench_switches().is_empty() {
                    side.must_switch = true;
                }
            }
            _ => {}
        }
    }

    fn split_secondary_effect(
        &self,
        acc: &mut BranchAccumulator,
        defender: SideId,
        effect: Option<MoveEffect>,
    ) {
        match effect {
            Some(MoveEffect::InflictStatus { status, chance }) => {
                acc.split(f64::from(chance) / 100.0, move |s| {
                    let target = s.side_mut(defender).active_mut();
                    if !target.is_fainted() && target.status.is_none() {
                        target.status = Some(status);
                    }
                });
            }
            Some(MoveEffect::LowerStat { stat, stages, chance }) => {
                acc.split(f64::from(chance) / 100.0, move |s| {
                    if !s.side(defender).active().is_fainted() {
                        s.side_mut(defender).modify_stat_stage(stat, -stages);
                    }
                });
            }
            _ => {}
        }
    }
}

impl Simulator for Mechanics {
    fn legal_selections(&self, state: &GameState, side_id: SideId) -> Vec<Selection> {
        let side = state.side(side_id);
        if side.living_count() == 0 {
            return Vec::new();
        }

        // A fainted or dismissed active battler must be replaced before
        // anything else happens.
        if side.active().is_fainted() || side.must_switch {
            let switches: Vec<Selection> = side
                .bench_switches()
                .into_iter()
                .map(|slot| Selection::Switch { slot })
                .collect();
            if switches.is_empty() {
                return vec![Selection::Pass];
            }
            return switches;
        }

        if side.acted_this_turn {
            return vec![Selection::Pass];
        }

        let mut selections = Vec::new();
        for (slot, instance) in side.active().moves.iter().enumerate() {
            if let Some(instance) = instance {
                if instance.pp > 0 {
                    selections.push(Selection::Move { slot });
                }
            }
        }
        for slot in side.bench_switches() {
            selections.push(Selection::Switch { slot });
        }

        if selections.is_empty() {
            selections.push(Selection::Pass);
        }
        selections
    }

    fn apply(
        &self,
        state: &GameState,
        side: SideId,
        selection: Selection,
    ) -> MechanicsResult<Vec<ChanceBranch>> {
        match selection {
            Selection::Pass => {
                let mut next = state.clone();
                next.side_mut(side).acted_this_turn = true;
                Ok(vec![ChanceBranch::certain(next)])
            }
            Selection::Switch { slot } => {
                let target_ok = state
                    .side(side)
                    .team
                    .get(slot)
                    .is_some_and(|mon| !mon.is_fainted())
                    && slot != state.side(side).active_index;
                if !target_ok {
                    return Err(MechanicsError::InvalidSwitchTarget(slot));
                }
                let mut next = state.clone();
                next.side_mut(side).switch_to(slot);
                next.side_mut(side).acted_this_turn = true;
                Ok(vec![ChanceBranch::certain(next)])
            }
            Selection::Move { slot } => self.move_branches(state, side, slot),
        }
    }

    fn end_of_turn(&self, state: &GameState) -> MechanicsResult<GameState> {
        let mut next = state.clone();

        for side in &mut next.sides {
            let active = side.active_mut();
            if active.is_fainted() {
                continue;
            }
            match active.status {
                Some(StatusCondition::Poison) | Some(StatusCondition::Burn) => {
                    let chip = (active.max_hp / 8).max(1);
                    active.take_damage(chip);
                }
                _ => {}
            }
        }

        if next.field.weather == Weather::Sandstorm {
            for side in &mut next.sides {
                let active = side.active_mut();
                if !active.is_fainted() {
                    let chip = (active.max_hp / 16).max(1);
                    active.take_damage(chip);
                }
            }
        }

        next.field.turn += 1;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::simulator::PROBABILITY_TOLERANCE;
    use crate::moves::Move;
    use crate::pokemon::PokemonInst;
    use crate::side::BattleSide;
    use pretty_assertions::assert_eq;

    fn duel(ai_moves: Vec<Move>, foe_moves: Vec<Move>) -> GameState {
        GameState::new(
            BattleSide::new(vec![PokemonInst::new(
                "Attacker",
                200,
                [100, 100, 100, 100, 100],
                ai_moves,
            )]),
            BattleSide::new(vec![PokemonInst::new(
                "Defender",
                200,
                [100, 100, 100, 100, 100],
                foe_moves,
            )]),
        )
    }

    #[test]
    fn every_move_conserves_probability() {
        let mechanics = Mechanics::gen1();
        for move_ in Move::ALL {
            let state = duel(vec![move_], vec![Move::Tackle]);
            let branches = mechanics
                .apply(&state, SideId::Ai, Selection::Move { slot: 0 })
                .unwrap();
            let total: f64 = branches.iter().map(|b| b.probability).sum();
            assert!(
                (total - 1.0).abs() < PROBABILITY_TOLERANCE,
                "{move_:?} branches sum to {total}"
            );
        }
    }

    #[test]
    fn sure_hit_no_effect_move_is_a_single_branch() {
        let mechanics = Mechanics::deterministic();
        let state = duel(vec![Move::Swift], vec![Move::Tackle]);
        let branches = mechanics
            .apply(&state, SideId::Ai, Selection::Move { slot: 0 })
            .unwrap();
        assert_eq!(branches.len(), 1);
        assert_eq!(branches[0].probability, 1.0);
        // 60 power, equal stats: 60 * 100 / (100 * 2) = 30 damage.
        assert_eq!(branches[0].state.side(SideId::Foe).active().current_hp, 170);
    }

    #[test]
    fn secondary_status_forks_the_branch_set() {
        let mechanics = Mechanics::deterministic();
        let state = duel(vec![Move::Thunderbolt], vec![Move::Tackle]);
        let branches = mechanics
            .apply(&state, SideId::Ai, Selection::Move { slot: 0 })
            .unwrap();
        assert_eq!(branches.len(), 2);

        let paralyzed: Vec<_> = branches
            .iter()
            .filter(|b| b.state.side(SideId::Foe).active().status == Some(StatusCondition::Paralysis))
            .collect();
        assert_eq!(paralyzed.len(), 1);
        assert!((paralyzed[0].probability - 0.3).abs() < PROBABILITY_TOLERANCE);
    }

    #[test]
    fn fainted_attacker_loses_the_action() {
        let mechanics = Mechanics::gen1();
        let mut state = duel(vec![Move::Tackle], vec![Move::Tackle]);
        state.side_mut(SideId::Ai).active_mut().current_hp = 0;

        let branches = mechanics
            .apply(&state, SideId::Ai, Selection::Move { slot: 0 })
            .unwrap();
        assert_eq!(branches.len(), 1);
        assert_eq!(branches[0].state.side(SideId::Foe).active().current_hp, 200);
    }

    #[test]
    fn self_switching_move_flags_the_user() {
        let mechanics = Mechanics::deterministic();
        let mut state = duel(vec![Move::UTurn], vec![Move::Tackle]);
        state.side_mut(SideId::Ai).team.push(PokemonInst::new(
            "Bench",
            200,
            [100, 100, 100, 100, 100],
            vec![Move::Tackle],
        ));

        let branches = mechanics
            .apply(&state, SideId::Ai, Selection::Move { slot: 0 })
            .unwrap();
        assert_eq!(branches.len(), 1);
        assert!(branches[0].state.side(SideId::Ai).must_switch);
    }

    #[test]
    fn self_switch_without_bench_does_not_strand_the_user() {
        let mechanics = Mechanics::deterministic();
        let state = duel(vec![Move::UTurn], vec![Move::Tackle]);
        let branches = mechanics
            .apply(&state, SideId::Ai, Selection::Move { slot: 0 })
            .unwrap();
        assert!(!branches[0].state.side(SideId::Ai).must_switch);
    }

    #[test]
    fn extreme_stats_saturate_rather_than_wrap() {
        let mechanics = Mechanics::deterministic();
        let mut state = duel(vec![Move::Slash], vec![Move::Tackle]);
        // 70 * 1873 / 2 = 65555, just past u16::MAX; wrapping would leave
        // 19 damage instead of a knockout.
        state.side_mut(SideId::Ai).active_mut().stats[0] = 1873;
        state.side_mut(SideId::Foe).active_mut().stats[1] = 1;

        let branches = mechanics
            .apply(&state, SideId::Ai, Selection::Move { slot: 0 })
            .unwrap();
        assert_eq!(branches.len(), 1);
        assert!(branches[0].state.side(SideId::Foe).active().is_fainted());
    }

    #[test]
    fn legality_respects_pp_and_faints() {
        let mechanics = Mechanics::gen1();
        let mut state = duel(vec![Move::Tackle, Move::Slash], vec![Move::Tackle]);

        let open = mechanics.legal_selections(&state, SideId::Ai);
        assert_eq!(
            open,
            vec![Selection::Move { slot: 0 }, Selection::Move { slot: 1 }]
        );

        state.side_mut(SideId::Ai).active_mut().moves[1].as_mut().unwrap().pp = 0;
        assert_eq!(
            mechanics.legal_selections(&state, SideId::Ai),
            vec![Selection::Move { slot: 0 }]
        );

        state.side_mut(SideId::Ai).acted_this_turn = true;
        assert_eq!(mechanics.legal_selections(&state, SideId::Ai), vec![Selection::Pass]);

        state.side_mut(SideId::Ai).active_mut().current_hp = 0;
        assert_eq!(mechanics.legal_selections(&state, SideId::Ai), vec![]);
    }

    #[test]
    fn forced_switch_offers_only_bench_slots() {
        let mechanics = Mechanics::gen1();
        let mut state = duel(vec![Move::Tackle], vec![Move::Tackle]);
        state.side_mut(SideId::Ai).team.push(PokemonInst::new(
            "Bench",
            200,
            [100, 100, 100, 100, 100],
            vec![Move::Tackle],
        ));
        state.side_mut(SideId::Ai).active_mut().current_hp = 0;

        assert_eq!(
            mechanics.legal_selections(&state, SideId::Ai),
            vec![Selection::Switch { slot: 1 }]
        );
    }

    #[test]
    fn end_of_turn_applies_status_chip() {
        let mechanics = Mechanics::gen1();
        let mut state = duel(vec![Move::Tackle], vec![Move::Tackle]);
        state.side_mut(SideId::Ai).active_mut().status = Some(StatusCondition::Poison);

        let next = mechanics.end_of_turn(&state).unwrap();
        assert_eq!(next.side(SideId::Ai).active().current_hp, 175);
        assert_eq!(next.side(SideId::Foe).active().current_hp, 200);
        assert_eq!(next.field.turn, state.field.turn + 1);
    }

    #[test]
    fn sandstorm_chips_both_actives() {
        let mechanics = Mechanics::gen1();
        let mut state = duel(vec![Move::Tackle], vec![Move::Tackle]);
        state.field.weather = Weather::Sandstorm;

        let next = mechanics.end_of_turn(&state).unwrap();
        assert_eq!(next.side(SideId::Ai).active().current_hp, 188);
        assert_eq!(next.side(SideId::Foe).active().current_hp, 188);
    }
}
