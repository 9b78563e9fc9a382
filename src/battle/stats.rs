use crate::battle::state::{GameState, SideId};
use crate::moves::{get_move_data, MoveCategory};
use crate::pokemon::StatusCondition;
use crate::side::{BattleSide, Selection, StatType};

/// Priority tier of a non-move selection. Switches resolve before any move;
/// `Pass` resolves last (it does nothing, so the tier only matters for the
/// tie check).
const SWITCH_PRIORITY: i8 = 6;
const PASS_PRIORITY: i8 = -7;

/// Calculate effective attack for the active battler, including stat stages
/// and the burn penalty on physical attacks.
pub fn effective_attack(side: &BattleSide, category: MoveCategory) -> u16 {
    let battler = side.active();
    let (base, stat) = match category {
        MoveCategory::Physical => (battler.stat(StatType::Attack), StatType::Attack),
        MoveCategory::Special => (battler.stat(StatType::SpecialAttack), StatType::SpecialAttack),
        MoveCategory::Status => return 0,
    };

    let mut attack = apply_stat_stage_multiplier(base, side.get_stat_stage(stat));

    if category == MoveCategory::Physical && battler.status == Some(StatusCondition::Burn) {
        attack /= 2;
    }

    attack.max(1)
}

/// Calculate effective defense for the active battler, including stat stages.
pub fn effective_defense(side: &BattleSide, category: MoveCategory) -> u16 {
    let battler = side.active();
    let (base, stat) = match category {
        MoveCategory::Physical => (battler.stat(StatType::Defense), StatType::Defense),
        MoveCategory::Special => (battler.stat(StatType::SpecialDefense), StatType::SpecialDefense),
        MoveCategory::Status => return 0,
    };

    apply_stat_stage_multiplier(base, side.get_stat_stage(stat)).max(1)
}

/// Calculate effective speed, including stat stages and paralysis.
pub fn effective_speed(side: &BattleSide) -> u16 {
    let battler = side.active();
    let mut speed =
        apply_stat_stage_multiplier(battler.stat(StatType::Speed), side.get_stat_stage(StatType::Speed));

    if battler.status == Some(StatusCondition::Paralysis) {
        speed /= 4;
    }

    speed
}

/// Which side's selection resolves first, or `None` on a genuine tie.
///
/// Priority tier decides first (switches above all moves), then effective
/// speed. A tie in both is reported as `None` so the caller can evaluate
/// both orderings and average them.
pub fn first_to_act(state: &GameState, ai_selection: Selection, foe_selection: Selection) -> Option<SideId> {
    let ai = selection_priority(state.side(SideId::Ai), ai_selection);
    let foe = selection_priority(state.side(SideId::Foe), foe_selection);

    match ai.cmp(&foe) {
        std::cmp::Ordering::Greater => Some(SideId::Ai),
        std::cmp::Ordering::Less => Some(SideId::Foe),
        std::cmp::Ordering::Equal => None,
    }
}

/// (priority tier, effective speed) for ordering comparisons.
fn selection_priority(side: &BattleSide, selection: Selection) -> (i8, u16) {
    match selection {
        Selection::Switch { .. } => (SWITCH_PRIORITY, effective_speed(side)),
        Selection::Pass => (PASS_PRIORITY, 0),
        Selection::Move { slot } => {
            let priority = side
                .active()
                .move_at(slot)
                .map_or(0, |inst| get_move_data(inst.move_).priority);
            (priority, effective_speed(side))
        }
    }
}

/// Apply stat stage multipliers.
/// Negative stages: 2 / (2 + |stage|). Positive stages: (2 + stage) / 2.
fn apply_stat_stage_multiplier(base_stat: u16, stage: i8) -> u16 {
    let clamped_stage = stage.clamp(-6, 6);

    if clamped_stage == 0 {
        return base_stat;
    }

    let multiplier = if clamped_stage < 0 {
        2.0 / (2.0 + f64::from(-clamped_stage))
    } else {
        (2.0 + f64::from(clamped_stage)) / 2.0
    };

    (f64::from(base_stat) * multiplier).round() as u16
}
