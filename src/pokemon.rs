use crate::moves::{get_move_max_pp, Move};
use crate::side::StatType;
use serde::{Deserialize, Serialize};

/// A persistent status condition on one battler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCondition {
    Poison,
    Burn,
    Freeze,
    Paralysis,
}

/// One move slot: the move plus its remaining power points.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveInstance {
    pub move_: Move,
    pub pp: u8,
}

impl MoveInstance {
    /// Create a new move instance with max PP.
    pub fn new(move_: Move) -> Self {
        MoveInstance {
            move_,
            pp: get_move_max_pp(move_),
        }
    }

    /// Spend one PP. Returns false if none remained.
    pub fn spend_pp(&mut self) -> bool {
        if self.pp > 0 {
            self.pp -= 1;
            true
        } else {
            false
        }
    }
}

/// One battler instance in a team.
///
/// Stats are flat values; the search never needs the species/level/IV
/// derivation, only the resulting numbers, so callers supply them directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PokemonInst {
    pub name: String,
    pub max_hp: u16,
    pub current_hp: u16,
    /// ATK, DEF, SP.ATK, SP.DEF, SPD — indexed through `StatType`.
    pub stats: [u16; 5],
    pub moves: [Option<MoveInstance>; 4],
    pub status: Option<StatusCondition>,
}

impl PokemonInst {
    /// Create a healthy, status-free battler knowing the given moves.
    pub fn new(name: impl Into<String>, max_hp: u16, stats: [u16; 5], moves: Vec<Move>) -> Self {
        let mut move_array = [const { None }; 4];
        for (i, move_) in moves.into_iter().take(4).enumerate() {
            move_array[i] = Some(MoveInstance::new(move_));
        }

        PokemonInst {
            name: name.into(),
            max_hp,
            current_hp: max_hp,
            stats,
            moves: move_array,
            status: None,
        }
    }

    pub fn stat(&self, stat: StatType) -> u16 {
        self.stats[stat as usize]
    }

    pub fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }

    pub fn hp_fraction(&self) -> f64 {
        if self.max_hp == 0 {
            0.0
        } else {
            f64::from(self.current_hp) / f64::from(self.max_hp)
        }
    }

    /// Apply damage, clamping at zero. Returns true if the battler fainted.
    pub fn take_damage(&mut self, damage: u16) -> bool {
        self.current_hp = self.current_hp.saturating_sub(damage);
        self.is_fainted()
    }

    /// Restore HP, clamping at the maximum.
    pub fn heal(&mut self, amount: u16) {
        self.current_hp = self.current_hp.saturating_add(amount).min(self.max_hp);
    }

    /// The move in a slot, if the slot is filled.
    pub fn move_at(&self, slot: usize) -> Option<&MoveInstance> {
        self.moves.get(slot).and_then(|slot| slot.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_battler() -> PokemonInst {
        PokemonInst::new("Sparky", 120, [90, 80, 95, 85, 110], vec![Move::Tackle, Move::Swift])
    }

    #[test]
    fn damage_clamps_at_zero_and_reports_faint() {
        let mut battler = test_battler();
        assert!(!battler.take_damage(119));
        assert_eq!(battler.current_hp, 1);
        assert!(battler.take_damage(500));
        assert_eq!(battler.current_hp, 0);
        assert!(battler.is_fainted());
    }

    #[test]
    fn heal_clamps_at_max() {
        let mut battler = test_battler();
        battler.take_damage(50);
        battler.heal(200);
        assert_eq!(battler.current_hp, battler.max_hp);
    }

    #[test]
    fn moves_fill_slots_in_order() {
        let battler = test_battler();
        assert_eq!(battler.move_at(0).unwrap().move_, Move::Tackle);
        assert_eq!(battler.move_at(1).unwrap().move_, Move::Swift);
        assert!(battler.move_at(2).is_none());
    }
}
