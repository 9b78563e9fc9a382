use crate::pokemon::StatusCondition;
use crate::side::StatType;
use serde::{Deserialize, Serialize};

/// Every move the reference mechanics know about.
///
/// The set is deliberately small: enough coverage of the interesting
/// mechanical categories (priority, guaranteed hit, secondary effects,
/// self-switching, healing) to exercise every branch of the search engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Tackle,
    Slash,
    QuickAttack,
    DoubleEdge,
    Thunderbolt,
    Flamethrower,
    IceBeam,
    Swift,
    HydroPump,
    Screech,
    Toxic,
    Recover,
    UTurn,
}

impl Move {
    /// All known moves, in a stable order. Used by data-driven tests.
    pub const ALL: [Move; 13] = [
        Move::Tackle,
        Move::Slash,
        Move::QuickAttack,
        Move::DoubleEdge,
        Move::Thunderbolt,
        Move::Flamethrower,
        Move::IceBeam,
        Move::Swift,
        Move::HydroPump,
        Move::Screech,
        Move::Toxic,
        Move::Recover,
        Move::UTurn,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

/// A secondary consequence of a move beyond its direct damage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveEffect {
    /// Inflicts a status condition on the target with the given chance
    /// (0-100). Fails silently if the target already has a status.
    InflictStatus { status: StatusCondition, chance: u8 },
    /// Lowers one of the target's stat stages with the given chance (0-100).
    LowerStat { stat: StatType, stages: i8, chance: u8 },
    /// Heals the user by the given fraction of its maximum HP.
    HealUser { fraction: f64 },
    /// The user deals recoil damage to itself equal to the given fraction
    /// of the damage dealt.
    Recoil { fraction: f64 },
    /// After the move resolves, the user must immediately choose a
    /// replacement from its bench (the "extra decision" mechanism).
    SwitchesUser,
}

/// Static data for one move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveData {
    pub category: MoveCategory,
    /// Base power. `None` for moves that deal no direct damage.
    pub power: Option<u16>,
    /// Hit chance in percent. `None` means the move never misses.
    pub accuracy: Option<u8>,
    /// Priority tier; higher resolves first regardless of speed.
    pub priority: i8,
    pub max_pp: u8,
    pub effect: Option<MoveEffect>,
}

/// Look up the static data for a move.
pub fn get_move_data(move_: Move) -> &'static MoveData {
    match move_ {
        Move::Tackle => &MoveData {
            category: MoveCategory::Physical,
            power: Some(50),
            accuracy: Some(100),
            priority: 0,
            max_pp: 35,
            effect: None,
        },
        Move::Slash => &MoveData {
            category: MoveCategory::Physical,
            power: Some(70),
            accuracy: Some(100),
            priority: 0,
            max_pp: 20,
            effect: None,
        },
        Move::QuickAttack => &MoveData {
            category: MoveCategory::Physical,
            power: Some(40),
            accuracy: Some(100),
            priority: 1,
            max_pp: 30,
            effect: None,
        },
        Move::DoubleEdge => &MoveData {
            category: MoveCategory::Physical,
            power: Some(100),
            accuracy: Some(100),
            priority: 0,
            max_pp: 15,
            effect: Some(MoveEffect::Recoil { fraction: 0.25 }),
        },
        Move::Thunderbolt => &MoveData {
            category: MoveCategory::Special,
            power: Some(90),
            accuracy: Some(100),
            priority: 0,
            max_pp: 15,
            effect: Some(MoveEffect::InflictStatus {
                status: StatusCondition::Paralysis,
                chance: 30,
            }),
        },
        Move::Flamethrower => &MoveData {
            category: MoveCategory::Special,
            power: Some(90),
            accuracy: Some(100),
            priority: 0,
            max_pp: 15,
            effect: Some(MoveEffect::InflictStatus {
                status: StatusCondition::Burn,
                chance: 10,
            }),
        },
        Move::IceBeam => &MoveData {
            category: MoveCategory::Special,
            power: Some(90),
            accuracy: Some(100),
            priority: 0,
            max_pp: 10,
            effect: Some(MoveEffect::InflictStatus {
                status: StatusCondition::Freeze,
                chance: 10,
            }),
        },
        Move::Swift => &MoveData {
            category: MoveCategory::Special,
            power: Some(60),
            accuracy: None,
            priority: 0,
            max_pp: 20,
            effect: None,
        },
        Move::HydroPump => &MoveData {
            category: MoveCategory::Special,
            power: Some(110),
            accuracy: Some(80),
            priority: 0,
            max_pp: 5,
            effect: None,
        },
        Move::Screech => &MoveData {
            category: MoveCategory::Status,
            power: None,
            accuracy: Some(85),
            priority: 0,
            max_pp: 40,
            effect: Some(MoveEffect::LowerStat {
                stat: StatType::Defense,
                stages: 2,
                chance: 100,
            }),
        },
        Move::Toxic => &MoveData {
            category: MoveCategory::Status,
            power: None,
            accuracy: Some(90),
            priority: 0,
            max_pp: 10,
            effect: Some(MoveEffect::InflictStatus {
                status: StatusCondition::Poison,
                chance: 100,
            }),
        },
        Move::Recover => &MoveData {
            category: MoveCategory::Status,
            power: None,
            accuracy: None,
            priority: 0,
            max_pp: 10,
            effect: Some(MoveEffect::HealUser { fraction: 0.5 }),
        },
        Move::UTurn => &MoveData {
            category: MoveCategory::Physical,
            power: Some(70),
            accuracy: Some(100),
            priority: 0,
            max_pp: 20,
            effect: Some(MoveEffect::SwitchesUser),
        },
    }
}

/// Get the maximum PP for a move.
pub fn get_move_max_pp(move_: Move) -> u8 {
    get_move_data(move_).max_pp
}
