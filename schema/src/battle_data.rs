use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

impl fmt::Display for MoveCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveCategory::Physical => write!(f, "Physical"),
            MoveCategory::Special => write!(f, "Special"),
            MoveCategory::Status => write!(f, "Status"),
        }
    }
}

/// The five stats that carry a battle stage. HP never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatType {
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
}

impl fmt::Display for StatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatType::Attack => write!(f, "Attack"),
            StatType::Defense => write!(f, "Defense"),
            StatType::SpecialAttack => write!(f, "Special Attack"),
            StatType::SpecialDefense => write!(f, "Special Defense"),
            StatType::Speed => write!(f, "Speed"),
        }
    }
}

impl StatType {
    pub fn from_api_name(name: &str) -> Option<StatType> {
        match name {
            "attack" => Some(StatType::Attack),
            "defense" => Some(StatType::Defense),
            "special-attack" => Some(StatType::SpecialAttack),
            "special-defense" => Some(StatType::SpecialDefense),
            "speed" => Some(StatType::Speed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    User,
    #[default]
    Opponent,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::User => write!(f, "User"),
            Target::Opponent => write!(f, "Opponent"),
        }
    }
}

/// Major status conditions. A combatant holds at most one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionKind {
    Poisoned,
    Burned,
    Paralyzed,
    Asleep,
    Confused,
    Frozen,
}

impl ConditionKind {
    pub const ALL: [ConditionKind; 6] = [
        ConditionKind::Poisoned,
        ConditionKind::Burned,
        ConditionKind::Paralyzed,
        ConditionKind::Asleep,
        ConditionKind::Confused,
        ConditionKind::Frozen,
    ];

    /// Duration used when a move inflicts the condition without naming one.
    /// Zero means the condition lasts until something clears it.
    pub fn default_turns(self) -> u8 {
        match self {
            ConditionKind::Asleep => 2,
            ConditionKind::Confused => 3,
            _ => 0,
        }
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            ConditionKind::Poisoned => "poison",
            ConditionKind::Burned => "burn",
            ConditionKind::Paralyzed => "paralysis",
            ConditionKind::Asleep => "sleep",
            ConditionKind::Confused => "confusion",
            ConditionKind::Frozen => "freeze",
        };
        write!(f, "{}", display_name)
    }
}
