use crate::{ConditionKind, MoveCategory, PokemonType, StatType, Target};
use serde::{Deserialize, Serialize};

fn always() -> f64 {
    1.0
}

fn single_hit() -> u8 {
    1
}

/// A condition a move may inflict. `chance` is a probability in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub condition: ConditionKind,
    #[serde(default = "always")]
    pub chance: f64,
    #[serde(default)]
    pub turns: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatChange {
    pub stat: StatType,
    pub stages: i8,
    pub target: Target,
    #[serde(default = "always")]
    pub chance: f64,
}

/// Static move template, shared by every creature that knows the move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveDefinition {
    pub name: String,
    pub category: MoveCategory,
    #[serde(default)]
    pub power: u16,
    pub base_pp: u8,
    /// `None` never misses.
    #[serde(default)]
    pub accuracy: Option<u8>,
    pub move_type: PokemonType,
    /// Who receives `status_effect` on a status move.
    #[serde(default)]
    pub target: Target,
    #[serde(default)]
    pub status_effect: Option<StatusEffect>,
    #[serde(default)]
    pub stat_change: Option<StatChange>,
    #[serde(default)]
    pub recoil_fraction: f64,
    #[serde(default)]
    pub healing_fraction: f64,
    #[serde(default = "single_hit")]
    pub hits: u8,
}

impl MoveDefinition {
    pub fn is_damaging(&self) -> bool {
        self.category != MoveCategory::Status
    }
}
