//! Battle configuration, loadable from a RON file.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Who supplies the actions for one side of the battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerControl {
    Human,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Largest team `initialize` accepts.
    pub team_size: usize,
    pub moves_per_creature: usize,
    pub player_a: PlayerControl,
    pub player_b: PlayerControl,
    /// HP ratio under which the AI retreats its active creature.
    pub ai_switch_threshold: f64,
    /// Presentation delay before an AI turn. The engine itself never waits.
    pub ai_delay_ms: u64,
    pub seed: Option<u64>,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            team_size: 3,
            moves_per_creature: 4,
            player_a: PlayerControl::Human,
            player_b: PlayerControl::Ai,
            ai_switch_threshold: 0.3,
            ai_delay_ms: 800,
            seed: None,
        }
    }
}

impl BattleConfig {
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    /// Both sides controlled by people sharing one screen.
    pub fn hot_seat() -> Self {
        Self {
            player_b: PlayerControl::Human,
            ..Self::default()
        }
    }
}
