use crate::battle::stats::{effective_stat, stage_delta};
use schema::{BaseStats, ConditionKind, CreatureDefinition, MoveDefinition, PokemonType, StatType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A known move together with its remaining PP for this battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveSlot {
    pub definition: Arc<MoveDefinition>,
    pub current_pp: u8,
}

impl MoveSlot {
    /// Create a new move slot with full PP
    pub fn new(definition: Arc<MoveDefinition>) -> Self {
        let current_pp = definition.base_pp;
        MoveSlot { definition, current_pp }
    }

    pub fn has_pp(&self) -> bool {
        self.current_pp > 0
    }

    /// Use the move (decrease PP)
    pub fn use_pp(&mut self) -> bool {
        if self.current_pp > 0 {
            self.current_pp -= 1;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatStages {
    pub attack: i8,
    pub defense: i8,
    pub special_attack: i8,
    pub special_defense: i8,
    pub speed: i8,
}

impl StatStages {
    pub fn get(&self, stat: StatType) -> i8 {
        match stat {
            StatType::Attack => self.attack,
            StatType::Defense => self.defense,
            StatType::SpecialAttack => self.special_attack,
            StatType::SpecialDefense => self.special_defense,
            StatType::Speed => self.speed,
        }
    }

    pub fn set(&mut self, stat: StatType, stage: i8) {
        let slot = match stat {
            StatType::Attack => &mut self.attack,
            StatType::Defense => &mut self.defense,
            StatType::SpecialAttack => &mut self.special_attack,
            StatType::SpecialDefense => &mut self.special_defense,
            StatType::Speed => &mut self.speed,
        };
        *slot = stage;
    }
}

/// Per-battle state of one creature. Owned by exactly one `BattleSession`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub creature_id: String,
    pub name: String,
    pub primary_type: PokemonType,
    pub base_stats: BaseStats,
    pub current_hp: u16,
    pub max_hp: u16,
    pub moves: Vec<MoveSlot>,
    /// Single condition slot.
    pub condition: Option<ConditionKind>,
    /// Zero with a condition set means the condition does not expire on its own.
    pub condition_turns_remaining: u8,
    pub stat_stages: StatStages,
}

impl Combatant {
    /// Fresh battle instance: full HP and PP, no condition, neutral stages.
    pub fn from_definition(definition: &CreatureDefinition) -> Self {
        Combatant {
            creature_id: definition.id.clone(),
            name: definition.name.clone(),
            primary_type: definition.primary_type,
            base_stats: definition.base_stats,
            current_hp: definition.base_stats.hp,
            max_hp: definition.base_stats.hp,
            moves: definition.moveset.iter().cloned().map(MoveSlot::new).collect(),
            condition: None,
            condition_turns_remaining: 0,
            stat_stages: StatStages::default(),
        }
    }

    pub fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }

    /// Subtracts `damage`, flooring HP at 0. Returns true if this knocked the combatant out.
    pub fn take_damage(&mut self, damage: u16) -> bool {
        let was_fainted = self.is_fainted();
        self.current_hp = self.current_hp.saturating_sub(damage);
        !was_fainted && self.is_fainted()
    }

    /// Restores up to `amount` HP without exceeding max. Returns the HP actually gained.
    pub fn heal(&mut self, amount: u16) -> u16 {
        if self.is_fainted() {
            return 0;
        }
        let new_hp = self.current_hp.saturating_add(amount).min(self.max_hp);
        let gained = new_hp - self.current_hp;
        self.current_hp = new_hp;
        gained
    }

    pub fn hp_ratio(&self) -> f64 {
        if self.max_hp == 0 {
            return 0.0;
        }
        f64::from(self.current_hp) / f64::from(self.max_hp)
    }

    /// Returns `(old_stage, new_stage)`. Always succeeds; the stage is clamped to [-6, 6].
    pub fn apply_stat_change(&mut self, stat: StatType, stages: i8) -> (i8, i8) {
        let old_stage = self.stat_stages.get(stat);
        let new_stage = stage_delta(old_stage, stages);
        self.stat_stages.set(stat, new_stage);
        (old_stage, new_stage)
    }

    /// Sets `kind` if the condition slot is empty. Any existing condition,
    /// identical or not, makes this a no-op. Returns whether it was applied.
    pub fn apply_condition(&mut self, kind: ConditionKind, turns: u8) -> bool {
        if self.is_fainted() || self.condition.is_some() {
            return false;
        }
        self.condition = Some(kind);
        self.condition_turns_remaining = turns;
        true
    }

    pub fn clear_condition(&mut self) -> Option<ConditionKind> {
        self.condition_turns_remaining = 0;
        self.condition.take()
    }

    pub fn has_usable_move(&self) -> bool {
        self.moves.iter().any(MoveSlot::has_pp)
    }

    /// Base stat adjusted by the current stage for that stat.
    pub fn effective_stat(&self, stat: StatType) -> u16 {
        effective_stat(self.base_stats.get(stat), self.stat_stages.get(stat))
    }
}
