use crate::battle::combatant::Combatant;
use schema::{MoveCategory, StatType};

pub const MIN_STAGE: i8 = -6;
pub const MAX_STAGE: i8 = 6;

/// Stage multipliers in hundredths, indexed by `stage + 6`.
/// Kept as integers so `effective_stat` floors exactly.
const STAGE_MULTIPLIERS: [u32; 13] = [25, 28, 33, 40, 50, 66, 100, 150, 200, 250, 300, 350, 400];

/// Multiplier applied to a stat at the given stage (-6..=6).
pub fn stage_multiplier(stage: i8) -> f64 {
    f64::from(STAGE_MULTIPLIERS[stage_index(stage)]) / 100.0
}

/// Effective stat for a base value at a stage, floored to an integer.
pub fn effective_stat(base: u16, stage: i8) -> u16 {
    let scaled = u32::from(base) * STAGE_MULTIPLIERS[stage_index(stage)] / 100;
    scaled.min(u32::from(u16::MAX)) as u16
}

/// Applies `delta` to `current`, clamped to the legal stage range.
pub fn stage_delta(current: i8, delta: i8) -> i8 {
    (i16::from(current) + i16::from(delta)).clamp(i16::from(MIN_STAGE), i16::from(MAX_STAGE)) as i8
}

fn stage_index(stage: i8) -> usize {
    (stage.clamp(MIN_STAGE, MAX_STAGE) - MIN_STAGE) as usize
}

/// The (attack, defense) stat pair a damaging move of this category uses.
pub fn offensive_stats(category: MoveCategory) -> Option<(StatType, StatType)> {
    match category {
        MoveCategory::Physical => Some((StatType::Attack, StatType::Defense)),
        MoveCategory::Special => Some((StatType::SpecialAttack, StatType::SpecialDefense)),
        MoveCategory::Status => None,
    }
}

/// Calculate effective attack stat for a move category including stat stages
pub fn effective_attack(pokemon: &Combatant, category: MoveCategory) -> u16 {
    match offensive_stats(category) {
        Some((attack_stat, _)) => pokemon.effective_stat(attack_stat),
        None => 0,
    }
}

/// Calculate effective defense stat for a move category including stat stages
pub fn effective_defense(pokemon: &Combatant, category: MoveCategory) -> u16 {
    match offensive_stats(category) {
        Some((_, defense_stat)) => pokemon.effective_stat(defense_stat),
        None => 0,
    }
}
