use crate::errors::{DataFormatError, RosterError};
use schema::{
    ConditionKind, MoveCategory, MoveDefinition, PokemonType, StatChange, StatType, StatusEffect, Target,
};
use std::fs;
use std::path::Path;
use std::sync::{Arc, LazyLock};

// Built-in generic moves, shared by every creature that is assigned one.
static GENERIC_MOVES: LazyLock<Vec<Arc<MoveDefinition>>> =
    LazyLock::new(|| build_generic_moves().into_iter().map(Arc::new).collect());

static STRUGGLE: LazyLock<Arc<MoveDefinition>> = LazyLock::new(|| {
    Arc::new(MoveDefinition {
        recoil_fraction: 0.5,
        accuracy: None,
        ..damaging("Struggle", MoveCategory::Physical, PokemonType::Normal, 50, 1, None)
    })
});

/// The built-in move set creatures draw their movesets from.
pub fn generic_moves() -> &'static [Arc<MoveDefinition>] {
    &GENERIC_MOVES
}

/// Case-insensitive lookup in the built-in move set.
pub fn find_move(name: &str) -> Option<Arc<MoveDefinition>> {
    GENERIC_MOVES
        .iter()
        .find(|m| m.name.eq_ignore_ascii_case(name))
        .cloned()
}

/// Used in place of a chosen move when the user has no PP left on any move.
pub fn struggle() -> Arc<MoveDefinition> {
    Arc::clone(&STRUGGLE)
}

/// Rejects move records that the battle engine cannot resolve sensibly.
pub fn validate_move(definition: &MoveDefinition) -> Result<(), DataFormatError> {
    let field = |name: &str| format!("{}.{}", definition.name, name);

    if definition.name.trim().is_empty() {
        return Err(DataFormatError::MissingField("name".to_string()));
    }
    if definition.base_pp == 0 {
        return Err(DataFormatError::invalid(field("base_pp"), "must be greater than 0"));
    }
    if let Some(accuracy) = definition.accuracy {
        if accuracy == 0 || accuracy > 100 {
            return Err(DataFormatError::invalid(field("accuracy"), "must be within 1..=100"));
        }
    }
    if definition.is_damaging() && definition.power == 0 {
        return Err(DataFormatError::invalid(field("power"), "damaging moves need power"));
    }
    if definition.hits == 0 {
        return Err(DataFormatError::invalid(field("hits"), "must be at least 1"));
    }
    for (name, value) in [
        ("recoil_fraction", definition.recoil_fraction),
        ("healing_fraction", definition.healing_fraction),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(DataFormatError::invalid(field(name), "must be within [0, 1]"));
        }
    }
    if let Some(effect) = &definition.status_effect {
        if !(0.0..=1.0).contains(&effect.chance) {
            return Err(DataFormatError::invalid(field("status_effect.chance"), "must be within [0, 1]"));
        }
    }
    if let Some(change) = &definition.stat_change {
        if !(0.0..=1.0).contains(&change.chance) {
            return Err(DataFormatError::invalid(field("stat_change.chance"), "must be within [0, 1]"));
        }
        if change.stages == 0 || !(-6..=6).contains(&change.stages) {
            return Err(DataFormatError::invalid(field("stat_change.stages"), "must be within -6..=6 and non-zero"));
        }
    }
    Ok(())
}

/// Parses a RON list of move definitions, validating each.
pub fn parse_move_library(content: &str) -> Result<Vec<Arc<MoveDefinition>>, RosterError> {
    let definitions: Vec<MoveDefinition> = ron::from_str(content)?;
    definitions
        .into_iter()
        .map(|definition| {
            validate_move(&definition)?;
            Ok(Arc::new(definition))
        })
        .collect()
}

/// Loads a custom move library from a RON file.
pub fn load_move_library(path: &Path) -> Result<Vec<Arc<MoveDefinition>>, RosterError> {
    let content = fs::read_to_string(path)?;
    let moves = parse_move_library(&content)?;
    tracing::info!(path = %path.display(), count = moves.len(), "loaded move library");
    Ok(moves)
}

fn damaging(
    name: &str,
    category: MoveCategory,
    move_type: PokemonType,
    power: u16,
    base_pp: u8,
    status_effect: Option<StatusEffect>,
) -> MoveDefinition {
    MoveDefinition {
        name: name.to_string(),
        category,
        power,
        base_pp,
        accuracy: Some(100),
        move_type,
        target: Target::Opponent,
        status_effect,
        stat_change: None,
        recoil_fraction: 0.0,
        healing_fraction: 0.0,
        hits: 1,
    }
}

fn status(name: &str, move_type: PokemonType, base_pp: u8, target: Target) -> MoveDefinition {
    MoveDefinition {
        name: name.to_string(),
        category: MoveCategory::Status,
        power: 0,
        base_pp,
        accuracy: Some(100),
        move_type,
        target,
        status_effect: None,
        stat_change: None,
        recoil_fraction: 0.0,
        healing_fraction: 0.0,
        hits: 1,
    }
}

fn inflicts(condition: ConditionKind, chance: f64) -> Option<StatusEffect> {
    Some(StatusEffect {
        condition,
        chance,
        turns: None,
    })
}

fn stat_change(stat: StatType, stages: i8, target: Target) -> Option<StatChange> {
    Some(StatChange {
        stat,
        stages,
        target,
        chance: 1.0,
    })
}

fn build_generic_moves() -> Vec<MoveDefinition> {
    use MoveCategory::{Physical, Special};
    use PokemonType::*;

    vec![
        // Physical
        damaging("Tackle", Physical, Normal, 40, 35, None),
        damaging("Quick Attack", Physical, Normal, 40, 30, None),
        damaging("Poison Jab", Physical, Poison, 80, 20, inflicts(ConditionKind::Poisoned, 0.3)),
        damaging("Leaf Blade", Physical, Grass, 90, 15, None),
        damaging("Fire Punch", Physical, Fire, 75, 15, inflicts(ConditionKind::Burned, 0.1)),
        damaging("Thunder Punch", Physical, Electric, 75, 15, inflicts(ConditionKind::Paralyzed, 0.1)),
        damaging("Ice Punch", Physical, Ice, 75, 15, inflicts(ConditionKind::Frozen, 0.1)),
        MoveDefinition {
            hits: 2,
            ..damaging("Double Kick", Physical, Fighting, 30, 30, None)
        },
        // Special
        damaging("Flamethrower", Special, Fire, 90, 15, inflicts(ConditionKind::Burned, 0.1)),
        MoveDefinition {
            accuracy: Some(80),
            ..damaging("Hydro Pump", Special, Water, 110, 5, None)
        },
        damaging("Thunderbolt", Special, Electric, 90, 15, inflicts(ConditionKind::Paralyzed, 0.1)),
        damaging("Ice Beam", Special, Ice, 90, 10, inflicts(ConditionKind::Frozen, 0.1)),
        MoveDefinition {
            stat_change: Some(StatChange {
                stat: StatType::SpecialDefense,
                stages: -1,
                target: Target::Opponent,
                chance: 0.1,
            }),
            ..damaging("Psychic", Special, Psychic, 90, 10, None)
        },
        // Status
        MoveDefinition {
            stat_change: stat_change(StatType::Attack, -1, Target::Opponent),
            ..status("Growl", Normal, 40, Target::Opponent)
        },
        MoveDefinition {
            stat_change: stat_change(StatType::Defense, -1, Target::Opponent),
            ..status("Tail Whip", Normal, 30, Target::Opponent)
        },
        MoveDefinition {
            stat_change: stat_change(StatType::Attack, 2, Target::User),
            ..status("Swords Dance", Normal, 20, Target::User)
        },
        MoveDefinition {
            stat_change: stat_change(StatType::SpecialDefense, 2, Target::User),
            ..status("Amnesia", Psychic, 20, Target::User)
        },
        MoveDefinition {
            accuracy: Some(75),
            status_effect: Some(StatusEffect {
                condition: ConditionKind::Asleep,
                chance: 1.0,
                turns: Some(2),
            }),
            ..status("Sleep Powder", Grass, 15, Target::Opponent)
        },
        MoveDefinition {
            status_effect: Some(StatusEffect {
                condition: ConditionKind::Confused,
                chance: 1.0,
                turns: Some(3),
            }),
            ..status("Confuse Ray", Ghost, 10, Target::Opponent)
        },
    ]
}
