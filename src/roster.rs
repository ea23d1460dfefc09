//! Building, checking and storing the creature templates teams are made of.

use crate::battle::state::TurnRng;
use crate::errors::{DataFormatError, RosterError};
use crate::move_library::validate_move;
use schema::{BaseStats, CreatureDefinition, MoveDefinition, PokemonType, StatType};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// A creature record as served by the creature-data API. Only the fields
/// the battle needs are read; everything else is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatureRecord {
    pub name: String,
    pub types: Vec<TypeSlot>,
    pub stats: Vec<StatEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeSlot {
    pub slot: u32,
    #[serde(rename = "type")]
    pub type_info: NamedResource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatEntry {
    pub base_stat: u32,
    pub stat: NamedResource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedResource {
    pub name: String,
}

pub fn parse_creature_record(json: &str) -> Result<CreatureRecord, DataFormatError> {
    serde_json::from_str(json).map_err(|e| DataFormatError::Json(e.to_string()))
}

/// Turns an API record into a battle-ready template with a fresh id and
/// `moves_per_creature` distinct moves drawn from `library`.
pub fn creature_from_record(
    record: &CreatureRecord,
    library: &[Arc<MoveDefinition>],
    moves_per_creature: usize,
    rng: &mut TurnRng,
) -> Result<CreatureDefinition, DataFormatError> {
    if record.name.trim().is_empty() {
        return Err(DataFormatError::MissingField("name".to_string()));
    }

    let primary = record
        .types
        .iter()
        .min_by_key(|slot| slot.slot)
        .ok_or_else(|| DataFormatError::MissingField("types".to_string()))?;
    let primary_type = PokemonType::from_api_name(&primary.type_info.name)
        .ok_or_else(|| DataFormatError::UnknownType(primary.type_info.name.clone()))?;

    let definition = CreatureDefinition {
        id: Uuid::new_v4().to_string(),
        name: display_name(&record.name),
        primary_type,
        base_stats: base_stats(&record.stats)?,
        moveset: assign_random_moves(library, moves_per_creature, rng),
    };
    validate_creature(&definition)?;
    Ok(definition)
}

fn base_stats(entries: &[StatEntry]) -> Result<BaseStats, DataFormatError> {
    let mut hp = None;
    let mut stats: [Option<u16>; 5] = [None; 5];

    for entry in entries {
        let value = u16::try_from(entry.base_stat)
            .map_err(|_| DataFormatError::invalid(format!("stats.{}", entry.stat.name), "out of range"))?;
        if entry.stat.name == "hp" {
            hp = Some(value);
            continue;
        }
        let stat = StatType::from_api_name(&entry.stat.name)
            .ok_or_else(|| DataFormatError::UnknownStat(entry.stat.name.clone()))?;
        stats[stat_slot(stat)] = Some(value);
    }

    let require = |value: Option<u16>, name: &str| {
        value.ok_or_else(|| DataFormatError::MissingField(format!("stats.{}", name)))
    };

    Ok(BaseStats {
        hp: require(hp, "hp")?,
        attack: require(stats[0], "attack")?,
        defense: require(stats[1], "defense")?,
        special_attack: require(stats[2], "special-attack")?,
        special_defense: require(stats[3], "special-defense")?,
        speed: require(stats[4], "speed")?,
    })
}

fn stat_slot(stat: StatType) -> usize {
    match stat {
        StatType::Attack => 0,
        StatType::Defense => 1,
        StatType::SpecialAttack => 2,
        StatType::SpecialDefense => 3,
        StatType::Speed => 4,
    }
}

// "mr-mime" -> "Mr-mime"
fn display_name(api_name: &str) -> String {
    let mut chars = api_name.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Picks up to `count` distinct moves from `library` uniformly at random.
pub fn assign_random_moves(
    library: &[Arc<MoveDefinition>],
    count: usize,
    rng: &mut TurnRng,
) -> Vec<Arc<MoveDefinition>> {
    let mut pool: Vec<Arc<MoveDefinition>> = library.to_vec();
    let mut chosen = Vec::with_capacity(count.min(pool.len()));
    while chosen.len() < count && !pool.is_empty() {
        let index = rng.pick_index(pool.len(), "move assignment");
        chosen.push(pool.swap_remove(index));
    }
    chosen
}

/// Checks a template before it may enter a battle.
pub fn validate_creature(definition: &CreatureDefinition) -> Result<(), DataFormatError> {
    if definition.id.trim().is_empty() {
        return Err(DataFormatError::MissingField("id".to_string()));
    }
    if definition.name.trim().is_empty() {
        return Err(DataFormatError::MissingField("name".to_string()));
    }
    if definition.base_stats.hp == 0 {
        return Err(DataFormatError::invalid(
            format!("{}.base_stats.hp", definition.name),
            "must be greater than 0",
        ));
    }
    if definition.moveset.is_empty() {
        return Err(DataFormatError::MissingField(format!("{}.moveset", definition.name)));
    }
    for move_def in &definition.moveset {
        validate_move(move_def)?;
    }
    Ok(())
}

/// Writes a team as a pretty-printed JSON array of creature templates.
pub fn save_team(path: &Path, team: &[CreatureDefinition]) -> Result<(), RosterError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_string_pretty(team)?;
    fs::write(path, data)?;
    tracing::info!(path = %path.display(), size = team.len(), "team saved");
    Ok(())
}

/// Reads a team saved by `save_team`, rejecting it if any member is malformed.
pub fn load_team(path: &Path) -> Result<Vec<CreatureDefinition>, RosterError> {
    let data = fs::read_to_string(path)?;
    let team: Vec<CreatureDefinition> = serde_json::from_str(&data)?;
    for creature in &team {
        validate_creature(creature)?;
    }
    tracing::info!(path = %path.display(), size = team.len(), "team loaded");
    Ok(team)
}
