use crate::errors::DataFormatError;
use crate::move_library::find_move;
use crate::roster::validate_creature;
use schema::{BaseStats, CreatureDefinition, PokemonType};

/// A predefined team for quick battles
#[derive(Debug, Clone)]
pub struct PrefabTeam {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub members: Vec<PrefabCreature>,
}

#[derive(Debug, Clone)]
pub struct PrefabCreature {
    pub name: &'static str,
    pub primary_type: PokemonType,
    pub base_stats: BaseStats,
    pub moves: [&'static str; 4],
}

const fn stats(hp: u16, attack: u16, defense: u16, special_attack: u16, special_defense: u16, speed: u16) -> BaseStats {
    BaseStats {
        hp,
        attack,
        defense,
        special_attack,
        special_defense,
        speed,
    }
}

/// Get all available prefab teams
pub fn get_prefab_teams() -> Vec<PrefabTeam> {
    vec![
        PrefabTeam {
            id: "starters",
            name: "Starter Trio",
            description: "The three classic starters with balanced coverage",
            members: vec![
                PrefabCreature {
                    name: "Bulbasaur",
                    primary_type: PokemonType::Grass,
                    base_stats: stats(45, 49, 49, 65, 65, 45),
                    moves: ["Leaf Blade", "Sleep Powder", "Poison Jab", "Growl"],
                },
                PrefabCreature {
                    name: "Charmander",
                    primary_type: PokemonType::Fire,
                    base_stats: stats(39, 52, 43, 60, 50, 65),
                    moves: ["Flamethrower", "Fire Punch", "Swords Dance", "Quick Attack"],
                },
                PrefabCreature {
                    name: "Squirtle",
                    primary_type: PokemonType::Water,
                    base_stats: stats(44, 48, 65, 50, 64, 43),
                    moves: ["Hydro Pump", "Ice Beam", "Tail Whip", "Tackle"],
                },
            ],
        },
        PrefabTeam {
            id: "rivals",
            name: "Rival Squad",
            description: "Status tricks backed by heavy special attackers",
            members: vec![
                PrefabCreature {
                    name: "Pikachu",
                    primary_type: PokemonType::Electric,
                    base_stats: stats(35, 55, 40, 50, 50, 90),
                    moves: ["Thunderbolt", "Thunder Punch", "Quick Attack", "Tail Whip"],
                },
                PrefabCreature {
                    name: "Gengar",
                    primary_type: PokemonType::Ghost,
                    base_stats: stats(60, 65, 60, 130, 75, 110),
                    moves: ["Confuse Ray", "Psychic", "Poison Jab", "Amnesia"],
                },
                PrefabCreature {
                    name: "Machop",
                    primary_type: PokemonType::Fighting,
                    base_stats: stats(70, 80, 50, 35, 35, 35),
                    moves: ["Double Kick", "Ice Punch", "Swords Dance", "Growl"],
                },
            ],
        },
    ]
}

/// Get a specific prefab team by ID
pub fn get_prefab_team(team_id: &str) -> Option<PrefabTeam> {
    get_prefab_teams().into_iter().find(|team| team.id == team_id)
}

/// Builds the creature templates of a prefab team. Ids are `<team>-<index>`.
pub fn build_prefab_team(team_id: &str) -> Result<Vec<CreatureDefinition>, DataFormatError> {
    let team = get_prefab_team(team_id)
        .ok_or_else(|| DataFormatError::invalid("team_id", format!("no prefab team named '{}'", team_id)))?;

    team.members
        .iter()
        .enumerate()
        .map(|(index, member)| {
            let moveset = member
                .moves
                .iter()
                .map(|name| {
                    find_move(name)
                        .ok_or_else(|| DataFormatError::invalid("moves", format!("unknown move '{}'", name)))
                })
                .collect::<Result<Vec<_>, _>>()?;
            let creature = CreatureDefinition {
                id: format!("{}-{}", team.id, index),
                name: member.name.to_string(),
                primary_type: member.primary_type,
                base_stats: member.base_stats,
                moveset,
            };
            validate_creature(&creature)?;
            Ok(creature)
        })
        .collect()
}
