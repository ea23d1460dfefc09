use crate::battle::combatant::Combatant;
use crate::battle::runner::BattleRunner;
use crate::battle::state::{BattleSession, TurnRng};
use crate::config::BattleConfig;
use crate::errors::BattleResult;
use crate::move_library::find_move;
use schema::{BaseStats, ConditionKind, CreatureDefinition, MoveCategory, MoveDefinition, PokemonType, Target};
use std::sync::Arc;

/// A builder for test creatures with flat 100 stats and Tackle.
///
/// # Example
/// ```
/// let pikachu = TestCreatureBuilder::new("Pikachu", PokemonType::Electric)
///     .with_moves(&["Thunderbolt"])
///     .with_condition(ConditionKind::Paralyzed, 0)
///     .build();
/// ```
pub struct TestCreatureBuilder {
    id: String,
    name: String,
    primary_type: PokemonType,
    base_stats: BaseStats,
    moves: Vec<Arc<MoveDefinition>>,
    condition: Option<(ConditionKind, u8)>,
    current_hp: Option<u16>,
}

impl TestCreatureBuilder {
    pub fn new(name: &str, primary_type: PokemonType) -> Self {
        Self {
            id: name.to_lowercase(),
            name: name.to_string(),
            primary_type,
            base_stats: BaseStats {
                hp: 100,
                attack: 100,
                defense: 100,
                special_attack: 100,
                special_defense: 100,
                speed: 100,
            },
            moves: Vec::new(),
            condition: None,
            current_hp: None,
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn with_max_hp(mut self, hp: u16) -> Self {
        self.base_stats.hp = hp;
        self
    }

    /// Moves from the built-in library, by name.
    pub fn with_moves(mut self, names: &[&str]) -> Self {
        for name in names {
            let definition = find_move(name).unwrap_or_else(|| panic!("no built-in move named {}", name));
            self.moves.push(definition);
        }
        self
    }

    pub fn with_move(mut self, definition: MoveDefinition) -> Self {
        self.moves.push(Arc::new(definition));
        self
    }

    pub fn with_condition(mut self, condition: ConditionKind, turns: u8) -> Self {
        self.condition = Some((condition, turns));
        self
    }

    /// Sets the current HP. If not set, HP will be max.
    pub fn with_hp(mut self, hp: u16) -> Self {
        self.current_hp = Some(hp);
        self
    }

    /// The template, with Tackle if no moves were given.
    pub fn build_definition(&self) -> CreatureDefinition {
        let moveset = if self.moves.is_empty() {
            vec![find_move("Tackle").unwrap()]
        } else {
            self.moves.clone()
        };
        CreatureDefinition {
            id: self.id.clone(),
            name: self.name.clone(),
            primary_type: self.primary_type,
            base_stats: self.base_stats,
            moveset,
        }
    }

    pub fn build(self) -> Combatant {
        let mut combatant = Combatant::from_definition(&self.build_definition());
        if let Some(hp) = self.current_hp {
            combatant.current_hp = hp;
        }
        if let Some((condition, turns)) = self.condition {
            combatant.condition = Some(condition);
            combatant.condition_turns_remaining = turns;
        }
        combatant
    }
}

/// A never-missing move with no side effects.
pub fn custom_move(name: &str, category: MoveCategory, move_type: PokemonType, power: u16) -> MoveDefinition {
    MoveDefinition {
        name: name.to_string(),
        category,
        power,
        base_pp: 10,
        accuracy: None,
        move_type,
        target: Target::Opponent,
        status_effect: None,
        stat_change: None,
        recoil_fraction: 0.0,
        healing_fraction: 0.0,
        hits: 1,
    }
}

/// Creates a standard 1v1 session for testing.
pub fn create_test_session(a: Combatant, b: Combatant) -> BattleSession {
    BattleSession::new(vec![a], vec![b])
}

/// A session where side A already passed its turn start and may act.
pub fn ready_session(team_a: Vec<Combatant>, team_b: Vec<Combatant>) -> BattleSession {
    let mut session = BattleSession::new(team_a, team_b);
    session.turn_ready = true;
    session
}

/// Creates a `TurnRng` with a long list of default values (50).
/// 50 never crits, hits any accuracy of 50 or more, and adds +2 jitter.
pub fn predictable_rng() -> TurnRng {
    TurnRng::new_for_test(vec![50; 100])
}

/// Both sides human, so tests drive every action.
pub fn hot_seat_runner(outcomes: Vec<u8>) -> BattleRunner {
    BattleRunner::with_rng(BattleConfig::hot_seat(), TurnRng::new_for_test(outcomes))
}

/// Side B is played by the built-in AI.
pub fn ai_runner(outcomes: Vec<u8>) -> BattleRunner {
    BattleRunner::with_rng(BattleConfig::default(), TurnRng::new_for_test(outcomes))
}

pub fn definitions(builders: &[TestCreatureBuilder]) -> Vec<CreatureDefinition> {
    builders.iter().map(TestCreatureBuilder::build_definition).collect()
}

/// Helper function to assert that a Result is Ok and return the value.
pub fn assert_ok<T>(result: BattleResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("Expected Ok but got error: {}", err),
    }
}

pub fn last_log_line(session: &BattleSession) -> &str {
    session.log.last().map(String::as_str).unwrap_or("")
}

pub fn log_contains(session: &BattleSession, line: &str) -> bool {
    session.log.iter().any(|entry| entry == line)
}
