//! Pokemon Arena Battle Engine
//!
//! A turn-based, two-sided creature battle: each side fields a small team,
//! one creature active at a time, trading moves until one team has nobody
//! left standing. The engine is synchronous; presentation concerns such as
//! the opponent's "thinking" delay live outside it.
//!
//! A memory-matching card game sits alongside the battle as a second,
//! independent mini-game.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod config;
pub mod errors;
pub mod memory_game;
pub mod move_library;
pub mod prefab_teams;
pub mod roster;
pub mod scheduler;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
pub use schema::{
    BaseStats, ConditionKind, CreatureDefinition, MoveCategory, MoveDefinition, PokemonType, StatChange,
    StatType, StatusEffect, Target,
};

// --- From this crate's modules (`src/`) ---

// Session controller and the state it exposes.
pub use battle::engine::PlayerAction;
pub use battle::runner::{BattleRunner, NextInput};
pub use battle::state::{BattleEvent, BattleSession, Phase, Side, TurnRng};

pub use config::{BattleConfig, PlayerControl};

// The memory-matching mini-game and the timer both games share.
pub use memory_game::{CardRecord, FlipOutcome, GameCard, MemoryGame};
pub use scheduler::DeferredTimer;

// Crate-specific error and result types.
pub use errors::{
    BattleEngineError, BattleResult, ConfigError, DataFormatError, IllegalActionError, InvalidTeamError,
    MemoryGameError, RosterError,
};
