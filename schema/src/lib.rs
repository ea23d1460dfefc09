// Pokemon Arena Schema - Shared data definitions
// Everything here is immutable once built: creature templates and move
// definitions are handed to the battle engine as plain records.

pub use battle_data::*;
pub use move_data::*;
pub use pokemon_types::*;
pub use species_data::*;

pub mod battle_data;
pub mod move_data;
pub mod pokemon_types;
pub mod species_data;
