use crate::battle::combatant::Combatant;
use crate::battle::state::TurnRng;
use crate::battle::stats::{effective_attack, effective_defense};
use schema::{MoveDefinition, PokemonType};

pub const CRITICAL_HIT_CHANCE: u8 = 10;
pub const CRITICAL_HIT_MULTIPLIER: f64 = 1.5;

/// The result of resolving one hit of an offensive move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    pub damage: u16,
    pub critical: bool,
    pub type_multiplier: f64,
}

impl DamageOutcome {
    fn no_damage() -> Self {
        DamageOutcome {
            damage: 0,
            critical: false,
            type_multiplier: 1.0,
        }
    }
}

/// Damage for one hit of `move_def` from `attacker` against `defender`.
///
/// Status moves return zero damage without drawing from `rng`. Offensive
/// moves draw a critical-hit roll and then the jitter, in that order, and
/// always deal at least 1 damage. An immune defender still takes that
/// minimum point; `type_multiplier` stays 0 so callers can report it.
pub fn resolve_damage(
    attacker: &Combatant,
    defender: &Combatant,
    move_def: &MoveDefinition,
    rng: &mut TurnRng,
) -> DamageOutcome {
    if !move_def.is_damaging() {
        return DamageOutcome::no_damage();
    }

    let attack = f64::from(effective_attack(attacker, move_def.category));
    let defense = f64::from(effective_defense(defender, move_def.category).max(1));
    let type_multiplier = f64::from(PokemonType::type_effectiveness(move_def.move_type, defender.primary_type));

    let mut base = (f64::from(move_def.power) * attack / (defense * 2.0)).max(1.0) * type_multiplier;

    let critical = rng.roll(CRITICAL_HIT_CHANCE, "critical hit");
    if critical {
        base *= CRITICAL_HIT_MULTIPLIER;
    }

    let jitter = f64::from(rng.damage_jitter());
    let damage = (base + jitter).floor().max(1.0).min(f64::from(u16::MAX)) as u16;

    DamageOutcome {
        damage,
        critical,
        type_multiplier,
    }
}
