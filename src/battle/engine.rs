use crate::battle::calculators::resolve_damage;
use crate::battle::combatant::Combatant;
use crate::battle::state::{
    ActionFailureReason, BattleEvent, BattleSession, EventBus, Phase, Side, TurnRng,
};
use crate::errors::IllegalActionError;
use crate::move_library::struggle;
use schema::{ConditionKind, MoveDefinition, StatChange, StatType, StatusEffect, Target};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const THAW_CHANCE: u8 = 20;
pub const FULL_PARALYSIS_CHANCE: u8 = 25;
pub const CONFUSION_SELF_HIT_CHANCE: u8 = 50;

/// An action chosen by whoever controls a side.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlayerAction {
    // Position in the active creature's move list.
    UseMove { move_index: usize },
    SwitchPokemon { target_id: String },
    /// Only legal once every move of the active creature is out of PP.
    Struggle,
}

/// How the start-of-turn status pass ended for the acting side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStart {
    /// The side may now choose an action.
    Ready,
    /// A condition used up the turn; ownership has already passed on.
    Consumed,
    /// A faint was handled; the phase may no longer be `Ongoing`.
    Interrupted,
}

/// Runs the status checks for `session.turn_owner` before it may act.
pub fn resolve_turn_start(session: &mut BattleSession, rng: &mut TurnRng, bus: &mut EventBus) -> TurnStart {
    let side = session.turn_owner;
    bus.push(BattleEvent::TurnStarted {
        side,
        turn_number: session.turn_number,
    });

    // Left at 0 HP by an exchange that ended early, e.g. on a recoil knockout.
    if session.active(side).is_fainted() {
        handle_faint(session, side, side, bus);
        return TurnStart::Interrupted;
    }

    let Some(condition) = session.active(side).condition else {
        return TurnStart::Ready;
    };

    let outcome = match condition {
        ConditionKind::Poisoned | ConditionKind::Burned => {
            let combatant = session.active_mut(side);
            let damage = residual_damage(combatant.max_hp, condition);
            let fainted = combatant.take_damage(damage);
            bus.push(BattleEvent::StatusDamage {
                target: combatant.name.clone(),
                condition,
                damage,
                remaining_hp: combatant.current_hp,
            });
            if fainted {
                handle_faint(session, side, side.opponent(), bus);
                return TurnStart::Interrupted;
            }
            tick_timed_condition(combatant, bus);
            TurnStart::Ready
        }
        ConditionKind::Frozen => {
            if rng.roll(THAW_CHANCE, "thaw") {
                cure(session.active_mut(side), bus);
                TurnStart::Ready
            } else {
                prevent(session.active(side), ActionFailureReason::IsFrozen, bus);
                TurnStart::Consumed
            }
        }
        ConditionKind::Paralyzed => {
            if rng.roll(FULL_PARALYSIS_CHANCE, "full paralysis") {
                prevent(session.active(side), ActionFailureReason::IsParalyzed, bus);
                TurnStart::Consumed
            } else {
                TurnStart::Ready
            }
        }
        ConditionKind::Asleep => {
            let combatant = session.active_mut(side);
            combatant.condition_turns_remaining = combatant.condition_turns_remaining.saturating_sub(1);
            if combatant.condition_turns_remaining > 0 {
                prevent(combatant, ActionFailureReason::IsAsleep, bus);
                TurnStart::Consumed
            } else {
                cure(combatant, bus);
                TurnStart::Ready
            }
        }
        ConditionKind::Confused => {
            let combatant = session.active_mut(side);
            combatant.condition_turns_remaining = combatant.condition_turns_remaining.saturating_sub(1);
            if combatant.condition_turns_remaining == 0 {
                cure(combatant, bus);
                TurnStart::Ready
            } else {
                prevent(combatant, ActionFailureReason::IsConfused, bus);
                if rng.roll(CONFUSION_SELF_HIT_CHANCE, "confusion self-hit") {
                    let damage = confusion_damage(combatant);
                    let fainted = combatant.take_damage(damage);
                    bus.push(BattleEvent::ConfusionSelfHit {
                        target: combatant.name.clone(),
                        damage,
                    });
                    if fainted {
                        handle_faint(session, side, side.opponent(), bus);
                        return TurnStart::Interrupted;
                    }
                    TurnStart::Consumed
                } else {
                    TurnStart::Ready
                }
            }
        }
    };

    if outcome == TurnStart::Consumed {
        session.pass_turn();
    }
    outcome
}

/// Poison takes 5% of max HP, burn 6.25%. Always at least 1.
pub fn residual_damage(max_hp: u16, condition: ConditionKind) -> u16 {
    let per_ten_thousand: u32 = match condition {
        ConditionKind::Poisoned => 500,
        ConditionKind::Burned => 625,
        _ => 0,
    };
    ((u32::from(max_hp) * per_ten_thousand / 10_000) as u16).max(1)
}

fn confusion_damage(combatant: &Combatant) -> u16 {
    (f64::from(combatant.effective_stat(StatType::Attack)) * 0.2).floor() as u16
}

fn tick_timed_condition(combatant: &mut Combatant, bus: &mut EventBus) {
    if combatant.condition_turns_remaining == 0 {
        return;
    }
    combatant.condition_turns_remaining -= 1;
    if combatant.condition_turns_remaining == 0 {
        cure(combatant, bus);
    }
}

fn cure(combatant: &mut Combatant, bus: &mut EventBus) {
    if let Some(condition) = combatant.clear_condition() {
        bus.push(BattleEvent::StatusRemoved {
            target: combatant.name.clone(),
            condition,
        });
    }
}

fn prevent(combatant: &Combatant, reason: ActionFailureReason, bus: &mut EventBus) {
    bus.push(BattleEvent::ActionPrevented {
        pokemon: combatant.name.clone(),
        reason,
    });
}

/// Every action `side` could legally submit right now.
pub fn valid_actions(session: &BattleSession, side: Side) -> Vec<PlayerAction> {
    let switches = session
        .valid_switch_targets(side)
        .into_iter()
        .map(|index| PlayerAction::SwitchPokemon {
            target_id: session.team(side)[index].creature_id.clone(),
        });

    match session.phase {
        Phase::Finished(_) => Vec::new(),
        Phase::AwaitingSwitch(pending) if pending == side => switches.collect(),
        Phase::AwaitingSwitch(_) => Vec::new(),
        Phase::Ongoing if session.turn_owner != side => Vec::new(),
        Phase::Ongoing => {
            let active = session.active(side);
            let mut actions: Vec<PlayerAction> = if active.has_usable_move() {
                active
                    .moves
                    .iter()
                    .enumerate()
                    .filter(|(_, slot)| slot.has_pp())
                    .map(|(move_index, _)| PlayerAction::UseMove { move_index })
                    .collect()
            } else {
                vec![PlayerAction::Struggle]
            };
            actions.extend(switches);
            actions
        }
    }
}

/// Checks `action` against the current phase, turn owner and team state.
pub fn validate_action(
    session: &BattleSession,
    side: Side,
    action: &PlayerAction,
) -> Result<(), IllegalActionError> {
    match session.phase {
        Phase::Finished(_) => return Err(IllegalActionError::BattleFinished),
        Phase::AwaitingSwitch(pending) => {
            if pending != side || !matches!(action, PlayerAction::SwitchPokemon { .. }) {
                return Err(IllegalActionError::AwaitingSwitch(pending));
            }
        }
        Phase::Ongoing => {
            if session.turn_owner != side {
                return Err(IllegalActionError::NotYourTurn(side));
            }
        }
    }

    match action {
        PlayerAction::UseMove { move_index } => {
            let slot = session
                .active(side)
                .moves
                .get(*move_index)
                .ok_or(IllegalActionError::InvalidMoveIndex(*move_index))?;
            if !slot.has_pp() {
                return Err(IllegalActionError::NoPpRemaining(slot.definition.name.clone()));
            }
        }
        PlayerAction::Struggle => {
            let active = session.active(side);
            if active.has_usable_move() {
                return Err(IllegalActionError::StruggleUnavailable(active.name.clone()));
            }
        }
        PlayerAction::SwitchPokemon { target_id } => {
            let index = session
                .find_member(side, target_id)
                .ok_or_else(|| IllegalActionError::UnknownCreature(target_id.clone()))?;
            let target = &session.team(side)[index];
            if target.is_fainted() {
                return Err(IllegalActionError::TargetFainted(target.name.clone()));
            }
            if index == session.active[side.index()] {
                return Err(IllegalActionError::TargetAlreadyActive(target.name.clone()));
            }
        }
    }

    Ok(())
}

/// Validates and then fully resolves one action for `side`.
/// On `Err` the session is untouched.
pub fn execute_action(
    session: &mut BattleSession,
    side: Side,
    action: &PlayerAction,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) -> Result<(), IllegalActionError> {
    validate_action(session, side, action)?;

    match action {
        PlayerAction::UseMove { move_index } => {
            let slot = session
                .active_mut(side)
                .moves
                .get_mut(*move_index)
                .ok_or(IllegalActionError::InvalidMoveIndex(*move_index))?;
            slot.use_pp();
            let move_def = Arc::clone(&slot.definition);
            execute_move(session, side, move_def, rng, bus);
        }
        PlayerAction::Struggle => {
            bus.push(BattleEvent::NoMovesLeft {
                pokemon: session.active(side).name.clone(),
            });
            execute_move(session, side, struggle(), rng, bus);
        }
        PlayerAction::SwitchPokemon { target_id } => {
            // Validation guarantees the member exists.
            let index = session
                .find_member(side, target_id)
                .ok_or_else(|| IllegalActionError::UnknownCreature(target_id.clone()))?;
            execute_switch(session, side, index, bus);
        }
    }
    Ok(())
}

fn execute_switch(session: &mut BattleSession, side: Side, target_index: usize, bus: &mut EventBus) {
    let forced = session.phase == Phase::AwaitingSwitch(side);
    let old_pokemon = session.active(side).name.clone();

    session.active[side.index()] = target_index;

    bus.push(BattleEvent::PokemonSwitched {
        side,
        old_pokemon,
        new_pokemon: session.active(side).name.clone(),
    });

    if forced {
        // Initiative was already settled when the faint was handled.
        session.phase = Phase::Ongoing;
        session.turn_ready = false;
    } else {
        session.pass_turn();
    }
}

fn execute_move(
    session: &mut BattleSession,
    side: Side,
    move_def: Arc<MoveDefinition>,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) {
    let attacker = session.active(side);

    bus.push(BattleEvent::MoveUsed {
        side,
        pokemon: attacker.name.clone(),
        move_name: move_def.name.clone(),
    });

    if let Some(accuracy) = move_def.accuracy {
        if !rng.roll(accuracy, "accuracy") {
            bus.push(BattleEvent::MoveMissed {
                attacker: attacker.name.clone(),
            });
            session.pass_turn();
            return;
        }
    }

    if move_def.is_damaging() {
        execute_damaging_move(session, side, &move_def, rng, bus);
    } else {
        execute_status_move(session, side, &move_def, rng, bus);
        session.pass_turn();
    }
}

fn execute_status_move(
    session: &mut BattleSession,
    side: Side,
    move_def: &MoveDefinition,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) {
    if move_def.healing_fraction > 0.0 {
        let user = session.active_mut(side);
        let amount = (move_def.healing_fraction * f64::from(user.max_hp)).floor() as u16;
        let healed = user.heal(amount);
        bus.push(BattleEvent::PokemonHealed {
            target: user.name.clone(),
            amount: healed,
            new_hp: user.current_hp,
        });
    }

    if let Some(change) = &move_def.stat_change {
        apply_stat_change(session, side, change, rng, bus);
    }

    if let Some(effect) = &move_def.status_effect {
        let recipient = recipient_side(side, move_def.target);
        if rng.roll_chance(effect.chance, "status effect chance") {
            if !inflict(session.active_mut(recipient), effect, bus) {
                bus.push(BattleEvent::StatusFailed {
                    target: session.active(recipient).name.clone(),
                });
            }
        } else {
            bus.push(BattleEvent::StatusFailed {
                target: session.active(recipient).name.clone(),
            });
        }
    }
}

fn execute_damaging_move(
    session: &mut BattleSession,
    side: Side,
    move_def: &MoveDefinition,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) {
    let defender_side = side.opponent();
    let mut total_damage: u32 = 0;
    let mut hits_landed: u8 = 0;

    for hit in 0..move_def.hits.max(1) {
        let (attacker, defender) = session.active_pair_mut(side);
        let outcome = resolve_damage(attacker, defender, move_def, rng);
        defender.take_damage(outcome.damage);
        hits_landed += 1;
        total_damage += u32::from(outcome.damage);

        if outcome.critical {
            bus.push(BattleEvent::CriticalHit);
        }
        if hit == 0 {
            bus.push(BattleEvent::AttackTypeEffectiveness {
                multiplier: outcome.type_multiplier,
            });
        }
        bus.push(BattleEvent::DamageDealt {
            target: defender.name.clone(),
            damage: outcome.damage,
            remaining_hp: defender.current_hp,
        });

        if defender.is_fainted() {
            break;
        }
    }

    if move_def.hits > 1 {
        bus.push(BattleEvent::HitCount { hits: hits_landed });
    }

    if move_def.recoil_fraction > 0.0 && total_damage > 0 {
        let attacker = session.active_mut(side);
        let recoil = ((move_def.recoil_fraction * f64::from(total_damage)).floor() as u16).max(1);
        let fainted = attacker.take_damage(recoil);
        bus.push(BattleEvent::RecoilDamage {
            target: attacker.name.clone(),
            damage: recoil,
        });
        if fainted {
            handle_faint(session, side, defender_side, bus);
            return;
        }
    }

    if let Some(effect) = &move_def.status_effect {
        let defender = session.active_mut(defender_side);
        if !defender.is_fainted() && rng.roll_chance(effect.chance, "secondary status") {
            inflict(defender, effect, bus);
        }
    }

    if let Some(change) = &move_def.stat_change {
        let recipient = recipient_side(side, change.target);
        if !session.active(recipient).is_fainted() {
            apply_stat_change(session, side, change, rng, bus);
        }
    }

    if session.active(defender_side).is_fainted() {
        handle_faint(session, defender_side, defender_side, bus);
    } else {
        session.pass_turn();
    }
}

fn recipient_side(user: Side, target: Target) -> Side {
    match target {
        Target::User => user,
        Target::Opponent => user.opponent(),
    }
}

fn apply_stat_change(
    session: &mut BattleSession,
    user: Side,
    change: &StatChange,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) {
    if !rng.roll_chance(change.chance, "stat change chance") {
        return;
    }
    let target = session.active_mut(recipient_side(user, change.target));
    let (old_stage, new_stage) = target.apply_stat_change(change.stat, change.stages);
    bus.push(BattleEvent::StatStageChanged {
        target: target.name.clone(),
        stat: change.stat,
        old_stage,
        new_stage,
    });
}

fn inflict(target: &mut Combatant, effect: &StatusEffect, bus: &mut EventBus) -> bool {
    let turns = effect.turns.unwrap_or_else(|| effect.condition.default_turns());
    let applied = target.apply_condition(effect.condition, turns);
    if applied {
        bus.push(BattleEvent::StatusApplied {
            target: target.name.clone(),
            condition: effect.condition,
        });
    }
    applied
}

/// Records that `side`'s active creature fainted and moves the battle on:
/// to `Finished` if the side has nobody left, otherwise to a forced switch.
/// `next_owner` is the side owed the next move once the switch is made.
pub fn handle_faint(session: &mut BattleSession, side: Side, next_owner: Side, bus: &mut EventBus) {
    bus.push(BattleEvent::PokemonFainted {
        side,
        pokemon: session.active(side).name.clone(),
    });

    if session.has_living_members(side) {
        session.phase = Phase::AwaitingSwitch(side);
        bus.push(BattleEvent::SwitchRequired { side });
    } else {
        let winner = side.opponent();
        session.phase = Phase::Finished(winner);
        bus.push(BattleEvent::BattleEnded { winner });
        tracing::info!(%winner, turns = session.turn_number, "battle finished");
    }

    session.turn_owner = next_owner;
    session.turn_ready = false;
    session.turn_number += 1;
}
