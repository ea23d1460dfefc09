//! Opponent behaviors for sides not controlled by a person.

use crate::battle::combatant::Combatant;
use crate::battle::engine::PlayerAction;
use crate::battle::state::{BattleSession, Phase, Side, TurnRng};
use crate::errors::{BattleResult, IllegalActionError};
use ordered_float::OrderedFloat;
use std::cmp::Reverse;

pub const DEFAULT_SWITCH_THRESHOLD: f64 = 0.3;

/// A trait for any system that can decide on a battle action.
pub trait Behavior: Send {
    /// Picks the action `side` takes now. Only called when `side` owes input,
    /// either a regular action or a replacement after a faint.
    fn decide_action(&self, side: Side, session: &BattleSession, rng: &mut TurnRng) -> BattleResult<PlayerAction>;
}

/// Retreats when badly hurt, otherwise attacks with a random move that has PP.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpponentAi {
    switch_threshold: f64,
}

impl Default for OpponentAi {
    fn default() -> Self {
        Self::new(DEFAULT_SWITCH_THRESHOLD)
    }
}

impl OpponentAi {
    pub fn new(switch_threshold: f64) -> Self {
        Self { switch_threshold }
    }

    /// Non-fainted bench member with the highest HP ratio. Earliest wins ties.
    pub fn healthiest_replacement(session: &BattleSession, side: Side) -> Option<usize> {
        Self::healthiest_where(session, side, |_| true)
    }

    fn healthiest_where(
        session: &BattleSession,
        side: Side,
        eligible: impl Fn(&Combatant) -> bool,
    ) -> Option<usize> {
        let team = session.team(side);
        session
            .valid_switch_targets(side)
            .into_iter()
            .filter(|&index| eligible(&team[index]))
            .max_by_key(|&index| (OrderedFloat(team[index].hp_ratio()), Reverse(index)))
    }

    fn switch_to(session: &BattleSession, side: Side, index: usize) -> PlayerAction {
        PlayerAction::SwitchPokemon {
            target_id: session.team(side)[index].creature_id.clone(),
        }
    }
}

impl Behavior for OpponentAi {
    fn decide_action(&self, side: Side, session: &BattleSession, rng: &mut TurnRng) -> BattleResult<PlayerAction> {
        match session.phase {
            Phase::Finished(_) => return Err(IllegalActionError::BattleFinished.into()),
            Phase::AwaitingSwitch(pending) if pending == side => {
                let index = Self::healthiest_replacement(session, side)
                    .ok_or(IllegalActionError::NoValidReplacement(side))?;
                return Ok(Self::switch_to(session, side, index));
            }
            Phase::AwaitingSwitch(pending) => return Err(IllegalActionError::AwaitingSwitch(pending).into()),
            Phase::Ongoing if session.turn_owner != side => {
                return Err(IllegalActionError::NotYourTurn(side).into());
            }
            Phase::Ongoing => {}
        }

        let active = session.active(side);

        // Retreat only into a member at or above the threshold.
        if active.hp_ratio() < self.switch_threshold {
            let threshold = self.switch_threshold;
            if let Some(index) = Self::healthiest_where(session, side, |c| c.hp_ratio() >= threshold) {
                return Ok(Self::switch_to(session, side, index));
            }
        }

        let usable: Vec<usize> = active
            .moves
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.has_pp())
            .map(|(index, _)| index)
            .collect();

        if !usable.is_empty() {
            let pick = rng.pick_index(usable.len(), "ai move choice");
            return Ok(PlayerAction::UseMove { move_index: usable[pick] });
        }

        match Self::healthiest_where(session, side, Combatant::has_usable_move) {
            Some(index) => Ok(Self::switch_to(session, side, index)),
            None => Ok(PlayerAction::Struggle),
        }
    }
}
