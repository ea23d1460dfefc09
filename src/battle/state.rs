use crate::battle::combatant::Combatant;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use schema::{ConditionKind, StatType};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "Player 1"),
            Side::B => write!(f, "Player 2"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Ongoing,
    /// The side lost its active creature and must send in a replacement.
    AwaitingSwitch(Side),
    /// Holds the winner.
    Finished(Side),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BattleEvent {
    BattleStarted,
    TurnStarted {
        side: Side,
        turn_number: u32,
    },

    MoveUsed {
        side: Side,
        pokemon: String,
        move_name: String,
    },
    MoveMissed {
        attacker: String,
    },
    CriticalHit,
    AttackTypeEffectiveness {
        multiplier: f64,
    },
    DamageDealt {
        target: String,
        damage: u16,
        remaining_hp: u16,
    },
    HitCount {
        hits: u8,
    },
    RecoilDamage {
        target: String,
        damage: u16,
    },
    PokemonHealed {
        target: String,
        amount: u16,
        new_hp: u16,
    },
    NoMovesLeft {
        pokemon: String,
    },

    StatStageChanged {
        target: String,
        stat: StatType,
        old_stage: i8,
        new_stage: i8,
    },
    StatusApplied {
        target: String,
        condition: ConditionKind,
    },
    StatusFailed {
        target: String,
    },
    StatusRemoved {
        target: String,
        condition: ConditionKind,
    },
    StatusDamage {
        target: String,
        condition: ConditionKind,
        damage: u16,
        remaining_hp: u16,
    },
    ConfusionSelfHit {
        target: String,
        damage: u16,
    },
    ActionPrevented {
        pokemon: String,
        reason: ActionFailureReason,
    },

    PokemonFainted {
        side: Side,
        pokemon: String,
    },
    SwitchRequired {
        side: Side,
    },
    PokemonSwitched {
        side: Side,
        old_pokemon: String,
        new_pokemon: String,
    },
    ActionRejected {
        side: Option<Side>,
        reason: String,
    },
    BattleEnded {
        winner: Side,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionFailureReason {
    IsAsleep,
    IsFrozen,
    IsParalyzed,
    IsConfused,
}

impl BattleEvent {
    /// Formats the event into a human-readable log line.
    /// Returns None for silent events that should not produce user-visible text.
    pub fn format(&self) -> Option<String> {
        match self {
            BattleEvent::BattleStarted => Some("Battle begins!".to_string()),
            BattleEvent::TurnStarted { .. } => None,

            BattleEvent::MoveUsed { pokemon, move_name, .. } => {
                Some(format!("{} used {}!", pokemon, move_name))
            }
            BattleEvent::MoveMissed { attacker } => {
                Some(format!("{}'s attack missed!", attacker))
            }
            BattleEvent::CriticalHit => Some("It was a critical hit!".to_string()),
            BattleEvent::AttackTypeEffectiveness { multiplier } => match *multiplier {
                m if m > 1.0 => Some("It's super effective!".to_string()),
                m if m < 1.0 && m > 0.0 => Some("It's not very effective...".to_string()),
                m if m == 0.0 => Some("It had no effect!".to_string()),
                _ => None,
            },
            BattleEvent::DamageDealt { target, damage, .. } => {
                Some(format!("{} took {} damage!", target, damage))
            }
            BattleEvent::HitCount { hits } => Some(format!("Hit {} time(s)!", hits)),
            BattleEvent::RecoilDamage { target, damage } => {
                Some(format!("{} is hit with recoil! ({} damage)", target, damage))
            }
            BattleEvent::PokemonHealed { target, amount, .. } => {
                Some(format!("{} recovered {} HP!", target, amount))
            }
            BattleEvent::NoMovesLeft { pokemon } => {
                Some(format!("{} has no moves left!", pokemon))
            }

            BattleEvent::StatStageChanged { target, stat, old_stage, new_stage } => {
                if new_stage > old_stage {
                    Some(format!("{}'s {} rose!", target, stat))
                } else if new_stage < old_stage {
                    Some(format!("{}'s {} fell!", target, stat))
                } else if *new_stage > 0 {
                    Some(format!("{}'s {} won't go any higher!", target, stat))
                } else {
                    Some(format!("{}'s {} won't go any lower!", target, stat))
                }
            }
            BattleEvent::StatusApplied { target, condition } => {
                Some(format!("{} {}", target, Self::format_status_applied(*condition)))
            }
            BattleEvent::StatusFailed { .. } => Some("But it failed!".to_string()),
            BattleEvent::StatusRemoved { target, condition } => {
                Some(format!("{} {}", target, Self::format_status_removed(*condition)))
            }
            BattleEvent::StatusDamage { target, condition, damage, .. } => Some(format!(
                "{} is hurt by its {}! ({} damage)",
                target, condition, damage
            )),
            BattleEvent::ConfusionSelfHit { target, damage } => Some(format!(
                "{} hurt itself in its confusion! ({} damage)",
                target, damage
            )),
            BattleEvent::ActionPrevented { pokemon, reason } => {
                Some(format!("{} {}", pokemon, Self::format_action_failure_reason(*reason)))
            }

            BattleEvent::PokemonFainted { pokemon, .. } => Some(format!("{} fainted!", pokemon)),
            BattleEvent::SwitchRequired { side } => {
                Some(format!("{}, choose your next Pokemon!", side))
            }
            BattleEvent::PokemonSwitched { side, new_pokemon, .. } => {
                Some(format!("{} switched to {}!", side, new_pokemon))
            }
            BattleEvent::ActionRejected { side, reason } => match side {
                Some(side) => Some(format!("{}: {}", side, reason)),
                None => Some(format!("Error: {}", reason)),
            },
            BattleEvent::BattleEnded { winner } => Some(format!("{} wins the battle!", winner)),
        }
    }

    fn format_status_applied(condition: ConditionKind) -> &'static str {
        match condition {
            ConditionKind::Poisoned => "was poisoned!",
            ConditionKind::Burned => "was burned!",
            ConditionKind::Paralyzed => "is paralyzed! It may be unable to move!",
            ConditionKind::Asleep => "fell asleep!",
            ConditionKind::Confused => "became confused!",
            ConditionKind::Frozen => "was frozen solid!",
        }
    }

    fn format_status_removed(condition: ConditionKind) -> String {
        match condition {
            ConditionKind::Asleep => "woke up!".to_string(),
            ConditionKind::Frozen => "thawed out!".to_string(),
            ConditionKind::Confused => "snapped out of its confusion!".to_string(),
            _ => format!("was cured of its {}!", condition),
        }
    }

    fn format_action_failure_reason(reason: ActionFailureReason) -> &'static str {
        match reason {
            ActionFailureReason::IsAsleep => "is fast asleep.",
            ActionFailureReason::IsFrozen => "is frozen solid!",
            ActionFailureReason::IsParalyzed => "is fully paralyzed!",
            ActionFailureReason::IsConfused => "is confused!",
        }
    }
}

/// Event bus for collecting the events of one command.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        tracing::debug!(?event, "battle event");
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }
}

#[cfg(test)]
impl EventBus {
    /// Print all events in debug format with a custom prefix message.
    pub fn print_debug_with_message(&self, message: &str) {
        println!("{}", message);
        for event in &self.events {
            println!("  {:?}", event);
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

#[derive(Debug, Clone)]
enum RngSource {
    Scripted { outcomes: Vec<u8>, index: usize },
    Seeded(StdRng),
}

/// The battle's only source of randomness.
///
/// Every draw is an outcome in `1..=100`; a probability of `p` percent
/// succeeds when the outcome is `<= p`. Tests script exact outcomes, real
/// battles draw from a seedable `StdRng`.
#[derive(Debug, Clone)]
pub struct TurnRng {
    source: RngSource,
}

impl TurnRng {
    pub fn new_for_test(outcomes: Vec<u8>) -> Self {
        Self {
            source: RngSource::Scripted { outcomes, index: 0 },
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            source: RngSource::Seeded(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn new_random() -> Self {
        Self {
            source: RngSource::Seeded(StdRng::from_os_rng()),
        }
    }

    pub fn next_outcome(&mut self, reason: &str) -> u8 {
        match &mut self.source {
            RngSource::Scripted { outcomes, index } => {
                if *index >= outcomes.len() {
                    panic!(
                        "TurnRng exhausted! Tried to get a value for: '{}'. Need more random values.",
                        reason
                    );
                }
                let outcome = outcomes[*index];

                #[cfg(test)]
                println!("[RNG] Consumed {} for: {}", outcome, reason);

                *index += 1;
                outcome
            }
            RngSource::Seeded(rng) => rng.random_range(1..=100),
        }
    }

    /// True with `percent` percent probability.
    pub fn roll(&mut self, percent: u8, reason: &str) -> bool {
        self.next_outcome(reason) <= percent
    }

    /// Rolls a probability in [0, 1]. Certain and impossible events draw nothing.
    pub fn roll_chance(&mut self, chance: f64, reason: &str) -> bool {
        if chance >= 1.0 {
            return true;
        }
        if chance <= 0.0 {
            return false;
        }
        f64::from(self.next_outcome(reason)) <= chance * 100.0
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    pub fn pick_index(&mut self, len: usize, reason: &str) -> usize {
        if let RngSource::Seeded(rng) = &mut self.source {
            return rng.random_range(0..len);
        }
        (self.next_outcome(reason) as usize - 1) % len
    }

    /// Uniform integer jitter in `-2..=2`.
    pub fn damage_jitter(&mut self) -> i32 {
        if let RngSource::Seeded(rng) = &mut self.source {
            return rng.random_range(-2..=2);
        }
        ((self.next_outcome("damage jitter") as i32 - 1) % 5) - 2
    }
}

/// The single mutable aggregate of one battle.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BattleSession {
    pub teams: [Vec<Combatant>; 2],
    pub active: [usize; 2],
    pub turn_owner: Side,
    pub phase: Phase,
    pub turn_number: u32,
    /// Start-of-turn status resolution already ran for `turn_owner`, which
    /// is now waiting to pick an action.
    pub turn_ready: bool,
    pub log: Vec<String>,
}

impl BattleSession {
    pub fn new(team_a: Vec<Combatant>, team_b: Vec<Combatant>) -> Self {
        Self {
            teams: [team_a, team_b],
            active: [0, 0],
            turn_owner: Side::A,
            phase: Phase::Ongoing,
            turn_number: 1,
            turn_ready: false,
            log: Vec::new(),
        }
    }

    pub fn team(&self, side: Side) -> &[Combatant] {
        &self.teams[side.index()]
    }

    pub fn active(&self, side: Side) -> &Combatant {
        &self.teams[side.index()][self.active[side.index()]]
    }

    pub fn active_mut(&mut self, side: Side) -> &mut Combatant {
        let index = self.active[side.index()];
        &mut self.teams[side.index()][index]
    }

    /// Mutable access to both active combatants at once.
    pub fn active_pair_mut(&mut self, attacker: Side) -> (&mut Combatant, &mut Combatant) {
        let [team_a, team_b] = &mut self.teams;
        let a = &mut team_a[self.active[0]];
        let b = &mut team_b[self.active[1]];
        match attacker {
            Side::A => (a, b),
            Side::B => (b, a),
        }
    }

    pub fn has_living_members(&self, side: Side) -> bool {
        self.team(side).iter().any(|c| !c.is_fainted())
    }

    /// Team indices of non-fainted creatures that are not currently active.
    pub fn valid_switch_targets(&self, side: Side) -> Vec<usize> {
        let active = self.active[side.index()];
        self.team(side)
            .iter()
            .enumerate()
            .filter(|(index, c)| *index != active && !c.is_fainted())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn find_member(&self, side: Side, creature_id: &str) -> Option<usize> {
        self.team(side)
            .iter()
            .position(|c| c.creature_id == creature_id)
    }

    /// Hands the move to the other side and requires a fresh turn start.
    pub fn pass_turn(&mut self) {
        self.turn_owner = self.turn_owner.opponent();
        self.turn_ready = false;
        self.turn_number += 1;
    }

    /// Appends the formatted lines of every non-silent event to the log.
    pub fn record(&mut self, bus: &EventBus) {
        self.log
            .extend(bus.events().iter().filter_map(BattleEvent::format));
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished(_))
    }
}
