use crate::battle::ai::{Behavior, OpponentAi};
use crate::battle::combatant::Combatant;
use crate::battle::engine::{execute_action, resolve_turn_start, PlayerAction, TurnStart};
use crate::battle::state::{BattleEvent, BattleSession, EventBus, Phase, Side, TurnRng};
use crate::config::{BattleConfig, PlayerControl};
use crate::errors::{BattleEngineError, BattleResult, DataFormatError, IllegalActionError, InvalidTeamError};
use crate::roster::validate_creature;
use schema::CreatureDefinition;
use std::collections::HashSet;

/// Called after every command that changed the session. `None` after a reset.
pub type StateListener = Box<dyn FnMut(Option<&BattleSession>) + Send>;

/// What the battle is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextInput {
    SelectAction(Side),
    SelectReplacement(Side),
    /// The pending side is AI-controlled and `step_ai` has not run yet.
    OpponentThinking(Side),
    BattleOver(Side),
    NoBattle,
}

enum Step {
    TurnStart,
    Ai(Side),
    Wait,
}

/// Owns the one battle session and drives it from external commands.
///
/// Every command runs the turn engine until the battle next needs input
/// from a person (or, with deferred AI, from `step_ai`), so callers only
/// ever observe settled states.
pub struct BattleRunner {
    config: BattleConfig,
    session: Option<BattleSession>,
    rng: TurnRng,
    ai: Box<dyn Behavior>,
    auto_ai: bool,
    generation: u64,
    listeners: Vec<StateListener>,
}

impl BattleRunner {
    pub fn new(config: BattleConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => TurnRng::from_seed(seed),
            None => TurnRng::new_random(),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: BattleConfig, rng: TurnRng) -> Self {
        let ai = Box::new(OpponentAi::new(config.ai_switch_threshold));
        Self {
            config,
            session: None,
            rng,
            ai,
            auto_ai: true,
            generation: 0,
            listeners: Vec::new(),
        }
    }

    pub fn with_behavior(mut self, ai: Box<dyn Behavior>) -> Self {
        self.ai = ai;
        self
    }

    /// AI turns wait for an explicit `step_ai` call instead of resolving
    /// inside the command that handed them the move.
    pub fn with_deferred_ai(mut self) -> Self {
        self.auto_ai = false;
        self
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&BattleSession> {
        self.session.as_ref()
    }

    #[cfg(test)]
    pub fn session_mut(&mut self) -> Option<&mut BattleSession> {
        self.session.as_mut()
    }

    /// Bumped whenever the session is replaced or dropped. Deferred work
    /// tagged with an older generation must be discarded.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn on_state_changed(&mut self, listener: impl FnMut(Option<&BattleSession>) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn control(&self, side: Side) -> PlayerControl {
        match side {
            Side::A => self.config.player_a,
            Side::B => self.config.player_b,
        }
    }

    pub fn next_input(&self) -> NextInput {
        let Some(session) = &self.session else {
            return NextInput::NoBattle;
        };
        let pending = match session.phase {
            Phase::Finished(winner) => return NextInput::BattleOver(winner),
            Phase::AwaitingSwitch(side) => NextInput::SelectReplacement(side),
            Phase::Ongoing => NextInput::SelectAction(session.turn_owner),
        };
        match pending {
            NextInput::SelectReplacement(side) | NextInput::SelectAction(side)
                if self.control(side) == PlayerControl::Ai =>
            {
                NextInput::OpponentThinking(side)
            }
            other => other,
        }
    }

    /// Starts a new battle from two teams of creature templates.
    /// On error nothing changes, including any battle already running.
    pub fn initialize(&mut self, team_a: &[CreatureDefinition], team_b: &[CreatureDefinition]) -> BattleResult<()> {
        if let Err(error) = self.check_teams(team_a, team_b) {
            tracing::error!(%error, "battle initialization failed");
            return Err(error);
        }

        let instantiate = |team: &[CreatureDefinition]| -> Vec<Combatant> {
            team.iter().map(Combatant::from_definition).collect()
        };
        let mut session = BattleSession::new(instantiate(team_a), instantiate(team_b));
        let mut bus = EventBus::new();
        bus.push(BattleEvent::BattleStarted);
        session.record(&bus);

        self.session = Some(session);
        self.generation += 1;
        tracing::info!(
            generation = self.generation,
            team_a = team_a.len(),
            team_b = team_b.len(),
            "battle initialized"
        );

        self.advance();
        self.notify();
        Ok(())
    }

    fn check_teams(&self, team_a: &[CreatureDefinition], team_b: &[CreatureDefinition]) -> BattleResult<()> {
        for (side, team) in [(Side::A, team_a), (Side::B, team_b)] {
            if team.is_empty() {
                return Err(InvalidTeamError::Empty(side).into());
            }
            if team.len() > self.config.team_size {
                return Err(InvalidTeamError::TooLarge {
                    side,
                    size: team.len(),
                    max: self.config.team_size,
                }
                .into());
            }
            let mut seen = HashSet::new();
            for creature in team {
                validate_creature(creature)?;
                // Switches address members by id.
                if !seen.insert(creature.id.as_str()) {
                    return Err(DataFormatError::DuplicateId(creature.id.clone()).into());
                }
            }
        }
        Ok(())
    }

    pub fn submit_move(&mut self, move_index: usize) -> BattleResult<()> {
        self.submit(PlayerAction::UseMove { move_index })
    }

    pub fn submit_struggle(&mut self) -> BattleResult<()> {
        self.submit(PlayerAction::Struggle)
    }

    pub fn submit_switch(&mut self, target_id: &str) -> BattleResult<()> {
        self.submit(PlayerAction::SwitchPokemon {
            target_id: target_id.to_string(),
        })
    }

    /// Acts for whichever human-controlled side the battle is waiting on.
    pub fn submit(&mut self, action: PlayerAction) -> BattleResult<()> {
        let Some(session) = &self.session else {
            tracing::warn!(?action, "action submitted with no battle in progress");
            return Err(IllegalActionError::NoSession.into());
        };

        let side = match session.phase {
            Phase::AwaitingSwitch(side) => side,
            _ => session.turn_owner,
        };
        if !session.is_finished() && self.control(side) == PlayerControl::Ai {
            return Err(self.reject(Some(side.opponent()), IllegalActionError::NotYourTurn(side.opponent())));
        }

        self.apply(side, &action)
    }

    /// Resolves one pending AI decision. Returns false when no AI-controlled
    /// side is waiting.
    pub fn step_ai(&mut self) -> BattleResult<bool> {
        let side = match self.next_input() {
            NextInput::OpponentThinking(side) => side,
            NextInput::NoBattle => return Err(IllegalActionError::NoSession.into()),
            _ => return Ok(false),
        };
        let action = match &self.session {
            Some(session) => self.ai.decide_action(side, session, &mut self.rng)?,
            None => return Err(IllegalActionError::NoSession.into()),
        };
        tracing::debug!(%side, ?action, "ai decided");
        self.apply(side, &action)?;
        Ok(true)
    }

    /// Drops the current battle. Deferred AI turns for it become stale.
    pub fn reset_session(&mut self) {
        self.session = None;
        self.generation += 1;
        tracing::info!(generation = self.generation, "battle session reset");
        self.notify();
    }

    fn apply(&mut self, side: Side, action: &PlayerAction) -> BattleResult<()> {
        let Some(session) = self.session.as_mut() else {
            return Err(IllegalActionError::NoSession.into());
        };

        let mut bus = EventBus::new();
        if let Err(error) = execute_action(session, side, action, &mut self.rng, &mut bus) {
            return Err(self.reject(Some(side), error));
        }
        session.record(&bus);

        self.advance();
        self.notify();
        Ok(())
    }

    /// Logs a refused action without touching anything else in the session.
    fn reject(&mut self, side: Option<Side>, error: IllegalActionError) -> BattleEngineError {
        tracing::warn!(?side, %error, "action rejected");
        if let Some(session) = self.session.as_mut() {
            let mut bus = EventBus::new();
            bus.push(BattleEvent::ActionRejected {
                side,
                reason: error.to_string(),
            });
            session.record(&bus);
        }
        self.notify();
        error.into()
    }

    /// Runs turn starts and automatic AI turns until a person must act.
    fn advance(&mut self) {
        loop {
            let step = match &self.session {
                None => Step::Wait,
                Some(session) => match session.phase {
                    Phase::Finished(_) => Step::Wait,
                    Phase::AwaitingSwitch(side) => self.ai_step_for(side),
                    Phase::Ongoing if !session.turn_ready => Step::TurnStart,
                    Phase::Ongoing => self.ai_step_for(session.turn_owner),
                },
            };

            let Some(session) = self.session.as_mut() else {
                return;
            };
            let mut bus = EventBus::new();
            match step {
                Step::Wait => return,
                Step::TurnStart => {
                    if resolve_turn_start(session, &mut self.rng, &mut bus) == TurnStart::Ready {
                        session.turn_ready = true;
                    }
                }
                Step::Ai(side) => {
                    let acted = match self.ai.decide_action(side, session, &mut self.rng) {
                        Ok(action) => execute_action(session, side, &action, &mut self.rng, &mut bus)
                            .map_err(BattleEngineError::from),
                        Err(error) => Err(error),
                    };
                    if let Err(error) = acted {
                        // Stop rather than spin on an AI that cannot act.
                        tracing::error!(%side, %error, "ai failed to act");
                        session.record(&bus);
                        return;
                    }
                }
            }
            session.record(&bus);
        }
    }

    fn ai_step_for(&self, side: Side) -> Step {
        if self.auto_ai && self.control(side) == PlayerControl::Ai {
            Step::Ai(side)
        } else {
            Step::Wait
        }
    }

    fn notify(&mut self) {
        for listener in &mut self.listeners {
            listener(self.session.as_ref());
        }
    }
}
