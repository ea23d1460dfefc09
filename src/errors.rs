use crate::battle::state::Side;
use thiserror::Error;

/// Main error type for the battle engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BattleEngineError {
    #[error("Invalid team: {0}")]
    Team(#[from] InvalidTeamError),
    #[error("Illegal action: {0}")]
    Action(#[from] IllegalActionError),
    #[error("Malformed data: {0}")]
    Data(#[from] DataFormatError),
}

/// A team handed to `initialize` cannot start a battle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidTeamError {
    #[error("{0} has no creatures")]
    Empty(Side),
    #[error("{side} has {size} creatures, at most {max} are allowed")]
    TooLarge { side: Side, size: usize, max: usize },
}

/// A submitted action that the current battle state does not allow.
/// The session is left untouched apart from one log line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IllegalActionError {
    #[error("no battle is in progress")]
    NoSession,
    #[error("the battle is already over")]
    BattleFinished,
    #[error("it is not {0}'s turn")]
    NotYourTurn(Side),
    #[error("{0} must choose a replacement first")]
    AwaitingSwitch(Side),
    #[error("no move in slot {0}")]
    InvalidMoveIndex(usize),
    #[error("{0} has no PP left")]
    NoPpRemaining(String),
    #[error("{0} still has moves with PP and cannot struggle")]
    StruggleUnavailable(String),
    #[error("no team member with id {0}")]
    UnknownCreature(String),
    #[error("{0} has fainted and cannot battle")]
    TargetFainted(String),
    #[error("{0} is already in battle")]
    TargetAlreadyActive(String),
    #[error("{0} has no creature able to replace the fainted one")]
    NoValidReplacement(Side),
}

/// An externally supplied creature or move record is malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataFormatError {
    #[error("missing field: {0}")]
    MissingField(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("unknown type: {0}")]
    UnknownType(String),
    #[error("duplicate creature id in team: {0}")]
    DuplicateId(String),
    #[error("unknown stat: {0}")]
    UnknownStat(String),
    #[error("malformed JSON: {0}")]
    Json(String),
}

impl DataFormatError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        DataFormatError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// A card flip the memory game cannot accept right now.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryGameError {
    #[error("needed {needed} distinct cards but only {got} were drawn")]
    NotEnoughCards { needed: usize, got: usize },
    #[error("no card at position {0}")]
    UnknownCard(usize),
    #[error("card {0} is already matched")]
    AlreadyMatched(usize),
    #[error("card {0} is already face up")]
    AlreadyFaceUp(usize),
    #[error("wait for the mismatched pair to turn back over")]
    ComparisonPending,
    #[error("every pair is already matched")]
    GameWon,
}

/// Errors from reading or writing creature and move files.
#[derive(Error, Debug)]
pub enum RosterError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error(transparent)]
    Data(#[from] DataFormatError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Convenience type alias for Results using BattleEngineError
pub type BattleResult<T> = Result<T, BattleEngineError>;
