//! Memory matching: pairs of playing cards dealt face down and turned over two
//! at a time until every pair is found.
//!
//! The game holds at most one pending comparison. A mismatched pair stays face
//! up until the caller resolves it, normally from a `DeferredTimer` tagged with
//! `MemoryGame::generation` so that a deal in between makes the timer stale.

use crate::battle::state::TurnRng;
use crate::errors::MemoryGameError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_PAIR_COUNT: usize = 6;

/// How long a mismatched pair stays face up.
pub const FLIP_BACK_DELAY: Duration = Duration::from_millis(1200);

const VALUES: [(&str, &str); 13] = [
    ("A", "ACE"),
    ("2", "2"),
    ("3", "3"),
    ("4", "4"),
    ("5", "5"),
    ("6", "6"),
    ("7", "7"),
    ("8", "8"),
    ("9", "9"),
    ("0", "10"),
    ("J", "JACK"),
    ("Q", "QUEEN"),
    ("K", "KING"),
];

const SUITS: [(&str, &str); 4] = [("S", "SPADES"), ("D", "DIAMONDS"), ("C", "CLUBS"), ("H", "HEARTS")];

/// One card as the deck provider describes it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CardRecord {
    /// Value letter plus suit letter, e.g. `"0H"` for the ten of hearts.
    pub code: String,
    pub value: String,
    pub suit: String,
    #[serde(default)]
    pub image: String,
}

/// The 52 cards of a single deck, unshuffled.
pub fn standard_deck() -> Vec<CardRecord> {
    SUITS
        .iter()
        .flat_map(|(suit_code, suit)| {
            VALUES.iter().map(move |(value_code, value)| CardRecord {
                code: format!("{}{}", value_code, suit_code),
                value: value.to_string(),
                suit: suit.to_string(),
                image: String::new(),
            })
        })
        .collect()
}

/// Fisher-Yates shuffle.
pub fn shuffle<T>(items: &mut [T], rng: &mut TurnRng) {
    for i in (1..items.len()).rev() {
        let j = rng.pick_index(i + 1, "shuffle");
        items.swap(i, j);
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GameCard {
    /// Unique per physical card: the face code plus `-a` or `-b`.
    pub game_id: String,
    pub face: CardRecord,
    pub is_flipped: bool,
    pub is_matched: bool,
}

impl GameCard {
    fn pairs_with(&self, other: &GameCard) -> bool {
        self.game_id != other.game_id && self.face.value == other.face.value && self.face.suit == other.face.suit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipOutcome {
    FirstCard,
    Matched,
    /// Both cards stay face up until `resolve_mismatch`.
    Mismatched,
    Won,
}

#[derive(Debug, Clone)]
pub struct MemoryGame {
    pair_count: usize,
    cards: Vec<GameCard>,
    first_up: Option<usize>,
    pending_mismatch: Option<(usize, usize)>,
    moves: u32,
    started_at: Option<Instant>,
    finished_in: Option<Duration>,
    generation: u64,
}

impl Default for MemoryGame {
    fn default() -> Self {
        Self::new(DEFAULT_PAIR_COUNT)
    }
}

impl MemoryGame {
    pub fn new(pair_count: usize) -> Self {
        Self {
            pair_count,
            cards: Vec::new(),
            first_up: None,
            pending_mismatch: None,
            moves: 0,
            started_at: None,
            finished_in: None,
            generation: 0,
        }
    }

    /// Clears the board, then deals two copies each of the first `pair_count`
    /// distinct cards in `draws`, shuffled. On error the board stays empty.
    pub fn deal(&mut self, draws: &[CardRecord], rng: &mut TurnRng) -> Result<(), MemoryGameError> {
        self.clear();

        let mut seen = HashSet::new();
        let faces: Vec<&CardRecord> = draws
            .iter()
            .filter(|card| seen.insert(card.code.as_str()))
            .take(self.pair_count)
            .collect();
        if faces.len() < self.pair_count {
            tracing::warn!(needed = self.pair_count, got = faces.len(), "not enough distinct cards to deal");
            return Err(MemoryGameError::NotEnoughCards {
                needed: self.pair_count,
                got: faces.len(),
            });
        }

        let mut cards: Vec<GameCard> = faces
            .into_iter()
            .flat_map(|face| {
                ["a", "b"].map(|copy| GameCard {
                    game_id: format!("{}-{}", face.code, copy),
                    face: face.clone(),
                    is_flipped: false,
                    is_matched: false,
                })
            })
            .collect();
        shuffle(&mut cards, rng);
        self.cards = cards;

        tracing::info!(generation = self.generation, pairs = self.pair_count, "memory game dealt");
        Ok(())
    }

    /// Empties the board. A flip-back scheduled before this is stale.
    pub fn clear(&mut self) {
        self.cards.clear();
        self.first_up = None;
        self.pending_mismatch = None;
        self.moves = 0;
        self.started_at = None;
        self.finished_in = None;
        self.generation += 1;
    }

    /// Turns the card at `position` face up. The clock starts on the first
    /// accepted flip; every second card counts as one move.
    pub fn flip(&mut self, position: usize) -> Result<FlipOutcome, MemoryGameError> {
        if self.is_won() {
            return Err(MemoryGameError::GameWon);
        }
        if self.pending_mismatch.is_some() {
            return Err(MemoryGameError::ComparisonPending);
        }
        let card = self
            .cards
            .get_mut(position)
            .ok_or(MemoryGameError::UnknownCard(position))?;
        if card.is_matched {
            return Err(MemoryGameError::AlreadyMatched(position));
        }
        if card.is_flipped {
            return Err(MemoryGameError::AlreadyFaceUp(position));
        }

        card.is_flipped = true;
        tracing::debug!(position, game_id = %card.game_id, "card flipped");
        self.started_at.get_or_insert_with(Instant::now);

        let Some(first) = self.first_up.take() else {
            self.first_up = Some(position);
            return Ok(FlipOutcome::FirstCard);
        };

        self.moves += 1;
        if !self.cards[first].pairs_with(&self.cards[position]) {
            self.pending_mismatch = Some((first, position));
            return Ok(FlipOutcome::Mismatched);
        }

        self.cards[first].is_matched = true;
        self.cards[position].is_matched = true;
        if self.cards.iter().all(|card| card.is_matched) {
            let elapsed = self.started_at.map(|start| start.elapsed()).unwrap_or_default();
            self.finished_in = Some(elapsed);
            tracing::info!(moves = self.moves, seconds = elapsed.as_secs(), "memory game won");
            return Ok(FlipOutcome::Won);
        }
        Ok(FlipOutcome::Matched)
    }

    /// Turns a mismatched pair back over. Returns false if none was pending.
    pub fn resolve_mismatch(&mut self) -> bool {
        let Some((first, second)) = self.pending_mismatch.take() else {
            return false;
        };
        for index in [first, second] {
            if let Some(card) = self.cards.get_mut(index) {
                card.is_flipped = false;
            }
        }
        true
    }

    pub fn cards(&self) -> &[GameCard] {
        &self.cards
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn has_pending_mismatch(&self) -> bool {
        self.pending_mismatch.is_some()
    }

    pub fn is_won(&self) -> bool {
        self.finished_in.is_some()
    }

    /// Time since the first flip, frozen once the game is won.
    pub fn elapsed(&self) -> Duration {
        match (self.finished_in, self.started_at) {
            (Some(finished), _) => finished,
            (None, Some(start)) => start.elapsed(),
            (None, None) => Duration::ZERO,
        }
    }

    pub fn win_message(&self) -> Option<String> {
        self.finished_in.map(|elapsed| {
            format!(
                "Congratulations! You matched all cards in {} moves and {} seconds!",
                self.moves,
                elapsed.as_secs()
            )
        })
    }
}
