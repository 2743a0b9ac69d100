use crate::model::card::CardId;
use crate::model::clue::Clue;
use core::fmt;
use serde::{Deserialize, Serialize};

/// One of the three things a player can do on their turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Clue { target: usize, clue: Clue },
    Play { card: CardId },
    Discard { card: CardId },
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Clue { target, clue } => write!(f, "clue {clue} to player {target}"),
            Move::Play { card } => write!(f, "play {card}"),
            Move::Discard { card } => write!(f, "discard {card}"),
        }
    }
}

/// Raised when a move outside `legal_moves` is applied. Always a caller
/// defect; fatal for real moves, branch-aborting inside simulations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IllegalMoveError {
    pub attempted: Move,
}

impl IllegalMoveError {
    pub fn new(attempted: Move) -> Self {
        Self { attempted }
    }
}

impl fmt::Display for IllegalMoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "illegal move: {}", self.attempted)
    }
}

impl std::error::Error for IllegalMoveError {}
