use crate::search::SimulationEngine;
use core::fmt;
use hanabi_core::{CardId, GameView, Move};
use rand::Rng;
use std::collections::HashMap;
use tracing::{event, Level};

/// Errors surfaced by the player. `NoLegalMove` should be unreachable (a
/// player can always play their first card); when it fires it signals a
/// belief-model inconsistency and carries the state for diagnosis.
#[derive(Debug)]
pub enum BotError {
    NoLegalMove { seat: usize, detail: String },
}

impl fmt::Display for BotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotError::NoLegalMove { seat, detail } => {
                write!(f, "no legal move found for seat {seat}: {detail}")
            }
        }
    }
}

impl std::error::Error for BotError {}

/// The artificial player for one seat. Both entry points are pure in their
/// view-history argument: observing returns a new player, and deciding
/// twice over the same history draws from the same legal set.
#[derive(Debug, Clone)]
pub struct HanabiPlayer {
    seat: usize,
    engine: SimulationEngine,
}

impl HanabiPlayer {
    pub fn new(seat: usize, player_count: usize) -> Self {
        assert!(seat < player_count);
        Self {
            seat,
            engine: SimulationEngine::new(player_count),
        }
    }

    pub fn seat(&self) -> usize {
        self.seat
    }

    /// Called once per opponent action with the views seen so far; returns
    /// the player with its models advanced through the new views.
    pub fn observe_others_turn(&self, history: &[GameView]) -> HanabiPlayer {
        HanabiPlayer {
            seat: self.seat,
            engine: self.engine.catch_up(history),
        }
    }

    /// Called once on this seat's turn; the returned move is always one of
    /// the view's legal moves.
    pub fn play_own_turn<R: Rng + ?Sized>(
        &self,
        history: &[GameView],
        rng: &mut R,
    ) -> Result<Move, BotError> {
        match self.engine.choose(history, rng) {
            Some(mv) => Ok(mv),
            None => {
                let detail = history
                    .last()
                    .map(|view| format!("{view:?}"))
                    .unwrap_or_else(|| "empty view history".to_string());
                event!(
                    target: "hanabi_bot::play",
                    Level::ERROR,
                    seat = self.seat,
                    "move selection exhausted every strategy"
                );
                Err(BotError::NoLegalMove {
                    seat: self.seat,
                    detail,
                })
            }
        }
    }

    /// Diagnostic snapshot of the intents currently attached to cards, for
    /// UI introspection. No behavioral contract.
    pub fn internal_info(&self) -> HashMap<CardId, String> {
        let mut info = HashMap::new();
        for model in self.engine.models() {
            let Some(game) = model.current() else {
                continue;
            };
            for card in &game.hands[model.player()] {
                if let Some(intent) = model.intents().get(&card.id) {
                    let values: Vec<String> = intent
                        .possibles
                        .iter()
                        .map(|value| value.to_string())
                        .collect();
                    info.insert(
                        card.id,
                        format!("{:?} [{}]", intent.role, values.join(", ")),
                    );
                }
            }
        }
        info
    }
}
