use crate::game::state::GameState;
use crate::model::color::Color;
use serde::{Deserialize, Serialize};

/// Compact serializable summary of a game in progress or finished, for
/// telemetry rows and diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameRecord {
    pub players: usize,
    pub score: u8,
    pub max_score: u8,
    pub lives: u8,
    pub clue_tokens: u8,
    pub deck_len: usize,
    pub played: Vec<u8>,
    pub over: bool,
}

impl GameRecord {
    pub fn capture(state: &GameState) -> Self {
        GameRecord {
            players: state.player_count(),
            score: state.score(),
            max_score: state.max_score(),
            lives: state.lives(),
            clue_tokens: state.clue_tokens(),
            deck_len: state.deck_len(),
            played: Color::ALL
                .iter()
                .map(|color| state.played()[color.index()])
                .collect(),
            over: state.is_over(),
        }
    }

    pub fn to_json(state: &GameState) -> serde_json::Result<String> {
        serde_json::to_string(&Self::capture(state))
    }
}
