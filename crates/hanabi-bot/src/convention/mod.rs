pub mod duplicates;
pub mod five_save;
pub mod focus;
pub mod play_clue;
pub mod save_clue;
pub mod usefulness;

pub use focus::{chop_index, clue_focus, history_focus, FocusInfo, HistoryFocus};

use crate::belief::HypotheticalGame;
use hanabi_core::{CardId, CardValue};
use std::collections::HashMap;

/// What a clue conventionally told its receiver about one card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentRole {
    Play,
    Save,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClueIntent {
    pub role: IntentRole,
    pub possibles: Vec<CardValue>,
}

/// Intents keyed by card identity, persisted across turns per model.
pub type IntentMap = HashMap<CardId, ClueIntent>;

/// Outcome of one convention rule. `intents` replaces the map when present;
/// `pass_through` lets later, more general rules still run.
#[derive(Debug, Clone)]
pub struct ConventionResult {
    pub intents: Option<IntentMap>,
    pub pass_through: bool,
}

impl ConventionResult {
    pub fn pass() -> Self {
        Self {
            intents: None,
            pass_through: true,
        }
    }
}

pub type Convention = fn(&[HypotheticalGame], &IntentMap) -> ConventionResult;

/// The observe chain, most specific first. Earlier rules shadow later ones
/// unless they pass through; duplicate suppression always passes through.
pub const OBSERVE_CHAIN: &[(&str, Convention)] = &[
    ("duplicate-suppression", duplicates::observe_duplications),
    ("early-five-save", five_save::observe_five_save),
    ("save-clue", save_clue::observe_save_clue),
    ("play-clue", play_clue::observe_play_clue),
];

/// Per-card restriction map derived from an intent map.
pub fn intent_restrictions(intents: &IntentMap) -> HashMap<CardId, Vec<CardValue>> {
    intents
        .iter()
        .map(|(id, intent)| (*id, intent.possibles.clone()))
        .collect()
}
