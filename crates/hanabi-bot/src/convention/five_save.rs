use crate::belief::HypotheticalGame;
use crate::convention::duplicates::touched_unique_possibles;
use crate::convention::focus::history_focus;
use crate::convention::{ConventionResult, IntentMap};
use hanabi_core::{Clue, Rank};

/// Early in the game (nothing discarded yet), a rank-five clue touching a
/// previously untouched card just means "these are fives, keep them" and
/// overrides ordinary focus logic.
pub fn observe_five_save(history: &[HypotheticalGame], intents: &IntentMap) -> ConventionResult {
    let Some(focus) = history_focus(history) else {
        return ConventionResult::pass();
    };
    if focus.clue != Clue::Rank(Rank::Five) {
        return ConventionResult::pass();
    }

    let current = &history[history.len() - 1];
    if !current.discard.is_empty() {
        return ConventionResult::pass();
    }
    if !focus.was_untouched {
        return ConventionResult::pass();
    }

    ConventionResult {
        intents: Some(touched_unique_possibles(
            current,
            intents,
            focus.target,
            focus.clue,
        )),
        pass_through: false,
    }
}
