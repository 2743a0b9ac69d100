use crate::belief::{count_of, HypotheticalGame};
use crate::convention::duplicates::touched_unique_possibles;
use crate::convention::focus::history_focus;
use crate::convention::play_clue::layered_playables;
use crate::convention::usefulness::card_usefulness;
use crate::convention::{ClueIntent, ConventionResult, IntentMap, IntentRole};
use hanabi_core::{CardValue, Clue, Rank};

/// Last remaining copies of still-useful values that are not visible in any
/// hand. `keep` stays dangerous even when visible (the target already knew
/// that card, so its copy does not count as covered).
pub fn dangerous_values(game: &HypotheticalGame, keep: Option<CardValue>) -> Vec<CardValue> {
    let remaining = game.remaining_counts();
    let usefulness = card_usefulness(game);

    let mut visible: Vec<CardValue> = game
        .hands
        .iter()
        .flatten()
        .filter_map(|card| card.known())
        .collect();
    if let Some(value) = keep {
        if let Some(position) = visible.iter().position(|v| *v == value) {
            visible.remove(position);
        }
    }

    crate::belief::distinct_values()
        .filter(|value| count_of(&remaining, *value) == 1)
        .filter(|value| !usefulness.is_useless(*value))
        .filter(|value| !visible.contains(value))
        .collect()
}

/// Fires only when the focus is the chop. If any focus candidate is a last
/// remaining still-useful copy the clue is a save, restricted to dangerous
/// and reachable values; otherwise it is a disguised play clue. A color
/// clue cannot save a five.
pub fn observe_save_clue(history: &[HypotheticalGame], intents: &IntentMap) -> ConventionResult {
    let Some(focus) = history_focus(history) else {
        return ConventionResult::pass();
    };
    if !focus.is_chop {
        return ConventionResult::pass();
    }

    let current = &history[history.len() - 1];
    let target_before = history[history.len() - 2].as_view_for(focus.target);
    let layered = layered_playables(&target_before);

    let already_known = focus.old_card.as_own().known();
    let mut dangerous = dangerous_values(&target_before, already_known);
    if matches!(focus.clue, Clue::Color(_)) {
        dangerous.retain(|value| value.rank != Rank::Five);
    }

    let focus_own = &focus.new_card.own_possibles;
    let is_save = focus_own.iter().any(|value| dangerous.contains(value));

    let (role, allowed) = if is_save {
        let mut union = layered.values.clone();
        for value in &dangerous {
            if !union.contains(value) {
                union.push(*value);
            }
        }
        (IntentRole::Save, union)
    } else {
        (IntentRole::Play, layered.values.clone())
    };

    let restricted = focus.new_card.restrict(&allowed);
    let mut updated = intents.clone();
    updated.insert(
        focus.new_card.id,
        ClueIntent {
            role,
            possibles: restricted.own_possibles,
        },
    );

    ConventionResult {
        intents: Some(touched_unique_possibles(
            current,
            &updated,
            focus.target,
            focus.clue,
        )),
        pass_through: false,
    }
}
