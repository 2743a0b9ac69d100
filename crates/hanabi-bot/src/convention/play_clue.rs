use crate::belief::{count_of, HypotheticalGame};
use crate::convention::duplicates::touched_unique_possibles;
use crate::convention::focus::history_focus;
use crate::convention::{ClueIntent, ConventionResult, IntentMap, IntentRole};
use hanabi_core::CardValue;

/// Values that are, or are about to become, playable. A value counts once
/// every intervening rank is covered by a card already pinned (by its
/// holder) as about-to-be-played; ambiguous plays branch the stacks and
/// park that color until they resolve.
#[derive(Debug, Clone)]
pub struct Layered {
    pub values: Vec<CardValue>,
    pub weight: f64,
}

pub fn layered_playables(game: &HypotheticalGame) -> Layered {
    let remaining = game.remaining_counts();
    let mut stacks = game.stacks.clone();
    let all_cards: Vec<_> = game.hands.iter().flatten().collect();
    let mut pending: Vec<usize> = (0..all_cards.len())
        .filter(|index| !all_cards[*index].own_possibles.is_empty())
        .collect();
    let mut weight = 0.0;

    loop {
        let mut layered_any = false;
        let mut index = 0;
        while index < pending.len() {
            let card = all_cards[pending[index]];
            let plays = card
                .own_possibles
                .iter()
                .all(|value| stacks.is_next(*value));
            if !plays {
                index += 1;
                continue;
            }

            weight += (1.0 + 1.0 / card.possibles.len().max(1) as f64) / 2.0;
            if let [value] = card.possibles.as_slice() {
                stacks.settle(*value);
            } else {
                let mut colors: Vec<_> =
                    card.possibles.iter().map(|value| value.color).collect();
                colors.sort();
                colors.dedup();
                for color in colors {
                    stacks.branch(color);
                }
            }
            pending.remove(index);
            layered_any = true;
        }
        if !layered_any {
            break;
        }
    }

    let values = stacks
        .next_values()
        .into_iter()
        .filter(|value| count_of(&remaining, *value) > 0)
        .collect();
    Layered { values, weight }
}

/// A clue that is not a save is a play clue: the focus card must be one of
/// the values reachable from the target's prior knowledge.
pub fn observe_play_clue(history: &[HypotheticalGame], intents: &IntentMap) -> ConventionResult {
    let Some(focus) = history_focus(history) else {
        return ConventionResult::pass();
    };
    let current = &history[history.len() - 1];
    let target_before = history[history.len() - 2].as_view_for(focus.target);
    let layered = layered_playables(&target_before);

    let restricted = focus.new_card.restrict(&layered.values);
    let mut updated = intents.clone();
    updated.insert(
        focus.new_card.id,
        ClueIntent {
            role: IntentRole::Play,
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
