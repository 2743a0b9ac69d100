use crate::belief::{HypotheticalCard, HypotheticalGame, HypotheticalMove};
use crate::convention::{intent_restrictions, ClueIntent, ConventionResult, IntentMap, IntentRole};
use hanabi_core::{CardId, CardValue, Clue};
use std::collections::HashSet;

/// Runs first and always passes through: whenever the leading move pinned a
/// card to a single value, that value leaves every other intent's candidate
/// list. A card never eliminates its own discovered value.
pub fn observe_duplications(
    history: &[HypotheticalGame],
    intents: &IntentMap,
) -> ConventionResult {
    let Some(current) = history.last() else {
        return ConventionResult::pass();
    };
    let Some(last_move) = &current.last_move else {
        return ConventionResult::pass();
    };

    let discovered: Vec<&HypotheticalCard> = match last_move {
        HypotheticalMove::Play { card, .. } => vec![card],
        HypotheticalMove::Discard { card } => {
            if card.is_clued() {
                vec![card]
            } else {
                Vec::new()
            }
        }
        HypotheticalMove::Clue { target, .. } => current.hands[*target]
            .iter()
            .filter(|card| card.is_clued())
            .collect(),
    };

    let pinned: Vec<(CardId, CardValue)> = discovered
        .iter()
        .filter(|card| card.possibles.len() == 1)
        .map(|card| (card.id, card.possibles[0]))
        .collect();
    if pinned.is_empty() {
        return ConventionResult::pass();
    }

    let mut updated = IntentMap::new();
    for (id, intent) in intents {
        let own_value = pinned
            .iter()
            .find(|(pinned_id, _)| pinned_id == id)
            .map(|(_, value)| *value);
        let eliminated: HashSet<CardValue> = pinned
            .iter()
            .map(|(_, value)| *value)
            .filter(|value| Some(*value) != own_value)
            .collect();
        let possibles = intent
            .possibles
            .iter()
            .filter(|value| !eliminated.contains(value))
            .copied()
            .collect();
        updated.insert(
            *id,
            ClueIntent {
                role: intent.role,
                possibles,
            },
        );
    }

    ConventionResult {
        intents: Some(updated),
        pass_through: true,
    }
}

/// Values everyone can already account for: pinned clued cards in hands
/// (outside `ignored`) plus everything on the stacks.
pub fn known_values(game: &HypotheticalGame, ignored: &HashSet<CardId>) -> HashSet<CardValue> {
    let mut known: HashSet<CardValue> = game
        .hands
        .iter()
        .flatten()
        .filter(|card| card.is_clued() && !ignored.contains(&card.id))
        .filter(|card| card.possibles.len() == 1)
        .map(|card| card.possibles[0])
        .collect();
    known.extend(game.stacks.played_values());
    known
}

/// Cards in the target hand touched by the clue.
pub fn touched_cards<'a>(
    game: &'a HypotheticalGame,
    target: usize,
    clue: Clue,
) -> Vec<&'a HypotheticalCard> {
    game.hands[target]
        .iter()
        .filter(|card| card.marks.positive_for(clue))
        .collect()
}

/// After a clue, de-duplicates every touched card's holder candidates:
/// values already accounted for elsewhere, or claimed by another touched
/// card that is certain of its value, drop out. Already-recorded roles are
/// kept; freshly touched cards default to a save role.
pub fn touched_unique_possibles(
    current: &HypotheticalGame,
    intents: &IntentMap,
    target: usize,
    clue: Clue,
) -> IntentMap {
    let game = current.restrict(&intent_restrictions(intents));
    let touched = touched_cards(&game, target, clue);
    let touched_ids: HashSet<CardId> = touched.iter().map(|card| card.id).collect();
    let known = known_values(&game, &touched_ids);

    let mut updated = intents.clone();
    for card in &touched {
        let claimed: HashSet<CardValue> = touched
            .iter()
            .filter(|other| other.id != card.id && other.own_possibles.len() == 1)
            .map(|other| other.own_possibles[0])
            .collect();
        let possibles: Vec<CardValue> = card
            .own_possibles
            .iter()
            .filter(|value| !known.contains(value) && !claimed.contains(value))
            .copied()
            .collect();
        let role = updated
            .get(&card.id)
            .map(|intent| intent.role)
            .unwrap_or(IntentRole::Save);
        updated.insert(card.id, ClueIntent { role, possibles });
    }
    updated
}
