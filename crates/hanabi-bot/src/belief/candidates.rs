use hanabi_core::{CardId, CardValue, Color, GameView, Rank};

/// Copy counts per distinct card value.
pub type ValueCounts = [[u8; Rank::COUNT]; Color::COUNT];

pub fn count_values<I: IntoIterator<Item = CardValue>>(values: I) -> ValueCounts {
    let mut counts = [[0u8; Rank::COUNT]; Color::COUNT];
    for value in values {
        counts[value.color.index()][value.rank.value() as usize - 1] += 1;
    }
    counts
}

pub fn count_of(counts: &ValueCounts, value: CardValue) -> u8 {
    counts[value.color.index()][value.rank.value() as usize - 1]
}

pub fn decrement(counts: &mut ValueCounts, value: CardValue) {
    let slot = &mut counts[value.color.index()][value.rank.value() as usize - 1];
    *slot = slot.saturating_sub(1);
}

/// Every distinct card value, in color-major order.
pub fn distinct_values() -> impl Iterator<Item = CardValue> {
    Color::ALL.into_iter().flat_map(|color| {
        Rank::ORDERED
            .into_iter()
            .map(move |rank| CardValue::new(color, rank))
    })
}

/// Candidate sets for every card in `player`'s hand, derived from what the
/// view's observer can see: the full deck minus values visible elsewhere,
/// filtered per card by its clue marks, then iterated to a fixed point so
/// that a card pinned to a single value claims a physical copy and drops
/// out of the other cards' sets once no copies remain.
pub fn hand_candidates(view: &GameView, player: usize) -> Vec<(CardId, Vec<CardValue>)> {
    let mut pool = count_values(view.full_deck.iter().copied());

    for color in Color::ALL {
        for height in 1..=view.played[color.index()] {
            if let Some(rank) = Rank::from_value(height) {
                decrement(&mut pool, CardValue::new(color, rank));
            }
        }
    }
    for card in &view.discard {
        if let Some(value) = card.known() {
            decrement(&mut pool, value);
        }
    }
    for (index, hand) in view.hands.iter().enumerate() {
        if index == player {
            continue;
        }
        for card in hand {
            if let Some(value) = card.known() {
                decrement(&mut pool, value);
            }
        }
    }

    let hand = &view.hands[player];
    let mut possibles: Vec<Vec<CardValue>> = hand
        .iter()
        .map(|card| {
            if let Some(value) = card.known() {
                return vec![value];
            }
            distinct_values()
                .filter(|value| card.marks.allows(*value) && count_of(&pool, *value) > 0)
                .collect()
        })
        .collect();

    loop {
        let mut changed = false;
        for index in 0..possibles.len() {
            if possibles[index].len() <= 1 {
                continue;
            }
            let mut claimed = [[0u8; Rank::COUNT]; Color::COUNT];
            for (other, set) in possibles.iter().enumerate() {
                if other != index && set.len() == 1 {
                    claimed[set[0].color.index()][set[0].rank.value() as usize - 1] += 1;
                }
            }
            let before = possibles[index].len();
            possibles[index].retain(|value| count_of(&pool, *value) > count_of(&claimed, *value));
            changed |= possibles[index].len() != before;
        }
        if !changed {
            break;
        }
    }

    hand.iter()
        .map(|card| card.id)
        .zip(possibles)
        .collect()
}
