use crate::belief::{count_values, decrement, HypotheticalGame};
use hanabi_core::{CardValue, Color, Rank};
use std::collections::HashSet;

/// Rollout outcome summary, compared lexicographically field by field:
/// lives high, misled low, max score high, sequence weight high, total
/// played high, clue distance low. Ties fall to the caller's random pick.
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub lives: u8,
    pub misled: usize,
    pub max_score: u8,
    pub sequence_playable: f64,
    pub total_played: f64,
    pub clue_distance: usize,
}

const EPSILON: f64 = 1e-9;

impl Score {
    pub fn of(game: &HypotheticalGame, clue_distance: usize) -> Score {
        Score {
            lives: game.lives,
            misled: misled_count(game),
            max_score: expected_max_score(game),
            sequence_playable: sequence_playable(game),
            total_played: total_played(game),
            clue_distance,
        }
    }

    pub fn better_than(&self, other: &Score) -> bool {
        if self.lives != other.lives {
            return self.lives > other.lives;
        }
        if self.misled != other.misled {
            return self.misled < other.misled;
        }
        if self.max_score != other.max_score {
            return self.max_score > other.max_score;
        }
        if (self.sequence_playable - other.sequence_playable).abs() > EPSILON {
            return self.sequence_playable > other.sequence_playable;
        }
        if (self.total_played - other.total_played).abs() > EPSILON {
            return self.total_played > other.total_played;
        }
        if self.clue_distance != other.clue_distance {
            return self.clue_distance < other.clue_distance;
        }
        false
    }

    pub fn ties_with(&self, other: &Score) -> bool {
        !self.better_than(other) && !other.better_than(self)
    }
}

/// Cards whose holder-side candidates no longer intersect what the model
/// knows outright: the convention pointed the holder at values that are all
/// impossible.
pub fn misled_count(game: &HypotheticalGame) -> usize {
    game.hands
        .iter()
        .flatten()
        .filter(|card| {
            let public: HashSet<CardValue> = card.possibles.iter().copied().collect();
            !card
                .own_possibles
                .iter()
                .any(|value| public.contains(value))
        })
        .count()
}

/// Upper bound on the final score, refined by partially-known discards:
/// a discard known only by color (or only by rank) pessimistically costs
/// one copy of every value it might have been.
pub fn expected_max_score(game: &HypotheticalGame) -> u8 {
    let mut remaining = count_values(game.full_deck.iter().copied());
    for value in game.known_discard() {
        decrement(&mut remaining, value);
    }
    for card in &game.discard {
        if card.known().is_some() {
            continue;
        }
        match (card.color, card.rank) {
            (Some(color), None) => {
                for rank in Rank::ORDERED {
                    decrement(&mut remaining, CardValue::new(color, rank));
                }
            }
            (None, Some(rank)) => {
                for color in Color::ALL {
                    decrement(&mut remaining, CardValue::new(color, rank));
                }
            }
            _ => {
                for color in Color::ALL {
                    for rank in Rank::ORDERED {
                        decrement(&mut remaining, CardValue::new(color, rank));
                    }
                }
            }
        }
    }

    let mut total = 0u8;
    for color in Color::ALL {
        let mut reachable = 0u8;
        for rank in Rank::ORDERED {
            if remaining[color.index()][rank.value() as usize - 1] == 0 {
                break;
            }
            reachable = rank.value();
        }
        total += reachable.max(game.stacks.min_height(color));
    }
    total
}

/// Branch-aware played total: settled stacks count in full, branched ones
/// mostly by their guaranteed floor with a small credit for the mean.
pub fn total_played(game: &HypotheticalGame) -> f64 {
    let colors = Color::COUNT as f64;
    Color::ALL
        .into_iter()
        .map(|color| {
            let min = game.stacks.min_height(color) as f64;
            let mean = game.stacks.mean_height(color);
            ((colors + 1.0) * min + mean) / (colors + 2.0)
        })
        .sum()
}

/// How far the table can play in strict turn order if everyone plays every
/// card their own candidates already prove playable. Each layered card adds
/// `(1 + 1/|candidates|)/2`, so certain plays weigh more than gambles.
pub fn sequence_playable(game: &HypotheticalGame) -> f64 {
    let mut stacks = game.stacks.clone();
    let mut spent: Vec<HashSet<usize>> = game.hands.iter().map(|_| HashSet::new()).collect();
    let mut player = game.current_player;
    let mut weight = 0.0;

    loop {
        let hand = &game.hands[player];
        let next = (0..hand.len()).find(|index| {
            !spent[player].contains(index)
                && !hand[*index].own_possibles.is_empty()
                && hand[*index]
                    .own_possibles
                    .iter()
                    .all(|value| stacks.is_next(*value))
        });
        let Some(index) = next else {
            break;
        };

        let card = &hand[index];
        spent[player].insert(index);
        weight += (1.0 + 1.0 / card.own_possibles.len().max(1) as f64) / 2.0;
        if let [value] = card.own_possibles.as_slice() {
            stacks.settle(*value);
        } else {
            let mut colors: Vec<_> = card.own_possibles.iter().map(|v| v.color).collect();
            colors.sort();
            colors.dedup();
            for color in colors {
                stacks.branch(color);
            }
        }
        player = (player + 1) % game.hands.len();
    }
    weight
}
