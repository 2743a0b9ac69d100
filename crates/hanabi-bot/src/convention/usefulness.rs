use crate::belief::{count_of, distinct_values, HypotheticalGame};
use hanabi_core::{CardValue, Color, Rank};
use std::collections::HashSet;

/// Values that can no longer contribute to the score: already played, or
/// unreachable because some lower rank of the color is exhausted.
#[derive(Debug, Clone)]
pub struct Usefulness {
    pub useless_values: HashSet<CardValue>,
    pub useless_colors: HashSet<Color>,
    pub useless_ranks: HashSet<Rank>,
}

impl Usefulness {
    pub fn is_useless(&self, value: CardValue) -> bool {
        self.useless_values.contains(&value)
            || self.useless_colors.contains(&value.color)
            || self.useless_ranks.contains(&value.rank)
    }
}

pub fn card_usefulness(game: &HypotheticalGame) -> Usefulness {
    let remaining = game.remaining_counts();

    let mut useless_values = HashSet::new();
    for color in Color::ALL {
        // Everything above the first exhausted rank is unreachable.
        let mut blocked = false;
        for rank in Rank::ORDERED {
            if blocked || count_of(&remaining, CardValue::new(color, rank)) == 0 {
                blocked = true;
                useless_values.insert(CardValue::new(color, rank));
            }
        }
        // Everything at or below the lowest plausible stack height is done.
        for height in 1..=game.stacks.min_height(color) {
            if let Some(rank) = Rank::from_value(height) {
                useless_values.insert(CardValue::new(color, rank));
            }
        }
    }

    let useful: Vec<CardValue> = distinct_values()
        .filter(|value| !useless_values.contains(value))
        .collect();

    let useless_colors = Color::ALL
        .into_iter()
        .filter(|color| !useful.iter().any(|value| value.color == *color))
        .collect();
    let useless_ranks = Rank::ORDERED
        .into_iter()
        .filter(|rank| !useful.iter().any(|value| value.rank == *rank))
        .collect();

    Usefulness {
        useless_values,
        useless_colors,
        useless_ranks,
    }
}
