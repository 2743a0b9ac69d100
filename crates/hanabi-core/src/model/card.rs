use crate::model::clue::{Clue, ClueMarks};
use crate::model::color::Color;
use crate::model::rank::Rank;
use core::fmt;
use serde::{Deserialize, Serialize};

/// A color/rank combination. Several physical cards share the same value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CardValue {
    pub color: Color,
    pub rank: Rank,
}

impl CardValue {
    pub const fn new(color: Color, rank: Rank) -> Self {
        Self { color, rank }
    }
}

impl fmt::Display for CardValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.color)
    }
}

/// Identity of one physical card, unique across the whole deck.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CardId(pub u32);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Engine-side card instance: true value plus accumulated clue marks.
#[derive(Debug, Clone)]
pub struct Card {
    id: CardId,
    value: CardValue,
    marks: ClueMarks,
}

impl Card {
    pub fn new(id: CardId, value: CardValue) -> Self {
        Self {
            id,
            value,
            marks: ClueMarks::empty(),
        }
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn value(&self) -> CardValue {
        self.value
    }

    pub fn marks(&self) -> &ClueMarks {
        &self.marks
    }

    pub fn matches(&self, clue: Clue) -> bool {
        clue.matches(self.value)
    }

    /// Records a clue outcome. A matching clue fixes the whole dimension;
    /// a mismatch rules out the named property only.
    pub fn note_clue(&mut self, clue: Clue) {
        match clue {
            Clue::Color(color) => {
                if color == self.value.color {
                    for candidate in Color::ALL {
                        self.marks.note_color(candidate, candidate == color);
                    }
                } else {
                    self.marks.note_color(color, false);
                }
            }
            Clue::Rank(rank) => {
                if rank == self.value.rank {
                    for candidate in Rank::ORDERED {
                        self.marks.note_rank(candidate, candidate == rank);
                    }
                } else {
                    self.marks.note_rank(rank, false);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Card, CardId, CardValue};
    use crate::model::clue::Clue;
    use crate::model::color::Color;
    use crate::model::rank::Rank;

    #[test]
    fn matching_color_clue_fixes_the_dimension() {
        let mut card = Card::new(CardId(0), CardValue::new(Color::Red, Rank::Two));
        card.note_clue(Clue::Color(Color::Red));
        assert!(card.marks().color_clued());
        assert_eq!(card.marks().color_mark(Color::Red), Some(true));
        assert_eq!(card.marks().color_mark(Color::Blue), Some(false));
        assert!(!card.marks().rank_clued());
    }

    #[test]
    fn mismatching_clue_records_single_negative() {
        let mut card = Card::new(CardId(1), CardValue::new(Color::Red, Rank::Two));
        card.note_clue(Clue::Rank(Rank::Five));
        assert!(!card.marks().is_clued());
        assert_eq!(card.marks().rank_mark(Rank::Five), Some(false));
        assert_eq!(card.marks().rank_mark(Rank::Two), None);
    }

    #[test]
    fn values_compare_by_fields() {
        let a = CardValue::new(Color::Green, Rank::One);
        let b = CardValue::new(Color::Green, Rank::One);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "1G");
    }
}
