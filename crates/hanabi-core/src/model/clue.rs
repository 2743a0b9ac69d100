use crate::model::card::CardValue;
use crate::model::color::Color;
use crate::model::rank::Rank;
use core::fmt;
use serde::{Deserialize, Serialize};

/// A clue names either a color or a rank, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Clue {
    Color(Color),
    Rank(Rank),
}

impl Clue {
    pub fn matches(self, value: CardValue) -> bool {
        match self {
            Clue::Color(color) => value.color == color,
            Clue::Rank(rank) => value.rank == rank,
        }
    }
}

impl fmt::Display for Clue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clue::Color(color) => write!(f, "color {color}"),
            Clue::Rank(rank) => write!(f, "rank {rank}"),
        }
    }
}

/// Per-card record of clue outcomes. `None` means the property was never
/// clued about; `Some(true)` confirmed it, `Some(false)` ruled it out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClueMarks {
    colors: [Option<bool>; Color::COUNT],
    ranks: [Option<bool>; Rank::COUNT],
}

impl ClueMarks {
    pub const fn empty() -> Self {
        Self {
            colors: [None; Color::COUNT],
            ranks: [None; Rank::COUNT],
        }
    }

    pub fn note_color(&mut self, color: Color, positive: bool) {
        self.colors[color.index()] = Some(positive);
    }

    pub fn note_rank(&mut self, rank: Rank, positive: bool) {
        self.ranks[rank.value() as usize - 1] = Some(positive);
    }

    pub fn color_mark(&self, color: Color) -> Option<bool> {
        self.colors[color.index()]
    }

    pub fn rank_mark(&self, rank: Rank) -> Option<bool> {
        self.ranks[rank.value() as usize - 1]
    }

    /// A card is color-clued once any color entry is positive.
    pub fn color_clued(&self) -> bool {
        self.colors.iter().any(|mark| *mark == Some(true))
    }

    pub fn rank_clued(&self) -> bool {
        self.ranks.iter().any(|mark| *mark == Some(true))
    }

    pub fn is_clued(&self) -> bool {
        self.color_clued() || self.rank_clued()
    }

    pub fn positive_for(&self, clue: Clue) -> bool {
        match clue {
            Clue::Color(color) => self.color_mark(color) == Some(true),
            Clue::Rank(rank) => self.rank_mark(rank) == Some(true),
        }
    }

    /// Whether `value` is still consistent with every recorded mark.
    pub fn allows(&self, value: CardValue) -> bool {
        for color in Color::ALL {
            match self.color_mark(color) {
                Some(true) if color != value.color => return false,
                Some(false) if color == value.color => return false,
                _ => {}
            }
        }
        for rank in Rank::ORDERED {
            match self.rank_mark(rank) {
                Some(true) if rank != value.rank => return false,
                Some(false) if rank == value.rank => return false,
                _ => {}
            }
        }
        true
    }
}
