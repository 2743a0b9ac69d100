use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Color {
    Red = 0,
    Yellow = 1,
    Blue = 2,
    Green = 3,
    Purple = 4,
}

impl Color {
    pub const COUNT: usize = 5;

    pub const ALL: [Color; Color::COUNT] = [
        Color::Red,
        Color::Yellow,
        Color::Blue,
        Color::Green,
        Color::Purple,
    ];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Color::Red),
            1 => Some(Color::Yellow),
            2 => Some(Color::Blue),
            3 => Some(Color::Green),
            4 => Some(Color::Purple),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Color::Red => "R",
            Color::Yellow => "Y",
            Color::Blue => "B",
            Color::Green => "G",
            Color::Purple => "P",
        };
        f.write_str(symbol)
    }
}
