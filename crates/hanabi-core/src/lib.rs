#![deny(warnings)]
pub mod game;
pub mod model;

pub use game::moves::{IllegalMoveError, Move};
pub use game::state::{GameState, MAX_CLUE_TOKENS, MAX_LIVES};
pub use game::view::{CardView, GameView, MoveView};
pub use model::card::{Card, CardId, CardValue};
pub use model::clue::{Clue, ClueMarks};
pub use model::color::Color;
pub use model::deck::Deck;
pub use model::hand::Hand;
pub use model::rank::Rank;
