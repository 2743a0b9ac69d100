pub mod belief;
pub mod convention;
pub mod player;
pub mod search;

pub use belief::{HypotheticalCard, HypotheticalGame, Stacks};
pub use convention::{ClueIntent, IntentMap, IntentRole};
pub use player::{BotError, HanabiPlayer};
pub use search::{Score, SimulationEngine};
