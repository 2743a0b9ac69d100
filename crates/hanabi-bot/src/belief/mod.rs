pub mod candidates;
pub mod hypothetical;

pub use candidates::{count_of, count_values, decrement, distinct_values, hand_candidates, ValueCounts};
pub use hypothetical::{HypotheticalCard, HypotheticalGame, HypotheticalMove, Stacks};
