use crate::model::card::{Card, CardId, CardValue};
use crate::model::color::Color;
use crate::model::rank::Rank;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Ten cards per color: three 1s, two each of 2-4, one 5.
pub const DECK_SIZE: usize = 50;

#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn full() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        let mut next_id = 0u32;
        for color in Color::ALL.iter().copied() {
            for rank in Rank::ORDERED.iter().copied() {
                for _ in 0..rank.copies() {
                    cards.push(Card::new(CardId(next_id), CardValue::new(color, rank)));
                    next_id += 1;
                }
            }
        }
        Self { cards }
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::full();
        deck.shuffle_in_place(rng);
        deck
    }

    pub fn shuffled_with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(&mut rng)
    }

    pub fn shuffle_in_place<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// The deck's value multiset, independent of any shuffle.
    pub fn all_values() -> Vec<CardValue> {
        Self::full()
            .cards
            .iter()
            .map(|card| card.value())
            .collect()
    }

    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}
