use crate::model::card::{Card, CardId};
use crate::model::clue::Clue;
use std::vec::Vec;

/// An ordered hand. Drawn cards enter on the left (index 0), so hand order
/// records drawing history: the rightmost card is the oldest.
#[derive(Debug, Clone, Default)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn with_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn draw(&mut self, card: Card) {
        self.cards.insert(0, card);
    }

    pub fn take(&mut self, id: CardId) -> Option<Card> {
        let index = self.cards.iter().position(|card| card.id() == id)?;
        Some(self.cards.remove(index))
    }

    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|card| card.id() == id)
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.get(id).is_some()
    }

    pub fn receive_clue(&mut self, clue: Clue) {
        for card in &mut self.cards {
            card.note_clue(clue);
        }
    }

    /// The rightmost card that has never been positively clued: the card
    /// that would be discarded with no other information.
    pub fn chop(&self) -> Option<&Card> {
        self.cards.iter().rev().find(|card| !card.marks().is_clued())
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}
