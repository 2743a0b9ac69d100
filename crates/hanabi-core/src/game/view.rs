use crate::model::card::{CardId, CardValue};
use crate::model::clue::{Clue, ClueMarks};
use crate::model::color::Color;
use crate::model::rank::Rank;
use crate::game::moves::Move;
use crate::game::state::MAX_CLUE_TOKENS;

/// What one observer knows about a single card: identity fields are present
/// only when that observer can see or has deduced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub id: CardId,
    pub color: Option<Color>,
    pub rank: Option<Rank>,
    pub marks: ClueMarks,
}

impl CardView {
    pub fn known(&self) -> Option<CardValue> {
        match (self.color, self.rank) {
            (Some(color), Some(rank)) => Some(CardValue::new(color, rank)),
            _ => None,
        }
    }

    pub fn is_clued(&self) -> bool {
        self.marks.is_clued()
    }

    /// The card as its own holder sees it: identity survives only where a
    /// positive clue pinned it down.
    pub fn as_own(&self) -> CardView {
        CardView {
            id: self.id,
            color: if self.marks.color_clued() {
                self.color
            } else {
                None
            },
            rank: if self.marks.rank_clued() {
                self.rank
            } else {
                None
            },
            marks: self.marks,
        }
    }
}

/// The last applied move as seen from a view; moved cards are public.
#[derive(Debug, Clone)]
pub enum MoveView {
    Clue { target: usize, clue: Clue },
    Play { card: CardView, successful: bool },
    Discard { card: CardView },
}

impl MoveView {
    pub fn clue(&self) -> Option<(usize, Clue)> {
        match self {
            MoveView::Clue { target, clue } => Some((*target, *clue)),
            _ => None,
        }
    }
}

/// A player-scoped snapshot: everything the player may know, nothing more.
#[derive(Debug, Clone)]
pub struct GameView {
    pub clue_tokens: u8,
    pub lives: u8,
    pub hands: Vec<Vec<CardView>>,
    pub current_player: usize,
    pub played: [u8; Color::COUNT],
    pub full_deck: Vec<CardValue>,
    pub discard: Vec<CardView>,
    pub deck_len: usize,
    pub last_card_player: Option<usize>,
    pub last_move: Option<MoveView>,
}

impl GameView {
    pub fn player_count(&self) -> usize {
        self.hands.len()
    }

    pub fn can_discard(&self) -> bool {
        self.clue_tokens < MAX_CLUE_TOKENS
    }

    pub fn can_clue(&self) -> bool {
        self.clue_tokens > 0
    }

    /// Legal moves derivable from this view: plays and discards for the
    /// current player's cards, clues on properties visible in other hands.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        for card in &self.hands[self.current_player] {
            moves.push(Move::Play { card: card.id });
            if self.can_discard() {
                moves.push(Move::Discard { card: card.id });
            }
        }

        if !self.can_clue() {
            return moves;
        }

        for (target, hand) in self.hands.iter().enumerate() {
            if target == self.current_player {
                continue;
            }
            for color in Color::ALL {
                if hand.iter().any(|card| card.color == Some(color)) {
                    moves.push(Move::Clue {
                        target,
                        clue: Clue::Color(color),
                    });
                }
            }
            for rank in Rank::ORDERED {
                if hand.iter().any(|card| card.rank == Some(rank)) {
                    moves.push(Move::Clue {
                        target,
                        clue: Clue::Rank(rank),
                    });
                }
            }
        }
        moves
    }

    /// Re-scopes this view to another player's perspective. Never reveals
    /// anything the target could not already see.
    pub fn as_view_for(&self, player: usize) -> GameView {
        let hands = self
            .hands
            .iter()
            .enumerate()
            .map(|(index, hand)| {
                if index == player {
                    hand.iter().map(CardView::as_own).collect()
                } else {
                    hand.clone()
                }
            })
            .collect();
        GameView {
            clue_tokens: self.clue_tokens,
            lives: self.lives,
            hands,
            current_player: self.current_player,
            played: self.played,
            full_deck: self.full_deck.clone(),
            discard: self.discard.clone(),
            deck_len: self.deck_len,
            last_card_player: self.last_card_player,
            last_move: self.last_move.clone(),
        }
    }

    /// Upper bound on the final score given fully-known discards.
    pub fn max_score(&self) -> u8 {
        let mut remaining = [[0u8; Rank::COUNT]; Color::COUNT];
        for value in &self.full_deck {
            remaining[value.color.index()][value.rank.value() as usize - 1] += 1;
        }
        for card in &self.discard {
            if let Some(value) = card.known() {
                let slot = &mut remaining[value.color.index()][value.rank.value() as usize - 1];
                *slot = slot.saturating_sub(1);
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
            total += reachable.max(self.played[color.index()]);
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::{CardView, GameView};
    use crate::model::card::{CardId, CardValue};
    use crate::model::clue::ClueMarks;
    use crate::model::color::Color;
    use crate::model::deck::Deck;
    use crate::model::rank::Rank;
    use crate::game::moves::Move;

    fn visible(id: u32, color: Color, rank: Rank) -> CardView {
        CardView {
            id: CardId(id),
            color: Some(color),
            rank: Some(rank),
            marks: ClueMarks::empty(),
        }
    }

    fn simple_view(clue_tokens: u8) -> GameView {
        GameView {
            clue_tokens,
            lives: 3,
            hands: vec![
                vec![visible(0, Color::Red, Rank::One).as_own()],
                vec![visible(1, Color::Blue, Rank::Two)],
            ],
            current_player: 0,
            played: [0; Color::COUNT],
            full_deck: Deck::all_values(),
            discard: Vec::new(),
            deck_len: 40,
            last_card_player: None,
            last_move: None,
        }
    }

    #[test]
    fn discard_is_not_offered_at_token_maximum() {
        let view = simple_view(8);
        let moves = view.legal_moves();
        assert!(moves.iter().all(|mv| !matches!(mv, Move::Discard { .. })));
        assert!(moves.iter().any(|mv| matches!(mv, Move::Play { .. })));
    }

    #[test]
    fn clues_require_tokens() {
        let view = simple_view(0);
        assert!(
            view.legal_moves()
                .iter()
                .all(|mv| !matches!(mv, Move::Clue { .. }))
        );
    }

    #[test]
    fn rescoping_hides_the_targets_identities() {
        let view = simple_view(4);
        let scoped = view.as_view_for(1);
        assert_eq!(scoped.hands[1][0].color, None);
        assert_eq!(scoped.hands[1][0].rank, None);
        // The other hand stays visible.
        assert_eq!(scoped.hands[0][0].id, CardId(0));
    }

    #[test]
    fn max_score_drops_when_all_copies_are_discarded() {
        let mut view = simple_view(4);
        assert_eq!(view.max_score(), 25);
        // Discard both green 2s: green caps at 1.
        for id in [90, 91] {
            view.discard.push(visible(id, Color::Green, Rank::Two));
        }
        assert_eq!(view.max_score(), 21);
    }

    #[test]
    fn own_card_shows_identity_only_when_positively_clued() {
        let mut card = visible(5, Color::Purple, Rank::Three);
        card.marks.note_rank(Rank::Three, true);
        let own = card.as_own();
        assert_eq!(own.rank, Some(Rank::Three));
        assert_eq!(own.color, None);
        assert_eq!(own.known(), None);

        card.marks.note_color(Color::Purple, true);
        assert_eq!(
            card.as_own().known(),
            Some(CardValue::new(Color::Purple, Rank::Three))
        );
    }
}
