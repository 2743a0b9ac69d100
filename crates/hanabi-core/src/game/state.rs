use crate::game::moves::{IllegalMoveError, Move};
use crate::game::view::{CardView, GameView, MoveView};
use crate::model::card::{Card, CardValue};
use crate::model::clue::Clue;
use crate::model::color::Color;
use crate::model::deck::Deck;
use crate::model::hand::Hand;
use crate::model::rank::Rank;

pub const MAX_LIVES: u8 = 3;
pub const MAX_CLUE_TOKENS: u8 = 8;

/// The move that produced a state, with the moved card resolved.
#[derive(Debug, Clone)]
pub enum AppliedMove {
    Clue { target: usize, clue: Clue },
    Play { card: Card, successful: bool },
    Discard { card: Card },
}

/// One immutable turn snapshot. `apply` produces the successor; nothing is
/// ever mutated in place, so histories share snapshots freely.
#[derive(Debug, Clone)]
pub struct GameState {
    hands: Vec<Hand>,
    deck: Deck,
    played: [u8; Color::COUNT],
    discard: Vec<Card>,
    lives: u8,
    clue_tokens: u8,
    current_player: usize,
    last_card_player: Option<usize>,
    last_move: Option<AppliedMove>,
}

pub const fn hand_size(player_count: usize) -> usize {
    if player_count < 4 {
        5
    } else if player_count < 6 {
        4
    } else {
        3
    }
}

impl GameState {
    pub fn deal(player_count: usize, mut deck: Deck, starting_player: usize) -> Self {
        assert!(
            (2..=6).contains(&player_count),
            "player count must be between 2 and 6"
        );
        assert!(starting_player < player_count, "starting player out of range");

        let mut hands: Vec<Hand> = (0..player_count).map(|_| Hand::new()).collect();
        for _ in 0..hand_size(player_count) {
            for hand in &mut hands {
                let card = deck.draw().expect("deck covers the opening deal");
                hand.draw(card);
            }
        }

        Self {
            hands,
            deck,
            played: [0; Color::COUNT],
            discard: Vec::new(),
            lives: MAX_LIVES,
            clue_tokens: MAX_CLUE_TOKENS,
            current_player: starting_player,
            last_card_player: None,
            last_move: None,
        }
    }

    pub fn new_with_seed(player_count: usize, seed: u64) -> Self {
        let deck = Deck::shuffled_with_seed(seed);
        let starting_player = (seed % player_count as u64) as usize;
        Self::deal(player_count, deck, starting_player)
    }

    /// Test/analysis constructor bypassing the deal.
    pub fn from_hands(hands: Vec<Hand>, deck: Deck, current_player: usize) -> Self {
        assert!(current_player < hands.len());
        Self {
            hands,
            deck,
            played: [0; Color::COUNT],
            discard: Vec::new(),
            lives: MAX_LIVES,
            clue_tokens: MAX_CLUE_TOKENS,
            current_player,
            last_card_player: None,
            last_move: None,
        }
    }

    /// Like `from_hands`, with stacks, discard and token pools preset.
    #[allow(clippy::too_many_arguments)]
    pub fn from_hands_with_state(
        hands: Vec<Hand>,
        deck: Deck,
        current_player: usize,
        played: [u8; Color::COUNT],
        discard: Vec<Card>,
        lives: u8,
        clue_tokens: u8,
    ) -> Self {
        assert!(current_player < hands.len());
        Self {
            hands,
            deck,
            played,
            discard,
            lives,
            clue_tokens,
            current_player,
            last_card_player: None,
            last_move: None,
        }
    }

    pub fn player_count(&self) -> usize {
        self.hands.len()
    }

    pub fn hand(&self, player: usize) -> &Hand {
        &self.hands[player]
    }

    pub fn played(&self) -> &[u8; Color::COUNT] {
        &self.played
    }

    pub fn discard(&self) -> &[Card] {
        &self.discard
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn clue_tokens(&self) -> u8 {
        self.clue_tokens
    }

    pub fn current_player(&self) -> usize {
        self.current_player
    }

    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    pub fn last_card_player(&self) -> Option<usize> {
        self.last_card_player
    }

    pub fn last_move(&self) -> Option<&AppliedMove> {
        self.last_move.as_ref()
    }

    pub fn can_discard(&self) -> bool {
        self.clue_tokens < MAX_CLUE_TOKENS
    }

    pub fn can_clue(&self) -> bool {
        self.clue_tokens > 0
    }

    pub fn score(&self) -> u8 {
        self.played.iter().sum()
    }

    /// Over at zero lives, or once the turn returns to whoever drew the
    /// last card (everyone else has had exactly one more turn).
    pub fn is_over(&self) -> bool {
        self.lives == 0 || self.last_card_player == Some(self.current_player)
    }

    /// Upper bound on the final score given the discard pile.
    pub fn max_score(&self) -> u8 {
        let mut total = 0u8;
        for color in Color::ALL {
            let mut reachable = self.played[color.index()];
            let mut rank = Rank::from_value(reachable + 1);
            while let Some(next) = rank {
                let value = CardValue::new(color, next);
                let discarded = self
                    .discard
                    .iter()
                    .filter(|card| card.value() == value)
                    .count() as u8;
                if discarded >= next.copies() {
                    break;
                }
                reachable = next.value();
                rank = next.next();
            }
            total += reachable;
        }
        total
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        for card in self.hands[self.current_player].iter() {
            moves.push(Move::Play { card: card.id() });
            if self.can_discard() {
                moves.push(Move::Discard { card: card.id() });
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
                if hand.iter().any(|card| card.value().color == color) {
                    moves.push(Move::Clue {
                        target,
                        clue: Clue::Color(color),
                    });
                }
            }
            for rank in Rank::ORDERED {
                if hand.iter().any(|card| card.value().rank == rank) {
                    moves.push(Move::Clue {
                        target,
                        clue: Clue::Rank(rank),
                    });
                }
            }
        }
        moves
    }

    pub fn apply(&self, mv: Move) -> Result<GameState, IllegalMoveError> {
        if !self.legal_moves().contains(&mv) {
            return Err(IllegalMoveError::new(mv));
        }

        let mut next = self.clone();
        match mv {
            Move::Clue { target, clue } => {
                next.clue_tokens -= 1;
                next.hands[target].receive_clue(clue);
                next.last_move = Some(AppliedMove::Clue { target, clue });
            }
            Move::Play { card } => {
                let played = next.hands[next.current_player]
                    .take(card)
                    .expect("legal play names a held card");
                let value = played.value();
                let successful = next.played[value.color.index()] + 1 == value.rank.value();
                if successful {
                    next.played[value.color.index()] = value.rank.value();
                    if value.rank == Rank::Five && next.clue_tokens < MAX_CLUE_TOKENS {
                        next.clue_tokens += 1;
                    }
                } else {
                    next.lives = next.lives.saturating_sub(1);
                    next.discard.push(played.clone());
                }
                next.last_move = Some(AppliedMove::Play {
                    card: played,
                    successful,
                });
                next.draw_replacement();
            }
            Move::Discard { card } => {
                let discarded = next.hands[next.current_player]
                    .take(card)
                    .expect("legal discard names a held card");
                next.clue_tokens += 1;
                next.discard.push(discarded.clone());
                next.last_move = Some(AppliedMove::Discard { card: discarded });
                next.draw_replacement();
            }
        }

        next.current_player = (next.current_player + 1) % next.hands.len();
        Ok(next)
    }

    fn draw_replacement(&mut self) {
        if let Some(card) = self.deck.draw() {
            self.hands[self.current_player].draw(card);
            if self.deck.is_empty() && self.last_card_player.is_none() {
                self.last_card_player = Some(self.current_player);
            }
        }
    }

    pub fn view_for(&self, player: usize) -> GameView {
        let hands = self
            .hands
            .iter()
            .enumerate()
            .map(|(index, hand)| {
                hand.iter()
                    .map(|card| {
                        let view = full_card_view(card);
                        if index == player { view.as_own() } else { view }
                    })
                    .collect()
            })
            .collect();

        GameView {
            clue_tokens: self.clue_tokens,
            lives: self.lives,
            hands,
            current_player: self.current_player,
            played: self.played,
            full_deck: Deck::all_values(),
            discard: self.discard.iter().map(full_card_view).collect(),
            deck_len: self.deck.len(),
            last_card_player: self.last_card_player,
            last_move: self.last_move.as_ref().map(|applied| match applied {
                AppliedMove::Clue { target, clue } => MoveView::Clue {
                    target: *target,
                    clue: *clue,
                },
                AppliedMove::Play { card, successful } => MoveView::Play {
                    card: full_card_view(card),
                    successful: *successful,
                },
                AppliedMove::Discard { card } => MoveView::Discard {
                    card: full_card_view(card),
                },
            }),
        }
    }
}

fn full_card_view(card: &Card) -> CardView {
    CardView {
        id: card.id(),
        color: Some(card.value().color),
        rank: Some(card.value().rank),
        marks: *card.marks(),
    }
}

#[cfg(test)]
mod tests {
    use super::{GameState, MAX_CLUE_TOKENS, MAX_LIVES, hand_size};
    use crate::game::moves::Move;
    use crate::model::card::{Card, CardId, CardValue};
    use crate::model::clue::Clue;
    use crate::model::color::Color;
    use crate::model::deck::Deck;
    use crate::model::hand::Hand;
    use crate::model::rank::Rank;

    fn card(id: u32, color: Color, rank: Rank) -> Card {
        Card::new(CardId(id), CardValue::new(color, rank))
    }

    fn hand_of(cards: Vec<Card>) -> Hand {
        let mut hand = Hand::new();
        for card in cards.into_iter().rev() {
            hand.draw(card);
        }
        hand
    }

    fn empty_deck() -> Deck {
        let mut deck = Deck::full();
        while deck.draw().is_some() {}
        deck
    }

    #[test]
    fn deal_sizes_follow_player_count() {
        assert_eq!(hand_size(2), 5);
        assert_eq!(hand_size(3), 5);
        assert_eq!(hand_size(4), 4);
        assert_eq!(hand_size(5), 4);
        assert_eq!(hand_size(6), 3);

        let state = GameState::new_with_seed(3, 11);
        for player in 0..3 {
            assert_eq!(state.hand(player).len(), 5);
        }
        assert_eq!(state.deck_len(), 50 - 15);
        assert_eq!(state.lives(), MAX_LIVES);
        assert_eq!(state.clue_tokens(), MAX_CLUE_TOKENS);
    }

    #[test]
    fn legal_moves_are_never_empty_mid_game() {
        let mut state = GameState::new_with_seed(3, 5);
        for _ in 0..20 {
            if state.is_over() {
                break;
            }
            let moves = state.legal_moves();
            assert!(!moves.is_empty());
            state = state.apply(moves[0]).unwrap();
        }
    }

    #[test]
    fn discard_is_rejected_at_token_maximum() {
        let state = GameState::new_with_seed(3, 7);
        assert_eq!(state.clue_tokens(), MAX_CLUE_TOKENS);
        let id = state.hand(state.current_player()).cards()[0].id();
        let result = state.apply(Move::Discard { card: id });
        assert!(result.is_err());
        assert!(
            state
                .legal_moves()
                .iter()
                .all(|mv| !matches!(mv, Move::Discard { .. }))
        );
    }

    #[test]
    fn clue_burns_a_token_and_marks_matching_cards() {
        let hands = vec![
            hand_of(vec![card(0, Color::Red, Rank::One)]),
            hand_of(vec![
                card(1, Color::Red, Rank::Two),
                card(2, Color::Blue, Rank::Three),
            ]),
        ];
        let state = GameState::from_hands(hands, empty_deck(), 0);
        let next = state
            .apply(Move::Clue {
                target: 1,
                clue: Clue::Color(Color::Red),
            })
            .unwrap();

        assert_eq!(next.clue_tokens(), MAX_CLUE_TOKENS - 1);
        let touched = next.hand(1).get(CardId(1)).unwrap();
        assert!(touched.marks().color_clued());
        let untouched = next.hand(1).get(CardId(2)).unwrap();
        assert_eq!(untouched.marks().color_mark(Color::Red), Some(false));
        assert!(!untouched.marks().is_clued());
        assert_eq!(next.current_player(), 1);
    }

    #[test]
    fn successful_play_advances_the_stack() {
        let hands = vec![
            hand_of(vec![card(0, Color::Green, Rank::One)]),
            hand_of(vec![card(1, Color::Red, Rank::Two)]),
        ];
        let state = GameState::from_hands(hands, empty_deck(), 0);
        let next = state.apply(Move::Play { card: CardId(0) }).unwrap();
        assert_eq!(next.played()[Color::Green.index()], 1);
        assert_eq!(next.lives(), MAX_LIVES);
        assert_eq!(next.score(), 1);
        assert!(next.discard().is_empty());
    }

    #[test]
    fn completed_five_refunds_a_clue_token() {
        let hands = vec![
            hand_of(vec![card(0, Color::Green, Rank::Five)]),
            hand_of(vec![card(1, Color::Red, Rank::Two)]),
        ];
        let state = GameState::from_hands_with_state(
            hands,
            empty_deck(),
            0,
            [0, 0, 0, 4, 0],
            Vec::new(),
            MAX_LIVES,
            3,
        );
        let next = state.apply(Move::Play { card: CardId(0) }).unwrap();
        assert_eq!(next.played()[Color::Green.index()], 5);
        assert_eq!(next.clue_tokens(), 4);
    }

    #[test]
    fn misplay_costs_a_life_and_discards_the_card() {
        let hands = vec![
            hand_of(vec![card(0, Color::Green, Rank::Three)]),
            hand_of(vec![card(1, Color::Red, Rank::Two)]),
        ];
        let state = GameState::from_hands(hands, empty_deck(), 0);
        let next = state.apply(Move::Play { card: CardId(0) }).unwrap();
        assert_eq!(next.lives(), MAX_LIVES - 1);
        assert_eq!(next.played()[Color::Green.index()], 0);
        assert_eq!(next.discard().len(), 1);
        assert_eq!(next.discard()[0].id(), CardId(0));
    }

    #[test]
    fn discard_refunds_a_token_and_draws_a_replacement() {
        let mut deck = Deck::full();
        while deck.len() > 1 {
            deck.draw();
        }
        let hands = vec![
            hand_of(vec![card(60, Color::Green, Rank::Three)]),
            hand_of(vec![card(61, Color::Red, Rank::Two)]),
        ];
        let state = GameState::from_hands_with_state(
            hands,
            deck,
            0,
            [0; Color::COUNT],
            Vec::new(),
            MAX_LIVES,
            4,
        );
        let next = state.apply(Move::Discard { card: CardId(60) }).unwrap();
        assert_eq!(next.clue_tokens(), 5);
        assert_eq!(next.hand(0).len(), 1);
        assert_eq!(next.deck_len(), 0);
        assert_eq!(next.last_card_player(), Some(0));
    }

    #[test]
    fn game_ends_one_rotation_after_the_last_draw() {
        let mut deck = Deck::full();
        while deck.len() > 1 {
            deck.draw();
        }
        let hands = vec![
            hand_of(vec![card(60, Color::Green, Rank::One)]),
            hand_of(vec![card(61, Color::Red, Rank::One)]),
            hand_of(vec![card(62, Color::Blue, Rank::One)]),
        ];
        let state = GameState::from_hands_with_state(
            hands,
            deck,
            0,
            [0; Color::COUNT],
            Vec::new(),
            MAX_LIVES,
            4,
        );

        // Player 0 discards, drawing the last card.
        let after0 = state.apply(Move::Discard { card: CardId(60) }).unwrap();
        assert_eq!(after0.last_card_player(), Some(0));
        assert!(!after0.is_over());

        let after1 = after0.apply(Move::Play { card: CardId(61) }).unwrap();
        assert!(!after1.is_over());

        let after2 = after1.apply(Move::Play { card: CardId(62) }).unwrap();
        assert!(after2.is_over());
        assert_eq!(after2.current_player(), 0);
    }

    #[test]
    fn views_hide_own_unclued_identities_only() {
        let state = GameState::new_with_seed(3, 23);
        for player in 0..3 {
            let view = state.view_for(player);
            for card in &view.hands[player] {
                assert_eq!(card.color, None);
                assert_eq!(card.rank, None);
            }
            for other in (0..3).filter(|p| *p != player) {
                for card in &view.hands[other] {
                    assert!(card.known().is_some());
                }
            }
        }
    }

    #[test]
    fn max_score_accounts_for_exhausted_values() {
        let hands = vec![
            hand_of(vec![card(60, Color::Green, Rank::One)]),
            hand_of(vec![card(61, Color::Red, Rank::One)]),
        ];
        let discard = vec![
            card(70, Color::Blue, Rank::Five),
            card(71, Color::Yellow, Rank::Two),
            card(72, Color::Yellow, Rank::Two),
        ];
        let state = GameState::from_hands_with_state(
            hands,
            empty_deck(),
            0,
            [0; Color::COUNT],
            discard,
            MAX_LIVES,
            4,
        );
        // Blue caps at 4, yellow at 1, the rest reach 5.
        assert_eq!(state.max_score(), 5 + 1 + 4 + 5 + 5);
    }
}
