use crate::belief::candidates::{count_values, decrement, hand_candidates, ValueCounts};
use hanabi_core::{
    CardId, CardValue, Clue, ClueMarks, Color, GameView, IllegalMoveError, Move, MoveView, Rank,
    MAX_CLUE_TOKENS,
};
use std::collections::HashMap;

/// Played heights per color. Normally a single height, but forward analysis
/// may branch a color into several simultaneously-plausible heights when an
/// ambiguous card is played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stacks {
    heights: [Vec<u8>; Color::COUNT],
}

impl Stacks {
    pub fn from_played(played: &[u8; Color::COUNT]) -> Self {
        let heights = std::array::from_fn(|index| vec![played[index]]);
        Self { heights }
    }

    /// The single height of an unbranched color stack.
    pub fn settled(&self, color: Color) -> Option<u8> {
        match self.heights[color.index()].as_slice() {
            [height] => Some(*height),
            _ => None,
        }
    }

    pub fn is_branched(&self, color: Color) -> bool {
        self.heights[color.index()].len() > 1
    }

    /// Whether `value` is the immediate next play on a settled stack.
    pub fn is_next(&self, value: CardValue) -> bool {
        self.settled(value.color)
            .is_some_and(|height| height + 1 == value.rank.value())
    }

    pub fn settle(&mut self, value: CardValue) {
        self.heights[value.color.index()] = vec![value.rank.value()];
    }

    /// Adds `base + 1` as an extra plausible height for the value's color.
    pub fn branch(&mut self, color: Color) {
        let base = self.heights[color.index()][0];
        self.heights[color.index()].push(base + 1);
    }

    pub fn min_height(&self, color: Color) -> u8 {
        self.heights[color.index()].iter().copied().min().unwrap_or(0)
    }

    pub fn max_height(&self, color: Color) -> u8 {
        self.heights[color.index()].iter().copied().max().unwrap_or(0)
    }

    pub fn mean_height(&self, color: Color) -> f64 {
        let heights = &self.heights[color.index()];
        if heights.is_empty() {
            return 0.0;
        }
        heights.iter().map(|h| *h as f64).sum::<f64>() / heights.len() as f64
    }

    /// Next needed value per settled color, where one exists.
    pub fn next_values(&self) -> Vec<CardValue> {
        Color::ALL
            .into_iter()
            .filter_map(|color| {
                let height = self.settled(color)?;
                let rank = Rank::from_value(height + 1)?;
                Some(CardValue::new(color, rank))
            })
            .collect()
    }

    /// Values at or below every plausible height, counted as played.
    pub fn played_values(&self) -> Vec<CardValue> {
        let mut values = Vec::new();
        for color in Color::ALL {
            for height in 1..=self.max_height(color) {
                if let Some(rank) = Rank::from_value(height) {
                    values.push(CardValue::new(color, rank));
                }
            }
        }
        values
    }
}

/// A card as a belief model sees it: clue marks plus two candidate sets.
/// `possibles` is what this model can deduce outright; `own_possibles` is
/// what the card's holder can infer, narrowed further by clue intents.
#[derive(Debug, Clone)]
pub struct HypotheticalCard {
    pub id: CardId,
    pub color: Option<Color>,
    pub rank: Option<Rank>,
    pub marks: ClueMarks,
    pub possibles: Vec<CardValue>,
    pub own_possibles: Vec<CardValue>,
}

impl HypotheticalCard {
    pub fn new(
        id: CardId,
        color: Option<Color>,
        rank: Option<Rank>,
        marks: ClueMarks,
        possibles: Vec<CardValue>,
        own_possibles: Vec<CardValue>,
    ) -> Self {
        let possibles: Vec<CardValue> = possibles
            .into_iter()
            .filter(|value| {
                marks.allows(*value)
                    && color.is_none_or(|c| value.color == c)
                    && rank.is_none_or(|r| value.rank == r)
            })
            .collect();
        let own_possibles = own_possibles
            .into_iter()
            .filter(|value| marks.allows(*value))
            .collect();

        // A collapsed candidate set back-fills the identity.
        let color = color.or_else(|| single_color(&possibles));
        let rank = rank.or_else(|| single_rank(&possibles));

        Self {
            id,
            color,
            rank,
            marks,
            possibles,
            own_possibles,
        }
    }

    pub fn known(&self) -> Option<CardValue> {
        match (self.color, self.rank) {
            (Some(color), Some(rank)) => Some(CardValue::new(color, rank)),
            _ => None,
        }
    }

    pub fn is_clued(&self) -> bool {
        self.marks.is_clued()
    }

    /// The card as its holder sees it: identity only where positively
    /// clued, and the holder's candidate set on both slots.
    pub fn as_own(&self) -> HypotheticalCard {
        HypotheticalCard::new(
            self.id,
            if self.marks.color_clued() {
                self.color
            } else {
                None
            },
            if self.marks.rank_clued() {
                self.rank
            } else {
                None
            },
            self.marks,
            self.own_possibles.clone(),
            self.own_possibles.clone(),
        )
    }

    /// Records a clue outcome. The mark can only be taken when this model
    /// knows the card's relevant identity half.
    pub fn receive_clue(&self, clue: Clue) -> HypotheticalCard {
        let mut marks = self.marks;
        match clue {
            Clue::Color(color) => {
                if let Some(own) = self.color {
                    marks.note_color(color, own == color);
                }
            }
            Clue::Rank(rank) => {
                if let Some(own) = self.rank {
                    marks.note_rank(rank, own == rank);
                }
            }
        }
        HypotheticalCard::new(
            self.id,
            self.color,
            self.rank,
            marks,
            self.possibles.clone(),
            self.own_possibles.clone(),
        )
    }

    /// Monotone narrowing: intersects both candidate sets with `allowed`.
    /// An empty result is stored, never an error.
    pub fn restrict(&self, allowed: &[CardValue]) -> HypotheticalCard {
        HypotheticalCard::new(
            self.id,
            self.color,
            self.rank,
            self.marks,
            self.possibles
                .iter()
                .filter(|value| allowed.contains(value))
                .copied()
                .collect(),
            self.own_possibles
                .iter()
                .filter(|value| allowed.contains(value))
                .copied()
                .collect(),
        )
    }
}

fn single_color(values: &[CardValue]) -> Option<Color> {
    let first = values.first()?.color;
    values.iter().all(|v| v.color == first).then_some(first)
}

fn single_rank(values: &[CardValue]) -> Option<Rank> {
    let first = values.first()?.rank;
    values.iter().all(|v| v.rank == first).then_some(first)
}

/// The last move as carried inside a hypothetical snapshot.
#[derive(Debug, Clone)]
pub enum HypotheticalMove {
    Clue { target: usize, clue: Clue },
    Play { card: HypotheticalCard, successful: bool },
    Discard { card: HypotheticalCard },
}

impl HypotheticalMove {
    pub fn clue(&self) -> Option<(usize, Clue)> {
        match self {
            HypotheticalMove::Clue { target, clue } => Some((*target, *clue)),
            _ => None,
        }
    }
}

/// An immutable belief-model snapshot: a game view with candidate sets on
/// every card and branchable played stacks.
#[derive(Debug, Clone)]
pub struct HypotheticalGame {
    pub clue_tokens: u8,
    pub lives: u8,
    pub hands: Vec<Vec<HypotheticalCard>>,
    pub current_player: usize,
    pub stacks: Stacks,
    pub full_deck: Vec<CardValue>,
    pub discard: Vec<HypotheticalCard>,
    pub last_move: Option<HypotheticalMove>,
}

impl HypotheticalGame {
    /// Builds the model from a view: public candidates from the view
    /// itself, holder candidates from the view re-scoped to each holder.
    pub fn from_view(view: &GameView) -> Self {
        let mut public: HashMap<CardId, Vec<CardValue>> = HashMap::new();
        let mut own: HashMap<CardId, Vec<CardValue>> = HashMap::new();
        for player in 0..view.player_count() {
            for (id, possibles) in hand_candidates(view, player) {
                public.insert(id, possibles);
            }
            let scoped = view.as_view_for(player);
            for (id, possibles) in hand_candidates(&scoped, player) {
                own.insert(id, possibles);
            }
        }

        let hands = view
            .hands
            .iter()
            .map(|hand| {
                hand.iter()
                    .map(|card| {
                        HypotheticalCard::new(
                            card.id,
                            card.color,
                            card.rank,
                            card.marks,
                            public.remove(&card.id).unwrap_or_default(),
                            own.remove(&card.id).unwrap_or_default(),
                        )
                    })
                    .collect()
            })
            .collect();

        let discard = view
            .discard
            .iter()
            .map(|card| {
                let values = match card.known() {
                    Some(value) => vec![value],
                    None => Vec::new(),
                };
                HypotheticalCard::new(
                    card.id,
                    card.color,
                    card.rank,
                    card.marks,
                    values.clone(),
                    values,
                )
            })
            .collect();

        let last_move = view.last_move.as_ref().map(|mv| match mv {
            MoveView::Clue { target, clue } => HypotheticalMove::Clue {
                target: *target,
                clue: *clue,
            },
            MoveView::Play { card, successful } => HypotheticalMove::Play {
                card: revealed_card(card),
                successful: *successful,
            },
            MoveView::Discard { card } => HypotheticalMove::Discard {
                card: revealed_card(card),
            },
        });

        Self {
            clue_tokens: view.clue_tokens,
            lives: view.lives,
            hands,
            current_player: view.current_player,
            stacks: Stacks::from_played(&view.played),
            full_deck: view.full_deck.clone(),
            discard,
            last_move,
        }
    }

    pub fn player_count(&self) -> usize {
        self.hands.len()
    }

    pub fn can_discard(&self) -> bool {
        self.clue_tokens < MAX_CLUE_TOKENS
    }

    pub fn can_clue(&self) -> bool {
        self.clue_tokens > 0
    }

    pub fn find_card(&self, id: CardId) -> Option<&HypotheticalCard> {
        self.hands
            .iter()
            .flatten()
            .find(|card| card.id == id)
    }

    /// Applies per-card restrictions (intent narrowing). Unknown ids are
    /// ignored; empty intersections are tolerated.
    pub fn restrict(&self, restrictions: &HashMap<CardId, Vec<CardValue>>) -> Self {
        let restrict_card = |card: &HypotheticalCard| match restrictions.get(&card.id) {
            Some(allowed) => card.restrict(allowed),
            None => card.clone(),
        };
        Self {
            clue_tokens: self.clue_tokens,
            lives: self.lives,
            hands: self
                .hands
                .iter()
                .map(|hand| hand.iter().map(restrict_card).collect())
                .collect(),
            current_player: self.current_player,
            stacks: self.stacks.clone(),
            full_deck: self.full_deck.clone(),
            discard: self.discard.iter().map(restrict_card).collect(),
            last_move: self.last_move.clone(),
        }
    }

    /// Re-scopes to `player`'s perspective: their hand collapses to what
    /// they themselves can know.
    pub fn as_view_for(&self, player: usize) -> Self {
        Self {
            clue_tokens: self.clue_tokens,
            lives: self.lives,
            hands: self
                .hands
                .iter()
                .enumerate()
                .map(|(index, hand)| {
                    if index == player {
                        hand.iter().map(HypotheticalCard::as_own).collect()
                    } else {
                        hand.clone()
                    }
                })
                .collect(),
            current_player: self.current_player,
            stacks: self.stacks.clone(),
            full_deck: self.full_deck.clone(),
            discard: self.discard.clone(),
            last_move: self.last_move.clone(),
        }
    }

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

    /// Applies a move under pessimistic play semantics: a play whose
    /// candidates are not all immediately playable misplays; an ambiguous
    /// but safe play branches the stacks. No replacement is drawn.
    pub fn apply(&self, mv: Move) -> Result<Self, IllegalMoveError> {
        if !self.legal_moves().contains(&mv) {
            return Err(IllegalMoveError::new(mv));
        }

        let mut next = self.clone();
        match mv {
            Move::Clue { target, clue } => {
                next.clue_tokens -= 1;
                next.hands[target] = next.hands[target]
                    .iter()
                    .map(|card| card.receive_clue(clue))
                    .collect();
                next.last_move = Some(HypotheticalMove::Clue { target, clue });
            }
            Move::Play { card } => {
                let played = next.remove_from_hand(next.current_player, card);
                let safe = !played.possibles.is_empty()
                    && played
                        .possibles
                        .iter()
                        .all(|value| next.stacks.is_next(*value));
                if safe {
                    if played.possibles.iter().all(|value| value.rank == Rank::Five)
                        && next.clue_tokens < MAX_CLUE_TOKENS
                    {
                        next.clue_tokens += 1;
                    }
                    if let [value] = played.possibles.as_slice() {
                        next.stacks.settle(*value);
                    } else {
                        let colors: Vec<Color> =
                            played.possibles.iter().map(|value| value.color).collect();
                        for color in dedup_colors(colors) {
                            next.stacks.branch(color);
                        }
                    }
                } else {
                    next.lives = next.lives.saturating_sub(1);
                    next.discard.push(played.clone());
                }
                next.last_move = Some(HypotheticalMove::Play {
                    card: played,
                    successful: safe,
                });
            }
            Move::Discard { card } => {
                let discarded = next.remove_from_hand(next.current_player, card);
                next.clue_tokens += 1;
                next.discard.push(discarded.clone());
                next.last_move = Some(HypotheticalMove::Discard { card: discarded });
            }
        }

        next.current_player = (next.current_player + 1) % next.hands.len();
        Ok(next)
    }

    fn remove_from_hand(&mut self, player: usize, id: CardId) -> HypotheticalCard {
        let hand = &mut self.hands[player];
        let index = hand
            .iter()
            .position(|card| card.id == id)
            .expect("legal move names a held card");
        hand.remove(index)
    }

    /// Discarded cards whose identity is pinned down.
    pub fn known_discard(&self) -> Vec<CardValue> {
        self.discard
            .iter()
            .filter_map(|card| card.known())
            .collect()
    }

    /// Copy counts still unaccounted for by the known discard.
    pub fn remaining_counts(&self) -> ValueCounts {
        let mut counts = count_values(self.full_deck.iter().copied());
        for value in self.known_discard() {
            decrement(&mut counts, value);
        }
        counts
    }
}

fn revealed_card(card: &hanabi_core::CardView) -> HypotheticalCard {
    let values = match card.known() {
        Some(value) => vec![value],
        None => Vec::new(),
    };
    HypotheticalCard::new(
        card.id,
        card.color,
        card.rank,
        card.marks,
        values.clone(),
        values,
    )
}

fn dedup_colors(mut colors: Vec<Color>) -> Vec<Color> {
    colors.sort();
    colors.dedup();
    colors
}

#[cfg(test)]
mod tests {
    use super::{HypotheticalCard, HypotheticalGame, Stacks};
    use hanabi_core::{
        Card, CardId, CardValue, Clue, ClueMarks, Color, Deck, GameState, Hand, Move, Rank,
    };
    use std::collections::HashMap;

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

    fn value(color: Color, rank: Rank) -> CardValue {
        CardValue::new(color, rank)
    }

    #[test]
    fn from_view_pins_visible_hands_and_frees_own() {
        let state = GameState::new_with_seed(3, 15);
        let view = state.view_for(0);
        let game = HypotheticalGame::from_view(&view);

        for card in &game.hands[1] {
            assert_eq!(card.possibles.len(), 1);
        }
        for card in &game.hands[0] {
            assert!(card.possibles.len() > 1);
            assert!(card.own_possibles.len() > 1);
        }
    }

    #[test]
    fn restrict_is_monotone_and_tolerates_empty() {
        let state = GameState::new_with_seed(3, 15);
        let game = HypotheticalGame::from_view(&state.view_for(0));
        let target = game.hands[0][0].id;

        let restrictions: HashMap<_, _> =
            [(target, vec![value(Color::Red, Rank::One)])].into_iter().collect();
        let narrowed = game.restrict(&restrictions);
        let card = narrowed.find_card(target).unwrap();
        assert!(card.own_possibles.len() <= 1);

        let contradictory: HashMap<_, _> = [(target, Vec::new())].into_iter().collect();
        let emptied = narrowed.restrict(&contradictory);
        assert!(emptied.find_card(target).unwrap().own_possibles.is_empty());
    }

    #[test]
    fn ambiguous_safe_play_branches_the_stacks() {
        let hands = vec![
            hand_of(vec![card(0, Color::Red, Rank::One)]),
            hand_of(vec![card(1, Color::Green, Rank::Three)]),
        ];
        let state = GameState::from_hands(hands, empty_deck(), 0);
        let game = HypotheticalGame::from_view(&state.view_for(1));

        // From player 1's view, player 0's card is fully visible; force an
        // ambiguous candidate pair to exercise branching.
        let mut game = game;
        game.hands[0][0] = HypotheticalCard::new(
            CardId(0),
            None,
            Some(Rank::One),
            ClueMarks::empty(),
            vec![value(Color::Red, Rank::One), value(Color::Blue, Rank::One)],
            vec![value(Color::Red, Rank::One), value(Color::Blue, Rank::One)],
        );

        let next = game.apply(Move::Play { card: CardId(0) }).unwrap();
        assert_eq!(next.lives, game.lives);
        assert!(next.stacks.is_branched(Color::Red));
        assert!(next.stacks.is_branched(Color::Blue));
        assert_eq!(next.stacks.settled(Color::Green), Some(0));
    }

    #[test]
    fn unplayable_candidates_misplay_pessimistically() {
        let hands = vec![
            hand_of(vec![card(0, Color::Red, Rank::Two)]),
            hand_of(vec![card(1, Color::Green, Rank::Three)]),
        ];
        let state = GameState::from_hands(hands, empty_deck(), 1);
        let game = HypotheticalGame::from_view(&state.view_for(0));

        let next = game.apply(Move::Play { card: CardId(1) }).unwrap();
        assert_eq!(next.lives, game.lives - 1);
        assert_eq!(next.discard.len(), 1);
        assert_eq!(next.stacks.settled(Color::Green), Some(0));
    }

    #[test]
    fn applying_an_unlisted_move_fails() {
        let hands = vec![
            hand_of(vec![card(0, Color::Red, Rank::One)]),
            hand_of(vec![card(1, Color::Green, Rank::Three)]),
        ];
        let state = GameState::from_hands(hands, empty_deck(), 0);
        let game = HypotheticalGame::from_view(&state.view_for(0));
        // Clue tokens are full, so discarding is not legal.
        assert!(game.apply(Move::Discard { card: CardId(0) }).is_err());
        // Playing from the wrong hand is not legal either.
        assert!(game.apply(Move::Play { card: CardId(1) }).is_err());
    }

    #[test]
    fn stacks_track_branches_and_settle() {
        let mut stacks = Stacks::from_played(&[0, 0, 2, 0, 0]);
        assert_eq!(stacks.settled(Color::Blue), Some(2));
        assert!(stacks.is_next(value(Color::Blue, Rank::Three)));
        assert!(!stacks.is_next(value(Color::Blue, Rank::Four)));

        stacks.branch(Color::Blue);
        assert!(stacks.is_branched(Color::Blue));
        assert_eq!(stacks.settled(Color::Blue), None);
        assert_eq!(stacks.min_height(Color::Blue), 2);
        assert_eq!(stacks.max_height(Color::Blue), 3);

        stacks.settle(value(Color::Blue, Rank::Three));
        assert_eq!(stacks.settled(Color::Blue), Some(3));
    }

    #[test]
    fn next_values_skip_branched_and_finished_colors() {
        let mut stacks = Stacks::from_played(&[5, 0, 1, 0, 0]);
        stacks.branch(Color::Yellow);
        let next = stacks.next_values();
        assert!(!next.iter().any(|v| v.color == Color::Red));
        assert!(!next.iter().any(|v| v.color == Color::Yellow));
        assert!(next.contains(&value(Color::Blue, Rank::Two)));
        assert!(next.contains(&value(Color::Green, Rank::One)));
    }
}
