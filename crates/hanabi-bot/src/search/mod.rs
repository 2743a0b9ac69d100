pub mod rollout;
pub mod score;

pub use score::Score;

use crate::belief::{count_of, HypotheticalGame};
use crate::convention::play_clue::layered_playables;
use crate::convention::save_clue::dangerous_values;
use crate::convention::usefulness::card_usefulness;
use crate::convention::{intent_restrictions, IntentMap, IntentRole, OBSERVE_CHAIN};
use hanabi_core::{CardValue, Clue, GameView, Move};
use rand::Rng;
use std::collections::HashSet;
use tracing::{event, Level};

/// One seat's belief state: the hypothetical-game history as that seat can
/// see it, plus the clue intents inferred so far.
#[derive(Debug, Clone)]
pub struct PlayerModel {
    player: usize,
    history: Vec<HypotheticalGame>,
    intents: IntentMap,
}

impl PlayerModel {
    pub fn new(player: usize) -> Self {
        Self {
            player,
            history: Vec::new(),
            intents: IntentMap::new(),
        }
    }

    pub fn player(&self) -> usize {
        self.player
    }

    pub fn intents(&self) -> &IntentMap {
        &self.intents
    }

    pub fn current(&self) -> Option<&HypotheticalGame> {
        self.history.last()
    }

    pub fn observe_view(&self, view: &GameView) -> PlayerModel {
        let scoped = view.as_view_for(self.player);
        let game =
            HypotheticalGame::from_view(&scoped).restrict(&intent_restrictions(&self.intents));
        self.advance(game)
    }

    /// Observing a simulated snapshot directly, without a rebuild.
    pub fn observe_game(&self, game: &HypotheticalGame) -> PlayerModel {
        let scoped = game
            .as_view_for(self.player)
            .restrict(&intent_restrictions(&self.intents));
        self.advance(scoped)
    }

    fn advance(&self, next: HypotheticalGame) -> PlayerModel {
        // The convention chain only ever inspects the last two snapshots;
        // older ones are dropped so observing stays O(1) per turn.
        let mut history: Vec<HypotheticalGame> = self
            .history
            .iter()
            .rev()
            .take(1)
            .rev()
            .cloned()
            .collect();
        history.push(next);
        let mut intents = self.intents.clone();
        if history.len() >= 2 {
            for (_, rule) in OBSERVE_CHAIN {
                let result = rule(&history, &intents);
                if let Some(updated) = result.intents {
                    intents = updated;
                    let restricted = history
                        .last()
                        .expect("history was just extended")
                        .restrict(&intent_restrictions(&intents));
                    *history.last_mut().expect("history was just extended") = restricted;
                }
                if !result.pass_through {
                    break;
                }
            }
        }
        PlayerModel {
            player: self.player,
            history,
            intents,
        }
    }
}

/// One model per seat, advanced lazily from the caller's view history so
/// repeated calls with the same history stay pure.
#[derive(Debug, Clone)]
pub struct SimulationEngine {
    models: Vec<PlayerModel>,
    consumed: usize,
}

impl SimulationEngine {
    pub fn new(player_count: usize) -> Self {
        Self {
            models: (0..player_count).map(PlayerModel::new).collect(),
            consumed: 0,
        }
    }

    pub fn models(&self) -> &[PlayerModel] {
        &self.models
    }

    pub fn catch_up(&self, history: &[GameView]) -> SimulationEngine {
        let mut engine = self.clone();
        while engine.consumed < history.len() {
            let view = &history[engine.consumed];
            engine.models = engine
                .models
                .iter()
                .map(|model| model.observe_view(view))
                .collect();
            engine.consumed += 1;
        }
        engine
    }

    /// The full decision chain for the current player's turn. `None` means
    /// every strategy came up empty, which an intact state cannot produce.
    pub fn choose<R: Rng + ?Sized>(&self, history: &[GameView], rng: &mut R) -> Option<Move> {
        let view = history.last()?;
        let engine = self.catch_up(history);
        let me = view.current_player;
        let model = &engine.models[me];
        let game = model.current()?;

        if let Some(mv) = play_proven(game) {
            log_choice(me, "proven_play", &mv);
            return Some(mv);
        }
        if let Some(mv) = play_intended(game, &model.intents) {
            log_choice(me, "intent_play", &mv);
            return Some(mv);
        }

        if game.can_clue() {
            let candidates = candidate_clues(game, me);
            if let Some(mv) = engine.pick_best_clue(candidates, me, rng) {
                log_choice(me, "clue", &mv);
                return Some(mv);
            }
        }

        if game.can_discard() {
            if let Some(mv) = discard_useless(game) {
                log_choice(me, "useless_discard", &mv);
                return Some(mv);
            }
            if let Some(mv) = discard_oldest_untouched(game) {
                log_choice(me, "chop_discard", &mv);
                return Some(mv);
            }
            if let Some(card) = game.hands[me].last() {
                let mv = Move::Discard { card: card.id };
                log_choice(me, "oldest_discard", &mv);
                return Some(mv);
            }
        }

        // Tempo fallback: the newest card is always legal to play.
        let card = game.hands[me].first()?;
        let mv = Move::Play { card: card.id };
        log_choice(me, "tempo_play", &mv);
        Some(mv)
    }

    fn pick_best_clue<R: Rng + ?Sized>(
        &self,
        candidates: Vec<Move>,
        me: usize,
        rng: &mut R,
    ) -> Option<Move> {
        if candidates.len() == 1 {
            return candidates.into_iter().next();
        }

        let player_count = self.models.len();
        let mut scored: Vec<(Move, Score)> = Vec::new();
        for mv in candidates {
            let distance = match mv {
                Move::Clue { target, .. } => (target + player_count - me) % player_count,
                _ => 0,
            };
            if let Some(score) = rollout::rollout(self, me, mv, distance) {
                scored.push((mv, score));
            }
        }

        let best = scored
            .iter()
            .map(|(_, score)| score)
            .fold(None::<&Score>, |best, score| match best {
                Some(current) if !score.better_than(current) => Some(current),
                _ => Some(score),
            })?
            .clone();

        let ties: Vec<Move> = scored
            .iter()
            .filter(|(_, score)| score.ties_with(&best))
            .map(|(mv, _)| *mv)
            .collect();
        let pick = rng.gen_range(0..ties.len());
        Some(ties[pick])
    }
}

/// Values playable right now on settled stacks, with copies left to find.
pub(crate) fn simple_playables(game: &HypotheticalGame) -> HashSet<CardValue> {
    let remaining = game.remaining_counts();
    game.stacks
        .next_values()
        .into_iter()
        .filter(|value| count_of(&remaining, *value) > 0)
        .collect()
}

/// A card whose holder candidates are all immediately playable.
pub(crate) fn play_proven(game: &HypotheticalGame) -> Option<Move> {
    let playable = simple_playables(game);
    game.hands[game.current_player]
        .iter()
        .find(|card| {
            !card.own_possibles.is_empty()
                && card
                    .own_possibles
                    .iter()
                    .all(|value| playable.contains(value))
        })
        .map(|card| Move::Play { card: card.id })
}

/// A card carrying a play intent whose candidates overlap the playable set.
pub(crate) fn play_intended(game: &HypotheticalGame, intents: &IntentMap) -> Option<Move> {
    let playable = simple_playables(game);
    game.hands[game.current_player]
        .iter()
        .find(|card| {
            let Some(intent) = intents.get(&card.id) else {
                return false;
            };
            intent.role == IntentRole::Play
                && !card.own_possibles.is_empty()
                && card
                    .own_possibles
                    .iter()
                    .any(|value| playable.contains(value))
        })
        .map(|card| Move::Play { card: card.id })
}

/// Oldest card whose candidates are all provably useless. Empty candidate
/// sets are not trusted here; they signal contradiction, not safety.
pub(crate) fn discard_useless(game: &HypotheticalGame) -> Option<Move> {
    let usefulness = card_usefulness(game);
    game.hands[game.current_player]
        .iter()
        .rev()
        .find(|card| {
            !card.own_possibles.is_empty()
                && card
                    .own_possibles
                    .iter()
                    .all(|value| usefulness.is_useless(*value))
        })
        .map(|card| Move::Discard { card: card.id })
}

pub(crate) fn discard_oldest_untouched(game: &HypotheticalGame) -> Option<Move> {
    game.hands[game.current_player]
        .iter()
        .rev()
        .find(|card| !card.is_clued())
        .map(|card| Move::Discard { card: card.id })
}

/// Candidate clues worth simulating: play clues whose focus lands on a
/// reachable-playable card, else saves for dangerous chops.
pub(crate) fn candidate_clues(game: &HypotheticalGame, me: usize) -> Vec<Move> {
    let clue_moves: Vec<(usize, Clue)> = game
        .legal_moves()
        .into_iter()
        .filter_map(|mv| match mv {
            Move::Clue { target, clue } => Some((target, clue)),
            _ => None,
        })
        .collect();

    let layered: HashSet<CardValue> = layered_playables(game).values.into_iter().collect();
    let mut plays = Vec::new();
    for (target, clue) in &clue_moves {
        let old_hand = &game.hands[*target];
        let new_hand: Vec<_> = old_hand
            .iter()
            .map(|card| card.receive_clue(*clue))
            .collect();
        let Some(info) = crate::convention::clue_focus(old_hand, &new_hand, *clue) else {
            continue;
        };
        let Some(value) = old_hand[info.index].known() else {
            continue;
        };
        if layered.contains(&value) {
            plays.push(Move::Clue {
                target: *target,
                clue: *clue,
            });
        }
    }
    if !plays.is_empty() {
        return plays;
    }

    let dangerous = dangerous_values(game, None);
    let mut saves = Vec::new();
    for target in 0..game.player_count() {
        if target == me {
            continue;
        }
        let Some(chop) = crate::convention::chop_index(&game.hands[target]) else {
            continue;
        };
        let Some(value) = game.hands[target][chop].known() else {
            continue;
        };
        if !dangerous.contains(&value) {
            continue;
        }
        for clue in [Clue::Color(value.color), Clue::Rank(value.rank)] {
            let mv = Move::Clue { target, clue };
            if clue_moves.contains(&(target, clue)) && !saves.contains(&mv) {
                saves.push(mv);
            }
        }
    }
    saves
}

fn log_choice(seat: usize, reason: &str, mv: &Move) {
    event!(
        target: "hanabi_bot::play",
        Level::DEBUG,
        seat,
        reason,
        chosen = %mv,
    );
}

#[cfg(test)]
mod tests {
    use super::{
        candidate_clues, discard_oldest_untouched, discard_useless, play_intended, play_proven,
        SimulationEngine,
    };
    use crate::belief::HypotheticalGame;
    use crate::convention::{ClueIntent, IntentMap, IntentRole};
    use hanabi_core::{
        Card, CardId, CardValue, Clue, Color, Deck, GameState, Hand, Move, Rank,
    };
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn card(id: u32, color: Color, rank: Rank) -> Card {
        Card::new(CardId(id), CardValue::new(color, rank))
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
    fn pinned_playable_card_is_proven() {
        let mut pinned = card(0, Color::Red, Rank::One);
        pinned.note_clue(Clue::Color(Color::Red));
        pinned.note_clue(Clue::Rank(Rank::One));
        let hands = vec![
            Hand::with_cards(vec![pinned, card(1, Color::Green, Rank::Four)]),
            Hand::with_cards(vec![card(2, Color::Blue, Rank::Two)]),
        ];
        let state = GameState::from_hands(hands, empty_deck(), 0);
        let game = HypotheticalGame::from_view(&state.view_for(0));
        assert_eq!(play_proven(&game), Some(Move::Play { card: CardId(0) }));
    }

    #[test]
    fn intent_play_trusts_the_convention() {
        let mut touched = card(0, Color::Green, Rank::One);
        touched.note_clue(Clue::Rank(Rank::One));
        let hands = vec![
            Hand::with_cards(vec![touched, card(1, Color::Green, Rank::Four)]),
            Hand::with_cards(vec![card(2, Color::Blue, Rank::Two)]),
        ];
        // Red one is already played, so a rank-one card is no longer proven:
        // it might be the dead red one.
        let state = GameState::from_hands_with_state(
            hands,
            empty_deck(),
            0,
            [1, 0, 0, 0, 0],
            Vec::new(),
            3,
            4,
        );
        let game = HypotheticalGame::from_view(&state.view_for(0));
        assert_eq!(play_proven(&game), None);
        // But a play intent on it is trusted as long as some candidate plays.
        let mut intents = IntentMap::new();
        intents.insert(
            CardId(0),
            ClueIntent {
                role: IntentRole::Play,
                possibles: vec![value(Color::Green, Rank::One)],
            },
        );
        assert_eq!(
            play_intended(&game, &intents),
            Some(Move::Play { card: CardId(0) })
        );
    }

    #[test]
    fn useless_discard_requires_proof() {
        let mut pinned = card(0, Color::Red, Rank::One);
        pinned.note_clue(Clue::Color(Color::Red));
        pinned.note_clue(Clue::Rank(Rank::One));
        let hands = vec![
            Hand::with_cards(vec![pinned, card(1, Color::Green, Rank::Four)]),
            Hand::with_cards(vec![card(2, Color::Blue, Rank::Two)]),
        ];
        let state = GameState::from_hands_with_state(
            hands,
            empty_deck(),
            0,
            [1, 0, 0, 0, 0],
            Vec::new(),
            3,
            4,
        );
        let game = HypotheticalGame::from_view(&state.view_for(0));
        // Red one is already played, so the pinned copy is provably dead.
        assert_eq!(
            discard_useless(&game),
            Some(Move::Discard { card: CardId(0) })
        );
    }

    #[test]
    fn oldest_untouched_is_the_chop() {
        let hands = vec![
            Hand::with_cards(vec![
                card(0, Color::Red, Rank::One),
                card(1, Color::Green, Rank::Four),
            ]),
            Hand::with_cards(vec![card(2, Color::Blue, Rank::Two)]),
        ];
        let state = GameState::from_hands_with_state(
            hands,
            empty_deck(),
            0,
            [0; Color::COUNT],
            Vec::new(),
            3,
            4,
        );
        let game = HypotheticalGame::from_view(&state.view_for(0));
        assert_eq!(
            discard_oldest_untouched(&game),
            Some(Move::Discard { card: CardId(1) })
        );
    }

    #[test]
    fn play_clues_target_playable_focus_cards() {
        let hands = vec![
            Hand::with_cards(vec![card(0, Color::Green, Rank::Four)]),
            Hand::with_cards(vec![
                card(1, Color::Red, Rank::One),
                card(2, Color::Yellow, Rank::Four),
            ]),
        ];
        let state = GameState::from_hands(hands, empty_deck(), 0);
        let game = HypotheticalGame::from_view(&state.view_for(0));
        let candidates = candidate_clues(&game, 0);
        assert!(!candidates.is_empty());
        for mv in &candidates {
            match mv {
                Move::Clue { target, clue } => {
                    assert_eq!(*target, 1);
                    assert!(
                        *clue == Clue::Color(Color::Red) || *clue == Clue::Rank(Rank::One),
                        "unexpected candidate {clue:?}"
                    );
                }
                other => panic!("non-clue candidate {other}"),
            }
        }
    }

    #[test]
    fn engine_decisions_are_always_legal_and_repeatable() {
        let state = GameState::new_with_seed(3, 41);
        let me = state.current_player();
        let views = vec![state.view_for(me)];
        let engine = SimulationEngine::new(3);
        let mut rng = SmallRng::seed_from_u64(1);

        let first = engine.choose(&views, &mut rng).unwrap();
        let second = engine.choose(&views, &mut rng).unwrap();
        let legal = views[0].legal_moves();
        assert!(legal.contains(&first));
        assert!(legal.contains(&second));
    }
}
