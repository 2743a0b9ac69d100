use crate::belief::HypotheticalGame;
use crate::search::score::Score;
use crate::search::{
    discard_oldest_untouched, discard_useless, play_proven, PlayerModel, SimulationEngine,
};
use hanabi_core::Move;

/// The deterministic action a fast-forwarded player is assumed to take:
/// a proven play, else a provably useless discard, else the chop.
pub fn obvious_action(game: &HypotheticalGame) -> Option<Move> {
    if let Some(mv) = play_proven(game) {
        return Some(mv);
    }
    if game.can_discard() {
        if let Some(mv) = discard_useless(game) {
            return Some(mv);
        }
        if let Some(mv) = discard_oldest_untouched(game) {
            return Some(mv);
        }
        if let Some(card) = game.hands[game.current_player].last() {
            return Some(Move::Discard { card: card.id });
        }
    }
    None
}

/// Applies one candidate move to the acting player's hypothetical state,
/// lets every model observe it, then fast-forwards the remaining seats
/// through obvious actions for at most one round. An illegal simulated move
/// aborts the branch (`None`); it never escapes the rollout.
pub fn rollout(
    engine: &SimulationEngine,
    me: usize,
    mv: Move,
    clue_distance: usize,
) -> Option<Score> {
    let root = engine.models()[me].current()?;
    let mut game = root.apply(mv).ok()?;
    let mut models: Vec<PlayerModel> = engine
        .models()
        .iter()
        .map(|model| model.observe_game(&game))
        .collect();

    for _ in 0..game.player_count().saturating_sub(1) {
        let player = game.current_player;
        let Some(scoped) = models[player].current() else {
            break;
        };
        let Some(step) = obvious_action(scoped) else {
            break;
        };
        let Ok(next) = game.apply(step) else {
            break;
        };
        game = next;
        models = models
            .iter()
            .map(|model| model.observe_game(&game))
            .collect();
    }

    let final_game = models[me].current()?;
    Some(Score::of(final_game, clue_distance))
}

#[cfg(test)]
mod tests {
    use super::{obvious_action, rollout};
    use crate::belief::HypotheticalGame;
    use crate::search::SimulationEngine;
    use hanabi_core::{
        Card, CardId, CardValue, Clue, Color, Deck, GameState, Hand, Move, Rank,
    };

    fn card(id: u32, color: Color, rank: Rank) -> Card {
        Card::new(CardId(id), CardValue::new(color, rank))
    }

    fn empty_deck() -> Deck {
        let mut deck = Deck::full();
        while deck.draw().is_some() {}
        deck
    }

    #[test]
    fn obvious_action_prefers_proven_plays() {
        let mut pinned = card(0, Color::Red, Rank::One);
        pinned.note_clue(Clue::Color(Color::Red));
        pinned.note_clue(Clue::Rank(Rank::One));
        let hands = vec![
            Hand::with_cards(vec![pinned, card(1, Color::Green, Rank::Four)]),
            Hand::with_cards(vec![card(2, Color::Blue, Rank::Two)]),
        ];
        let state = GameState::from_hands(hands, empty_deck(), 0);
        let game = HypotheticalGame::from_view(&state.view_for(0));
        assert_eq!(obvious_action(&game), Some(Move::Play { card: CardId(0) }));
    }

    #[test]
    fn obvious_action_falls_back_to_the_chop() {
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
            obvious_action(&game),
            Some(Move::Discard { card: CardId(1) })
        );
    }

    #[test]
    fn rollout_scores_a_candidate_clue() {
        let state = GameState::new_with_seed(3, 29);
        let me = state.current_player();
        let views = vec![state.view_for(me)];
        let engine = SimulationEngine::new(3).catch_up(&views);

        let clue = views[0]
            .legal_moves()
            .into_iter()
            .find(|mv| matches!(mv, Move::Clue { .. }))
            .unwrap();
        let score = rollout(&engine, me, clue, 1).unwrap();
        assert!(score.lives <= 3);
        assert!(score.max_score <= 25);
    }

    #[test]
    fn rollout_rejects_illegal_candidates() {
        let state = GameState::new_with_seed(3, 29);
        let me = state.current_player();
        let views = vec![state.view_for(me)];
        let engine = SimulationEngine::new(3).catch_up(&views);
        // Discarding at the token maximum is illegal; the branch dies.
        let id = views[0].hands[me][0].id;
        assert!(rollout(&engine, me, Move::Discard { card: id }, 0).is_none());
    }
}
