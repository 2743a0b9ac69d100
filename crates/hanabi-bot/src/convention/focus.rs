use crate::belief::{HypotheticalCard, HypotheticalGame};
use hanabi_core::Clue;

/// Where a clue's inferential payload landed within the target hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusInfo {
    pub index: usize,
    pub is_chop: bool,
    pub was_untouched: bool,
}

/// The rightmost never-positively-clued card: next to go if nothing is known.
pub fn chop_index(hand: &[HypotheticalCard]) -> Option<usize> {
    hand.iter().rposition(|card| !card.is_clued())
}

/// Exactly one card carries a clue's payload: the chop if the clue touched
/// it while unclued, else the newest (leftmost) freshly-touched card that
/// was previously untouched, else the first touched card in hand order.
pub fn clue_focus(
    old_hand: &[HypotheticalCard],
    new_hand: &[HypotheticalCard],
    clue: Clue,
) -> Option<FocusInfo> {
    let touched: Vec<usize> = (0..new_hand.len())
        .filter(|index| new_hand[*index].marks.positive_for(clue))
        .collect();
    if touched.is_empty() {
        return None;
    }

    if let Some(chop) = chop_index(old_hand) {
        if touched.contains(&chop) {
            return Some(FocusInfo {
                index: chop,
                is_chop: true,
                was_untouched: true,
            });
        }
    }

    if let Some(&index) = touched.iter().find(|&&index| !old_hand[index].is_clued()) {
        return Some(FocusInfo {
            index,
            is_chop: false,
            was_untouched: true,
        });
    }

    Some(FocusInfo {
        index: touched[0],
        is_chop: false,
        was_untouched: false,
    })
}

/// The focus of the clue that produced the latest snapshot, resolved from
/// the clue target's own perspective.
#[derive(Debug, Clone)]
pub struct HistoryFocus {
    pub target: usize,
    pub index: usize,
    pub clue: Clue,
    pub is_chop: bool,
    pub was_untouched: bool,
    pub old_card: HypotheticalCard,
    pub new_card: HypotheticalCard,
}

pub fn history_focus(history: &[HypotheticalGame]) -> Option<HistoryFocus> {
    if history.len() < 2 {
        return None;
    }
    let current = &history[history.len() - 1];
    let previous = &history[history.len() - 2];
    let (target, clue) = current.last_move.as_ref()?.clue()?;

    let old_pov = previous.as_view_for(target);
    let new_pov = current.as_view_for(target);
    let info = clue_focus(&old_pov.hands[target], &new_pov.hands[target], clue)?;

    Some(HistoryFocus {
        target,
        index: info.index,
        clue,
        is_chop: info.is_chop,
        was_untouched: info.was_untouched,
        old_card: old_pov.hands[target][info.index].clone(),
        new_card: current.hands[target][info.index].clone(),
    })
}
