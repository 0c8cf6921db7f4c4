//! Pitchers of record and complete-game credit.

use crate::constants::{SAVE_MAX_MARGIN, SAVE_MIN_OUTS, STARTER_WIN_MIN_OUTS};
use crate::player::PlayerId;
use crate::result::{Side, TeamPair};
use crate::stats::{PitchingDecision, PitchingEntry, StatBook};

/// W, L and SV attribution for one finished game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decisions {
    pub winner: Option<PlayerId>,
    pub loser: Option<PlayerId>,
    pub save: Option<PlayerId>,
}

/// Winning pitcher: the starter after at least five innings, otherwise the
/// reliever with the most outs (earliest on ties).
fn winning_pitcher(entries: &[PitchingEntry]) -> Option<PlayerId> {
    let (starter, relievers) = entries.split_first()?;
    if starter.line.outs >= STARTER_WIN_MIN_OUTS || relievers.is_empty() {
        return Some(starter.player.clone());
    }
    relievers
        .iter()
        .rev()
        .max_by_key(|entry| entry.line.outs)
        .map(|entry| entry.player.clone())
}

/// Save: the winning side's finisher when not the winner, with at least three
/// outs and a final margin within three.
fn save_pitcher(entries: &[PitchingEntry], winner: &PlayerId, margin: u32) -> Option<PlayerId> {
    if margin > SAVE_MAX_MARGIN || entries.len() < 2 {
        return None;
    }
    let finisher = entries.last()?;
    if &finisher.player == winner || finisher.line.outs < SAVE_MIN_OUTS {
        return None;
    }
    Some(finisher.player.clone())
}

/// Assign decisions from final score and both sides' pitching order. A tie
/// (only possible on a truncated game) yields no decisions.
///
/// The loss always goes to the losing side's starter, even when a reliever
/// gave up the deciding runs after the starter left with a lead.
#[must_use]
pub fn decide(score: &TeamPair<u32>, books: &TeamPair<StatBook>) -> Decisions {
    let winning_side = match score.home.cmp(&score.away) {
        std::cmp::Ordering::Greater => Side::Home,
        std::cmp::Ordering::Less => Side::Away,
        std::cmp::Ordering::Equal => return Decisions::default(),
    };
    let margin = score.home.abs_diff(score.away);
    let winning = &books.get(winning_side).pitching;
    let losing = &books.get(winning_side.opponent()).pitching;

    let winner = winning_pitcher(winning);
    let save = winner
        .as_ref()
        .and_then(|winner| save_pitcher(winning, winner, margin));
    Decisions {
        winner,
        loser: losing.first().map(|entry| entry.player.clone()),
        save,
    }
}

/// Write the decisions onto the matching pitching lines.
pub fn apply(decisions: &Decisions, books: &mut TeamPair<StatBook>) {
    let marks = [
        (&decisions.winner, PitchingDecision::Win),
        (&decisions.loser, PitchingDecision::Loss),
        (&decisions.save, PitchingDecision::Save),
    ];
    for (player, decision) in marks {
        let Some(player) = player else { continue };
        for book in [&mut books.away, &mut books.home] {
            if let Some(entry) = book.pitching.iter_mut().find(|entry| &entry.player == player) {
                entry.line.decision = Some(decision);
            }
        }
    }
}

/// A side threw a complete game when one pitcher got every out.
#[must_use]
pub fn complete_games(books: &TeamPair<StatBook>) -> TeamPair<bool> {
    TeamPair::new(
        books.away.pitching.len() == 1,
        books.home.pitching.len() == 1,
    )
}

/// A complete game that held the opponent scoreless.
#[must_use]
pub fn shutouts(complete: &TeamPair<bool>, score: &TeamPair<u32>) -> TeamPair<bool> {
    TeamPair::new(
        complete.away && score.home == 0,
        complete.home && score.away == 0,
    )
}
