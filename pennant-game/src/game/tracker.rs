//! The single mutable record threaded through every step of a game.

use serde::{Deserialize, Serialize};

use crate::bases::BaseState;
use crate::constants::OUTS_PER_HALF;
use crate::manager::Situation;
use crate::player::PlayerId;
use crate::result::{HalfInning, LineScore, PlayEvent, PlayKind, Side, TeamPair};

/// Lifecycle of one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    NotStarted,
    InProgress,
    Completed,
}

/// How the half-inning loop moved after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Same half continues.
    Continue,
    /// Three out; the next half begins.
    NextHalf,
    /// The game is over.
    GameOver,
}

/// Inning, half, outs, bases, score and the per-half bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTracker {
    pub status: GameStatus,
    pub inning: u32,
    pub half: HalfInning,
    pub outs: u8,
    pub bases: BaseState,
    pub score: TeamPair<u32>,
    pub hits: TeamPair<u32>,
    pub errors: TeamPair<u32>,
    pub half_runs: u32,
    pub unearned_budget: u32,
    pub plate_appearances: u32,
    pub line_score: LineScore,
    pub regulation_innings: u32,
}

impl GameTracker {
    #[must_use]
    pub fn new(regulation_innings: u32) -> Self {
        Self {
            status: GameStatus::NotStarted,
            inning: 1,
            half: HalfInning::Top,
            outs: 0,
            bases: BaseState::empty(),
            score: TeamPair::default(),
            hits: TeamPair::default(),
            errors: TeamPair::default(),
            half_runs: 0,
            unearned_budget: 0,
            plate_appearances: 0,
            line_score: LineScore::default(),
            regulation_innings,
        }
    }

    /// Enter the top of the first.
    pub fn start(&mut self) {
        self.status = GameStatus::InProgress;
        self.open_half();
    }

    #[must_use]
    pub const fn batting(&self) -> Side {
        self.half.batting()
    }

    #[must_use]
    pub const fn fielding(&self) -> Side {
        self.half.fielding()
    }

    /// The game as `side`'s manager sees it.
    #[must_use]
    pub fn situation(&self, side: Side) -> Situation {
        let own = i64::from(*self.score.get(side));
        let opponent = i64::from(*self.score.get(side.opponent()));
        Situation {
            inning: self.inning,
            outs: self.outs,
            score_diff: i32::try_from(own - opponent).unwrap_or(0),
            regulation_innings: self.regulation_innings,
        }
    }

    /// Play-by-play entry stamped with the current state.
    #[must_use]
    pub fn event(
        &self,
        pitcher: &PlayerId,
        batter: Option<PlayerId>,
        kind: PlayKind,
        tag: String,
    ) -> PlayEvent {
        PlayEvent {
            inning: self.inning,
            half: self.half,
            batter,
            pitcher: pitcher.clone(),
            kind,
            tag,
            runs_scored: 0,
            outs_after: self.outs,
            bases_after: self.bases.clone(),
            score: self.score,
            umpire_override: false,
            error: false,
        }
    }

    #[must_use]
    pub const fn is_late_regulation(&self) -> bool {
        self.inning >= self.regulation_innings
    }

    fn open_half(&mut self) {
        self.outs = 0;
        self.bases = BaseState::empty();
        self.half_runs = 0;
        self.unearned_budget = 0;
        match self.half {
            HalfInning::Top => self.line_score.away.push(0),
            HalfInning::Bottom => self.line_score.home.push(Some(0)),
        }
    }

    /// Credit runs to the batting side and return how many were unearned.
    pub fn score_runs(&mut self, runs: u32) -> u32 {
        if runs == 0 {
            return 0;
        }
        let side = self.batting();
        *self.score.get_mut(side) += runs;
        self.half_runs += runs;
        match self.half {
            HalfInning::Top => {
                if let Some(cell) = self.line_score.away.last_mut() {
                    *cell += runs;
                }
            }
            HalfInning::Bottom => {
                if let Some(Some(cell)) = self.line_score.home.last_mut() {
                    *cell += runs;
                }
            }
        }
        let unearned = runs.min(self.unearned_budget);
        self.unearned_budget -= unearned;
        unearned
    }

    /// A fielding error opens room for one unearned run this half.
    pub fn record_error(&mut self) {
        let side = self.fielding();
        *self.errors.get_mut(side) += 1;
        self.unearned_budget += 1;
    }

    pub fn record_hit(&mut self) {
        let side = self.batting();
        *self.hits.get_mut(side) += 1;
    }

    /// Add outs, capped at three.
    pub fn add_outs(&mut self, outs: u8) {
        self.outs = (self.outs + outs).min(OUTS_PER_HALF);
    }

    #[must_use]
    pub const fn half_over(&self) -> bool {
        self.outs >= OUTS_PER_HALF
    }

    /// Home has taken the lead in the bottom of a late inning.
    #[must_use]
    pub fn is_walk_off(&self) -> bool {
        matches!(self.half, HalfInning::Bottom)
            && self.is_late_regulation()
            && self.score.home > self.score.away
    }

    /// Decide what follows the play just committed, advancing the half or
    /// completing the game.
    pub fn advance(&mut self) -> Transition {
        if self.is_walk_off() {
            self.status = GameStatus::Completed;
            return Transition::GameOver;
        }
        if !self.half_over() {
            return Transition::Continue;
        }
        match self.half {
            HalfInning::Top => {
                if self.is_late_regulation() && self.score.home > self.score.away {
                    self.line_score.home.push(None);
                    self.status = GameStatus::Completed;
                    return Transition::GameOver;
                }
                self.half = HalfInning::Bottom;
            }
            HalfInning::Bottom => {
                if self.is_late_regulation() && self.score.home != self.score.away {
                    self.status = GameStatus::Completed;
                    return Transition::GameOver;
                }
                self.inning += 1;
                self.half = HalfInning::Top;
            }
        }
        self.open_half();
        Transition::NextHalf
    }

    /// Stop the game at the plate-appearance ceiling.
    pub fn truncate(&mut self) {
        if matches!(self.half, HalfInning::Top) {
            self.line_score.home.push(None);
        }
        self.status = GameStatus::Completed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finish_half(tracker: &mut GameTracker) -> Transition {
        tracker.add_outs(3);
        tracker.advance()
    }

    #[test]
    fn halves_alternate_and_reset_state() {
        let mut tracker = GameTracker::new(9);
        tracker.start();
        tracker.bases = BaseState::empty().with_runner(crate::bases::Base::First, "r".into());
        tracker.add_outs(2);
        assert_eq!(tracker.advance(), Transition::Continue);
        assert_eq!(finish_half(&mut tracker), Transition::NextHalf);
        assert_eq!(tracker.half, HalfInning::Bottom);
        assert_eq!(tracker.outs, 0);
        assert!(tracker.bases.is_empty());
        assert_eq!(finish_half(&mut tracker), Transition::NextHalf);
        assert_eq!(tracker.inning, 2);
        assert_eq!(tracker.line_score.away.len(), 2);
        assert_eq!(tracker.line_score.home.len(), 1);
    }

    #[test]
    fn home_lead_after_top_of_ninth_skips_bottom() {
        let mut tracker = GameTracker::new(9);
        tracker.start();
        for _ in 0..16 {
            finish_half(&mut tracker);
        }
        assert_eq!((tracker.inning, tracker.half), (9, HalfInning::Top));
        tracker.score = TeamPair::new(1, 2);
        assert_eq!(finish_half(&mut tracker), Transition::GameOver);
        assert_eq!(tracker.line_score.home.last(), Some(&None));
        assert_eq!(tracker.status, GameStatus::Completed);
    }

    #[test]
    fn walk_off_ends_mid_half() {
        let mut tracker = GameTracker::new(9);
        tracker.start();
        for _ in 0..17 {
            finish_half(&mut tracker);
        }
        assert_eq!((tracker.inning, tracker.half), (9, HalfInning::Bottom));
        tracker.score.away = 3;
        tracker.score_runs(3);
        assert_eq!(tracker.advance(), Transition::Continue);
        tracker.score_runs(1);
        assert_eq!(tracker.advance(), Transition::GameOver);
        assert_eq!(tracker.line_score.home_total(), 4);
    }

    #[test]
    fn ties_go_to_extra_innings() {
        let mut tracker = GameTracker::new(9);
        tracker.start();
        for _ in 0..18 {
            assert_ne!(finish_half(&mut tracker), Transition::GameOver);
        }
        assert_eq!(tracker.inning, 10);
    }

    #[test]
    fn unearned_budget_drains_with_runs() {
        let mut tracker = GameTracker::new(9);
        tracker.start();
        tracker.record_error();
        assert_eq!(tracker.errors.home, 1);
        assert_eq!(tracker.score_runs(2), 1);
        assert_eq!(tracker.score_runs(1), 0);
        assert_eq!(tracker.score.away, 3);
        assert_eq!(tracker.line_score.away_total(), 3);
    }

    #[test]
    fn situation_is_relative_to_the_deciding_side() {
        let mut tracker = GameTracker::new(9);
        tracker.start();
        tracker.score = TeamPair::new(2, 5);
        assert_eq!(tracker.situation(Side::Away).score_diff, -3);
        assert_eq!(tracker.situation(Side::Home).score_diff, 3);
        tracker.add_outs(1);
        let event = tracker.event(&PlayerId::new("p"), None, PlayKind::GameOver, "FINAL".into());
        assert_eq!(event.outs_after, 1);
        assert_eq!(event.score, TeamPair::new(2, 5));
    }
}
