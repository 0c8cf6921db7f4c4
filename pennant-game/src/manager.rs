//! Manager decision engine.
//!
//! Each team plays the whole game under one fixed [`ManagerProfile`]. A
//! decision fires when one draw lands under
//! `situational factor x profile threshold x inning multiplier`. Every
//! decision has its own eligibility gate, and a gated-out decision never
//! touches the generator.

use serde::{Deserialize, Serialize};

use crate::bases::BaseState;
use crate::constants::{
    CLOSE_GAME_MAX_DIFF, LATE_INNING_START, PINCH_HIT_MAX_DEFICIT, PINCH_HIT_MIN_INNING,
    SAVE_SITUATION_MAX_LEAD, STEAL_MAX_SCORE_DIFF,
};
use crate::rng::SeededRandom;

/// Named manager personality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileId {
    Conservative,
    Aggressive,
    Balanced,
    Analytical,
}

impl ProfileId {
    pub const ALL: [Self; 4] = [
        Self::Conservative,
        Self::Aggressive,
        Self::Balanced,
        Self::Analytical,
    ];

    #[must_use]
    pub const fn profile(self) -> &'static ManagerProfile {
        match self {
            Self::Conservative => &CONSERVATIVE,
            Self::Aggressive => &AGGRESSIVE,
            Self::Balanced => &BALANCED,
            Self::Analytical => &ANALYTICAL,
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Aggressive => "aggressive",
            Self::Balanced => "balanced",
            Self::Analytical => "analytical",
        }
    }

    /// Parse a profile key, case-insensitively.
    #[must_use]
    pub fn from_key(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|id| id.key().eq_ignore_ascii_case(raw.trim()))
    }
}

/// In-game decision a manager can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tactic {
    Steal,
    Bunt,
    IntentionalWalk,
    PullPitcher,
    HitAndRun,
    PinchHit,
    AggressiveRunning,
    CloserUsage,
}

/// Nine decision thresholds plus the late and extra inning multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ManagerProfile {
    pub id: ProfileId,
    pub steal: f64,
    pub bunt: f64,
    pub intentional_walk: f64,
    pub pull_pitcher: f64,
    pub hit_and_run: f64,
    pub pinch_hit: f64,
    pub aggressive_running: f64,
    pub closer_usage: f64,
    pub min_steal_speed: f64,
    pub late_multiplier: f64,
    pub extra_multiplier: f64,
}

pub const CONSERVATIVE: ManagerProfile = ManagerProfile {
    id: ProfileId::Conservative,
    steal: 0.4,
    bunt: 0.9,
    intentional_walk: 0.5,
    pull_pitcher: 1.2,
    hit_and_run: 0.3,
    pinch_hit: 0.6,
    aggressive_running: 0.4,
    closer_usage: 1.0,
    min_steal_speed: 0.7,
    late_multiplier: 1.2,
    extra_multiplier: 1.4,
};

pub const AGGRESSIVE: ManagerProfile = ManagerProfile {
    id: ProfileId::Aggressive,
    steal: 1.4,
    bunt: 0.5,
    intentional_walk: 0.8,
    pull_pitcher: 0.8,
    hit_and_run: 1.3,
    pinch_hit: 1.0,
    aggressive_running: 1.4,
    closer_usage: 0.9,
    min_steal_speed: 0.5,
    late_multiplier: 1.3,
    extra_multiplier: 1.6,
};

pub const BALANCED: ManagerProfile = ManagerProfile {
    id: ProfileId::Balanced,
    steal: 1.0,
    bunt: 1.0,
    intentional_walk: 1.0,
    pull_pitcher: 1.0,
    hit_and_run: 1.0,
    pinch_hit: 1.0,
    aggressive_running: 1.0,
    closer_usage: 1.0,
    min_steal_speed: 0.6,
    late_multiplier: 1.15,
    extra_multiplier: 1.3,
};

pub const ANALYTICAL: ManagerProfile = ManagerProfile {
    id: ProfileId::Analytical,
    steal: 0.7,
    bunt: 0.2,
    intentional_walk: 0.3,
    pull_pitcher: 1.1,
    hit_and_run: 0.5,
    pinch_hit: 1.2,
    aggressive_running: 0.8,
    closer_usage: 1.1,
    min_steal_speed: 0.65,
    late_multiplier: 1.25,
    extra_multiplier: 1.5,
};

/// Game situation as seen by the manager making the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Situation {
    pub inning: u32,
    pub outs: u8,
    /// The deciding team's runs minus the opponent's.
    pub score_diff: i32,
    pub regulation_innings: u32,
}

impl ManagerProfile {
    #[must_use]
    pub const fn threshold(&self, tactic: Tactic) -> f64 {
        match tactic {
            Tactic::Steal => self.steal,
            Tactic::Bunt => self.bunt,
            Tactic::IntentionalWalk => self.intentional_walk,
            Tactic::PullPitcher => self.pull_pitcher,
            Tactic::HitAndRun => self.hit_and_run,
            Tactic::PinchHit => self.pinch_hit,
            Tactic::AggressiveRunning => self.aggressive_running,
            Tactic::CloserUsage => self.closer_usage,
        }
    }

    /// 1.0 through the sixth, the late multiplier through regulation, the
    /// extra multiplier after that.
    #[must_use]
    pub const fn inning_multiplier(&self, inning: u32, regulation_innings: u32) -> f64 {
        if inning < LATE_INNING_START {
            1.0
        } else if inning <= regulation_innings {
            self.late_multiplier
        } else {
            self.extra_multiplier
        }
    }

    #[must_use]
    pub fn score(&self, tactic: Tactic, factor: f64, situation: &Situation) -> f64 {
        factor.max(0.0)
            * self.threshold(tactic)
            * self.inning_multiplier(situation.inning, situation.regulation_innings)
    }

    /// One draw against the decision score.
    pub fn fires(
        &self,
        tactic: Tactic,
        factor: f64,
        situation: &Situation,
        rng: &mut SeededRandom,
    ) -> bool {
        let score = self.score(tactic, factor, situation);
        rng.next_float() < score
    }

    /// Steal gate: fewer than two out, a close game and a fast enough runner.
    #[must_use]
    pub fn steal_eligible(&self, situation: &Situation, runner_speed: f64) -> bool {
        situation.outs < 2
            && situation.score_diff.abs() < STEAL_MAX_SCORE_DIFF
            && runner_speed >= self.min_steal_speed
    }

    /// Attempt a steal. `success_probability` is the runner-versus-catcher race.
    pub fn decide_steal(
        &self,
        situation: &Situation,
        runner_speed: f64,
        success_probability: f64,
        rng: &mut SeededRandom,
    ) -> bool {
        if !self.steal_eligible(situation, runner_speed) {
            return false;
        }
        self.fires(Tactic::Steal, 0.2 * success_probability, situation, rng)
    }

    /// Walk the batter on purpose. Fielding-side `situation`; `threat` is the
    /// batter's power/contact blend in `0..=1`.
    pub fn decide_intentional_walk(
        &self,
        situation: &Situation,
        bases: &BaseState,
        threat: f64,
        rng: &mut SeededRandom,
    ) -> bool {
        let eligible = bases.first.is_none()
            && bases.runner_in_scoring_position()
            && situation.inning >= LATE_INNING_START
            && situation.score_diff.abs() <= CLOSE_GAME_MAX_DIFF;
        if !eligible {
            return false;
        }
        self.fires(Tactic::IntentionalWalk, 0.25 * threat, situation, rng)
    }

    /// Sacrifice bunt for a weak hitter with a runner on first or second.
    pub fn decide_bunt(
        &self,
        situation: &Situation,
        bases: &BaseState,
        batter_contact: f64,
        pitcher_batting: bool,
        rng: &mut SeededRandom,
    ) -> bool {
        let eligible = situation.outs < 2
            && (bases.first.is_some() || bases.second.is_some())
            && bases.third.is_none()
            && (pitcher_batting || batter_contact < 0.5)
            && situation.score_diff.abs() <= CLOSE_GAME_MAX_DIFF;
        if !eligible {
            return false;
        }
        let mut factor = 0.3 * (1.0 - batter_contact);
        if pitcher_batting {
            factor += 0.4;
        }
        self.fires(Tactic::Bunt, factor.min(1.0), situation, rng)
    }

    /// Pull the pitcher. The fatigue signal is `1 - grade_pct`, raised by a
    /// run of consecutive baserunners.
    pub fn decide_pull(
        &self,
        situation: &Situation,
        grade_pct: f64,
        consecutive_baserunners: u32,
        rng: &mut SeededRandom,
    ) -> bool {
        let factor = (1.0 - grade_pct).max(0.0) + 0.08 * f64::from(consecutive_baserunners);
        if factor <= 0.0 {
            return false;
        }
        self.fires(Tactic::PullPitcher, factor, situation, rng)
    }

    /// Start the runner on first with the pitch.
    pub fn decide_hit_and_run(
        &self,
        situation: &Situation,
        bases: &BaseState,
        batter_contact: f64,
        runner_speed: f64,
        rng: &mut SeededRandom,
    ) -> bool {
        let eligible = situation.outs < 2
            && bases.first.is_some()
            && bases.second.is_none()
            && batter_contact >= 0.5
            && situation.score_diff.abs() <= SAVE_SITUATION_MAX_LEAD;
        if !eligible {
            return false;
        }
        self.fires(
            Tactic::HitAndRun,
            0.15 * batter_contact * runner_speed,
            situation,
            rng,
        )
    }

    /// Send up a pinch hitter late in a close game when the bench has a
    /// better bat. `upgrade` is the bench hitter's quality edge.
    pub fn decide_pinch_hit(
        &self,
        situation: &Situation,
        upgrade: f64,
        pitcher_batting: bool,
        rng: &mut SeededRandom,
    ) -> bool {
        let eligible = situation.inning >= PINCH_HIT_MIN_INNING
            && (-PINCH_HIT_MAX_DEFICIT..=0).contains(&situation.score_diff)
            && upgrade > 0.0;
        if !eligible {
            return false;
        }
        let mut factor = upgrade * 1.5;
        if pitcher_batting {
            factor += 0.3;
        }
        self.fires(Tactic::PinchHit, factor.min(1.0), situation, rng)
    }

    /// Send a runner for an extra base given the race probability.
    pub fn decide_aggressive_running(
        &self,
        situation: &Situation,
        success_probability: f64,
        rng: &mut SeededRandom,
    ) -> bool {
        self.fires(
            Tactic::AggressiveRunning,
            0.6 * success_probability,
            situation,
            rng,
        )
    }

    /// Bring in the closer. Fielding-side `situation`; only in a save spot.
    pub fn decide_closer(&self, situation: &Situation, rng: &mut SeededRandom) -> bool {
        if !is_save_situation(situation) {
            return false;
        }
        self.fires(Tactic::CloserUsage, 1.0, situation, rng)
    }
}

/// Regulation's last inning or later with the fielding team up by one to three.
#[must_use]
pub fn is_save_situation(situation: &Situation) -> bool {
    situation.inning >= situation.regulation_innings
        && (1..=SAVE_SITUATION_MAX_LEAD).contains(&situation.score_diff)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn situation(inning: u32, outs: u8, score_diff: i32) -> Situation {
        Situation {
            inning,
            outs,
            score_diff,
            regulation_innings: 9,
        }
    }

    #[test]
    fn exactly_four_profiles_with_unique_keys() {
        let keys: std::collections::BTreeSet<_> =
            ProfileId::ALL.iter().map(|id| id.key()).collect();
        assert_eq!(keys.len(), 4);
        for id in ProfileId::ALL {
            assert_eq!(id.profile().id, id);
            assert_eq!(ProfileId::from_key(&id.key().to_uppercase()), Some(id));
        }
        assert_eq!(ProfileId::from_key("reckless"), None);
    }

    #[test]
    fn inning_multiplier_steps() {
        let profile = ProfileId::Aggressive.profile();
        assert!((profile.inning_multiplier(1, 9) - 1.0).abs() < f64::EPSILON);
        assert!((profile.inning_multiplier(6, 9) - 1.0).abs() < f64::EPSILON);
        assert!((profile.inning_multiplier(7, 9) - 1.3).abs() < f64::EPSILON);
        assert!((profile.inning_multiplier(9, 9) - 1.3).abs() < f64::EPSILON);
        assert!((profile.inning_multiplier(10, 9) - 1.6).abs() < f64::EPSILON);
        for id in ProfileId::ALL {
            let p = id.profile();
            assert!(p.extra_multiplier > p.late_multiplier);
        }
    }

    #[test]
    fn score_combines_factor_threshold_and_multiplier() {
        let profile = ProfileId::Conservative.profile();
        let late = situation(8, 0, 0);
        let score = profile.score(Tactic::Bunt, 0.5, &late);
        assert!((score - 0.5 * 0.9 * 1.2).abs() < 1e-12);
        assert!(profile.score(Tactic::Steal, -1.0, &late).abs() < f64::EPSILON);
    }

    #[test]
    fn gated_out_decisions_never_draw() {
        let profile = ProfileId::Aggressive.profile();
        let mut rng = SeededRandom::new(12);
        let empty = BaseState::empty();
        let two_out = situation(3, 2, 0);
        assert!(!profile.decide_steal(&two_out, 0.9, 0.9, &mut rng));
        assert!(!profile.decide_steal(&situation(3, 0, 5), 0.9, 0.9, &mut rng));
        assert!(!profile.decide_steal(&situation(3, 0, 0), 0.2, 0.9, &mut rng));
        assert!(!profile.decide_intentional_walk(&situation(8, 1, 0), &empty, 1.0, &mut rng));
        assert!(!profile.decide_bunt(&situation(3, 0, 0), &empty, 0.1, true, &mut rng));
        assert!(!profile.decide_hit_and_run(&situation(3, 0, 0), &empty, 0.9, 0.9, &mut rng));
        assert!(!profile.decide_pinch_hit(&situation(5, 0, -1), 0.5, true, &mut rng));
        assert!(!profile.decide_pinch_hit(&situation(8, 0, 2), 0.5, true, &mut rng));
        assert!(!profile.decide_closer(&situation(8, 0, 2), &mut rng));
        assert!(!profile.decide_pull(&situation(3, 0, 0), 1.0, 0, &mut rng));
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn eligible_decisions_draw_once() {
        let profile = ProfileId::Balanced.profile();
        let mut rng = SeededRandom::new(12);
        let on_second = BaseState::empty().with_runner(crate::bases::Base::Second, "r".into());
        let _ = profile.decide_intentional_walk(&situation(8, 1, -1), &on_second, 0.8, &mut rng);
        assert_eq!(rng.draws(), 1);
        let _ = profile.decide_closer(&situation(9, 0, 2), &mut rng);
        assert_eq!(rng.draws(), 2);
    }

    #[test]
    fn save_situation_window() {
        assert!(is_save_situation(&situation(9, 0, 1)));
        assert!(is_save_situation(&situation(11, 0, 3)));
        assert!(!is_save_situation(&situation(9, 0, 4)));
        assert!(!is_save_situation(&situation(9, 0, 0)));
        assert!(!is_save_situation(&situation(8, 0, 2)));
    }

    #[test]
    fn fatigue_drives_pull_rate() {
        let profile = ProfileId::Balanced.profile();
        let mut fresh_rng = SeededRandom::new(77);
        let mut tired_rng = SeededRandom::new(77);
        let early = situation(4, 0, 0);
        let fresh_pulls = (0..2_000)
            .filter(|_| profile.decide_pull(&early, 0.95, 0, &mut fresh_rng))
            .count();
        let tired_pulls = (0..2_000)
            .filter(|_| profile.decide_pull(&early, 0.5, 2, &mut tired_rng))
            .count();
        assert!(tired_pulls > fresh_pulls * 3);
    }
}
