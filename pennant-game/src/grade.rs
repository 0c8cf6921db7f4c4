//! Pitcher grade and fatigue model.
//!
//! The effective grade for a pitch is built in five ordered layers, each a
//! pure function of the previous layer's output:
//!
//! 1. fatigue past stamina
//! 2. relief penalty for non-closers entering mid-game
//! 3. fresh-arm bonus during a flagged pitcher's first inning of work
//! 4. platoon advantage on same-side matchups
//! 5. one random draw from the variance table
//!
//! Only the last layer consumes randomness.

use serde::{Deserialize, Serialize};

use crate::config::GradeConfig;
use crate::constants::{GRADE_MAX, GRADE_MIN, OUTS_PER_INNING};
use crate::numbers::{floor_f64_to_i32, outs_to_innings};
use crate::player::{Handedness, PitcherRole, PitchingProfile, PlayerId};
use crate::rng::SeededRandom;

/// Per-pitcher, per-appearance state. Created fresh whenever a pitcher enters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitcherGameState {
    pub pitcher: PlayerId,
    pub started_game: bool,
    pub outs_recorded: u32,
    pub batters_faced: u32,
    pub hits_allowed: u32,
    pub runs_allowed: u32,
    pub earned_runs: u32,
    pub consecutive_baserunners: u32,
    pub entered_inning: u32,
    pub current_inning: u32,
    pub shutout_intact: bool,
    pub no_hitter_intact: bool,
    /// Fielding team's lead when the pitcher entered (negative when trailing).
    pub margin_at_entry: i32,
}

impl PitcherGameState {
    #[must_use]
    pub const fn starter(pitcher: PlayerId) -> Self {
        Self::entering(pitcher, true, 1, 0)
    }

    #[must_use]
    pub const fn reliever(pitcher: PlayerId, inning: u32, margin: i32) -> Self {
        Self::entering(pitcher, false, inning, margin)
    }

    const fn entering(pitcher: PlayerId, started_game: bool, inning: u32, margin: i32) -> Self {
        Self {
            pitcher,
            started_game,
            outs_recorded: 0,
            batters_faced: 0,
            hits_allowed: 0,
            runs_allowed: 0,
            earned_runs: 0,
            consecutive_baserunners: 0,
            entered_inning: inning,
            current_inning: inning,
            shutout_intact: true,
            no_hitter_intact: true,
            margin_at_entry: margin,
        }
    }

    #[must_use]
    pub fn innings_pitched(&self) -> f64 {
        outs_to_innings(self.outs_recorded)
    }

    /// Still inside the first full inning of this appearance.
    #[must_use]
    pub const fn in_first_inning_of_work(&self) -> bool {
        self.outs_recorded < OUTS_PER_INNING
    }

    pub fn record_outs(&mut self, outs: u32) {
        self.outs_recorded += outs;
    }

    /// Book a completed plate appearance against this pitcher.
    pub fn record_batter(&mut self, reached: bool, hit: bool) {
        self.batters_faced += 1;
        if reached {
            self.consecutive_baserunners += 1;
        } else {
            self.consecutive_baserunners = 0;
        }
        if hit {
            self.hits_allowed += 1;
            self.no_hitter_intact = false;
        }
    }

    pub fn record_runs(&mut self, runs: u32, earned: u32) {
        if runs > 0 {
            self.runs_allowed += runs;
            self.earned_runs += earned;
            self.shutout_intact = false;
        }
    }
}

/// Per-layer breakdown of one effective-grade computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeBreakdown {
    pub base: i32,
    pub after_fatigue: i32,
    pub after_relief: i32,
    pub after_fresh: i32,
    pub after_platoon: i32,
    pub variance: i32,
    pub effective: i32,
}

fn add_capped(grade: i32, bonus: i32, cap: i32) -> i32 {
    if grade >= cap {
        grade
    } else {
        (grade + bonus).min(cap)
    }
}

/// Layer 1: linear decay past stamina, floored at the minimum grade.
#[must_use]
pub fn fatigue_layer(base: i32, innings_pitched: f64, stamina: f64, decay_per_inning: i32) -> i32 {
    if innings_pitched <= stamina {
        return base;
    }
    let decay = floor_f64_to_i32((innings_pitched - stamina) * f64::from(decay_per_inning));
    (base - decay).max(GRADE_MIN)
}

/// Layer 2: non-closer relievers who entered mid-game lose a fixed amount.
#[must_use]
pub fn relief_layer(grade: i32, role: PitcherRole, started_game: bool, penalty: i32) -> i32 {
    if started_game || role == PitcherRole::Closer {
        return grade;
    }
    (grade - penalty).max(GRADE_MIN)
}

/// Layer 3: flagged fresh arms get a bonus during their first inning of work.
#[must_use]
pub fn fresh_layer(grade: i32, fresh: bool, first_inning: bool, bonus: i32, cap: i32) -> i32 {
    if fresh && first_inning {
        add_capped(grade, bonus, cap)
    } else {
        grade
    }
}

/// Layer 4: same-side matchups add the pitcher's platoon value.
#[must_use]
pub fn platoon_layer(
    grade: i32,
    batter: Handedness,
    pitcher: Handedness,
    platoon_value: i32,
    cap: i32,
) -> i32 {
    if batter.same_side_as(pitcher) {
        add_capped(grade, platoon_value.max(0), cap)
    } else {
        grade
    }
}

/// Grade computation bound to one configuration.
#[derive(Debug, Clone, Copy)]
pub struct GradeModel<'a> {
    cfg: &'a GradeConfig,
}

impl<'a> GradeModel<'a> {
    #[must_use]
    pub const fn new(cfg: &'a GradeConfig) -> Self {
        Self { cfg }
    }

    fn decay_rate(&self, state: &PitcherGameState) -> i32 {
        if state.started_game {
            self.cfg.starter_decay
        } else {
            self.cfg.reliever_decay
        }
    }

    /// Layers 1-3; no randomness.
    #[must_use]
    pub fn pre_matchup(&self, profile: &PitchingProfile, state: &PitcherGameState) -> [i32; 3] {
        let base = profile.clamped_grade();
        let fatigued = fatigue_layer(
            base,
            state.innings_pitched(),
            profile.stamina,
            self.decay_rate(state),
        );
        let relieved = relief_layer(
            fatigued,
            profile.role,
            state.started_game,
            self.cfg.relief_penalty,
        );
        let fresh = fresh_layer(
            relieved,
            profile.fresh,
            state.in_first_inning_of_work(),
            self.cfg.fresh_bonus,
            self.cfg.fresh_cap,
        );
        [fatigued, relieved, fresh]
    }

    /// Layers 1-3 as a fraction of the base grade.
    #[must_use]
    pub fn effective_grade_pct(&self, profile: &PitchingProfile, state: &PitcherGameState) -> f64 {
        let base = profile.clamped_grade();
        let [_, _, current] = self.pre_matchup(profile, state);
        f64::from(current) / f64::from(base)
    }

    /// Whether fatigue alone has pushed the pitcher past the exhaustion line.
    #[must_use]
    pub fn is_exhausted(
        &self,
        profile: &PitchingProfile,
        state: &PitcherGameState,
        extra_innings: f64,
    ) -> bool {
        state.innings_pitched() > profile.stamina + extra_innings
    }

    /// All five layers for one pitch; draws once from `rng`.
    pub fn effective(
        &self,
        profile: &PitchingProfile,
        state: &PitcherGameState,
        pitcher_throws: Handedness,
        batter_bats: Handedness,
        rng: &mut SeededRandom,
    ) -> GradeBreakdown {
        let [after_fatigue, after_relief, after_fresh] = self.pre_matchup(profile, state);
        let after_platoon = platoon_layer(
            after_fresh,
            batter_bats,
            pitcher_throws,
            profile.platoon_value,
            self.cfg.platoon_cap,
        );
        let variance = self
            .cfg
            .variance
            .get(rng.next_index(self.cfg.variance.len()));
        GradeBreakdown {
            base: profile.clamped_grade(),
            after_fatigue,
            after_relief,
            after_fresh,
            after_platoon,
            variance,
            effective: (after_platoon + variance).clamp(GRADE_MIN, GRADE_MAX),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn starter_profile(grade: i32, stamina: f64) -> PitchingProfile {
        PitchingProfile {
            grade,
            stamina,
            role: PitcherRole::Starter,
            platoon_value: 3,
            fresh: false,
        }
    }

    fn state_with_outs(started: bool, outs: u32) -> PitcherGameState {
        let mut state = if started {
            PitcherGameState::starter(PlayerId::new("p"))
        } else {
            PitcherGameState::reliever(PlayerId::new("p"), 7, 1)
        };
        state.record_outs(outs);
        state
    }

    #[test]
    fn starter_decay_after_stamina() {
        assert_eq!(fatigue_layer(12, 8.0, 6.0, 2), 8);
        assert_eq!(fatigue_layer(12, 6.0, 6.0, 2), 12);
        assert_eq!(fatigue_layer(12, 6.0 + 1.0 / 3.0, 6.0, 2), 12);
        assert_eq!(fatigue_layer(3, 10.0, 4.0, 3), GRADE_MIN);

        let cfg = GradeConfig::default();
        let model = GradeModel::new(&cfg);
        let [fatigued, relieved, fresh] =
            model.pre_matchup(&starter_profile(12, 6.0), &state_with_outs(true, 24));
        assert_eq!((fatigued, relieved, fresh), (8, 8, 8));
    }

    #[test]
    fn relievers_decay_faster_and_pay_the_relief_penalty() {
        let cfg = GradeConfig::default();
        let model = GradeModel::new(&cfg);
        let profile = PitchingProfile {
            grade: 14,
            stamina: 1.0,
            role: PitcherRole::Reliever,
            platoon_value: 0,
            fresh: false,
        };
        let [fatigued, relieved, _] = model.pre_matchup(&profile, &state_with_outs(false, 6));
        assert_eq!(fatigued, 11);
        assert_eq!(relieved, 9);

        let closer = PitchingProfile {
            role: PitcherRole::Closer,
            ..profile
        };
        let [_, closer_relieved, _] = model.pre_matchup(&closer, &state_with_outs(false, 0));
        assert_eq!(closer_relieved, 14);
    }

    #[test]
    fn fresh_bonus_only_in_first_inning_and_capped() {
        assert_eq!(fresh_layer(10, true, true, 5, 20), 15);
        assert_eq!(fresh_layer(18, true, true, 5, 20), 20);
        assert_eq!(fresh_layer(22, true, true, 5, 20), 22);
        assert_eq!(fresh_layer(10, true, false, 5, 20), 10);
        assert_eq!(fresh_layer(10, false, true, 5, 20), 10);
    }

    #[test]
    fn platoon_skips_switch_hitters() {
        assert_eq!(
            platoon_layer(10, Handedness::Right, Handedness::Right, 3, 30),
            13
        );
        assert_eq!(
            platoon_layer(29, Handedness::Left, Handedness::Left, 3, 30),
            30
        );
        assert_eq!(
            platoon_layer(10, Handedness::Switch, Handedness::Right, 3, 30),
            10
        );
        assert_eq!(
            platoon_layer(10, Handedness::Left, Handedness::Right, 3, 30),
            10
        );
    }

    #[test]
    fn effective_grade_stays_in_bounds_and_draws_once() {
        let cfg = GradeConfig::default();
        let model = GradeModel::new(&cfg);
        let mut rng = SeededRandom::new(31);
        let low = starter_profile(1, 6.0);
        let high = starter_profile(30, 6.0);
        let state = state_with_outs(true, 0);
        for _ in 0..500 {
            let before = rng.draws();
            let low_grade = model.effective(
                &low,
                &state,
                Handedness::Right,
                Handedness::Left,
                &mut rng,
            );
            assert_eq!(rng.draws(), before + 1);
            assert!((GRADE_MIN..=GRADE_MAX).contains(&low_grade.effective));
            let high_grade = model.effective(
                &high,
                &state,
                Handedness::Right,
                Handedness::Right,
                &mut rng,
            );
            assert!((GRADE_MIN..=GRADE_MAX).contains(&high_grade.effective));
        }
    }

    #[test]
    fn grade_pct_tracks_fatigue_without_drawing() {
        let cfg = GradeConfig::default();
        let model = GradeModel::new(&cfg);
        let profile = starter_profile(12, 6.0);
        let fresh = model.effective_grade_pct(&profile, &state_with_outs(true, 9));
        assert!((fresh - 1.0).abs() < 1e-9);
        let tired = model.effective_grade_pct(&profile, &state_with_outs(true, 24));
        assert!((tired - 8.0 / 12.0).abs() < 1e-9);
        assert!(model.is_exhausted(&profile, &state_with_outs(true, 28), 3.0));
        assert!(!model.is_exhausted(&profile, &state_with_outs(true, 27), 3.0));
    }

    #[test]
    fn pitcher_state_tracks_streaks_and_flags() {
        let mut state = PitcherGameState::starter(PlayerId::new("p"));
        state.record_batter(true, true);
        state.record_batter(true, false);
        assert_eq!(state.consecutive_baserunners, 2);
        assert!(!state.no_hitter_intact);
        state.record_batter(false, false);
        assert_eq!(state.consecutive_baserunners, 0);
        state.record_runs(2, 1);
        assert!(!state.shutout_intact);
        assert_eq!((state.runs_allowed, state.earned_runs), (2, 1));
    }
}
