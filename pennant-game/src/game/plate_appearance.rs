//! One plate-appearance cycle.
//!
//! Order within a cycle is fixed: fielding-side pitching change, steal
//! attempt, intentional walk, bunt, hit-and-run call, pinch hitter, card read
//! with the umpire check, baserunning overlays, error check, stat updates and
//! finally the batter index. The order fixes which draw feeds which
//! decision.

use log::{debug, trace};

use crate::bases::{BaseOutcome, BaseState, apply_outcome};
use crate::baserunning::{
    BuntKind, HitAndRunEffect, apply_hit_and_run, attempt_extra_base, error_check,
    extra_base_candidate, extra_base_probability, resolve_bunt, resolve_steal, steal_candidate,
};
use crate::card::OutcomeCode;
use crate::constants::{LOG_TARGET_GAME, OUTS_PER_HALF};
use crate::grade::GradeModel;
use crate::manager::is_save_situation;
use crate::player::{Handedness, PlayerId, Position};
use crate::plate::resolve_plate_appearance;
use crate::result::{PlayKind, Side};
use crate::stats::{BattingLine, PitchingLine};

use super::GameRunner;
use super::team::batter_threat;

/// How the batter is credited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Credit {
    Card(OutcomeCode),
    IntentionalWalk,
    Bunt(BuntKind),
}

impl Credit {
    const fn is_hit(self) -> bool {
        match self {
            Self::Card(code) => code.is_hit(),
            Self::Bunt(kind) => matches!(kind, BuntKind::BuntHit),
            Self::IntentionalWalk => false,
        }
    }
}

/// Why a pitcher left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChangeReason {
    Forced,
    Pulled,
    CloserEntry,
}

/// A resolved plate appearance waiting to be committed.
#[derive(Debug, Clone)]
struct Play {
    batter: PlayerId,
    credit: Credit,
    outcome: BaseOutcome,
    kind: PlayKind,
    tag: String,
    umpire_override: bool,
    error: bool,
    /// Runner sent on a hit-and-run strikeout and whether the runner was safe.
    runner_on_the_move: Option<(PlayerId, bool)>,
}

impl Play {
    fn new(
        batter: PlayerId,
        credit: Credit,
        outcome: BaseOutcome,
        kind: PlayKind,
        tag: &str,
    ) -> Self {
        Self {
            batter,
            credit,
            outcome,
            kind,
            tag: tag.to_string(),
            umpire_override: false,
            error: false,
            runner_on_the_move: None,
        }
    }
}

fn credit_batter(line: &mut BattingLine, credit: Credit, outcome: &BaseOutcome) {
    line.rbi += u32::from(outcome.rbi);
    match credit {
        Credit::IntentionalWalk => line.bb += 1,
        Credit::Bunt(kind) => {
            if kind.is_sacrifice() {
                line.sh += 1;
            } else {
                line.ab += 1;
            }
            match kind {
                BuntKind::BuntHit => line.h += 1,
                BuntKind::FoulStrikeout => line.k += 1,
                _ => {}
            }
        }
        Credit::Card(OutcomeCode::Walk) => line.bb += 1,
        Credit::Card(OutcomeCode::HitByPitch) => line.hbp += 1,
        Credit::Card(OutcomeCode::FlyOutDeep) if !outcome.runs.is_empty() => line.sf += 1,
        Credit::Card(code) => {
            line.ab += 1;
            if code.is_hit() {
                line.h += 1;
                match code.hit_bases() {
                    2 => line.doubles += 1,
                    3 => line.triples += 1,
                    4 => line.hr += 1,
                    _ => {}
                }
            }
            if code.is_strikeout() {
                line.k += 1;
            }
        }
    }
}

fn charge_pitcher(line: &mut PitchingLine, credit: Credit, outs: u32, runs: u32, earned: u32) {
    line.bf += 1;
    line.outs += outs;
    line.r += runs;
    line.er += earned;
    if credit.is_hit() {
        line.h += 1;
    }
    match credit {
        Credit::IntentionalWalk | Credit::Card(OutcomeCode::Walk) => line.bb += 1,
        Credit::Card(OutcomeCode::HomeRun) => line.hr += 1,
        Credit::Card(code) if code.is_strikeout() => line.k += 1,
        Credit::Bunt(BuntKind::FoulStrikeout) => line.k += 1,
        _ => {}
    }
}

impl GameRunner<'_> {
    pub(super) fn play_cycle(&mut self) {
        let batting = self.tracker.batting();
        let fielding = batting.opponent();
        self.check_pitcher(fielding);
        if self.attempt_steal(batting) {
            return;
        }
        let play = self.plate_appearance(batting, fielding);
        self.commit(batting, play);
        self.teams.get_mut(batting).advance_batter();
    }

    /// Replace the fielding side's pitcher when forced, pulled, or when the
    /// closer is called for a save.
    fn check_pitcher(&mut self, fielding: Side) {
        let model = GradeModel::new(&self.config.grade);
        let situation = self.tracker.situation(fielding);
        let inning = self.tracker.inning;
        let fresh_half = self.tracker.outs == 0 && self.tracker.bases.is_empty();
        let team = self.teams.get_mut(fielding);
        team.pitcher.current_inning = inning;
        if !team.has_replacement() {
            team.pinch_hit_for_pitcher = false;
            return;
        }

        let profile = team.pitching_profile();
        let state = &team.pitcher;
        let forced = team.pinch_hit_for_pitcher
            || model.is_exhausted(&profile, state, self.config.exhaustion_innings);
        let protected = state.started_game
            && inning >= self.config.protect_from_inning
            && (state.shutout_intact || state.no_hitter_intact);
        let save_spot = is_save_situation(&situation);

        let reason = if forced {
            Some(ChangeReason::Forced)
        } else if protected || state.batters_faced == 0 {
            None
        } else if team.profile.decide_pull(
            &situation,
            model.effective_grade_pct(&profile, state),
            state.consecutive_baserunners,
            &mut self.rng,
        ) {
            Some(ChangeReason::Pulled)
        } else if save_spot
            && fresh_half
            && team.closer.is_some()
            && team.profile.decide_closer(&situation, &mut self.rng)
        {
            Some(ChangeReason::CloserEntry)
        } else {
            None
        };
        let Some(reason) = reason else { return };

        let want_closer = match reason {
            ChangeReason::CloserEntry => true,
            ChangeReason::Forced | ChangeReason::Pulled => {
                save_spot
                    && team.closer.is_some()
                    && team.profile.decide_closer(&situation, &mut self.rng)
            }
        };
        let Some(incoming) = team.choose_reliever(want_closer) else {
            return;
        };
        let outgoing = team.bring_in(incoming.clone(), inning, situation.score_diff);
        debug!(
            target: LOG_TARGET_GAME,
            "{} pitching change ({reason:?}) in inning {inning}: {outgoing} -> {incoming}",
            team.roster().id
        );
        let event = self.tracker.event(
            &incoming,
            None,
            PlayKind::PitchingChange {
                outgoing,
                incoming: incoming.clone(),
            },
            "PC".to_string(),
        );
        self.plays.push(event);
    }

    /// Possibly send a runner. Returns `true` when a caught stealing ended the
    /// half; the batter then leads off the next inning.
    fn attempt_steal(&mut self, batting: Side) -> bool {
        let Some(from) = steal_candidate(&self.tracker.bases, self.tracker.outs) else {
            return false;
        };
        let Some(runner_id) = self.tracker.bases.runner(from).cloned() else {
            return false;
        };
        let situation = self.tracker.situation(batting);
        let (offense, defense) = self.teams.split_mut(batting);
        let Some(runner) = offense.player(&runner_id) else {
            return false;
        };
        let probability = self.config.steal.probability(
            runner.attributes.speed,
            runner.archetypes.speed,
            defense.catcher_arm(),
        );
        if !offense.profile.decide_steal(
            &situation,
            runner.attributes.speed,
            probability,
            &mut self.rng,
        ) {
            return false;
        }
        let Some(result) = resolve_steal(&self.tracker.bases, from, probability, &mut self.rng)
        else {
            return false;
        };

        let outs_before = self.tracker.outs;
        self.tracker.bases = result.bases;
        self.tracker.add_outs(result.outs_added);
        let recorded = u32::from(self.tracker.outs - outs_before);
        let line = offense.book.batting_mut(&runner_id);
        if result.success {
            line.sb += 1;
        } else {
            line.cs += 1;
        }
        let pitcher = defense.pitcher.pitcher.clone();
        defense.pitcher.record_outs(recorded);
        defense.book.pitching_mut(&pitcher).outs += recorded;

        let target = from.number() + 1;
        let (kind, tag) = if result.success {
            (
                PlayKind::StolenBase {
                    runner: runner_id.clone(),
                },
                format!("SB{target}"),
            )
        } else {
            (
                PlayKind::CaughtStealing {
                    runner: runner_id.clone(),
                },
                format!("CS{target}"),
            )
        };
        trace!(target: LOG_TARGET_GAME, "{tag} by {runner_id}");
        let event = self.tracker.event(&pitcher, None, kind, tag);
        self.plays.push(event);
        self.tracker.half_over()
    }

    /// Decide and resolve the plate appearance without touching the tracker.
    fn plate_appearance(&mut self, batting: Side, fielding: Side) -> Play {
        let offense_view = self.tracker.situation(batting);
        let defense_view = self.tracker.situation(fielding);
        let outs = self.tracker.outs;
        let bases: BaseState = self.tracker.bases.clone();
        let cfg = self.config;
        let (offense, defense) = self.teams.split_mut(batting);

        let slot = offense.current_slot().clone();
        let pitcher_batting = slot.position == Position::Pitcher;
        let mut batter_id = slot.player;
        let Some(mut batter) = offense.player(&batter_id) else {
            let outcome = apply_outcome(OutcomeCode::PopOut, &bases, outs, &batter_id);
            return Play::new(
                batter_id,
                Credit::Card(OutcomeCode::PopOut),
                outcome,
                PlayKind::PlateAppearance(OutcomeCode::PopOut),
                OutcomeCode::PopOut.tag(),
            );
        };

        if defense.profile.decide_intentional_walk(
            &defense_view,
            &bases,
            batter_threat(batter),
            &mut self.rng,
        ) {
            let outcome = apply_outcome(OutcomeCode::Walk, &bases, outs, &batter_id);
            return Play::new(
                batter_id,
                Credit::IntentionalWalk,
                outcome,
                PlayKind::IntentionalWalk,
                "IBB",
            );
        }

        if offense.profile.decide_bunt(
            &offense_view,
            &bases,
            batter.attributes.contact,
            pitcher_batting,
            &mut self.rng,
        ) {
            let result = resolve_bunt(
                &cfg.bunt,
                &bases,
                &batter_id,
                batter.attributes.speed,
                &mut self.rng,
            );
            return Play::new(
                batter_id,
                Credit::Bunt(result.kind),
                result.outcome,
                PlayKind::Bunt(result.kind),
                result.kind.tag(),
            );
        }

        let lead_runner = bases
            .first
            .as_ref()
            .and_then(|id| offense.player(id));
        let hit_and_run = offense.profile.decide_hit_and_run(
            &offense_view,
            &bases,
            batter.attributes.contact,
            lead_runner.map_or(0.0, |runner| runner.attributes.speed),
            &mut self.rng,
        );

        if let Some((index, upgrade)) = offense.pinch_hit_candidate(batter)
            && offense
                .profile
                .decide_pinch_hit(&offense_view, upgrade, pitcher_batting, &mut self.rng)
            && let Some((replaced, incoming)) = offense.pinch_hit(index)
            && let Some(substitute) = offense.player(&incoming)
        {
            debug!(
                target: LOG_TARGET_GAME,
                "{} pinch hitter {incoming} for {replaced}",
                offense.roster().id
            );
            let event = self.tracker.event(
                &defense.pitcher.pitcher,
                Some(incoming.clone()),
                PlayKind::PinchHitter {
                    replaced,
                    incoming: incoming.clone(),
                },
                "PH".to_string(),
            );
            self.plays.push(event);
            batter = substitute;
            batter_id = incoming;
        }

        let profile = defense.pitching_profile();
        let throws = defense
            .pitcher_player()
            .map_or(Handedness::Right, |pitcher| pitcher.throws);
        let grade = GradeModel::new(&cfg.grade).effective(
            &profile,
            &defense.pitcher,
            throws,
            batter.bats,
            &mut self.rng,
        );
        let read = resolve_plate_appearance(
            &batter.card,
            grade.effective,
            cfg.umpire_override_chance,
            &mut self.rng,
        );
        trace!(
            target: LOG_TARGET_GAME,
            "{batter_id} vs {}: grade {} -> column {} slot {} {}",
            defense.pitcher.pitcher,
            grade.effective,
            read.column.label(),
            read.slot,
            read.outcome.code.tag()
        );

        let mut code = read.outcome.code;
        let mut tag = code.tag().to_string();
        let mut runner_on_the_move = None;
        let mut outcome = match (hit_and_run, lead_runner) {
            (true, Some(runner)) => {
                let steal_odds = cfg.steal.probability(
                    runner.attributes.speed,
                    runner.archetypes.speed,
                    defense.catcher_arm(),
                );
                let overlay =
                    apply_hit_and_run(code, &bases, outs, &batter_id, steal_odds, &mut self.rng);
                code = overlay.code;
                tag = code.tag().to_string();
                match overlay.effect {
                    HitAndRunEffect::None => {}
                    HitAndRunEffect::FirstToThird | HitAndRunEffect::GroundOutConverted => {
                        tag.push_str(" H&R");
                    }
                    HitAndRunEffect::RunnerStole => {
                        tag.push_str(" H&R SB");
                        runner_on_the_move = Some((runner.id.clone(), true));
                    }
                    HitAndRunEffect::StrikeOutThrowOut => {
                        tag.push_str(" H&R CS");
                        runner_on_the_move = Some((runner.id.clone(), false));
                    }
                    HitAndRunEffect::DoubledOff => tag.push_str(" H&R DP"),
                }
                overlay.outcome
            }
            _ => apply_outcome(code, &bases, outs, &batter_id),
        };

        if matches!(code.hit_bases(), 1 | 2)
            && outs + outcome.outs_added < OUTS_PER_HALF
            && let Some(from) = extra_base_candidate(&outcome, &batter_id)
            && let Some(runner) = outcome.bases.runner(from).and_then(|id| offense.player(id))
        {
            let odds = extra_base_probability(
                &cfg.extra_base,
                runner.attributes.speed,
                runner.archetypes.speed,
                defense.outfield_arm(),
            );
            if offense
                .profile
                .decide_aggressive_running(&offense_view, odds, &mut self.rng)
                && let Some(result) = attempt_extra_base(&outcome, from, odds, &mut self.rng)
            {
                tag.push_str(if result.success { " XB" } else { " XB-OUT" });
                outcome = result.outcome;
            }
        }

        let mut error = false;
        if error_check(code, cfg.error_rate, defense.team_fielding(), &mut self.rng) {
            code = OutcomeCode::ReachedOnError;
            outcome = apply_outcome(code, &bases, outs, &batter_id);
            tag = code.tag().to_string();
            runner_on_the_move = None;
            error = true;
        }

        Play {
            batter: batter_id,
            credit: Credit::Card(code),
            outcome,
            kind: PlayKind::PlateAppearance(code),
            tag,
            umpire_override: read.outcome.umpire_override,
            error,
            runner_on_the_move,
        }
    }

    /// Apply a resolved play to the tracker, both stat books and the
    /// pitcher's game state, then log it.
    fn commit(&mut self, batting: Side, play: Play) {
        if play.error {
            self.tracker.record_error();
        }
        let runs = u32::from(play.outcome.runs_scored());
        let unearned = self.tracker.score_runs(runs);
        let earned = runs - unearned;
        let outs_before = self.tracker.outs;
        self.tracker.add_outs(play.outcome.outs_added);
        let recorded = u32::from(self.tracker.outs - outs_before);
        self.tracker.bases = play.outcome.bases.clone();
        self.tracker.plate_appearances += 1;
        let is_hit = play.credit.is_hit();
        if is_hit {
            self.tracker.record_hit();
        }

        let (offense, defense) = self.teams.split_mut(batting);
        credit_batter(
            offense.book.batting_mut(&play.batter),
            play.credit,
            &play.outcome,
        );
        for runner in &play.outcome.runs {
            offense.book.batting_mut(runner).r += 1;
        }
        if let Some((runner, made_it)) = &play.runner_on_the_move {
            let line = offense.book.batting_mut(runner);
            if *made_it {
                line.sb += 1;
            } else {
                line.cs += 1;
            }
        }

        let pitcher = defense.pitcher.pitcher.clone();
        charge_pitcher(
            defense.book.pitching_mut(&pitcher),
            play.credit,
            recorded,
            runs,
            earned,
        );
        defense
            .pitcher
            .record_batter(play.outcome.batter_reached, is_hit);
        defense.pitcher.record_outs(recorded);
        defense.pitcher.record_runs(runs, earned);

        trace!(
            target: LOG_TARGET_GAME,
            "{:?} {} {} {}: {} ({} out, {} runs, score {}-{})",
            self.tracker.half,
            self.tracker.inning,
            play.batter,
            pitcher,
            play.tag,
            self.tracker.outs,
            runs,
            self.tracker.score.away,
            self.tracker.score.home
        );
        let mut event = self
            .tracker
            .event(&pitcher, Some(play.batter), play.kind, play.tag);
        event.runs_scored = play.outcome.runs_scored();
        event.umpire_override = play.umpire_override;
        event.error = play.error;
        self.plays.push(event);
    }
}
