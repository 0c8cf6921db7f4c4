//! Steals, bunts and the overlays applied on top of a card result.

use serde::{Deserialize, Serialize};

use crate::bases::{Base, BaseOutcome, BaseState, ScoredRunners, advance_runners, apply_outcome};
use crate::card::OutcomeCode;
use crate::config::{BuntConfig, RunnerRaceConfig};
use crate::player::PlayerId;
use crate::rng::SeededRandom;

/// Base a steal would be attempted from: second with third open, else first
/// with second open. Requires fewer than two out.
#[must_use]
pub fn steal_candidate(bases: &BaseState, outs: u8) -> Option<Base> {
    if outs >= 2 {
        return None;
    }
    if bases.is_occupied(Base::Second) && !bases.is_occupied(Base::Third) {
        return Some(Base::Second);
    }
    if bases.is_occupied(Base::First) && !bases.is_occupied(Base::Second) {
        return Some(Base::First);
    }
    None
}

/// Stolen-base attempt result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StealResult {
    pub runner: PlayerId,
    pub from: Base,
    pub success: bool,
    pub bases: BaseState,
    pub outs_added: u8,
}

/// Resolve a steal from `from` with one draw against `probability`.
#[must_use]
pub fn resolve_steal(
    bases: &BaseState,
    from: Base,
    probability: f64,
    rng: &mut SeededRandom,
) -> Option<StealResult> {
    let runner = bases.runner(from)?.clone();
    let target = from.next()?;
    let success = rng.chance(probability);
    let cleared = bases.without_runner(from);
    let (next, outs_added) = if success {
        (cleared.with_runner(target, runner.clone()), 0)
    } else {
        (cleared, 1)
    };
    Some(StealResult {
        runner,
        from,
        success,
        bases: next,
        outs_added,
    })
}

/// Bunt band that came up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuntKind {
    Sacrifice,
    FoulStrikeout,
    BuntHit,
    BuntHitThrownOut,
    PopOut,
}

impl BuntKind {
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Sacrifice => "SH",
            Self::FoulStrikeout => "K-BNT",
            Self::BuntHit => "1B-BNT",
            Self::BuntHitThrownOut => "SH-BNT",
            Self::PopOut => "PO-BNT",
        }
    }

    /// Sacrifice-style outs are not charged as at-bats.
    #[must_use]
    pub const fn is_sacrifice(self) -> bool {
        matches!(self, Self::Sacrifice | Self::BuntHitThrownOut)
    }
}

/// Bunt result plus the state delta it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuntResult {
    pub kind: BuntKind,
    pub outcome: BaseOutcome,
}

fn sacrifice_out(bases: &BaseState) -> BaseOutcome {
    let (next, runs) = advance_runners(bases, 1);
    let rbi = u8::try_from(runs.len()).unwrap_or(u8::MAX);
    BaseOutcome {
        bases: next,
        outs_added: 1,
        runs,
        rbi,
        batter_reached: false,
    }
}

fn plain_out(bases: &BaseState) -> BaseOutcome {
    BaseOutcome {
        bases: bases.clone(),
        outs_added: 1,
        runs: ScoredRunners::new(),
        rbi: 0,
        batter_reached: false,
    }
}

/// Resolve a bunt with one band draw, plus a speed check in the bunt-for-hit band.
pub fn resolve_bunt(
    cfg: &BuntConfig,
    bases: &BaseState,
    batter: &PlayerId,
    batter_speed: f64,
    rng: &mut SeededRandom,
) -> BuntResult {
    let roll = rng.next_float();
    let sacrifice_end = cfg.sacrifice;
    let foul_end = sacrifice_end + cfg.foul;
    let hit_end = foul_end + cfg.bunt_for_hit;
    if roll < sacrifice_end {
        return BuntResult {
            kind: BuntKind::Sacrifice,
            outcome: sacrifice_out(bases),
        };
    }
    if roll < foul_end {
        return BuntResult {
            kind: BuntKind::FoulStrikeout,
            outcome: plain_out(bases),
        };
    }
    if roll < hit_end {
        if rng.next_float() < batter_speed * cfg.hit_speed_factor {
            let (mut next, runs) = advance_runners(bases, 1);
            next.first = Some(batter.clone());
            let rbi = u8::try_from(runs.len()).unwrap_or(u8::MAX);
            return BuntResult {
                kind: BuntKind::BuntHit,
                outcome: BaseOutcome {
                    bases: next,
                    outs_added: 0,
                    runs,
                    rbi,
                    batter_reached: true,
                },
            };
        }
        return BuntResult {
            kind: BuntKind::BuntHitThrownOut,
            outcome: sacrifice_out(bases),
        };
    }
    BuntResult {
        kind: BuntKind::PopOut,
        outcome: plain_out(bases),
    }
}

/// What a hit-and-run did to the play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitAndRunEffect {
    None,
    FirstToThird,
    GroundOutConverted,
    RunnerStole,
    StrikeOutThrowOut,
    DoubledOff,
}

/// Play after the hit-and-run overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayResult {
    pub code: OutcomeCode,
    pub outcome: BaseOutcome,
    pub effect: HitAndRunEffect,
}

/// Apply the hit-and-run overlay. `steal_probability` is the lead runner's
/// chance against the catcher and is drawn only on a strikeout.
pub fn apply_hit_and_run(
    code: OutcomeCode,
    bases: &BaseState,
    outs: u8,
    batter: &PlayerId,
    steal_probability: f64,
    rng: &mut SeededRandom,
) -> OverlayResult {
    let Some(runner) = bases.first.clone() else {
        return OverlayResult {
            code,
            outcome: apply_outcome(code, bases, outs, batter),
            effect: HitAndRunEffect::None,
        };
    };
    if code.is_single() {
        let mut outcome = apply_outcome(code, bases, outs, batter);
        let mut effect = HitAndRunEffect::None;
        if outcome.bases.base_of(&runner) == Some(Base::Second) && outcome.bases.third.is_none() {
            outcome.bases = outcome
                .bases
                .without_runner(Base::Second)
                .with_runner(Base::Third, runner);
            effect = HitAndRunEffect::FirstToThird;
        }
        return OverlayResult {
            code,
            outcome,
            effect,
        };
    }
    match code {
        OutcomeCode::GroundOut | OutcomeCode::DoublePlay => OverlayResult {
            code: OutcomeCode::GroundOutAdvance,
            outcome: apply_outcome(OutcomeCode::GroundOutAdvance, bases, outs, batter),
            effect: HitAndRunEffect::GroundOutConverted,
        },
        OutcomeCode::StrikeoutSwinging | OutcomeCode::StrikeoutLooking => {
            let mut outcome = apply_outcome(code, bases, outs, batter);
            if outs + outcome.outs_added >= 3 || bases.second.is_some() {
                return OverlayResult {
                    code,
                    outcome,
                    effect: HitAndRunEffect::None,
                };
            }
            let cleared = outcome.bases.without_runner(Base::First);
            let effect = if rng.chance(steal_probability) {
                outcome.bases = cleared.with_runner(Base::Second, runner);
                HitAndRunEffect::RunnerStole
            } else {
                outcome.bases = cleared;
                outcome.outs_added += 1;
                HitAndRunEffect::StrikeOutThrowOut
            };
            OverlayResult {
                code,
                outcome,
                effect,
            }
        }
        OutcomeCode::LineOut if outs < 2 => {
            let mut outcome = apply_outcome(code, bases, outs, batter);
            outcome.bases = outcome.bases.without_runner(Base::First);
            outcome.outs_added += 1;
            OverlayResult {
                code,
                outcome,
                effect: HitAndRunEffect::DoubledOff,
            }
        }
        _ => OverlayResult {
            code,
            outcome: apply_outcome(code, bases, outs, batter),
            effect: HitAndRunEffect::None,
        },
    }
}

/// Runner who could try for an extra base after a single or double: the most
/// advanced runner (not the batter) whose next base is open.
#[must_use]
pub fn extra_base_candidate(outcome: &BaseOutcome, batter: &PlayerId) -> Option<Base> {
    Base::LEAD_FIRST.into_iter().find(|base| {
        let Some(runner) = outcome.bases.runner(*base) else {
            return false;
        };
        if runner == batter {
            return false;
        }
        base.next()
            .is_none_or(|next| !outcome.bases.is_occupied(next))
    })
}

/// Extra-base attempt result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraBaseResult {
    pub runner: PlayerId,
    pub success: bool,
    pub outcome: BaseOutcome,
}

/// Send the runner on `from` for one more base; one draw against `probability`.
pub fn attempt_extra_base(
    outcome: &BaseOutcome,
    from: Base,
    probability: f64,
    rng: &mut SeededRandom,
) -> Option<ExtraBaseResult> {
    let runner = outcome.bases.runner(from)?.clone();
    let success = rng.chance(probability);
    let mut next = outcome.clone();
    next.bases = next.bases.without_runner(from);
    if success {
        match from.next() {
            Some(target) => next.bases = next.bases.with_runner(target, runner.clone()),
            None => {
                next.runs.push(runner.clone());
                next.rbi = next.rbi.saturating_add(1);
            }
        }
    } else {
        next.outs_added += 1;
    }
    Some(ExtraBaseResult {
        runner,
        success,
        outcome: next,
    })
}

/// Extra-base success probability against the outfield arm.
#[must_use]
pub fn extra_base_probability(
    cfg: &RunnerRaceConfig,
    speed: f64,
    speed_archetype: bool,
    outfield_arm: f64,
) -> f64 {
    cfg.probability(speed, speed_archetype, outfield_arm)
}

/// Error chance on a ball in play that produced an out.
#[must_use]
pub fn error_probability(error_rate: f64, team_fielding: f64) -> f64 {
    (error_rate * (1.5 - team_fielding)).clamp(0.0, 1.0)
}

/// Draw for a fielding error; only balls in play that produced an out are eligible.
pub fn error_check(
    code: OutcomeCode,
    error_rate: f64,
    team_fielding: f64,
    rng: &mut SeededRandom,
) -> bool {
    if !code.is_ball_in_play_out() {
        return false;
    }
    rng.chance(error_probability(error_rate, team_fielding))
}
