//! Base/out state and the outcome-to-state table.
//!
//! Every resolver here is a pure function of `(outcome, bases, outs, batter)`;
//! a resolution never edits the incoming [`BaseState`] and always returns a
//! fresh snapshot.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::card::OutcomeCode;
use crate::player::PlayerId;

/// Runners who crossed the plate on one play.
pub type ScoredRunners = SmallVec<[PlayerId; 4]>;

/// One of the three bases a runner can occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Base {
    First,
    Second,
    Third,
}

impl Base {
    /// Bases in lead-runner-first order.
    pub const LEAD_FIRST: [Self; 3] = [Self::Third, Self::Second, Self::First];

    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
        }
    }

    /// Base for `number`, or `None` for home and beyond.
    #[must_use]
    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::First),
            2 => Some(Self::Second),
            3 => Some(Self::Third),
            _ => None,
        }
    }

    #[must_use]
    pub const fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }
}

/// Runners on first, second and third.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BaseState {
    pub first: Option<PlayerId>,
    pub second: Option<PlayerId>,
    pub third: Option<PlayerId>,
}

impl BaseState {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            first: None,
            second: None,
            third: None,
        }
    }

    #[must_use]
    pub const fn runner(&self, base: Base) -> Option<&PlayerId> {
        match base {
            Base::First => self.first.as_ref(),
            Base::Second => self.second.as_ref(),
            Base::Third => self.third.as_ref(),
        }
    }

    const fn slot_mut(&mut self, base: Base) -> &mut Option<PlayerId> {
        match base {
            Base::First => &mut self.first,
            Base::Second => &mut self.second,
            Base::Third => &mut self.third,
        }
    }

    #[must_use]
    pub fn is_occupied(&self, base: Base) -> bool {
        self.runner(base).is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first.is_none() && self.second.is_none() && self.third.is_none()
    }

    #[must_use]
    pub fn runner_count(&self) -> usize {
        [&self.first, &self.second, &self.third]
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.runner_count() == 3
    }

    #[must_use]
    pub fn runner_in_scoring_position(&self) -> bool {
        self.second.is_some() || self.third.is_some()
    }

    /// Most advanced occupied base.
    #[must_use]
    pub fn lead_runner(&self) -> Option<Base> {
        Base::LEAD_FIRST
            .into_iter()
            .find(|base| self.is_occupied(*base))
    }

    /// Base currently held by `runner`.
    #[must_use]
    pub fn base_of(&self, runner: &PlayerId) -> Option<Base> {
        Base::LEAD_FIRST
            .into_iter()
            .find(|base| self.runner(*base) == Some(runner))
    }

    /// Copy with `runner` placed on `base`.
    #[must_use]
    pub fn with_runner(&self, base: Base, runner: PlayerId) -> Self {
        let mut next = self.clone();
        *next.slot_mut(base) = Some(runner);
        next
    }

    /// Copy with `base` cleared.
    #[must_use]
    pub fn without_runner(&self, base: Base) -> Self {
        let mut next = self.clone();
        *next.slot_mut(base) = None;
        next
    }

    /// Compact `"1-3"` style occupancy label; `"---"` when empty.
    #[must_use]
    pub fn occupancy_label(&self) -> String {
        let marks: Vec<&str> = [(Base::First, "1"), (Base::Second, "2"), (Base::Third, "3")]
            .into_iter()
            .filter(|(base, _)| self.is_occupied(*base))
            .map(|(_, mark)| mark)
            .collect();
        if marks.is_empty() {
            "---".to_string()
        } else {
            marks.join("-")
        }
    }
}

/// Result of applying one outcome to a base/out state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseOutcome {
    pub bases: BaseState,
    pub outs_added: u8,
    pub runs: ScoredRunners,
    pub rbi: u8,
    pub batter_reached: bool,
}

impl BaseOutcome {
    fn out(bases: &BaseState, outs_added: u8) -> Self {
        Self {
            bases: bases.clone(),
            outs_added,
            runs: ScoredRunners::new(),
            rbi: 0,
            batter_reached: false,
        }
    }

    #[must_use]
    pub fn runs_scored(&self) -> u8 {
        u8::try_from(self.runs.len()).unwrap_or(u8::MAX)
    }
}

/// Move every runner `bases` bases, lead runner first.
#[must_use]
pub fn advance_runners(bases: &BaseState, count: u8) -> (BaseState, ScoredRunners) {
    let mut next = BaseState::empty();
    let mut scored = ScoredRunners::new();
    for base in Base::LEAD_FIRST {
        if let Some(runner) = bases.runner(base) {
            match Base::from_number(base.number() + count) {
                Some(target) => *next.slot_mut(target) = Some(runner.clone()),
                None => scored.push(runner.clone()),
            }
        }
    }
    (next, scored)
}

/// Put the batter on first, pushing runners only where forced.
#[must_use]
pub fn force_batter_to_first(bases: &BaseState, batter: &PlayerId) -> (BaseState, ScoredRunners) {
    let mut next = bases.clone();
    let mut scored = ScoredRunners::new();
    if next.first.is_some() {
        if next.second.is_some() {
            if let Some(runner) = next.third.take() {
                scored.push(runner);
            }
            next.third = next.second.take();
        }
        next.second = next.first.take();
    }
    next.first = Some(batter.clone());
    (next, scored)
}

fn hit(bases: &BaseState, batter: &PlayerId, batter_bases: u8, runner_bases: u8) -> BaseOutcome {
    let (mut next, mut runs) = advance_runners(bases, runner_bases);
    match Base::from_number(batter_bases) {
        Some(base) => *next.slot_mut(base) = Some(batter.clone()),
        None => runs.push(batter.clone()),
    }
    let rbi = u8::try_from(runs.len()).unwrap_or(u8::MAX);
    BaseOutcome {
        bases: next,
        outs_added: 0,
        runs,
        rbi,
        batter_reached: true,
    }
}

fn forced(bases: &BaseState, batter: &PlayerId, credit_rbi: bool) -> BaseOutcome {
    let (next, runs) = force_batter_to_first(bases, batter);
    let rbi = if credit_rbi {
        u8::try_from(runs.len()).unwrap_or(u8::MAX)
    } else {
        0
    };
    BaseOutcome {
        bases: next,
        outs_added: 0,
        runs,
        rbi,
        batter_reached: true,
    }
}

fn double_play(bases: &BaseState, outs: u8) -> BaseOutcome {
    match bases.lead_runner() {
        Some(lead) if outs < 2 => BaseOutcome::out(&bases.without_runner(lead), 2),
        _ => BaseOutcome::out(bases, 1),
    }
}

fn productive_out(bases: &BaseState, outs: u8) -> BaseOutcome {
    if outs >= 2 {
        return BaseOutcome::out(bases, 1);
    }
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

fn sacrifice_fly(bases: &BaseState, outs: u8) -> BaseOutcome {
    match &bases.third {
        Some(runner) if outs < 2 => {
            let mut runs = ScoredRunners::new();
            runs.push(runner.clone());
            BaseOutcome {
                bases: bases.without_runner(Base::Third),
                outs_added: 1,
                runs,
                rbi: 1,
                batter_reached: false,
            }
        }
        _ => BaseOutcome::out(bases, 1),
    }
}

fn reached_on_error(bases: &BaseState, batter: &PlayerId) -> BaseOutcome {
    let (mut next, runs) = advance_runners(bases, 1);
    next.first = Some(batter.clone());
    BaseOutcome {
        bases: next,
        outs_added: 0,
        runs,
        rbi: 0,
        batter_reached: true,
    }
}

/// Apply `outcome` to the base/out state with `batter` at the plate.
#[must_use]
pub fn apply_outcome(
    outcome: OutcomeCode,
    bases: &BaseState,
    outs: u8,
    batter: &PlayerId,
) -> BaseOutcome {
    match outcome {
        OutcomeCode::SingleClean => hit(bases, batter, 1, 1),
        OutcomeCode::SingleAdvance => hit(bases, batter, 1, 2),
        OutcomeCode::SingleInfield => forced(bases, batter, true),
        OutcomeCode::DoubleClean => hit(bases, batter, 2, 2),
        OutcomeCode::DoubleGap => hit(bases, batter, 2, 3),
        OutcomeCode::Triple => hit(bases, batter, 3, 3),
        OutcomeCode::HomeRun => hit(bases, batter, 4, 4),
        OutcomeCode::Walk | OutcomeCode::HitByPitch => forced(bases, batter, true),
        OutcomeCode::DoublePlay => double_play(bases, outs),
        OutcomeCode::GroundOutAdvance => productive_out(bases, outs),
        OutcomeCode::FlyOutDeep => sacrifice_fly(bases, outs),
        OutcomeCode::ReachedOnError => reached_on_error(bases, batter),
        OutcomeCode::StrikeoutSwinging
        | OutcomeCode::StrikeoutLooking
        | OutcomeCode::GroundOut
        | OutcomeCode::FlyOut
        | OutcomeCode::LineOut
        | OutcomeCode::PopOut => BaseOutcome::out(bases, 1),
    }
}
