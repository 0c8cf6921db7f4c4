//! Day-batched season runner.
//!
//! Each scheduled day derives its own seed from the base seed, hands one game
//! seed to every matchup and plays the games back to back. Play-by-play is
//! dropped as soon as a game is absorbed unless detail retention is on.

use std::collections::BTreeMap;
use std::ops::Range;

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SimConfig;
use crate::constants::LOG_TARGET_SEASON;
use crate::game::{GameError, GameSetup, TeamSide, simulate_game};
use crate::league::League;
use crate::result::{GameResult, GameSummary, Side, TeamPair};
use crate::roster::TeamId;
use crate::seed::{derive_day_seed, game_seeds};
use crate::stats::SeasonStats;

/// One game on the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matchup {
    pub away: TeamId,
    pub home: TeamId,
}

impl Matchup {
    #[must_use]
    pub fn new(away: &str, home: &str) -> Self {
        Self {
            away: TeamId::new(away),
            home: TeamId::new(home),
        }
    }
}

/// Games played on one day. An empty list is an off day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledDay {
    pub day: u32,
    #[serde(default)]
    pub games: Vec<Matchup>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub days: Vec<ScheduledDay>,
}

impl Schedule {
    /// Rotating round-robin over `team_ids` for `days` days (circle method).
    /// Odd leagues get a bye each day; home and away alternate per pairing.
    #[must_use]
    pub fn round_robin(team_ids: &[TeamId], days: u32) -> Self {
        let mut slots: Vec<Option<&TeamId>> = team_ids.iter().map(Some).collect();
        if slots.len() % 2 == 1 {
            slots.push(None);
        }
        let size = slots.len();
        let days = (0..days)
            .map(|day| {
                if size < 2 {
                    return ScheduledDay {
                        day,
                        games: Vec::new(),
                    };
                }
                let cycle = size - 1;
                let round = day as usize % cycle;
                let order: Vec<Option<&TeamId>> = std::iter::once(slots[0])
                    .chain((0..cycle).map(|k| slots[1 + (k + round) % cycle]))
                    .collect();
                let games = (0..size / 2)
                    .filter_map(|pair| {
                        let (first, second) = (order[pair]?, order[size - 1 - pair]?);
                        let (away, home) = if (day as usize + pair) % 2 == 0 {
                            (first, second)
                        } else {
                            (second, first)
                        };
                        Some(Matchup {
                            away: away.clone(),
                            home: home.clone(),
                        })
                    })
                    .collect();
                ScheduledDay { day, games }
            })
            .collect();
        Self { days }
    }

    #[must_use]
    pub fn day(&self, day: u32) -> Option<&ScheduledDay> {
        self.days.iter().find(|scheduled| scheduled.day == day)
    }

    #[must_use]
    pub fn total_games(&self) -> usize {
        self.days.iter().map(|day| day.games.len()).sum()
    }
}

/// One played game, with or without its play-by-play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "detail", rename_all = "snake_case")]
pub enum DayGame {
    Full(Box<GameResult>),
    Compact(GameSummary),
}

impl DayGame {
    #[must_use]
    pub fn summary(&self) -> &GameSummary {
        match self {
            Self::Full(result) => &result.summary,
            Self::Compact(summary) => summary,
        }
    }

    /// Play-by-play, when it was retained.
    #[must_use]
    pub fn full(&self) -> Option<&GameResult> {
        match self {
            Self::Full(result) => Some(result.as_ref()),
            Self::Compact(_) => None,
        }
    }
}

/// Every game played on one day, in schedule order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayResult {
    pub day: u32,
    pub seed: u32,
    pub games: Vec<DayGame>,
}

/// Win/loss record and run totals for one team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub wins: u32,
    pub losses: u32,
    pub runs_for: u32,
    pub runs_against: u32,
}

impl StandingsRow {
    #[must_use]
    pub const fn decisions(&self) -> u32 {
        self.wins + self.losses
    }

    #[must_use]
    pub fn win_pct(&self) -> f64 {
        let games = self.decisions();
        if games == 0 {
            return 0.0;
        }
        f64::from(self.wins) / f64::from(games)
    }

    #[must_use]
    pub fn run_diff(&self) -> i64 {
        i64::from(self.runs_for) - i64::from(self.runs_against)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standings {
    pub rows: BTreeMap<TeamId, StandingsRow>,
}

impl Standings {
    /// Credit one finished game. Truncated ties move runs but not the record.
    pub fn record(&mut self, summary: &GameSummary) {
        let winner = summary.winner();
        for side in [Side::Away, Side::Home] {
            let row = self
                .rows
                .entry(summary.teams.get(side).clone())
                .or_default();
            row.runs_for += summary.score.get(side);
            row.runs_against += summary.score.get(side.opponent());
            match winner {
                Some(won) if won == side => row.wins += 1,
                Some(_) => row.losses += 1,
                None => {}
            }
        }
    }

    #[must_use]
    pub fn row(&self, team: &TeamId) -> Option<&StandingsRow> {
        self.rows.get(team)
    }

    /// Best record first; run differential then team id break ties.
    #[must_use]
    pub fn ranked(&self) -> Vec<(&TeamId, &StandingsRow)> {
        let mut ranked: Vec<_> = self.rows.iter().collect();
        ranked.sort_by(|(a_id, a), (b_id, b)| {
            b.win_pct()
                .total_cmp(&a.win_pct())
                .then_with(|| b.run_diff().cmp(&a.run_diff()))
                .then_with(|| a_id.cmp(b_id))
        });
        ranked
    }
}

/// Everything a season run produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonResult {
    pub days: Vec<DayResult>,
    pub games_played: usize,
    pub standings: Standings,
    pub stats: SeasonStats,
}

impl SeasonResult {
    fn push_day(&mut self, day: DayResult) {
        self.games_played += day.games.len();
        self.days.push(day);
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SeasonError {
    #[error("day {day}: team {team} is not in the league")]
    UnknownTeam { day: u32, team: TeamId },
    #[error("{team} has no starting rotation")]
    NoStarter { team: TeamId },
    #[error(transparent)]
    Game(#[from] GameError),
}

/// Plays scheduled days against one league and keeps running totals.
#[derive(Debug, Clone)]
pub struct SeasonRunner<'a> {
    league: &'a League,
    config: &'a SimConfig,
    base_seed: u64,
    keep_detail: bool,
    rotation_turns: BTreeMap<TeamId, usize>,
    standings: Standings,
    stats: SeasonStats,
    games_played: usize,
}

impl<'a> SeasonRunner<'a> {
    #[must_use]
    pub fn new(league: &'a League, config: &'a SimConfig, base_seed: u64) -> Self {
        Self {
            league,
            config,
            base_seed,
            keep_detail: false,
            rotation_turns: BTreeMap::new(),
            standings: Standings::default(),
            stats: SeasonStats::default(),
            games_played: 0,
        }
    }

    /// Retain full play-by-play for every game.
    #[must_use]
    pub fn with_detail(mut self, keep_detail: bool) -> Self {
        self.keep_detail = keep_detail;
        self
    }

    #[must_use]
    pub const fn standings(&self) -> &Standings {
        &self.standings
    }

    #[must_use]
    pub const fn stats(&self) -> &SeasonStats {
        &self.stats
    }

    #[must_use]
    pub const fn games_played(&self) -> usize {
        self.games_played
    }

    /// Rotation turns already used by `team`.
    #[must_use]
    pub fn rotation_turn(&self, team: &TeamId) -> usize {
        self.rotation_turns.get(team).copied().unwrap_or(0)
    }

    /// Resolve both sides for every matchup before any game is played, so a
    /// bad schedule entry leaves the runner untouched.
    fn plan_day(
        &self,
        day: &ScheduledDay,
    ) -> Result<(Vec<TeamPair<TeamSide<'a>>>, BTreeMap<TeamId, usize>), SeasonError> {
        let league = self.league;
        let mut turns = self.rotation_turns.clone();
        let mut next_side = |team: &TeamId| -> Result<TeamSide<'a>, SeasonError> {
            let setup = league.team(team).ok_or_else(|| SeasonError::UnknownTeam {
                day: day.day,
                team: team.clone(),
            })?;
            let turn = turns.entry(team.clone()).or_insert(0);
            let starter = setup
                .roster
                .starter_for_turn(*turn)
                .ok_or_else(|| SeasonError::NoStarter { team: team.clone() })?;
            *turn += 1;
            Ok(TeamSide::new(&setup.roster, setup.profile, starter.clone()))
        };
        let mut sides = Vec::with_capacity(day.games.len());
        for matchup in &day.games {
            let away = next_side(&matchup.away)?;
            let home = next_side(&matchup.home)?;
            sides.push(TeamPair::new(away, home));
        }
        Ok((sides, turns))
    }

    /// Play one day. A day with no games returns an empty result. The day is
    /// all or nothing: on error the runner is left as it was.
    ///
    /// # Errors
    ///
    /// Returns a `SeasonError` when a matchup names an unknown team, a team
    /// has no rotation, or a game setup is invalid.
    pub fn run_day(&mut self, day: &ScheduledDay) -> Result<DayResult, SeasonError> {
        let day_seed = derive_day_seed(self.base_seed, day.day);
        if day.games.is_empty() {
            return Ok(DayResult {
                day: day.day,
                seed: day_seed,
                games: Vec::new(),
            });
        }

        let (sides, turns) = self.plan_day(day)?;
        let seeds = game_seeds(day_seed, sides.len());
        let mut games = Vec::with_capacity(sides.len());
        for (teams, seed) in sides.into_iter().zip(seeds) {
            let result = simulate_game(GameSetup {
                teams,
                seed,
                config: self.config,
            })?;
            games.push(if self.keep_detail {
                DayGame::Full(Box::new(result))
            } else {
                DayGame::Compact(result.compact())
            });
        }

        // Every game of the day succeeded; only now touch the season totals.
        let mut runs = 0_u32;
        for game in &games {
            let summary = game.summary();
            runs += summary.score.away + summary.score.home;
            self.standings.record(summary);
            self.stats.absorb(&summary.book(Side::Away));
            self.stats.absorb(&summary.book(Side::Home));
        }
        self.rotation_turns = turns;
        self.games_played += games.len();

        info!(
            target: LOG_TARGET_SEASON,
            "day {} complete: {} games, {} runs (seed {:#010x})",
            day.day,
            games.len(),
            runs,
            day_seed
        );
        Ok(DayResult {
            day: day.day,
            seed: day_seed,
            games,
        })
    }

    fn days_in<'s>(
        schedule: &'s Schedule,
        days: &Range<u32>,
    ) -> impl Iterator<Item = &'s ScheduledDay> {
        schedule
            .days
            .iter()
            .filter(move |scheduled| days.contains(&scheduled.day) && !scheduled.games.is_empty())
    }

    fn snapshot(&self, result: &mut SeasonResult) {
        result.standings = self.standings.clone();
        result.stats = self.stats.clone();
    }

    /// Play every day of `schedule` whose index falls in `days`, skipping off
    /// days. `on_day` sees each day as soon as it completes.
    ///
    /// # Errors
    ///
    /// Stops at the first day that fails; see [`SeasonRunner::run_day`].
    pub fn run_season(
        &mut self,
        schedule: &Schedule,
        days: Range<u32>,
        mut on_day: impl FnMut(&DayResult),
    ) -> Result<SeasonResult, SeasonError> {
        let mut result = SeasonResult::default();
        for scheduled in Self::days_in(schedule, &days) {
            let day = self.run_day(scheduled)?;
            on_day(&day);
            result.push_day(day);
        }
        self.snapshot(&mut result);
        Ok(result)
    }

    /// [`SeasonRunner::run_season`] that yields to the tokio scheduler
    /// between days.
    ///
    /// # Errors
    ///
    /// Same as [`SeasonRunner::run_season`].
    #[cfg(feature = "async")]
    pub async fn run_season_async(
        &mut self,
        schedule: &Schedule,
        days: Range<u32>,
        mut on_day: impl FnMut(&DayResult),
    ) -> Result<SeasonResult, SeasonError> {
        let mut result = SeasonResult::default();
        for scheduled in Self::days_in(schedule, &days) {
            let day = self.run_day(scheduled)?;
            on_day(&day);
            result.push_day(day);
            tokio::task::yield_now().await;
        }
        self.snapshot(&mut result);
        Ok(result)
    }
}
