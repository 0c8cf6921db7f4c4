use anyhow::{Context, Result, anyhow};
use colored::Colorize;
use pennant_game::{
    GameResult, GameSetup, PitchingDecision, PlayerId, Schedule, SeasonResult, SeasonRunner,
    TeamPair, TeamSetup, TeamSide, simulate_game,
};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::invariants::{check_game, check_season};
use super::league::TesterAssets;

/// One simulated game as the reports see it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub seed: u32,
    pub away: String,
    pub home: String,
    pub away_runs: u32,
    pub home_runs: u32,
    pub innings: u32,
    pub winning_pitcher: Option<String>,
    pub losing_pitcher: Option<String>,
    pub save: Option<String>,
    pub fingerprint: String,
    pub line_score: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub play_by_play: Vec<String>,
}

impl GameRecord {
    fn from_result(result: &GameResult, away: &str, home: &str, detail: bool) -> Result<Self> {
        let fingerprint = result
            .fingerprint()
            .with_context(|| format!("failed to fingerprint game {:#010x}", result.summary.seed))?;
        let summary = &result.summary;
        let name = |id: &Option<PlayerId>| {
            id.as_ref().map(|id| result.name_of(id).to_string())
        };
        Ok(Self {
            seed: summary.seed,
            away: away.to_string(),
            home: home.to_string(),
            away_runs: summary.score.away,
            home_runs: summary.score.home,
            innings: summary.innings,
            winning_pitcher: name(&summary.winning_pitcher),
            losing_pitcher: name(&summary.losing_pitcher),
            save: name(&summary.save),
            fingerprint: format!("{fingerprint:016x}"),
            line_score: summary
                .box_score
                .line
                .render(&abbreviate(away), &abbreviate(home)),
            play_by_play: if detail {
                result.play_by_play_text()
            } else {
                Vec::new()
            },
        })
    }
}

fn abbreviate(team: &str) -> String {
    team.chars().take(5).collect()
}

/// Outcome of one verification check across all seeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub check_name: String,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
}

impl CheckResult {
    fn new(check_name: &str) -> Self {
        Self {
            check_name: check_name.to_string(),
            passed: true,
            iterations_run: 0,
            successful_iterations: 0,
            failures: Vec::new(),
            average_duration: Duration::ZERO,
        }
    }

    fn record(&mut self, failure: Option<String>, elapsed: Duration, total: &mut Duration) {
        self.iterations_run += 1;
        *total += elapsed;
        match failure {
            Some(failure) => {
                self.passed = false;
                self.failures.push(failure);
            }
            None => self.successful_iterations += 1,
        }
    }

    fn close(mut self, total: Duration) -> Self {
        self.average_duration = if self.iterations_run == 0 {
            Duration::ZERO
        } else {
            total / u32::try_from(self.iterations_run).unwrap_or(u32::MAX)
        };
        self
    }
}

/// Season standings and leaders flattened for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonReport {
    pub base_seed: u64,
    pub days_played: usize,
    pub games_played: usize,
    pub standings: Vec<StandingsLine>,
    pub leaders: Vec<LeaderLine>,
    pub violations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingsLine {
    pub team: String,
    pub wins: u32,
    pub losses: u32,
    pub win_pct: f64,
    pub runs_for: u32,
    pub runs_against: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderLine {
    pub category: String,
    pub player: String,
    pub value: String,
}

/// Drives the simulation core for the three tester modes.
pub struct LogicTester {
    assets: TesterAssets,
    verbose: bool,
}

impl LogicTester {
    pub const fn new(assets: TesterAssets, verbose: bool) -> Self {
        Self { assets, verbose }
    }

    /// The first two league teams face each other on opening day, once per seed.
    fn play(&self, seed: u32) -> Result<(GameResult, TeamPair<String>)> {
        let league = &self.assets.league;
        let ids = league.team_ids();
        let (Some(away), Some(home)) = (
            ids.first().and_then(|id| league.team(id)),
            ids.get(1).and_then(|id| league.team(id)),
        ) else {
            return Err(anyhow!("league needs two teams"));
        };
        let result = simulate_game(GameSetup {
            teams: TeamPair::new(opening_side(away)?, opening_side(home)?),
            seed,
            config: &self.assets.config,
        })
        .with_context(|| format!("game {seed:#010x} failed"))?;
        Ok((
            result,
            TeamPair::new(away.roster.name.clone(), home.roster.name.clone()),
        ))
    }

    pub fn run_games(&self, seeds: &[u32], detail: bool) -> Result<Vec<GameRecord>> {
        seeds
            .iter()
            .map(|&seed| -> Result<GameRecord> {
                let (result, names) = self.play(seed)?;
                let record = GameRecord::from_result(&result, &names.away, &names.home, detail)?;
                if self.verbose {
                    println!(
                        "  ⚾ seed {:#010x}: {} {} - {} {} ({} inn)",
                        seed,
                        record.away,
                        record.away_runs,
                        record.home,
                        record.home_runs,
                        record.innings
                    );
                }
                Ok(record)
            })
            .collect()
    }

    /// Round-robin season over the whole league, yielding between days.
    pub async fn run_season(&self, base_seed: u64, days: u32) -> Result<SeasonReport> {
        let league = &self.assets.league;
        let schedule = Schedule::round_robin(&league.team_ids(), days);
        let mut runner = SeasonRunner::new(league, &self.assets.config, base_seed);
        let verbose = self.verbose;
        let season = runner
            .run_season_async(&schedule, 0..days, |day| {
                if verbose {
                    println!(
                        "  📅 day {:>3}: {} games (seed {:#010x})",
                        day.day,
                        day.games.len(),
                        day.seed
                    );
                }
            })
            .await
            .with_context(|| format!("season with base seed {base_seed} failed"))?;
        Ok(self.season_report(base_seed, &season))
    }

    fn season_report(&self, base_seed: u64, season: &SeasonResult) -> SeasonReport {
        let league = &self.assets.league;
        let standings = season
            .standings
            .ranked()
            .into_iter()
            .map(|(team, row)| StandingsLine {
                team: league
                    .team(team)
                    .map_or_else(|| team.to_string(), |setup| setup.roster.name.clone()),
                wins: row.wins,
                losses: row.losses,
                win_pct: row.win_pct(),
                runs_for: row.runs_for,
                runs_against: row.runs_against,
            })
            .collect();
        SeasonReport {
            base_seed,
            days_played: season.days.len(),
            games_played: season.games_played,
            standings,
            leaders: self.leaders(season),
            violations: check_season(season),
        }
    }

    fn player_name(&self, id: &PlayerId) -> String {
        self.assets
            .league
            .teams
            .values()
            .find(|setup| setup.roster.players.contains_key(id))
            .map_or_else(|| id.to_string(), |setup| setup.roster.player_name(id))
    }

    fn leaders(&self, season: &SeasonResult) -> Vec<LeaderLine> {
        let mut leaders = Vec::new();
        let batting = &season.stats.batting;
        if let Some((id, line)) = batting.iter().max_by_key(|(_, line)| line.hr) {
            leaders.push(LeaderLine {
                category: "HR".to_string(),
                player: self.player_name(id),
                value: line.hr.to_string(),
            });
        }
        if let Some((id, line)) = batting.iter().max_by_key(|(_, line)| line.rbi) {
            leaders.push(LeaderLine {
                category: "RBI".to_string(),
                player: self.player_name(id),
                value: line.rbi.to_string(),
            });
        }
        let pitching = &season.stats.pitching;
        if let Some((id, totals)) = pitching.iter().max_by_key(|(_, totals)| totals.wins) {
            leaders.push(LeaderLine {
                category: PitchingDecision::Win.code().to_string(),
                player: self.player_name(id),
                value: totals.wins.to_string(),
            });
        }
        if let Some((id, totals)) = pitching.iter().max_by_key(|(_, totals)| totals.saves) {
            leaders.push(LeaderLine {
                category: PitchingDecision::Save.code().to_string(),
                player: self.player_name(id),
                value: totals.saves.to_string(),
            });
        }
        leaders
    }

    /// Replay every seed twice and check determinism plus game invariants.
    pub fn verify(&self, seeds: &[u32]) -> Vec<CheckResult> {
        let mut determinism = CheckResult::new("determinism");
        let mut invariants = CheckResult::new("game-invariants");
        let mut determinism_time = Duration::ZERO;
        let mut invariants_time = Duration::ZERO;

        for &seed in seeds {
            let started = Instant::now();
            let first = self.play(seed);
            let second = self.play(seed);
            let elapsed = started.elapsed();
            let (first, second) = match (first, second) {
                (Ok((first, _)), Ok((second, _))) => (first, second),
                (Err(err), _) | (_, Err(err)) => {
                    let failure = format!("seed {seed:#010x}: {err:#}");
                    determinism.record(Some(failure.clone()), elapsed, &mut determinism_time);
                    invariants.record(Some(failure), Duration::ZERO, &mut invariants_time);
                    continue;
                }
            };
            let diverged = match (first.fingerprint(), second.fingerprint()) {
                (Ok(a), Ok(b)) if a == b && first == second => None,
                (Err(err), _) | (_, Err(err)) => Some(format!("seed {seed:#010x}: {err}")),
                _ => Some(format!("seed {seed:#010x}: replay diverged")),
            };
            determinism.record(diverged, elapsed, &mut determinism_time);

            let started = Instant::now();
            let violations = check_game(&first);
            let failure = (!violations.is_empty())
                .then(|| format!("seed {seed:#010x}: {}", violations.join("; ")));
            if self.verbose {
                let status = if failure.is_none() {
                    "✅".green()
                } else {
                    "❌".red()
                };
                println!(
                    "  {status} seed {seed:#010x} {}-{} in {}",
                    first.summary.score.away, first.summary.score.home, first.summary.innings
                );
            }
            invariants.record(failure, started.elapsed(), &mut invariants_time);
        }

        vec![
            determinism.close(determinism_time),
            invariants.close(invariants_time),
        ]
    }

    /// Home/away split of wins across the seeds, for quick sanity reads.
    pub fn home_win_rate(records: &[GameRecord]) -> f64 {
        if records.is_empty() {
            return 0.0;
        }
        let home_wins = records
            .iter()
            .filter(|record| record.home_runs > record.away_runs)
            .count();
        let home_wins = u32::try_from(home_wins).unwrap_or(u32::MAX);
        let total = u32::try_from(records.len()).unwrap_or(u32::MAX);
        f64::from(home_wins) / f64::from(total)
    }
}

fn opening_side(team: &TeamSetup) -> Result<TeamSide<'_>> {
    TeamSide::opening_day(&team.roster, team.profile)
        .ok_or_else(|| anyhow!("{} has no rotation", team.roster.id))
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}
