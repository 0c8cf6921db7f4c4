use pennant_game::{
    DayGame, League, Matchup, PitchingDecision, Schedule, ScheduledDay, SeasonError,
    SeasonRunner, SimConfig, TeamId,
};

const TEAMS: usize = 4;
const DAYS: u32 = 12;

fn league() -> League {
    League::synthetic(0x5EA5_0001, TEAMS)
}

#[test]
fn standings_balance_across_a_season() {
    let league = league();
    let config = SimConfig::default();
    let schedule = Schedule::round_robin(&league.team_ids(), DAYS);
    let mut seen_days = Vec::new();
    let mut runner = SeasonRunner::new(&league, &config, 2024);
    let season = runner
        .run_season(&schedule, 0..DAYS, |day| seen_days.push(day.day))
        .unwrap();

    assert_eq!(seen_days, (0..DAYS).collect::<Vec<_>>());
    assert_eq!(season.games_played, schedule.total_games());
    assert_eq!(season.games_played, TEAMS / 2 * DAYS as usize);

    let rows: Vec<_> = season.standings.rows.values().collect();
    assert_eq!(rows.len(), TEAMS);
    let wins: u32 = rows.iter().map(|row| row.wins).sum();
    let losses: u32 = rows.iter().map(|row| row.losses).sum();
    let scored: u32 = rows.iter().map(|row| row.runs_for).sum();
    let allowed: u32 = rows.iter().map(|row| row.runs_against).sum();
    assert_eq!(wins as usize, season.games_played);
    assert_eq!(wins, losses);
    assert_eq!(scored, allowed);

    let pitcher_wins: u32 = season.stats.pitching.values().map(|p| p.wins).sum();
    let starts: u32 = season.stats.pitching.values().map(|p| p.starts).sum();
    assert_eq!(pitcher_wins as usize, season.games_played);
    assert_eq!(starts as usize, season.games_played * 2);

    for (team, row) in &season.standings.rows {
        assert_eq!(row.decisions(), DAYS, "{team} missed games");
    }
}

#[test]
fn games_are_compacted_unless_detail_is_kept() {
    let league = league();
    let config = SimConfig::default();
    let schedule = Schedule::round_robin(&league.team_ids(), 2);

    let compact = SeasonRunner::new(&league, &config, 7)
        .run_season(&schedule, 0..2, |_| {})
        .unwrap();
    let detailed = SeasonRunner::new(&league, &config, 7)
        .with_detail(true)
        .run_season(&schedule, 0..2, |_| {})
        .unwrap();

    for (lean, full) in compact.days.iter().zip(&detailed.days) {
        assert_eq!(lean.seed, full.seed);
        for (lean_game, full_game) in lean.games.iter().zip(&full.games) {
            assert!(matches!(lean_game, DayGame::Compact(_)));
            let result = full_game.full().expect("detail retained");
            assert!(!result.play_by_play.is_empty());
            assert_eq!(lean_game.summary(), full_game.summary());
        }
    }
    assert_eq!(compact.standings, detailed.standings);
}

#[test]
fn same_base_seed_same_season() {
    let league = league();
    let config = SimConfig::default();
    let schedule = Schedule::round_robin(&league.team_ids(), 6);
    let first = SeasonRunner::new(&league, &config, 99)
        .run_season(&schedule, 0..6, |_| {})
        .unwrap();
    let second = SeasonRunner::new(&league, &config, 99)
        .run_season(&schedule, 0..6, |_| {})
        .unwrap();
    assert_eq!(first, second);
    let other = SeasonRunner::new(&league, &config, 100)
        .run_season(&schedule, 0..6, |_| {})
        .unwrap();
    assert_ne!(first.days[0].seed, other.days[0].seed);
}

#[test]
fn day_range_and_off_days() {
    let league = league();
    let config = SimConfig::default();
    let ids = league.team_ids();
    let mut schedule = Schedule::round_robin(&ids, 6);
    schedule.days[4].games.clear();
    let mut callbacks = 0;
    let season = SeasonRunner::new(&league, &config, 1)
        .run_season(&schedule, 2..6, |_| callbacks += 1)
        .unwrap();
    assert_eq!(callbacks, 3);
    let days: Vec<u32> = season.days.iter().map(|day| day.day).collect();
    assert_eq!(days, [2, 3, 5]);
    assert_eq!(season.games_played, 3 * TEAMS / 2);
}

#[test]
fn day_seeds_split_per_game() {
    let league = league();
    let config = SimConfig::default();
    let schedule = Schedule::round_robin(&league.team_ids(), 1);
    let day = SeasonRunner::new(&league, &config, 3)
        .run_day(&schedule.days[0])
        .unwrap();
    let seeds: Vec<u32> = day.games.iter().map(|game| game.summary().seed).collect();
    assert_eq!(seeds, pennant_game::game_seeds(day.seed, seeds.len()));
}

#[test]
fn unknown_team_is_reported() {
    let league = league();
    let config = SimConfig::default();
    let day = ScheduledDay {
        day: 3,
        games: vec![Matchup::new("T01", "XX")],
    };
    let err = SeasonRunner::new(&league, &config, 1)
        .run_day(&day)
        .unwrap_err();
    assert_eq!(
        err,
        SeasonError::UnknownTeam {
            day: 3,
            team: TeamId::new("XX"),
        }
    );
}

#[test]
fn season_saves_carry_the_margin_rule() {
    let league = league();
    let config = SimConfig::default();
    let schedule = Schedule::round_robin(&league.team_ids(), 8);
    let season = SeasonRunner::new(&league, &config, 31)
        .run_season(&schedule, 0..8, |_| {})
        .unwrap();
    for game in season.days.iter().flat_map(|day| &day.games) {
        let summary = game.summary();
        let saved = summary
            .pitching
            .away
            .iter()
            .chain(&summary.pitching.home)
            .any(|entry| entry.line.decision == Some(PitchingDecision::Save));
        if saved {
            assert!(summary.margin() <= 3);
        }
    }
}

#[cfg(feature = "async")]
#[tokio::test]
async fn async_season_matches_sync() {
    let league = league();
    let config = SimConfig::default();
    let schedule = Schedule::round_robin(&league.team_ids(), 4);
    let sync = SeasonRunner::new(&league, &config, 12)
        .run_season(&schedule, 0..4, |_| {})
        .unwrap();
    let mut runner = SeasonRunner::new(&league, &config, 12);
    let async_result = runner
        .run_season_async(&schedule, 0..4, |_| {})
        .await
        .unwrap();
    assert_eq!(sync, async_result);
}
