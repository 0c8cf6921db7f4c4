use pennant_game::{
    GameResult, GameSetup, HalfInning, League, PitchingDecision, PlayKind, ProfileId, Side,
    SimConfig, TeamPair, TeamSide, simulate_game,
};

const SEED_SWEEP: u32 = 200;

fn sweep(league_seed: u64) -> Vec<GameResult> {
    let league = League::synthetic(league_seed, 4);
    let config = SimConfig::default();
    let ids = league.team_ids();
    (0..SEED_SWEEP)
        .map(|seed| {
            let index = seed as usize;
            let away = league.team(&ids[index % ids.len()]).unwrap();
            let home = league.team(&ids[(index + 1) % ids.len()]).unwrap();
            let turn = index / ids.len();
            let away_starter = away.roster.starter_for_turn(turn).unwrap().clone();
            let home_starter = home.roster.starter_for_turn(turn).unwrap().clone();
            simulate_game(GameSetup {
                teams: TeamPair::new(
                    TeamSide::new(&away.roster, ProfileId::ALL[index % 4], away_starter),
                    TeamSide::new(&home.roster, ProfileId::ALL[(index + 1) % 4], home_starter),
                ),
                seed: seed.wrapping_mul(0x9E37_79B9),
                config: &config,
            })
            .unwrap()
        })
        .collect()
}

#[test]
fn scores_add_up() {
    for result in sweep(1) {
        let summary = &result.summary;
        let line = &summary.box_score.line;
        assert_eq!(line.away_total(), summary.score.away, "seed {}", summary.seed);
        assert_eq!(line.home_total(), summary.score.home, "seed {}", summary.seed);
        assert_eq!(summary.box_score.runs, summary.score);
        assert_eq!(line.away.len(), line.home.len());
        assert_eq!(u32::try_from(line.away.len()).unwrap(), summary.innings);

        for side in [Side::Away, Side::Home] {
            let batting_hits: u32 = summary.batting.get(side).iter().map(|e| e.line.h).sum();
            assert_eq!(batting_hits, *summary.box_score.hits.get(side));
            let batting_runs: u32 = summary.batting.get(side).iter().map(|e| e.line.r).sum();
            assert_eq!(batting_runs, *summary.score.get(side));
            let allowed: u32 = summary
                .pitching
                .get(side.opponent())
                .iter()
                .map(|e| e.line.r)
                .sum();
            assert_eq!(allowed, *summary.score.get(side));
            let outs: u32 = summary.pitching.get(side).iter().map(|e| e.line.outs).sum();
            assert!(outs >= 24, "seed {}: {outs} outs recorded", summary.seed);
        }
    }
}

#[test]
fn games_never_end_tied() {
    for result in sweep(2) {
        let summary = &result.summary;
        assert!(!summary.truncated);
        assert_ne!(summary.score.away, summary.score.home);
        assert!(summary.innings >= 9);
        if summary.winner() == Some(Side::Home) {
            let last = result.play_by_play.last().unwrap();
            assert_eq!(last.half, HalfInning::Bottom);
        }
    }
}

#[test]
fn outs_stay_within_a_half() {
    for result in sweep(3) {
        let plays: Vec<_> = result
            .play_by_play
            .iter()
            .filter(|event| event.kind != PlayKind::GameOver)
            .collect();
        for pair in plays.windows(2) {
            let (before, after) = (pair[0], pair[1]);
            assert!(before.outs_after <= 3);
            let same_half = before.inning == after.inning && before.half == after.half;
            if same_half {
                assert!(before.outs_after < 3, "play after the third out");
            } else {
                assert_eq!(before.outs_after, 3, "half changed early");
            }
        }
    }
}

#[test]
fn exactly_one_win_and_one_loss() {
    for result in sweep(4) {
        let summary = &result.summary;
        let decisions: Vec<PitchingDecision> = summary
            .pitching
            .away
            .iter()
            .chain(&summary.pitching.home)
            .filter_map(|entry| entry.line.decision)
            .collect();
        let count = |wanted: PitchingDecision| decisions.iter().filter(|d| **d == wanted).count();
        assert_eq!(count(PitchingDecision::Win), 1);
        assert_eq!(count(PitchingDecision::Loss), 1);
        assert!(count(PitchingDecision::Save) <= 1);
        if summary.save.is_some() {
            assert!(summary.margin() <= 3);
        }

        let winning = summary.winner().unwrap();
        let winner = summary.winning_pitcher.as_ref().unwrap();
        assert!(summary.pitching.get(winning).iter().any(|e| &e.player == winner));
        assert_eq!(
            summary.losing_pitcher.as_ref(),
            summary.pitching.get(winning.opponent()).first().map(|e| &e.player)
        );
    }
}

#[test]
fn shutouts_are_complete_games() {
    for result in sweep(5) {
        let summary = &result.summary;
        for side in [Side::Away, Side::Home] {
            if *summary.shutout.get(side) {
                assert!(*summary.complete_game.get(side));
                assert_eq!(*summary.score.get(side.opponent()), 0);
            }
            if *summary.complete_game.get(side) {
                assert_eq!(summary.pitching.get(side).len(), 1);
            }
        }
    }
}

#[test]
fn every_named_player_is_known() {
    for result in sweep(6).iter().take(20) {
        for event in &result.play_by_play {
            assert!(result.player_names.contains_key(&event.pitcher));
            if let Some(batter) = &event.batter {
                assert!(result.player_names.contains_key(batter));
            }
        }
    }
}

#[test]
fn skipped_bottom_half_only_carries_the_closing_entry() {
    let mut skipped = 0;
    for result in sweep(4) {
        let summary = &result.summary;
        let line = &summary.box_score.line;
        if line.home.last() != Some(&None) {
            continue;
        }
        skipped += 1;
        assert!(summary.score.home > summary.score.away, "seed {}", summary.seed);
        let (last, rest) = result.play_by_play.split_last().unwrap();
        assert_eq!(last.kind, PlayKind::GameOver);
        assert_eq!(last.half, HalfInning::Bottom);
        assert!(
            rest.iter()
                .all(|event| event.inning < summary.innings || event.half == HalfInning::Top),
            "seed {}: play recorded in a skipped half",
            summary.seed
        );
    }
    assert!(skipped > 0, "no game in the sweep skipped the bottom half");
}
