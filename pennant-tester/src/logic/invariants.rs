use pennant_game::{
    GameResult, GameSummary, HalfInning, PitchingDecision, PlayKind, SeasonResult, Side,
};

const SAVE_MAX_MARGIN: u32 = 3;

/// Every rule a finished game must satisfy. Returns one message per
/// violation; an empty list means the game is sound.
pub fn check_game(result: &GameResult) -> Vec<String> {
    let mut violations = check_summary(&result.summary);
    check_play_by_play(result, &mut violations);
    violations
}

/// Checks that only need the compact summary.
pub fn check_summary(summary: &GameSummary) -> Vec<String> {
    let mut violations = Vec::new();
    let line = &summary.box_score.line;

    if line.away_total() != summary.score.away || line.home_total() != summary.score.home {
        violations.push(format!(
            "line score {}-{} does not match final {}-{}",
            line.away_total(),
            line.home_total(),
            summary.score.away,
            summary.score.home
        ));
    }

    for side in [Side::Away, Side::Home] {
        let batting_hits: u32 = summary.batting.get(side).iter().map(|e| e.line.h).sum();
        let box_hits = *summary.box_score.hits.get(side);
        if batting_hits != box_hits {
            violations.push(format!(
                "{side:?} batting hits {batting_hits} != box score hits {box_hits}"
            ));
        }
    }

    if summary.truncated {
        violations.push(format!(
            "game truncated after {} plate appearances",
            summary.plate_appearances
        ));
        return violations;
    }

    if summary.score.away == summary.score.home {
        violations.push("game ended tied".to_string());
    }

    let decisions: Vec<PitchingDecision> = summary
        .pitching
        .away
        .iter()
        .chain(&summary.pitching.home)
        .filter_map(|entry| entry.line.decision)
        .collect();
    let count = |wanted: PitchingDecision| decisions.iter().filter(|d| **d == wanted).count();
    if count(PitchingDecision::Win) != 1 || count(PitchingDecision::Loss) != 1 {
        violations.push(format!(
            "expected one W and one L, found {} W / {} L",
            count(PitchingDecision::Win),
            count(PitchingDecision::Loss)
        ));
    }
    if count(PitchingDecision::Save) > 0 && summary.margin() > SAVE_MAX_MARGIN {
        violations.push(format!("save credited with a {}-run margin", summary.margin()));
    }
    violations
}

fn check_play_by_play(result: &GameResult, violations: &mut Vec<String>) {
    let plays = &result.play_by_play;
    if plays.is_empty() {
        violations.push("empty play-by-play".to_string());
        return;
    }

    for pair in plays
        .iter()
        .filter(|event| event.kind != PlayKind::GameOver)
        .collect::<Vec<_>>()
        .windows(2)
    {
        let (before, after) = (pair[0], pair[1]);
        if before.outs_after > 3 {
            violations.push(format!("{} outs recorded in one half", before.outs_after));
        }
        let same_half = before.inning == after.inning && before.half == after.half;
        if same_half && before.outs_after >= 3 {
            violations.push(format!(
                "play after the third out in inning {} ({:?})",
                before.inning, before.half
            ));
        }
        if !same_half && before.outs_after != 3 {
            violations.push(format!(
                "half inning {} ({:?}) ended with {} outs",
                before.inning, before.half, before.outs_after
            ));
        }
    }

    if result.summary.winner() == Some(Side::Home)
        && plays.last().is_some_and(|last| last.half != HalfInning::Bottom)
    {
        violations.push("home win does not end in a bottom half".to_string());
    }
}

/// League-wide bookkeeping checks for a season run.
pub fn check_season(season: &SeasonResult) -> Vec<String> {
    let mut violations = Vec::new();
    let rows = season.standings.rows.values();
    let (wins, losses, scored, allowed) = rows.fold((0, 0, 0, 0), |acc, row| {
        (
            acc.0 + row.wins,
            acc.1 + row.losses,
            acc.2 + row.runs_for,
            acc.3 + row.runs_against,
        )
    });
    if wins != losses {
        violations.push(format!("standings hold {wins} wins but {losses} losses"));
    }
    if scored != allowed {
        violations.push(format!("runs scored {scored} != runs allowed {allowed}"));
    }
    let played: usize = season.days.iter().map(|day| day.games.len()).sum();
    if played != season.games_played {
        violations.push(format!(
            "games_played {} != games in day results {played}",
            season.games_played
        ));
    }
    for day in &season.days {
        for game in &day.games {
            violations.extend(
                check_summary(game.summary())
                    .into_iter()
                    .map(|v| format!("day {} seed {:#010x}: {v}", day.day, game.summary().seed)),
            );
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use pennant_game::{
        GameSetup, League, ProfileId, Schedule, SeasonRunner, SimConfig, TeamPair, TeamSide,
        simulate_game,
    };

    fn game(seed: u32) -> GameResult {
        let league = League::synthetic(21, 2);
        let ids = league.team_ids();
        let config = SimConfig::default();
        let away = &league.team(&ids[0]).unwrap().roster;
        let home = &league.team(&ids[1]).unwrap().roster;
        simulate_game(GameSetup {
            teams: TeamPair::new(
                TeamSide::opening_day(away, ProfileId::Balanced).unwrap(),
                TeamSide::opening_day(home, ProfileId::Conservative).unwrap(),
            ),
            seed,
            config: &config,
        })
        .unwrap()
    }

    #[test]
    fn real_games_are_clean() {
        for seed in 0..25 {
            assert_eq!(check_game(&game(seed)), Vec::<String>::new());
        }
    }

    #[test]
    fn tampered_scores_are_flagged() {
        let mut result = game(3);
        result.summary.score.away += 1;
        let violations = check_game(&result);
        assert!(violations.iter().any(|v| v.contains("line score")));

        let mut tied = game(4);
        tied.summary.score.home = tied.summary.score.away;
        assert!(check_summary(&tied.summary).iter().any(|v| v.contains("tied")));
    }

    #[test]
    fn missing_decisions_are_flagged() {
        let mut result = game(5);
        for entry in &mut result.summary.pitching.home {
            entry.line.decision = None;
        }
        for entry in &mut result.summary.pitching.away {
            entry.line.decision = None;
        }
        assert!(
            check_summary(&result.summary)
                .iter()
                .any(|v| v.contains("one W and one L"))
        );
    }

    #[test]
    fn season_books_balance() {
        let league = League::synthetic(8, 4);
        let config = SimConfig::default();
        let schedule = Schedule::round_robin(&league.team_ids(), 3);
        let season = SeasonRunner::new(&league, &config, 44)
            .run_season(&schedule, 0..3, |_| {})
            .unwrap();
        assert!(check_season(&season).is_empty());
    }
}
