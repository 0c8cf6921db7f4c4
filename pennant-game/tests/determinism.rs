use std::collections::HashSet;

use pennant_game::{
    GameResult, GameSetup, League, ProfileId, SimConfig, TeamPair, TeamSide, simulate_game,
};

fn play(league: &League, config: &SimConfig, seed: u32) -> GameResult {
    let ids = league.team_ids();
    let away = &league.team(&ids[0]).unwrap().roster;
    let home = &league.team(&ids[1]).unwrap().roster;
    simulate_game(GameSetup {
        teams: TeamPair::new(
            TeamSide::opening_day(away, ProfileId::Aggressive).unwrap(),
            TeamSide::opening_day(home, ProfileId::Analytical).unwrap(),
        ),
        seed,
        config,
    })
    .unwrap()
}

#[test]
fn same_seed_same_game() {
    let league = League::synthetic(0xC0FFEE, 2);
    let config = SimConfig::default();
    for seed in [0, 1, 42, 0xDEAD_BEEF, u32::MAX] {
        let first = play(&league, &config, seed);
        let second = play(&league, &config, seed);
        assert_eq!(first, second, "seed {seed:#x} diverged");
        assert_eq!(first.fingerprint().unwrap(), second.fingerprint().unwrap());
        assert_eq!(first.play_by_play_text(), second.play_by_play_text());
    }
}

#[test]
fn rebuilt_league_replays_identically() {
    let config = SimConfig::default();
    let first = play(&League::synthetic(9, 2), &config, 77);
    let second = play(&League::synthetic(9, 2), &config, 77);
    assert_eq!(first.fingerprint().unwrap(), second.fingerprint().unwrap());
}

#[test]
fn seeds_produce_different_games() {
    let league = League::synthetic(3, 2);
    let config = SimConfig::default();
    let fingerprints: HashSet<u64> = (0..20)
        .map(|seed| play(&league, &config, seed).fingerprint().unwrap())
        .collect();
    assert!(fingerprints.len() > 15, "only {} distinct games", fingerprints.len());
}

#[test]
fn result_survives_json() {
    let league = League::synthetic(5, 2);
    let config = SimConfig::default();
    let result = play(&league, &config, 1234);
    let json = serde_json::to_string(&result).unwrap();
    let back: GameResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back.fingerprint().unwrap(), result.fingerprint().unwrap());
}
