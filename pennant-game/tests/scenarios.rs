use pennant_game::config::GradeConfig;
use pennant_game::player::PitcherRole;
use pennant_game::{
    BaseState, GradeModel, League, OutcomeCode, PitcherGameState, PitchingProfile, PlayerId,
    ScheduledDay, SeasonRunner, SimConfig, apply_outcome,
};

fn runner(id: &str) -> Option<PlayerId> {
    Some(PlayerId::new(id))
}

#[test]
fn single_with_runner_on_first() {
    let bases = BaseState {
        first: runner("R1"),
        ..BaseState::empty()
    };
    let outcome = apply_outcome(OutcomeCode::SingleClean, &bases, 0, &PlayerId::new("B1"));
    assert_eq!(
        outcome.bases,
        BaseState {
            first: runner("B1"),
            second: runner("R1"),
            third: None,
        }
    );
    assert_eq!(outcome.runs_scored(), 0);
    assert_eq!(outcome.outs_added, 0);
}

#[test]
fn grand_slam_clears_the_bases() {
    let bases = BaseState {
        first: runner("R1"),
        second: runner("R2"),
        third: runner("R3"),
    };
    let outcome = apply_outcome(OutcomeCode::HomeRun, &bases, 1, &PlayerId::new("B1"));
    assert!(outcome.bases.is_empty());
    assert_eq!(outcome.runs_scored(), 4);
    assert_eq!(outcome.rbi, 4);
    assert!(outcome.runs.contains(&PlayerId::new("B1")));
}

#[test]
fn stolen_base_probability_math() {
    let config = SimConfig::default();
    let probability = config.steal.probability(0.80, false, 0.50);
    assert!((probability - 0.50).abs() < 1e-9, "got {probability}");
    let with_speed = config.steal.probability(0.80, true, 0.50);
    assert!(with_speed > probability);
}

#[test]
fn starter_grade_decays_past_stamina() {
    let cfg = GradeConfig::default();
    let model = GradeModel::new(&cfg);
    let profile = PitchingProfile {
        grade: 12,
        stamina: 6.0,
        role: PitcherRole::Starter,
        platoon_value: 0,
        fresh: false,
    };
    let mut state = PitcherGameState::starter(PlayerId::new("SP"));
    state.record_outs(24);
    let [after_fatigue, ..] = model.pre_matchup(&profile, &state);
    assert_eq!(after_fatigue, 8);
}

#[test]
fn empty_day_yields_no_games() {
    let league = League::synthetic(11, 4);
    let config = SimConfig::default();
    let mut season = SeasonRunner::new(&league, &config, 0xFEED);
    let day = season
        .run_day(&ScheduledDay {
            day: 0,
            games: Vec::new(),
        })
        .expect("an off day is not an error");
    assert!(day.games.is_empty());
}
