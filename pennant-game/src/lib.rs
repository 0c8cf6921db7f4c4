//! Pennant Simulation Engine
//!
//! Deterministic, card-driven baseball simulation core. Given two rosters,
//! manager profiles, a config and a 32-bit seed, a game always plays out the
//! same way; the season runner batches scheduled days on top of that.
//! The crate performs no I/O and has no platform-specific dependencies.

pub mod baserunning;
pub mod bases;
pub mod card;
pub mod config;
pub mod constants;
pub mod game;
pub mod grade;
pub mod league;
pub mod manager;
pub mod numbers;
pub mod plate;
pub mod player;
pub mod result;
pub mod rng;
pub mod roster;
pub mod season;
pub mod seed;
pub mod stats;

// Re-export commonly used types
pub use baserunning::{
    BuntKind, BuntResult, ExtraBaseResult, HitAndRunEffect, OverlayResult, StealResult,
    apply_hit_and_run, attempt_extra_base, error_check, resolve_bunt, resolve_steal,
};
pub use bases::{Base, BaseOutcome, BaseState, apply_outcome};
pub use card::{CardError, Column, OutcomeCard, OutcomeCode};
pub use config::{
    BuntConfig, GradeConfig, RunnerRaceConfig, SimConfig, SimConfigError, VarianceTable,
};
pub use game::{
    GameError, GameRunner, GameSetup, GameStatus, GameTracker, TeamSide, simulate_game,
};
pub use grade::{GradeBreakdown, GradeModel, PitcherGameState};
pub use league::{League, LeagueError, TeamSetup};
pub use manager::{ManagerProfile, ProfileId, Situation, Tactic};
pub use plate::{CardRead, resolve_plate_appearance};
pub use player::{Handedness, PitchingProfile, Player, PlayerId, Position};
pub use result::{
    BoxScore, GameResult, GameSummary, HalfInning, LineScore, PlayEvent, PlayKind, Side, TeamPair,
};
pub use rng::SeededRandom;
pub use roster::{RosterError, TeamId, TeamRoster};
pub use season::{
    DayGame, DayResult, Matchup, Schedule, ScheduledDay, SeasonError, SeasonResult, SeasonRunner,
    Standings, StandingsRow,
};
pub use seed::{derive_day_seed, game_seeds, parse_seed};
pub use stats::{BattingLine, PitchingDecision, PitchingLine, SeasonStats, StatBook};
