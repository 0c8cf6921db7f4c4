//! Per-game state machine and orchestrator.
//!
//! A [`GameRunner`] owns one generator, one [`GameTracker`] and both sides'
//! [`TeamGameState`]. Rosters, cards and the config are borrowed immutably,
//! so any number of runners can share them. Each [`GameRunner::step`] plays
//! one plate-appearance cycle; [`GameRunner::run`] drives the game to the
//! end and builds the [`GameResult`].

mod finalize;
mod plate_appearance;
mod team;
mod tracker;

use std::collections::BTreeMap;

use log::{debug, warn};
use thiserror::Error;

use crate::config::{SimConfig, SimConfigError};
use crate::constants::LOG_TARGET_GAME;
use crate::manager::ProfileId;
use crate::player::PlayerId;
use crate::result::{
    BoxScore, GameResult, GameSummary, HalfInning, PlayEvent, PlayKind, Side, TeamPair,
};
use crate::rng::SeededRandom;
use crate::roster::{RosterError, TeamId, TeamRoster};

pub use finalize::{Decisions, complete_games, decide, shutouts};
pub use team::{TeamGameState, bat_quality, batter_threat};
pub use tracker::{GameStatus, GameTracker, Transition};

/// Contract violations raised by the orchestrator. None of these are
/// transient; they point at a caller bug.
#[derive(Debug, Error, PartialEq)]
pub enum GameError {
    #[error(transparent)]
    InvalidRoster(#[from] RosterError),
    #[error(transparent)]
    InvalidConfig(#[from] SimConfigError),
    #[error("{team}: starter {player} is not on the roster")]
    UnknownStarter { team: TeamId, player: PlayerId },
    #[error("{team}: starter {player} has no pitching profile")]
    StarterNotAPitcher { team: TeamId, player: PlayerId },
    #[error("game has already started")]
    AlreadyStarted,
    #[error("game has not started")]
    NotStarted,
    #[error("game is already complete")]
    AlreadyCompleted,
    #[error("game is not complete")]
    NotCompleted,
    #[error("game result was already taken")]
    AlreadyFinished,
}

/// One side's inputs for a game.
#[derive(Debug, Clone)]
pub struct TeamSide<'a> {
    pub roster: &'a TeamRoster,
    pub profile: ProfileId,
    pub starter: PlayerId,
}

impl<'a> TeamSide<'a> {
    #[must_use]
    pub const fn new(roster: &'a TeamRoster, profile: ProfileId, starter: PlayerId) -> Self {
        Self {
            roster,
            profile,
            starter,
        }
    }

    /// Side starting the first pitcher in the rotation.
    #[must_use]
    pub fn opening_day(roster: &'a TeamRoster, profile: ProfileId) -> Option<Self> {
        let starter = roster.starter_for_turn(0)?.clone();
        Some(Self::new(roster, profile, starter))
    }
}

/// Everything needed to play one game.
#[derive(Debug, Clone)]
pub struct GameSetup<'a> {
    pub teams: TeamPair<TeamSide<'a>>,
    pub seed: u32,
    pub config: &'a SimConfig,
}

/// Drives one game from first pitch to final out.
#[derive(Debug, Clone)]
pub struct GameRunner<'a> {
    config: &'a SimConfig,
    seed: u32,
    rng: SeededRandom,
    tracker: GameTracker,
    teams: TeamPair<TeamGameState<'a>>,
    plays: Vec<PlayEvent>,
    truncated: bool,
    finished: bool,
}

impl<'a> GameRunner<'a> {
    /// Validate inputs and set both sides up.
    ///
    /// # Errors
    ///
    /// Returns a `GameError` when the config or either roster is invalid, or
    /// when a starter cannot pitch.
    pub fn new(setup: GameSetup<'a>) -> Result<Self, GameError> {
        setup.config.validate()?;
        let TeamPair { away, home } = setup.teams;
        away.roster.validate()?;
        home.roster.validate()?;
        let teams = TeamPair::new(
            TeamGameState::new(away.roster, away.profile, &away.starter)?,
            TeamGameState::new(home.roster, home.profile, &home.starter)?,
        );
        Ok(Self {
            config: setup.config,
            seed: setup.seed,
            rng: SeededRandom::new(setup.seed),
            tracker: GameTracker::new(setup.config.regulation_innings),
            teams,
            plays: Vec::new(),
            truncated: false,
            finished: false,
        })
    }

    #[must_use]
    pub const fn status(&self) -> GameStatus {
        self.tracker.status
    }

    #[must_use]
    pub const fn tracker(&self) -> &GameTracker {
        &self.tracker
    }

    #[must_use]
    pub const fn team(&self, side: Side) -> &TeamGameState<'a> {
        self.teams.get(side)
    }

    #[must_use]
    pub fn plays(&self) -> &[PlayEvent] {
        &self.plays
    }

    /// Random draws consumed so far.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.rng.draws()
    }

    /// Move from not-started to in-progress.
    ///
    /// # Errors
    ///
    /// Returns `GameError::AlreadyStarted` on a second call.
    pub fn start(&mut self) -> Result<(), GameError> {
        if self.tracker.status != GameStatus::NotStarted {
            return Err(GameError::AlreadyStarted);
        }
        self.tracker.start();
        debug!(
            target: LOG_TARGET_GAME,
            "game {:#010x}: {} at {}",
            self.seed,
            self.teams.away.roster().id,
            self.teams.home.roster().id
        );
        Ok(())
    }

    /// Play one cycle: pitching checks, an optional steal and one plate
    /// appearance.
    ///
    /// # Errors
    ///
    /// Returns `GameError::NotStarted` or `GameError::AlreadyCompleted` when
    /// the game is not in progress.
    pub fn step(&mut self) -> Result<GameStatus, GameError> {
        match self.tracker.status {
            GameStatus::NotStarted => return Err(GameError::NotStarted),
            GameStatus::Completed => return Err(GameError::AlreadyCompleted),
            GameStatus::InProgress => {}
        }
        if self.tracker.plate_appearances >= self.config.max_plate_appearances {
            warn!(
                target: LOG_TARGET_GAME,
                "game {:#010x} hit the {} plate appearance ceiling in inning {}; truncating",
                self.seed,
                self.config.max_plate_appearances,
                self.tracker.inning
            );
            self.truncated = true;
            self.tracker.truncate();
            self.record_game_over();
            return Ok(self.tracker.status);
        }

        self.play_cycle();
        if self.tracker.advance() == Transition::GameOver {
            self.record_game_over();
        }
        Ok(self.tracker.status)
    }

    /// Start if needed, play to the end and build the result.
    ///
    /// # Errors
    ///
    /// Returns `GameError::AlreadyFinished` when the result was already taken.
    pub fn run(&mut self) -> Result<GameResult, GameError> {
        if self.tracker.status == GameStatus::NotStarted {
            self.start()?;
        }
        while self.tracker.status == GameStatus::InProgress {
            self.step()?;
        }
        self.finish()
    }

    /// Assign decisions and hand over the result. Stat books and the
    /// play-by-play move into the result, so this succeeds once.
    ///
    /// # Errors
    ///
    /// Returns `GameError::NotCompleted` before the last out and
    /// `GameError::AlreadyFinished` on a second call.
    pub fn finish(&mut self) -> Result<GameResult, GameError> {
        if self.finished {
            return Err(GameError::AlreadyFinished);
        }
        if self.tracker.status != GameStatus::Completed {
            return Err(GameError::NotCompleted);
        }
        self.finished = true;

        let mut books = TeamPair::new(
            std::mem::take(&mut self.teams.away.book),
            std::mem::take(&mut self.teams.home.book),
        );
        let score = self.tracker.score;
        let decisions = decide(&score, &books);
        finalize::apply(&decisions, &mut books);
        let complete_game = complete_games(&books);
        let shutout = shutouts(&complete_game, &score);

        let rosters = [self.teams.away.roster(), self.teams.home.roster()];
        let player_names: BTreeMap<PlayerId, String> = rosters
            .iter()
            .flat_map(|roster| roster.players.values())
            .map(|player| (player.id.clone(), player.name.clone()))
            .collect();

        let TeamPair { away, home } = books;
        let summary = GameSummary {
            seed: self.seed,
            teams: TeamPair::new(rosters[0].id.clone(), rosters[1].id.clone()),
            score,
            innings: self.tracker.inning,
            box_score: BoxScore {
                line: self.tracker.line_score.clone(),
                runs: score,
                hits: self.tracker.hits,
                errors: self.tracker.errors,
            },
            batting: TeamPair::new(away.batting, home.batting),
            pitching: TeamPair::new(away.pitching, home.pitching),
            winning_pitcher: decisions.winner,
            losing_pitcher: decisions.loser,
            save: decisions.save,
            complete_game,
            shutout,
            plate_appearances: self.tracker.plate_appearances,
            truncated: self.truncated,
        };
        debug!(
            target: LOG_TARGET_GAME,
            "game {:#010x} final: {} {} - {} {} ({} innings, {} draws)",
            self.seed,
            summary.teams.away,
            score.away,
            summary.teams.home,
            score.home,
            summary.innings,
            self.rng.draws()
        );
        Ok(GameResult {
            summary,
            play_by_play: std::mem::take(&mut self.plays),
            player_names,
        })
    }

    /// Closing entry. Always stamped as the bottom half so the last entry of a
    /// home win reads as the bottom of an inning, including games where the
    /// home side led after the top of the last inning. In that case no other
    /// event carries the bottom half and the line score holds `None` for it.
    fn record_game_over(&mut self) {
        let pitcher = self.teams.away.pitcher.pitcher.clone();
        let mut event = self
            .tracker
            .event(&pitcher, None, PlayKind::GameOver, "FINAL".to_string());
        event.half = HalfInning::Bottom;
        self.plays.push(event);
    }
}

/// Play a whole game.
///
/// # Errors
///
/// Returns a `GameError` when the setup is invalid.
pub fn simulate_game(setup: GameSetup<'_>) -> Result<GameResult, GameError> {
    GameRunner::new(setup)?.run()
}
