//! Team rosters, batting orders and pitching staffs.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::LINEUP_SIZE;
use crate::player::{Player, PlayerId, Position};

/// Stable team identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub String);

impl TeamId {
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(value.trim().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TeamId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One batting-order entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineupSlot {
    pub player: PlayerId,
    pub position: Position,
}

/// Malformed roster input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("{team}: lineup must have {expected} slots (got {actual})")]
    LineupSize {
        team: TeamId,
        expected: usize,
        actual: usize,
    },
    #[error("{team}: unknown player {player}")]
    UnknownPlayer { team: TeamId, player: PlayerId },
    #[error("{team}: player {player} listed more than once")]
    DuplicatePlayer { team: TeamId, player: PlayerId },
    #[error("{team}: position {position} filled more than once")]
    DuplicatePosition { team: TeamId, position: &'static str },
    #[error("{team}: lineup has no catcher")]
    MissingCatcher { team: TeamId },
    #[error("{team}: {player} has no pitching profile")]
    NotAPitcher { team: TeamId, player: PlayerId },
    #[error("{team}: starting rotation is empty")]
    EmptyRotation { team: TeamId },
}

/// Full roster handed to the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRoster {
    pub id: TeamId,
    pub name: String,
    pub players: BTreeMap<PlayerId, Player>,
    pub lineup: Vec<LineupSlot>,
    #[serde(default)]
    pub bench: Vec<PlayerId>,
    pub rotation: Vec<PlayerId>,
    #[serde(default)]
    pub bullpen: Vec<PlayerId>,
    #[serde(default)]
    pub closer: Option<PlayerId>,
}

impl TeamRoster {
    #[must_use]
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    /// Display name for `id`, falling back to the id itself.
    #[must_use]
    pub fn player_name(&self, id: &PlayerId) -> String {
        self.players
            .get(id)
            .map_or_else(|| id.0.clone(), |player| player.name.clone())
    }

    /// Lineup index where the pitcher bats, if the team has no designated hitter.
    #[must_use]
    pub fn pitcher_slot(&self) -> Option<usize> {
        self.lineup
            .iter()
            .position(|slot| slot.position == Position::Pitcher)
    }

    /// Starter for the `turn`-th game of the season.
    #[must_use]
    pub fn starter_for_turn(&self, turn: usize) -> Option<&PlayerId> {
        if self.rotation.is_empty() {
            return None;
        }
        self.rotation.get(turn % self.rotation.len())
    }

    /// Check the roster for structural problems.
    ///
    /// # Errors
    ///
    /// Returns the first `RosterError` found.
    pub fn validate(&self) -> Result<(), RosterError> {
        if self.lineup.len() != LINEUP_SIZE {
            return Err(RosterError::LineupSize {
                team: self.id.clone(),
                expected: LINEUP_SIZE,
                actual: self.lineup.len(),
            });
        }
        self.validate_lineup()?;
        for id in &self.bench {
            self.require_known(id)?;
        }
        if self.rotation.is_empty() {
            return Err(RosterError::EmptyRotation {
                team: self.id.clone(),
            });
        }
        for id in self
            .rotation
            .iter()
            .chain(self.bullpen.iter())
            .chain(self.closer.iter())
        {
            let player = self.require_known(id)?;
            if !player.is_pitcher() {
                return Err(RosterError::NotAPitcher {
                    team: self.id.clone(),
                    player: id.clone(),
                });
            }
        }
        Ok(())
    }

    fn validate_lineup(&self) -> Result<(), RosterError> {
        let mut seen_players = BTreeSet::new();
        let mut seen_positions = BTreeSet::new();
        for slot in &self.lineup {
            if !seen_positions.insert(slot.position.abbreviation()) {
                return Err(RosterError::DuplicatePosition {
                    team: self.id.clone(),
                    position: slot.position.abbreviation(),
                });
            }
            // The pitcher slot is filled by the day's starter at game time.
            if slot.position == Position::Pitcher {
                continue;
            }
            self.require_known(&slot.player)?;
            if !seen_players.insert(&slot.player) {
                return Err(RosterError::DuplicatePlayer {
                    team: self.id.clone(),
                    player: slot.player.clone(),
                });
            }
        }
        if !seen_positions.contains(Position::Catcher.abbreviation()) {
            return Err(RosterError::MissingCatcher {
                team: self.id.clone(),
            });
        }
        Ok(())
    }

    fn require_known(&self, id: &PlayerId) -> Result<&Player, RosterError> {
        self.players.get(id).ok_or_else(|| RosterError::UnknownPlayer {
            team: self.id.clone(),
            player: id.clone(),
        })
    }
}
