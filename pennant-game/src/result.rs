//! Box scores, play-by-play and the final game result.

use std::collections::BTreeMap;
use std::hash::Hasher;

use serde::{Deserialize, Serialize};
use twox_hash::XxHash64;

use crate::bases::BaseState;
use crate::baserunning::BuntKind;
use crate::card::OutcomeCode;
use crate::player::PlayerId;
use crate::roster::TeamId;
use crate::stats::{BattingEntry, PitchingEntry, StatBook};

/// Away or home.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Away,
    Home,
}

impl Side {
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Away => Self::Home,
            Self::Home => Self::Away,
        }
    }
}

/// One value per side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamPair<T> {
    pub away: T,
    pub home: T,
}

impl<T> TeamPair<T> {
    #[must_use]
    pub const fn new(away: T, home: T) -> Self {
        Self { away, home }
    }

    #[must_use]
    pub const fn get(&self, side: Side) -> &T {
        match side {
            Side::Away => &self.away,
            Side::Home => &self.home,
        }
    }

    pub const fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Away => &mut self.away,
            Side::Home => &mut self.home,
        }
    }

    /// Mutable access to both sides, `first` in the first position.
    pub const fn split_mut(&mut self, first: Side) -> (&mut T, &mut T) {
        match first {
            Side::Away => (&mut self.away, &mut self.home),
            Side::Home => (&mut self.home, &mut self.away),
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> TeamPair<U> {
        TeamPair {
            away: f(self.away),
            home: f(self.home),
        }
    }
}

/// Top or bottom of an inning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HalfInning {
    Top,
    Bottom,
}

impl HalfInning {
    /// Side at bat in this half.
    #[must_use]
    pub const fn batting(self) -> Side {
        match self {
            Self::Top => Side::Away,
            Self::Bottom => Side::Home,
        }
    }

    #[must_use]
    pub const fn fielding(self) -> Side {
        self.batting().opponent()
    }
}

/// Runs per half-inning. Home entries are `None` when the bottom half was not needed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineScore {
    pub away: Vec<u32>,
    pub home: Vec<Option<u32>>,
}

impl LineScore {
    #[must_use]
    pub fn away_total(&self) -> u32 {
        self.away.iter().sum()
    }

    #[must_use]
    pub fn home_total(&self) -> u32 {
        self.home.iter().flatten().sum()
    }

    /// Render as a fixed-width scoreboard row pair.
    #[must_use]
    pub fn render(&self, away_label: &str, home_label: &str) -> String {
        let away_cells: Vec<String> = self.away.iter().map(u32::to_string).collect();
        let home_cells: Vec<String> = self
            .home
            .iter()
            .map(|cell| cell.map_or_else(|| "X".to_string(), |runs| runs.to_string()))
            .collect();
        format!(
            "{away_label:<6}{} | {}\n{home_label:<6}{} | {}",
            away_cells.join(" "),
            self.away_total(),
            home_cells.join(" "),
            self.home_total()
        )
    }
}

/// Line score plus run, hit and error totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxScore {
    pub line: LineScore,
    pub runs: TeamPair<u32>,
    pub hits: TeamPair<u32>,
    pub errors: TeamPair<u32>,
}

/// What happened on one play-by-play entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail", rename_all = "snake_case")]
pub enum PlayKind {
    PlateAppearance(OutcomeCode),
    IntentionalWalk,
    Bunt(BuntKind),
    StolenBase { runner: PlayerId },
    CaughtStealing { runner: PlayerId },
    PitchingChange { outgoing: PlayerId, incoming: PlayerId },
    PinchHitter { replaced: PlayerId, incoming: PlayerId },
    GameOver,
}

/// One ordered play-by-play entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayEvent {
    pub inning: u32,
    pub half: HalfInning,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batter: Option<PlayerId>,
    pub pitcher: PlayerId,
    pub kind: PlayKind,
    pub tag: String,
    pub runs_scored: u8,
    pub outs_after: u8,
    pub bases_after: BaseState,
    pub score: TeamPair<u32>,
    #[serde(default)]
    pub umpire_override: bool,
    #[serde(default)]
    pub error: bool,
}

/// Memory-lean projection of a finished game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub seed: u32,
    pub teams: TeamPair<TeamId>,
    pub score: TeamPair<u32>,
    pub innings: u32,
    pub box_score: BoxScore,
    pub batting: TeamPair<Vec<BattingEntry>>,
    pub pitching: TeamPair<Vec<PitchingEntry>>,
    pub winning_pitcher: Option<PlayerId>,
    pub losing_pitcher: Option<PlayerId>,
    pub save: Option<PlayerId>,
    pub complete_game: TeamPair<bool>,
    pub shutout: TeamPair<bool>,
    pub plate_appearances: u32,
    pub truncated: bool,
}

impl GameSummary {
    /// Winning side; `None` only for a truncated tie.
    #[must_use]
    pub fn winner(&self) -> Option<Side> {
        match self.score.home.cmp(&self.score.away) {
            std::cmp::Ordering::Greater => Some(Side::Home),
            std::cmp::Ordering::Less => Some(Side::Away),
            std::cmp::Ordering::Equal => None,
        }
    }

    #[must_use]
    pub fn margin(&self) -> u32 {
        self.score.home.abs_diff(self.score.away)
    }

    /// Rebuild a stat book for one side.
    #[must_use]
    pub fn book(&self, side: Side) -> StatBook {
        StatBook {
            batting: self.batting.get(side).clone(),
            pitching: self.pitching.get(side).clone(),
        }
    }
}

/// Complete game result: summary, ordered play-by-play and names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub summary: GameSummary,
    pub play_by_play: Vec<PlayEvent>,
    pub player_names: BTreeMap<PlayerId, String>,
}

impl GameResult {
    /// Drop play-by-play and the name map.
    #[must_use]
    pub fn compact(self) -> GameSummary {
        self.summary
    }

    /// Stable hash of the serialized result for determinism checks.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the result cannot be serialized.
    pub fn fingerprint(&self) -> Result<u64, serde_json::Error> {
        let bytes = serde_json::to_vec(self)?;
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(&bytes);
        Ok(hasher.finish())
    }

    /// Display name for `id`, falling back to the id itself.
    #[must_use]
    pub fn name_of<'a>(&'a self, id: &'a PlayerId) -> &'a str {
        self.player_names.get(id).map_or(id.as_str(), String::as_str)
    }

    /// One-line-per-play text rendering.
    #[must_use]
    pub fn play_by_play_text(&self) -> Vec<String> {
        self.play_by_play
            .iter()
            .map(|event| {
                let half = match event.half {
                    HalfInning::Top => "T",
                    HalfInning::Bottom => "B",
                };
                let batter = event
                    .batter
                    .as_ref()
                    .map_or(String::new(), |id| format!(" {}", self.name_of(id)));
                format!(
                    "{half}{}{} {} [{} out, {}] {}-{}",
                    event.inning,
                    batter,
                    event.tag,
                    event.outs_after,
                    event.bases_after.occupancy_label(),
                    event.score.away,
                    event.score.home
                )
            })
            .collect()
    }
}
