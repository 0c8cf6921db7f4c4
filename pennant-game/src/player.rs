//! Player identity, attributes and pitching profiles.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::card::OutcomeCard;
use crate::constants::{GRADE_MAX, GRADE_MIN};

/// Stable player identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(value.trim().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Batting or throwing side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handedness {
    Left,
    Right,
    Switch,
}

impl Handedness {
    /// Same-side matchup; a switch hitter never shares a side with the pitcher.
    #[must_use]
    pub const fn same_side_as(self, pitcher: Self) -> bool {
        matches!(
            (self, pitcher),
            (Self::Left, Self::Left) | (Self::Right, Self::Right)
        )
    }
}

/// Defensive position in the lineup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "P")]
    Pitcher,
    #[serde(rename = "C")]
    Catcher,
    #[serde(rename = "1B")]
    FirstBase,
    #[serde(rename = "2B")]
    SecondBase,
    #[serde(rename = "3B")]
    ThirdBase,
    #[serde(rename = "SS")]
    Shortstop,
    #[serde(rename = "LF")]
    LeftField,
    #[serde(rename = "CF")]
    CenterField,
    #[serde(rename = "RF")]
    RightField,
    #[serde(rename = "DH")]
    DesignatedHitter,
}

impl Position {
    #[must_use]
    pub const fn is_outfield(self) -> bool {
        matches!(self, Self::LeftField | Self::CenterField | Self::RightField)
    }

    #[must_use]
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::Pitcher => "P",
            Self::Catcher => "C",
            Self::FirstBase => "1B",
            Self::SecondBase => "2B",
            Self::ThirdBase => "3B",
            Self::Shortstop => "SS",
            Self::LeftField => "LF",
            Self::CenterField => "CF",
            Self::RightField => "RF",
            Self::DesignatedHitter => "DH",
        }
    }
}

/// Physical and skill ratings, each in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(default = "Attributes::default_rating")]
    pub speed: f64,
    #[serde(default = "Attributes::default_rating")]
    pub power: f64,
    #[serde(default = "Attributes::default_rating")]
    pub discipline: f64,
    #[serde(default = "Attributes::default_rating")]
    pub contact: f64,
    #[serde(default = "Attributes::default_rating")]
    pub fielding: f64,
    #[serde(default = "Attributes::default_rating")]
    pub arm: f64,
}

impl Attributes {
    #[must_use]
    pub const fn default_rating() -> f64 {
        0.5
    }

    /// Clamp every rating into the unit interval, zeroing non-finite values.
    pub fn sanitize(&mut self) {
        for value in [
            &mut self.speed,
            &mut self.power,
            &mut self.discipline,
            &mut self.contact,
            &mut self.fielding,
            &mut self.arm,
        ] {
            *value = if value.is_finite() {
                value.clamp(0.0, 1.0)
            } else {
                0.0
            };
        }
    }
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            speed: Self::default_rating(),
            power: Self::default_rating(),
            discipline: Self::default_rating(),
            contact: Self::default_rating(),
            fielding: Self::default_rating(),
            arm: Self::default_rating(),
        }
    }
}

/// Scouting archetypes that feed manager and baserunning decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Archetypes {
    #[serde(default)]
    pub speed: bool,
    #[serde(default)]
    pub power: bool,
    #[serde(default)]
    pub contact: bool,
    #[serde(default)]
    pub defense: bool,
}

/// Bullpen role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PitcherRole {
    Starter,
    Reliever,
    Closer,
}

/// Pitching ratings for players who can take the mound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchingProfile {
    /// Base grade, 1-30.
    pub grade: i32,
    /// Innings the pitcher can throw before fatigue sets in.
    pub stamina: f64,
    pub role: PitcherRole,
    /// Grade added on a same-side matchup.
    #[serde(default)]
    pub platoon_value: i32,
    #[serde(default)]
    pub fresh: bool,
}

impl PitchingProfile {
    #[must_use]
    pub fn clamped_grade(&self) -> i32 {
        self.grade.clamp(GRADE_MIN, GRADE_MAX)
    }
}

/// A rostered player with everything the simulation reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub bats: Handedness,
    pub throws: Handedness,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub archetypes: Archetypes,
    pub card: OutcomeCard,
    #[serde(default)]
    pub pitching: Option<PitchingProfile>,
}

impl Player {
    #[must_use]
    pub const fn is_pitcher(&self) -> bool {
        self.pitching.is_some()
    }

    /// Base pitching grade, or the floor grade for position players.
    #[must_use]
    pub fn pitching_grade(&self) -> i32 {
        self.pitching
            .as_ref()
            .map_or(GRADE_MIN, PitchingProfile::clamped_grade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::OutcomeCode;

    #[test]
    fn platoon_side_ignores_switch_hitters() {
        assert!(Handedness::Left.same_side_as(Handedness::Left));
        assert!(!Handedness::Left.same_side_as(Handedness::Right));
        assert!(!Handedness::Switch.same_side_as(Handedness::Right));
        assert!(!Handedness::Switch.same_side_as(Handedness::Left));
    }

    #[test]
    fn sanitize_clamps_ratings() {
        let mut attrs = Attributes {
            speed: 1.4,
            power: -0.2,
            discipline: f64::NAN,
            ..Attributes::default()
        };
        attrs.sanitize();
        assert!((attrs.speed - 1.0).abs() < f64::EPSILON);
        assert!(attrs.power.abs() < f64::EPSILON);
        assert!(attrs.discipline.abs() < f64::EPSILON);
        assert!((attrs.arm - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn ratings_survive_a_json_round_trip_bit_for_bit() {
        let attrs = Attributes {
            speed: 0.470_999_915_936_128_44,
            ..Attributes::default()
        };
        let json = serde_json::to_string(&attrs).unwrap();
        let back: Attributes = serde_json::from_str(&json).unwrap();
        assert_eq!(back.speed.to_bits(), attrs.speed.to_bits());
    }

    #[test]
    fn player_json_uses_short_position_and_snake_case_sides() {
        let player = Player {
            id: PlayerId::new(" p1 "),
            name: "Ace".to_string(),
            bats: Handedness::Right,
            throws: Handedness::Left,
            attributes: Attributes::default(),
            archetypes: Archetypes::default(),
            card: OutcomeCard::uniform(OutcomeCode::StrikeoutSwinging),
            pitching: Some(PitchingProfile {
                grade: 45,
                stamina: 6.0,
                role: PitcherRole::Starter,
                platoon_value: 2,
                fresh: false,
            }),
        };
        assert_eq!(player.id.as_str(), "p1");
        assert_eq!(player.pitching_grade(), 30);
        let json = serde_json::to_value(&player).unwrap();
        assert_eq!(json["bats"], "right");
        assert_eq!(json["pitching"]["role"], "starter");
        assert_eq!(serde_json::to_value(Position::FirstBase).unwrap(), "1B");
    }
}
