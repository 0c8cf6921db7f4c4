//! Balance configuration for the simulation core.
//!
//! Every number here is swappable data. Defaults reproduce the standard
//! league tables; a league may ship its own JSON and have it validated with
//! [`SimConfig::from_json`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{GRADE_MAX, GRADE_MIN};

/// Number of entries in the pitcher variance table.
pub const VARIANCE_TABLE_LEN: usize = 40;

const DEFAULT_VARIANCE: [i32; VARIANCE_TABLE_LEN] = [
    -4, -3, -3, -2, -2, -2, -1, -1, -1, -1, -1, -1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 1, 1, 1, 1, 1, 1, 2, 2, 2, 3, 3, 4,
];

/// Errors raised when configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum SimConfigError {
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("variance table must hold {expected} entries (got {actual})")]
    VarianceLength { expected: usize, actual: usize },
    #[error("variance table must be zero-centred (sum {sum})")]
    VarianceNotCentred { sum: i32 },
    #[error("bunt bands must leave room for the pop-out band (sum {total:.2})")]
    BuntBands { total: f64 },
    #[error("config could not be parsed: {0}")]
    Parse(String),
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), SimConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(SimConfigError::RangeViolation {
            field,
            min,
            max,
            value,
        })
    }
}

fn check_int(field: &'static str, value: i32, min: i32, max: i32) -> Result<(), SimConfigError> {
    check_range(field, f64::from(value), f64::from(min), f64::from(max))
}

/// Zero-centred signed grade adjustments; one entry is drawn per pitch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VarianceTable(Vec<i32>);

impl VarianceTable {
    /// Wrap a table, checking its length and centring.
    ///
    /// # Errors
    ///
    /// Returns `SimConfigError` when the table has the wrong length, an entry
    /// outside `-10..=10`, or a non-zero sum.
    pub fn new(entries: Vec<i32>) -> Result<Self, SimConfigError> {
        let table = Self(entries);
        table.validate()?;
        Ok(table)
    }

    #[must_use]
    pub fn entries(&self) -> &[i32] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entry at `index`, or 0 when out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> i32 {
        self.0.get(index).copied().unwrap_or(0)
    }

    fn validate(&self) -> Result<(), SimConfigError> {
        if self.0.len() != VARIANCE_TABLE_LEN {
            return Err(SimConfigError::VarianceLength {
                expected: VARIANCE_TABLE_LEN,
                actual: self.0.len(),
            });
        }
        for entry in &self.0 {
            check_int("grade.variance[]", *entry, -10, 10)?;
        }
        let sum: i32 = self.0.iter().sum();
        if sum != 0 {
            return Err(SimConfigError::VarianceNotCentred { sum });
        }
        Ok(())
    }
}

impl Default for VarianceTable {
    fn default() -> Self {
        Self(DEFAULT_VARIANCE.to_vec())
    }
}

/// Constants for the five pitcher grade layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeConfig {
    #[serde(default = "GradeConfig::default_starter_decay")]
    pub starter_decay: i32,
    #[serde(default = "GradeConfig::default_reliever_decay")]
    pub reliever_decay: i32,
    #[serde(default = "GradeConfig::default_relief_penalty")]
    pub relief_penalty: i32,
    #[serde(default = "GradeConfig::default_fresh_bonus")]
    pub fresh_bonus: i32,
    #[serde(default = "GradeConfig::default_fresh_cap")]
    pub fresh_cap: i32,
    #[serde(default = "GradeConfig::default_platoon_cap")]
    pub platoon_cap: i32,
    #[serde(default)]
    pub variance: VarianceTable,
}

impl GradeConfig {
    #[must_use]
    pub const fn default_starter_decay() -> i32 {
        2
    }

    #[must_use]
    pub const fn default_reliever_decay() -> i32 {
        3
    }

    #[must_use]
    pub const fn default_relief_penalty() -> i32 {
        2
    }

    #[must_use]
    pub const fn default_fresh_bonus() -> i32 {
        5
    }

    #[must_use]
    pub const fn default_fresh_cap() -> i32 {
        20
    }

    #[must_use]
    pub const fn default_platoon_cap() -> i32 {
        GRADE_MAX
    }

    fn validate(&self) -> Result<(), SimConfigError> {
        check_int("grade.starter_decay", self.starter_decay, 0, 10)?;
        check_int("grade.reliever_decay", self.reliever_decay, 0, 10)?;
        check_int("grade.relief_penalty", self.relief_penalty, 0, 10)?;
        check_int("grade.fresh_bonus", self.fresh_bonus, 0, 10)?;
        check_int("grade.fresh_cap", self.fresh_cap, GRADE_MIN, GRADE_MAX)?;
        check_int("grade.platoon_cap", self.platoon_cap, GRADE_MIN, GRADE_MAX)?;
        self.variance.validate()
    }
}

impl Default for GradeConfig {
    fn default() -> Self {
        Self {
            starter_decay: Self::default_starter_decay(),
            reliever_decay: Self::default_reliever_decay(),
            relief_penalty: Self::default_relief_penalty(),
            fresh_bonus: Self::default_fresh_bonus(),
            fresh_cap: Self::default_fresh_cap(),
            platoon_cap: Self::default_platoon_cap(),
            variance: VarianceTable::default(),
        }
    }
}

/// Probability bands for a bunt draw; the pop-out band takes the remainder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuntConfig {
    #[serde(default = "BuntConfig::default_sacrifice")]
    pub sacrifice: f64,
    #[serde(default = "BuntConfig::default_foul")]
    pub foul: f64,
    #[serde(default = "BuntConfig::default_bunt_for_hit")]
    pub bunt_for_hit: f64,
    #[serde(default = "BuntConfig::default_hit_speed_factor")]
    pub hit_speed_factor: f64,
}

impl BuntConfig {
    #[must_use]
    pub const fn default_sacrifice() -> f64 {
        0.55
    }

    #[must_use]
    pub const fn default_foul() -> f64 {
        0.15
    }

    #[must_use]
    pub const fn default_bunt_for_hit() -> f64 {
        0.15
    }

    #[must_use]
    pub const fn default_hit_speed_factor() -> f64 {
        0.6
    }

    fn validate(&self) -> Result<(), SimConfigError> {
        check_range("bunt.sacrifice", self.sacrifice, 0.0, 1.0)?;
        check_range("bunt.foul", self.foul, 0.0, 1.0)?;
        check_range("bunt.bunt_for_hit", self.bunt_for_hit, 0.0, 1.0)?;
        check_range("bunt.hit_speed_factor", self.hit_speed_factor, 0.0, 1.0)?;
        let total = self.sacrifice + self.foul + self.bunt_for_hit;
        if total > 1.0 {
            return Err(SimConfigError::BuntBands { total });
        }
        Ok(())
    }
}

impl Default for BuntConfig {
    fn default() -> Self {
        Self {
            sacrifice: Self::default_sacrifice(),
            foul: Self::default_foul(),
            bunt_for_hit: Self::default_bunt_for_hit(),
            hit_speed_factor: Self::default_hit_speed_factor(),
        }
    }
}

/// Coefficients for a runner-speed versus throwing-arm race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerRaceConfig {
    pub speed_factor: f64,
    pub archetype_bonus: f64,
    pub arm_factor: f64,
    pub min_probability: f64,
    pub max_probability: f64,
}

impl RunnerRaceConfig {
    /// Stolen-base attempt against the catcher.
    #[must_use]
    pub const fn steal() -> Self {
        Self {
            speed_factor: 0.75,
            archetype_bonus: 0.15,
            arm_factor: 0.20,
            min_probability: 0.0,
            max_probability: 1.0,
        }
    }

    /// Extra base on a hit against the outfield.
    #[must_use]
    pub const fn extra_base() -> Self {
        Self {
            speed_factor: 0.85,
            archetype_bonus: 0.10,
            arm_factor: 0.25,
            min_probability: 0.05,
            max_probability: 0.95,
        }
    }

    /// Success probability for a runner with `speed` against `arm`.
    #[must_use]
    pub fn probability(&self, speed: f64, speed_archetype: bool, arm: f64) -> f64 {
        let bonus = if speed_archetype {
            self.archetype_bonus
        } else {
            0.0
        };
        (speed * self.speed_factor + bonus - arm * self.arm_factor)
            .clamp(self.min_probability, self.max_probability)
    }

    fn validate(&self, prefix: &'static str) -> Result<(), SimConfigError> {
        check_range(prefix, self.speed_factor, 0.0, 2.0)?;
        check_range(prefix, self.archetype_bonus, 0.0, 1.0)?;
        check_range(prefix, self.arm_factor, 0.0, 2.0)?;
        check_range(prefix, self.min_probability, 0.0, 1.0)?;
        check_range(prefix, self.max_probability, self.min_probability, 1.0)
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub grade: GradeConfig,
    #[serde(default = "SimConfig::default_umpire_override_chance")]
    pub umpire_override_chance: f64,
    #[serde(default = "SimConfig::default_error_rate")]
    pub error_rate: f64,
    #[serde(default)]
    pub bunt: BuntConfig,
    #[serde(default = "RunnerRaceConfig::steal")]
    pub steal: RunnerRaceConfig,
    #[serde(default = "RunnerRaceConfig::extra_base")]
    pub extra_base: RunnerRaceConfig,
    #[serde(default = "SimConfig::default_protect_from_inning")]
    pub protect_from_inning: u32,
    #[serde(default = "SimConfig::default_exhaustion_innings")]
    pub exhaustion_innings: f64,
    #[serde(default = "SimConfig::default_regulation_innings")]
    pub regulation_innings: u32,
    #[serde(default = "SimConfig::default_max_plate_appearances")]
    pub max_plate_appearances: u32,
}

impl SimConfig {
    #[must_use]
    pub const fn default_umpire_override_chance() -> f64 {
        0.03
    }

    #[must_use]
    pub const fn default_error_rate() -> f64 {
        0.02
    }

    #[must_use]
    pub const fn default_protect_from_inning() -> u32 {
        6
    }

    /// Innings beyond stamina after which a pitcher must come out.
    #[must_use]
    pub const fn default_exhaustion_innings() -> f64 {
        3.0
    }

    #[must_use]
    pub const fn default_regulation_innings() -> u32 {
        9
    }

    #[must_use]
    pub const fn default_max_plate_appearances() -> u32 {
        600
    }

    /// Parse JSON and validate the result.
    ///
    /// # Errors
    ///
    /// Returns `SimConfigError::Parse` for malformed JSON and the matching
    /// validation error for out-of-range values.
    pub fn from_json(raw: &str) -> Result<Self, SimConfigError> {
        let cfg: Self =
            serde_json::from_str(raw).map_err(|err| SimConfigError::Parse(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns `SimConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), SimConfigError> {
        self.grade.validate()?;
        check_range(
            "umpire_override_chance",
            self.umpire_override_chance,
            0.0,
            0.5,
        )?;
        check_range("error_rate", self.error_rate, 0.0, 0.5)?;
        self.bunt.validate()?;
        self.steal.validate("steal")?;
        self.extra_base.validate("extra_base")?;
        check_range(
            "protect_from_inning",
            f64::from(self.protect_from_inning),
            1.0,
            99.0,
        )?;
        check_range("exhaustion_innings", self.exhaustion_innings, 0.0, 20.0)?;
        check_range(
            "regulation_innings",
            f64::from(self.regulation_innings),
            1.0,
            99.0,
        )?;
        check_range(
            "max_plate_appearances",
            f64::from(self.max_plate_appearances),
            1.0,
            10_000.0,
        )?;
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grade: GradeConfig::default(),
            umpire_override_chance: Self::default_umpire_override_chance(),
            error_rate: Self::default_error_rate(),
            bunt: BuntConfig::default(),
            steal: RunnerRaceConfig::steal(),
            extra_base: RunnerRaceConfig::extra_base(),
            protect_from_inning: Self::default_protect_from_inning(),
            exhaustion_innings: Self::default_exhaustion_innings(),
            regulation_innings: Self::default_regulation_innings(),
            max_plate_appearances: Self::default_max_plate_appearances(),
        }
    }
}
