//! Outcome cards: five pitcher-quality columns of 36 equiprobable results.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    CARD_COLUMNS, CARD_SLOTS, COLUMN_A_MIN_GRADE, COLUMN_B_MIN_GRADE, COLUMN_C_MIN_GRADE,
    COLUMN_D_MIN_GRADE,
};

/// Categorical result of a plate appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeCode {
    SingleClean,
    SingleAdvance,
    SingleInfield,
    DoubleClean,
    DoubleGap,
    Triple,
    HomeRun,
    Walk,
    HitByPitch,
    StrikeoutSwinging,
    StrikeoutLooking,
    GroundOut,
    GroundOutAdvance,
    DoublePlay,
    FlyOut,
    FlyOutDeep,
    LineOut,
    PopOut,
    ReachedOnError,
}

impl OutcomeCode {
    pub const ALL: [Self; 19] = [
        Self::SingleClean,
        Self::SingleAdvance,
        Self::SingleInfield,
        Self::DoubleClean,
        Self::DoubleGap,
        Self::Triple,
        Self::HomeRun,
        Self::Walk,
        Self::HitByPitch,
        Self::StrikeoutSwinging,
        Self::StrikeoutLooking,
        Self::GroundOut,
        Self::GroundOutAdvance,
        Self::DoublePlay,
        Self::FlyOut,
        Self::FlyOutDeep,
        Self::LineOut,
        Self::PopOut,
        Self::ReachedOnError,
    ];

    /// Terse scorebook tag.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::SingleClean => "1B",
            Self::SingleAdvance => "1B+",
            Self::SingleInfield => "IF1B",
            Self::DoubleClean => "2B",
            Self::DoubleGap => "2B+",
            Self::Triple => "3B",
            Self::HomeRun => "HR",
            Self::Walk => "BB",
            Self::HitByPitch => "HBP",
            Self::StrikeoutSwinging => "K",
            Self::StrikeoutLooking => "KL",
            Self::GroundOut => "GO",
            Self::GroundOutAdvance => "GO+",
            Self::DoublePlay => "DP",
            Self::FlyOut => "FO",
            Self::FlyOutDeep => "FO+",
            Self::LineOut => "LO",
            Self::PopOut => "PO",
            Self::ReachedOnError => "E",
        }
    }

    /// Bases the batter takes on a hit; 0 for everything else.
    #[must_use]
    pub const fn hit_bases(self) -> u8 {
        match self {
            Self::SingleClean | Self::SingleAdvance | Self::SingleInfield => 1,
            Self::DoubleClean | Self::DoubleGap => 2,
            Self::Triple => 3,
            Self::HomeRun => 4,
            _ => 0,
        }
    }

    #[must_use]
    pub const fn is_hit(self) -> bool {
        self.hit_bases() > 0
    }

    #[must_use]
    pub const fn is_single(self) -> bool {
        self.hit_bases() == 1
    }

    #[must_use]
    pub const fn is_extra_base_hit(self) -> bool {
        self.hit_bases() > 1
    }

    #[must_use]
    pub const fn is_free_pass(self) -> bool {
        matches!(self, Self::Walk | Self::HitByPitch)
    }

    #[must_use]
    pub const fn is_strikeout(self) -> bool {
        matches!(self, Self::StrikeoutSwinging | Self::StrikeoutLooking)
    }

    /// Outs recorded by a fielder on a batted ball.
    #[must_use]
    pub const fn is_ball_in_play_out(self) -> bool {
        matches!(
            self,
            Self::GroundOut
                | Self::GroundOutAdvance
                | Self::DoublePlay
                | Self::FlyOut
                | Self::FlyOutDeep
                | Self::LineOut
                | Self::PopOut
        )
    }

    #[must_use]
    pub const fn is_ground_ball(self) -> bool {
        matches!(
            self,
            Self::GroundOut | Self::GroundOutAdvance | Self::DoublePlay
        )
    }

    /// Whether the batter reaches base safely.
    #[must_use]
    pub const fn reaches_base(self) -> bool {
        self.is_hit() || self.is_free_pass() || matches!(self, Self::ReachedOnError)
    }
}

/// Card column selected by the pitcher's effective grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Column {
    A,
    B,
    C,
    D,
    E,
}

impl Column {
    pub const ALL: [Self; CARD_COLUMNS] = [Self::A, Self::B, Self::C, Self::D, Self::E];

    /// Column for an effective grade: 19+ A, 13+ B, 7+ C, 4+ D, else E.
    #[must_use]
    pub const fn for_grade(grade: i32) -> Self {
        if grade >= COLUMN_A_MIN_GRADE {
            Self::A
        } else if grade >= COLUMN_B_MIN_GRADE {
            Self::B
        } else if grade >= COLUMN_C_MIN_GRADE {
            Self::C
        } else if grade >= COLUMN_D_MIN_GRADE {
            Self::D
        } else {
            Self::E
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
            Self::D => 3,
            Self::E => 4,
        }
    }

    #[must_use]
    pub const fn label(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
            Self::E => 'E',
        }
    }
}

/// Errors raised while building a card.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CardError {
    #[error("column {column} must hold {expected} slots (got {actual})")]
    ColumnLength {
        column: char,
        expected: usize,
        actual: usize,
    },
}

/// Slot counts for one column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub on_base: u8,
    pub hits: u8,
    pub extra_base_hits: u8,
    pub strikeouts: u8,
}

impl ColumnSummary {
    fn from_slots(slots: &[OutcomeCode]) -> Self {
        let mut summary = Self::default();
        for code in slots {
            if code.reaches_base() {
                summary.on_base += 1;
            }
            if code.is_hit() {
                summary.hits += 1;
            }
            if code.is_extra_base_hit() {
                summary.extra_base_hits += 1;
            }
            if code.is_strikeout() {
                summary.strikeouts += 1;
            }
        }
        summary
    }

    /// On-base slots as a fraction of the column.
    #[must_use]
    pub fn on_base_rate(&self) -> f64 {
        f64::from(self.on_base) / 36.0
    }
}

/// Per-column summary of a card, computed once per card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSummary {
    pub columns: [ColumnSummary; CARD_COLUMNS],
}

impl CardSummary {
    #[must_use]
    pub const fn column(&self, column: Column) -> &ColumnSummary {
        &self.columns[column.index()]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawCard {
    a: Vec<OutcomeCode>,
    b: Vec<OutcomeCode>,
    c: Vec<OutcomeCode>,
    d: Vec<OutcomeCode>,
    e: Vec<OutcomeCode>,
}

/// Immutable outcome card.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawCard", into = "RawCard")]
pub struct OutcomeCard {
    columns: [Vec<OutcomeCode>; CARD_COLUMNS],
    summary: OnceLock<CardSummary>,
}

impl OutcomeCard {
    /// Build a card from five columns.
    ///
    /// # Errors
    ///
    /// Returns `CardError::ColumnLength` when a column does not hold exactly
    /// 36 slots.
    pub fn new(columns: [Vec<OutcomeCode>; CARD_COLUMNS]) -> Result<Self, CardError> {
        for (column, slots) in Column::ALL.iter().zip(columns.iter()) {
            if slots.len() != CARD_SLOTS {
                return Err(CardError::ColumnLength {
                    column: column.label(),
                    expected: CARD_SLOTS,
                    actual: slots.len(),
                });
            }
        }
        Ok(Self {
            columns,
            summary: OnceLock::new(),
        })
    }

    /// Build a card from `(code, count)` runs per column, expanded in order.
    ///
    /// # Errors
    ///
    /// Returns `CardError::ColumnLength` when a column's counts do not sum to 36.
    pub fn from_counts(counts: [&[(OutcomeCode, usize)]; CARD_COLUMNS]) -> Result<Self, CardError> {
        let columns = counts.map(|runs| {
            runs.iter()
                .flat_map(|(code, count)| std::iter::repeat_n(*code, *count))
                .collect::<Vec<_>>()
        });
        Self::new(columns)
    }

    /// A card whose every slot is `code`.
    #[must_use]
    pub fn uniform(code: OutcomeCode) -> Self {
        Self {
            columns: std::array::from_fn(|_| vec![code; CARD_SLOTS]),
            summary: OnceLock::new(),
        }
    }

    /// Outcome at `slot` of `column`.
    #[must_use]
    pub fn outcome(&self, column: Column, slot: usize) -> OutcomeCode {
        self.columns[column.index()]
            .get(slot % CARD_SLOTS)
            .copied()
            .unwrap_or(OutcomeCode::GroundOut)
    }

    #[must_use]
    pub fn column(&self, column: Column) -> &[OutcomeCode] {
        &self.columns[column.index()]
    }

    /// Lazily computed slot counts for every column.
    pub fn summary(&self) -> &CardSummary {
        self.summary.get_or_init(|| CardSummary {
            columns: std::array::from_fn(|index| ColumnSummary::from_slots(&self.columns[index])),
        })
    }
}

impl PartialEq for OutcomeCard {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns
    }
}

impl Eq for OutcomeCard {}

impl TryFrom<RawCard> for OutcomeCard {
    type Error = CardError;

    fn try_from(raw: RawCard) -> Result<Self, Self::Error> {
        Self::new([raw.a, raw.b, raw.c, raw.d, raw.e])
    }
}

impl From<OutcomeCard> for RawCard {
    fn from(card: OutcomeCard) -> Self {
        let [a, b, c, d, e] = card.columns;
        Self { a, b, c, d, e }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_card() -> OutcomeCard {
        let strong: &[(OutcomeCode, usize)] = &[
            (OutcomeCode::StrikeoutSwinging, 12),
            (OutcomeCode::GroundOut, 12),
            (OutcomeCode::FlyOut, 8),
            (OutcomeCode::SingleClean, 3),
            (OutcomeCode::Walk, 1),
        ];
        let weak: &[(OutcomeCode, usize)] = &[
            (OutcomeCode::HomeRun, 4),
            (OutcomeCode::DoubleGap, 6),
            (OutcomeCode::SingleClean, 10),
            (OutcomeCode::Walk, 4),
            (OutcomeCode::GroundOut, 12),
        ];
        OutcomeCard::from_counts([strong, strong, weak, weak, weak]).unwrap()
    }

    #[test]
    fn column_thresholds() {
        assert_eq!(Column::for_grade(30), Column::A);
        assert_eq!(Column::for_grade(19), Column::A);
        assert_eq!(Column::for_grade(18), Column::B);
        assert_eq!(Column::for_grade(13), Column::B);
        assert_eq!(Column::for_grade(12), Column::C);
        assert_eq!(Column::for_grade(7), Column::C);
        assert_eq!(Column::for_grade(6), Column::D);
        assert_eq!(Column::for_grade(4), Column::D);
        assert_eq!(Column::for_grade(3), Column::E);
        assert_eq!(Column::for_grade(1), Column::E);
    }

    #[test]
    fn short_column_is_rejected() {
        let mut columns: [Vec<OutcomeCode>; 5] =
            std::array::from_fn(|_| vec![OutcomeCode::FlyOut; 36]);
        columns[3].pop();
        assert_eq!(
            OutcomeCard::new(columns).unwrap_err(),
            CardError::ColumnLength {
                column: 'D',
                expected: 36,
                actual: 35
            }
        );
    }

    #[test]
    fn lookup_reads_column_and_slot() {
        let card = sample_card();
        assert_eq!(card.outcome(Column::A, 0), OutcomeCode::StrikeoutSwinging);
        assert_eq!(card.outcome(Column::A, 35), OutcomeCode::Walk);
        assert_eq!(card.outcome(Column::E, 0), OutcomeCode::HomeRun);
    }

    #[test]
    fn summary_counts_slots_per_column() {
        let card = sample_card();
        let a = card.summary().column(Column::A);
        assert_eq!(a.strikeouts, 12);
        assert_eq!(a.hits, 3);
        assert_eq!(a.on_base, 4);
        let e = card.summary().column(Column::E);
        assert_eq!(e.extra_base_hits, 10);
        assert_eq!(e.on_base, 24);
        assert!(std::ptr::eq(card.summary(), card.summary()));
    }

    #[test]
    fn cloned_cards_keep_independent_summaries() {
        let card = sample_card();
        let clone = card.clone();
        assert!(!std::ptr::eq(card.summary(), clone.summary()));
        assert_eq!(card.summary(), clone.summary());
        assert_eq!(card, clone);
    }

    #[test]
    fn serde_rejects_malformed_columns() {
        let card = sample_card();
        let json = serde_json::to_string(&card).unwrap();
        assert!(json.contains("\"STRIKEOUT_SWINGING\""));
        let back: OutcomeCard = serde_json::from_str(&json).unwrap();
        assert_eq!(back, card);
        let broken = r#"{"a":["WALK"],"b":[],"c":[],"d":[],"e":[]}"#;
        assert!(serde_json::from_str::<OutcomeCard>(broken).is_err());
    }

    #[test]
    fn outcome_classification() {
        assert!(OutcomeCode::HomeRun.is_extra_base_hit());
        assert!(OutcomeCode::SingleInfield.is_single());
        assert!(OutcomeCode::HitByPitch.reaches_base());
        assert!(!OutcomeCode::HitByPitch.is_hit());
        assert!(OutcomeCode::DoublePlay.is_ground_ball());
        assert!(OutcomeCode::FlyOutDeep.is_ball_in_play_out());
        assert!(!OutcomeCode::StrikeoutLooking.is_ball_in_play_out());
        assert_eq!(OutcomeCode::ALL.len(), 19);
    }
}
