//! Plate-appearance resolver: grade to column, one slot draw, umpire check.

use serde::{Deserialize, Serialize};

use crate::card::{Column, OutcomeCard, OutcomeCode};
use crate::constants::CARD_SLOTS;
use crate::rng::SeededRandom;

/// Raw card read for one plate appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRead {
    pub column: Column,
    pub slot: usize,
    pub outcome: CardOutcome,
}

/// Outcome after the umpire check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardOutcome {
    pub code: OutcomeCode,
    pub umpire_override: bool,
}

/// Read the batter's card at the column chosen by `effective_grade`.
pub fn resolve_card(
    card: &OutcomeCard,
    effective_grade: i32,
    rng: &mut SeededRandom,
) -> (Column, usize, OutcomeCode) {
    let column = Column::for_grade(effective_grade);
    let slot = rng.next_index(CARD_SLOTS);
    (column, slot, card.outcome(column, slot))
}

/// Borderline-call override. Only called strike three and routine grounders
/// are eligible; every other code passes through without a draw.
pub fn umpire_check(code: OutcomeCode, chance: f64, rng: &mut SeededRandom) -> CardOutcome {
    let overridden = match code {
        OutcomeCode::StrikeoutLooking => Some(OutcomeCode::Walk),
        OutcomeCode::GroundOut => Some(OutcomeCode::SingleInfield),
        _ => None,
    };
    match overridden {
        Some(replacement) if rng.chance(chance) => CardOutcome {
            code: replacement,
            umpire_override: true,
        },
        _ => CardOutcome {
            code,
            umpire_override: false,
        },
    }
}

/// Full resolution: card read followed by the umpire check.
pub fn resolve_plate_appearance(
    card: &OutcomeCard,
    effective_grade: i32,
    umpire_chance: f64,
    rng: &mut SeededRandom,
) -> CardRead {
    let (column, slot, code) = resolve_card(card, effective_grade, rng);
    CardRead {
        column,
        slot,
        outcome: umpire_check(code, umpire_chance, rng),
    }
}
