//! Structural constants for the simulation core.
//!
//! Tunable balance numbers live in [`crate::config::SimConfig`]; the values
//! here describe the shape of the game itself and never change per league.

// Cards -------------------------------------------------------------------
pub const CARD_SLOTS: usize = 36;
pub const CARD_COLUMNS: usize = 5;

// Grades ------------------------------------------------------------------
pub const GRADE_MIN: i32 = 1;
pub const GRADE_MAX: i32 = 30;
pub const COLUMN_A_MIN_GRADE: i32 = 19;
pub const COLUMN_B_MIN_GRADE: i32 = 13;
pub const COLUMN_C_MIN_GRADE: i32 = 7;
pub const COLUMN_D_MIN_GRADE: i32 = 4;

// Field -------------------------------------------------------------------
pub const LINEUP_SIZE: usize = 9;
pub const OUTS_PER_HALF: u8 = 3;
pub const OUTS_PER_INNING: u32 = 3;

// Manager gates -----------------------------------------------------------
pub const LATE_INNING_START: u32 = 7;
pub const STEAL_MAX_SCORE_DIFF: i32 = 4;
pub const SAVE_SITUATION_MAX_LEAD: i32 = 3;
pub const PINCH_HIT_MIN_INNING: u32 = 7;
pub const PINCH_HIT_MAX_DEFICIT: i32 = 3;
pub const CLOSE_GAME_MAX_DIFF: i32 = 2;

// Decisions ---------------------------------------------------------------
pub const STARTER_WIN_MIN_OUTS: u32 = 15;
pub const SAVE_MIN_OUTS: u32 = 3;
pub const SAVE_MAX_MARGIN: u32 = 3;

// Logging targets ---------------------------------------------------------
pub(crate) const LOG_TARGET_GAME: &str = "pennant::game";
pub(crate) const LOG_TARGET_SEASON: &str = "pennant::season";
