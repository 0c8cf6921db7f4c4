//! Per-player batting and pitching lines.

use std::collections::BTreeMap;
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::numbers::{format_innings, ratio};
use crate::player::PlayerId;

/// Batting counting stats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattingLine {
    pub ab: u32,
    pub r: u32,
    pub h: u32,
    pub doubles: u32,
    pub triples: u32,
    pub hr: u32,
    pub rbi: u32,
    pub bb: u32,
    pub k: u32,
    pub hbp: u32,
    pub sf: u32,
    pub sh: u32,
    pub sb: u32,
    pub cs: u32,
}

impl BattingLine {
    #[must_use]
    pub const fn plate_appearances(&self) -> u32 {
        self.ab + self.bb + self.hbp + self.sf + self.sh
    }

    #[must_use]
    pub fn average(&self) -> f64 {
        ratio(self.h, self.ab)
    }

    #[must_use]
    pub fn on_base_pct(&self) -> f64 {
        ratio(self.h + self.bb + self.hbp, self.ab + self.bb + self.hbp + self.sf)
    }

    #[must_use]
    pub const fn total_bases(&self) -> u32 {
        self.h + self.doubles + 2 * self.triples + 3 * self.hr
    }

    #[must_use]
    pub fn slugging(&self) -> f64 {
        ratio(self.total_bases(), self.ab)
    }
}

impl AddAssign<&Self> for BattingLine {
    fn add_assign(&mut self, other: &Self) {
        self.ab += other.ab;
        self.r += other.r;
        self.h += other.h;
        self.doubles += other.doubles;
        self.triples += other.triples;
        self.hr += other.hr;
        self.rbi += other.rbi;
        self.bb += other.bb;
        self.k += other.k;
        self.hbp += other.hbp;
        self.sf += other.sf;
        self.sh += other.sh;
        self.sb += other.sb;
        self.cs += other.cs;
    }
}

/// Pitcher of record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PitchingDecision {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "L")]
    Loss,
    #[serde(rename = "SV")]
    Save,
}

impl PitchingDecision {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Win => "W",
            Self::Loss => "L",
            Self::Save => "SV",
        }
    }
}

/// Pitching counting stats. Innings are tracked as outs recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchingLine {
    pub outs: u32,
    pub bf: u32,
    pub h: u32,
    pub r: u32,
    pub er: u32,
    pub bb: u32,
    pub k: u32,
    pub hr: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<PitchingDecision>,
}

impl PitchingLine {
    /// Innings pitched in `whole.partial` notation.
    #[must_use]
    pub fn innings(&self) -> String {
        format_innings(self.outs)
    }

    #[must_use]
    pub fn era(&self) -> f64 {
        ratio(self.er * 27, self.outs)
    }
}

/// Season-level pitching totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchingTotals {
    pub games: u32,
    pub starts: u32,
    pub outs: u32,
    pub bf: u32,
    pub h: u32,
    pub r: u32,
    pub er: u32,
    pub bb: u32,
    pub k: u32,
    pub hr: u32,
    pub wins: u32,
    pub losses: u32,
    pub saves: u32,
}

impl PitchingTotals {
    /// Fold one game line into the totals.
    pub fn add_game(&mut self, line: &PitchingLine, started: bool) {
        self.games += 1;
        if started {
            self.starts += 1;
        }
        self.outs += line.outs;
        self.bf += line.bf;
        self.h += line.h;
        self.r += line.r;
        self.er += line.er;
        self.bb += line.bb;
        self.k += line.k;
        self.hr += line.hr;
        match line.decision {
            Some(PitchingDecision::Win) => self.wins += 1,
            Some(PitchingDecision::Loss) => self.losses += 1,
            Some(PitchingDecision::Save) => self.saves += 1,
            None => {}
        }
    }

    #[must_use]
    pub fn era(&self) -> f64 {
        ratio(self.er * 27, self.outs)
    }
}

/// Batting entry in appearance order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattingEntry {
    pub player: PlayerId,
    pub line: BattingLine,
}

/// Pitching entry in appearance order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchingEntry {
    pub player: PlayerId,
    pub line: PitchingLine,
}

/// One team's lines for one game. Lines are created on first involvement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBook {
    pub batting: Vec<BattingEntry>,
    pub pitching: Vec<PitchingEntry>,
}

impl StatBook {
    pub fn batting_mut(&mut self, player: &PlayerId) -> &mut BattingLine {
        let index = match self.batting.iter().position(|entry| &entry.player == player) {
            Some(index) => index,
            None => {
                self.batting.push(BattingEntry {
                    player: player.clone(),
                    line: BattingLine::default(),
                });
                self.batting.len() - 1
            }
        };
        &mut self.batting[index].line
    }

    pub fn pitching_mut(&mut self, player: &PlayerId) -> &mut PitchingLine {
        let index = match self.pitching.iter().position(|entry| &entry.player == player) {
            Some(index) => index,
            None => {
                self.pitching.push(PitchingEntry {
                    player: player.clone(),
                    line: PitchingLine::default(),
                });
                self.pitching.len() - 1
            }
        };
        &mut self.pitching[index].line
    }

    #[must_use]
    pub fn batting_line(&self, player: &PlayerId) -> Option<&BattingLine> {
        self.batting
            .iter()
            .find(|entry| &entry.player == player)
            .map(|entry| &entry.line)
    }

    #[must_use]
    pub fn pitching_line(&self, player: &PlayerId) -> Option<&PitchingLine> {
        self.pitching
            .iter()
            .find(|entry| &entry.player == player)
            .map(|entry| &entry.line)
    }

    #[must_use]
    pub fn team_batting(&self) -> BattingLine {
        let mut total = BattingLine::default();
        for entry in &self.batting {
            total += &entry.line;
        }
        total
    }
}

/// Season totals keyed by player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonStats {
    pub batting: BTreeMap<PlayerId, BattingLine>,
    pub pitching: BTreeMap<PlayerId, PitchingTotals>,
}

impl SeasonStats {
    /// Merge one team's game book into the totals.
    pub fn absorb(&mut self, book: &StatBook) {
        for entry in &book.batting {
            *self.batting.entry(entry.player.clone()).or_default() += &entry.line;
        }
        for (index, entry) in book.pitching.iter().enumerate() {
            self.pitching
                .entry(entry.player.clone())
                .or_default()
                .add_game(&entry.line, index == 0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_created_lazily_in_appearance_order() {
        let mut book = StatBook::default();
        assert!(book.batting_line(&PlayerId::new("a")).is_none());
        book.batting_mut(&PlayerId::new("b")).h += 1;
        book.batting_mut(&PlayerId::new("a")).ab += 1;
        book.batting_mut(&PlayerId::new("b")).ab += 1;
        assert_eq!(book.batting.len(), 2);
        assert_eq!(book.batting[0].player, PlayerId::new("b"));
        assert_eq!(book.team_batting().ab, 2);
        assert_eq!(book.team_batting().h, 1);
    }

    #[test]
    fn rate_stats_guard_empty_lines() {
        let line = BattingLine::default();
        assert!(line.average().abs() < f64::EPSILON);
        let line = BattingLine {
            ab: 4,
            h: 2,
            doubles: 1,
            hr: 1,
            bb: 1,
            ..BattingLine::default()
        };
        assert!((line.average() - 0.5).abs() < 1e-9);
        assert_eq!(line.total_bases(), 6);
        assert!((line.on_base_pct() - 0.6).abs() < 1e-9);
        assert_eq!(line.plate_appearances(), 5);
    }

    #[test]
    fn innings_and_era() {
        let line = PitchingLine {
            outs: 20,
            er: 3,
            ..PitchingLine::default()
        };
        assert_eq!(line.innings(), "6.2");
        assert!((line.era() - 81.0 / 20.0).abs() < 1e-9);
    }

    #[test]
    fn season_stats_merge_games() {
        let mut season = SeasonStats::default();
        let mut book = StatBook::default();
        book.batting_mut(&PlayerId::new("h")).h = 2;
        book.pitching_mut(&PlayerId::new("s")).decision = Some(PitchingDecision::Win);
        book.pitching_mut(&PlayerId::new("r")).decision = Some(PitchingDecision::Save);
        season.absorb(&book);
        season.absorb(&book);
        assert_eq!(season.batting[&PlayerId::new("h")].h, 4);
        let starter = season.pitching[&PlayerId::new("s")];
        assert_eq!((starter.games, starter.starts, starter.wins), (2, 2, 2));
        let closer = season.pitching[&PlayerId::new("r")];
        assert_eq!((closer.starts, closer.saves), (0, 2));
    }

    #[test]
    fn decision_codes_serialize_short() {
        assert_eq!(
            serde_json::to_value(PitchingDecision::Save).unwrap(),
            "SV"
        );
        assert_eq!(PitchingDecision::Loss.code(), "L");
    }
}
