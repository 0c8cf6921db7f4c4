//! Leagues: the rosters and manager profiles a season is played with.
//!
//! Real leagues arrive as JSON from the surrounding system. [`League::synthetic`]
//! builds a deterministic stand-in from a seed so tests and the batch harness
//! can run without external data.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::card::{OutcomeCard, OutcomeCode};
use crate::constants::CARD_SLOTS;
use crate::manager::ProfileId;
use crate::numbers::round_f64_to_i32;
use crate::player::{
    Archetypes, Attributes, Handedness, PitcherRole, PitchingProfile, Player, PlayerId, Position,
};
use crate::roster::{LineupSlot, RosterError, TeamId, TeamRoster};

const CITY_NAMES: [&str; 16] = [
    "Harbor", "Summit", "Prairie", "Granite", "Lakeside", "Redwood", "Ironton", "Bayview",
    "Foxhill", "Millbrook", "Northgate", "Cedar", "Riverton", "Copper", "Ashford", "Westfield",
];

const FIRST_NAMES: [&str; 20] = [
    "Abe", "Bo", "Cal", "Dex", "Eli", "Finn", "Gus", "Hank", "Ike", "Jed", "Kip", "Lou", "Mo",
    "Ned", "Oz", "Pete", "Rex", "Sal", "Ty", "Walt",
];

const LAST_NAMES: [&str; 20] = [
    "Alder", "Brock", "Crane", "Dunn", "Ellis", "Frye", "Grady", "Hale", "Irwin", "Judd", "Kemp",
    "Lyle", "Marsh", "Nash", "Orr", "Pruitt", "Quill", "Rourke", "Stroud", "Tate",
];

const FIELD_POSITIONS: [Position; 8] = [
    Position::CenterField,
    Position::Shortstop,
    Position::FirstBase,
    Position::RightField,
    Position::ThirdBase,
    Position::LeftField,
    Position::Catcher,
    Position::SecondBase,
];

const BENCH_SIZE: usize = 4;
const ROTATION_SIZE: usize = 5;
const BULLPEN_SIZE: usize = 6;

/// A team as the season runner sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSetup {
    pub roster: TeamRoster,
    pub profile: ProfileId,
}

/// All teams in a league, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct League {
    pub teams: BTreeMap<TeamId, TeamSetup>,
}

impl League {
    /// Deterministic league of `team_count` teams.
    #[must_use]
    pub fn synthetic(seed: u64, team_count: usize) -> Self {
        let teams = (0..team_count)
            .map(|index| {
                let roster = synthetic_roster(seed, index, index % 2 == 1);
                let profile = ProfileId::ALL[index % ProfileId::ALL.len()];
                (roster.id.clone(), TeamSetup { roster, profile })
            })
            .collect();
        Self { teams }
    }

    /// Parse a league from JSON and validate every roster.
    ///
    /// # Errors
    ///
    /// Returns an error when the JSON is malformed or a roster is invalid.
    pub fn from_json(raw: &str) -> Result<Self, LeagueError> {
        let league: Self =
            serde_json::from_str(raw).map_err(|err| LeagueError::Parse(err.to_string()))?;
        league.validate()?;
        Ok(league)
    }

    /// Validate every roster.
    ///
    /// # Errors
    ///
    /// Returns the first roster problem found.
    pub fn validate(&self) -> Result<(), RosterError> {
        self.teams
            .values()
            .try_for_each(|team| team.roster.validate())
    }

    #[must_use]
    pub fn team(&self, id: &TeamId) -> Option<&TeamSetup> {
        self.teams.get(id)
    }

    #[must_use]
    pub fn team_ids(&self) -> Vec<TeamId> {
        self.teams.keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.teams.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

/// Errors raised while loading a league.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LeagueError {
    #[error("league could not be parsed: {0}")]
    Parse(String),
    #[error(transparent)]
    Roster(#[from] RosterError),
}

fn team_rng(seed: u64, team_index: usize) -> ChaCha20Rng {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    rng.set_stream(u64::try_from(team_index).unwrap_or(u64::MAX));
    rng
}

fn rating(rng: &mut ChaCha20Rng) -> f64 {
    rng.gen_range(0.2..0.95)
}

fn handedness(rng: &mut ChaCha20Rng, allow_switch: bool) -> Handedness {
    let roll: f64 = rng.gen_range(0.0..1.0);
    if allow_switch && roll < 0.12 {
        Handedness::Switch
    } else if roll < 0.4 {
        Handedness::Left
    } else {
        Handedness::Right
    }
}

fn hitter_card(rng: &mut ChaCha20Rng, attrs: &Attributes, weak_bat: bool) -> OutcomeCard {
    let columns = std::array::from_fn(|column| {
        let column_offset = f64::from(u8::try_from(column).unwrap_or(0));
        build_column(rng, attrs, column_offset, weak_bat)
    });
    OutcomeCard::new(columns).unwrap_or_else(|_| OutcomeCard::uniform(OutcomeCode::GroundOut))
}

fn push_n(column: &mut Vec<OutcomeCode>, code: OutcomeCode, count: i32) {
    let count = usize::try_from(count.max(0)).unwrap_or(0);
    column.extend(std::iter::repeat_n(code, count));
}

fn build_column(
    rng: &mut ChaCha20Rng,
    attrs: &Attributes,
    column_offset: f64,
    weak_bat: bool,
) -> Vec<OutcomeCode> {
    let raw_on_base = if weak_bat {
        3.0 + column_offset * 1.5
    } else {
        6.0 + column_offset * 2.5 + attrs.contact * 4.0 + attrs.discipline * 2.0
    };
    let on_base = round_f64_to_i32(raw_on_base).clamp(2, 24);
    let on_base_f = f64::from(on_base);
    let walks = round_f64_to_i32(on_base_f * (0.18 + 0.15 * attrs.discipline));
    let hbp = i32::from(on_base >= 12);
    let hits = (on_base - walks - hbp).max(1);
    let homers = round_f64_to_i32(f64::from(hits) * (0.04 + 0.16 * attrs.power)).min(hits);
    let triples = i32::from(attrs.speed > 0.75 && hits - homers > 2);
    let doubles = round_f64_to_i32(f64::from(hits) * 0.2).min(hits - homers - triples);
    let singles = hits - homers - triples - doubles;
    let infield = i32::from(attrs.speed > 0.6 && singles > 1);
    let advance = (singles - infield) / 4;
    let gap = doubles / 3;

    let mut column = Vec::with_capacity(CARD_SLOTS);
    push_n(&mut column, OutcomeCode::Walk, walks);
    push_n(&mut column, OutcomeCode::HitByPitch, hbp);
    push_n(&mut column, OutcomeCode::HomeRun, homers);
    push_n(&mut column, OutcomeCode::Triple, triples);
    push_n(&mut column, OutcomeCode::DoubleGap, gap);
    push_n(&mut column, OutcomeCode::DoubleClean, doubles - gap);
    push_n(&mut column, OutcomeCode::SingleInfield, infield);
    push_n(&mut column, OutcomeCode::SingleAdvance, advance);
    push_n(&mut column, OutcomeCode::SingleClean, singles - infield - advance);
    column.truncate(CARD_SLOTS);

    let outs = i32::try_from(CARD_SLOTS - column.len()).unwrap_or(0);
    let outs_f = f64::from(outs);
    let strikeouts = round_f64_to_i32(outs_f * (0.32 - 0.14 * attrs.contact)).min(outs);
    let looking = strikeouts / 3;
    let mut remaining = outs - strikeouts;
    let mut take = |share: f64| {
        let count = round_f64_to_i32(outs_f * share).min(remaining);
        remaining -= count;
        count
    };
    let ground = take(0.28);
    let ground_advance = take(0.05);
    let double_play = take(0.05);
    let fly = take(0.14);
    let fly_deep = take(0.08);
    let line = take(0.08);
    push_n(&mut column, OutcomeCode::StrikeoutLooking, looking);
    push_n(&mut column, OutcomeCode::StrikeoutSwinging, strikeouts - looking);
    push_n(&mut column, OutcomeCode::GroundOut, ground);
    push_n(&mut column, OutcomeCode::GroundOutAdvance, ground_advance);
    push_n(&mut column, OutcomeCode::DoublePlay, double_play);
    push_n(&mut column, OutcomeCode::FlyOut, fly);
    push_n(&mut column, OutcomeCode::FlyOutDeep, fly_deep);
    push_n(&mut column, OutcomeCode::LineOut, line);
    column.resize(CARD_SLOTS, OutcomeCode::PopOut);
    column.shuffle(rng);
    column
}

fn archetypes_for(attrs: &Attributes) -> Archetypes {
    Archetypes {
        speed: attrs.speed > 0.75,
        power: attrs.power > 0.75,
        contact: attrs.contact > 0.75,
        defense: attrs.fielding > 0.75,
    }
}

struct PlayerFactory<'a> {
    rng: ChaCha20Rng,
    team: &'a TeamId,
    next_number: u32,
}

impl PlayerFactory<'_> {
    fn next_identity(&mut self) -> (PlayerId, String) {
        self.next_number += 1;
        let first = FIRST_NAMES[self.rng.gen_range(0..FIRST_NAMES.len())];
        let last = LAST_NAMES[self.rng.gen_range(0..LAST_NAMES.len())];
        (
            PlayerId(format!("{}-{:02}", self.team, self.next_number)),
            format!("{first} {last}"),
        )
    }

    fn hitter(&mut self) -> Player {
        let (id, name) = self.next_identity();
        let mut attributes = Attributes {
            speed: rating(&mut self.rng),
            power: rating(&mut self.rng),
            discipline: rating(&mut self.rng),
            contact: rating(&mut self.rng),
            fielding: rating(&mut self.rng),
            arm: rating(&mut self.rng),
        };
        attributes.sanitize();
        let bats = handedness(&mut self.rng, true);
        let throws = handedness(&mut self.rng, false);
        let card = hitter_card(&mut self.rng, &attributes, false);
        Player {
            id,
            name,
            bats,
            throws,
            archetypes: archetypes_for(&attributes),
            attributes,
            card,
            pitching: None,
        }
    }

    fn pitcher(&mut self, role: PitcherRole) -> Player {
        let (id, name) = self.next_identity();
        let attributes = Attributes {
            speed: self.rng.gen_range(0.1..0.5),
            power: self.rng.gen_range(0.0..0.3),
            discipline: self.rng.gen_range(0.0..0.3),
            contact: self.rng.gen_range(0.0..0.3),
            fielding: rating(&mut self.rng),
            arm: rating(&mut self.rng),
        };
        let throws = handedness(&mut self.rng, false);
        let profile = match role {
            PitcherRole::Starter => PitchingProfile {
                grade: self.rng.gen_range(8..=22),
                stamina: self.rng.gen_range(5.5..7.5),
                role,
                platoon_value: self.rng.gen_range(0..=3),
                fresh: false,
            },
            PitcherRole::Reliever => PitchingProfile {
                grade: self.rng.gen_range(6..=18),
                stamina: self.rng.gen_range(1.0..2.5),
                role,
                platoon_value: self.rng.gen_range(0..=4),
                fresh: self.rng.gen_bool(0.25),
            },
            PitcherRole::Closer => PitchingProfile {
                grade: self.rng.gen_range(15..=24),
                stamina: 1.0,
                role,
                platoon_value: self.rng.gen_range(1..=4),
                fresh: true,
            },
        };
        let card = hitter_card(&mut self.rng, &attributes, true);
        Player {
            id,
            name,
            bats: throws,
            throws,
            archetypes: Archetypes::default(),
            attributes,
            card,
            pitching: Some(profile),
        }
    }
}

/// Deterministic 25-man roster for the `team_index`-th team of a league.
/// When `pitcher_bats` is set the lineup has no designated hitter and the
/// pitcher bats ninth.
#[must_use]
pub fn synthetic_roster(seed: u64, team_index: usize, pitcher_bats: bool) -> TeamRoster {
    let id = TeamId(format!("T{:02}", team_index + 1));
    let city = CITY_NAMES[team_index % CITY_NAMES.len()];
    let mut factory = PlayerFactory {
        rng: team_rng(seed, team_index),
        team: &id,
        next_number: 0,
    };

    let mut players = BTreeMap::new();
    let mut lineup = Vec::with_capacity(9);
    for position in FIELD_POSITIONS {
        let player = factory.hitter();
        lineup.push(LineupSlot {
            player: player.id.clone(),
            position,
        });
        players.insert(player.id.clone(), player);
    }
    let designated = factory.hitter();
    let mut bench = Vec::with_capacity(BENCH_SIZE + 1);
    for _ in 0..BENCH_SIZE {
        let player = factory.hitter();
        bench.push(player.id.clone());
        players.insert(player.id.clone(), player);
    }

    let mut rotation = Vec::with_capacity(ROTATION_SIZE);
    for _ in 0..ROTATION_SIZE {
        let player = factory.pitcher(PitcherRole::Starter);
        rotation.push(player.id.clone());
        players.insert(player.id.clone(), player);
    }
    let mut bullpen = Vec::with_capacity(BULLPEN_SIZE);
    for _ in 0..BULLPEN_SIZE {
        let player = factory.pitcher(PitcherRole::Reliever);
        bullpen.push(player.id.clone());
        players.insert(player.id.clone(), player);
    }
    let closer = factory.pitcher(PitcherRole::Closer);
    let closer_id = closer.id.clone();
    players.insert(closer_id.clone(), closer);

    if pitcher_bats {
        lineup.push(LineupSlot {
            player: rotation[0].clone(),
            position: Position::Pitcher,
        });
        bench.push(designated.id.clone());
    } else {
        lineup.insert(
            3,
            LineupSlot {
                player: designated.id.clone(),
                position: Position::DesignatedHitter,
            },
        );
    }
    players.insert(designated.id.clone(), designated);

    TeamRoster {
        name: format!("{city} Pennants"),
        id,
        players,
        lineup,
        bench,
        rotation,
        bullpen,
        closer: Some(closer_id),
    }
}
