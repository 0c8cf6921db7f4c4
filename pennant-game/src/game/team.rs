//! One side's in-game state: batting order, pitcher of record, remaining
//! substitutes and the stat book.

use crate::constants::GRADE_MIN;
use crate::grade::PitcherGameState;
use crate::manager::{ManagerProfile, ProfileId};
use crate::numbers::count_to_f64;
use crate::player::{PitcherRole, PitchingProfile, Player, PlayerId, Position};
use crate::roster::{LineupSlot, TeamRoster};
use crate::stats::StatBook;

use super::GameError;

/// Stand-in ratings for a position player forced onto the mound. Zero stamina
/// makes the next pitcher check replace the stand-in as soon as anyone is available.
const EMERGENCY_PITCHING: PitchingProfile = PitchingProfile {
    grade: GRADE_MIN,
    stamina: 0.0,
    role: PitcherRole::Reliever,
    platoon_value: 0,
    fresh: false,
};

const NEUTRAL_RATING: f64 = 0.5;

/// Batting quality used to rank pinch hitters.
#[must_use]
pub fn bat_quality(player: &Player) -> f64 {
    let attrs = &player.attributes;
    (attrs.contact + attrs.power + attrs.discipline) / 3.0
}

/// How dangerous a hitter looks to the opposing manager.
#[must_use]
pub fn batter_threat(player: &Player) -> f64 {
    (player.attributes.power + player.attributes.contact) / 2.0
}

#[derive(Debug, Clone)]
pub struct TeamGameState<'a> {
    roster: &'a TeamRoster,
    pub profile: &'static ManagerProfile,
    pub lineup: Vec<LineupSlot>,
    pub batter_index: usize,
    pub pitcher: PitcherGameState,
    pub pitchers_used: Vec<PlayerId>,
    pub bullpen: Vec<PlayerId>,
    pub closer: Option<PlayerId>,
    pub bench: Vec<PlayerId>,
    /// Set when a pinch hitter batted in the pitcher's spot; the pitcher must
    /// be replaced before the team fields again.
    pub pinch_hit_for_pitcher: bool,
    pub book: StatBook,
}

impl<'a> TeamGameState<'a> {
    /// Prepare a side with `starter` on the mound.
    ///
    /// # Errors
    ///
    /// Returns `GameError::UnknownStarter` or `GameError::StarterNotAPitcher`
    /// when `starter` cannot take the ball.
    pub fn new(
        roster: &'a TeamRoster,
        profile: ProfileId,
        starter: &PlayerId,
    ) -> Result<Self, GameError> {
        let Some(player) = roster.player(starter) else {
            return Err(GameError::UnknownStarter {
                team: roster.id.clone(),
                player: starter.clone(),
            });
        };
        if !player.is_pitcher() {
            return Err(GameError::StarterNotAPitcher {
                team: roster.id.clone(),
                player: starter.clone(),
            });
        }

        let mut lineup = roster.lineup.clone();
        if let Some(slot) = roster.pitcher_slot() {
            lineup[slot].player = starter.clone();
        }
        let available = |id: &&PlayerId| *id != starter;
        let mut book = StatBook::default();
        book.pitching_mut(starter);

        Ok(Self {
            roster,
            profile: profile.profile(),
            lineup,
            batter_index: 0,
            pitcher: PitcherGameState::starter(starter.clone()),
            pitchers_used: vec![starter.clone()],
            bullpen: roster.bullpen.iter().filter(available).cloned().collect(),
            closer: roster.closer.as_ref().filter(available).cloned(),
            bench: roster.bench.iter().filter(available).cloned().collect(),
            pinch_hit_for_pitcher: false,
            book,
        })
    }

    #[must_use]
    pub const fn roster(&self) -> &'a TeamRoster {
        self.roster
    }

    #[must_use]
    pub fn player(&self, id: &PlayerId) -> Option<&'a Player> {
        self.roster.player(id)
    }

    #[must_use]
    pub fn current_slot(&self) -> &LineupSlot {
        &self.lineup[self.batter_index % self.lineup.len()]
    }

    pub fn advance_batter(&mut self) {
        self.batter_index = (self.batter_index + 1) % self.lineup.len();
    }

    #[must_use]
    pub fn pitcher_player(&self) -> Option<&'a Player> {
        self.player(&self.pitcher.pitcher)
    }

    /// Ratings of the pitcher on the mound.
    #[must_use]
    pub fn pitching_profile(&self) -> PitchingProfile {
        self.pitcher_player()
            .and_then(|player| player.pitching)
            .unwrap_or(EMERGENCY_PITCHING)
    }

    fn fielder_rating(&self, position: Position, rating: impl Fn(&Player) -> f64) -> Option<f64> {
        self.lineup
            .iter()
            .find(|slot| slot.position == position)
            .and_then(|slot| self.player(&slot.player))
            .map(rating)
    }

    /// Arm of the catcher on the field, neutral when unknown.
    #[must_use]
    pub fn catcher_arm(&self) -> f64 {
        self.fielder_rating(Position::Catcher, |player| player.attributes.arm)
            .unwrap_or(NEUTRAL_RATING)
    }

    /// Mean arm of the three outfielders.
    #[must_use]
    pub fn outfield_arm(&self) -> f64 {
        let arms: Vec<f64> = self
            .lineup
            .iter()
            .filter(|slot| slot.position.is_outfield())
            .filter_map(|slot| self.player(&slot.player))
            .map(|player| player.attributes.arm)
            .collect();
        if arms.is_empty() {
            return NEUTRAL_RATING;
        }
        arms.iter().sum::<f64>() / count_to_f64(arms.len())
    }

    /// Mean fielding of the eight position players plus the pitcher.
    #[must_use]
    pub fn team_fielding(&self) -> f64 {
        let ratings: Vec<f64> = self
            .lineup
            .iter()
            .filter(|slot| {
                !matches!(
                    slot.position,
                    Position::DesignatedHitter | Position::Pitcher
                )
            })
            .filter_map(|slot| self.player(&slot.player))
            .chain(self.pitcher_player())
            .map(|player| player.attributes.fielding)
            .collect();
        if ratings.is_empty() {
            return NEUTRAL_RATING;
        }
        ratings.iter().sum::<f64>() / count_to_f64(ratings.len())
    }

    #[must_use]
    pub const fn has_replacement(&self) -> bool {
        !self.bullpen.is_empty() || self.closer.is_some()
    }

    /// Take the next pitcher out of the bullpen. The closer is used when
    /// `want_closer` is set or the rest of the bullpen is spent; otherwise the
    /// highest-graded reliever comes in.
    pub fn choose_reliever(&mut self, want_closer: bool) -> Option<PlayerId> {
        if want_closer && self.closer.is_some() {
            return self.closer.take();
        }
        let best = self
            .bullpen
            .iter()
            .enumerate()
            .max_by_key(|(index, id)| {
                let grade = self.player(id).map_or(GRADE_MIN, Player::pitching_grade);
                (grade, std::cmp::Reverse(*index))
            })
            .map(|(index, _)| index);
        match best {
            Some(index) => Some(self.bullpen.remove(index)),
            None => self.closer.take(),
        }
    }

    /// Put `incoming` on the mound and return the pitcher leaving.
    pub fn bring_in(&mut self, incoming: PlayerId, inning: u32, margin: i32) -> PlayerId {
        if let Some(slot) = self
            .lineup
            .iter_mut()
            .find(|slot| slot.position == Position::Pitcher)
        {
            slot.player = incoming.clone();
        }
        self.book.pitching_mut(&incoming);
        self.pitchers_used.push(incoming.clone());
        self.pinch_hit_for_pitcher = false;
        let previous = std::mem::replace(
            &mut self.pitcher,
            PitcherGameState::reliever(incoming, inning, margin),
        );
        previous.pitcher
    }

    /// Best bench bat and how much better it is than `current`, when it is.
    #[must_use]
    pub fn pinch_hit_candidate(&self, current: &Player) -> Option<(usize, f64)> {
        let baseline = bat_quality(current);
        self.bench
            .iter()
            .enumerate()
            .filter_map(|(index, id)| self.player(id).map(|player| (index, bat_quality(player))))
            .max_by(|a, b| a.1.total_cmp(&b.1).then(b.0.cmp(&a.0)))
            .map(|(index, quality)| (index, quality - baseline))
            .filter(|(_, upgrade)| *upgrade > 0.0)
    }

    /// Send bench player `bench_index` up for the current batter. Returns
    /// `(replaced, incoming)`.
    pub fn pinch_hit(&mut self, bench_index: usize) -> Option<(PlayerId, PlayerId)> {
        if bench_index >= self.bench.len() {
            return None;
        }
        let incoming = self.bench.remove(bench_index);
        let slot_index = self.batter_index % self.lineup.len();
        let slot = &mut self.lineup[slot_index];
        if slot.position == Position::Pitcher {
            self.pinch_hit_for_pitcher = true;
        }
        let replaced = std::mem::replace(&mut slot.player, incoming.clone());
        Some((replaced, incoming))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::synthetic_roster;

    #[test]
    fn starter_fills_the_pitcher_slot_and_leaves_the_pool() {
        let roster = synthetic_roster(5, 1, true);
        let starter = roster.rotation[1].clone();
        let team = TeamGameState::new(&roster, ProfileId::Balanced, &starter).unwrap();
        let slot = roster.pitcher_slot().unwrap();
        assert_eq!(team.lineup[slot].player, starter);
        assert!(!team.bullpen.contains(&starter));
        assert_eq!(team.book.pitching[0].player, starter);
        assert!(team.pitcher.started_game);
    }

    #[test]
    fn rejects_unknown_or_position_player_starters() {
        let roster = synthetic_roster(5, 0, false);
        let err = TeamGameState::new(&roster, ProfileId::Balanced, &PlayerId::new("nobody"))
            .unwrap_err();
        assert!(matches!(err, GameError::UnknownStarter { .. }));
        let hitter = roster.lineup[0].player.clone();
        let err = TeamGameState::new(&roster, ProfileId::Balanced, &hitter).unwrap_err();
        assert!(matches!(err, GameError::StarterNotAPitcher { .. }));
    }

    #[test]
    fn relievers_come_out_best_first_and_closer_last() {
        let roster = synthetic_roster(9, 0, false);
        let starter = roster.rotation[0].clone();
        let mut team = TeamGameState::new(&roster, ProfileId::Balanced, &starter).unwrap();
        let mut previous_grade = i32::MAX;
        for _ in 0..roster.bullpen.len() {
            let next = team.choose_reliever(false).unwrap();
            let grade = roster.player(&next).unwrap().pitching_grade();
            assert!(grade <= previous_grade);
            previous_grade = grade;
        }
        assert_eq!(team.choose_reliever(false), roster.closer.clone());
        assert!(!team.has_replacement());
        assert_eq!(team.choose_reliever(true), None);
    }

    #[test]
    fn bring_in_swaps_state_and_clears_pinch_flag() {
        let roster = synthetic_roster(9, 1, true);
        let starter = roster.rotation[0].clone();
        let mut team = TeamGameState::new(&roster, ProfileId::Balanced, &starter).unwrap();
        team.pinch_hit_for_pitcher = true;
        let reliever = team.choose_reliever(true).unwrap();
        let outgoing = team.bring_in(reliever.clone(), 7, 2);
        assert_eq!(outgoing, starter);
        assert_eq!(team.pitcher.pitcher, reliever);
        assert!(!team.pitcher.started_game);
        assert_eq!(team.pitcher.margin_at_entry, 2);
        assert!(!team.pinch_hit_for_pitcher);
        assert_eq!(team.pitchers_used.len(), 2);
        assert_eq!(team.book.pitching.len(), 2);
        let slot = roster.pitcher_slot().unwrap();
        assert_eq!(team.lineup[slot].player, reliever);
    }

    #[test]
    fn pinch_hitting_for_the_pitcher_flags_a_change() {
        let roster = synthetic_roster(3, 1, true);
        let starter = roster.rotation[0].clone();
        let mut team = TeamGameState::new(&roster, ProfileId::Aggressive, &starter).unwrap();
        team.batter_index = roster.pitcher_slot().unwrap();
        let pitcher = roster.player(&starter).unwrap();
        let (index, upgrade) = team.pinch_hit_candidate(pitcher).unwrap();
        assert!(upgrade > 0.0);
        let bench_before = team.bench.len();
        let (replaced, incoming) = team.pinch_hit(index).unwrap();
        assert_eq!(replaced, starter);
        assert_eq!(team.current_slot().player, incoming);
        assert_eq!(team.bench.len(), bench_before - 1);
        assert!(team.pinch_hit_for_pitcher);
    }

    #[test]
    fn fielding_aggregates_stay_in_unit_range() {
        let roster = synthetic_roster(21, 2, false);
        let starter = roster.rotation[0].clone();
        let team = TeamGameState::new(&roster, ProfileId::Balanced, &starter).unwrap();
        for value in [team.catcher_arm(), team.outfield_arm(), team.team_fielding()] {
            assert!((0.0..=1.0).contains(&value));
        }
    }
}
