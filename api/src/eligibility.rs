//! Pick eligibility: which team in a match the user may still pick, and why not.
//!
//! The server owns the rules; this module only mirrors the flags it hands us
//! (eliminations, winner usage, loser usage, kickoff) so the UI can grey out
//! teams before the user tries them. Rules are evaluated in a fixed order and
//! the first one that applies is the reason surfaced to the user.

use crate::{Match, MatchId, Pick, Side, Team, TeamId, TeamUsage};
use std::collections::{BTreeMap, HashMap, HashSet};

/// A team may be picked as the winner at most this many times per season.
pub const MAX_WINNER_PICKS: u32 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ReasonCode {
    #[default]
    None,
    Eliminated,
    MaxWinsReached,
    AlreadyLostAsThisTeam,
    GameStarted,
}

impl ReasonCode {
    /// User-facing explanation, shown when a disabled team is chosen.
    pub fn explanation(&self) -> Option<&'static str> {
        match self {
            ReasonCode::None => None,
            ReasonCode::Eliminated => Some("This team has already been eliminated for you"),
            ReasonCode::MaxWinsReached => {
                Some("This team has already been picked as winner 2 times (maximum reached)")
            }
            ReasonCode::AlreadyLostAsThisTeam => Some(
                "The opposing team has already been picked to lose once and cannot be picked as loser again",
            ),
            ReasonCode::GameStarted => Some("This game has already started"),
        }
    }

    /// Short tag for compact match cards.
    pub fn tag(&self) -> &'static str {
        match self {
            ReasonCode::None => "",
            ReasonCode::Eliminated => "OUT",
            ReasonCode::MaxWinsReached => "2x",
            ReasonCode::AlreadyLostAsThisTeam => "L-USED",
            ReasonCode::GameStarted => "LOCKED",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EligibilityDecision {
    pub disabled: bool,
    pub reason: ReasonCode,
    /// Times already picked as winner; only set for completed matches.
    pub usage_badge: Option<u32>,
    /// This team is the user's current pick for the match.
    pub selected: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchDecision {
    pub home: EligibilityDecision,
    pub away: EligibilityDecision,
}

impl MatchDecision {
    pub fn side(&self, side: Side) -> &EligibilityDecision {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeekPick {
    pub match_id: MatchId,
    pub team_id: TeamId,
}

/// Per-user pick history flags, rebuilt from fresh API data on every week load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPickState {
    pub eliminated_team_ids: HashSet<TeamId>,
    pub winner_usage: HashMap<TeamId, u32>,
    /// Teams that were the implied loser of an earlier pick.
    pub loser_usage_team_ids: HashSet<TeamId>,
    pub week_pick: Option<WeekPick>,
}

impl UserPickState {
    /// Build the state from the raw lists the API returns.
    /// Only the first of `week_picks` counts: one pick per week.
    pub fn from_snapshot(
        eliminated: &[Team],
        usage: &[TeamUsage],
        losers: &[Team],
        week_picks: &[Pick],
    ) -> Self {
        Self {
            eliminated_team_ids: eliminated.iter().map(|t| t.id).collect(),
            winner_usage: usage
                .iter()
                .filter(|u| u.usage_count > 0)
                .map(|u| (u.team.id, u.usage_count))
                .collect(),
            loser_usage_team_ids: losers.iter().map(|t| t.id).collect(),
            week_pick: week_picks.first().map(|p| WeekPick {
                match_id: p.matchup.id,
                team_id: p.chosen.id,
            }),
        }
    }

    pub fn winner_usage(&self, team_id: TeamId) -> u32 {
        self.winner_usage.get(&team_id).copied().unwrap_or(0)
    }

    fn selected_team(&self, match_id: MatchId) -> Option<TeamId> {
        self.week_pick
            .filter(|p| p.match_id == match_id)
            .map(|p| p.team_id)
    }
}

/// Decide selectability for both teams of `fixture`.
pub fn resolve(fixture: &Match, state: &UserPickState) -> MatchDecision {
    let selected = state.selected_team(fixture.id);
    MatchDecision {
        home: decide(fixture, Side::Home, state, selected),
        away: decide(fixture, Side::Away, state, selected),
    }
}

/// Resolve every match of a week, keyed by (match id, team id).
pub fn resolve_week(
    matches: &[Match],
    state: &UserPickState,
) -> BTreeMap<(MatchId, TeamId), EligibilityDecision> {
    let mut decisions = BTreeMap::new();
    for fixture in matches {
        let decision = resolve(fixture, state);
        decisions.insert((fixture.id, fixture.home.id), decision.home);
        decisions.insert((fixture.id, fixture.away.id), decision.away);
    }
    decisions
}

fn decide(
    fixture: &Match,
    side: Side,
    state: &UserPickState,
    selected: Option<TeamId>,
) -> EligibilityDecision {
    let team = fixture.team(side);
    let opponent = fixture.team(side.opposite());
    let usage = state.winner_usage(team.id);

    let reason = if state.eliminated_team_ids.contains(&team.id) {
        ReasonCode::Eliminated
    } else if usage >= MAX_WINNER_PICKS {
        ReasonCode::MaxWinsReached
    } else if state.loser_usage_team_ids.contains(&opponent.id) {
        // Picking this side makes the opponent lose again.
        ReasonCode::AlreadyLostAsThisTeam
    } else if fixture.is_game_started {
        ReasonCode::GameStarted
    } else {
        ReasonCode::None
    };

    EligibilityDecision {
        disabled: reason != ReasonCode::None,
        reason,
        usage_badge: (fixture.is_completed && usage == 1).then_some(1),
        selected: selected == Some(team.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(id: TeamId, abbrev: &str) -> Team {
        Team {
            id,
            name: abbrev.to_string(),
            abbrev: abbrev.to_string(),
            logo_url: String::new(),
        }
    }

    fn fixture(id: MatchId, home: TeamId, away: TeamId) -> Match {
        Match {
            id,
            week: 3,
            home: team(home, "HOME"),
            away: team(away, "AWAY"),
            ..Default::default()
        }
    }

    #[test]
    fn open_match_is_selectable_on_both_sides() {
        let decision = resolve(&fixture(1, 10, 20), &UserPickState::default());
        assert_eq!(decision.home, EligibilityDecision::default());
        assert_eq!(decision.away, EligibilityDecision::default());
    }

    #[test]
    fn game_started_disables_both_sides() {
        let mut m = fixture(1, 10, 20);
        m.is_game_started = true;

        let decision = resolve(&m, &UserPickState::default());
        assert!(decision.home.disabled && decision.away.disabled);
        assert_eq!(decision.home.reason, ReasonCode::GameStarted);
        assert_eq!(decision.away.reason, ReasonCode::GameStarted);
    }

    #[test]
    fn game_started_still_disables_side_with_earlier_reason() {
        let mut m = fixture(1, 10, 20);
        m.is_game_started = true;
        let state = UserPickState {
            eliminated_team_ids: HashSet::from([10]),
            ..Default::default()
        };

        let decision = resolve(&m, &state);
        assert_eq!(decision.home.reason, ReasonCode::Eliminated);
        assert_eq!(decision.away.reason, ReasonCode::GameStarted);
        assert!(decision.home.disabled && decision.away.disabled);
    }

    #[test]
    fn two_winner_picks_reach_the_cap() {
        let state = UserPickState {
            winner_usage: HashMap::from([(10, 2), (20, 3)]),
            loser_usage_team_ids: HashSet::from([10]),
            ..Default::default()
        };
        let mut m = fixture(1, 10, 20);
        m.is_game_started = true;

        let decision = resolve(&m, &state);
        assert_eq!(decision.home.reason, ReasonCode::MaxWinsReached);
        assert_eq!(decision.away.reason, ReasonCode::MaxWinsReached);
    }

    #[test]
    fn elimination_takes_precedence_over_other_rules() {
        let state = UserPickState {
            eliminated_team_ids: HashSet::from([10]),
            winner_usage: HashMap::from([(10, 2)]),
            loser_usage_team_ids: HashSet::from([20]),
            ..Default::default()
        };

        let decision = resolve(&fixture(1, 10, 20), &state);
        assert!(decision.home.disabled);
        assert_eq!(decision.home.reason, ReasonCode::Eliminated);
    }

    #[test]
    fn loser_usage_blocks_only_the_side_that_beats_that_team() {
        let state = UserPickState {
            loser_usage_team_ids: HashSet::from([20]),
            ..Default::default()
        };

        let decision = resolve(&fixture(1, 10, 20), &state);
        assert!(decision.home.disabled);
        assert_eq!(decision.home.reason, ReasonCode::AlreadyLostAsThisTeam);
        assert!(!decision.away.disabled);
        assert_eq!(decision.away.reason, ReasonCode::None);
    }

    #[test]
    fn usage_badge_only_for_completed_matches() {
        let state = UserPickState {
            winner_usage: HashMap::from([(10, 1), (20, 2)]),
            ..Default::default()
        };

        let open = resolve(&fixture(1, 10, 20), &state);
        assert_eq!(open.home.usage_badge, None);
        assert!(!open.home.disabled);

        let mut done = fixture(1, 10, 20);
        done.is_completed = true;
        let decision = resolve(&done, &state);
        assert_eq!(decision.home.usage_badge, Some(1));
        assert!(!decision.home.disabled);
        assert_eq!(decision.away.usage_badge, None);
    }

    #[test]
    fn existing_pick_stays_selected_when_disabled() {
        let mut m = fixture(7, 10, 20);
        m.is_game_started = true;
        let state = UserPickState {
            week_pick: Some(WeekPick { match_id: 7, team_id: 20 }),
            ..Default::default()
        };

        let decision = resolve(&m, &state);
        assert!(decision.away.selected);
        assert!(decision.away.disabled);
        assert!(!decision.home.selected);

        let other = resolve(&fixture(8, 10, 20), &state);
        assert!(!other.home.selected && !other.away.selected);
    }

    #[test]
    fn resolver_is_idempotent() {
        let matches = vec![fixture(1, 10, 20), fixture(2, 30, 40)];
        let state = UserPickState {
            eliminated_team_ids: HashSet::from([30]),
            winner_usage: HashMap::from([(10, 1)]),
            loser_usage_team_ids: HashSet::from([40]),
            week_pick: Some(WeekPick { match_id: 1, team_id: 10 }),
        };

        let first = resolve_week(&matches, &state);
        let second = resolve_week(&matches, &state);
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
        assert!(first[&(1, 10)].selected);
        assert_eq!(first[&(2, 30)].reason, ReasonCode::Eliminated);
    }

    #[test]
    fn snapshot_keeps_only_the_first_week_pick() {
        let pick = |id, matchup: Match, chosen: Team| Pick {
            id,
            matchup,
            chosen,
            is_correct: None,
        };
        let picks = vec![
            pick(1, fixture(5, 10, 20), team(10, "A")),
            pick(2, fixture(6, 30, 40), team(40, "B")),
        ];
        let usage = vec![
            TeamUsage { team: team(10, "A"), usage_count: 1 },
            TeamUsage { team: team(30, "C"), usage_count: 0 },
        ];

        let state = UserPickState::from_snapshot(&[team(99, "X")], &usage, &[team(20, "B")], &picks);
        assert_eq!(state.week_pick, Some(WeekPick { match_id: 5, team_id: 10 }));
        assert_eq!(state.winner_usage(10), 1);
        assert_eq!(state.winner_usage(30), 0);
        assert_eq!(state.winner_usage(12345), 0);
        assert!(state.eliminated_team_ids.contains(&99));
        assert!(state.loser_usage_team_ids.contains(&20));
    }

    #[test]
    fn every_disabling_reason_has_an_explanation() {
        for reason in [
            ReasonCode::Eliminated,
            ReasonCode::MaxWinsReached,
            ReasonCode::AlreadyLostAsThisTeam,
            ReasonCode::GameStarted,
        ] {
            assert!(reason.explanation().is_some(), "{reason:?}");
        }
        assert_eq!(ReasonCode::None.explanation(), None);
    }
}
