pub mod client;
pub mod eligibility;
pub mod standings;
pub mod wire;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type TeamId = u32;
pub type MatchId = u32;
pub type UserId = u32;

// ---------------------------------------------------------------------------
// Domain types, independent of the pool server's wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,    // "Kansas City Chiefs"
    pub abbrev: String,  // "KC"
    pub logo_url: String,
}

/// Which side of a match a team plays on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Side {
    Away,
    #[default]
    Home,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Away => Side::Home,
            Side::Home => Side::Away,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MatchStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
}

impl MatchStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "in_progress" | "live" => MatchStatus::InProgress,
            "completed" | "final" => MatchStatus::Completed,
            _ => MatchStatus::Scheduled,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Match {
    pub id: MatchId,
    pub week: u32,
    pub home: Team,
    pub away: Team,
    pub start_time: Option<DateTime<Utc>>,
    pub is_completed: bool,
    /// Server-computed: kickoff has passed, picks on this match are closed.
    pub is_game_started: bool,
    pub winner: Option<Team>, // only present once completed
    pub score: Option<(u16, u16)>, // (home, away)
    pub status: MatchStatus,
}

impl Match {
    pub fn team(&self, side: Side) -> &Team {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    pub fn is_winner(&self, team_id: TeamId) -> bool {
        self.is_completed && self.winner.as_ref().is_some_and(|w| w.id == team_id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PickOutcome {
    #[default]
    Pending,
    Correct,
    Incorrect,
}

impl PickOutcome {
    pub fn from_flags(is_completed: bool, is_correct: Option<bool>) -> Self {
        match (is_completed, is_correct) {
            (false, _) => PickOutcome::Pending,
            (true, Some(true)) => PickOutcome::Correct,
            (true, _) => PickOutcome::Incorrect,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PickOutcome::Pending => "Pending",
            PickOutcome::Correct => "Correct",
            PickOutcome::Incorrect => "Wrong",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pick {
    pub id: u32,
    pub matchup: Match,
    pub chosen: Team,
    pub is_correct: Option<bool>,
}

impl Pick {
    pub fn outcome(&self) -> PickOutcome {
        PickOutcome::from_flags(self.matchup.is_completed, self.is_correct)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub score: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamUsage {
    pub team: Team,
    pub usage_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub user_id: UserId,
    pub username: String,
    pub score: u32,
    pub emoji: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerScore {
    pub user_id: UserId,
    pub username: String,
    pub score: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreSummary {
    pub user: PlayerScore,
    pub opponents: Vec<PlayerScore>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentPick {
    pub week: u32,
    pub team: String,
    pub team_logo: String,
    pub outcome: PickOutcome,
}

/// Everything the dashboard view shows for the logged-in user.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub score: ScoreSummary,
    pub rank: Option<u32>,
    pub recent_picks: Vec<RecentPick>,
    pub eliminated: Vec<Team>,
}

/// One fetched week: the matches plus the per-user state the resolver needs.
#[derive(Debug, Clone, Default)]
pub struct WeekSnapshot {
    pub week: u32,
    /// All weeks known to the server, ascending. Drives the week selector.
    pub weeks: Vec<u32>,
    pub matches: Vec<Match>,
    pub picks: Vec<Pick>,
    pub state: eligibility::UserPickState,
}
