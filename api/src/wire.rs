//! Raw serde shapes of the pool server's JSON responses.
//! These map to our clean domain types via the `From` impls at the bottom.
use crate::{
    LeaderboardEntry, Match, MatchStatus, Pick, PickOutcome, PlayerScore, RecentPick,
    ScoreSummary, Team, TeamUsage, User,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct PickRequest {
    pub match_id: u32,
    pub chosen_team_id: u32,
}

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default)]
pub struct ErrorBody {
    pub error: Option<String>,
    pub details: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct MessageResponse {
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct LoginResponse {
    pub message: Option<String>,
    pub user: Option<WireUser>,
}

#[derive(Debug, Deserialize, Default)]
pub struct MeResponse {
    pub user: Option<WireUser>,
}

#[derive(Debug, Deserialize, Default)]
pub struct CurrentWeekResponse {
    pub current_week: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct MatchesResponse {
    #[serde(default)]
    pub matches: Vec<WireMatch>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PicksResponse {
    #[serde(default)]
    pub picks: Vec<WirePick>,
}

#[derive(Debug, Deserialize, Default)]
pub struct EliminatedResponse {
    #[serde(default)]
    pub eliminated_teams: Vec<WireTeam>,
}

#[derive(Debug, Deserialize, Default)]
pub struct TeamUsageResponse {
    #[serde(default)]
    pub team_usage: Vec<WireTeamUsage>,
}

#[derive(Debug, Deserialize, Default)]
pub struct LoserUsageResponse {
    #[serde(default)]
    pub loser_teams: Vec<WireTeam>,
}

#[derive(Debug, Deserialize, Default)]
pub struct LeaderboardResponse {
    #[serde(default)]
    pub leaderboard: Vec<WireLeaderboardEntry>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RankResponse {
    pub rank: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ScoreResponse {
    pub user: Option<WirePlayerScore>,
    #[serde(default)]
    pub opponents: Vec<WirePlayerScore>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RecentPicksResponse {
    #[serde(default)]
    pub picks: Vec<WireRecentPick>,
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireUser {
    pub id: Option<u32>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub is_admin: Option<bool>,
    pub score: Option<u32>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireTeam {
    pub id: Option<u32>,
    pub name: Option<String>,
    pub abbreviation: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireMatch {
    pub id: Option<u32>,
    pub week: Option<u32>,
    pub home_team: Option<WireTeam>,
    pub away_team: Option<WireTeam>,
    pub start_time: Option<String>, // ISO 8601, naive timestamps are UTC
    pub is_completed: Option<bool>,
    pub is_game_started: Option<bool>,
    pub home_score: Option<u16>,
    pub away_score: Option<u16>,
    pub status: Option<String>, // "scheduled" | "in_progress" | "completed"
    pub winner_team: Option<WireTeam>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WirePick {
    pub id: Option<u32>,
    #[serde(rename = "match")]
    pub matchup: Option<WireMatch>,
    pub chosen_team: Option<WireTeam>,
    pub is_correct: Option<bool>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireTeamUsage {
    pub team: Option<WireTeam>,
    pub usage_count: Option<u32>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireLeaderboardEntry {
    pub id: Option<u32>,
    pub username: Option<String>,
    pub score: Option<u32>,
    pub emoji: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WirePlayerScore {
    pub id: Option<u32>,
    pub username: Option<String>,
    pub score: Option<u32>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireRecentPick {
    pub week: Option<u32>,
    pub team: Option<String>,
    pub team_logo: Option<String>,
    pub is_completed: Option<bool>,
    pub is_correct: Option<bool>,
}

// ---------------------------------------------------------------------------
// Mapping: wire types → clean domain types
// ---------------------------------------------------------------------------

impl From<WireUser> for User {
    fn from(u: WireUser) -> Self {
        User {
            id: u.id.unwrap_or_default(),
            username: u.username.unwrap_or_default(),
            email: u.email,
            is_admin: u.is_admin.unwrap_or(false),
            score: u.score.unwrap_or_default(),
        }
    }
}

impl From<WireTeam> for Team {
    fn from(t: WireTeam) -> Self {
        Team {
            id: t.id.unwrap_or_default(),
            name: t.name.unwrap_or_default(),
            abbrev: t.abbreviation.unwrap_or_default(),
            logo_url: t.logo_url.unwrap_or_default(),
        }
    }
}

impl From<WireMatch> for Match {
    fn from(m: WireMatch) -> Self {
        let is_completed = m.is_completed.unwrap_or(false);
        let status = m
            .status
            .as_deref()
            .map(MatchStatus::parse)
            .unwrap_or(if is_completed {
                MatchStatus::Completed
            } else {
                MatchStatus::Scheduled
            });

        Match {
            id: m.id.unwrap_or_default(),
            week: m.week.unwrap_or_default(),
            home: m.home_team.map(Team::from).unwrap_or_default(),
            away: m.away_team.map(Team::from).unwrap_or_default(),
            start_time: m.start_time.as_deref().and_then(parse_timestamp),
            is_completed,
            is_game_started: m.is_game_started.unwrap_or(false),
            winner: m.winner_team.map(Team::from),
            score: m.home_score.zip(m.away_score),
            status,
        }
    }
}

impl From<WirePick> for Pick {
    fn from(p: WirePick) -> Self {
        Pick {
            id: p.id.unwrap_or_default(),
            matchup: p.matchup.map(Match::from).unwrap_or_default(),
            chosen: p.chosen_team.map(Team::from).unwrap_or_default(),
            is_correct: p.is_correct,
        }
    }
}

impl From<WireTeamUsage> for TeamUsage {
    fn from(u: WireTeamUsage) -> Self {
        TeamUsage {
            team: u.team.map(Team::from).unwrap_or_default(),
            usage_count: u.usage_count.unwrap_or_default(),
        }
    }
}

impl From<WireLeaderboardEntry> for LeaderboardEntry {
    fn from(e: WireLeaderboardEntry) -> Self {
        LeaderboardEntry {
            user_id: e.id.unwrap_or_default(),
            username: e.username.unwrap_or_default(),
            score: e.score.unwrap_or_default(),
            emoji: e.emoji.filter(|s| !s.trim().is_empty()),
        }
    }
}

impl From<WirePlayerScore> for PlayerScore {
    fn from(p: WirePlayerScore) -> Self {
        PlayerScore {
            user_id: p.id.unwrap_or_default(),
            username: p.username.unwrap_or_default(),
            score: p.score.unwrap_or_default(),
        }
    }
}

impl From<ScoreResponse> for ScoreSummary {
    fn from(s: ScoreResponse) -> Self {
        ScoreSummary {
            user: s.user.map(PlayerScore::from).unwrap_or_default(),
            opponents: s.opponents.into_iter().map(PlayerScore::from).collect(),
        }
    }
}

impl From<WireRecentPick> for RecentPick {
    fn from(p: WireRecentPick) -> Self {
        RecentPick {
            week: p.week.unwrap_or_default(),
            team: p.team.unwrap_or_default(),
            team_logo: p.team_logo.unwrap_or_default(),
            outcome: PickOutcome::from_flags(p.is_completed.unwrap_or(false), p.is_correct),
        }
    }
}

/// The server emits `datetime.isoformat()`, which drops the offset for naive
/// UTC timestamps. Accept both forms.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .map(|naive| naive.and_utc())
}
