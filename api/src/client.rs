use crate::eligibility::UserPickState;
use crate::standings::PickHistory;
use crate::wire::{
    CurrentWeekResponse, EliminatedResponse, ErrorBody, LeaderboardResponse, LoginRequest,
    LoginResponse, LoserUsageResponse, MatchesResponse, MeResponse, MessageResponse,
    PickRequest, PicksResponse, RankResponse, RecentPicksResponse, ScoreResponse,
    TeamUsageResponse,
};
use crate::{
    Dashboard, LeaderboardEntry, Match, MatchId, Pick, RecentPick, ScoreSummary, Team, TeamId,
    TeamUsage, User, UserId, WeekSnapshot,
};
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Client for the pool server's JSON API. Keeps the session cookie set by
/// `login` for every later call.
#[derive(Debug, Clone)]
pub struct PoolApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for PoolApi {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    /// The server answered with an error status and (usually) an `{"error": ..}` body.
    Rejected { status: u16, message: String },
    NotFound(String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::Rejected { message, .. } => write!(f, "{message}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl PoolApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent("pooltui/0.1 (terminal pick'em client)")
                .cookie_store(true)
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    pub async fn login(&self, username: &str, password: &str) -> ApiResult<User> {
        let raw: LoginResponse = self
            .post("/api/auth/login", &LoginRequest { username, password })
            .await?;
        raw.user
            .map(User::from)
            .ok_or_else(|| ApiError::Other("login response did not include a user".into()))
    }

    pub async fn logout(&self) -> ApiResult<()> {
        let _: MessageResponse = self.post("/api/auth/logout", &()).await?;
        Ok(())
    }

    /// The user behind the current session cookie, or `None` when not logged in.
    pub async fn current_user(&self) -> ApiResult<Option<User>> {
        match self.get::<MeResponse>("/api/auth/me").await {
            Ok(raw) => Ok(raw.user.map(User::from)),
            Err(ApiError::Rejected { status: 401 | 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    // -----------------------------------------------------------------------
    // Schedule and picks
    // -----------------------------------------------------------------------

    pub async fn current_week(&self) -> ApiResult<u32> {
        let raw: CurrentWeekResponse = self.get("/api/current-week").await?;
        raw.current_week
            .ok_or_else(|| ApiError::NotFound("current week".into()))
    }

    /// All matches, or only those of `week`.
    pub async fn matches(&self, week: Option<u32>) -> ApiResult<Vec<Match>> {
        let path = match week {
            Some(week) => format!("/api/matches?week={week}"),
            None => "/api/matches".to_string(),
        };
        let raw: MatchesResponse = self.get(&path).await?;
        Ok(raw.matches.into_iter().map(Match::from).collect())
    }

    pub async fn picks(&self, user_id: UserId, week: Option<u32>) -> ApiResult<Vec<Pick>> {
        let path = match week {
            Some(week) => format!("/api/picks?user_id={user_id}&week={week}"),
            None => format!("/api/picks?user_id={user_id}"),
        };
        let raw: PicksResponse = self.get(&path).await?;
        Ok(raw.picks.into_iter().map(Pick::from).collect())
    }

    /// Submit (or switch) the pick for a match. Returns the server's message.
    pub async fn submit_pick(&self, match_id: MatchId, team_id: TeamId) -> ApiResult<String> {
        let body = PickRequest { match_id, chosen_team_id: team_id };
        let raw: MessageResponse = self.post("/api/picks", &body).await?;
        Ok(raw.message.unwrap_or_else(|| "Pick saved".to_string()))
    }

    pub async fn eliminated_teams(&self, user_id: UserId) -> ApiResult<Vec<Team>> {
        let raw: EliminatedResponse = self
            .get(&format!("/api/picks/eliminated?user_id={user_id}"))
            .await?;
        Ok(raw.eliminated_teams.into_iter().map(Team::from).collect())
    }

    pub async fn team_usage(&self, user_id: UserId) -> ApiResult<Vec<TeamUsage>> {
        let raw: TeamUsageResponse = self
            .get(&format!("/api/picks/team-usage?user_id={user_id}"))
            .await?;
        Ok(raw.team_usage.into_iter().map(TeamUsage::from).collect())
    }

    pub async fn loser_usage(&self, user_id: UserId) -> ApiResult<Vec<Team>> {
        let raw: LoserUsageResponse = self
            .get(&format!("/api/picks/loser-usage?user_id={user_id}"))
            .await?;
        Ok(raw.loser_teams.into_iter().map(Team::from).collect())
    }

    // -----------------------------------------------------------------------
    // Scores
    // -----------------------------------------------------------------------

    pub async fn score(&self, user_id: UserId) -> ApiResult<ScoreSummary> {
        let raw: ScoreResponse = self
            .get(&format!("/api/picks/score?user_id={user_id}"))
            .await?;
        Ok(raw.into())
    }

    pub async fn recent_picks(&self, user_id: UserId) -> ApiResult<Vec<RecentPick>> {
        let raw: RecentPicksResponse = self
            .get(&format!("/api/picks/recent?user_id={user_id}"))
            .await?;
        Ok(raw.picks.into_iter().map(RecentPick::from).collect())
    }

    pub async fn leaderboard(&self) -> ApiResult<Vec<LeaderboardEntry>> {
        let raw: LeaderboardResponse = self.get("/api/leaderboard").await?;
        Ok(raw.leaderboard.into_iter().map(LeaderboardEntry::from).collect())
    }

    pub async fn user_rank(&self, user_id: UserId) -> ApiResult<u32> {
        let raw: RankResponse = self
            .get(&format!("/api/user/rank?user_id={user_id}"))
            .await?;
        raw.rank
            .ok_or_else(|| ApiError::NotFound(format!("rank for user {user_id}")))
    }

    // -----------------------------------------------------------------------
    // Composite fetches used by the views
    // -----------------------------------------------------------------------

    /// Score, rank, recent picks and eliminated teams for the dashboard.
    /// A missing rank is not fatal; the other parts are.
    pub async fn fetch_dashboard(&self, user_id: UserId) -> ApiResult<Dashboard> {
        let score = self.score(user_id).await?;
        let rank = self.user_rank(user_id).await.ok();
        let recent_picks = self.recent_picks(user_id).await?;
        let eliminated = self.eliminated_teams(user_id).await?;
        Ok(Dashboard { score, rank, recent_picks, eliminated })
    }

    /// Everything the picks view needs for one week.
    ///
    /// Loser usage is optional: older servers answer 404 for it, which reads
    /// as an empty list. Any other failure aborts the snapshot.
    pub async fn fetch_week(&self, user_id: UserId, week: u32) -> ApiResult<WeekSnapshot> {
        let mut weeks: Vec<u32> = self.matches(None).await?.iter().map(|m| m.week).collect();
        weeks.sort_unstable();
        weeks.dedup();

        let matches = self.matches(Some(week)).await?;
        let picks = self.picks(user_id, Some(week)).await?;
        let eliminated = self.eliminated_teams(user_id).await?;
        let usage = self.team_usage(user_id).await?;
        let losers = match self.loser_usage(user_id).await {
            Ok(teams) => teams,
            Err(ApiError::Rejected { status: 404, .. }) => Vec::new(),
            Err(e) => return Err(e),
        };

        let state = UserPickState::from_snapshot(&eliminated, &usage, &losers, &picks);
        Ok(WeekSnapshot { week, weeks, matches, picks, state })
    }

    /// Every player's picks across the season. Players whose picks cannot be
    /// loaded are shown without picks rather than failing the whole view.
    pub async fn fetch_pick_history(&self, current_week: u32) -> ApiResult<PickHistory> {
        let players = self.leaderboard().await?;
        let matches = self.matches(None).await?;

        let mut picks_by_user = HashMap::with_capacity(players.len());
        for player in &players {
            if let Ok(picks) = self.picks(player.user_id, None).await {
                picks_by_user.insert(player.user_id, picks);
            }
        }

        Ok(PickHistory { players, matches, picks_by_user, current_week })
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.clone()))?;
        read_json(response, &url).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.clone()))?;
        read_json(response, &url).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response, url: &str) -> ApiResult<T> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parsing(e, url.to_owned()));
    }

    let body = response
        .text()
        .await
        .map_err(|e| ApiError::Api(e, url.to_owned()))?;
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_else(|| {
            format!(
                "{} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("request failed")
            )
        });
    Err(ApiError::Rejected { status: status.as_u16(), message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eligibility::WeekPick;
    use mockito::{Matcher, Server};

    const TEAM_BUF: &str =
        r#"{"id": 1, "name": "Buffalo Bills", "abbreviation": "BUF", "logo_url": "/buf.png"}"#;
    const TEAM_NYJ: &str =
        r#"{"id": 2, "name": "New York Jets", "abbreviation": "NYJ", "logo_url": "/nyj.png"}"#;

    fn match_json(id: u32, week: u32) -> String {
        format!(
            r#"{{"id": {id}, "week": {week}, "home_team": {TEAM_BUF}, "away_team": {TEAM_NYJ},
                "start_time": "2025-09-14T17:00:00", "is_completed": false,
                "is_game_started": false, "status": "scheduled", "winner_team": null}}"#
        )
    }

    #[tokio::test]
    async fn matches_for_a_week_are_mapped() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/matches")
            .match_query(Matcher::UrlEncoded("week".into(), "2".into()))
            .with_header("content-type", "application/json")
            .with_body(format!(r#"{{"matches": [{}]}}"#, match_json(7, 2)))
            .create_async()
            .await;

        let api = PoolApi::new(server.url());
        let matches = api.matches(Some(2)).await.unwrap();
        mock.assert_async().await;

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, 7);
        assert_eq!(matches[0].home.abbrev, "BUF");
        assert_eq!(matches[0].away.abbrev, "NYJ");
    }

    #[tokio::test]
    async fn error_body_is_surfaced_verbatim() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/picks")
            .match_body(Matcher::Json(serde_json::json!({"match_id": 7, "chosen_team_id": 1})))
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "Game has already started. Picks are no longer allowed."}"#)
            .create_async()
            .await;

        let api = PoolApi::new(server.url());
        let err = api.submit_pick(7, 1).await.unwrap_err();
        match &err {
            ApiError::Rejected { status, message } => {
                assert_eq!(*status, 400);
                assert_eq!(message, "Game has already started. Picks are no longer allowed.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "Game has already started. Picks are no longer allowed."
        );
    }

    #[tokio::test]
    async fn unauthenticated_me_is_not_an_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/auth/me")
            .with_status(401)
            .with_body(r#"{"error": "Not authenticated"}"#)
            .create_async()
            .await;

        let api = PoolApi::new(server.url());
        assert_eq!(api.current_user().await.unwrap(), None);
    }

    #[tokio::test]
    async fn login_returns_the_user() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/auth/login")
            .match_body(Matcher::Json(serde_json::json!({"username": "anna", "password": "pw"})))
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"message": "Login successful",
                    "user": {"id": 4, "username": "anna", "email": null, "is_admin": false, "score": 3}}"#,
            )
            .create_async()
            .await;

        let api = PoolApi::new(server.url());
        let user = api.login("anna", "pw").await.unwrap();
        assert_eq!(user.id, 4);
        assert_eq!(user.username, "anna");
        assert_eq!(user.score, 3);
    }

    async fn week_server(loser_usage_status: usize) -> mockito::ServerGuard {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/matches")
            .match_query(Matcher::Missing)
            .with_body(format!(
                r#"{{"matches": [{}, {}, {}]}}"#,
                match_json(3, 1),
                match_json(7, 2),
                match_json(8, 2)
            ))
            .create_async()
            .await;
        server
            .mock("GET", "/api/matches")
            .match_query(Matcher::UrlEncoded("week".into(), "2".into()))
            .with_body(format!(r#"{{"matches": [{}, {}]}}"#, match_json(7, 2), match_json(8, 2)))
            .create_async()
            .await;
        server
            .mock("GET", "/api/picks")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("user_id".into(), "4".into()),
                Matcher::UrlEncoded("week".into(), "2".into()),
            ]))
            .with_body(format!(
                r#"{{"picks": [{{"id": 1, "match": {}, "chosen_team": {TEAM_NYJ}, "is_correct": null}}]}}"#,
                match_json(7, 2)
            ))
            .create_async()
            .await;
        server
            .mock("GET", "/api/picks/eliminated")
            .match_query(Matcher::UrlEncoded("user_id".into(), "4".into()))
            .with_body(format!(r#"{{"eliminated_teams": [{TEAM_BUF}]}}"#))
            .create_async()
            .await;
        server
            .mock("GET", "/api/picks/team-usage")
            .match_query(Matcher::UrlEncoded("user_id".into(), "4".into()))
            .with_body(format!(
                r#"{{"team_usage": [{{"team": {TEAM_NYJ}, "usage_count": 1, "status": "used_once"}}]}}"#
            ))
            .create_async()
            .await;
        server
            .mock("GET", "/api/picks/loser-usage")
            .match_query(Matcher::Any)
            .with_status(loser_usage_status)
            .create_async()
            .await;
        server
    }

    #[tokio::test]
    async fn week_snapshot_tolerates_missing_loser_usage() {
        let server = week_server(404).await;

        let api = PoolApi::new(server.url());
        let snapshot = api.fetch_week(4, 2).await.unwrap();

        assert_eq!(snapshot.weeks, vec![1, 2]);
        assert_eq!(snapshot.matches.len(), 2);
        assert!(snapshot.state.loser_usage_team_ids.is_empty());
        assert!(snapshot.state.eliminated_team_ids.contains(&1));
        assert_eq!(snapshot.state.winner_usage(2), 1);
        assert_eq!(
            snapshot.state.week_pick,
            Some(WeekPick { match_id: 7, team_id: 2 })
        );
    }

    #[tokio::test]
    async fn week_snapshot_fails_when_loser_usage_errors() {
        let server = week_server(500).await;

        let api = PoolApi::new(server.url());
        let err = api.fetch_week(4, 2).await.unwrap_err();
        assert!(matches!(err, ApiError::Rejected { status: 500, .. }));
    }

    #[tokio::test]
    async fn server_error_without_body_uses_status_text() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/leaderboard")
            .with_status(503)
            .create_async()
            .await;

        let api = PoolApi::new(server.url());
        let err = api.leaderboard().await.unwrap_err();
        assert_eq!(err.to_string(), "503 Service Unavailable");
    }
}
