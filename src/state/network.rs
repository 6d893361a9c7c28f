use crate::state::messages::{NetworkRequest, NetworkResponse};
use log::{debug, error, info};
use pool_api::client::{ApiResult, PoolApi};
use pool_api::{MatchId, TeamId, UserId};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Runs API calls one at a time and reports results back to the UI loop.
pub struct NetworkWorker {
    client: PoolApi,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl NetworkWorker {
    pub fn new(
        client: PoolApi,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.start_loading_animation().await;

            let result = match request {
                NetworkRequest::RestoreSession => self.handle_restore_session().await,
                NetworkRequest::Login { username, password } => {
                    self.handle_login(&username, &password).await
                }
                NetworkRequest::Logout => self.handle_logout().await,
                NetworkRequest::LoadDashboard { user_id } => {
                    self.handle_load_dashboard(user_id).await
                }
                NetworkRequest::LoadWeek { user_id, week } => {
                    self.handle_load_week(user_id, week).await
                }
                NetworkRequest::SubmitPick { user_id, week, match_id, team_id } => {
                    self.handle_submit_pick(user_id, week, match_id, team_id).await
                }
                NetworkRequest::LoadLeaderboard => self.handle_load_leaderboard().await,
                NetworkRequest::LoadPickHistory => self.handle_load_pick_history().await,
            };

            debug!("network request complete");
            self.stop_loading_animation(result.is_ok()).await;

            let response = result.unwrap_or_else(|err| NetworkResponse::Error {
                message: err.to_string(),
            });

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle_restore_session(&self) -> ApiResult<NetworkResponse> {
        debug!("checking stored session");
        let user = self.client.current_user().await?;
        Ok(NetworkResponse::SessionRestored { user })
    }

    async fn handle_login(&self, username: &str, password: &str) -> ApiResult<NetworkResponse> {
        debug!("logging in as {username}");
        let user = self.client.login(username, password).await?;
        info!("logged in as {}", user.username);
        Ok(NetworkResponse::LoggedIn { user })
    }

    async fn handle_logout(&self) -> ApiResult<NetworkResponse> {
        self.client.logout().await?;
        info!("logged out");
        Ok(NetworkResponse::LoggedOut)
    }

    async fn handle_load_dashboard(&self, user_id: UserId) -> ApiResult<NetworkResponse> {
        debug!("loading dashboard for user {user_id}");
        let dashboard = self.client.fetch_dashboard(user_id).await?;
        Ok(NetworkResponse::DashboardLoaded { dashboard })
    }

    async fn handle_load_week(
        &self,
        user_id: UserId,
        week: Option<u32>,
    ) -> ApiResult<NetworkResponse> {
        let week = match week {
            Some(week) => week,
            None => self.client.current_week().await?,
        };
        debug!("loading week {week} for user {user_id}");
        let snapshot = self.client.fetch_week(user_id, week).await?;
        Ok(NetworkResponse::WeekLoaded { snapshot })
    }

    async fn handle_submit_pick(
        &self,
        user_id: UserId,
        week: u32,
        match_id: MatchId,
        team_id: TeamId,
    ) -> ApiResult<NetworkResponse> {
        info!("submitting pick: match {match_id}, team {team_id}");
        let message = self.client.submit_pick(match_id, team_id).await?;
        Ok(NetworkResponse::PickSubmitted { user_id, week, message })
    }

    async fn handle_load_leaderboard(&self) -> ApiResult<NetworkResponse> {
        debug!("loading leaderboard");
        let entries = self.client.leaderboard().await?;
        Ok(NetworkResponse::LeaderboardLoaded { entries })
    }

    async fn handle_load_pick_history(&self) -> ApiResult<NetworkResponse> {
        debug!("loading pick history");
        let current_week = self.client.current_week().await?;
        let history = self.client.fetch_pick_history(current_week).await?;
        Ok(NetworkResponse::PickHistoryLoaded { history })
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}
