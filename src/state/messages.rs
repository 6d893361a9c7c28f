use crate::state::countdown::CountdownState;
use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use pool_api::standings::PickHistory;
use pool_api::{Dashboard, LeaderboardEntry, MatchId, TeamId, User, UserId, WeekSnapshot};

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    /// Ask the server whether the stored session is still valid.
    RestoreSession,
    Login { username: String, password: String },
    Logout,
    LoadDashboard { user_id: UserId },
    /// `None` loads the server's current week.
    LoadWeek { user_id: UserId, week: Option<u32> },
    SubmitPick { user_id: UserId, week: u32, match_id: MatchId, team_id: TeamId },
    LoadLeaderboard,
    LoadPickHistory,
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    SessionRestored { user: Option<User> },
    LoggedIn { user: User },
    LoggedOut,
    DashboardLoaded { dashboard: Dashboard },
    WeekLoaded { snapshot: WeekSnapshot },
    PickSubmitted { user_id: UserId, week: u32, message: String },
    LeaderboardLoaded { entries: Vec<LeaderboardEntry> },
    PickHistoryLoaded { history: PickHistory },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    CountdownTick(CountdownState),
    /// The periodic refresher wants the active view reloaded.
    RefreshDue,
    /// Housekeeping tick, expires toasts.
    Tick,
}
