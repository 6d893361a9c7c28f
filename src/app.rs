use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, PendingPick, ToastKind};
use crate::state::countdown::CountdownState;
use crate::state::messages::NetworkRequest;
use crate::state::session::Session;
use log::{info, warn};
use pool_api::standings::{PickHistory, rank_leaderboard};
use pool_api::{Dashboard, LeaderboardEntry, Side, User, UserId, WeekSnapshot};
use std::time::Instant;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Dashboard,
    Picks,
    Leaderboard,
    AllPicks,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new() -> Self {
        Self::with(AppSettings::load(), Session::load())
    }

    pub fn with(settings: AppSettings, session: Session) -> Self {
        let mut app = Self {
            state: AppState::new(session),
            settings,
        };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        if !app.state.session.is_logged_in() {
            app.state.login.open();
        }

        app
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.state.session.user_id()
    }

    /// Requests that (re)load the data behind the active tab.
    pub fn requests_for_active_tab(&self) -> Vec<NetworkRequest> {
        match (self.state.active_tab, self.user_id()) {
            (MenuItem::Dashboard, Some(user_id)) => vec![NetworkRequest::LoadDashboard { user_id }],
            (MenuItem::Picks, Some(user_id)) => vec![NetworkRequest::LoadWeek {
                user_id,
                week: self.state.week.week(),
            }],
            (MenuItem::Leaderboard, _) => vec![NetworkRequest::LoadLeaderboard],
            (MenuItem::AllPicks, _) => vec![NetworkRequest::LoadPickHistory],
            _ => Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_session_restored(&mut self, user: Option<User>) {
        match user {
            Some(user) => {
                info!("session restored for {}", user.username);
                self.store_user(user);
            }
            None => {
                if self.state.session.is_logged_in() {
                    warn!("stored session is no longer valid");
                    self.state
                        .toasts
                        .push(ToastKind::Info, "Your session expired. Please log in again.");
                }
                self.reset_user_data();
                self.state.login.open();
            }
        }
    }

    pub fn on_logged_in(&mut self, user: User) {
        self.state.last_error = None;
        self.state.login.close();
        self.state
            .toasts
            .push(ToastKind::Success, format!("Welcome, {}!", user.username));
        self.state.week.clear();
        self.store_user(user);
    }

    pub fn on_logged_out(&mut self) {
        self.reset_user_data();
        self.state.toasts.push(ToastKind::Info, "Logged out");
        self.state.login.open();
    }

    pub fn on_dashboard_loaded(&mut self, dashboard: Dashboard) {
        self.state.last_error = None;
        self.state.dashboard = Some(dashboard);
    }

    pub fn on_week_loaded(&mut self, snapshot: WeekSnapshot) {
        self.state.last_error = None;
        self.state.week.load(snapshot);
    }

    pub fn on_pick_submitted(&mut self, message: String) {
        self.state.toasts.push(ToastKind::Success, message);
    }

    pub fn on_leaderboard_loaded(&mut self, entries: Vec<LeaderboardEntry>) {
        self.state.last_error = None;
        self.state.leaderboard = rank_leaderboard(&entries);
    }

    pub fn on_pick_history_loaded(&mut self, history: PickHistory) {
        self.state.last_error = None;
        self.state.history.data = Some(history);
    }

    pub fn on_error(&mut self, message: String) {
        self.state.toasts.push(ToastKind::Error, message.clone());
        self.state.last_error = Some(message);
    }

    pub fn on_countdown_tick(&mut self, state: CountdownState) {
        self.state.countdown = Some(state);
    }

    /// Drop the countdown display once its ticker is torn down.
    pub fn release_countdown(&mut self) {
        self.state.countdown = None;
    }

    /// Returns true when the screen changed.
    pub fn expire_toasts(&mut self, now: Instant) -> bool {
        self.state.toasts.expire(now)
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
        self.state.week.pending = None;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn quit(&mut self) {
        self.state.should_quit = true;
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // Picks
    // -----------------------------------------------------------------------

    pub fn select_side(&mut self, side: Side) {
        self.state.week.select_side(side);
    }

    /// Request for the previous or next week in the selector.
    pub fn change_week(&self, forward: bool) -> Option<NetworkRequest> {
        let user_id = self.user_id()?;
        let week = self.state.week.adjacent_week(forward)?;
        Some(NetworkRequest::LoadWeek { user_id, week: Some(week) })
    }

    /// Enter on a team: disabled teams explain themselves, enabled ones ask
    /// for confirmation.
    pub fn request_pick(&mut self) {
        let Some(week) = self.state.week.week() else {
            return;
        };
        let Some((fixture, side)) = self.state.week.selected() else {
            return;
        };
        let team = fixture.team(side).clone();
        let match_id = fixture.id;
        let decision = *self.state.week.decision(fixture).side(side);

        if decision.disabled {
            let reason = decision
                .reason
                .explanation()
                .unwrap_or("This team cannot be picked");
            self.state.toasts.push(ToastKind::Warning, reason);
            return;
        }
        if decision.selected {
            self.state
                .toasts
                .push(ToastKind::Info, format!("{} is already your pick", team.name));
            return;
        }

        self.state.week.pending = Some(PendingPick {
            week,
            match_id,
            team_id: team.id,
            team_name: team.name,
        });
    }

    pub fn confirm_pick(&mut self) -> Option<NetworkRequest> {
        let pending = self.state.week.pending.take()?;
        let Some(user_id) = self.user_id() else {
            self.state.login.open();
            return None;
        };
        Some(NetworkRequest::SubmitPick {
            user_id,
            week: pending.week,
            match_id: pending.match_id,
            team_id: pending.team_id,
        })
    }

    pub fn cancel_pick(&mut self) {
        self.state.week.pending = None;
    }

    // -----------------------------------------------------------------------
    // All picks
    // -----------------------------------------------------------------------

    pub fn toggle_privacy(&mut self) {
        let history = &mut self.state.history;
        history.hide_current = !history.hide_current;
        let label = if history.hide_current { "hidden" } else { "visible" };
        self.state
            .toasts
            .push(ToastKind::Info, format!("Current week picks {label}"));
    }

    pub fn history_scroll_down(&mut self) {
        self.state.history.scroll_offset = self.state.history.scroll_offset.saturating_add(1);
    }

    pub fn history_scroll_up(&mut self) {
        self.state.history.scroll_offset = self.state.history.scroll_offset.saturating_sub(1);
    }

    // -----------------------------------------------------------------------
    // Login / logout
    // -----------------------------------------------------------------------

    pub fn open_login(&mut self) {
        self.state.login.open();
    }

    pub fn submit_login(&mut self) -> Option<NetworkRequest> {
        match self.state.login.credentials() {
            Some((username, password)) => Some(NetworkRequest::Login { username, password }),
            None => {
                self.state
                    .toasts
                    .push(ToastKind::Warning, "Please enter username and password");
                None
            }
        }
    }

    pub fn logout(&mut self) -> Option<NetworkRequest> {
        self.state
            .session
            .is_logged_in()
            .then_some(NetworkRequest::Logout)
    }

    fn store_user(&mut self, user: User) {
        self.state.login.username = user.username.clone();
        if let Err(e) = self.state.session.store(user) {
            warn!("session not saved: {e}");
        }
    }

    fn reset_user_data(&mut self) {
        self.state.session.clear();
        self.state.dashboard = None;
        self.state.week.clear();
    }
}
