use crate::app::MenuItem;
use crate::state::countdown::CountdownState;
use crate::state::session::Session;
use pool_api::eligibility::{self, EligibilityDecision, MatchDecision};
use pool_api::standings::{PickHistory, RankedEntry};
use pool_api::{Dashboard, Match, MatchId, Side, TeamId, WeekSnapshot};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

pub const TOAST_TTL: Duration = Duration::from_secs(3);

// ---------------------------------------------------------------------------
// Picks view state
// ---------------------------------------------------------------------------

/// A pick waiting for the user's y/n confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPick {
    pub week: u32,
    pub match_id: MatchId,
    pub team_id: TeamId,
    pub team_name: String,
}

#[derive(Debug, Default)]
pub struct WeekState {
    pub snapshot: Option<WeekSnapshot>,
    /// Resolver output for every team of the loaded week.
    pub decisions: BTreeMap<(MatchId, TeamId), EligibilityDecision>,
    pub selected_match: usize,
    pub selected_side: Side,
    pub pending: Option<PendingPick>,
}

impl WeekState {
    /// Replace the loaded week. The cursor stays put when reloading the same
    /// week and resets when switching weeks.
    pub fn load(&mut self, snapshot: WeekSnapshot) {
        let same_week = self.week() == Some(snapshot.week);
        self.decisions = eligibility::resolve_week(&snapshot.matches, &snapshot.state);
        if !same_week {
            self.selected_match = 0;
            self.selected_side = Side::Away;
        }
        self.selected_match = self
            .selected_match
            .min(snapshot.matches.len().saturating_sub(1));
        self.snapshot = Some(snapshot);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn week(&self) -> Option<u32> {
        self.snapshot.as_ref().map(|s| s.week)
    }

    pub fn matches(&self) -> &[Match] {
        self.snapshot.as_ref().map_or(&[], |s| s.matches.as_slice())
    }

    pub fn decision(&self, fixture: &Match) -> MatchDecision {
        let lookup = |side: Side| {
            self.decisions
                .get(&(fixture.id, fixture.team(side).id))
                .copied()
                .unwrap_or_default()
        };
        MatchDecision {
            home: lookup(Side::Home),
            away: lookup(Side::Away),
        }
    }

    pub fn selected(&self) -> Option<(&Match, Side)> {
        self.matches()
            .get(self.selected_match)
            .map(|m| (m, self.selected_side))
    }

    pub fn select_next_match(&mut self) {
        let max = self.matches().len().saturating_sub(1);
        if self.selected_match < max {
            self.selected_match += 1;
        }
    }

    pub fn select_prev_match(&mut self) {
        self.selected_match = self.selected_match.saturating_sub(1);
    }

    pub fn select_side(&mut self, side: Side) {
        self.selected_side = side;
    }

    /// Neighbouring week in the selector, if any.
    pub fn adjacent_week(&self, forward: bool) -> Option<u32> {
        let snapshot = self.snapshot.as_ref()?;
        let idx = snapshot.weeks.iter().position(|w| *w == snapshot.week)?;
        if forward {
            snapshot.weeks.get(idx + 1).copied()
        } else {
            idx.checked_sub(1).and_then(|i| snapshot.weeks.get(i).copied())
        }
    }
}

// ---------------------------------------------------------------------------
// All-picks view state
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct HistoryState {
    pub data: Option<PickHistory>,
    /// Hide other players' picks for the running week.
    pub hide_current: bool,
    pub scroll_offset: u16,
}

impl Default for HistoryState {
    fn default() -> Self {
        Self { data: None, hide_current: true, scroll_offset: 0 }
    }
}

// ---------------------------------------------------------------------------
// Login overlay
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoginField {
    #[default]
    Username,
    Password,
}

#[derive(Debug, Default)]
pub struct LoginForm {
    pub visible: bool,
    pub username: String,
    pub password: String,
    pub focus: LoginField,
}

impl LoginForm {
    pub fn open(&mut self) {
        self.visible = true;
        self.focus = if self.username.is_empty() {
            LoginField::Username
        } else {
            LoginField::Password
        };
    }

    pub fn close(&mut self) {
        self.visible = false;
        self.password.clear();
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        };
    }

    pub fn push(&mut self, c: char) {
        self.active_field().push(c);
    }

    pub fn backspace(&mut self) {
        self.active_field().pop();
    }

    /// Username and password, when both are filled in.
    pub fn credentials(&self) -> Option<(String, String)> {
        let username = self.username.trim();
        if username.is_empty() || self.password.is_empty() {
            return None;
        }
        Some((username.to_string(), self.password.clone()))
    }

    fn active_field(&mut self) -> &mut String {
        match self.focus {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }
}

// ---------------------------------------------------------------------------
// Toasts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    pub created: Instant,
}

#[derive(Debug, Default)]
pub struct Toasts {
    pub items: Vec<Toast>,
}

impl Toasts {
    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>) {
        self.push_at(kind, message, Instant::now());
    }

    pub fn push_at(&mut self, kind: ToastKind, message: impl Into<String>, created: Instant) {
        self.items.push(Toast { kind, message: message.into(), created });
    }

    /// Drop toasts older than [`TOAST_TTL`]. Returns whether any were removed.
    pub fn expire(&mut self, now: Instant) -> bool {
        let before = self.items.len();
        self.items
            .retain(|t| now.saturating_duration_since(t.created) < TOAST_TTL);
        self.items.len() != before
    }

    pub fn latest(&self) -> Option<&Toast> {
        self.items.last()
    }
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub should_quit: bool,
    pub last_error: Option<String>,
    pub session: Session,
    pub dashboard: Option<Dashboard>,
    pub week: WeekState,
    pub leaderboard: Vec<RankedEntry>,
    pub history: HistoryState,
    pub login: LoginForm,
    pub toasts: Toasts,
    /// Latest countdown state; `None` until the first tick or after teardown.
    pub countdown: Option<CountdownState>,
}

impl AppState {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pool_api::eligibility::{ReasonCode, UserPickState};
    use pool_api::Team;

    fn team(id: TeamId, name: &str) -> Team {
        Team { id, name: name.into(), ..Default::default() }
    }

    fn fixture(id: MatchId, home: Team, away: Team, started: bool) -> Match {
        Match { id, week: 3, home, away, is_game_started: started, ..Default::default() }
    }

    fn snapshot(week: u32) -> WeekSnapshot {
        WeekSnapshot {
            week,
            weeks: vec![1, 2, 3],
            matches: vec![
                fixture(1, team(10, "Bills"), team(11, "Jets"), false),
                fixture(2, team(12, "Lions"), team(13, "Bears"), true),
            ],
            picks: Vec::new(),
            state: UserPickState::default(),
        }
    }

    #[test]
    fn loading_a_week_resolves_every_team() {
        let mut week = WeekState::default();
        week.load(snapshot(3));

        assert_eq!(week.decisions.len(), 4);
        let started = week.decision(&week.matches()[1]);
        assert_eq!(started.home.reason, ReasonCode::GameStarted);
        assert_eq!(started.away.reason, ReasonCode::GameStarted);
        assert!(!week.decision(&week.matches()[0]).home.disabled);
    }

    #[test]
    fn cursor_survives_a_reload_but_not_a_week_change() {
        let mut week = WeekState::default();
        week.load(snapshot(3));
        week.select_next_match();
        week.select_side(Side::Home);

        week.load(snapshot(3));
        assert_eq!(week.selected_match, 1);
        assert_eq!(week.selected_side, Side::Home);

        week.load(snapshot(2));
        assert_eq!(week.selected_match, 0);
        assert_eq!(week.selected_side, Side::Away);
    }

    #[test]
    fn cursor_stays_within_the_week() {
        let mut week = WeekState::default();
        week.load(snapshot(3));
        week.select_next_match();
        week.select_next_match();
        assert_eq!(week.selected_match, 1);
        week.select_prev_match();
        week.select_prev_match();
        assert_eq!(week.selected_match, 0);
    }

    #[test]
    fn adjacent_weeks_follow_the_selector() {
        let mut week = WeekState::default();
        assert_eq!(week.adjacent_week(true), None);

        week.load(snapshot(2));
        assert_eq!(week.adjacent_week(true), Some(3));
        assert_eq!(week.adjacent_week(false), Some(1));

        week.load(snapshot(3));
        assert_eq!(week.adjacent_week(true), None);
    }

    #[test]
    fn toasts_expire_after_their_ttl() {
        let start = Instant::now();
        let mut toasts = Toasts::default();
        toasts.push_at(ToastKind::Info, "first", start);
        toasts.push_at(ToastKind::Error, "second", start + Duration::from_secs(2));

        assert!(!toasts.expire(start + Duration::from_secs(1)));
        assert!(toasts.expire(start + Duration::from_secs(3)));
        assert_eq!(toasts.items.len(), 1);
        assert_eq!(toasts.latest().map(|t| t.message.as_str()), Some("second"));
        assert!(toasts.expire(start + Duration::from_secs(5)));
        assert!(toasts.latest().is_none());
    }

    #[test]
    fn login_form_edits_the_focused_field() {
        let mut form = LoginForm::default();
        form.open();
        "anna".chars().for_each(|c| form.push(c));
        form.toggle_focus();
        "pw".chars().for_each(|c| form.push(c));
        form.backspace();
        assert_eq!(form.username, "anna");
        assert_eq!(form.password, "p");
        assert_eq!(form.credentials(), Some(("anna".into(), "p".into())));

        form.close();
        assert!(form.password.is_empty());
        assert_eq!(form.credentials(), None);

        form.open();
        assert_eq!(form.focus, LoginField::Password);
    }
}
