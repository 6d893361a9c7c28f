use crate::app::{App, MenuItem};
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pool_api::Side;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;
    let mut requests: Vec<NetworkRequest> = Vec::new();

    if let (Char('c'), KeyModifiers::CONTROL) = (key_event.code, key_event.modifiers) {
        guard.quit();
        return;
    }

    // Login overlay captures all input.
    if guard.state.login.visible {
        match key_event.code {
            KeyCode::Esc => guard.state.login.close(),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                guard.state.login.toggle_focus()
            }
            KeyCode::Backspace => guard.state.login.backspace(),
            KeyCode::Enter => requests.extend(guard.submit_login()),
            Char(c) => guard.state.login.push(c),
            _ => {}
        }
        drop(guard);
        send_all(network_requests, requests).await;
        return;
    }

    // Pending pick confirmation.
    if guard.state.week.pending.is_some() {
        match key_event.code {
            Char('y') | KeyCode::Enter => requests.extend(guard.confirm_pick()),
            Char('n') | KeyCode::Esc => guard.cancel_pick(),
            _ => {}
        }
        drop(guard);
        send_all(network_requests, requests).await;
        return;
    }

    let previous_tab = guard.state.active_tab;

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) => guard.quit(),

        // Tab switching
        (_, Char('1'), _) => guard.update_tab(MenuItem::Dashboard),
        (_, Char('2'), _) => guard.update_tab(MenuItem::Picks),
        (_, Char('3'), _) => guard.update_tab(MenuItem::Leaderboard),
        (_, Char('4'), _) => guard.update_tab(MenuItem::AllPicks),
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Session
        (_, Char('i'), _) => guard.open_login(),
        (_, Char('L'), _) => requests.extend(guard.logout()),
        (_, Char('r'), _) => requests.extend(guard.requests_for_active_tab()),

        // Picks
        (MenuItem::Picks, Char('j') | KeyCode::Down, _) => guard.state.week.select_next_match(),
        (MenuItem::Picks, Char('k') | KeyCode::Up, _) => guard.state.week.select_prev_match(),
        (MenuItem::Picks, Char('h') | KeyCode::Left, _) => guard.select_side(Side::Away),
        (MenuItem::Picks, Char('l') | KeyCode::Right, _) => guard.select_side(Side::Home),
        (MenuItem::Picks, KeyCode::Enter, _) => guard.request_pick(),
        (MenuItem::Picks, Char('['), _) => requests.extend(guard.change_week(false)),
        (MenuItem::Picks, Char(']'), _) => requests.extend(guard.change_week(true)),

        // All picks
        (MenuItem::AllPicks, Char('j') | KeyCode::Down, _) => guard.history_scroll_down(),
        (MenuItem::AllPicks, Char('k') | KeyCode::Up, _) => guard.history_scroll_up(),
        (MenuItem::AllPicks, Char('p'), _) => guard.toggle_privacy(),

        // Global
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }

    if guard.state.active_tab != previous_tab {
        requests.extend(guard.requests_for_active_tab());
    }

    drop(guard);
    send_all(network_requests, requests).await;
}

async fn send_all(network_requests: &mpsc::Sender<NetworkRequest>, requests: Vec<NetworkRequest>) {
    for request in requests {
        let _ = network_requests.send(request).await;
    }
}
