mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::countdown::{CountdownHandle, spawn_countdown};
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crate::state::refresher::PeriodicRefresher;
use chrono::Utc;
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use log::{error, info};
use pool_api::client::PoolApi;
use std::io::Stdout;
use std::sync::Arc;
use std::time::Instant;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tokio::time::Duration;
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if handle_cli_args() {
        return Ok(());
    }

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(log::LevelFilter::Trace)?;
    tui_logger::set_default_level(log::LevelFilter::Info);

    let app = Arc::new(Mutex::new(App::new()));
    let (api_url, deadline, refresh_interval) = {
        let guard = app.lock().await;
        (
            guard.settings.api_url.clone(),
            guard.settings.deadline,
            guard.settings.refresh_interval,
        )
    };
    info!("using pool server at {api_url}");

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(PoolApi::new(api_url), network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Periodic view refresh thread
    let periodic_updater = PeriodicRefresher::new(ui_event_tx.clone(), refresh_interval);
    let periodic_task = tokio::spawn(periodic_updater.run());

    // Deadline countdown, one tick per second until it elapses
    let mut countdown = spawn_countdown(deadline, Utc::now, ui_event_tx.clone());

    // Housekeeping tick for toast expiry
    let tick_tx = ui_event_tx.clone();
    let tick_task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(500));
        loop {
            interval.tick().await;
            if tick_tx.send(UiEvent::Tick).await.is_err() {
                break;
            }
        }
    });

    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(
        terminal,
        app.clone(),
        ui_event_rx,
        network_req_tx,
        network_resp_rx,
    )
    .await;

    teardown_countdown(&mut countdown, &app).await;
    input_handler.abort();
    network_task.abort();
    periodic_task.abort();
    tick_task.abort();

    cleanup_terminal();
    // The input task may still be parked in a blocking read.
    std::process::exit(0)
}

fn handle_cli_args() -> bool {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return false;
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            true
        }
        "-V" | "--version" => {
            println!("pooltui {}", env!("CARGO_PKG_VERSION"));
            true
        }
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn usage_text() -> &'static str {
    "pooltui - survivor pick'em pool in your terminal

Usage:
  pooltui
  pooltui --help
  pooltui --version

Environment:
  POOLTUI_API_URL       Pool server base URL (default http://127.0.0.1:5000)
  POOLTUI_TIMEZONE      Deadline and kickoff timezone (default Europe/Vienna)
  POOLTUI_DEADLINE      Weekly pick deadline, weekday and hour (default \"sun 19\")
  POOLTUI_REFRESH_SECS  Seconds between automatic reloads (default 60)
  POOLTUI_LOG           Log level: error, warn, info, debug, trace"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &network_requests).await;
                let mut app_guard = app.lock().await;
                if app_guard.state.should_quit {
                    break;
                }
                if should_redraw && !loading.is_loading {
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw =
                    handle_network_response(response, &app, &network_requests, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            else => break,
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            // A stored session is verified before any user data is loaded.
            let requests = {
                let guard = app.lock().await;
                if guard.state.session.is_logged_in() {
                    vec![NetworkRequest::RestoreSession]
                } else {
                    guard.requests_for_active_tab()
                }
            };
            for request in requests {
                let _ = network_requests.send(request).await;
            }
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            true
        }
        UiEvent::Resize => true,
        UiEvent::CountdownTick(state) => {
            app.lock().await.on_countdown_tick(state);
            true
        }
        UiEvent::RefreshDue => {
            let requests = app.lock().await.requests_for_active_tab();
            for request in requests {
                let _ = network_requests.send(request).await;
            }
            false
        }
        UiEvent::Tick => app.lock().await.expire_toasts(Instant::now()),
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    loading: &mut LoadingState,
) -> bool {
    let mut follow_ups = Vec::new();
    match response {
        NetworkResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
            return true;
        }
        NetworkResponse::SessionRestored { user } => {
            let mut guard = app.lock().await;
            guard.on_session_restored(user);
            follow_ups = guard.requests_for_active_tab();
        }
        NetworkResponse::LoggedIn { user } => {
            let mut guard = app.lock().await;
            guard.on_logged_in(user);
            follow_ups = guard.requests_for_active_tab();
        }
        NetworkResponse::LoggedOut => {
            app.lock().await.on_logged_out();
        }
        NetworkResponse::DashboardLoaded { dashboard } => {
            app.lock().await.on_dashboard_loaded(dashboard);
        }
        NetworkResponse::WeekLoaded { snapshot } => {
            app.lock().await.on_week_loaded(snapshot);
        }
        NetworkResponse::PickSubmitted { user_id, week, message } => {
            app.lock().await.on_pick_submitted(message);
            follow_ups = vec![
                NetworkRequest::LoadWeek { user_id, week: Some(week) },
                NetworkRequest::LoadDashboard { user_id },
            ];
        }
        NetworkResponse::LeaderboardLoaded { entries } => {
            app.lock().await.on_leaderboard_loaded(entries);
        }
        NetworkResponse::PickHistoryLoaded { history } => {
            app.lock().await.on_pick_history_loaded(history);
        }
        NetworkResponse::Error { message } => {
            error!("Network error: {message}");
            app.lock().await.on_error(message);
        }
    }
    for request in follow_ups {
        let _ = network_requests.send(request).await;
    }
    !loading.is_loading
}

async fn teardown_countdown(countdown: &mut CountdownHandle, app: &Arc<Mutex<App>>) {
    countdown.cancel();
    app.lock().await.release_countdown();
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
