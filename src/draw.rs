use log::error;
use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::countdown::CountdownStrip;
use crate::components::match_card::{CARD_HEIGHT, MatchCard};
use crate::components::theme::{Tone, resolve};
use crate::state::app_state::{LoginField, ToastKind};
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use pool_api::{PickOutcome, Side};

static TABS: &[&str; 4] = &["Dashboard", "Picks", "Leaderboard", "All Picks"];

const HELP_TEXT: &[&str] = &[
    "Global",
    "  1-4        switch view            ?   help (Esc to leave)",
    "  r          reload view            f   full screen",
    "  i          log in                 L   log out",
    "  \"          toggle log pane        q   quit",
    "",
    "Picks",
    "  j/k        previous/next match    h/l away/home team",
    "  Enter      pick the team          y/n confirm or cancel",
    "  [ / ]      previous/next week",
    "",
    "All Picks",
    "  j/k        scroll                 p   show/hide current week",
    "",
    "Markers",
    "  ✓ your pick   W winner   1x picked as winner once   lost once  loser already used",
    "  OUT eliminated   2x winner limit reached   L-USED opponent already lost   LOCKED started",
];

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        let show_countdown = matches!(app.state.active_tab, MenuItem::Dashboard | MenuItem::Picks);
        layout.update(
            f.area(),
            app.settings.full_screen,
            show_countdown,
            app.state.show_logs,
        );

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        if show_countdown {
            let label = app.settings.deadline.label();
            f.render_widget(
                CountdownStrip { state: app.state.countdown, deadline_label: &label },
                layout.countdown,
            );
        }

        match app.state.active_tab {
            MenuItem::Dashboard => draw_dashboard(f, layout.main, app),
            MenuItem::Picks => draw_picks(f, layout.main, app),
            MenuItem::Leaderboard => draw_leaderboard(f, layout.main, app),
            MenuItem::AllPicks => draw_all_picks(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main),
        }

        if app.state.show_logs {
            f.render_widget(
                TuiLoggerWidget::default().block(default_border(Color::DarkGray).title(" Logs ")),
                layout.logs,
            );
        }

        if app.state.login.visible {
            draw_login(f, f.area(), app);
        } else if app.state.week.pending.is_some() {
            draw_confirm(f, f.area(), app);
        }

        draw_toasts(f, f.area(), app);
        draw_loading_spinner(f, f.area(), app, loading);
    });

    if let Err(e) = result {
        error!("draw failed: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Dashboard => 0,
        MenuItem::Picks => 1,
        MenuItem::Leaderboard => 2,
        MenuItem::AllPicks => 3,
        MenuItem::Help => 0,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let who = app
        .state
        .session
        .user()
        .map_or("guest", |u| u.username.as_str());
    let help = Paragraph::new(format!("{who} | ? "))
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

/// Placeholder text for views that have nothing to show yet.
fn empty_message(app: &App, what: &str) -> String {
    match app.state.last_error.as_deref() {
        Some(err) => format!("{what} failed to load:\n{err}\n\nPress r to retry."),
        None => format!("Loading {what}..."),
    }
}

fn draw_dashboard(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Dashboard ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(user) = app.state.session.user() else {
        draw_placeholder(f, inner, "Log in to see your dashboard (press i)");
        return;
    };
    let Some(dashboard) = app.state.dashboard.as_ref() else {
        draw_placeholder(f, inner, &empty_message(app, "dashboard"));
        return;
    };

    let [left, right] =
        Layout::horizontal([Constraint::Percentage(45), Constraint::Fill(1)]).areas(inner);

    let heading = Style::default().add_modifier(Modifier::BOLD);
    let rank = dashboard
        .rank
        .map_or("-".to_string(), |r| format!("#{r}"));

    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("{}  ", user.username), heading),
            Span::styled("score ", resolve(Tone::Dim)),
            Span::styled(dashboard.score.user.score.to_string(), resolve(Tone::Accent)),
            Span::styled("  rank ", resolve(Tone::Dim)),
            Span::styled(rank, resolve(Tone::Accent)),
        ]),
        Line::from(""),
        Line::styled("Opponents", heading),
    ];
    if dashboard.score.opponents.is_empty() {
        lines.push(Line::styled("  no opponents yet", resolve(Tone::Dim)));
    }
    for opponent in &dashboard.score.opponents {
        lines.push(Line::from(format!(
            "  {:<18} {:>3}",
            opponent.username, opponent.score
        )));
    }
    f.render_widget(Paragraph::new(lines), left);

    let mut lines = vec![Line::styled("Recent picks", heading)];
    if dashboard.recent_picks.is_empty() {
        lines.push(Line::styled("  no picks yet", resolve(Tone::Dim)));
    }
    for pick in &dashboard.recent_picks {
        lines.push(Line::from(vec![
            Span::raw(format!("  Week {:>2}  {:<24} ", pick.week, pick.team)),
            Span::styled(pick.outcome.label(), outcome_style(pick.outcome)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::styled("Eliminated teams", heading));
    if dashboard.eliminated.is_empty() {
        lines.push(Line::styled("  none", resolve(Tone::Dim)));
    } else {
        let names: Vec<&str> = dashboard.eliminated.iter().map(|t| t.name.as_str()).collect();
        lines.push(Line::styled(format!("  {}", names.join(", ")), resolve(Tone::Negative)));
    }
    f.render_widget(Paragraph::new(lines), right);
}

fn outcome_style(outcome: PickOutcome) -> Style {
    match outcome {
        PickOutcome::Pending => resolve(Tone::Dim),
        PickOutcome::Correct => resolve(Tone::Positive),
        PickOutcome::Incorrect => resolve(Tone::Negative),
    }
}

fn draw_picks(f: &mut Frame, area: Rect, app: &App) {
    let week = &app.state.week;
    let title = week.week().map_or(" Picks ".to_string(), |w| format!(" Picks: Week {w} "));
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if !app.state.session.is_logged_in() {
        draw_placeholder(f, inner, "Log in to make your picks (press i)");
        return;
    }
    let Some(snapshot) = week.snapshot.as_ref() else {
        draw_placeholder(f, inner, &empty_message(app, "matches"));
        return;
    };
    if inner.height < 4 {
        return;
    }

    let [selector_area, info_area, cards_area, legend_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(2),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let mut selector = vec![Span::styled("Weeks  ", resolve(Tone::Dim))];
    for w in &snapshot.weeks {
        let style = if *w == snapshot.week {
            resolve(Tone::Accent).add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        selector.push(Span::styled(format!(" {w} "), style));
    }
    selector.push(Span::styled("   [ / ] change week", resolve(Tone::Dim)));
    f.render_widget(Paragraph::new(Line::from(selector)), selector_area);

    let info = match snapshot.picks.first() {
        Some(pick) => Line::from(vec![
            Span::raw(format!("Your pick for week {}: ", snapshot.week)),
            Span::styled(pick.chosen.name.clone(), resolve(Tone::Positive)),
            Span::styled("  (pick another team to switch)", resolve(Tone::Dim)),
        ]),
        None => Line::styled(
            format!("Choose ONE team to win in week {}", snapshot.week),
            resolve(Tone::Accent),
        ),
    };
    f.render_widget(Paragraph::new(info), info_area);

    if snapshot.matches.is_empty() {
        draw_placeholder(f, cards_area, "No matches scheduled for this week");
    } else {
        draw_match_cards(f, cards_area, app);
    }

    f.render_widget(
        Paragraph::new("j/k match  h/l team  Enter pick  ? legend")
            .style(resolve(Tone::Dim)),
        legend_area,
    );
}

fn draw_match_cards(f: &mut Frame, area: Rect, app: &App) {
    let week = &app.state.week;
    let Some(snapshot) = week.snapshot.as_ref() else {
        return;
    };
    let slot = CARD_HEIGHT + 1;
    let visible = (area.height / slot).max(1) as usize;
    let first = week.selected_match.saturating_sub(visible - 1);
    let losers = &snapshot.state.loser_usage_team_ids;

    for (row, (idx, fixture)) in snapshot
        .matches
        .iter()
        .enumerate()
        .skip(first)
        .take(visible)
        .enumerate()
    {
        let y = area.y + row as u16 * slot;
        let height = CARD_HEIGHT.min(area.y + area.height - y);
        let card_area = Rect::new(area.x + 1, y, area.width.saturating_sub(2), height);
        let focused = (idx == week.selected_match).then_some(week.selected_side);
        f.render_widget(
            MatchCard {
                fixture,
                decision: week.decision(fixture),
                focused,
                loser_used: [
                    losers.contains(&fixture.team(Side::Away).id),
                    losers.contains(&fixture.team(Side::Home).id),
                ],
                tz: app.settings.deadline.tz,
            },
            card_area,
        );
    }
}

fn draw_leaderboard(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Leaderboard ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.state.leaderboard.is_empty() {
        draw_placeholder(f, inner, &empty_message(app, "leaderboard"));
        return;
    }

    let me = app.state.session.user_id();
    let mut lines = vec![
        Line::styled(
            format!("{:>4}  {:<20} {:>5}", "#", "Player", "Score"),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::from(""),
    ];
    for ranked in &app.state.leaderboard {
        let entry = &ranked.entry;
        let style = if Some(entry.user_id) == me {
            resolve(Tone::Accent)
        } else {
            Style::default()
        };
        lines.push(Line::styled(
            format!(
                "{:>4}  {:<20} {:>5}  {}",
                ranked.rank,
                entry.username,
                entry.score,
                entry.emoji.as_deref().unwrap_or("")
            ),
            style,
        ));
    }
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_all_picks(f: &mut Frame, area: Rect, app: &App) {
    let history = &app.state.history;
    let privacy = if history.hide_current { "hidden" } else { "visible" };
    let block = default_border(Color::White)
        .title(" All Picks ")
        .title_bottom(Line::from(format!(" current week {privacy} (p) ")).right_aligned());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(data) = history.data.as_ref() else {
        draw_placeholder(f, inner, &empty_message(app, "pick history"));
        return;
    };

    let heading = Style::default().add_modifier(Modifier::BOLD);
    let mut lines: Vec<Line> = Vec::new();
    for week in data.weeks(history.hide_current) {
        let status = if week.completed { "final" } else { "in progress" };
        lines.push(Line::from(vec![
            Span::styled(format!("Week {}", week.week), heading),
            Span::styled(format!("  {status}"), resolve(Tone::Dim)),
        ]));
        if week.hidden {
            lines.push(Line::styled(
                "  Picks stay hidden until every game of the week is final",
                resolve(Tone::Dim),
            ));
        }
        for row in &week.rows {
            let line = match &row.pick {
                Some(pick) => Line::from(vec![
                    Span::raw(format!("  {:<18} {:<24} ", row.username, pick.chosen.name)),
                    Span::styled(pick.outcome().label(), outcome_style(pick.outcome())),
                ]),
                None => Line::from(vec![
                    Span::raw(format!("  {:<18} ", row.username)),
                    Span::styled("no pick", resolve(Tone::Dim)),
                ]),
            };
            lines.push(line);
        }
        lines.push(Line::from(""));
    }

    f.render_widget(
        Paragraph::new(lines).scroll((history.scroll_offset, 0)),
        inner,
    );
}

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::White).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);
    let lines: Vec<Line> = HELP_TEXT.iter().map(|l| Line::from(*l)).collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_login(f: &mut Frame, area: Rect, app: &App) {
    let popup = centered(area, 46, 8);
    f.render_widget(Clear, popup);
    let block = default_border(Color::Yellow).title(" Log in ");
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let form = &app.state.login;
    let field_style = |field: LoginField| {
        if form.focus == field {
            resolve(Tone::Accent)
        } else {
            Style::default()
        }
    };
    let cursor = |field: LoginField| if form.focus == field { "_" } else { "" };
    let masked = "*".repeat(form.password.chars().count());

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw(" Username  "),
            Span::styled(
                format!("{}{}", form.username, cursor(LoginField::Username)),
                field_style(LoginField::Username),
            ),
        ]),
        Line::from(vec![
            Span::raw(" Password  "),
            Span::styled(
                format!("{masked}{}", cursor(LoginField::Password)),
                field_style(LoginField::Password),
            ),
        ]),
        Line::from(""),
        Line::styled(" Tab switch  Enter log in  Esc close", resolve(Tone::Dim)),
    ];
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_confirm(f: &mut Frame, area: Rect, app: &App) {
    let Some(pending) = app.state.week.pending.as_ref() else {
        return;
    };
    let question = format!("Pick {} for week {}?", pending.team_name, pending.week);
    let width = (question.chars().count() as u16 + 6).max(30);
    let popup = centered(area, width, 5);
    f.render_widget(Clear, popup);
    let block = default_border(Color::Yellow).title(" Confirm pick ");
    let inner = block.inner(popup);
    f.render_widget(block, popup);
    f.render_widget(
        Paragraph::new(vec![
            Line::from(question),
            Line::from(""),
            Line::styled("y confirm   n cancel", resolve(Tone::Dim)),
        ])
        .alignment(Alignment::Center),
        inner,
    );
}

fn draw_toasts(f: &mut Frame, area: Rect, app: &App) {
    let toasts = &app.state.toasts.items;
    let mut bottom = area.y + area.height;
    for toast in toasts.iter().rev().take(3) {
        let width = (toast.message.chars().count() as u16 + 4).min(area.width.saturating_sub(2));
        if bottom < area.y + 3 || width < 5 {
            break;
        }
        let rect = Rect::new(area.x + area.width - width - 1, bottom - 3, width, 3);
        let color = match toast.kind {
            ToastKind::Success => Color::Green,
            ToastKind::Error => Color::Red,
            ToastKind::Warning => Color::Yellow,
            ToastKind::Info => Color::Cyan,
        };
        f.render_widget(Clear, rect);
        f.render_widget(
            Paragraph::new(toast.message.as_str())
                .style(Style::default().fg(color))
                .block(default_border(color)),
            rect,
        );
        bottom -= 3;
    }
}

fn draw_placeholder(f: &mut Frame, area: Rect, msg: &str) {
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        area,
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
