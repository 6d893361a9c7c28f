use chrono_tz::Tz;
use pool_api::eligibility::{EligibilityDecision, MatchDecision};
use pool_api::{Match, MatchStatus, Side};
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Modifier, Style};
use tui::widgets::Widget;

use crate::components::theme::{Tone, resolve};

/// Rows per card: header, away team, home team.
pub const CARD_HEIGHT: u16 = 3;

/// One fixture of the picks view, drawn from the resolver's decision.
pub struct MatchCard<'a> {
    pub fixture: &'a Match,
    pub decision: MatchDecision,
    /// Side under the cursor, when this card is focused.
    pub focused: Option<Side>,
    /// Away, home: the team was the implied loser of an earlier pick.
    pub loser_used: [bool; 2],
    pub tz: Tz,
}

impl MatchCard<'_> {
    fn header(&self) -> (String, Tone) {
        let kickoff = self
            .fixture
            .start_time
            .map(|t| t.with_timezone(&self.tz).format("%a %d.%m. %H:%M").to_string())
            .unwrap_or_else(|| "TBD".to_string());

        match (&self.fixture.status, self.fixture.score) {
            (MatchStatus::Completed, Some((home, away))) => {
                (format!("{kickoff}  FINAL {away}-{home}"), Tone::Dim)
            }
            _ if self.fixture.is_completed => (format!("{kickoff}  FINAL"), Tone::Dim),
            _ if self.fixture.is_game_started => (format!("{kickoff}  STARTED"), Tone::Negative),
            _ => (kickoff, Tone::Primary),
        }
    }

    fn team_row(&self, side: Side) -> (String, Style, String) {
        let team = self.fixture.team(side);
        let decision: &EligibilityDecision = self.decision.side(side);
        let cursor = if self.focused == Some(side) { '>' } else { ' ' };
        let check = if decision.selected { '✓' } else { ' ' };

        let mut badges: Vec<String> = Vec::new();
        if self.fixture.is_winner(team.id) {
            badges.push("W".to_string());
        }
        let loser_flag = match side {
            Side::Away => self.loser_used[0],
            Side::Home => self.loser_used[1],
        };
        if loser_flag {
            badges.push("lost once".to_string());
        }
        if let Some(count) = decision.usage_badge {
            badges.push(format!("{count}x"));
        }
        if decision.disabled {
            badges.push(decision.reason.tag().to_string());
        }

        let style = if decision.selected {
            resolve(Tone::Selected)
        } else if decision.disabled {
            resolve(Tone::Dim).add_modifier(Modifier::CROSSED_OUT)
        } else if self.focused == Some(side) {
            resolve(Tone::Accent)
        } else {
            Style::default()
        };

        let marker = if side == Side::Home { '@' } else { ' ' };
        let label = format!("{cursor}{check}{marker}{} ({})", team.name, team.abbrev);
        (label, style, badges.join(" "))
    }
}

impl Widget for MatchCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 4 || area.height == 0 {
            return;
        }
        let width = area.width as usize;

        let (header, tone) = self.header();
        buf.set_stringn(area.x, area.y, header, width, resolve(tone));

        for (row, side) in [Side::Away, Side::Home].into_iter().enumerate() {
            let y = area.y + 1 + row as u16;
            if y >= area.y + area.height {
                break;
            }
            let (label, style, badges) = self.team_row(side);
            let (end_x, _) = buf.set_stringn(area.x, y, label, width, style);
            if !badges.is_empty() && end_x + 2 < area.x + area.width {
                let room = (area.x + area.width - end_x - 2) as usize;
                buf.set_stringn(end_x + 2, y, badges, room, resolve(Tone::Warning));
            }
        }
    }
}
