use tui::layout::{Constraint, Layout, Rect, Size};
pub const TAB_BAR_HEIGHT: u16 = 3;
pub const COUNTDOWN_HEIGHT: u16 = 1;
pub const LOG_PANE_HEIGHT: u16 = 8;

/// Pre-computed layout areas for the main draw loop.
pub struct LayoutAreas {
    pub tab_bar: [Rect; 2],
    /// Zero-sized on views without the countdown.
    pub countdown: Rect,
    pub main: Rect,
    /// Zero-sized unless the log pane is open.
    pub logs: Rect,
}

impl LayoutAreas {
    pub fn new(size: Size) -> Self {
        let rect = Rect::new(0, 0, size.width, size.height);
        Self::from_rect(rect, false, false, false)
    }

    pub fn update(&mut self, area: Rect, full_screen: bool, countdown: bool, logs: bool) {
        *self = Self::from_rect(area, full_screen, countdown, logs);
    }

    fn from_rect(area: Rect, full_screen: bool, countdown: bool, logs: bool) -> Self {
        let tab_height = if full_screen { 0 } else { TAB_BAR_HEIGHT };
        let countdown_height = if countdown { COUNTDOWN_HEIGHT } else { 0 };
        let log_height = if logs { LOG_PANE_HEIGHT } else { 0 };

        let [tab, countdown, main, logs] = Layout::vertical([
            Constraint::Length(tab_height),
            Constraint::Length(countdown_height),
            Constraint::Fill(1),
            Constraint::Length(log_height),
        ])
        .areas(area);

        LayoutAreas {
            tab_bar: if full_screen {
                [Rect::ZERO, Rect::ZERO]
            } else {
                Self::split_tab_bar(tab)
            },
            countdown,
            main,
            logs,
        }
    }

    fn split_tab_bar(area: Rect) -> [Rect; 2] {
        Layout::horizontal([Constraint::Percentage(85), Constraint::Percentage(15)]).areas(area)
    }
}
