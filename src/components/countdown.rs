use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::widgets::Widget;

use crate::components::theme::{Tone, resolve};
use crate::state::countdown::CountdownState;

const FIELD_LABELS: [&str; 4] = ["days", "hrs", "min", "sec"];

/// One-line strip showing the time left until picks lock.
pub struct CountdownStrip<'a> {
    pub state: Option<CountdownState>,
    pub deadline_label: &'a str,
}

impl Widget for CountdownStrip<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let mut x = area.x + 1;
        let y = area.y;
        let right = area.x + area.width;
        let mut put = |x: &mut u16, text: &str, tone: Tone| {
            if *x >= right {
                return;
            }
            let max = (right - *x) as usize;
            let (end_x, _) = buf.set_stringn(*x, y, text, max, resolve(tone));
            *x = end_x;
        };

        match self.state {
            None => put(&mut x, "Deadline countdown unavailable", Tone::Dim),
            Some(CountdownState::Elapsed) => {
                put(&mut x, "Week has started! ", Tone::Negative);
                put(&mut x, "Picks for the running games are locked.", Tone::Dim);
            }
            Some(CountdownState::Counting(remaining)) => {
                put(&mut x, "Picks lock in ", Tone::Dim);
                for (value, label) in remaining.fields().iter().zip(FIELD_LABELS) {
                    put(&mut x, value, Tone::Accent);
                    put(&mut x, &format!(" {label}  "), Tone::Dim);
                }
                put(&mut x, &format!("({})", self.deadline_label), Tone::Dim);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::countdown::Remaining;

    fn rendered(state: Option<CountdownState>) -> String {
        let area = Rect::new(0, 0, 90, 1);
        let mut buf = Buffer::empty(area);
        CountdownStrip { state, deadline_label: "Sun 19:00 Europe/Vienna" }.render(area, &mut buf);
        (0..area.width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect::<String>()
    }

    #[test]
    fn counting_shows_padded_fields() {
        let line = rendered(Some(CountdownState::Counting(Remaining {
            days: 3,
            hours: 9,
            minutes: 0,
            seconds: 5,
        })));
        assert!(line.contains("03 days  09 hrs  00 min  05 sec"), "{line}");
        assert!(line.contains("(Sun 19:00 Europe/Vienna)"));
    }

    #[test]
    fn elapsed_shows_started_message() {
        let line = rendered(Some(CountdownState::Elapsed));
        assert!(line.starts_with(" Week has started!"), "{line}");
    }
}
