use tui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tone {
    Primary,
    Accent,
    Dim,
    Positive,
    Negative,
    Warning,
    Selected,
}

pub fn resolve(tone: Tone) -> Style {
    match tone {
        Tone::Primary => Style::default().fg(Color::Rgb(0, 122, 195)),
        Tone::Accent => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        Tone::Dim => Style::default().fg(Color::Indexed(240)),
        Tone::Positive => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        Tone::Negative => Style::default().fg(Color::Red),
        Tone::Warning => Style::default().fg(Color::Rgb(255, 103, 31)),
        Tone::Selected => Style::default()
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD),
    }
}
