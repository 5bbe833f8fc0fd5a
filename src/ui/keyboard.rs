use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use touchtype::{
    hints::{KeyHighlight, KeyHints},
    layout::{KeyboardLayout, SPACE_LABEL},
};

/// Rows of the keyboard plus the space bar
pub const KEYBOARD_HEIGHT: u16 = 5;

const SPACE_BAR_WIDTH: usize = 29;

/// On-screen keyboard with the next key and weak keys highlighted
pub struct KeyboardWidget<'a> {
    layout: KeyboardLayout,
    hints: &'a KeyHints,
}

impl<'a> KeyboardWidget<'a> {
    pub fn new(layout: KeyboardLayout, hints: &'a KeyHints) -> Self {
        Self { layout, hints }
    }

    fn key_style(&self, c: char) -> Style {
        match self.hints.highlight_for(c) {
            Some(KeyHighlight::Next) => Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            Some(KeyHighlight::Weak) => Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
            None => Style::default().add_modifier(Modifier::DIM),
        }
    }

    pub fn lines(&self) -> Vec<Line<'static>> {
        let mut lines: Vec<Line> = self
            .layout
            .rows()
            .iter()
            .enumerate()
            .map(|(row_idx, row)| {
                // stagger rows the way a physical keyboard does
                let mut spans = vec![Span::raw(" ".repeat(row_idx * 2))];
                for label in row.iter() {
                    let c = label.chars().next().unwrap_or(' ');
                    spans.push(Span::styled(format!(" {label} "), self.key_style(c)));
                    spans.push(Span::raw(" "));
                }
                Line::from(spans)
            })
            .collect();

        let pad = SPACE_BAR_WIDTH.saturating_sub(SPACE_LABEL.len()) / 2;
        let space_bar = format!(
            "{}{SPACE_LABEL}{}",
            " ".repeat(pad),
            " ".repeat(SPACE_BAR_WIDTH - SPACE_LABEL.len() - pad)
        );
        lines.push(Line::from(Span::styled(space_bar, self.key_style(' '))));

        lines
    }
}

impl Widget for KeyboardWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.lines())
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}
