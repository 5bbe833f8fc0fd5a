pub mod charting;
pub mod keyboard;
pub mod screen;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Chart, Dataset, GraphType, List, ListItem, ListState, Paragraph,
        Wrap,
    },
    Frame,
};
use touchtype::{metrics::CharStatus, RenderSnapshot};
use unicode_width::UnicodeWidthStr;

use crate::{
    ui::{
        charting::{compute_chart_params, format_label},
        keyboard::{KeyboardWidget, KEYBOARD_HEIGHT},
    },
    App,
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

fn bold_style() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim_bold_style() -> Style {
    bold_style().add_modifier(Modifier::DIM)
}

fn italic_style() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

pub fn render_menu(app: &App, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    let header = Paragraph::new(vec![
        Line::from(Span::styled("touchtype", bold_style().fg(Color::Magenta))),
        Line::from(Span::styled("choose an exercise", dim_bold_style())),
    ]);
    f.render_widget(header, chunks[0]);

    let items: Vec<ListItem> = app
        .catalog
        .exercises()
        .iter()
        .map(|exercise| {
            ListItem::new(Line::from(vec![
                Span::styled(exercise.title.clone(), bold_style()),
                Span::styled(
                    format!(
                        "  {}, {}",
                        plural(exercise.line_count(), "line"),
                        exercise.layout
                    ),
                    Style::default().add_modifier(Modifier::DIM),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .highlight_style(bold_style().fg(Color::Blue))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(app.selected));
    f.render_stateful_widget(list, chunks[1], &mut state);

    if let Some(status) = &app.status {
        let status = Paragraph::new(Span::styled(status.clone(), Style::default().fg(Color::Red)));
        f.render_widget(status, chunks[2]);
    }

    let legend = Paragraph::new(Span::styled(
        "(↑/↓) select / (enter) start / (?) help / (q)uit",
        italic_style(),
    ));
    f.render_widget(legend, chunks[3]);
}

fn target_spans(snapshot: &RenderSnapshot) -> Vec<Span<'static>> {
    let Some(line) = &snapshot.current_line else {
        return vec![];
    };
    let cursor = snapshot.typed.chars().count();

    line.chars()
        .zip(snapshot.statuses.iter())
        .enumerate()
        .map(|(idx, (expected, status))| match status {
            CharStatus::Correct => {
                Span::styled(expected.to_string(), bold_style().fg(Color::Green))
            }
            CharStatus::Incorrect => Span::styled(
                match expected {
                    ' ' => "·".to_owned(),
                    c => c.to_string(),
                },
                bold_style().fg(Color::Red).add_modifier(Modifier::UNDERLINED),
            ),
            CharStatus::Pending if idx == cursor => Span::styled(
                expected.to_string(),
                dim_bold_style().add_modifier(Modifier::UNDERLINED),
            ),
            CharStatus::Pending => Span::styled(expected.to_string(), dim_bold_style()),
        })
        .collect()
}

pub fn render_typing(app: &App, f: &mut Frame) {
    let Some(session) = &app.session else {
        return;
    };
    let snapshot = session.snapshot();
    let keyboard_height = if app.config.show_keyboard {
        KEYBOARD_HEIGHT
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1),               // title
            Constraint::Length(1),               // live stats
            Constraint::Length(1),               // padding
            Constraint::Length(3),               // target line
            Constraint::Length(3),               // input
            Constraint::Length(1),               // padding
            Constraint::Length(keyboard_height), // keyboard
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(f.area());

    let title = Paragraph::new(Line::from(vec![
        Span::styled(snapshot.title.clone(), bold_style()),
        Span::styled(
            format!(
                "  line {}/{}",
                (snapshot.line_index + 1).min(snapshot.line_count),
                snapshot.line_count
            ),
            dim_bold_style(),
        ),
    ]));
    f.render_widget(title, chunks[0]);

    let stats = Paragraph::new(Span::styled(
        format!(
            "{:.1}s   {:.0} wpm   {}   {} left",
            snapshot.elapsed_secs,
            snapshot.wpm,
            plural(snapshot.mistake_count, "mistake"),
            plural(snapshot.lines_left, "line"),
        ),
        Style::default().fg(Color::Cyan),
    ));
    f.render_widget(stats, chunks[1]);

    let line_width = snapshot.current_line.as_deref().map_or(0, UnicodeWidthStr::width);
    let target = Paragraph::new(Line::from(target_spans(&snapshot)))
        .alignment(if line_width <= chunks[3].width as usize {
            // a line that fits is centred over the input field
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: false });
    f.render_widget(target, chunks[3]);

    let input = Paragraph::new(Line::from(vec![
        Span::raw(snapshot.typed.clone()),
        Span::styled("▏", Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ]))
    .block(Block::default().borders(Borders::ALL).title(" type here "));
    f.render_widget(input, chunks[4]);

    if app.config.show_keyboard {
        f.render_widget(
            KeyboardWidget::new(snapshot.layout, &snapshot.hints),
            chunks[6],
        );
    }

    let legend = Paragraph::new(Span::styled(
        "(esc) back to exercises / (ctrl+w) delete word",
        italic_style(),
    ));
    f.render_widget(legend, chunks[8]);
}

pub fn render_results(app: &App, f: &mut Frame) {
    let Some(session) = &app.session else {
        return;
    };
    let Some(results) = session.results() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),    // chart
            Constraint::Length(1), // title
            Constraint::Length(1), // stats
            Constraint::Length(1), // performance message
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
        ])
        .split(f.area());

    let history = session.wpm_history();
    let (overall_duration, highest_wpm) = compute_chart_params(history, results.elapsed_secs);
    let tuples = history.as_tuples();
    let datasets = vec![Dataset::default()
        .marker(Marker::Braille)
        .style(Style::default().fg(Color::Magenta))
        .graph_type(GraphType::Line)
        .data(&tuples)];

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([0.0, overall_duration])
                .labels(vec![
                    Span::styled("0", bold_style()),
                    Span::styled(format_label(overall_duration), bold_style()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, highest_wpm])
                .labels(vec![
                    Span::styled("0", bold_style()),
                    Span::styled(format_label(highest_wpm), bold_style()),
                ]),
        );
    f.render_widget(chart, chunks[0]);

    let title = Paragraph::new(Span::styled(results.title.clone(), dim_bold_style()))
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[1]);

    let stats = Paragraph::new(Span::styled(
        format!(
            "{:.1} wpm   {:.1}% acc   {:.1}s   {}",
            results.wpm,
            results.accuracy,
            results.elapsed_secs,
            plural(results.mistake_count, "mistake"),
        ),
        bold_style(),
    ))
    .alignment(Alignment::Center);
    f.render_widget(stats, chunks[2]);

    let message = Paragraph::new(Span::styled(
        results.performance_message(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center);
    f.render_widget(message, chunks[3]);

    let legend = Paragraph::new(Span::styled(
        "(r)etry / (enter) exercises / (q)uit",
        italic_style(),
    ));
    f.render_widget(legend, chunks[5]);
}

pub fn render_help(app: &App, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(f.area());

    let dir = app
        .config
        .exercises_dir()
        .map(|d| d.display().to_string())
        .unwrap_or_else(|| "your exercises directory".to_string());
    let code = Style::default().fg(Color::Yellow);

    let text = vec![
        Line::from(Span::styled("Custom exercises", bold_style())),
        Line::from(format!("Drop .txt files into {dir}")),
        Line::from(""),
        Line::from(Span::styled("  Language: norwegian", code)),
        Line::from(Span::styled("  My exercise title", code)),
        Line::from(Span::styled("  the first line to type", code)),
        Line::from(Span::styled("  the second line to type", code)),
        Line::from(""),
        Line::from("The Language: line is optional (english or norwegian)."),
        Line::from("The first remaining line is the title; every other non-empty line is typed."),
        Line::from("A file with the same name as a bundled exercise replaces it."),
        Line::from(""),
        Line::from(Span::styled("Keys", bold_style())),
        Line::from("  ↑/↓ or j/k   choose an exercise"),
        Line::from("  enter        start"),
        Line::from("  esc          leave the exercise"),
        Line::from("  ctrl+w       delete the last word"),
        Line::from("  ctrl+u       clear the line"),
        Line::from("  q            quit"),
    ];
    f.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }), chunks[0]);

    let legend = Paragraph::new(Span::styled("(esc) back", italic_style()));
    f.render_widget(legend, chunks[1]);
}
