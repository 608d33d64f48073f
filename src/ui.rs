pub mod charting;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, Gauge, GraphType, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::history;
use crate::session::Outcome;
use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Typing => render_typing(self, area, buf),
            AppState::Results => render_results(self, area, buf),
            AppState::History => render_history(self, area, buf),
        }
    }
}

fn render_typing(app: &App, area: Rect, buf: &mut Buffer) {
    let session = &app.session;

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);
    let underlined_dim_bold_style = Style::default()
        .patch(dim_bold_style)
        .add_modifier(Modifier::UNDERLINED);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // header: view name + elapsed time
            Constraint::Length(1), // progress gauge
            Constraint::Min(1),    // prompt
            Constraint::Length(1), // hint
        ])
        .split(area);

    let timer = if session.has_started() {
        session.elapsed_display()
    } else {
        String::new()
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(format!("keyrate · {}", app.state), bold_style),
        Span::raw("   "),
        Span::styled(timer, dim_bold_style),
    ]));
    header.render(chunks[0], buf);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Green).bg(Color::DarkGray))
        .ratio(session.progress())
        .label(format!("{:.0}%", session.progress() * 100.0));
    gauge.render(chunks[1], buf);

    let mut spans = session
        .keystrokes()
        .iter()
        .enumerate()
        .map(|(idx, key)| {
            let expected = session.expected_char(idx).unwrap_or(key.char).to_string();

            match key.outcome {
                Outcome::Incorrect => Span::styled(
                    match key.char {
                        ' ' => "·".to_owned(),
                        c => c.to_string(),
                    },
                    red_bold_style,
                ),
                Outcome::Correct => Span::styled(expected, green_bold_style),
            }
        })
        .collect::<Vec<Span>>();

    if let Some(current) = session.expected_char(session.cursor()) {
        spans.push(Span::styled(
            current.to_string(),
            underlined_dim_bold_style,
        ));
        let rest: String = session.target.chars().skip(session.cursor() + 1).collect();
        spans.push(Span::styled(rest, dim_bold_style));
    }

    let max_chars_per_line = chunks[2].width.max(1) as usize;
    let prompt_area = center_vertically(chunks[2], prompt_lines(&session.target, max_chars_per_line));
    let prompt = Paragraph::new(Line::from(spans))
        .alignment(if session.target.width() <= max_chars_per_line {
            // when the prompt is small enough to fit on one line
            // centering the text gives a nice zen feeling
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true });
    prompt.render(prompt_area, buf);

    let hint = if session.has_started() {
        Span::styled("(tab) history / (esc) quit", italic_style)
    } else {
        Span::styled("Start typing to begin the test", italic_style)
    };
    Paragraph::new(hint)
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);
    let session = &app.session;

    let mut lines = vec![Line::styled("Test Complete!", bold_style), Line::raw("")];

    if let Some(result) = session.result() {
        lines.push(Line::styled(
            format!(
                "{} wpm   {}% acc   {} mistakes   {} elapsed",
                result.wpm,
                result.accuracy,
                result.mistakes,
                session.elapsed_display()
            ),
            bold_style,
        ));
    }

    if let Some(warning) = &app.store_warning {
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            warning.clone(),
            Style::default().fg(Color::Yellow),
        ));
    }

    lines.push(Line::raw(""));
    lines.push(Line::styled("(r)etry / (h)istory / (esc)ape", italic_style));

    let body = center_vertically(area, lines.len() as u16);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(body, buf);
}

fn render_history(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let results = app.store.all();

    if results.is_empty() {
        let no_data = Paragraph::new("No results yet.\nComplete a typing test to see your progress!")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center);
        no_data.render(center_vertically(area, 2), buf);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),    // chart
            Constraint::Length(1), // summary
            Constraint::Length(1), // last-test line
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    let (wpm_series, acc_series) = history::chart_series(&results);
    let (x_max, y_max) = charting::compute_chart_params(&wpm_series, &acc_series);

    let datasets = vec![
        Dataset::default()
            .name("wpm")
            .marker(ratatui::symbols::Marker::Braille)
            .style(Style::default().fg(Color::Magenta))
            .graph_type(GraphType::Line)
            .data(&wpm_series),
        Dataset::default()
            .name("acc %")
            .marker(ratatui::symbols::Marker::Braille)
            .style(Style::default().fg(Color::Cyan))
            .graph_type(GraphType::Line)
            .data(&acc_series),
    ];

    let first_label = results.first().map(history::date_label).unwrap_or_default();
    let last_label = results.last().map(history::date_label).unwrap_or_default();

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("test")
                .bounds([1.0, x_max])
                .labels(vec![
                    Span::styled(first_label, bold_style),
                    Span::styled(last_label, bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm / acc")
                .bounds([0.0, y_max])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(y_max), bold_style),
                ]),
        );
    chart.render(chunks[0], buf);

    let summary = history::summarize(&results);
    Paragraph::new(Span::styled(
        format!(
            "{} avg wpm   {}% avg acc   {} tests",
            summary.average_wpm, summary.average_accuracy, summary.total_tests
        ),
        bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    if let Some(ago) = history::last_test_ago(&results) {
        Paragraph::new(Span::styled(
            format!("last test {}", ago),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
    }

    Paragraph::new(Span::styled(
        "(r) new test / (b)ack / (esc)ape",
        italic_style,
    ))
    .render(chunks[4], buf);
}

/// Number of wrapped lines the prompt occupies at the given width.
fn prompt_lines(target: &str, max_chars_per_line: usize) -> u16 {
    if target.width() <= max_chars_per_line {
        1
    } else {
        ((target.width() as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16
    }
}

/// Carve a vertically centered band of `height` rows out of `area`.
fn center_vertically(area: Rect, height: u16) -> Rect {
    let pad = area.height.saturating_sub(height) / 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(pad),
            Constraint::Length(height.min(area.height)),
            Constraint::Min(0),
        ])
        .split(area);
    chunks[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryResultStore, ResultStore, TestResult};
    use chrono::Local;

    fn create_test_app(target: &str) -> App {
        App::new(Box::new(MemoryResultStore::new()), target).unwrap()
    }

    fn rendered_text(app: &App, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_typing_view_shows_prompt_and_hint() {
        let app = create_test_app("hello world");

        let rendered = rendered_text(&app, 80, 24);

        assert!(rendered.contains("hello world"));
        assert!(rendered.contains("Start typing to begin the test"));
    }

    #[test]
    fn test_typing_view_after_keystrokes() {
        let mut app = create_test_app("hello");
        app.keystroke('h');
        app.keystroke('e');

        let rendered = rendered_text(&app, 80, 24);

        assert!(rendered.contains("llo"));
        assert!(!rendered.contains("Start typing"));
    }

    #[test]
    fn test_wrong_char_rendered_in_place() {
        let mut app = create_test_app("a b");
        app.keystroke('a');
        app.keystroke('x'); // expected was ' '

        let rendered = rendered_text(&app, 80, 24);

        assert!(rendered.contains('x'));
    }

    #[test]
    fn test_space_typed_for_letter_renders_as_dot() {
        let mut app = create_test_app("ab");
        app.keystroke('a');
        app.keystroke(' '); // expected was 'b'

        let rendered = rendered_text(&app, 80, 24);

        assert!(rendered.contains('·'));
    }

    #[test]
    fn test_results_view_shows_summary() {
        let mut app = create_test_app("hi");
        app.keystroke('h');
        app.keystroke('i');

        assert_eq!(app.state, AppState::Results);
        let rendered = rendered_text(&app, 80, 24);

        assert!(rendered.contains("Test Complete!"));
        assert!(rendered.contains("wpm"));
        assert!(rendered.contains("mistakes"));
        assert!(rendered.contains("(r)etry"));
    }

    #[test]
    fn test_results_view_shows_store_warning() {
        let mut app = create_test_app("hi");
        app.keystroke('h');
        app.keystroke('i');
        app.store_warning = Some("history not saved: disk full".to_string());

        let rendered = rendered_text(&app, 80, 24);

        assert!(rendered.contains("history not saved"));
    }

    #[test]
    fn test_history_view_empty() {
        let mut app = create_test_app("hi");
        app.state = AppState::History;

        let rendered = rendered_text(&app, 80, 24);

        assert!(rendered.contains("No results yet"));
    }

    #[test]
    fn test_history_view_with_results() {
        let mut store = MemoryResultStore::new();
        for wpm in [40, 50, 60] {
            store
                .append(&TestResult {
                    wpm,
                    accuracy: 95,
                    mistakes: 2,
                    timestamp: Local::now(),
                })
                .unwrap();
        }
        let mut app = App::new(Box::new(store), "hi").unwrap();
        app.state = AppState::History;

        let rendered = rendered_text(&app, 80, 24);

        assert!(rendered.contains("3 tests"));
        assert!(rendered.contains("avg wpm"));
        assert!(rendered.contains("last test"));
    }

    #[test]
    fn test_render_small_area_does_not_panic() {
        let app = create_test_app("hello world this is a longer prompt");

        let _ = rendered_text(&app, 10, 3);
        let _ = rendered_text(&app, 200, 2);
    }

    #[test]
    fn test_prompt_lines() {
        assert_eq!(prompt_lines("short", 80), 1);
        assert!(prompt_lines(&"word ".repeat(40), 40) > 1);
    }

    #[test]
    fn test_center_vertically_band_height() {
        let area = Rect::new(0, 0, 80, 24);
        let band = center_vertically(area, 4);
        assert_eq!(band.height, 4);
        assert!(band.y >= area.y);
    }

    #[test]
    fn test_ui_constants() {
        assert_eq!(HORIZONTAL_MARGIN, 5);
        assert_eq!(VERTICAL_MARGIN, 2);
    }
}
