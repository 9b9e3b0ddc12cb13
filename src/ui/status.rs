//! Status bar - visible range, held notes and the latest warning

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::pitch::Pitch;
use crate::view::PianoView;

pub fn render(frame: &mut Frame, area: Rect, view: &PianoView) {
    let block = Block::default()
        .title("keyroll")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let range = view.visible_range();
    let held: Vec<String> = view
        .tracker()
        .active_notes()
        .map(|n| Pitch::from(n).name())
        .collect();

    let mut spans = vec![
        Span::styled("center ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            Pitch::new(range.center_note.round() as i32).name(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled("  keys ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{:.1}", range.visible_keys)),
        Span::styled("  held ", Style::default().fg(Color::DarkGray)),
        Span::raw(if held.is_empty() { "-".to_string() } else { held.join(" ") }),
    ];

    if let Some(warning) = view.warnings().latest() {
        spans.push(Span::styled(
            format!("  {}: {}", warning.operation, warning.error),
            Style::default().fg(Color::Yellow),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), inner);
}
