//! Mixer panel - one gauge per category

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Gauge},
    Frame,
};

use saavy_mixer::mixer::Category;

use super::state::{CategoryRow, MixerSnapshot};

pub fn render_mixer(frame: &mut Frame, area: Rect, snapshot: &MixerSnapshot) {
    let block = Block::default().title(" Categories ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1); Category::COUNT])
        .split(inner);

    for (i, row) in snapshot.rows.iter().enumerate() {
        let Some(&slot) = rows.get(i) else { break };
        let selected = row.category == snapshot.selected;
        frame.render_widget(gauge(i, row, selected), slot);
    }
}

fn gauge(index: usize, row: &CategoryRow, selected: bool) -> Gauge<'static> {
    let color = if row.muted {
        Color::DarkGray
    } else if selected {
        Color::LightGreen
    } else {
        Color::Cyan
    };
    let mut style = Style::default().fg(color);
    if selected {
        style = style.add_modifier(Modifier::BOLD);
    }

    let voices = match row.limit {
        Some(limit) => format!("{}/{}", row.active, limit),
        None => row.active.to_string(),
    };
    let label = format!(
        "{} {:<7} {:>4.0}%  out {:.2}  voices {}{}",
        index + 1,
        row.category.name(),
        row.volume * 100.0,
        row.gain,
        voices,
        if row.muted { "  [muted]" } else { "" },
    );

    Gauge::default()
        .gauge_style(style)
        .ratio(f64::from(row.volume.clamp(0.0, 1.0)))
        .label(label)
}
