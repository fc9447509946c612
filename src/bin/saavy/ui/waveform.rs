//! Output scope - the mixed signal, downsampled to the panel width

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

pub fn render_waveform(frame: &mut Frame, area: Rect, buffer: &[f32], muted_output: bool) {
    let title = if muted_output { " Output (silent) " } else { " Output " };
    let block = Block::default().title(title).borders(Borders::ALL);

    // One point per column is all a braille chart can show
    let width = area.width.max(1) as usize;
    let step = buffer.len().div_ceil(width).max(1);
    let points: Vec<(f64, f64)> = buffer
        .iter()
        .step_by(step)
        .enumerate()
        .map(|(i, &sample)| ((i * step) as f64, f64::from(sample)))
        .collect();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(if muted_output { Color::DarkGray } else { Color::Cyan }))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, buffer.len().max(1) as f64])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-1.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
