//! Status bar widget - pool occupancy, fades and output level

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::state::MixerSnapshot;

/// Output level of the most recent visualisation window
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

pub fn render_transport(
    frame: &mut Frame,
    area: Rect,
    snapshot: &MixerSnapshot,
    stats: &AudioStats,
    sample_rate: f32,
) {
    let block = Block::default().title(" saavy-mixer ").borders(Borders::ALL);

    let pool = snapshot.pool;
    // Red at capacity, yellow when every created voice is busy
    let pool_color = if pool.in_use >= pool.max_size {
        Color::LightRed
    } else if pool.idle == 0 && pool.total_created > 0 {
        Color::Yellow
    } else {
        Color::Green
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" Pool {}/{} busy, {} idle  ", pool.in_use, pool.max_size, pool.idle),
            Style::default().fg(pool_color),
        ),
        Span::styled(
            format!("Active {}  ", snapshot.active),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("Fades {}  ", snapshot.fades),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            if snapshot.master_gates_all { "master gates all  " } else { "master independent  " },
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("{:.1}kHz  ", sample_rate / 1000.0),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", stats.peak, stats.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}
