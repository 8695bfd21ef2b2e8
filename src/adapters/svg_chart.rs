//! Equity-versus-benchmark chart rendered as a standalone SVG document.

use std::fs;
use std::path::Path;

use crate::domain::error::SigsweepError;
use crate::domain::trajectory::{EquityPoint, Trajectory};

const WIDTH: f64 = 900.0;
const HEIGHT: f64 = 500.0;
const PADDING: f64 = 60.0;

pub fn render_equity_chart(trajectory: &Trajectory, title: &str) -> String {
    let strategy = trajectory.equity_curve();
    let benchmark = trajectory.benchmark_curve();
    if strategy.is_empty() {
        return format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH:.0}" height="{HEIGHT:.0}"><text x="{PADDING:.0}" y="{PADDING:.0}">No equity data available.</text></svg>
"#
        );
    }

    let (min_value, max_value) = strategy
        .iter()
        .chain(&benchmark)
        .map(|p| p.equity)
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    let scale = Scale::new(strategy.len(), min_value, max_value);

    let first_date = strategy[0].date;
    let last = strategy.len() - 1;
    let last_date = strategy[last].date;
    let final_strategy = strategy[last].equity;
    let final_benchmark = benchmark[last].equity;

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH:.0}" height="{HEIGHT:.0}" viewBox="0 0 {WIDTH:.0} {HEIGHT:.0}" font-family="sans-serif">
<rect width="100%" height="100%" fill="white"/>
<text x="{:.1}" y="30" text-anchor="middle" font-size="18">{}</text>
"#,
        WIDTH / 2.0,
        escape(title)
    ));
    svg.push_str(&format!(
        r#"<line x1="{PADDING:.0}" y1="{PADDING:.0}" x2="{PADDING:.0}" y2="{bottom:.0}" stroke="black"/>
<line x1="{PADDING:.0}" y1="{bottom:.0}" x2="{right:.0}" y2="{bottom:.0}" stroke="black"/>
<text x="{label_x:.0}" y="{top_label:.1}" text-anchor="end" font-size="11">{max_value:.0}</text>
<text x="{label_x:.0}" y="{bottom:.0}" text-anchor="end" font-size="11">{min_value:.0}</text>
<text x="{PADDING:.0}" y="{date_y:.0}" font-size="11">{first_date}</text>
<text x="{right:.0}" y="{date_y:.0}" text-anchor="end" font-size="11">{last_date}</text>
"#,
        bottom = HEIGHT - PADDING,
        right = WIDTH - PADDING,
        label_x = PADDING - 6.0,
        top_label = PADDING + 4.0,
        date_y = HEIGHT - PADDING + 18.0,
    ));
    svg.push_str(&format!(
        r#"<polyline fill="none" stroke="grey" stroke-width="1" stroke-dasharray="6,4" points="{}"/>
<polyline fill="none" stroke="blue" stroke-width="1.5" points="{}"/>
"#,
        scale.polyline(&benchmark),
        scale.polyline(&strategy)
    ));
    svg.push_str(&format!(
        r#"<text x="{legend_x:.0}" y="{legend_y:.0}" font-size="12" fill="blue">Strategy Equity (final ${final_strategy:.0})</text>
<text x="{legend_x:.0}" y="{legend_y2:.0}" font-size="12" fill="grey">Market Buy &amp; Hold (start ${start:.0}, final ${final_benchmark:.0})</text>
</svg>
"#,
        legend_x = PADDING + 10.0,
        legend_y = PADDING + 16.0,
        legend_y2 = PADDING + 32.0,
        start = trajectory.initial_capital,
    ));
    svg
}

pub fn write_equity_chart(
    path: &Path,
    trajectory: &Trajectory,
    title: &str,
) -> Result<(), SigsweepError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, render_equity_chart(trajectory, title))?;
    tracing::info!(file = %path.display(), "chart written");
    Ok(())
}

struct Scale {
    min_value: f64,
    scale_x: f64,
    scale_y: f64,
}

impl Scale {
    fn new(len: usize, min_value: f64, max_value: f64) -> Self {
        let plot_width = WIDTH - 2.0 * PADDING;
        let plot_height = HEIGHT - 2.0 * PADDING;
        let range = max_value - min_value;
        Scale {
            min_value: if min_value.is_finite() { min_value } else { 0.0 },
            scale_x: if len > 1 {
                plot_width / (len - 1) as f64
            } else {
                0.0
            },
            scale_y: if range > 0.0 && range.is_finite() {
                plot_height / range
            } else {
                1.0
            },
        }
    }

    fn polyline(&self, curve: &[EquityPoint]) -> String {
        curve
            .iter()
            .enumerate()
            .filter(|(_, p)| p.equity.is_finite())
            .map(|(i, p)| {
                let x = PADDING + i as f64 * self.scale_x;
                let y = HEIGHT - PADDING - (p.equity - self.min_value) * self.scale_y;
                format!("{:.1},{:.1}", x, y)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
