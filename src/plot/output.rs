use super::series::Chart;
use crate::model::SCHEMA_VERSION;
use anyhow::Result;
use chrono::{DateTime, Utc};
use console::style;
use serde::Serialize;

#[derive(Serialize)]
struct PlotOutput<'a> {
    version: u32,
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    chart: &'a Chart,
}

pub fn output_json(chart: &Chart) -> Result<()> {
    let output = PlotOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        chart,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

const BARS: [&str; 8] = ["▁", "▂", "▃", "▄", "▅", "▆", "▇", "█"];

fn bar(value: u64, max: u64) -> &'static str {
    if max == 0 {
        return BARS[0];
    }
    let idx = ((value as f64 / max as f64) * (BARS.len() - 1) as f64).round() as usize;
    BARS[idx.min(BARS.len() - 1)]
}

/// Plain-text rendering: one block per series with a bar per release.
pub fn output_text(chart: &Chart) {
    if chart.is_empty() {
        println!("No data to display");
        return;
    }

    let max = chart.max_value();
    println!("{}", style(format!("{} per release", chart.metric.label())).bold());
    println!("{}", "─".repeat(50));

    for series in &chart.series {
        let trend: String = series.points.iter().map(|p| bar(p.value, max)).collect();
        println!("\n{} {}", style(&series.name).bold().cyan(), style(trend).green());
        for point in &series.points {
            let date = chart
                .ticks
                .iter()
                .find(|t| t.release == point.release)
                .and_then(|t| t.date)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            println!(
                "  {:<16} {:<10} {} {:>10}",
                point.release,
                style(date).dim(),
                style(bar(point.value, max)).green(),
                point.value
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::bar;

    #[test]
    fn bars_scale_to_max() {
        assert_eq!(bar(0, 100), "▁");
        assert_eq!(bar(100, 100), "█");
        assert_eq!(bar(5, 0), "▁");
    }
}
