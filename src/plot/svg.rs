use super::series::{Chart, XAxis};
use crate::error::{CountlinesError, Result};
use plotters::prelude::*;
use std::path::Path;

pub const DEFAULT_SIZE: (u32, u32) = (1024, 640);

fn plot_err<E: std::fmt::Display>(e: E) -> CountlinesError {
    CountlinesError::Plot(e.to_string())
}

/// Draw every series of the chart as a line with point markers and a legend.
pub fn render_svg(chart: &Chart, path: &Path, size: (u32, u32)) -> Result<()> {
    if chart.is_empty() {
        return Err(CountlinesError::Plot("no rows to plot".into()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let (x_min, x_max) = chart.x_bounds();
    let y_max = (chart.max_value().max(1) as f64) * 1.05;
    let x_desc = match chart.axis {
        XAxis::Date => "release date",
        XAxis::Ordinal => "release",
    };

    let mut ctx = ChartBuilder::on(&root)
        .caption(format!("{} per release", chart.metric.label()), ("sans-serif", 24))
        .margin(16)
        .x_label_area_size(48)
        .y_label_area_size(80)
        .build_cartesian_2d(x_min..x_max, 0f64..y_max)
        .map_err(plot_err)?;

    let x_labels = chart.ticks.len().clamp(2, 12);
    let label_x = |x: &f64| chart.label_for(*x);
    let label_y = |y: &f64| format!("{:.0}", y);
    ctx.configure_mesh()
        .x_labels(x_labels)
        .x_label_formatter(&label_x)
        .y_label_formatter(&label_y)
        .x_desc(x_desc)
        .y_desc(chart.metric.label())
        .draw()
        .map_err(plot_err)?;

    for (idx, series) in chart.series.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        let points: Vec<(f64, f64)> = series.points.iter().map(|p| (p.x, p.value as f64)).collect();

        ctx.draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))
            .map_err(plot_err)?
            .label(series.name.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        ctx.draw_series(points.into_iter().map(|p| Circle::new(p, 3, color.filled())))
            .map_err(plot_err)?;
    }

    ctx.configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}
