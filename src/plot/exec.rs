use super::output::{output_json, output_text};
use super::series::build_chart;
use super::svg::{render_svg, DEFAULT_SIZE};
use crate::cli::PlotArgs;
use crate::table::load_tables;
use anyhow::Context;
use console::style;
use tracing::info;

pub fn exec(args: PlotArgs) -> anyhow::Result<()> {
    let table = load_tables(&args.paths).context("Failed to load results tables")?;
    info!(rows = table.len(), releases = table.releases().len(), "loaded results");

    if args.interactive {
        return crate::tui::run(&table, args.group_by, &args.languages, args.metric)
            .map_err(|e| anyhow::anyhow!(e));
    }

    let chart = build_chart(&table, args.metric, args.group_by, &args.languages);

    if let Some(path) = &args.svg {
        render_svg(&chart, path, DEFAULT_SIZE)
            .with_context(|| format!("Failed to render {}", path.display()))?;
        info!(path = %path.display(), series = chart.series.len(), "wrote chart");
    }

    if args.json {
        output_json(&chart)?;
    } else if let Some(path) = &args.svg {
        println!("Chart written to {}", style(path.display()).cyan());
    } else {
        output_text(&chart);
    }
    Ok(())
}
