pub mod exec;
pub mod output;
pub mod series;
pub mod svg;

pub use exec::exec;
pub use output::{output_json, output_text};
pub use series::{build_chart, Chart, GroupBy, Point, Series, Tick, XAxis, TOTAL_SERIES};
pub use svg::{render_svg, DEFAULT_SIZE};
