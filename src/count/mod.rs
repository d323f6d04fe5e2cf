pub mod checkout;
pub mod counter;
pub mod exec;
pub mod manifest;
pub mod output;
pub mod pipeline;

pub use checkout::{Checkout, CommandCheckout};
pub use counter::{parse_report, ClocCounter, LineCounter};
pub use exec::exec;
pub use manifest::{parse_manifest, select_products};
pub use output::{output_json, output_summary};
pub use pipeline::Pipeline;
