pub mod align;
pub mod catalog;
pub mod error;
pub mod extract;
pub mod types;

pub use align::{align_metrics, AlignedMetrics, MetricMatrix, WINDOW_SIZE};
pub use catalog::{all_identifiers, find_company, Company, MetricName, COMPANIES};
pub use error::*;
pub use extract::extract_series;
pub use types::*;
