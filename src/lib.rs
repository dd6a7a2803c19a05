//! LtvForge: customer lifetime value ranking from heterogeneous event streams
//!
//! Events (customers, site visits, image uploads, orders) are normalized,
//! bucketed per customer and calendar week, gap-filled over the observed
//! weeks of each year and folded into a per-customer LTV estimate. The top
//! customers are then selected with a bounded heap.

pub mod calendar;
pub mod cli;
pub mod data;
pub mod error;
pub mod event;
pub mod model;
pub mod pipeline;
pub mod select;
pub mod viz;
pub mod weekly;

// Re-export public items for easier access
pub use cli::Args;
pub use data::{read_records, write_csv};
pub use error::{LtvError, RecordId};
pub use event::{normalize, NormalizedEvent};
pub use model::{estimate_ltv, CustomerLtv, LtvConfig};
pub use pipeline::{top_ltv_customers, LtvReport, LtvRun, RunStats};
pub use select::{top_n, MAX_TOP_N};
pub use viz::create_ltv_chart;

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
