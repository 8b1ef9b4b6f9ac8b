pub mod bleed;
pub mod metrics;
pub mod status;

pub use bleed::{bleed_host_handler, bleed_query_handler};
pub use metrics::metrics_handler;
pub use status::{redirect_handler, status_handler};
