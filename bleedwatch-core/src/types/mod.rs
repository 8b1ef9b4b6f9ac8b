//! Domain types shared by every layer.

pub mod classification;
pub mod scan_result;
pub mod target;

pub use classification::Classification;
pub use scan_result::{SanitizedData, ScanResult};
pub use target::{DEFAULT_SERVICE, Target};
