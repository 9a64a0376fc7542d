//! Core support shared by the gcontacts crates: tracing setup and clocks.

pub mod time;
pub mod tracing;

pub use time::{Clock, ManualClock, SystemClock, format_time_for_xml};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
