//! Command implementations.

mod align;
mod census;
mod check_sync;
mod info;
mod validate;
mod window;

pub use align::{build_job, run_align, AlignJob, FilteredTarget};
pub use census::{run_census, GyroCensus};
pub use check_sync::{run_check_sync, SyncAudit};
pub use info::run_info;
pub use validate::run_validate;
pub use window::{run_window, WindowSummary};
