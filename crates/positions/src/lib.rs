//! Open-position lifecycle: P&L accounting, exit tracking, and the
//! price-poll monitor that drives target, stop, and forced-close exits.

pub mod exit_tracker;
pub mod monitor;
pub mod pnl;

pub use exit_tracker::{track, CloseReason, ExitAction, ExitStatus};
pub use monitor::{ExitEvent, ExitMonitor};
