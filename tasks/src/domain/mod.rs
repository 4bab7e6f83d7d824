//! Domain facades for task management.
//!
//! These combine storage operations with the ordering, scoring and
//! archiving rules.

mod archiver;
mod config;
pub mod schedule;
pub mod scorer;
mod tasks;

pub use archiver::Archiver;
pub use config::ConfigDomain;
pub use schedule::{Clock, IntervalTicker, ManualClock, ManualTicker, SystemClock, TickHandle, Ticker};
pub use tasks::{ArchiveReport, TaskStore};
