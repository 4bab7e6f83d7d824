//! Periodic archiving of tasks whose deadline has passed.

use tracing::{debug, error};

use super::schedule::{Clock, Ticker};
use super::tasks::{ArchiveReport, TaskStore};
use crate::entities::ViewState;
use crate::errors::TasksResult;

/// Moves passed tasks out of the store on every tick of a schedule
pub struct Archiver<C> {
    clock: C,
}

impl<C: Clock> Archiver<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// Run one passed-deadline check at the clock's current time
    pub async fn check(
        &self,
        store: &mut TaskStore,
        view: &mut ViewState,
    ) -> TasksResult<ArchiveReport> {
        store.archive_passed(view, self.clock.now()).await
    }

    /// Check once per tick until the ticker ends.
    ///
    /// `on_tick` sees the store after each successful check. Failed checks
    /// are logged and the loop carries on. Returns the number of ticks
    /// handled.
    pub async fn run<T, F>(
        &self,
        store: &mut TaskStore,
        view: &mut ViewState,
        ticker: &mut T,
        mut on_tick: F,
    ) -> usize
    where
        T: Ticker + ?Sized,
        F: FnMut(&TaskStore, &ViewState, &ArchiveReport),
    {
        let mut ticks = 0;
        while ticker.tick().await {
            ticks += 1;
            match self.check(store, view).await {
                Ok(report) => {
                    debug!(tick = ticks, archived = report.archived.len(), "archive check done");
                    on_tick(store, view, &report);
                }
                Err(e) => error!(tick = ticks, error = %e, "archive check failed"),
            }
        }
        ticks
    }
}
