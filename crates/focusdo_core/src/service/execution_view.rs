//! Load state of the execution (focus) view.
//!
//! # Responsibility
//! - Run the next-task and today-stats queries against any source.
//! - Expose loading, ready and error as distinct states with a retry path.
//!
//! # Invariants
//! - `Error` is only entered after a failed query; a retry re-runs both
//!   queries against the same source.

use crate::model::execution::{ExecutionTask, TodayStats};
use crate::service::execution_source::ExecutionSource;
use log::{info, warn};

/// Presentation state of the execution view.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionView {
    Loading,
    Ready {
        task: Option<ExecutionTask>,
        stats: TodayStats,
    },
    Error {
        message: String,
    },
}

impl ExecutionView {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// Runs both queries once and returns the resulting state.
pub fn load_execution_view(source: &dyn ExecutionSource) -> ExecutionView {
    let loaded = source
        .next_task()
        .and_then(|task| source.today_stats().map(|stats| (task, stats)));

    match loaded {
        Ok((task, stats)) => ExecutionView::Ready { task, stats },
        Err(err) => ExecutionView::Error {
            message: err.to_string(),
        },
    }
}

/// Execution view bound to one data source.
pub struct ExecutionPage<S: ExecutionSource> {
    source: S,
    state: ExecutionView,
    attempts: u32,
}

impl<S: ExecutionSource> ExecutionPage<S> {
    /// Creates a page in the `Loading` state without querying yet.
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: ExecutionView::Loading,
            attempts: 0,
        }
    }

    /// Queries the source and stores the outcome.
    pub fn load(&mut self) -> &ExecutionView {
        self.attempts += 1;
        self.state = load_execution_view(&self.source);
        match &self.state {
            ExecutionView::Error { message } => warn!(
                "event=execution_view_load module=execution status=error attempt={} error={}",
                self.attempts, message
            ),
            _ => info!(
                "event=execution_view_load module=execution status=ok attempt={}",
                self.attempts
            ),
        }
        &self.state
    }

    /// User-triggered retry; identical to `load`.
    pub fn retry(&mut self) -> &ExecutionView {
        self.load()
    }

    pub fn state(&self) -> &ExecutionView {
        &self.state
    }

    /// Number of load attempts so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access for swapping or reseeding the source before a retry.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}
