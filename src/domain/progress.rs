use tracing::info;

/// One decile milestone of an export run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub percentage: u64,
    pub processed: u64,
    pub total: u64,
}

/// Receives milestone notifications. Purely observational.
pub trait ProgressObserver {
    fn on_progress(&mut self, progress: Progress);
}

impl<F> ProgressObserver for F
where
    F: FnMut(Progress),
{
    fn on_progress(&mut self, progress: Progress) {
        self(progress)
    }
}

/// Default observer: one log line per milestone.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_progress(&mut self, p: Progress) {
        info!(
            "Processed {}% of all edges ({}/{})",
            p.percentage, p.processed, p.total
        );
    }
}

/// Counts processed edges and emits each multiple-of-ten percentage once.
#[derive(Debug)]
pub struct ProgressTracker {
    total: u64,
    processed: u64,
    last_milestone: u64,
}

impl ProgressTracker {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            processed: 0,
            last_milestone: 0,
        }
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Record one more edge; returns the milestone reached, if any.
    ///
    /// A zero total never reports, and neither does 0%.
    pub fn advance(&mut self) -> Option<Progress> {
        self.processed += 1;
        if self.total == 0 {
            return None;
        }
        let percentage = self.processed.saturating_mul(100) / self.total;
        if percentage % 10 != 0 || percentage <= self.last_milestone {
            return None;
        }
        self.last_milestone = percentage;
        Some(Progress {
            percentage,
            processed: self.processed,
            total: self.total,
        })
    }
}
