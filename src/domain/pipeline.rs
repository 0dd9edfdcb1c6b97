//! Single pass over the engine's edge stream.
//!
//! Edges are pulled in production order, filtered, and handed to the sink one
//! at a time. Nothing is retained between edges; the sink owns any dedup state.

use crate::domain::error::ExportResult;
use crate::domain::ports::{EdgeSource, GraphSink};
use crate::domain::predicate::EdgePredicate;
use crate::domain::progress::{ProgressObserver, ProgressTracker};
use tracing::{info, warn};

/// Counts of one completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    /// Edge total reported by the engine up front
    pub total: u64,
    pub processed: u64,
    pub admitted: u64,
}

/// Export `edges` into `sink`.
///
/// On any error the remaining edges are skipped, the sink is still closed,
/// and the first error is returned. A close failure after an earlier error is
/// only logged.
pub fn run<S, P, K>(
    edges: S,
    predicate: &P,
    sink: &mut K,
    observer: &mut dyn ProgressObserver,
) -> ExportResult<ExportSummary>
where
    S: EdgeSource,
    P: EdgePredicate + ?Sized,
    K: GraphSink + ?Sized,
{
    let total = edges.edge_count();
    info!(
        "Number of reachable methods is {}",
        edges.reachable_method_count()
    );
    info!("Beginning to process call graph of size {}", total);

    let outcome = stream_edges(edges, predicate, sink, observer, total).and_then(|summary| {
        sink.finish()?;
        Ok(summary)
    });

    match outcome {
        Ok(summary) => {
            sink.close()?;
            info!(
                "Done creating function call graph ({} of {} edges exported)",
                summary.admitted, summary.processed
            );
            Ok(summary)
        }
        Err(err) => {
            if let Err(close_err) = sink.close() {
                warn!("Failed to close sink after error: {}", close_err);
            }
            Err(err)
        }
    }
}

fn stream_edges<S, P, K>(
    edges: S,
    predicate: &P,
    sink: &mut K,
    observer: &mut dyn ProgressObserver,
    total: u64,
) -> ExportResult<ExportSummary>
where
    S: EdgeSource,
    P: EdgePredicate + ?Sized,
    K: GraphSink + ?Sized,
{
    let mut tracker = ProgressTracker::new(total);
    let mut admitted = 0u64;

    for edge in edges {
        let edge = edge?;
        if predicate.matches(&edge) {
            sink.add_edge(&edge)?;
            admitted += 1;
        }
        if let Some(progress) = tracker.advance() {
            observer.on_progress(progress);
        }
    }

    Ok(ExportSummary {
        total,
        processed: tracker.processed(),
        admitted,
    })
}
