//! Ingestion pipeline: concurrent fan-out of extraction over a bounded worker
//! pool, fan-in of results through a single merge stage.
//!
//! A bounded queue of pending units feeds the workers; workers are stateless
//! and interchangeable, and completion of one unit never depends on another:
//! the store merge is commutative, so results land in arbitrary completion
//! order. Backpressure is structural: when the merge stage falls behind,
//! workers block submitting results instead of buffering unboundedly. One
//! slow or failing unit never stalls the run; it is timed out or recorded and
//! the run continues.

use crate::app::bus::{AnalysisEvent, EventBus};
use crate::domain::extractor::{self, EdgeBatch, ExtractorConfig};
use crate::domain::failure::UnitFailure;
use crate::domain::node::QualifiedName;
use crate::domain::store::GraphStore;
use crate::domain::unit::ResolvedUnit;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Pipeline tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Extraction worker count; defaults to available parallelism.
    pub workers: usize,
    /// Bound of the pending-unit and result queues.
    pub queue_bound: usize,
    /// Per-unit processing budget in milliseconds; 0 disables the timeout.
    pub unit_timeout_ms: u64,
    /// Reference targets under these prefixes are excluded from the graph.
    pub excluded_prefixes: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            queue_bound: 64,
            unit_timeout_ms: 5_000,
            excluded_prefixes: Vec::new(),
        }
    }
}

impl PipelineConfig {
    fn unit_timeout(&self) -> Option<Duration> {
        (self.unit_timeout_ms > 0).then(|| Duration::from_millis(self.unit_timeout_ms))
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// All submitted units were processed (success or recorded failure).
    Complete,
    /// Cooperative cancellation discarded some queued units.
    Cancelled,
}

/// One unit that contributed no edges, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedUnit {
    pub unit: QualifiedName,
    pub failure: UnitFailure,
}

/// Final outcome of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub status: RunStatus,
    pub submitted: usize,
    pub processed: usize,
    pub failed: Vec<FailedUnit>,
    /// Queued units dropped by cancellation before any worker took them.
    pub discarded: usize,
    pub node_count: usize,
    pub edge_count: usize,
}

impl RunSummary {
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

struct UnitOutcome {
    unit: QualifiedName,
    result: Result<EdgeBatch, UnitFailure>,
}

/// Drives one ingest pass: fan-out to workers, fan-in to the store.
pub struct IngestionPipeline {
    store: Arc<GraphStore>,
    bus: Arc<EventBus>,
    config: PipelineConfig,
    cancel: watch::Receiver<bool>,
}

impl IngestionPipeline {
    pub fn new(
        store: Arc<GraphStore>,
        bus: Arc<EventBus>,
        config: PipelineConfig,
        cancel: watch::Receiver<bool>,
    ) -> Self {
        Self {
            store,
            bus,
            config,
            cancel,
        }
    }

    /// Run all units to quiescence (or cancellation) and return the summary.
    ///
    /// The calling task is the single merge writer: every accepted batch goes
    /// through it, so merges never race and progress events are emitted in
    /// merge order.
    pub async fn run(&self, units: Vec<ResolvedUnit>) -> RunSummary {
        let submitted = units.len();
        let worker_count = self.config.workers.max(1);
        let queue_bound = self.config.queue_bound.max(1);
        let unit_timeout = self.config.unit_timeout();
        let extractor_config = Arc::new(ExtractorConfig::new(
            self.config.excluded_prefixes.clone(),
        ));

        info!(submitted, workers = worker_count, "starting ingest run");

        let (unit_tx, unit_rx) = mpsc::channel::<ResolvedUnit>(queue_bound);
        let unit_rx = Arc::new(Mutex::new(unit_rx));
        let (result_tx, mut result_rx) = mpsc::channel::<UnitOutcome>(queue_bound);

        let feeder = {
            let mut cancel = self.cancel.clone();
            tokio::spawn(async move {
                for unit in units {
                    if *cancel.borrow() {
                        break;
                    }
                    tokio::select! {
                        sent = unit_tx.send(unit) => {
                            if sent.is_err() {
                                break;
                            }
                        }
                        _ = cancel.changed() => break,
                    }
                }
            })
        };

        let mut workers = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let unit_rx = Arc::clone(&unit_rx);
            let result_tx = result_tx.clone();
            let cancel = self.cancel.clone();
            let extractor_config = Arc::clone(&extractor_config);
            workers.push(tokio::spawn(async move {
                loop {
                    let next = { unit_rx.lock().await.recv().await };
                    let Some(unit) = next else { break };
                    // Checked after recv as well: a unit still queued when
                    // cancellation lands is discarded, not processed.
                    if *cancel.borrow() {
                        break;
                    }
                    let name = unit.qualified_name.clone();
                    let result = run_unit(unit, &extractor_config, unit_timeout).await;
                    if result_tx
                        .send(UnitOutcome { unit: name, result })
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
                debug!(worker_id, "extraction worker exiting");
            }));
        }
        drop(result_tx);

        let mut processed = 0usize;
        let mut failed: Vec<FailedUnit> = Vec::new();
        while let Some(outcome) = result_rx.recv().await {
            match outcome.result {
                Ok(batch) => {
                    if batch.dropped_references > 0 {
                        debug!(
                            unit = %outcome.unit,
                            dropped = batch.dropped_references,
                            "unresolved references dropped"
                        );
                    }
                    let edges_added = self.store.add_edges(&batch);
                    processed += 1;
                    self.bus.publish(AnalysisEvent::UnitCompleted {
                        unit: outcome.unit,
                        edges_added,
                    });
                }
                Err(failure) => {
                    warn!(unit = %outcome.unit, %failure, "unit failed");
                    self.bus.publish(AnalysisEvent::UnitFailed {
                        unit: outcome.unit.clone(),
                        failure: failure.clone(),
                    });
                    failed.push(FailedUnit {
                        unit: outcome.unit,
                        failure,
                    });
                }
            }
            self.bus.publish(AnalysisEvent::Progress {
                processed,
                failed: failed.len(),
                submitted,
            });
        }

        // The result channel closed, so every worker has exited; quiescent.
        let _ = feeder.await;
        for worker in workers {
            let _ = worker.await;
        }

        let discarded = submitted - processed - failed.len();
        let status = if discarded > 0 {
            RunStatus::Cancelled
        } else {
            RunStatus::Complete
        };
        let summary = RunSummary {
            status,
            submitted,
            processed,
            failed,
            discarded,
            node_count: self.store.node_count(),
            edge_count: self.store.edge_count(),
        };
        info!(
            processed,
            failed = summary.failed.len(),
            discarded,
            ?status,
            "ingest run finished"
        );
        summary
    }
}

/// Extract one unit off the async runtime, bounded by the per-unit budget.
///
/// A timed-out extraction is abandoned (its result is discarded when it
/// eventually finishes) and recorded as a failure; it is not retried.
async fn run_unit(
    unit: ResolvedUnit,
    config: &Arc<ExtractorConfig>,
    unit_timeout: Option<Duration>,
) -> Result<EdgeBatch, UnitFailure> {
    let config = Arc::clone(config);
    let task = tokio::task::spawn_blocking(move || extractor::extract(&unit, &config));
    let joined = match unit_timeout {
        Some(limit) => match timeout(limit, task).await {
            Ok(joined) => joined,
            Err(_) => return Err(UnitFailure::Timeout(limit.as_millis() as u64)),
        },
        None => task.await,
    };
    joined.unwrap_or_else(|join_error| Err(UnitFailure::Extraction(join_error.to_string())))
}
