//! Engine orchestration: one handle that owns the store, bus, and
//! configuration, drives ingest-then-analyze passes, and serves state to the
//! CLI and HTTP surfaces.

use crate::app::bus::{AnalysisEvent, EventBus};
use crate::app::dto::HealthResponse;
use crate::app::pipeline::{IngestionPipeline, PipelineConfig, RunStatus, RunSummary};
use crate::domain::analyzer::{Analyzer, AnalyzerOptions};
use crate::domain::report::ComponentReport;
use crate::domain::rules::LayeringRule;
use crate::domain::store::GraphStore;
use crate::domain::unit::ResolvedUnit;
use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use tokio::sync::{broadcast, watch};
use tracing::info;

/// Everything a run needs besides the units themselves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub pipeline: PipelineConfig,
    pub rules: Vec<LayeringRule>,
    pub analyzer: AnalyzerOptions,
}

#[derive(Default)]
struct EngineState {
    last_summary: Option<Arc<RunSummary>>,
    last_report: Option<Arc<ComponentReport>>,
    quiescent: bool,
}

struct EngineInner {
    project: String,
    config: EngineConfig,
    store: Arc<GraphStore>,
    bus: Arc<EventBus>,
    cancel: watch::Sender<bool>,
    state: RwLock<EngineState>,
}

/// Cloneable handle over one analysis session. All clones share the same
/// store, bus, and state, so HTTP handlers and the CLI can observe a run
/// another task is driving.
#[derive(Clone)]
pub struct AnalysisEngine {
    inner: Arc<EngineInner>,
}

impl AnalysisEngine {
    pub fn new(project: impl Into<String>, config: EngineConfig) -> Self {
        let (cancel, _) = watch::channel(false);
        Self {
            inner: Arc::new(EngineInner {
                project: project.into(),
                config,
                store: Arc::new(GraphStore::new()),
                bus: Arc::new(EventBus::default()),
                cancel,
                state: RwLock::new(EngineState::default()),
            }),
        }
    }

    pub fn project(&self) -> &str {
        &self.inner.project
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AnalysisEvent> {
        self.inner.bus.subscribe()
    }

    pub fn subscribe_with_replay(
        &self,
    ) -> (Vec<AnalysisEvent>, broadcast::Receiver<AnalysisEvent>) {
        self.inner.bus.subscribe_with_replay()
    }

    /// Ingest all units, then analyze the quiescent graph and publish the
    /// report. Per-unit failures are part of the summary, never an `Err`;
    /// only an invalid rule set fails the analysis step (the summary is
    /// still recorded and retrievable).
    pub async fn run(
        &self,
        units: Vec<ResolvedUnit>,
    ) -> Result<(Arc<RunSummary>, Arc<ComponentReport>)> {
        self.inner.cancel.send_replace(false);
        let pipeline = IngestionPipeline::new(
            Arc::clone(&self.inner.store),
            Arc::clone(&self.inner.bus),
            self.inner.config.pipeline.clone(),
            self.inner.cancel.subscribe(),
        );
        let summary = Arc::new(pipeline.run(units).await);
        let cancelled = summary.status == RunStatus::Cancelled;
        {
            let mut state = self.inner.state.write().unwrap();
            state.last_summary = Some(Arc::clone(&summary));
            state.quiescent = !cancelled;
        }
        self.inner
            .bus
            .publish(AnalysisEvent::RunCompleted(Arc::clone(&summary)));

        // A cancelled run analyzes whatever prefix of the input made it in.
        let report = self.analyze_snapshot(cancelled)?;
        Ok((summary, report))
    }

    /// Analyze the store as it is right now. Before quiescence this is the
    /// explicit best-effort-so-far path and the report is labeled partial.
    pub fn analyze_now(&self) -> Result<Arc<ComponentReport>> {
        let quiescent = self.inner.state.read().unwrap().quiescent;
        self.analyze_snapshot(!quiescent)
    }

    fn analyze_snapshot(&self, partial: bool) -> Result<Arc<ComponentReport>> {
        let analyzer = Analyzer::new(
            &self.inner.config.rules,
            self.inner.config.analyzer.clone(),
        )
        .context("invalid layering rules; analysis refused")?;

        let snapshot = self.inner.store.snapshot();
        let report = Arc::new(analyzer.analyze(&snapshot, &self.inner.project, partial));
        info!(
            nodes = report.node_count,
            edges = report.edge_count,
            components = report.components.len(),
            violations = report.violations.len(),
            partial,
            "analysis complete"
        );
        self.inner.state.write().unwrap().last_report = Some(Arc::clone(&report));
        self.inner
            .bus
            .publish(AnalysisEvent::ReportReady(Arc::clone(&report)));
        Ok(report)
    }

    /// Request cooperative cancellation of the running ingest pass.
    pub fn cancel(&self) {
        let _ = self.inner.cancel.send(true);
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            project: self.inner.project.clone(),
            node_count: self.inner.store.node_count(),
            edge_count: self.inner.store.edge_count(),
            quiescent: self.inner.state.read().unwrap().quiescent,
        }
    }

    pub fn last_summary(&self) -> Option<Arc<RunSummary>> {
        self.inner.state.read().unwrap().last_summary.clone()
    }

    pub fn last_report(&self) -> Option<Arc<ComponentReport>> {
        self.inner.state.read().unwrap().last_report.clone()
    }
}
