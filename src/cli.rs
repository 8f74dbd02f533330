//! CLI command implementations: load resolver output, drive the engine, and
//! render results as text or JSON.

use crate::adapters::json;
use crate::app::engine::{AnalysisEngine, EngineConfig};
use crate::app::pipeline::RunSummary;
use crate::domain::report::ComponentReport;
use crate::server;
use anyhow::Result;
use std::net::SocketAddr;
use std::path::Path;

/// Ingest all units from a resolver-produced JSON file, analyze, and print
/// the report.
pub async fn analyze(units_path: &Path, config: EngineConfig, json_output: bool) -> Result<()> {
    let project = json::load_project(units_path)?;
    let engine = AnalysisEngine::new(project.project_name.clone(), config);
    let (summary, report) = engine.run(project.units).await?;

    if json_output {
        let combined = serde_json::json!({
            "summary": &*summary,
            "report": &*report,
        });
        println!("{}", serde_json::to_string_pretty(&combined)?);
    } else {
        print_text_report(&summary, &report);
    }
    Ok(())
}

/// Run the analysis in the background and serve results over HTTP.
pub async fn serve(units_path: &Path, config: EngineConfig, addr: SocketAddr) -> Result<()> {
    let project = json::load_project(units_path)?;
    let engine = AnalysisEngine::new(project.project_name.clone(), config);

    let background = engine.clone();
    let units = project.units;
    tokio::spawn(async move {
        if let Err(err) = background.run(units).await {
            tracing::error!(error = %format!("{err:#}"), "background run failed");
        }
    });

    server::http::serve(engine, addr).await
}

fn print_text_report(summary: &RunSummary, report: &ComponentReport) {
    println!(
        "analyzed {} nodes, {} edges ({}/{} units processed, {} failed, {} discarded{})",
        report.node_count,
        report.edge_count,
        summary.processed,
        summary.submitted,
        summary.failed.len(),
        summary.discarded,
        if report.partial { "; PARTIAL" } else { "" },
    );

    if report.components.is_empty() {
        println!("no dependency cycles found");
    } else {
        println!("dependency cycles ({}):", report.components.len());
        for component in &report.components {
            println!("  {}", component.join(" <-> "));
        }
    }

    if report.violations.is_empty() {
        println!("no layering violations");
    } else {
        println!("layering violations ({}):", report.violations.len());
        for violation in &report.violations {
            let line = violation
                .origin
                .line
                .map(|l| format!(" at line {l}"))
                .unwrap_or_default();
            println!(
                "  [{}] {} -> {} ({}){}",
                violation.rule_id, violation.from, violation.to, violation.kind, line
            );
        }
    }

    if !summary.failed.is_empty() {
        println!("failed units ({}):", summary.failed.len());
        for failed in &summary.failed {
            println!("  {}: {}", failed.unit, failed.failure);
        }
    }

    println!();
    print!("{}", report.rollup);
}
