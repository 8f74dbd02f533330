//! Full engine pass over resolver JSON: ingest, analyze, publish.

mod common;

use common::fixtures::{failed_unit, unit};
use depscope::adapters::json::load_project;
use depscope::app::bus::AnalysisEvent;
use depscope::app::engine::{AnalysisEngine, EngineConfig};
use depscope::app::pipeline::RunStatus;
use depscope::domain::edge::EdgeKind;
use depscope::domain::rules::LayeringRule;
use std::io::Write as _;

fn demo_config() -> EngineConfig {
    EngineConfig {
        rules: vec![LayeringRule {
            id: "no-ui-to-data".to_string(),
            from_pattern: "ui.*".to_string(),
            to_pattern: "data.*".to_string(),
            allowed: false,
        }],
        ..EngineConfig::default()
    }
}

#[tokio::test]
async fn test_run_reports_cycles_violations_and_failures() {
    let engine = AnalysisEngine::new("demo", demo_config());
    let units = vec![
        unit(
            "ui.Screen",
            &[
                ("data.Repo", EdgeKind::FieldType),
                ("app.Controller", EdgeKind::Uses),
            ],
        ),
        unit("app.Controller", &[("data.Repo", EdgeKind::ParamType)]),
        unit("data.Repo", &[("app.Controller", EdgeKind::Uses)]),
        failed_unit("broken.Unit", "could not resolve"),
    ];

    let (summary, report) = engine.run(units).await.unwrap();

    assert_eq!(summary.status, RunStatus::Complete);
    assert_eq!(summary.processed, 3);
    assert_eq!(summary.failed_count(), 1);
    assert_eq!(summary.failed[0].unit, "broken.Unit");

    assert!(!report.partial);
    assert_eq!(
        report.components,
        vec![vec!["app.Controller".to_string(), "data.Repo".to_string()]]
    );
    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].rule_id, "no-ui-to-data");
    assert_eq!(report.violations[0].from, "ui.Screen");

    // ui.Screen: two outgoing simple edges, nothing incoming.
    let screen = &report.metrics["ui.Screen"];
    assert_eq!((screen.fan_in, screen.fan_out), (0, 2));
    assert_eq!(screen.instability, 1.0);

    // Rollup covers the three declared units, grouped by package.
    assert_eq!(report.rollup.unit_count, 3);
    let packages: Vec<&str> = report
        .rollup
        .packages
        .iter()
        .map(|p| p.package.as_str())
        .collect();
    assert_eq!(packages, vec!["app", "data", "ui"]);
}

#[tokio::test]
async fn test_event_stream_ends_with_summary_and_report() {
    let engine = AnalysisEngine::new("demo", EngineConfig::default());
    let mut rx = engine.subscribe();

    engine
        .run(vec![
            unit("a.A", &[("b.B", EdgeKind::Uses)]),
            failed_unit("c.Bad", "nope"),
        ])
        .await
        .unwrap();

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    assert!(matches!(events.last(), Some(AnalysisEvent::ReportReady(_))));
    let run_completed = events
        .iter()
        .find_map(|e| match e {
            AnalysisEvent::RunCompleted(summary) => Some(summary),
            _ => None,
        })
        .expect("run completion published");
    assert_eq!(run_completed.processed, 1);
    assert_eq!(run_completed.failed.len(), 1);
}

#[tokio::test]
async fn test_best_effort_analysis_is_labeled_partial() {
    let engine = AnalysisEngine::new("demo", EngineConfig::default());
    // Nothing ingested yet: the store is not quiescent, so on-demand
    // analysis is explicitly partial.
    let report = engine.analyze_now().unwrap();
    assert!(report.partial);
    assert_eq!(report.node_count, 0);
}

#[tokio::test]
async fn test_invalid_rules_refuse_analysis_but_keep_summary() {
    let config = EngineConfig {
        rules: vec![LayeringRule {
            id: "broken".to_string(),
            from_pattern: "ui.[".to_string(),
            to_pattern: "data.*".to_string(),
            allowed: false,
        }],
        ..EngineConfig::default()
    };
    let engine = AnalysisEngine::new("demo", config);
    let err = engine
        .run(vec![unit("a.A", &[("b.B", EdgeKind::Uses)])])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("analysis refused"));

    // Ingestion still completed; only the analysis step was refused.
    let summary = engine.last_summary().expect("summary recorded");
    assert_eq!(summary.processed, 1);
    assert!(engine.last_report().is_none());
}

#[tokio::test]
async fn test_resolver_json_file_end_to_end() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "project_name": "filedemo",
            "units": [
                {{
                    "qualified_name": "ui.Screen",
                    "references": [
                        {{"target": "data.Repo", "kind": "fieldType", "line": 3, "preview": "Repo repo"}},
                        {{"target": null, "kind": "uses"}}
                    ]
                }},
                {{"qualified_name": "data.Repo", "references": [{{"target": "ui.Screen", "kind": "uses"}}]}}
            ]
        }}"#
    )
    .unwrap();

    let project = load_project(file.path()).unwrap();
    let engine = AnalysisEngine::new(project.project_name.clone(), EngineConfig::default());
    let (summary, report) = engine.run(project.units).await.unwrap();

    assert_eq!(summary.processed, 2);
    // The unresolved reference was dropped, not turned into a phantom node.
    assert_eq!(report.node_count, 2);
    assert_eq!(report.edge_count, 2);
    assert_eq!(
        report.components,
        vec![vec!["data.Repo".to_string(), "ui.Screen".to_string()]]
    );
    assert_eq!(report.rollup.project, "filedemo");
}
