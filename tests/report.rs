/*
 * Galileo Network Analytics (GNA) Toolkit
 *
 * Copyright 2024-2025 Fidelis Farm & Technologies, LLC
 * All Rights Reserved.
 * See license information in LICENSE.
 */

use gnat_firewall::model::record::Action;
use gnat_firewall::model::table::{NumericColumn, PortCount};
use gnat_firewall::pipeline::anomaly::AnomalyKind;
use gnat_firewall::pipeline::recommend::{AllowVerdict, PortVerdict};
use gnat_firewall::pipeline::report::{build_report, ReportProcessor};
use gnat_firewall::pipeline::selection::ViewSelection;
use gnat_firewall::pipeline::{DashboardError, DatasetProcessor, ReportOptions, Session};
use std::fs;
use std::path::PathBuf;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/log_sample.csv")
}

#[test]
fn test_report_over_fixture() {
    let input = fixture();
    let mut session = Session::new(&input, ReportOptions::default());
    let dataset = session.dataset().expect("fixture loads");
    assert_eq!(dataset.len(), 18);

    let report = build_report(dataset, &ViewSelection::default(), &input).unwrap();

    let total: u64 = report.actions.counts.iter().map(|entry| entry.count).sum();
    assert_eq!(total, 18);
    assert_eq!(report.actions.counts[0].action, Action::Allow);
    assert_eq!(report.actions.counts[0].count, 12);

    let ports: Vec<i64> = report.ports.top_ports.iter().map(|entry| entry.port).collect();
    assert_eq!(ports, vec![80, 445, 443, 53, 3389, 23, 50321]);
    assert_eq!(report.ports.selected_ports, vec![80, 445, 443, 53, 3389]);

    // the unparseable Bytes cell is excluded, not counted as zero
    let web = report
        .ports
        .port_stats
        .iter()
        .find(|stats| stats.port == 80)
        .unwrap();
    assert_eq!(web.bytes_total, Some(1640.0));

    assert_eq!(report.anomalies[0].kind, AnomalyKind::LongLowData);
    assert_eq!(report.anomalies[0].count, 2);
    let ids: Vec<usize> = report.anomalies[1].preview.iter().map(|row| row.row_id).collect();
    assert_eq!(ids, vec![9, 10]);

    assert_eq!(report.correlations.sample.len(), 18);
    assert_eq!(report.correlations.x_axis, NumericColumn::Packets);

    let recommendations = &report.recommendations;
    assert!(matches!(recommendations.allow, AllowVerdict::Good(_)));
    assert_eq!(recommendations.smb, PortVerdict::Exposed(75.0));
    assert_eq!(
        recommendations.blocked_ports,
        vec![PortCount { port: 445, count: 3 }, PortCount { port: 23, count: 1 }]
    );
}

#[test]
fn test_report_processor_writes_json() {
    let output = std::env::temp_dir().join(format!("gnat-report-it-{}.json", std::process::id()));
    let selection = ViewSelection::new(5, Some(vec![445]), NumericColumn::Bytes, NumericColumn::ElapsedTime).unwrap();
    let mut processor = ReportProcessor::new(
        "report",
        &fixture(),
        output.to_str(),
        "json",
        selection,
        "sample=10;seed=42;head=1",
    )
    .unwrap();
    processor.run().unwrap();

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(value["ports"]["top_n"], 5);
    assert_eq!(value["ports"]["selected_ports"][0], 445);
    assert_eq!(value["correlations"]["sample"].as_array().unwrap().len(), 10);
    assert_eq!(value["anomalies"][0]["preview"].as_array().unwrap().len(), 1);
    fs::remove_file(&output).unwrap();
}

#[test]
fn test_missing_column_fails_the_load() {
    let input = std::env::temp_dir().join(format!("gnat-missing-{}.csv", std::process::id()));
    fs::write(&input, "Action,Destination Port,Bytes\nallow,80,100\n").unwrap();

    let mut session = Session::new(&input, ReportOptions::default());
    let err = session.dataset().err().unwrap();
    assert!(err.is_load_failure());
    assert!(matches!(err, DashboardError::MissingColumn(_)));
    fs::remove_file(&input).unwrap();
}
