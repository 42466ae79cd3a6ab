use chrono::NaiveDate;
use vehicle_cancellation::workflows::cancellation::{
    CancellationReport, RequestImporter, RowStatusKind, StepStatus, SystemSettings,
};

#[test]
fn sample_file_builds_full_report() {
    let data = include_bytes!("../data/sample_requests.json");
    let requests = RequestImporter::from_reader(&data[..]).expect("sample file imports");
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[3].cancellation.status, StepStatus::Stopped);

    let today = NaiveDate::from_ymd_opt(2024, 6, 2).expect("valid date");
    let report = CancellationReport::build(&requests, today, &SystemSettings::default());

    assert_eq!(report.stats.total, 4);
    assert_eq!(report.stats.completed, 1);
    assert_eq!(report.stats.stopped, 1);
    assert_eq!(report.stats.pending, 2);
    assert_eq!(report.stats.overdue_count, 1);
    assert_eq!(report.stats.warning_count, 1);
    assert_eq!(report.stats.financial_collected, 1);
    assert_eq!(report.stats.completion_rate_pct, 25);
    assert_eq!(report.stats.by_company.get("unspecified"), Some(&1));

    let stopped = report
        .rows
        .iter()
        .find(|row| row.vehicle_number == "JKL 3456")
        .expect("stopped row present");
    assert_eq!(stopped.row_status, RowStatusKind::Stopped);
    assert!(stopped.due_date.is_none());
}

#[test]
fn missing_file_is_an_io_error() {
    let err = RequestImporter::from_path("data/does-not-exist.json")
        .expect_err("missing file rejected");
    assert!(err.to_string().starts_with("failed to read request file"));
}
