use crate::infra::{InMemoryAlertPublisher, InMemoryRequestRepository};
use chrono::{Local, NaiveDate};
use clap::Args;
use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vehicle_cancellation::config::AppConfig;
use vehicle_cancellation::directory::{UserDraft, UserRole};
use vehicle_cancellation::error::AppError;
use vehicle_cancellation::workflows::cancellation::{
    export_csv, AdministrativeStep, CancellationReport, CancellationService, ExportOptions,
    RequestDraft, RequestImporter, SettingsStore, SystemSettings, VehicleRequest,
};

type DemoService = CancellationService<InMemoryRequestRepository, InMemoryAlertPublisher>;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// JSON file holding an array of requests
    #[arg(long)]
    pub(crate) requests: PathBuf,
    /// Evaluation date for the report (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Include every request row in the output
    #[arg(long)]
    pub(crate) list_rows: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// JSON file holding an array of requests
    #[arg(long)]
    pub(crate) requests: PathBuf,
    /// Destination CSV file
    #[arg(long)]
    pub(crate) output: PathBuf,
    /// Prefix the file with a UTF-8 byte order mark
    #[arg(long)]
    pub(crate) bom: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the reporting date (defaults to today).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        requests,
        today,
        list_rows,
    } = args;

    let settings = AppConfig::load()?.workflow.into_settings()?;
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let requests = RequestImporter::from_path(&requests)?;

    let report = CancellationReport::build(&requests, today, &settings);
    print!("{}", ReportText { report: &report, list_rows });
    Ok(())
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let ExportArgs {
        requests,
        output,
        bom,
    } = args;

    let records = RequestImporter::from_path(&requests)?;
    let written = export_records(&records, &output, bom)?;
    println!("Exported {} requests to {}", written, output.display());
    Ok(())
}

fn export_records(
    records: &[VehicleRequest],
    output: &Path,
    include_bom: bool,
) -> Result<usize, AppError> {
    let file = File::create(output)?;
    let written = export_csv(records, BufWriter::new(file), ExportOptions { include_bom })?;
    Ok(written)
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    println!("Vehicle credential cancellation demo");
    let (service, alerts) = seeded_service(today)?;
    println!(
        "Directory: {} companies, {} staff users",
        service.companies().list().len(),
        service.users().list().len()
    );

    let report = service.report(today)?;
    print!(
        "{}",
        ReportText {
            report: &report,
            list_rows: true,
        }
    );

    service.sweep_alerts(today)?;
    let published = alerts.events();
    if published.is_empty() {
        println!("\nDue-date alerts: none");
    } else {
        println!("\nDue-date alerts");
        for alert in &published {
            println!("- [{}] {}", alert.severity.label(), alert.message);
        }
    }

    Ok(())
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn seeded_service(today: NaiveDate) -> Result<(DemoService, InMemoryAlertPublisher), AppError> {
    let alerts = InMemoryAlertPublisher::default();
    let service = CancellationService::new(
        Arc::new(InMemoryRequestRepository::default()),
        Arc::new(alerts.clone()),
        Arc::new(SettingsStore::new(SystemSettings::default())),
    );

    for (name, added_on) in [
        ("Al Noor Motors", date(2024, 1, 1)),
        ("General Vehicle Trading Co.", date(2024, 1, 5)),
        ("Gulf Motors", date(2024, 2, 10)),
        ("National Transport Co.", date(2024, 3, 15)),
    ] {
        service.companies().add(name, added_on)?;
    }

    for (name, username, role) in [
        ("Ahmed Mohammed", "admin_1", UserRole::Admin),
        ("Sara Ali", "staff_1", UserRole::Editor),
    ] {
        let draft = UserDraft {
            name: name.to_string(),
            username: username.to_string(),
            role,
        };
        service.users().add(draft, today)?;
    }

    for draft in sample_requests() {
        service.register().create(draft)?;
    }

    Ok((service, alerts))
}

fn sample_requests() -> Vec<RequestDraft> {
    let mut awaiting_fee = RequestDraft::new("Mohammed Ahmed Al-Ali", "ABC 1234", date(2024, 5, 10));
    awaiting_fee.ownership = "Private, outright".to_string();
    awaiting_fee.company = "National Transport Co.".to_string();
    awaiting_fee.correspondence = AdministrativeStep::done("M/123", "2024-04-10");
    awaiting_fee.notes = "Waiting on settlement fee".to_string();

    let mut expired_lease = RequestDraft::new("Fatima Hassan", "DEF 5678", date(2024, 5, 15));
    expired_lease.ownership = "Expired lease".to_string();
    expired_lease.company = "United Vehicles Co.".to_string();
    expired_lease.correspondence = AdministrativeStep::done("S/998", "2024-05-20");

    let mut completed = RequestDraft::new("Khalid Abdullah", "GHI 9012", date(2024, 5, 20));
    completed.ownership = "Outright".to_string();
    completed.company = "Gulf Motors".to_string();
    completed.correspondence = AdministrativeStep::done("L/445", "2024-05-22");
    completed.financial_settlement = AdministrativeStep::done("R/77", "2024-05-23");
    completed.cancellation = AdministrativeStep::done("Q/11", "2024-05-25");
    completed.notes = "Completed".to_string();

    vec![awaiting_fee, expired_lease, completed]
}

/// Plain-text rendering of a report for the terminal.
pub(crate) struct ReportText<'a> {
    pub(crate) report: &'a CancellationReport,
    pub(crate) list_rows: bool,
}

impl fmt::Display for ReportText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        let stats = &report.stats;

        writeln!(f, "{}", report.letterhead.department_name)?;
        writeln!(
            f,
            "{} / {}",
            report.letterhead.section_name, report.letterhead.branch_name
        )?;
        writeln!(f, "Cancellation report (evaluated {})", report.today)?;
        writeln!(
            f,
            "- {} requests | {} completed | {} stopped | {} pending | {}% completion",
            stats.total, stats.completed, stats.stopped, stats.pending, stats.completion_rate_pct
        )?;
        writeln!(
            f,
            "- {} overdue | {} due soon | {} settlements collected",
            stats.overdue_count, stats.warning_count, stats.financial_collected
        )?;

        writeln!(f, "\nCompany breakdown")?;
        for entry in &report.company_breakdown {
            writeln!(
                f,
                "- {}: {} requests, {} completed, {} overdue",
                entry.company, entry.total, entry.completed, entry.overdue
            )?;
        }

        if report.overdue.is_empty() {
            writeln!(f, "\nOverdue settlements: none")?;
        } else {
            writeln!(f, "\nOverdue settlements")?;
            for row in &report.overdue {
                writeln!(
                    f,
                    "- {} ({}), due {}, {} days late",
                    row.applicant_name,
                    row.vehicle_number,
                    describe_date(row.due_date),
                    row.days_until_due.map(|days| -days).unwrap_or_default()
                )?;
            }
        }

        if report.warnings.is_empty() {
            writeln!(f, "\nDue soon: none")?;
        } else {
            writeln!(f, "\nDue soon")?;
            for row in &report.warnings {
                writeln!(
                    f,
                    "- {} ({}), due {}",
                    row.applicant_name,
                    row.vehicle_number,
                    describe_date(row.due_date)
                )?;
            }
        }

        if self.list_rows {
            writeln!(f, "\nRequests")?;
            for row in &report.rows {
                writeln!(
                    f,
                    "- {} | {} | {} | {}: {} | {}",
                    row.id,
                    row.applicant_name,
                    row.vehicle_number,
                    row.latest_step_label,
                    row.latest_step_status.label(),
                    row.row_status_label
                )?;
            }
        }

        Ok(())
    }
}

fn describe_date(date: Option<NaiveDate>) -> String {
    date.map(|value| value.to_string())
        .unwrap_or_else(|| "n/a".to_string())
}
