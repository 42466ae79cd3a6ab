use super::super::domain::{StepStatus, VehicleRequest};
use super::super::settings::SystemSettings;
use super::super::status::{
    aggregate_stats, classify_row, company_bucket, compute_due_date, days_until_due,
    is_in_warning_window, is_overdue, latest_active_step, RowStatusKind,
};
use super::views::{
    CancellationReport, CompanyLoadEntry, Letterhead, RequestRowView, RequestStatusView,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone)]
struct CompanyLoad {
    total: usize,
    completed: usize,
    overdue: usize,
}

impl CancellationReport {
    pub fn build(
        requests: &[VehicleRequest],
        today: NaiveDate,
        settings: &SystemSettings,
    ) -> Self {
        let config = &settings.notifications;
        let stats = aggregate_stats(requests, today, config);

        let mut loads: BTreeMap<String, CompanyLoad> = BTreeMap::new();
        let mut rows = Vec::with_capacity(requests.len());

        for request in requests {
            let row = row_view(request, today, settings);

            let load = loads
                .entry(company_bucket(&request.company).to_string())
                .or_default();
            load.total += 1;
            if request.cancellation.status == StepStatus::Done {
                load.completed += 1;
            }
            if row.row_status == RowStatusKind::Overdue {
                load.overdue += 1;
            }

            rows.push(row);
        }

        let company_breakdown = loads
            .into_iter()
            .map(|(company, load)| CompanyLoadEntry {
                company,
                total: load.total,
                completed: load.completed,
                overdue: load.overdue,
            })
            .collect();

        let overdue = rows_with_status(&rows, RowStatusKind::Overdue);
        let warnings = rows_with_status(&rows, RowStatusKind::Warning);

        Self {
            today,
            letterhead: Letterhead {
                department_name: settings.department_name.clone(),
                section_name: settings.section_name.clone(),
                branch_name: settings.branch_name.clone(),
            },
            stats,
            company_breakdown,
            overdue,
            warnings,
            rows,
        }
    }
}

fn rows_with_status(rows: &[RequestRowView], kind: RowStatusKind) -> Vec<RequestRowView> {
    let mut matching: Vec<RequestRowView> = rows
        .iter()
        .filter(|row| row.row_status == kind)
        .cloned()
        .collect();
    matching.sort_by(|a, b| a.due_date.cmp(&b.due_date));
    matching
}

pub fn row_view(
    request: &VehicleRequest,
    today: NaiveDate,
    settings: &SystemSettings,
) -> RequestRowView {
    let latest = latest_active_step(request);
    let row_status = classify_row(request, today, &settings.notifications);
    let final_status = request.final_status();

    RequestRowView {
        id: request.id.clone(),
        applicant_name: request.applicant_name.clone(),
        vehicle_number: request.vehicle_number.clone(),
        company: request.company.clone(),
        request_date: request.request_date,
        due_date: compute_due_date(&request.correspondence, request.settlement_days),
        days_until_due: days_until_due(request, today),
        row_status,
        row_status_label: row_status.label(),
        latest_step: latest.milestone,
        latest_step_label: latest.milestone.label(),
        latest_step_status: latest.status,
        final_status,
        final_status_label: final_status.label(),
    }
}

pub fn status_view(
    request: &VehicleRequest,
    today: NaiveDate,
    settings: &SystemSettings,
) -> RequestStatusView {
    let config = &settings.notifications;
    let latest = latest_active_step(request);
    let row_status = classify_row(request, today, config);

    RequestStatusView {
        id: request.id.clone(),
        due_date: compute_due_date(&request.correspondence, request.settlement_days),
        days_until_due: days_until_due(request, today),
        overdue: is_overdue(request, today, config.notify_on_overdue),
        warning: is_in_warning_window(request, today, config.notify_before_days),
        latest_step: latest.milestone,
        latest_step_label: latest.milestone.label(),
        latest_step_status: latest.status,
        row_status,
        row_status_label: row_status.label(),
    }
}
