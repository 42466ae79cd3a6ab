use super::super::domain::VehicleRequest;
use serde::{Deserialize, Serialize};
use std::io::Write;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ExportOptions {
    /// Prefix the output with a UTF-8 byte order mark so spreadsheet tools
    /// detect the encoding of non-Latin names.
    #[serde(default)]
    pub include_bom: bool,
}

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Serial")]
    serial: usize,
    #[serde(rename = "Applicant")]
    applicant: &'a str,
    #[serde(rename = "Vehicle")]
    vehicle: &'a str,
    #[serde(rename = "Company")]
    company: &'a str,
    #[serde(rename = "Request Date")]
    request_date: String,
    #[serde(rename = "Final Status")]
    final_status: &'static str,
    #[serde(rename = "Notes")]
    notes: &'a str,
}

/// Write the report table as CSV, returning the number of data rows written.
pub fn export_csv<W: Write>(
    requests: &[VehicleRequest],
    mut writer: W,
    options: ExportOptions,
) -> Result<usize, ExportError> {
    if requests.is_empty() {
        return Err(ExportError::NoRecords);
    }

    if options.include_bom {
        writer.write_all(UTF8_BOM)?;
    }

    let mut csv_writer = csv::Writer::from_writer(writer);
    for (index, request) in requests.iter().enumerate() {
        csv_writer.serialize(ExportRow {
            serial: index + 1,
            applicant: &request.applicant_name,
            vehicle: &request.vehicle_number,
            company: &request.company,
            request_date: request.request_date.format("%Y-%m-%d").to_string(),
            final_status: request.final_status().label(),
            notes: &request.notes,
        })?;
    }
    csv_writer.flush()?;

    Ok(requests.len())
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("there are no requests to export")]
    NoRecords,
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode export: {0}")]
    Csv(#[from] csv::Error),
}
