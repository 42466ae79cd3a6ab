use super::domain::{RequestId, VehicleRequest};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// Loads request snapshots exported from the editing system as a JSON array.
pub struct RequestImporter;

impl RequestImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<VehicleRequest>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<VehicleRequest>, ImportError> {
        let requests: Vec<VehicleRequest> = serde_json::from_reader(reader)?;

        let duplicate = {
            let mut seen: HashSet<&RequestId> = HashSet::with_capacity(requests.len());
            requests
                .iter()
                .find(|request| !seen.insert(&request.id))
                .map(|request| request.id.clone())
        };
        if let Some(id) = duplicate {
            return Err(ImportError::DuplicateId(id));
        }

        Ok(requests)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read request file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid request data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("request id {0} appears more than once")]
    DuplicateId(RequestId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::cancellation::domain::StepStatus;
    use std::io::Cursor;

    #[test]
    fn reads_requests_with_defaulted_steps() {
        let json = r#"[
            {
                "id": "1",
                "applicant_name": "Mohammed Ahmed",
                "vehicle_number": "ABC 1234",
                "company": "National Transport Co.",
                "request_date": "2024-05-10",
                "settlement_days": 15,
                "correspondence": { "status": "done", "book_number": "M/123", "book_date": "2024-04-10" }
            }
        ]"#;

        let requests = RequestImporter::from_reader(Cursor::new(json)).expect("import works");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].correspondence.status, StepStatus::Done);
        assert_eq!(requests[0].financial_settlement.status, StepStatus::Pending);
        assert_eq!(requests[0].notes, "");
    }

    #[test]
    fn keeps_malformed_book_dates_for_lenient_evaluation() {
        let json = r#"[{
            "id": "7",
            "applicant_name": "Legacy",
            "vehicle_number": "OLD 1",
            "request_date": "2023-01-01",
            "settlement_days": 15,
            "correspondence": { "status": "done", "book_date": "sometime in March" }
        }]"#;

        let requests = RequestImporter::from_reader(Cursor::new(json)).expect("import works");
        assert_eq!(requests[0].correspondence.parsed_book_date(), None);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let json = r#"[
            { "id": "1", "applicant_name": "A", "vehicle_number": "1", "request_date": "2024-01-01", "settlement_days": 15 },
            { "id": "1", "applicant_name": "B", "vehicle_number": "2", "request_date": "2024-01-02", "settlement_days": 15 }
        ]"#;

        match RequestImporter::from_reader(Cursor::new(json)) {
            Err(ImportError::DuplicateId(id)) => assert_eq!(id.0, "1"),
            other => panic!("expected duplicate id error, got {other:?}"),
        }
    }
}
