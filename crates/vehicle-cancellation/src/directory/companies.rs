use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::DirectoryError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyId(pub String);

/// Company approved to receive correspondence about a cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub added_on: NaiveDate,
}

#[derive(Debug, Default)]
pub struct CompanyDirectory {
    companies: Mutex<Vec<Company>>,
    sequence: AtomicU64,
}

impl CompanyDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, name: &str, added_on: NaiveDate) -> Result<Company, DirectoryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DirectoryError::BlankField("company name"));
        }

        let mut guard = self.companies.lock().expect("company mutex poisoned");
        let lowered = name.to_lowercase();
        if guard
            .iter()
            .any(|company| company.name.to_lowercase() == lowered)
        {
            return Err(DirectoryError::DuplicateCompany(name.to_string()));
        }

        let seq = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let company = Company {
            id: CompanyId(format!("co-{seq:06}")),
            name: name.to_string(),
            added_on,
        };
        guard.push(company.clone());
        info!(company_id = %company.id.0, name = %company.name, "company added");
        Ok(company)
    }

    pub fn remove(&self, id: &CompanyId) -> Result<Company, DirectoryError> {
        let mut guard = self.companies.lock().expect("company mutex poisoned");
        let position = guard
            .iter()
            .position(|company| &company.id == id)
            .ok_or_else(|| DirectoryError::NotFound(format!("company {}", id.0)))?;
        let removed = guard.remove(position);
        info!(company_id = %removed.id.0, "company removed");
        Ok(removed)
    }

    /// Companies sorted by name.
    pub fn list(&self) -> Vec<Company> {
        let mut companies = self
            .companies
            .lock()
            .expect("company mutex poisoned")
            .clone();
        companies.sort_by(|a, b| a.name.cmp(&b.name));
        companies
    }
}
