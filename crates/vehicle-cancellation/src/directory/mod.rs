//! Reference data maintained alongside the request register: approved
//! companies and the staff allowed to work on requests.

mod companies;
mod users;

pub use companies::{Company, CompanyDirectory, CompanyId};
pub use users::{User, UserDirectory, UserDraft, UserId, UserRole};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("{0} must not be blank")]
    BlankField(&'static str),
    #[error("company '{0}' is already registered")]
    DuplicateCompany(String),
    #[error("username '{0}' is already taken")]
    DuplicateUsername(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("at least one user with full privileges must remain")]
    LastFullPrivilegeUser,
}
