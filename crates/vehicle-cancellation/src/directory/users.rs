use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::DirectoryError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    /// Case officer with the same privileges as an administrator.
    Specialist,
    #[default]
    Editor,
    Viewer,
}

impl UserRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "System Administrator",
            Self::Specialist => "Case Specialist (full access)",
            Self::Editor => "Data Entry",
            Self::Viewer => "Read Only",
        }
    }

    pub const fn has_full_privileges(self) -> bool {
        matches!(self, Self::Admin | Self::Specialist)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub role: UserRole,
    pub added_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDraft {
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub role: UserRole,
}

impl UserDraft {
    fn validated(self) -> Result<Self, DirectoryError> {
        let name = self.name.trim().to_string();
        let username = self.username.trim().to_string();
        if name.is_empty() {
            return Err(DirectoryError::BlankField("name"));
        }
        if username.is_empty() {
            return Err(DirectoryError::BlankField("username"));
        }
        Ok(Self {
            name,
            username,
            role: self.role,
        })
    }
}

/// Staff register. At least one full-privilege account is always kept so the
/// settings screens stay reachable.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: Mutex<Vec<User>>,
    sequence: AtomicU64,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, draft: UserDraft, added_on: NaiveDate) -> Result<User, DirectoryError> {
        let draft = draft.validated()?;
        let mut guard = self.users.lock().expect("user mutex poisoned");
        ensure_unique_username(&guard, &draft.username, None)?;

        let seq = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let user = User {
            id: UserId(format!("usr-{seq:06}")),
            name: draft.name,
            username: draft.username,
            role: draft.role,
            added_on,
        };
        guard.push(user.clone());
        info!(user_id = %user.id.0, role = user.role.label(), "user added");
        Ok(user)
    }

    pub fn update(&self, id: &UserId, draft: UserDraft) -> Result<User, DirectoryError> {
        let draft = draft.validated()?;
        let mut guard = self.users.lock().expect("user mutex poisoned");
        let position = find_position(&guard, id)?;
        ensure_unique_username(&guard, &draft.username, Some(id))?;

        let current_role = guard[position].role;
        if current_role.has_full_privileges()
            && !draft.role.has_full_privileges()
            && full_privilege_count(&guard) <= 1
        {
            warn!(user_id = %id.0, "refused to demote last full-privilege user");
            return Err(DirectoryError::LastFullPrivilegeUser);
        }

        let user = &mut guard[position];
        user.name = draft.name;
        user.username = draft.username;
        user.role = draft.role;
        info!(user_id = %id.0, role = user.role.label(), "user updated");
        Ok(user.clone())
    }

    pub fn remove(&self, id: &UserId) -> Result<User, DirectoryError> {
        let mut guard = self.users.lock().expect("user mutex poisoned");
        let position = find_position(&guard, id)?;

        if guard[position].role.has_full_privileges() && full_privilege_count(&guard) <= 1 {
            warn!(user_id = %id.0, "refused to remove last full-privilege user");
            return Err(DirectoryError::LastFullPrivilegeUser);
        }

        let removed = guard.remove(position);
        info!(user_id = %removed.id.0, "user removed");
        Ok(removed)
    }

    pub fn list(&self) -> Vec<User> {
        self.users.lock().expect("user mutex poisoned").clone()
    }
}

fn find_position(users: &[User], id: &UserId) -> Result<usize, DirectoryError> {
    users
        .iter()
        .position(|user| &user.id == id)
        .ok_or_else(|| DirectoryError::NotFound(format!("user {}", id.0)))
}

fn ensure_unique_username(
    users: &[User],
    username: &str,
    except: Option<&UserId>,
) -> Result<(), DirectoryError> {
    let lowered = username.to_lowercase();
    let taken = users
        .iter()
        .filter(|user| Some(&user.id) != except)
        .any(|user| user.username.to_lowercase() == lowered);
    if taken {
        Err(DirectoryError::DuplicateUsername(username.to_string()))
    } else {
        Ok(())
    }
}

fn full_privilege_count(users: &[User]) -> usize {
    users
        .iter()
        .filter(|user| user.role.has_full_privileges())
        .count()
}
