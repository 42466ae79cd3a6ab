use super::domain::NotificationConfig;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use tracing::info;

/// Process-wide settings edited from the settings screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemSettings {
    pub department_name: String,
    pub section_name: String,
    pub branch_name: String,
    /// Settlement window copied onto each request when it is created.
    pub default_settlement_days: u32,
    pub notifications: NotificationConfig,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            department_name: "Ministry of Transport".to_string(),
            section_name: "Vehicle Affairs Section".to_string(),
            branch_name: "Credential Cancellation Branch".to_string(),
            default_settlement_days: 15,
            notifications: NotificationConfig::default(),
        }
    }
}

impl SystemSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.default_settlement_days == 0 {
            return Err(SettingsError::InvalidSettlementDays);
        }

        for (field, value) in [
            ("department_name", &self.department_name),
            ("section_name", &self.section_name),
            ("branch_name", &self.branch_name),
        ] {
            if value.trim().is_empty() {
                return Err(SettingsError::BlankField(field));
            }
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("default settlement days must be at least 1")]
    InvalidSettlementDays,
    #[error("{0} must not be blank")]
    BlankField(&'static str),
}

/// Shared holder for the current [`SystemSettings`].
#[derive(Debug, Default)]
pub struct SettingsStore {
    current: RwLock<SystemSettings>,
}

impl SettingsStore {
    pub fn new(settings: SystemSettings) -> Self {
        Self {
            current: RwLock::new(settings),
        }
    }

    pub fn snapshot(&self) -> SystemSettings {
        self.current
            .read()
            .expect("settings lock poisoned")
            .clone()
    }

    pub fn notifications(&self) -> NotificationConfig {
        self.current
            .read()
            .expect("settings lock poisoned")
            .notifications
    }

    pub fn default_settlement_days(&self) -> u32 {
        self.current
            .read()
            .expect("settings lock poisoned")
            .default_settlement_days
    }

    pub fn update(&self, settings: SystemSettings) -> Result<SystemSettings, SettingsError> {
        settings.validate()?;
        let mut guard = self.current.write().expect("settings lock poisoned");
        *guard = settings.clone();
        info!(
            default_settlement_days = settings.default_settlement_days,
            notify_before_days = settings.notifications.notify_before_days,
            notify_on_overdue = settings.notifications.notify_on_overdue,
            "system settings updated"
        );
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_rejects_zero_settlement_days() {
        let store = SettingsStore::default();
        let settings = SystemSettings {
            default_settlement_days: 0,
            ..SystemSettings::default()
        };

        assert_eq!(
            store.update(settings),
            Err(SettingsError::InvalidSettlementDays)
        );
        assert_eq!(store.default_settlement_days(), 15);
    }

    #[test]
    fn update_rejects_blank_letterhead() {
        let store = SettingsStore::default();
        let settings = SystemSettings {
            branch_name: "  ".to_string(),
            ..SystemSettings::default()
        };

        assert_eq!(
            store.update(settings),
            Err(SettingsError::BlankField("branch_name"))
        );
    }

    #[test]
    fn update_replaces_snapshot() {
        let store = SettingsStore::default();
        let mut settings = SystemSettings::default();
        settings.default_settlement_days = 30;
        settings.notifications.notify_before_days = 7;

        store.update(settings.clone()).expect("valid settings");
        assert_eq!(store.snapshot(), settings);
        assert_eq!(store.notifications().notify_before_days, 7);
    }
}
