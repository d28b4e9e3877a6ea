//! Error types shared across the dashboard core.
//!
//! Every failure here is a local validation outcome. Nothing in the alert
//! store can fail because of I/O; only the session store and settings touch
//! the disk.

use std::io;

use super::alerts::model::AlertId;

/// Errors from alert store mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlertError {
    /// `resolve` or `dismiss` was called with an id the store doesn't hold.
    #[error("alert {0} not found")]
    NotFound(AlertId),
}

/// Errors from the mock login.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Email or password was empty.
    #[error("invalid credentials")]
    InvalidCredentials,
}

/// Errors writing the session slot.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session store I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("session could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors reading or writing settings.json.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("settings I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors talking to the background monitor task.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MonitorError {
    /// The monitor loop has already shut down.
    #[error("monitor is stopped")]
    Stopped,

    #[error(transparent)]
    Alert(#[from] AlertError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(AlertError::NotFound(AlertId::new(999)).to_string(), "alert 999 not found");
        assert_eq!(AuthError::InvalidCredentials.to_string(), "invalid credentials");
        assert_eq!(MonitorError::Stopped.to_string(), "monitor is stopped");
    }

    #[test]
    fn test_config_error_from_io() {
        let err: ConfigError = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, ConfigError::Io(_)));
        assert_eq!(err.to_string(), "settings I/O failed: denied");
    }

    #[test]
    fn test_monitor_error_wraps_alert_error() {
        let err: MonitorError = AlertError::NotFound(AlertId::new(7)).into();
        assert_eq!(err.to_string(), "alert 7 not found");
    }
}
