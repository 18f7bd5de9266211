//! Error types for the gateway, storage and geolocation capabilities.

use thiserror::Error;

/// Failures talking to the upstream weather API.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No response was received.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A response arrived with a non-success status.
    #[error("{operation} request failed with status {status}: {body}")]
    Upstream {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// The response body did not have the documented shape.
    #[error("Malformed {operation} response: {reason}")]
    Parse {
        operation: &'static str,
        reason: String,
    },
}

impl GatewayError {
    /// Single-line message suitable for the dashboard's error panel.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Network error. Check your connection.".to_string(),
            Self::Upstream { operation, status, .. } => {
                format!("{} failed (HTTP {status})", capitalize(operation))
            }
            Self::Parse { operation, .. } => format!("Received malformed {operation} data"),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Failures reading or writing persisted state.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored value for '{key}' is unreadable: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("Failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failures obtaining the device position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("Location permission denied")]
    Denied,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location service unavailable")]
    Unavailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_user_message_hides_body() {
        let err = GatewayError::Upstream {
            operation: "forecast",
            status: 502,
            body: "<html>bad gateway</html>".into(),
        };
        assert_eq!(err.user_message(), "Forecast failed (HTTP 502)");
        assert!(err.to_string().contains("bad gateway"));
    }

    #[test]
    fn parse_user_message_names_operation() {
        let err = GatewayError::Parse {
            operation: "forecast",
            reason: "missing field `current`".into(),
        };
        assert_eq!(err.user_message(), "Received malformed forecast data");
    }

    #[test]
    fn geolocation_error_display() {
        assert!(GeolocationError::Timeout.to_string().contains("timed out"));
        assert!(GeolocationError::Denied.to_string().contains("denied"));
    }
}
