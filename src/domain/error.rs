//! Domain error types.

/// Top-level error type for voltrader.
#[derive(Debug, thiserror::Error)]
pub enum VoltraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("broker not ready: {reason}")]
    Connectivity { reason: String },

    #[error("gateway error during {operation}: {reason}")]
    Gateway { operation: String, reason: String },

    #[error("notification failed: {reason}")]
    Notify { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl VoltraderError {
    pub fn gateway(operation: &str, reason: impl Into<String>) -> Self {
        VoltraderError::Gateway {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        VoltraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn missing(section: &str, key: &str) -> Self {
        VoltraderError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }
    }

    /// Process exit status for this failure category.
    pub fn exit_status(&self) -> u8 {
        match self {
            VoltraderError::Io(_) => 1,
            VoltraderError::ConfigParse { .. }
            | VoltraderError::ConfigMissing { .. }
            | VoltraderError::ConfigInvalid { .. } => 2,
            VoltraderError::Connectivity { .. } => 3,
            VoltraderError::Gateway { .. } => 4,
            VoltraderError::Notify { .. } => 5,
        }
    }
}

impl From<&VoltraderError> for std::process::ExitCode {
    fn from(err: &VoltraderError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_gateway_error() {
        let err = VoltraderError::gateway("quote", "timeout");
        assert_eq!(err.to_string(), "gateway error during quote: timeout");
    }

    #[test]
    fn display_config_invalid() {
        let err = VoltraderError::invalid("session", "allocation_fraction", "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid config value [session] allocation_fraction: must be positive"
        );
    }

    #[test]
    fn exit_codes_are_distinct_per_category() {
        let cases = [
            (VoltraderError::Io(std::io::Error::other("x")), 1),
            (VoltraderError::missing("session", "symbols"), 2),
            (VoltraderError::invalid("schedule", "exit", "bad"), 2),
            (
                VoltraderError::Connectivity {
                    reason: "offline".into(),
                },
                3,
            ),
            (VoltraderError::gateway("positions", "down"), 4),
            (
                VoltraderError::Notify {
                    reason: "sink closed".into(),
                },
                5,
            ),
        ];
        for (err, expected) in &cases {
            assert_eq!(err.exit_status(), *expected, "{err}");
        }
    }
}
