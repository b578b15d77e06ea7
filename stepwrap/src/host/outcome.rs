//! Reportable result of a step invocation.

use crate::errors::StepError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Final status of a step invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// The script returned normally.
    Succeeded,
    /// The step was aborted.
    Failed,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// What the host reports for one step invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    /// `library.step` label.
    pub step: String,
    /// Final status.
    pub status: StepStatus,
    /// Value returned by the script.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
    /// Failure details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<HashMap<String, serde_json::Value>>,
    /// When the invocation started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: f64,
}

impl StepOutcome {
    /// Creates a successful outcome.
    #[must_use]
    pub fn succeeded(
        step: impl Into<String>,
        output: serde_json::Value,
        started_at: DateTime<Utc>,
        duration_ms: f64,
    ) -> Self {
        Self {
            step: step.into(),
            status: StepStatus::Succeeded,
            output: Some(output),
            error: None,
            started_at,
            duration_ms,
        }
    }

    /// Creates a failed outcome.
    #[must_use]
    pub fn failed(
        step: impl Into<String>,
        error: &StepError,
        started_at: DateTime<Utc>,
        duration_ms: f64,
    ) -> Self {
        Self {
            step: step.into(),
            status: StepStatus::Failed,
            output: None,
            error: Some(error.to_dict()),
            started_at,
            duration_ms,
        }
    }

    /// Returns true if the step succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == StepStatus::Succeeded
    }

    /// Returns the error type tag, if the step failed.
    #[must_use]
    pub fn error_type(&self) -> Option<&str> {
        self.error
            .as_ref()
            .and_then(|e| e.get("type"))
            .and_then(serde_json::Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ResourceError;

    #[test]
    fn test_failed_outcome_carries_error_dict() {
        let err = StepError::from(ResourceError::not_found("missing.txt"));
        let outcome = StepOutcome::failed("lib.step", &err, Utc::now(), 1.0);

        assert!(!outcome.is_success());
        assert_eq!(outcome.error_type(), Some("ResourceNotFoundError"));
        assert!(outcome.output.is_none());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&StepStatus::Failed).unwrap(), "\"failed\"");
        assert_eq!(StepStatus::Succeeded.to_string(), "succeeded");
    }
}
