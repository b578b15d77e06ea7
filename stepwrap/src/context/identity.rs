//! Identity of the pipeline run a step belongs to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Identifies the build a step invocation runs inside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunIdentity {
    /// The unique ID for this pipeline run.
    pub pipeline_run_id: Uuid,

    /// The job the run belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,

    /// Sequential build number within the job.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_number: Option<u64>,

    /// When the run started.
    pub started_at: DateTime<Utc>,
}

impl RunIdentity {
    /// Creates a new run identity with a generated pipeline run ID.
    #[must_use]
    pub fn new() -> Self {
        Self::with_pipeline_run_id(Uuid::new_v4())
    }

    /// Creates a run identity with a specific pipeline run ID.
    #[must_use]
    pub fn with_pipeline_run_id(pipeline_run_id: Uuid) -> Self {
        Self {
            pipeline_run_id,
            job: None,
            build_number: None,
            started_at: Utc::now(),
        }
    }

    /// Sets the job name.
    #[must_use]
    pub fn with_job(mut self, job: impl Into<String>) -> Self {
        self.job = Some(job.into());
        self
    }

    /// Sets the build number.
    #[must_use]
    pub fn with_build_number(mut self, number: u64) -> Self {
        self.build_number = Some(number);
        self
    }

    /// Returns `job#number` when both are known, else the run ID.
    #[must_use]
    pub fn display_name(&self) -> String {
        match (&self.job, self.build_number) {
            (Some(job), Some(number)) => format!("{job}#{number}"),
            _ => self.pipeline_run_id.to_string(),
        }
    }

    /// Converts to a dictionary with string values (or null).
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert(
            "pipeline_run_id".to_string(),
            serde_json::json!(self.pipeline_run_id.to_string()),
        );
        map.insert(
            "job".to_string(),
            self.job.as_ref().map_or(serde_json::Value::Null, |j| serde_json::json!(j)),
        );
        map.insert(
            "build_number".to_string(),
            self.build_number.map_or(serde_json::Value::Null, |n| serde_json::json!(n)),
        );
        map.insert(
            "started_at".to_string(),
            serde_json::json!(self.started_at.to_rfc3339()),
        );
        map
    }
}

impl Default for RunIdentity {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_identity_display_name() {
        let identity = RunIdentity::new().with_job("app/main").with_build_number(42);
        assert_eq!(identity.display_name(), "app/main#42");

        let bare = RunIdentity::new();
        assert_eq!(bare.display_name(), bare.pipeline_run_id.to_string());
    }

    #[test]
    fn test_run_identity_to_dict() {
        let identity = RunIdentity::new().with_build_number(7);
        let dict = identity.to_dict();

        assert!(dict["job"].is_null());
        assert_eq!(dict["build_number"], serde_json::json!(7));
        assert!(!dict["pipeline_run_id"].is_null());
    }

    #[test]
    fn test_run_identity_serialization() {
        let identity = RunIdentity::new().with_job("lib-ci");
        let json = serde_json::to_string(&identity).unwrap();
        let deserialized: RunIdentity = serde_json::from_str(&json).unwrap();

        assert_eq!(identity, deserialized);
    }
}
