//! Span attributes and timing for step invocations.

use crate::script::StepScriptContext;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;

/// Span attributes for a step invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepSpanAttributes {
    /// `library.step` label.
    pub step: String,
    /// Enclosing stage name.
    pub stage: Option<String>,
    /// Step that fired the hook, when hook-triggered.
    pub hook_step: Option<String>,
    /// Run display name.
    pub run: Option<String>,
    /// Nesting depth.
    pub depth: u32,
    /// Final status.
    pub status: Option<String>,
    /// Duration in milliseconds.
    pub duration_ms: Option<f64>,
    /// Error type tag if failed.
    pub error: Option<String>,
}

impl StepSpanAttributes {
    /// Creates span attributes describing the carrier's step.
    #[must_use]
    pub fn from_context(ctx: &StepScriptContext) -> Self {
        Self {
            step: ctx.step_context().label(),
            stage: ctx.stage_context().name.clone(),
            hook_step: ctx.hook_context().step.clone(),
            run: ctx.build().map(crate::context::RunIdentity::display_name),
            depth: ctx.depth(),
            ..Default::default()
        }
    }

    /// Sets the status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Sets the duration.
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Sets the error.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Converts to OpenTelemetry attributes.
    #[must_use]
    pub fn to_otel_attributes(&self) -> HashMap<String, String> {
        let mut attrs = HashMap::from([
            ("step.name".to_string(), self.step.clone()),
            ("step.depth".to_string(), self.depth.to_string()),
        ]);

        let optional = [
            ("step.stage", self.stage.clone()),
            ("step.hook_step", self.hook_step.clone()),
            ("pipeline.run", self.run.clone()),
            ("step.status", self.status.clone()),
            ("step.duration_ms", self.duration_ms.map(|ms| ms.to_string())),
            ("step.error", self.error.clone()),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                attrs.insert(key.to_string(), value);
            }
        }

        attrs
    }
}

/// Times one step invocation.
///
/// Keeps the wall-clock start for reporting alongside a monotonic clock for
/// the duration.
#[derive(Debug)]
pub struct SpanTimer {
    step: String,
    started_at: DateTime<Utc>,
    clock: Instant,
}

impl SpanTimer {
    /// Starts timing `step`.
    #[must_use]
    pub fn start(step: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            started_at: Utc::now(),
            clock: Instant::now(),
        }
    }

    /// Returns the step being timed.
    #[must_use]
    pub fn step(&self) -> &str {
        &self.step
    }

    /// Returns when timing started.
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.clock.elapsed().as_secs_f64() * 1000.0
    }
}
