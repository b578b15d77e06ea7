//! Runs step scripts against freshly built carriers.

use super::{RunnerConfig, StepOutcome, StepStatus};
use crate::context::{ExecutionContextBundle, LibraryConfig, RunIdentity, StepContext};
use crate::errors::{ResourceError, StepError};
use crate::observability::{SpanTimer, StepSpanAttributes};
use crate::reserved::{ReservedNameRegistry, RESERVED_NAMES};
use crate::resources::ResourceResolver;
use crate::script::StepScriptContext;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// A user-authored step script.
///
/// How the script is parsed or compiled is up to the implementation; the
/// runner only needs its declared names and a way to run it against a
/// carrier.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StepScript: Send + Sync {
    /// Returns the step name, used in logs when the step context has none.
    fn name(&self) -> &str;

    /// Returns the names the script defines at top level.
    fn declared_names(&self) -> Vec<String>;

    /// Runs the script body.
    async fn run(&self, ctx: &StepScriptContext) -> anyhow::Result<serde_json::Value>;
}

/// What the host knows about one invocation before it starts.
#[derive(Debug, Clone)]
pub struct StepInvocation {
    /// Context values for the step.
    pub bundle: ExecutionContextBundle,
    /// Directory holding the library's resources.
    pub resource_root: PathBuf,
    /// The run the step belongs to.
    pub run: Option<RunIdentity>,
}

impl StepInvocation {
    /// Creates an invocation with empty context values.
    #[must_use]
    pub fn new(resource_root: impl Into<PathBuf>) -> Self {
        Self {
            bundle: ExecutionContextBundle::new(),
            resource_root: resource_root.into(),
            run: None,
        }
    }

    /// Sets the context bundle.
    #[must_use]
    pub fn with_bundle(mut self, bundle: ExecutionContextBundle) -> Self {
        self.bundle = bundle;
        self
    }

    /// Sets the run.
    #[must_use]
    pub fn with_run(mut self, run: RunIdentity) -> Self {
        self.run = Some(run);
        self
    }
}

/// Builds a carrier per invocation and runs step scripts against it.
pub struct StepRunner {
    registry: Arc<ReservedNameRegistry>,
    config: RunnerConfig,
}

impl Default for StepRunner {
    fn default() -> Self {
        Self::new(RunnerConfig::default())
    }
}

impl StepRunner {
    /// Creates a runner using the global reserved name registry.
    #[must_use]
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            registry: RESERVED_NAMES.clone(),
            config,
        }
    }

    /// Uses a specific registry.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<ReservedNameRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &ReservedNameRegistry {
        &self.registry
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    fn resolver(&self, root: impl Into<PathBuf>) -> ResourceResolver {
        ResourceResolver::new(root).with_config(self.config.resources.clone())
    }

    /// Validates the script's declared names and builds its carrier.
    ///
    /// # Errors
    ///
    /// Returns `StepError::ReservedVariable` if the script declares a
    /// reserved name.
    pub fn prepare(
        &self,
        script: &dyn StepScript,
        invocation: StepInvocation,
    ) -> Result<StepScriptContext, StepError> {
        self.registry.check_bindings(script.declared_names())?;

        let mut ctx = StepScriptContext::new(self.resolver(invocation.resource_root))
            .with_bundle(invocation.bundle)
            .with_max_depth(self.config.max_nesting_depth);
        if let Some(run) = invocation.run {
            ctx = ctx.with_run(run);
        }
        Ok(ctx)
    }

    /// Runs a script, returning its value or the error that aborted it.
    ///
    /// # Errors
    ///
    /// Any `StepError`. Resource and step errors raised inside the script
    /// body are reported as themselves rather than as script failures.
    pub async fn invoke(
        &self,
        script: &dyn StepScript,
        invocation: StepInvocation,
    ) -> Result<serde_json::Value, StepError> {
        let ctx = self.prepare(script, invocation)?;
        self.execute(script, &ctx).await
    }

    /// Runs `script` as a step invoked from within the step owning `parent`.
    ///
    /// # Errors
    ///
    /// `StepError::NestingTooDeep` when the depth limit is reached, or any
    /// error from [`invoke`](Self::invoke).
    pub async fn invoke_nested(
        &self,
        parent: &StepScriptContext,
        script: &dyn StepScript,
        step_context: StepContext,
        config: LibraryConfig,
        resource_root: impl Into<PathBuf>,
    ) -> Result<serde_json::Value, StepError> {
        self.registry.check_bindings(script.declared_names())?;
        let ctx = parent.nested(step_context, config, self.resolver(resource_root))?;
        self.execute(script, &ctx).await
    }

    /// Runs a script and converts the result into a reportable outcome.
    pub async fn run(&self, script: &dyn StepScript, invocation: StepInvocation) -> StepOutcome {
        let timer = SpanTimer::start(step_label(script, &invocation.bundle));
        let label = timer.step().to_string();
        let started_at = timer.started_at();

        tracing::info!(step = %label, "Step started");
        let result = self.invoke(script, invocation).await;
        let duration_ms = timer.elapsed_ms();

        match result {
            Ok(output) => {
                tracing::info!(step = %label, duration_ms, "Step succeeded");
                StepOutcome::succeeded(label, output, started_at, duration_ms)
            }
            Err(err) => {
                tracing::warn!(
                    step = %label,
                    duration_ms,
                    error_type = err.kind(),
                    error = %err,
                    "Step failed"
                );
                StepOutcome::failed(label, &err, started_at, duration_ms)
            }
        }
    }

    /// Runs several invocations concurrently.
    ///
    /// Each invocation gets its own carrier; outcomes are returned in input
    /// order.
    pub async fn run_all(
        &self,
        invocations: Vec<(Arc<dyn StepScript>, StepInvocation)>,
    ) -> Vec<StepOutcome> {
        let futures = invocations
            .into_iter()
            .map(|(script, invocation)| async move { self.run(script.as_ref(), invocation).await });
        futures::future::join_all(futures).await
    }

    async fn execute(
        &self,
        script: &dyn StepScript,
        ctx: &StepScriptContext,
    ) -> Result<serde_json::Value, StepError> {
        let attrs = StepSpanAttributes::from_context(ctx);
        tracing::debug!(attributes = ?attrs.to_otel_attributes(), "Step context bound");

        let timer = SpanTimer::start(attrs.step.clone());
        let result = script.run(ctx).await.map_err(classify);

        let attrs = match &result {
            Ok(_) => attrs.with_status(StepStatus::Succeeded.to_string()),
            Err(err) => attrs
                .with_status(StepStatus::Failed.to_string())
                .with_error(err.kind()),
        }
        .with_duration_ms(timer.elapsed_ms());
        tracing::debug!(attributes = ?attrs.to_otel_attributes(), "Step span closed");

        let output = result?;
        if self.config.log_step_output {
            tracing::debug!(step = %attrs.step, output = %output, "Step output");
        }
        Ok(output)
    }
}

fn step_label(script: &dyn StepScript, bundle: &ExecutionContextBundle) -> String {
    if bundle.step_context().name.is_some() {
        bundle.step_context().label()
    } else {
        script.name().to_string()
    }
}

// Scripts propagate carrier errors with `?`, which erases them into
// `anyhow::Error`; recover the typed error for reporting.
fn classify(err: anyhow::Error) -> StepError {
    match err.downcast::<ResourceError>() {
        Ok(resource) => StepError::Resource(resource),
        Err(err) => match err.downcast::<StepError>() {
            Ok(step) => step,
            Err(err) => StepError::Script(err),
        },
    }
}
