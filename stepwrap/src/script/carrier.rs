//! The execution context owned by one step invocation.

use super::bindings::{Binding, Bindings, RESOURCE_BINDING};
use crate::context::{
    ExecutionContextBundle, HookContext, LibraryConfig, RunIdentity, StageContext, StepContext,
};
use crate::errors::{ResourceError, ReservedVariableError, StepError};
use crate::reserved::ReservedNameRegistry;
use crate::resources::ResourceResolver;

/// Default maximum nesting depth for steps invoked from within steps.
pub const DEFAULT_MAX_DEPTH: u32 = 5;

/// Everything a single step invocation can see.
///
/// A carrier is built by the host for one invocation and handed to the
/// script by shared reference, so its view cannot change while the script
/// runs. Carriers are never shared between invocations, even for steps of
/// the same library.
#[derive(Debug, Clone)]
pub struct StepScriptContext {
    bundle: ExecutionContextBundle,
    resources: ResourceResolver,
    run: Option<RunIdentity>,
    depth: u32,
    max_depth: u32,
}

impl StepScriptContext {
    /// Creates a carrier with empty context values.
    ///
    /// The resource resolver is fixed for the carrier's lifetime.
    #[must_use]
    pub fn new(resources: ResourceResolver) -> Self {
        Self {
            bundle: ExecutionContextBundle::new(),
            resources,
            run: None,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the whole context bundle.
    #[must_use]
    pub fn with_bundle(mut self, bundle: ExecutionContextBundle) -> Self {
        self.bundle = bundle;
        self
    }

    /// Attaches the run this step belongs to.
    #[must_use]
    pub fn with_run(mut self, run: RunIdentity) -> Self {
        self.run = Some(run);
        self
    }

    /// Sets the maximum nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Replaces the library configuration.
    pub fn set_config(&mut self, config: LibraryConfig) {
        self.bundle.set_config(config);
    }

    /// Replaces the hook context.
    pub fn set_hook_context(&mut self, hook_context: HookContext) {
        self.bundle.set_hook_context(hook_context);
    }

    /// Replaces the stage context.
    pub fn set_stage_context(&mut self, stage_context: StageContext) {
        self.bundle.set_stage_context(stage_context);
    }

    /// Replaces the step context.
    pub fn set_step_context(&mut self, step_context: StepContext) {
        self.bundle.set_step_context(step_context);
    }

    /// Returns the library configuration.
    #[must_use]
    pub fn config(&self) -> &LibraryConfig {
        self.bundle.config()
    }

    /// Returns the hook context.
    #[must_use]
    pub fn hook_context(&self) -> &HookContext {
        self.bundle.hook_context()
    }

    /// Returns the stage context.
    #[must_use]
    pub fn stage_context(&self) -> &StageContext {
        self.bundle.stage_context()
    }

    /// Returns the step context.
    #[must_use]
    pub fn step_context(&self) -> &StepContext {
        self.bundle.step_context()
    }

    /// Returns the context bundle.
    #[must_use]
    pub fn bundle(&self) -> &ExecutionContextBundle {
        &self.bundle
    }

    /// Returns the resource resolver.
    #[must_use]
    pub fn resources(&self) -> &ResourceResolver {
        &self.resources
    }

    /// Returns the run this step belongs to, or `None` outside a pipeline run.
    #[must_use]
    pub fn build(&self) -> Option<&RunIdentity> {
        self.run.as_ref()
    }

    /// Returns how many steps enclose this one.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Reads a library resource.
    ///
    /// # Errors
    ///
    /// See [`ResourceResolver::read`].
    pub fn resource(&self, path: &str) -> Result<String, ResourceError> {
        self.resources.read(path)
    }

    /// Reads a library resource without blocking the async runtime.
    ///
    /// # Errors
    ///
    /// See [`ResourceResolver::read`].
    pub async fn resource_async(&self, path: &str) -> Result<String, ResourceError> {
        self.resources.read_async(path).await
    }

    /// Returns the platform bindings: the four context values and `resource`.
    #[must_use]
    pub fn bindings(&self) -> Bindings {
        let mut bindings = Bindings::new();
        for (name, value) in self.bundle.to_bindings() {
            bindings.bind_platform(name, Binding::Value(value));
        }
        bindings.bind_platform(RESOURCE_BINDING, Binding::Resource(self.resources.clone()));
        bindings
    }

    /// Builds the full script namespace: platform bindings plus the names the
    /// script declares at top level.
    ///
    /// # Errors
    ///
    /// Returns `ReservedVariableError` if any declared name is reserved.
    pub fn bind_namespace<I>(
        &self,
        registry: &ReservedNameRegistry,
        declared: I,
    ) -> Result<Bindings, ReservedVariableError>
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        let mut bindings = self.bindings();
        bindings.declare_all(registry, declared)?;
        Ok(bindings)
    }

    /// Creates the carrier for a step invoked from within this step.
    ///
    /// The child keeps this step's hook context, stage context, run and
    /// limits, and gets its own step identity, configuration and resource
    /// root.
    ///
    /// # Errors
    ///
    /// Returns `StepError::NestingTooDeep` if the child would exceed the
    /// maximum depth.
    pub fn nested(
        &self,
        step_context: StepContext,
        config: LibraryConfig,
        resources: ResourceResolver,
    ) -> Result<Self, StepError> {
        if self.depth + 1 > self.max_depth {
            return Err(StepError::nesting_too_deep(
                self.step_context().label(),
                self.max_depth,
            ));
        }

        tracing::debug!(
            parent = %self.step_context().label(),
            child = %step_context.label(),
            depth = self.depth + 1,
            "Nested step context created"
        );

        let bundle = ExecutionContextBundle::new()
            .with_config(config)
            .with_hook_context(self.hook_context().clone())
            .with_stage_context(self.stage_context().clone())
            .with_step_context(step_context);

        Ok(Self {
            bundle,
            resources,
            run: self.run.clone(),
            depth: self.depth + 1,
            max_depth: self.max_depth,
        })
    }
}
