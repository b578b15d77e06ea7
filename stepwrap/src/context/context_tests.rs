//! Cross-type tests for the context module.

#[cfg(test)]
mod tests {
    use crate::context::{
        ExecutionContextBundle, HookContext, LibraryConfig, RunIdentity, StageContext,
        StepContext,
    };
    use pretty_assertions::assert_eq;

    fn populated() -> ExecutionContextBundle {
        ExecutionContextBundle::new()
            .with_config(
                LibraryConfig::new()
                    .with("image", serde_json::json!("node:20"))
                    .with("cache", serde_json::json!(true)),
            )
            .with_hook_context(HookContext::new().with_library("npm").with_step("install"))
            .with_stage_context(StageContext::named("build").with_arg("fast", serde_json::json!(1)))
            .with_step_context(StepContext::for_step("npm", "test"))
    }

    #[test]
    fn test_bundle_serialization_roundtrip_keeps_config_order() {
        let bundle = populated();
        let json = serde_json::to_string(&bundle).unwrap();
        let restored: ExecutionContextBundle = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, bundle);
        let keys: Vec<_> = restored.config().keys().collect();
        assert_eq!(keys, vec!["image", "cache"]);
    }

    #[test]
    fn test_bundle_deserializes_missing_fields_to_defaults() {
        let bundle: ExecutionContextBundle =
            serde_json::from_value(serde_json::json!({"stepContext": {"name": "lint"}})).unwrap();

        assert!(bundle.config().is_empty());
        assert_eq!(bundle.step_context().name.as_deref(), Some("lint"));
        assert_eq!(bundle.stage_context(), &StageContext::default());
    }

    #[test]
    fn test_bindings_carry_values() {
        let bindings = populated().to_bindings();

        assert_eq!(bindings[0].1["image"], serde_json::json!("node:20"));
        assert_eq!(bindings[1].1["library"], serde_json::json!("npm"));
        assert_eq!(bindings[2].1["args"]["fast"], serde_json::json!(1));
        assert_eq!(bindings[3].1["isAlias"], serde_json::json!(false));
    }

    #[test]
    fn test_clones_are_independent() {
        let original = populated();
        let mut copy = original.clone();
        copy.set_stage_context(StageContext::named("deploy"));

        assert_eq!(original.stage_context().name.as_deref(), Some("build"));
        assert_eq!(copy.stage_context().name.as_deref(), Some("deploy"));
    }

    #[test]
    fn test_run_identity_unique_per_run() {
        assert_ne!(RunIdentity::new().pipeline_run_id, RunIdentity::new().pipeline_run_id);
    }
}
