//! # mimic-config
//!
//! Configuration loading for the MIMIC runtime.
//!
//! Every document is plain serde data from mimic-contracts. TOML is the
//! primary format; JSON files are accepted wherever TOML is. Nothing here
//! is global: callers load what they need and pass it into constructors.
//!
//! ```rust,ignore
//! use mimic_config::ConfigRoot;
//!
//! let root = ConfigRoot::new(".");
//! let persona = root.persona("shopper")?;
//! let flow = root.flow("checkout")?;
//! ```

pub mod document;
pub mod root;

pub use document::{from_file, from_toml_str, Format};
pub use root::ConfigRoot;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use mimic_contracts::{
        error::MimicError,
        flow::Flow,
        guardrail::GuardrailsConfig,
        models::ProviderKind,
        persona::{ExplorationStyle, Level},
    };

    use crate::{from_toml_str, ConfigRoot, Format};

    // ── Helpers ───────────────────────────────────────────────────────────────

    const PERSONA_TOML: &str = r#"
        id = "shopper"
        name = "Sam"
        role = "Office manager"
        seniority = "mid"
        company_context = "Orders supplies for a 20-person office"
        goal_orientation = "Gets it done quickly"
        skill_gaps = ["coupon codes"]
        patience_level = "low"
        exploration_style = "linear"
        trust_in_automation = "medium"

        [domain_knowledge]
        strong = ["online shopping"]

        [flow_goals]
        checkout = "Reorder printer paper before Friday"
    "#;

    const FLOW_JSON: &str = r#"{
        "name": "checkout",
        "start_url": "/products",
        "goal": "Buy one item",
        "success": "Order confirmation is shown",
        "max_steps": 12,
        "guardrail_overrides": { "allowed_button_texts": ["place order"] }
    }"#;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    // ── 1. ConfigRoot ─────────────────────────────────────────────────────────

    #[test]
    fn test_loads_toml_persona_and_json_flow() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "personas/shopper.toml", PERSONA_TOML);
        write(dir.path(), "flows/checkout.json", FLOW_JSON);
        let root = ConfigRoot::new(dir.path());

        let persona = root.persona("shopper").unwrap();
        assert_eq!(persona.patience_level, Level::Low);
        assert_eq!(persona.exploration_style, ExplorationStyle::Linear);
        assert_eq!(persona.domain_knowledge.strong, vec!["online shopping".to_string()]);
        assert!(persona.domain_knowledge.low.is_empty());

        let flow = root.flow("checkout").unwrap();
        assert_eq!(flow.max_steps, 12);
        assert_eq!(persona.goal_for(&flow), "Reorder printer paper before Friday");
        let overrides = flow.guardrail_overrides.unwrap();
        assert_eq!(overrides.allowed_button_texts, vec!["place order".to_string()]);
        assert!(overrides.blocked_selectors.is_empty());
    }

    #[test]
    fn test_toml_wins_over_json() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "config/guardrails.json", r#"{"allowed_domains": ["json.test"]}"#);
        write(dir.path(), "config/guardrails.toml", r#"allowed_domains = ["toml.test"]"#);

        let config = ConfigRoot::new(dir.path()).guardrails().unwrap();
        assert_eq!(config.allowed_domains, vec!["toml.test".to_string()]);
        assert!(config.blocked_selectors.is_empty());
    }

    #[test]
    fn test_loads_models() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "config/models.toml",
            r#"
            [vision]
            provider = "openai"
            model = "gpt-4o"

            [reasoning]
            provider = "google"
            model = "gemini-2.0-flash"
            max_tokens = 2048
            "#,
        );

        let models = ConfigRoot::new(dir.path()).models().unwrap();
        assert_eq!(models.vision.provider, ProviderKind::OpenAi);
        assert_eq!(models.reasoning.provider, ProviderKind::Google);
        assert_eq!(models.reasoning.max_tokens, 2048);
    }

    /// Documents written with camelCase keys load the same as snake_case ones.
    #[test]
    fn test_loads_camel_case_json_documents() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "personas/analyst.json",
            r#"{
                "id": "analyst",
                "name": "Ana",
                "role": "Data analyst",
                "seniority": "senior",
                "companyContext": "Runs weekly reports",
                "goalOrientation": "Thorough",
                "domainKnowledge": { "strong": ["SQL"], "moderate": [], "low": ["billing"] },
                "skillGaps": [],
                "behaviorTraits": ["reads every label"],
                "patienceLevel": "high",
                "explorationStyle": "exploratory",
                "trustInAutomation": "low",
                "frustrationTriggers": [],
                "typicalQuestions": ["Where is the export?"],
                "flowGoals": { "queries": "Find last week's failed queries" }
            }"#,
        );
        write(
            dir.path(),
            "flows/queries.json",
            r##"{
                "name": "queries",
                "startUrl": "/queries",
                "goal": "Review failed queries",
                "success": "The failed query list is visible",
                "maxSteps": 12,
                "guardrailOverrides": {
                    "allowedButtonTexts": ["retry"],
                    "blockedSelectors": ["#purge"]
                }
            }"##,
        );
        write(
            dir.path(),
            "config/guardrails.json",
            r#"{
                "blockedButtonTexts": ["delete"],
                "blockedSelectors": [],
                "blockedUrlPatterns": ["/admin"],
                "allowedDomains": ["app.example.com"]
            }"#,
        );
        let root = ConfigRoot::new(dir.path());

        let persona = root.persona("analyst").unwrap();
        assert_eq!(persona.company_context, "Runs weekly reports");
        assert_eq!(persona.trust_in_automation, Level::Low);
        assert_eq!(persona.typical_questions.len(), 1);

        let flow = root.flow("queries").unwrap();
        assert_eq!(flow.start_url, "/queries");
        assert_eq!(flow.max_steps, 12);
        assert_eq!(persona.goal_for(&flow), "Find last week's failed queries");
        let overrides = flow.guardrail_overrides.unwrap();
        assert_eq!(overrides.allowed_button_texts, vec!["retry".to_string()]);
        assert_eq!(overrides.blocked_selectors, vec!["#purge".to_string()]);

        let guardrails = root.guardrails().unwrap();
        assert_eq!(guardrails.blocked_url_patterns, vec!["/admin".to_string()]);
        assert_eq!(guardrails.allowed_domains, vec!["app.example.com".to_string()]);
    }

    /// A misspelled override list must fail loudly instead of dropping a rule.
    #[test]
    fn test_unknown_override_key_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "flows/typo.json",
            r#"{
                "name": "typo",
                "start_url": "/",
                "goal": "g",
                "success": "s",
                "guardrail_overrides": { "allowed_buton_texts": ["place order"] }
            }"#,
        );
        match ConfigRoot::new(dir.path()).flow("typo") {
            Err(MimicError::ConfigError { reason }) => {
                assert!(reason.contains("allowed_buton_texts"), "got: {reason}");
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_document_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        match ConfigRoot::new(dir.path()).flow("nope") {
            Err(MimicError::ConfigError { reason }) => {
                assert!(reason.contains("'nope'"), "got: {reason}");
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_document_names_path() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "flows/broken.json", r#"{"name": "broken"}"#);
        match ConfigRoot::new(dir.path()).flow("broken") {
            Err(MimicError::ConfigError { reason }) => {
                assert!(reason.contains("broken.json"), "got: {reason}");
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_path_like_names() {
        let root = ConfigRoot::new("/tmp");
        for name in ["../secrets", "a/b", "", ".hidden"] {
            assert!(
                matches!(root.flow(name), Err(MimicError::ConfigError { .. })),
                "'{name}' must be rejected"
            );
        }
    }

    // ── 2. Documents ──────────────────────────────────────────────────────────

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(Path::new("a/b.json")), Format::Json);
        assert_eq!(Format::from_path(Path::new("a/b.JSON")), Format::Json);
        assert_eq!(Format::from_path(Path::new("a/b.toml")), Format::Toml);
        assert_eq!(Format::from_path(Path::new("a/b")), Format::Toml);
    }

    #[test]
    fn test_from_toml_str_embedded() {
        let flow: Flow = from_toml_str(
            r#"
            name = "browse"
            start_url = "/"
            goal = "Look around"
            success = "Saw the catalog"
            max_steps = 3
            "#,
            "embedded flow",
        )
        .unwrap();
        assert_eq!(flow.max_steps, 3);

        let bad: Result<GuardrailsConfig, _> = from_toml_str("allowed_domains = 1", "embedded guardrails");
        match bad {
            Err(MimicError::ConfigError { reason }) => assert!(reason.contains("embedded guardrails")),
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }
}
