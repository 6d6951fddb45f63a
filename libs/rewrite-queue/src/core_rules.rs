//! Host core rule import
//!
//! Registers the host's own rewrite rules so that changes to them also trigger
//! a rebuild: `core-top` at top, each permastruct by name at bottom, then
//! `core-bottom` at bottom. Each entry is versioned by a content digest.

use crate::error::Result;
use crate::hooks::RuleSetProducer;
use crate::register::RegistrationStore;
use crate::types::{Placement, RuleSetVersion};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::warn;

/// Priority the core import runs at, after regular producers
pub const CORE_RULES_PRIORITY: i32 = 100;

pub const CORE_TOP: &str = "core-top";
pub const CORE_BOTTOM: &str = "core-bottom";

/// Snapshot of the host's core rewrite rules
#[derive(Debug, Clone, Default)]
pub struct CoreRulesProducer {
    /// Rules the host places before everything else
    pub extra_rules_top: Value,
    /// Named permalink structures
    pub permastructs: IndexMap<String, Value>,
    /// Rules the host places after everything else
    pub extra_rules: Value,
}

impl CoreRulesProducer {
    pub fn new(
        extra_rules_top: Value,
        permastructs: IndexMap<String, Value>,
        extra_rules: Value,
    ) -> Self {
        Self {
            extra_rules_top,
            permastructs,
            extra_rules,
        }
    }
}

impl RuleSetProducer for CoreRulesProducer {
    fn register_rule_sets(&self, store: &mut RegistrationStore) {
        store.register(
            CORE_TOP,
            version_or_changed(CORE_TOP, &self.extra_rules_top),
            Placement::Top,
        );

        for (name, args) in &self.permastructs {
            store.register_default(name.as_str(), version_or_changed(name, args));
        }

        store.register_default(CORE_BOTTOM, version_or_changed(CORE_BOTTOM, &self.extra_rules));
    }
}

/// Version tag derived from a SHA-256 digest of the JSON encoding
pub fn content_version<T: Serialize + ?Sized>(content: &T) -> Result<RuleSetVersion> {
    let encoded = serde_json::to_vec(content)?;
    let mut hasher = Sha256::new();
    hasher.update(&encoded);
    Ok(RuleSetVersion::Text(format!("{:x}", hasher.finalize())))
}

/// Digest version, or one that never matches when the content cannot be encoded
fn version_or_changed<T: Serialize + ?Sized>(name: &str, content: &T) -> RuleSetVersion {
    match content_version(content) {
        Ok(version) => version,
        Err(e) => {
            warn!("Cannot digest rules for {}: {}, forcing rebuild", name, e);
            RuleSetVersion::always_changed()
        },
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::error::QueueError;
    use crate::queue::resolve;
    use serde_json::json;
    use std::collections::BTreeMap;
    use tracing_test::traced_test;

    // JSON object keys must be strings, so tuple keys fail to encode.
    fn unencodable(a: i32, b: i32, rule: &str) -> BTreeMap<(i32, i32), String> {
        BTreeMap::from([((a, b), rule.to_string())])
    }

    fn sample_core() -> CoreRulesProducer {
        let mut permastructs = IndexMap::new();
        permastructs.insert("category".to_string(), json!({"struct": "/category/%category%"}));
        permastructs.insert("post_tag".to_string(), json!({"struct": "/tag/%post_tag%"}));

        CoreRulesProducer::new(
            json!({"^api/?$": "index.php?api=1"}),
            permastructs,
            json!({"^feed/?$": "index.php?feed=rss2"}),
        )
    }

    #[test]
    fn test_core_rules_order() {
        let mut store = RegistrationStore::new();
        sample_core().register_rule_sets(&mut store);

        assert_eq!(
            resolve(&store),
            vec!["core-top", "category", "post_tag", "core-bottom"]
        );
    }

    #[test]
    fn test_content_version_is_stable_digest() {
        let a = content_version(&json!({"a": 1})).unwrap();
        let b = content_version(&json!({"a": 1})).unwrap();
        let c = content_version(&json!({"a": 2})).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        match a {
            RuleSetVersion::Text(hex) => assert_eq!(hex.len(), 64),
            other => panic!("Expected text digest, got {:?}", other),
        }
    }

    #[test]
    fn test_changed_permastruct_changes_snapshot() {
        let mut before = RegistrationStore::new();
        sample_core().register_rule_sets(&mut before);

        let mut core = sample_core();
        core.permastructs
            .insert("post_tag".to_string(), json!({"struct": "/topic/%post_tag%"}));
        let mut after = RegistrationStore::new();
        core.register_rule_sets(&mut after);

        assert_ne!(before.snapshot(), after.snapshot());
    }

    #[test]
    fn test_content_version_reports_encoding_failure() {
        let err = content_version(&unencodable(1, 2, "a")).unwrap_err();
        assert!(matches!(err, QueueError::SerializationError(_)));
    }

    #[test]
    #[traced_test]
    fn test_unencodable_rules_always_rebuild() {
        let rules = unencodable(1, 2, "a");
        let mut before = RegistrationStore::new();
        before.register_default("legacy", version_or_changed("legacy", &rules));
        let mut after = RegistrationStore::new();
        after.register_default("legacy", version_or_changed("legacy", &rules));

        assert!(matches!(
            &before.bucket("bottom").unwrap()["legacy"],
            RuleSetVersion::Float(v) if v.is_nan()
        ));
        assert_ne!(before.snapshot(), after.snapshot());
        assert!(logs_contain("Cannot digest rules for legacy"));
    }
}
