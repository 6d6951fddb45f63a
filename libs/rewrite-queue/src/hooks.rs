//! Hook registry - producers and build observers
//!
//! Replaces a global named-event bus with explicit callback lists:
//! - producers: asked to register rule sets at the start of a pass
//! - per-name build handlers: fired for one specific rule set name
//! - component handlers: fired for every built name
//! - finalize handlers: fired once after the whole queue was built

use crate::register::RegistrationStore;
use std::collections::HashMap;
use std::sync::Arc;

/// Default producer priority (lower runs first)
pub const DEFAULT_PRIORITY: i32 = 10;

/// Something that contributes rule sets to a registration pass
pub trait RuleSetProducer: Send + Sync {
    fn register_rule_sets(&self, store: &mut RegistrationStore);
}

impl<F> RuleSetProducer for F
where
    F: Fn(&mut RegistrationStore) + Send + Sync,
{
    fn register_rule_sets(&self, store: &mut RegistrationStore) {
        self(store)
    }
}

pub type BuildHandler = Arc<dyn Fn() + Send + Sync>;
pub type ComponentHandler = Arc<dyn Fn(&str) + Send + Sync>;
pub type FinalizeHandler = Arc<dyn Fn() + Send + Sync>;

struct ProducerEntry {
    priority: i32,
    producer: Arc<dyn RuleSetProducer>,
}

/// Registered producers and build observers
#[derive(Default)]
pub struct Hooks {
    producers: Vec<ProducerEntry>,
    build_handlers: HashMap<String, Vec<BuildHandler>>,
    component_handlers: Vec<ComponentHandler>,
    finalize_handlers: Vec<FinalizeHandler>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a producer at the given priority
    ///
    /// Producers run in ascending priority; equal priorities run in the order
    /// they were added.
    pub fn add_producer(&mut self, priority: i32, producer: impl RuleSetProducer + 'static) {
        let entry = ProducerEntry {
            priority,
            producer: Arc::new(producer),
        };
        // Stable insert: after every entry with priority <= ours
        let pos = self
            .producers
            .iter()
            .position(|e| e.priority > priority)
            .unwrap_or(self.producers.len());
        self.producers.insert(pos, entry);
    }

    /// Handler for building one named rule set
    pub fn on_build_rule_set(
        &mut self,
        name: impl Into<String>,
        handler: impl Fn() + Send + Sync + 'static,
    ) {
        self.build_handlers
            .entry(name.into())
            .or_default()
            .push(Arc::new(handler));
    }

    /// Handler called with every rule set name as it is built
    pub fn on_build_component(&mut self, handler: impl Fn(&str) + Send + Sync + 'static) {
        self.component_handlers.push(Arc::new(handler));
    }

    /// Handler called once after all rule sets were built
    pub fn on_finalize(&mut self, handler: impl Fn() + Send + Sync + 'static) {
        self.finalize_handlers.push(Arc::new(handler));
    }

    pub fn producer_count(&self) -> usize {
        self.producers.len()
    }

    /// Ask every producer to register its rule sets
    pub(crate) fn fire_register(&self, store: &mut RegistrationStore) {
        for entry in &self.producers {
            entry.producer.register_rule_sets(store);
        }
    }

    /// Fire the per-name handlers, then the component handlers, for `name`
    pub(crate) fn fire_build(&self, name: &str) {
        if let Some(handlers) = self.build_handlers.get(name) {
            for handler in handlers {
                handler();
            }
        }
        for handler in &self.component_handlers {
            handler(name);
        }
    }

    pub(crate) fn fire_finalize(&self) {
        for handler in &self.finalize_handlers {
            handler();
        }
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::types::Placement;
    use std::sync::Mutex;

    #[test]
    fn test_producers_run_by_priority_then_insertion() {
        let mut hooks = Hooks::new();
        hooks.add_producer(100, |s: &mut RegistrationStore| {
            s.register_default("late", 1)
        });
        hooks.add_producer(DEFAULT_PRIORITY, |s: &mut RegistrationStore| {
            s.register_default("first", 1)
        });
        hooks.add_producer(DEFAULT_PRIORITY, |s: &mut RegistrationStore| {
            s.register_default("second", 1)
        });

        let mut store = RegistrationStore::new();
        hooks.fire_register(&mut store);

        let names: Vec<&String> = store.bucket("bottom").unwrap().keys().collect();
        assert_eq!(names, vec!["first", "second", "late"]);
        assert_eq!(hooks.producer_count(), 3);
    }

    #[test]
    fn test_struct_producer() {
        struct Pages;
        impl RuleSetProducer for Pages {
            fn register_rule_sets(&self, store: &mut RegistrationStore) {
                store.register("pages", "v1", Placement::Top);
            }
        }

        let mut hooks = Hooks::new();
        hooks.add_producer(DEFAULT_PRIORITY, Pages);

        let mut store = RegistrationStore::new();
        hooks.fire_register(&mut store);
        assert!(store.bucket("top").unwrap().contains_key("pages"));
    }

    #[test]
    fn test_build_fires_named_then_component() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut hooks = Hooks::new();

        let l = log.clone();
        hooks.on_build_component(move |name| l.lock().unwrap().push(format!("component:{}", name)));
        let l = log.clone();
        hooks.on_build_rule_set("posts", move || l.lock().unwrap().push("posts".to_string()));

        hooks.fire_build("posts");
        hooks.fire_build("tags");

        assert_eq!(
            *log.lock().unwrap(),
            vec!["posts", "component:posts", "component:tags"]
        );
    }
}
