//! Behavior kinds by name.

use rustc_hash::FxHashMap;

use crate::builtin;
use crate::{Behavior, NoopBehavior};

/// Builds a fresh, unconfigured behavior instance.
pub type BehaviorFactory = Box<dyn Fn() -> Box<dyn Behavior> + Send + Sync>;

/// Maps the `kind` of a [`ParameterBlock`](crate::ParameterBlock) to a
/// factory.
///
/// # Example
///
/// ```rust
/// use drift_behavior::{BehaviorRegistry, NoopBehavior};
///
/// let mut registry = BehaviorRegistry::with_builtins();
/// registry.register_default::<NoopBehavior>("idle");
/// assert!(registry.contains("advection"));
/// assert!(registry.create("idle").is_some());
/// ```
#[derive(Default)]
pub struct BehaviorRegistry {
    factories: FxHashMap<String, BehaviorFactory>,
}

impl BehaviorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in kind plus `"noop"`.
    pub fn with_builtins() -> Self {
        let mut r = Self::new();
        r.register_default::<NoopBehavior>("noop");
        builtin::register(&mut r);
        r
    }

    /// Register `factory` under `kind`, replacing any previous entry.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn Behavior> + Send + Sync + 'static,
    {
        self.factories.insert(kind.into(), Box::new(factory));
        self
    }

    /// Register a behavior built with `Default`.
    pub fn register_default<B: Behavior + Default>(&mut self, kind: impl Into<String>) -> &mut Self {
        self.register(kind, || Box::new(B::default()) as Box<dyn Behavior>)
    }

    pub fn create(&self, kind: &str) -> Option<Box<dyn Behavior>> {
        self.factories.get(kind).map(|f| f())
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }
}

impl std::fmt::Debug for BehaviorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviorRegistry").field("kinds", &self.kinds()).finish()
    }
}
