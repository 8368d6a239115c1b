//! Type-erased, per-agent extension state.
//!
//! # Design
//!
//! Behaviors that need to remember something about an agent across steps
//! (time spent in a recruitment zone, accumulated length, stage) attach a
//! *layer*: any `Clone + Send + Sync` value, stored in the agent's
//! [`LayerMap`] keyed by its `TypeId`.  A behavior typically inserts its
//! layer in `init` and reads it back in `execute`.
//!
//! # Usage
//!
//! ```rust
//! use drift_agent::LayerMap;
//!
//! #[derive(Clone, Default)]
//! struct Length(f64);
//!
//! let mut layers = LayerMap::new();
//! layers.insert(Length(1.5));
//! if let Some(l) = layers.get_mut::<Length>() {
//!     l.0 += 0.5;
//! }
//! assert_eq!(layers.get::<Length>().map(|l| l.0), Some(2.0));
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

// ── Trait object ──────────────────────────────────────────────────────────────

/// Type-erased interface for one layer value.
///
/// The trait is sealed (only implementable inside this crate) via the private
/// `Sealed` supertrait; every `Clone + Send + Sync + 'static` type gets it
/// through the blanket implementation.
pub trait Layer: Send + Sync + 'static + sealed::Sealed {
    #[doc(hidden)]
    fn clone_box(&self) -> Box<dyn Layer>;

    #[doc(hidden)]
    fn as_any(&self) -> &dyn Any;

    #[doc(hidden)]
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

mod sealed {
    pub trait Sealed {}
}

impl<T: Clone + Send + Sync + 'static> sealed::Sealed for T {}

impl<T: Clone + Send + Sync + 'static> Layer for T {
    fn clone_box(&self) -> Box<dyn Layer> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ── LayerMap ──────────────────────────────────────────────────────────────────

/// One value per layer type, owned by a single agent.
///
/// # Thread safety
///
/// `LayerMap` is `Send + Sync` because `Layer: Send + Sync`.  It belongs to
/// its agent and is only mutated by the worker stepping that agent.
#[derive(Default)]
pub struct LayerMap {
    map: HashMap<TypeId, Box<dyn Layer>>,
}

impl LayerMap {
    pub fn new() -> Self {
        Self { map: HashMap::new() }
    }

    /// Attach `value`, returning the previous layer of the same type.
    pub fn insert<T: Clone + Send + Sync + 'static>(&mut self, value: T) -> Option<T> {
        self.map
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|old| (*old).as_any().downcast_ref::<T>().cloned())
    }

    pub fn get<T: Clone + Send + Sync + 'static>(&self) -> Option<&T> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|l| (**l).as_any().downcast_ref::<T>())
    }

    pub fn get_mut<T: Clone + Send + Sync + 'static>(&mut self) -> Option<&mut T> {
        self.map
            .get_mut(&TypeId::of::<T>())
            .and_then(|l| (**l).as_any_mut().downcast_mut::<T>())
    }

    /// The layer of type `T`, attaching `T::default()` first if absent.
    pub fn get_or_default<T: Clone + Default + Send + Sync + 'static>(&mut self) -> &mut T {
        let slot = self
            .map
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(T::default()));
        if !(**slot).as_any().is::<T>() {
            *slot = Box::new(T::default());
        }
        match (**slot).as_any_mut().downcast_mut::<T>() {
            Some(v) => v,
            None => unreachable!("layer slot holds its own type"),
        }
    }

    pub fn remove<T: Clone + Send + Sync + 'static>(&mut self) -> Option<T> {
        self.map
            .remove(&TypeId::of::<T>())
            .and_then(|old| (*old).as_any().downcast_ref::<T>().cloned())
    }

    /// `true` if a layer of type `T` is attached.
    pub fn contains<T: Clone + Send + Sync + 'static>(&self) -> bool {
        self.map.contains_key(&TypeId::of::<T>())
    }

    /// Number of distinct layer types attached.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Clone for LayerMap {
    fn clone(&self) -> Self {
        Self {
            map: self.map.iter().map(|(k, v)| (*k, (**v).clone_box())).collect(),
        }
    }
}

impl fmt::Debug for LayerMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerMap").field("layers", &self.map.len()).finish()
    }
}
