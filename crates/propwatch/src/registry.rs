#![forbid(unsafe_code)]

//! Per-owner callback registry keyed by property offset.
//!
//! # Design
//!
//! [`Registry<O>`] holds two maps, both keyed by a property's byte offset
//! inside `O`:
//!
//! - observers: `Rc<dyn Fn(&O)>`, invoked after a value is stored,
//! - validators: `Rc<dyn Fn(&O, T) -> T>` stored behind `dyn Any`, since
//!   one owner mixes properties of many value types.
//!
//! Validators are recovered with a checked downcast. A validator stored for
//! one type and requested as another yields
//! [`PropertyError::ValidatorTypeMismatch`]; nothing is invoked in that case.
//!
//! # Invariants
//!
//! 1. Callback lists keep registration order; dispatch follows it.
//! 2. Validators fold FIFO: each receives the previous one's output.
//! 3. An offset with no list behaves as identity (validators) or no-op
//!    (observers).
//! 4. No `RefCell` borrow is held while a callback runs. Callbacks may
//!    register, unregister or assign; changes apply to the next dispatch.
//!
//! # Performance
//!
//! | Operation     | Complexity                  |
//! |---------------|-----------------------------|
//! | register      | O(1) amortized              |
//! | unregister    | O(1) + drop of the list     |
//! | dispatch      | O(C) where C = callbacks    |

use std::any::{Any, type_name};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::config::{ClonePolicy, RegistryConfig};
use crate::error::{PropertyError, PropertyResult};

/// Observer callback as stored in the registry.
pub type ObserverFn<O> = Rc<dyn Fn(&O)>;

/// Validator callback for value type `T`.
pub type ValidatorFn<O, T> = Rc<dyn Fn(&O, T) -> T>;

/// A validator with its value type erased.
#[derive(Clone)]
struct ErasedValidator {
    /// Concrete type is `ValidatorFn<O, T>`.
    callback: Rc<dyn Any>,
    value_type: &'static str,
}

/// Observer and validator lists for one owner instance.
pub struct Registry<O> {
    observers: RefCell<HashMap<usize, Vec<ObserverFn<O>>>>,
    validators: RefCell<HashMap<usize, Vec<ErasedValidator>>>,
    config: Cell<RegistryConfig>,
}

impl<O> Default for Registry<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> Registry<O> {
    /// Empty registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Empty registry with `config`.
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            observers: RefCell::new(HashMap::new()),
            validators: RefCell::new(HashMap::new()),
            config: Cell::new(config),
        }
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> RegistryConfig {
        self.config.get()
    }

    /// Replace the configuration. Registered callbacks are kept.
    pub fn set_config(&self, config: RegistryConfig) {
        self.config.set(config);
    }

    /// Append an observer for `offset`.
    pub fn observe(&self, offset: usize, callback: impl Fn(&O) + 'static) {
        let mut observers = self.observers.borrow_mut();
        let list = observers.entry(offset).or_default();
        list.push(Rc::new(callback));
        debug!(offset, count = list.len(), "observer registered");
    }

    /// Remove every observer for `offset`. Returns how many were removed.
    pub fn unobserve(&self, offset: usize) -> usize {
        let removed = self
            .observers
            .borrow_mut()
            .remove(&offset)
            .map_or(0, |list| list.len());
        debug!(offset, removed, "observers cleared");
        removed
    }

    /// Number of observers registered for `offset`.
    #[must_use]
    pub fn observer_count(&self, offset: usize) -> usize {
        self.observers.borrow().get(&offset).map_or(0, Vec::len)
    }

    /// Remove every validator for `offset`. Returns how many were removed.
    pub fn unvalidate(&self, offset: usize) -> usize {
        let removed = self
            .validators
            .borrow_mut()
            .remove(&offset)
            .map_or(0, |list| list.len());
        debug!(offset, removed, "validators cleared");
        removed
    }

    /// Number of validators registered for `offset`.
    #[must_use]
    pub fn validator_count(&self, offset: usize) -> usize {
        self.validators.borrow().get(&offset).map_or(0, Vec::len)
    }

    /// True when no observer and no validator is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.borrow().values().all(Vec::is_empty)
            && self.validators.borrow().values().all(Vec::is_empty)
    }

    /// Drop every callback for every offset.
    pub fn clear(&self) {
        self.observers.borrow_mut().clear();
        self.validators.borrow_mut().clear();
    }

    /// Call every observer for `offset` with `owner`, in registration order.
    ///
    /// Panics raised by an observer propagate; later observers do not run.
    pub fn invoke_observers(&self, offset: usize, owner: &O) {
        // Snapshot so callbacks can touch the registry.
        let callbacks: Vec<ObserverFn<O>> = match self.observers.borrow().get(&offset) {
            Some(list) => list.clone(),
            None => return,
        };
        trace!(offset, count = callbacks.len(), "invoking observers");
        for callback in &callbacks {
            callback(owner);
        }
    }
}

impl<O: 'static> Registry<O> {
    /// Append a validator for `offset` and value type `T`.
    pub fn validate<T: 'static>(&self, offset: usize, callback: impl Fn(&O, T) -> T + 'static) {
        let typed: ValidatorFn<O, T> = Rc::new(callback);
        let erased = ErasedValidator {
            callback: Rc::new(typed),
            value_type: type_name::<T>(),
        };
        let mut validators = self.validators.borrow_mut();
        let list = validators.entry(offset).or_default();
        list.push(erased);
        debug!(
            offset,
            value_type = type_name::<T>(),
            count = list.len(),
            "validator registered"
        );
    }

    /// Fold `proposed` through every validator for `offset`.
    ///
    /// All stored validators are type-checked before the first one runs, so
    /// a mismatch leaves no partial side effects.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::ValidatorTypeMismatch`] if any validator
    /// for `offset` was registered with a value type other than `T`.
    pub fn invoke_validators<T: 'static>(
        &self,
        offset: usize,
        owner: &O,
        proposed: T,
    ) -> PropertyResult<T> {
        let callbacks = self.typed_validators::<T>(offset)?;
        if callbacks.is_empty() {
            return Ok(proposed);
        }
        trace!(offset, count = callbacks.len(), "invoking validators");
        Ok(callbacks
            .iter()
            .fold(proposed, |value, callback| callback(owner, value)))
    }

    /// Snapshot of the validators for `offset`, each downcast to `T`.
    pub(crate) fn typed_validators<T: 'static>(
        &self,
        offset: usize,
    ) -> PropertyResult<Vec<ValidatorFn<O, T>>> {
        let validators = self.validators.borrow();
        let Some(list) = validators.get(&offset) else {
            return Ok(Vec::new());
        };
        list.iter()
            .map(|erased| {
                erased
                    .callback
                    .downcast_ref::<ValidatorFn<O, T>>()
                    .cloned()
                    .ok_or(PropertyError::ValidatorTypeMismatch {
                        offset,
                        expected: type_name::<T>(),
                        found: erased.value_type,
                    })
            })
            .collect()
    }
}

impl<O> Clone for Registry<O> {
    fn clone(&self) -> Self {
        let config = self.config.get();
        match config.clone_policy {
            ClonePolicy::Reset => Self::with_config(config),
            ClonePolicy::Share => Self {
                observers: RefCell::new(self.observers.borrow().clone()),
                validators: RefCell::new(self.validators.borrow().clone()),
                config: Cell::new(config),
            },
        }
    }
}

impl<O> fmt::Debug for Registry<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let observers: usize = self.observers.borrow().values().map(Vec::len).sum();
        let validators: usize = self.validators.borrow().values().map(Vec::len).sum();
        f.debug_struct("Registry")
            .field("observers", &observers)
            .field("validators", &validators)
            .field("config", &self.config.get())
            .finish()
    }
}
