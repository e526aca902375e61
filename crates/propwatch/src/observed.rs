#![forbid(unsafe_code)]

//! The owner mixin: registration, dispatch and assignment.
//!
//! Any struct that embeds [`Property`] fields and a [`Registry<Self>`]
//! becomes an owner by implementing [`Observed`]. The only required method
//! is the registry accessor; every dispatch routine has a default, so an
//! owner with nothing registered pays for one empty map lookup per
//! assignment and runs no callbacks.
//!
//! # Assignment
//!
//! ```text
//! set(key, v)
//!   ├─ static validator (if declared)   v = hook(owner, v)
//!   ├─ dynamic validators, FIFO         v = vn(owner, ..v1(owner, v))
//!   ├─ store v
//!   ├─ static observer (if declared)    hook(owner)
//!   └─ dynamic observers, in order      o(owner)
//! ```
//!
//! The value is committed before observers run. A panicking observer
//! leaves the new value in place.

use std::cell::RefMut;

use tracing::{error, trace};

use crate::config::RegistryConfig;
use crate::error::PropertyResult;
use crate::property::{FieldKey, Property};
use crate::registry::Registry;

/// An owner of observable properties.
pub trait Observed: Sized + 'static {
    /// Callback registry of this instance.
    fn registry(&self) -> &Registry<Self>;

    /// Replace the registry configuration.
    fn configure(&self, config: RegistryConfig) {
        self.registry().set_config(config);
    }

    /// Register an observer for the property behind `key`.
    fn observe<T>(&self, key: FieldKey<Self, T>, callback: impl Fn(&Self) + 'static) {
        self.registry().observe(key.offset(), callback);
    }

    /// Register an observer for a raw property offset.
    fn observe_at(&self, offset: usize, callback: impl Fn(&Self) + 'static) {
        self.registry().observe(offset, callback);
    }

    /// Remove all observers of the property behind `key`.
    fn unobserve<T>(&self, key: FieldKey<Self, T>) -> usize {
        self.registry().unobserve(key.offset())
    }

    /// Remove all observers registered at `offset`.
    fn unobserve_at(&self, offset: usize) -> usize {
        self.registry().unobserve(offset)
    }

    /// Register a validator for the property behind `key`.
    fn validate<T: 'static>(
        &self,
        key: FieldKey<Self, T>,
        callback: impl Fn(&Self, T) -> T + 'static,
    ) {
        self.registry().validate(key.offset(), callback);
    }

    /// Register a validator for value type `T` at a raw offset.
    ///
    /// The type is only checked when the property at `offset` is assigned.
    fn validate_at<T: 'static>(&self, offset: usize, callback: impl Fn(&Self, T) -> T + 'static) {
        self.registry().validate(offset, callback);
    }

    /// Remove all validators of the property behind `key`.
    fn unvalidate<T>(&self, key: FieldKey<Self, T>) -> usize {
        self.registry().unvalidate(key.offset())
    }

    /// Remove all validators registered at `offset`.
    fn unvalidate_at(&self, offset: usize) -> usize {
        self.registry().unvalidate(offset)
    }

    /// Number of dynamic observers on the property behind `key`.
    fn observer_count<T>(&self, key: FieldKey<Self, T>) -> usize {
        self.registry().observer_count(key.offset())
    }

    /// Number of dynamic validators on the property behind `key`.
    fn validator_count<T>(&self, key: FieldKey<Self, T>) -> usize {
        self.registry().validator_count(key.offset())
    }

    /// Run the static observer of `key`, then its dynamic observers.
    fn invoke_observers<T>(&self, key: FieldKey<Self, T>) {
        if let Some(hook) = key.static_observer() {
            hook(self);
        }
        self.registry().invoke_observers(key.offset(), self);
    }

    /// Fold `proposed` through the static validator of `key`, then its
    /// dynamic validators.
    ///
    /// Dynamic validators are type-checked before the static one runs, so a
    /// mismatch invokes no validator at all.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::ValidatorTypeMismatch`](crate::PropertyError)
    /// if a dynamic validator at this offset was registered for another
    /// value type.
    fn try_invoke_validators<T: 'static>(
        &self,
        key: FieldKey<Self, T>,
        proposed: T,
    ) -> PropertyResult<T> {
        let callbacks = self.registry().typed_validators::<T>(key.offset())?;
        let proposed = match key.static_validator() {
            Some(hook) => hook(self, proposed),
            None => proposed,
        };
        if callbacks.is_empty() {
            return Ok(proposed);
        }
        trace!(offset = key.offset(), count = callbacks.len(), "invoking validators");
        Ok(callbacks
            .iter()
            .fold(proposed, |value, callback| callback(self, value)))
    }

    /// Infallible form of [`try_invoke_validators`](Self::try_invoke_validators).
    ///
    /// # Panics
    ///
    /// Panics on a validator type mismatch.
    fn invoke_validators<T: 'static>(&self, key: FieldKey<Self, T>, proposed: T) -> T {
        match self.try_invoke_validators(key, proposed) {
            Ok(value) => value,
            Err(err) => {
                error!(field = key.name(), %err, "validator contract violated");
                panic!("{err}");
            }
        }
    }

    /// Assign through validators, store, then notify observers.
    ///
    /// Returns a guard on the stored value. Writes through the guard do not
    /// dispatch.
    ///
    /// # Errors
    ///
    /// Returns the validator type mismatch, if any. No validator or observer
    /// runs and nothing is stored in that case.
    fn try_set<T: 'static>(
        &self,
        key: FieldKey<Self, T>,
        value: T,
    ) -> PropertyResult<RefMut<'_, T>> {
        trace!(field = key.name(), offset = key.offset(), "assign");
        let value = self.try_invoke_validators(key, value)?;
        let property: &Property<T> = key.property(self);
        property.store(value);
        self.invoke_observers(key);
        Ok(property.borrow_mut())
    }

    /// Infallible form of [`try_set`](Self::try_set).
    ///
    /// # Panics
    ///
    /// Panics on a validator type mismatch, or if a guard on the property
    /// is held across the call.
    fn set<T: 'static>(&self, key: FieldKey<Self, T>, value: T) -> RefMut<'_, T> {
        match self.try_set(key, value) {
            Ok(stored) => stored,
            Err(err) => {
                error!(field = key.name(), %err, "validator contract violated");
                panic!("{err}");
            }
        }
    }

    /// Like [`set`](Self::set), but drops the assignment when the validated
    /// value equals the stored one. Returns whether a change was committed.
    ///
    /// # Panics
    ///
    /// Same as [`set`](Self::set).
    fn set_if_changed<T: PartialEq + 'static>(&self, key: FieldKey<Self, T>, value: T) -> bool {
        let value = self.invoke_validators(key, value);
        let property = key.property(self);
        if *property.borrow() == value {
            trace!(field = key.name(), "assignment unchanged, skipped");
            return false;
        }
        property.store(value);
        self.invoke_observers(key);
        true
    }

    /// Clone of the current value behind `key`.
    fn get<T: Clone>(&self, key: FieldKey<Self, T>) -> T {
        key.property(self).get()
    }
}
