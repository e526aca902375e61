#![forbid(unsafe_code)]

//! Property container and typed field identity.
//!
//! # Design
//!
//! A [`Property<T>`] is a plain value slot embedded in an owner struct. It
//! never stores a pointer to its owner. Assignment goes through the owner
//! ([`Observed::set`](crate::Observed::set)) together with a
//! [`FieldKey<O, T>`], a `Copy` constant that carries:
//!
//! - the field's byte offset inside `O` (the registry key),
//! - the field name (for logs),
//! - an accessor from `&O` to the property,
//! - optional static hooks dispatched without a registry lookup.
//!
//! The value lives in a `RefCell`, so a property can be assigned through
//! `&O`. That is what lets callbacks assign other properties (or the same
//! one) while a dispatch is in progress.
//!
//! # Failure Modes
//!
//! - **Guard held across assignment**: keeping a [`Ref`]/[`RefMut`] from
//!   [`Property::borrow`] alive while the same property is assigned panics
//!   (RefCell borrow rules).

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;

/// Static validator hook: receives the owner and the proposed value.
pub type StaticValidator<O, T> = fn(&O, T) -> T;

/// Static observer hook: receives the owner after the value was stored.
pub type StaticObserver<O> = fn(&O);

/// A typed, intercepted value slot.
///
/// Reading never has side effects. Writing through
/// [`Observed::set`](crate::Observed::set) runs validators and observers;
/// writing through [`borrow_mut`](Self::borrow_mut) or
/// [`replace_silent`](Self::replace_silent) does not.
pub struct Property<T> {
    value: RefCell<T>,
}

impl<T> Property<T> {
    /// Create a property holding `value`. No callbacks fire.
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self {
            value: RefCell::new(value),
        }
    }

    /// Get a clone of the current value.
    #[must_use]
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.value.borrow().clone()
    }

    /// Access the current value by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    /// Shared guard on the stored value.
    ///
    /// # Panics
    ///
    /// Panics if a mutable guard is alive.
    pub fn borrow(&self) -> Ref<'_, T> {
        self.value.borrow()
    }

    /// Mutable guard on the stored value. Bypasses validators and observers.
    ///
    /// # Panics
    ///
    /// Panics if any other guard is alive.
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.value.borrow_mut()
    }

    /// Store `value` without dispatch, returning the previous value.
    pub fn replace_silent(&self, value: T) -> T {
        self.value.replace(value)
    }

    /// Consume the property, returning the stored value.
    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }

    pub(crate) fn store(&self, value: T) {
        *self.value.borrow_mut() = value;
    }
}

impl<T: Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> From<T> for Property<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

// Clones the value only; owners decide what happens to callbacks.
impl<T: Clone> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self::new(self.get())
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.try_borrow() {
            Ok(value) => f.debug_tuple("Property").field(&*value).finish(),
            Err(_) => f
                .debug_tuple("Property")
                .field(&format_args!("<borrowed>"))
                .finish(),
        }
    }
}

impl<T: PartialEq> PartialEq<T> for Property<T> {
    fn eq(&self, other: &T) -> bool {
        *self.value.borrow() == *other
    }
}

/// Compile-time identity of a property field within owner type `O`.
///
/// Usually declared by [`observed!`](crate::observed) or
/// [`field_key!`](crate::field_key) as an associated constant named after
/// the field, e.g. `Slider::value`.
pub struct FieldKey<O, T> {
    offset: usize,
    name: &'static str,
    access: fn(&O) -> &Property<T>,
    static_validator: Option<StaticValidator<O, T>>,
    static_observer: Option<StaticObserver<O>>,
}

impl<O, T> FieldKey<O, T> {
    /// Key without static hooks.
    #[must_use]
    pub const fn new(offset: usize, name: &'static str, access: fn(&O) -> &Property<T>) -> Self {
        Self::with_hooks(offset, name, access, None, None)
    }

    /// Key with compile-time-fixed validator and/or observer.
    #[must_use]
    pub const fn with_hooks(
        offset: usize,
        name: &'static str,
        access: fn(&O) -> &Property<T>,
        static_validator: Option<StaticValidator<O, T>>,
        static_observer: Option<StaticObserver<O>>,
    ) -> Self {
        Self {
            offset,
            name,
            access,
            static_validator,
            static_observer,
        }
    }

    /// Byte offset of the field inside `O`.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Field name.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Locate the property inside `owner`.
    #[inline]
    pub fn property<'a>(&self, owner: &'a O) -> &'a Property<T> {
        (self.access)(owner)
    }

    #[inline]
    pub(crate) fn static_validator(&self) -> Option<StaticValidator<O, T>> {
        self.static_validator
    }

    #[inline]
    pub(crate) fn static_observer(&self) -> Option<StaticObserver<O>> {
        self.static_observer
    }

    /// Whether this field carries any static hook.
    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.static_validator.is_some() || self.static_observer.is_some()
    }
}

// Manual Copy/Clone: derive would require `O: Clone, T: Clone`.
impl<O, T> Clone for FieldKey<O, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<O, T> Copy for FieldKey<O, T> {}

impl<O, T> fmt::Debug for FieldKey<O, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldKey")
            .field("name", &self.name)
            .field("offset", &self.offset)
            .field("static_validator", &self.static_validator.is_some())
            .field("static_observer", &self.static_observer.is_some())
            .finish()
    }
}
