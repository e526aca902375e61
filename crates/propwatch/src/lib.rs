#![forbid(unsafe_code)]

//! Observable struct properties.
//!
//! # Role
//! `propwatch` turns struct fields into intercepted slots. Assigning a
//! property runs its validators (which may rewrite the proposed value),
//! stores the result, then runs its observers with a shared reference to
//! the whole owner.
//!
//! # Primary pieces
//! - **[`Property<T>`]**: the value slot embedded in an owner.
//! - **[`FieldKey<O, T>`]**: compile-time identity of a field: its byte
//!   offset in `O`, its name, and optional static hooks.
//! - **[`Registry<O>`]**: per-owner observer and validator lists keyed by
//!   offset.
//! - **[`Observed`]**: the owner trait; registration, dispatch, `set`.
//! - **[`link`](link::link) / [`link_bidirectional`](link::link_bidirectional)**:
//!   property synchronization across owners.
//! - **[`observed!`]**: declares an owner struct with all of the above.
//!
//! # Threading
//! Owners are single-threaded (`Rc`/`RefCell` inside), and therefore
//! neither `Send` nor `Sync`.

mod macros;

pub mod config;
pub mod error;
pub mod link;
pub mod observed;
pub mod property;
pub mod registry;

pub use config::{ClonePolicy, LinkMode, RegistryConfig};
pub use error::{PropertyError, PropertyResult};
pub use link::{link, link_bidirectional, link_bidirectional_with, link_with};
pub use observed::Observed;
pub use property::{FieldKey, Property, StaticObserver, StaticValidator};
pub use registry::{ObserverFn, Registry, ValidatorFn};
