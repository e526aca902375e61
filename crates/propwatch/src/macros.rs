//! Declaration macros.
//!
//! [`observed!`](crate::observed) declares an owner struct in one go:
//!
//! ```
//! use propwatch::{Observed, observed};
//!
//! fn clamp(_: &Slider, v: f64) -> f64 {
//!     v.clamp(0.0, 100.0)
//! }
//!
//! observed! {
//!     #[derive(Debug, Clone)]
//!     pub struct Slider {
//!         pub value: f64 = 50.0 => validate clamp,
//!         pub label: String,
//!     }
//! }
//!
//! let slider = Slider::default();
//! slider.set(Slider::value, 150.0);
//! assert_eq!(slider.value.get(), 100.0);
//! ```
//!
//! For each field `name: T` it emits a `Property<T>` field and an
//! associated constant `Owner::name: FieldKey<Owner, T>`. It also adds a
//! private `registry` field, implements [`Observed`](crate::Observed), and
//! implements `Default` from the field initializers (or `T::default()`).
//!
//! Field clauses, in this order, all optional:
//!
//! - `= expr`: initial value,
//! - `=> validate path`: static validator `fn(&Owner, T) -> T`,
//! - `=> observe path`: static observer `fn(&Owner)`.
//!
//! Owners written by hand declare their keys with
//! [`field_key!`](crate::field_key).

/// Declare an owner struct with observable properties.
#[macro_export]
macro_rules! observed {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty
                $(= $init:expr)?
                $(=> validate $validator:path)?
                $(=> observe $observer:path)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $crate::Property<$ty>,
            )*
            registry: $crate::Registry<$name>,
        }

        impl $crate::Observed for $name {
            fn registry(&self) -> &$crate::Registry<Self> {
                &self.registry
            }
        }

        #[allow(non_upper_case_globals)]
        impl $name {
            $(
                $field_vis const $field: $crate::FieldKey<$name, $ty> = $crate::field_key!(
                    @hooks $name, $field: $ty
                    $(, validate $validator)?
                    $(, observe $observer)?
                );
            )*
        }

        impl ::core::default::Default for $name {
            fn default() -> Self {
                Self {
                    $(
                        $field: $crate::Property::new($crate::__field_init!($ty $(, $init)?)),
                    )*
                    registry: $crate::Registry::new(),
                }
            }
        }
    };
}

/// Declare the [`FieldKey`](crate::FieldKey) of a property field.
///
/// ```
/// use propwatch::{FieldKey, Observed, Property, Registry, field_key};
///
/// struct Thermostat {
///     target: Property<f64>,
///     registry: Registry<Thermostat>,
/// }
///
/// impl Observed for Thermostat {
///     fn registry(&self) -> &Registry<Self> {
///         &self.registry
///     }
/// }
///
/// impl Thermostat {
///     const TARGET: FieldKey<Thermostat, f64> = field_key!(Thermostat, target: f64);
/// }
///
/// let t = Thermostat { target: Property::new(20.0), registry: Registry::new() };
/// t.set(Thermostat::TARGET, 21.5);
/// assert_eq!(t.target.get(), 21.5);
/// ```
#[macro_export]
macro_rules! field_key {
    (
        @hooks $owner:ty, $field:ident : $ty:ty
        $(, validate $validator:path)?
        $(, observe $observer:path)?
    ) => {{
        fn access(owner: &$owner) -> &$crate::Property<$ty> {
            &owner.$field
        }
        $crate::FieldKey::with_hooks(
            ::core::mem::offset_of!($owner, $field),
            ::core::stringify!($field),
            access,
            $crate::__static_hook!($($validator as $crate::StaticValidator<$owner, $ty>)?),
            $crate::__static_hook!($($observer as $crate::StaticObserver<$owner>)?),
        )
    }};
    ($owner:ty, $field:ident : $ty:ty $(,)?) => {
        $crate::field_key!(@hooks $owner, $field: $ty)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __static_hook {
    () => {
        ::core::option::Option::None
    };
    ($hook:path as $hook_ty:ty) => {
        ::core::option::Option::Some($hook as $hook_ty)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __field_init {
    ($ty:ty) => {
        <$ty as ::core::default::Default>::default()
    };
    ($ty:ty, $init:expr) => {
        $init
    };
}
