//! Pointer types and trait bounds shared by everything handing out component instances. Their
//! exact shape depends on the `threadsafe` feature.

use std::any::Any;
use std::error::Error;
#[cfg(not(feature = "threadsafe"))]
use std::rc::Rc;
#[cfg(feature = "threadsafe")]
use std::sync::Arc;

#[cfg(not(feature = "threadsafe"))]
pub type ComponentInstancePtr<T> = Rc<T>;
#[cfg(feature = "threadsafe")]
pub type ComponentInstancePtr<T> = Arc<T>;

#[cfg(not(feature = "threadsafe"))]
pub type ComponentInstanceAnyPtr = ComponentInstancePtr<dyn Any + 'static>;
#[cfg(feature = "threadsafe")]
pub type ComponentInstanceAnyPtr = ComponentInstancePtr<dyn Any + Send + Sync + 'static>;

/// Error type used by user code: constructors, factory methods and lifecycle hooks.
#[cfg(not(feature = "threadsafe"))]
pub type ErrorPtr = Rc<dyn Error + 'static>;
#[cfg(feature = "threadsafe")]
pub type ErrorPtr = Arc<dyn Error + Send + Sync + 'static>;

/// Marker trait for concrete types which can be stored in a container - components and property
/// values. Automatically implemented for every eligible type.
#[cfg(not(feature = "threadsafe"))]
pub trait Injectable: Any {}
#[cfg(not(feature = "threadsafe"))]
impl<T: Any> Injectable for T {}

/// Marker trait for concrete types which can be stored in a container - components and property
/// values. Automatically implemented for every eligible type.
#[cfg(feature = "threadsafe")]
pub trait Injectable: Any + Send + Sync {}
#[cfg(feature = "threadsafe")]
impl<T: Any + Send + Sync> Injectable for T {}

/// Wraps any error in an [ErrorPtr].
#[cfg(feature = "threadsafe")]
pub fn convert_error<E: Error + Send + Sync + 'static>(error: E) -> ErrorPtr {
    Arc::new(error) as ErrorPtr
}

/// Wraps any error in an [ErrorPtr].
#[cfg(not(feature = "threadsafe"))]
pub fn convert_error<E: Error + 'static>(error: E) -> ErrorPtr {
    Rc::new(error) as ErrorPtr
}
