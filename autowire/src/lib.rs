//! Dependency injection container based on named component registrations and runtime
//! autowiring.
//!
//! Components describe themselves with a [ComponentDescriptor](component::ComponentDescriptor):
//! which dependencies they need (by type or by name, eager or [lazy](lazy::Lazy)), how they are
//! constructed, which other components they produce through factory methods, and which lifecycle
//! hooks should run. A [Container](container::Container) keeps the registrations, resolves the
//! dependency graph on request and manages singleton instances.
//!
//! ```
//! use autowire::component::{Component, ComponentDescriptor};
//! use autowire::container::Container;
//! use autowire::instance_provider::ComponentInstancePtr;
//!
//! struct Dependency;
//!
//! impl Component for Dependency {
//!     fn describe() -> ComponentDescriptor {
//!         ComponentDescriptor::builder::<Self>()
//!             .constructor(|_| Ok(Dependency))
//!             .build()
//!     }
//! }
//!
//! struct User {
//!     dependency: ComponentInstancePtr<Dependency>,
//! }
//!
//! impl Component for User {
//!     fn describe() -> ComponentDescriptor {
//!         ComponentDescriptor::builder::<Self>()
//!             .argument::<Dependency>(Default::default())
//!             .constructor(|arguments| {
//!                 Ok(User {
//!                     dependency: arguments.instance()?,
//!                 })
//!             })
//!             .build()
//!     }
//! }
//!
//! let container = Container::new();
//! container.register::<Dependency>();
//! container.register::<User>();
//!
//! let user = container.get::<User>().unwrap();
//! assert!(ComponentInstancePtr::ptr_eq(
//!     &user.dependency,
//!     &container.get::<Dependency>().unwrap()
//! ));
//! ```
//!
//! ### Features
//!
//! * `threadsafe` - use threadsafe pointers, `Send + Sync` trait bounds and a reentrant lock
//! around resolution (enabled by default)

pub mod component;
pub mod config;
pub mod container;
pub mod error;
pub mod factory;
pub mod instance_provider;
pub mod lazy;
pub mod registry;
pub mod resolver;
pub mod scanner;

pub use error::ComponentInstanceProviderError;
