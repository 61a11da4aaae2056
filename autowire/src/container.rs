//! The [Container] is the entry point for registering and retrieving components.
//!
//! It owns a [ComponentRegistry], a bag of named property values and, optionally, a
//! [ComponentScanner](crate::scanner::ComponentScanner) used to discover components which were
//! not registered explicitly.
//! Containers are cheap handles - cloning one yields another handle to the same state.
//!
//! ### Lifecycle
//!
//! Singleton instances are created on first request and cached until [Container::close] is
//! called. Closing runs [pre-destroy](crate::component::ComponentDescriptorBuilder::pre_destroy)
//! hooks of all cached instances in reverse creation order and drops all state. A closed container
//! cannot be used anymore.
//!
//! Components depending on the container itself (registered under [CONTAINER_NAME]) hold a strong
//! handle to it. If such component is a singleton, the container state will only be released after
//! closing the container.

use crate::component::blueprint::{BlueprintPtr, TypedBlueprint};
use crate::component::{Component, ComponentDescriptor, ComponentDescriptorPtr, TypeInfo};
use crate::config::ContainerConfig;
use crate::error::ComponentInstanceProviderError;
use crate::factory::InstanceFactory;
use crate::instance_provider::{ComponentInstanceAnyPtr, ComponentInstancePtr, Injectable};
use crate::registry::{ComponentRegistry, Registration, RegistrationStatus};
use crate::resolver::{LookupKind, Resolver};
use crate::scanner::{ScannerPtr, StaticComponentScanner};
use fxhash::FxHashMap;
#[cfg(feature = "threadsafe")]
use parking_lot::ReentrantMutex;
use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::fmt::{Debug, Formatter};
use std::mem;
#[cfg(not(feature = "threadsafe"))]
use std::rc::Weak;
#[cfg(feature = "threadsafe")]
use std::sync::Weak;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Name under which every container registers itself.
pub const CONTAINER_NAME: &str = "Container";

pub(crate) type ContainerWeakPtr = Weak<ContainerInner>;

pub(crate) struct PropertyEntry {
    pub(crate) value: ComponentInstanceAnyPtr,
    pub(crate) blueprint: BlueprintPtr,
}

#[derive(Default)]
pub(crate) struct ContainerState {
    pub(crate) registry: ComponentRegistry,
    pub(crate) properties: FxHashMap<String, PropertyEntry>,
    pub(crate) scanner: Option<ScannerPtr>,
    pub(crate) closed: bool,
    /// Names of cached singletons, in creation order.
    pub(crate) destruction_order: Vec<String>,
}

pub(crate) struct ContainerInner {
    #[cfg(feature = "threadsafe")]
    state: ReentrantMutex<RefCell<ContainerState>>,
    #[cfg(not(feature = "threadsafe"))]
    state: RefCell<ContainerState>,
}

/// Dependency injection container - see module documentation.
#[derive(Clone)]
pub struct Container {
    inner: ComponentInstancePtr<ContainerInner>,
}

impl Container {
    /// Creates an empty container, with only itself registered.
    pub fn new() -> Self {
        let container = Self {
            inner: ComponentInstancePtr::new(ContainerInner {
                state: Default::default(),
            }),
        };

        container.register_descriptor(
            ComponentDescriptor::builder::<Container>()
                .name(CONTAINER_NAME)
                .singleton(false)
                .constructor(|arguments| Ok(arguments.container().clone()))
                .build(),
            None,
        );

        container
    }

    /// Creates a container configured according to given [ContainerConfig].
    pub fn from_config(config: &ContainerConfig) -> Self {
        if config.install_tracing_logger {
            // a global subscriber might have been installed already
            let _ = tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .try_init();
        }

        let container = Self::new();
        if config.enable_component_scanner {
            info!("Enabling component scanner...");
            container.enable_component_scanner();
        }

        container
    }

    /// Registers a [Component] under its effective name. Returns `false` if the name was already
    /// taken - the existing registration is kept in such case.
    pub fn register<T: Component>(&self) -> bool {
        self.register_descriptor(T::describe(), None)
    }

    /// Registers a [Component] under given name.
    pub fn register_named<T: Component>(&self, name: &str) -> bool {
        self.register_descriptor(T::describe(), Some(name))
    }

    /// Registers given descriptor, optionally overriding its name.
    pub fn register_descriptor(&self, descriptor: ComponentDescriptor, name: Option<&str>) -> bool {
        self.register_descriptor_ptr(ComponentDescriptorPtr::new(descriptor), name)
    }

    pub(crate) fn register_descriptor_ptr(
        &self,
        descriptor: ComponentDescriptorPtr,
        name: Option<&str>,
    ) -> bool {
        self.with_state(|state| {
            if state.closed {
                warn!(
                    name = name.unwrap_or_else(|| descriptor.effective_name()),
                    "Ignoring registration in a closed container."
                );
                return false;
            }

            state.registry.register(descriptor, name)
        })
    }

    /// Adds a named value available for injection. Properties take precedence over components with
    /// the same name. Adding a property with an existing name replaces the previous value.
    pub fn add_property<V: Injectable>(&self, name: &str, value: V) {
        let entry = PropertyEntry {
            value: ComponentInstancePtr::new(value) as ComponentInstanceAnyPtr,
            blueprint: ComponentInstancePtr::new(TypedBlueprint::<V>::default()) as BlueprintPtr,
        };

        // dropped values might call back into the container, so they go after the state is released
        let previous = self.with_state(|state| {
            if state.closed {
                warn!(name, "Ignoring property added to a closed container.");
                return Err(entry);
            }

            Ok(state.properties.insert(name.to_string(), entry))
        });

        if let Ok(Some(_)) = &previous {
            debug!(name, "Replaced property value.");
        }
    }

    /// Checks if a property with given name exists.
    pub fn has_property(&self, name: &str) -> bool {
        self.with_state(|state| state.properties.contains_key(name))
    }

    /// Enables discovery of components declared with
    /// [declare_component](crate::declare_component).
    pub fn enable_component_scanner(&self) {
        self.enable_component_scanner_with(
            ComponentInstancePtr::new(StaticComponentScanner::new()) as ScannerPtr,
        );
    }

    /// Enables discovery of components using given scanner, replacing any previous one.
    pub fn enable_component_scanner_with(&self, scanner: ScannerPtr) {
        self.with_state(|state| state.scanner = Some(scanner));
    }

    /// Returns the component named after `T`, creating it if needed. `T` can be the component
    /// type itself or any of its aliases.
    pub fn get<T: ?Sized + 'static>(
        &self,
    ) -> Result<ComponentInstancePtr<T>, ComponentInstanceProviderError> {
        self.resolve_typed::<T>(TypeInfo::of::<T>().short_name, LookupKind::Typed)
    }

    /// Returns the component or property with given name, cast to `T`.
    pub fn get_named<T: ?Sized + 'static>(
        &self,
        name: &str,
    ) -> Result<ComponentInstancePtr<T>, ComponentInstanceProviderError> {
        self.resolve_typed::<T>(name, LookupKind::Named)
    }

    pub(crate) fn resolve_typed<T: ?Sized + 'static>(
        &self,
        name: &str,
        kind: LookupKind,
    ) -> Result<ComponentInstancePtr<T>, ComponentInstanceProviderError> {
        Resolver::new(self).resolve(name, kind)?.cast::<T>()
    }

    /// Injects property dependencies into an object created outside the container, and runs its
    /// post-construct hooks. Constructor arguments are not applicable and are skipped.
    pub fn wire<T: Component>(&self, target: &mut T) -> Result<(), ComponentInstanceProviderError> {
        self.wire_with(target, &T::describe())
    }

    /// Same as [Container::wire], but using an explicit descriptor.
    pub fn wire_with<T: Injectable>(
        &self,
        target: &mut T,
        descriptor: &ComponentDescriptor,
    ) -> Result<(), ComponentInstanceProviderError> {
        if descriptor.component_type().id != TypeId::of::<T>() {
            return Err(ComponentInstanceProviderError::IncompatibleComponent {
                name: descriptor.effective_name().to_string(),
                type_name: type_name::<T>(),
            });
        }

        self.serialize(|| {
            if self.is_closed() {
                return Err(ComponentInstanceProviderError::ContainerClosed);
            }

            InstanceFactory::new(self).wire(descriptor, target as &mut dyn Any)
        })
    }

    /// Runs pre-destroy hooks of all cached instances and releases all state. Subsequent calls do
    /// nothing.
    pub fn close(&self) {
        self.serialize(|| {
            let state = self.with_state(|state| {
                if state.closed {
                    return None;
                }

                Some(mem::replace(
                    state,
                    ContainerState {
                        closed: true,
                        ..Default::default()
                    },
                ))
            });

            let state = match state {
                Some(state) => state,
                None => return,
            };

            debug!("Closing container.");

            for name in state.destruction_order.iter().rev() {
                let registration = match state.registry.lookup(name) {
                    Some(registration) => registration,
                    None => continue,
                };

                if let Some(instance) = &registration.instance {
                    if let Err(error) = registration.descriptor.blueprint.pre_destroy(instance) {
                        error!(name, %error, "Error destroying component.");
                    }
                }
            }
        });
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.with_state(|state| state.closed)
    }

    /// Returns all registered names, in registration order.
    pub fn all_known_names(&self) -> Vec<String> {
        self.with_state(|state| {
            state
                .registry
                .all_known_names()
                .map(str::to_string)
                .collect()
        })
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.with_state(|state| state.registry.contains(name))
    }

    /// Current status of given registration, if it exists.
    pub fn status(&self, name: &str) -> Option<RegistrationStatus> {
        self.with_state(|state| {
            state
                .registry
                .lookup(name)
                .map(|registration| registration.status)
        })
    }

    /// Returns a snapshot of given registration.
    pub fn registration(&self, name: &str) -> Option<Registration> {
        self.with_state(|state| state.registry.lookup(name).cloned())
    }

    pub(crate) fn downgrade(&self) -> ContainerWeakPtr {
        ComponentInstancePtr::downgrade(&self.inner)
    }

    pub(crate) fn upgrade(weak: &ContainerWeakPtr) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    /// Runs given function with exclusive access to the state. The function must not call back
    /// into the container.
    #[cfg(feature = "threadsafe")]
    pub(crate) fn with_state<R, F: FnOnce(&mut ContainerState) -> R>(&self, f: F) -> R {
        let guard = self.inner.state.lock();
        let mut state = guard.borrow_mut();
        f(&mut state)
    }

    #[cfg(not(feature = "threadsafe"))]
    pub(crate) fn with_state<R, F: FnOnce(&mut ContainerState) -> R>(&self, f: F) -> R {
        f(&mut self.inner.state.borrow_mut())
    }

    /// Runs given function while no other thread can access the container. Calls from the same
    /// thread are still allowed.
    #[cfg(feature = "threadsafe")]
    pub(crate) fn serialize<R, F: FnOnce() -> R>(&self, f: F) -> R {
        let _guard = self.inner.state.lock();
        f()
    }

    #[cfg(not(feature = "threadsafe"))]
    pub(crate) fn serialize<R, F: FnOnce() -> R>(&self, f: F) -> R {
        f()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        ComponentInstancePtr::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Container {}

impl Debug for Container {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("closed", &self.is_closed())
            .field("names", &self.all_known_names())
            .finish()
    }
}
