//! Resolution of component names into fully wired instances.
//!
//! A [Resolver] looks a name up in the property bag and the registry (asking the component scanner
//! for unknown names), returns cached singletons, and marks everything else as being instantiated
//! before handing it to the [InstanceFactory]. Finding a registration marked that way again means
//! the current resolution chain contains a cycle. On failure the previous status is restored, so
//! nothing is left half-built and a later request can retry.

use crate::component::blueprint::{BlueprintPtr, InjectedValue};
use crate::component::{DependencySlot, DependencySpec};
use crate::container::Container;
use crate::error::ComponentInstanceProviderError;
use crate::factory::{BuildPlan, InstanceFactory};
use crate::instance_provider::{ComponentInstanceAnyPtr, ComponentInstancePtr};
use crate::lazy::Lazy;
use crate::registry::RegistrationStatus;
use derive_more::Constructor;
use std::any::{type_name, Any, TypeId};
use tracing::debug;

/// Turns a dependency into a value ready for injection: a resolved instance or a lazy reference.
pub(crate) type MaterializeFn = fn(
    &Container,
    &str,
    LookupKind,
    bool,
) -> Result<InjectedValue, ComponentInstanceProviderError>;

pub(crate) fn materialize<D: ?Sized + 'static>(
    container: &Container,
    name: &str,
    kind: LookupKind,
    lazy: bool,
) -> Result<InjectedValue, ComponentInstanceProviderError> {
    if lazy {
        Ok(Box::new(Lazy::<D>::new(container, name, kind)))
    } else {
        container
            .resolve_typed::<D>(name, kind)
            .map(|instance| Box::new(instance) as InjectedValue)
    }
}

/// How the name being resolved was obtained. Only affects the error reported when nothing is
/// found.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LookupKind {
    /// Name derived from a type.
    Typed,
    /// Explicitly given name.
    Named,
}

impl LookupKind {
    pub(crate) fn not_found(self, name: &str) -> ComponentInstanceProviderError {
        match self {
            LookupKind::Typed => ComponentInstanceProviderError::ComponentNotFound(name.to_string()),
            LookupKind::Named => {
                ComponentInstanceProviderError::NamedComponentNotFound(name.to_string())
            }
        }
    }
}

/// A resolved, type-erased instance along with the means to cast it to concrete types.
#[derive(Clone, Constructor)]
pub struct ResolvedInstance {
    name: String,
    instance: ComponentInstanceAnyPtr,
    blueprint: BlueprintPtr,
}

impl ResolvedInstance {
    /// Name of the registration or property this instance comes from.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn instance(&self) -> &ComponentInstanceAnyPtr {
        &self.instance
    }

    /// Casts the instance to its own type or one of its declared aliases.
    pub fn cast<D: ?Sized + 'static>(
        self,
    ) -> Result<ComponentInstancePtr<D>, ComponentInstanceProviderError> {
        self.blueprint
            .cast(self.instance, TypeId::of::<D>())
            .ok()
            .and_then(|instance| instance.downcast::<ComponentInstancePtr<D>>().ok())
            .map(|instance| *instance)
            .ok_or_else(|| ComponentInstanceProviderError::IncompatibleComponent {
                name: self.name,
                type_name: type_name::<D>(),
            })
    }

    pub(crate) fn produce(
        &self,
        method: &str,
    ) -> Result<Box<dyn Any>, ComponentInstanceProviderError> {
        self.blueprint.produce(&self.name, &self.instance, method)
    }
}

enum Step {
    Ready(ResolvedInstance),
    Build(BuildPlan, RegistrationStatus),
    Unknown,
}

/// Walks the dependency graph of a single requested component.
pub struct Resolver<'a> {
    container: &'a Container,
}

impl<'a> Resolver<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// Resolves given name to an instance, creating it along with its dependencies if needed.
    /// Only one resolution chain runs at a time.
    pub fn resolve(
        &self,
        name: &str,
        kind: LookupKind,
    ) -> Result<ResolvedInstance, ComponentInstanceProviderError> {
        self.container.serialize(|| {
            let step = match self.begin(name)? {
                Step::Unknown => {
                    self.discover(name);
                    self.begin(name)?
                }
                step => step,
            };

            match step {
                Step::Ready(instance) => Ok(instance),
                Step::Build(plan, previous_status) => {
                    let result = InstanceFactory::new(self.container).instantiate(&plan);
                    self.complete(&plan, previous_status, result)
                }
                Step::Unknown => Err(kind.not_found(name)),
            }
        })
    }

    /// Returns the name to look up for given dependency: the explicit name, the property key if
    /// such property exists, or the short name of the target type.
    pub fn dependency_name(&self, spec: &DependencySpec) -> (String, LookupKind) {
        if let Some(name) = &spec.explicit_name {
            return (name.clone(), LookupKind::Named);
        }

        if let DependencySlot::Property(key) = &spec.slot {
            if self.container.has_property(key) {
                return (key.clone(), LookupKind::Named);
            }
        }

        (spec.target.short_name.to_string(), LookupKind::Typed)
    }

    fn begin(&self, name: &str) -> Result<Step, ComponentInstanceProviderError> {
        self.container.with_state(|state| {
            if state.closed {
                return Err(ComponentInstanceProviderError::ContainerClosed);
            }

            if let Some(property) = state.properties.get(name) {
                return Ok(Step::Ready(ResolvedInstance::new(
                    name.to_string(),
                    property.value.clone(),
                    property.blueprint.clone(),
                )));
            }

            let registration = match state.registry.lookup_mut(name) {
                Some(registration) => registration,
                None => return Ok(Step::Unknown),
            };

            match (registration.status, &registration.instance) {
                (RegistrationStatus::Instantiated, Some(instance)) => {
                    Ok(Step::Ready(ResolvedInstance::new(
                        name.to_string(),
                        instance.clone(),
                        registration.descriptor.blueprint.clone(),
                    )))
                }
                (RegistrationStatus::Instantiating, _) => Err(
                    ComponentInstanceProviderError::CyclicDependency(name.to_string()),
                ),
                (previous_status, _) => {
                    registration.status = RegistrationStatus::Instantiating;
                    Ok(Step::Build(
                        BuildPlan {
                            name: registration.name.clone(),
                            descriptor: registration.descriptor.clone(),
                            strategy: registration.strategy.clone(),
                        },
                        previous_status,
                    ))
                }
            }
        })
    }

    fn discover(&self, name: &str) {
        let scanner = match self.container.with_state(|state| state.scanner.clone()) {
            Some(scanner) => scanner,
            None => return,
        };

        if let Some(descriptor) = scanner.discover_descriptor(name) {
            debug!(name, "Discovered component by scanning.");
            self.container.register_descriptor_ptr(descriptor, None);
        }
    }

    fn complete(
        &self,
        plan: &BuildPlan,
        previous_status: RegistrationStatus,
        result: Result<ComponentInstanceAnyPtr, ComponentInstanceProviderError>,
    ) -> Result<ResolvedInstance, ComponentInstanceProviderError> {
        self.container.with_state(|state| {
            if let Some(registration) = state.registry.lookup_mut(&plan.name) {
                match &result {
                    Ok(instance) => {
                        registration.status = RegistrationStatus::Instantiated;
                        if registration.singleton {
                            registration.instance = Some(instance.clone());
                            state.destruction_order.push(plan.name.clone());
                        }
                    }
                    Err(_) => registration.status = previous_status,
                }
            }
        });

        result.map(|instance| {
            ResolvedInstance::new(plan.name.clone(), instance, plan.descriptor.blueprint.clone())
        })
    }
}
