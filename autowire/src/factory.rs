//! Core functionality for creating [Component](crate::component::Component) instances.
//!
//! The [InstanceFactory] builds a single instance from its descriptor. It doesn't know anything
//! about caching or cycle detection - that's the job of the [Resolver], which calls the factory
//! once a registration is marked as being instantiated. Dependencies are resolved through the
//! resolver again, so the whole graph is built depth-first.

use crate::component::blueprint::InjectedValue;
use crate::component::{ComponentDescriptor, DependencySlot, DependencySpec};
use crate::container::Container;
use crate::error::ComponentInstanceProviderError;
use crate::instance_provider::{ComponentInstanceAnyPtr, ComponentInstancePtr};
use crate::lazy::Lazy;
use crate::registry::InstantiationStrategy;
use crate::resolver::{LookupKind, Resolver};
use itertools::Itertools;
use std::any::Any;
use tracing::debug;

/// Resolved constructor arguments, handed out in declaration order. Each
/// [argument](crate::component::ComponentDescriptorBuilder::argument) should be taken exactly
/// once, with [Arguments::instance] or [Arguments::lazy] depending on how it was declared.
pub struct Arguments {
    component: String,
    values: std::vec::IntoIter<InjectedValue>,
    position: usize,
    container: Container,
}

impl Arguments {
    pub(crate) fn new(component: &str, values: Vec<InjectedValue>, container: Container) -> Self {
        Self {
            component: component.to_string(),
            values: values.into_iter(),
            position: 0,
            container,
        }
    }

    /// The container creating the component.
    #[inline]
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Takes the next argument, declared as eager.
    pub fn instance<D: ?Sized + 'static>(
        &mut self,
    ) -> Result<ComponentInstancePtr<D>, ComponentInstanceProviderError> {
        self.take()
    }

    /// Takes the next argument, declared as lazy.
    pub fn lazy<D: ?Sized + 'static>(&mut self) -> Result<Lazy<D>, ComponentInstanceProviderError> {
        self.take()
    }

    fn take<V: 'static>(&mut self) -> Result<V, ComponentInstanceProviderError> {
        let index = self.position;
        self.position += 1;

        self.values
            .next()
            .and_then(|value| value.downcast::<V>().ok())
            .map(|value| *value)
            .ok_or_else(|| ComponentInstanceProviderError::ArgumentMismatch {
                component: self.component.clone(),
                index,
            })
    }
}

/// What needs to be built: a registration marked as being instantiated.
#[derive(Clone, Debug)]
pub(crate) struct BuildPlan {
    pub(crate) name: String,
    pub(crate) descriptor: ComponentInstancePtr<ComponentDescriptor>,
    pub(crate) strategy: InstantiationStrategy,
}

/// Creates fully wired instances: constructed (or produced by a factory method), with all
/// properties assigned and post-construct hooks run.
pub struct InstanceFactory<'a> {
    container: &'a Container,
}

impl<'a> InstanceFactory<'a> {
    pub(crate) fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub(crate) fn instantiate(
        &self,
        plan: &BuildPlan,
    ) -> Result<ComponentInstanceAnyPtr, ComponentInstanceProviderError> {
        let name = plan.name.as_str();
        let blueprint = &plan.descriptor.blueprint;

        let mut target = match &plan.strategy {
            InstantiationStrategy::Constructor => {
                debug!(name, "Creating component instance.");

                let values: Vec<_> = plan
                    .descriptor
                    .constructor_dependencies()
                    .map(|spec| self.resolve_dependency(spec))
                    .try_collect()?;

                let mut arguments = Arguments::new(name, values, self.container.clone());
                let mut target = blueprint.construct(name, &mut arguments)?;

                self.inject_properties(name, &plan.descriptor, target.as_mut())?;
                target
            }
            InstantiationStrategy::FactoryMethod { owner, method } => {
                debug!(name, owner, method, "Creating component instance by factory.");

                let owner_instance = Resolver::new(self.container).resolve(owner, LookupKind::Named)?;
                owner_instance.produce(method)?
            }
        };

        blueprint.post_construct(name, target.as_mut())?;
        blueprint.share(name, target)
    }

    /// Resolves and assigns all property dependencies of given target.
    pub(crate) fn inject_properties(
        &self,
        name: &str,
        descriptor: &ComponentDescriptor,
        target: &mut dyn Any,
    ) -> Result<(), ComponentInstanceProviderError> {
        for spec in descriptor.property_dependencies() {
            if let DependencySlot::Property(key) = &spec.slot {
                let value = self.resolve_dependency(spec)?;
                descriptor.blueprint.inject(name, target, key, value)?;
            }
        }

        Ok(())
    }

    /// Runs external wiring for an object created outside the container.
    pub(crate) fn wire(
        &self,
        descriptor: &ComponentDescriptor,
        target: &mut dyn Any,
    ) -> Result<(), ComponentInstanceProviderError> {
        let name = descriptor.effective_name();
        debug!(name, "Wiring external object.");

        self.inject_properties(name, descriptor, target)?;
        descriptor.blueprint.post_construct(name, target)
    }

    fn resolve_dependency(
        &self,
        spec: &DependencySpec,
    ) -> Result<InjectedValue, ComponentInstanceProviderError> {
        let (name, kind) = Resolver::new(self.container).dependency_name(spec);
        (spec.materialize)(self.container, &name, kind, spec.lazy)
    }
}
