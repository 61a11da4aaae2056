//! Typed behavior behind a type-erased [ComponentDescriptor](super::ComponentDescriptor).
//!
//! Descriptors are stored and resolved without knowing the concrete component type, but
//! construction, property assignment, hooks and casts all need it. A [TypedBlueprint] keeps the
//! typed function pointers and exposes them through the object-safe [Blueprint] trait. Only
//! function pointers are stored, so every blueprint is `Send + Sync` regardless of features.

use crate::error::ComponentInstanceProviderError;
use crate::factory::Arguments;
use crate::instance_provider::{
    ComponentInstanceAnyPtr, ComponentInstancePtr, ErrorPtr, Injectable,
};
use std::any::{type_name, Any, TypeId};

/// A resolved dependency on its way to a constructor or property setter: either a
/// `ComponentInstancePtr<T>` or a `Lazy<T>`.
pub type InjectedValue = Box<dyn Any>;

pub type BlueprintPtr = ComponentInstancePtr<dyn Blueprint>;

/// Constructor for components using constructor injection.
pub type Constructor<T> = fn(&mut Arguments) -> Result<T, ComponentInstanceProviderError>;

/// Hook run on a freshly built instance, before it's shared.
pub type PostConstructHook<T> = fn(&mut T) -> Result<(), ErrorPtr>;

/// Hook run on cached instances when the container closes.
pub type PreDestroyHook<T> = fn(&T) -> Result<(), ErrorPtr>;

pub trait Blueprint: Send + Sync {
    fn construct(
        &self,
        name: &str,
        arguments: &mut Arguments,
    ) -> Result<Box<dyn Any>, ComponentInstanceProviderError>;

    fn inject(
        &self,
        name: &str,
        target: &mut dyn Any,
        slot: &str,
        value: InjectedValue,
    ) -> Result<(), ComponentInstanceProviderError>;

    fn post_construct(
        &self,
        name: &str,
        target: &mut dyn Any,
    ) -> Result<(), ComponentInstanceProviderError>;

    fn share(
        &self,
        name: &str,
        target: Box<dyn Any>,
    ) -> Result<ComponentInstanceAnyPtr, ComponentInstanceProviderError>;

    fn produce(
        &self,
        owner: &str,
        instance: &ComponentInstanceAnyPtr,
        method: &str,
    ) -> Result<Box<dyn Any>, ComponentInstanceProviderError>;

    fn pre_destroy(&self, instance: &ComponentInstanceAnyPtr) -> Result<(), ErrorPtr>;

    /// Casts the instance to `ComponentInstancePtr<Target>` boxed as `Any`, where `Target` is the
    /// type identified by `target`. Returns the instance back if no such cast is known.
    fn cast(
        &self,
        instance: ComponentInstanceAnyPtr,
        target: TypeId,
    ) -> Result<Box<dyn Any>, ComponentInstanceAnyPtr>;
}

pub(crate) trait PropertyInjector<T>: Send + Sync {
    fn slot(&self) -> &str;

    fn inject(&self, target: &mut T, value: InjectedValue) -> Result<(), InjectedValue>;
}

pub(crate) struct PropertySetter<T, V> {
    pub(crate) slot: String,
    pub(crate) set: fn(&mut T, V),
}

impl<T: 'static, V: 'static> PropertyInjector<T> for PropertySetter<T, V> {
    fn slot(&self) -> &str {
        &self.slot
    }

    fn inject(&self, target: &mut T, value: InjectedValue) -> Result<(), InjectedValue> {
        value.downcast::<V>().map(|value| (self.set)(target, *value))
    }
}

pub(crate) trait FactoryMethod<T>: Send + Sync {
    fn slot(&self) -> &str;

    fn invoke(&self, owner: &T) -> Result<Box<dyn Any>, ErrorPtr>;
}

pub(crate) struct TypedFactoryMethod<T, P> {
    pub(crate) slot: String,
    pub(crate) produce: fn(&T) -> Result<P, ErrorPtr>,
}

impl<T: 'static, P: Injectable> FactoryMethod<T> for TypedFactoryMethod<T, P> {
    fn slot(&self) -> &str {
        &self.slot
    }

    fn invoke(&self, owner: &T) -> Result<Box<dyn Any>, ErrorPtr> {
        (self.produce)(owner).map(|instance| Box::new(instance) as Box<dyn Any>)
    }
}

pub(crate) trait AliasCast<T>: Send + Sync {
    fn target(&self) -> TypeId;

    fn cast(&self, instance: ComponentInstanceAnyPtr)
        -> Result<Box<dyn Any>, ComponentInstanceAnyPtr>;
}

pub(crate) struct TypedAlias<T, I: ?Sized> {
    pub(crate) cast: fn(ComponentInstancePtr<T>) -> ComponentInstancePtr<I>,
}

impl<T: Injectable, I: ?Sized + 'static> AliasCast<T> for TypedAlias<T, I> {
    fn target(&self) -> TypeId {
        TypeId::of::<I>()
    }

    fn cast(
        &self,
        instance: ComponentInstanceAnyPtr,
    ) -> Result<Box<dyn Any>, ComponentInstanceAnyPtr> {
        instance
            .downcast::<T>()
            .map(|instance| Box::new((self.cast)(instance)) as Box<dyn Any>)
    }
}

pub(crate) struct TypedBlueprint<T> {
    pub(crate) constructor: Option<Constructor<T>>,
    pub(crate) properties: Vec<Box<dyn PropertyInjector<T>>>,
    pub(crate) post_construct: Vec<PostConstructHook<T>>,
    pub(crate) pre_destroy: Vec<PreDestroyHook<T>>,
    pub(crate) factories: Vec<Box<dyn FactoryMethod<T>>>,
    pub(crate) aliases: Vec<Box<dyn AliasCast<T>>>,
}

impl<T> Default for TypedBlueprint<T> {
    fn default() -> Self {
        Self {
            constructor: None,
            properties: vec![],
            post_construct: vec![],
            pre_destroy: vec![],
            factories: vec![],
            aliases: vec![],
        }
    }
}

fn incompatible<T: ?Sized>(name: &str) -> ComponentInstanceProviderError {
    ComponentInstanceProviderError::IncompatibleComponent {
        name: name.to_string(),
        type_name: type_name::<T>(),
    }
}

impl<T: Injectable> Blueprint for TypedBlueprint<T> {
    fn construct(
        &self,
        name: &str,
        arguments: &mut Arguments,
    ) -> Result<Box<dyn Any>, ComponentInstanceProviderError> {
        let constructor = self
            .constructor
            .ok_or_else(|| ComponentInstanceProviderError::MissingConstructor(name.to_string()))?;

        constructor(arguments).map(|instance| Box::new(instance) as Box<dyn Any>)
    }

    fn inject(
        &self,
        name: &str,
        target: &mut dyn Any,
        slot: &str,
        value: InjectedValue,
    ) -> Result<(), ComponentInstanceProviderError> {
        let target = target
            .downcast_mut::<T>()
            .ok_or_else(|| incompatible::<T>(name))?;

        self.properties
            .iter()
            .find(|property| property.slot() == slot)
            .ok_or_else(|| incompatible::<T>(name))?
            .inject(target, value)
            .map_err(|_| incompatible::<T>(name))
    }

    fn post_construct(
        &self,
        name: &str,
        target: &mut dyn Any,
    ) -> Result<(), ComponentInstanceProviderError> {
        let target = target
            .downcast_mut::<T>()
            .ok_or_else(|| incompatible::<T>(name))?;

        for hook in &self.post_construct {
            hook(target).map_err(|error| ComponentInstanceProviderError::LifecycleError {
                name: name.to_string(),
                error,
            })?;
        }

        Ok(())
    }

    fn share(
        &self,
        name: &str,
        target: Box<dyn Any>,
    ) -> Result<ComponentInstanceAnyPtr, ComponentInstanceProviderError> {
        target
            .downcast::<T>()
            .map(|target| ComponentInstancePtr::new(*target) as ComponentInstanceAnyPtr)
            .map_err(|_| incompatible::<T>(name))
    }

    fn produce(
        &self,
        owner: &str,
        instance: &ComponentInstanceAnyPtr,
        method: &str,
    ) -> Result<Box<dyn Any>, ComponentInstanceProviderError> {
        let instance = instance
            .downcast_ref::<T>()
            .ok_or_else(|| incompatible::<T>(owner))?;

        self.factories
            .iter()
            .find(|factory| factory.slot() == method)
            .ok_or_else(|| ComponentInstanceProviderError::MissingFactoryMethod {
                owner: owner.to_string(),
                method: method.to_string(),
            })?
            .invoke(instance)
            .map_err(ComponentInstanceProviderError::ConstructorError)
    }

    fn pre_destroy(&self, instance: &ComponentInstanceAnyPtr) -> Result<(), ErrorPtr> {
        if let Some(instance) = instance.downcast_ref::<T>() {
            for hook in &self.pre_destroy {
                hook(instance)?;
            }
        }

        Ok(())
    }

    fn cast(
        &self,
        instance: ComponentInstanceAnyPtr,
        target: TypeId,
    ) -> Result<Box<dyn Any>, ComponentInstanceAnyPtr> {
        if target == TypeId::of::<T>() {
            return instance
                .downcast::<T>()
                .map(|instance| Box::new(instance) as Box<dyn Any>);
        }

        match self.aliases.iter().find(|alias| alias.target() == target) {
            Some(alias) => alias.cast(instance),
            None => Err(instance),
        }
    }
}
