//! One of the basic blocks of dependency injection is a [Component]. Components are injectable
//! objects, which themselves can contain dependencies to other components.
//!
//! ## Describing components
//!
//! Every component is described by a [ComponentDescriptor]: static metadata telling the container
//! what the component depends on and how to create it. Descriptors are created with a
//! [ComponentDescriptorBuilder] and are immutable afterwards. Types implementing [Component]
//! provide their descriptor themselves, which makes it possible to register them by type:
//!
//! ```
//! use autowire::component::{Component, ComponentDescriptor, FactoryOptions, Inject};
//! use autowire::instance_provider::{ComponentInstancePtr, ErrorPtr};
//! use autowire::lazy::Lazy;
//!
//! #[derive(Default)]
//! struct Clock;
//!
//! struct Connection;
//!
//! impl Component for Clock {
//!     fn describe() -> ComponentDescriptor {
//!         ComponentDescriptor::builder::<Self>()
//!             .default_constructor()
//!             // Clock produces Connection components
//!             .factory::<Connection>(FactoryOptions::method("connect"), |_| Ok(Connection))
//!             .build()
//!     }
//! }
//!
//! struct Service {
//!     clock: ComponentInstancePtr<Clock>,
//!     verbose: bool,
//!     connection: Option<Lazy<Connection>>,
//! }
//!
//! impl Component for Service {
//!     fn describe() -> ComponentDescriptor {
//!         ComponentDescriptor::builder::<Self>()
//!             .name("service")
//!             .singleton(false)
//!             // constructor arguments, in order
//!             .argument::<Clock>(Inject::by_type())
//!             .argument::<bool>(Inject::named("verbose"))
//!             .constructor(|arguments| {
//!                 Ok(Service {
//!                     clock: arguments.instance()?,
//!                     verbose: *arguments.instance::<bool>()?,
//!                     connection: None,
//!                 })
//!             })
//!             // properties, assigned after construction
//!             .lazy_property::<Connection>("connection", Inject::by_type(), |service, connection| {
//!                 service.connection = Some(connection)
//!             })
//!             .post_construct(|service| -> Result<(), ErrorPtr> {
//!                 assert!(service.connection.is_some());
//!                 Ok(())
//!             })
//!             .build()
//!     }
//! }
//! ```
//!
//! ### Names
//!
//! Every component has a single name. Unless given explicitly during registration or with
//! [ComponentDescriptorBuilder::name], it's the short name of the type: the last path segment,
//! without generic parameters. The same rule is used for dependencies which don't name their
//! target explicitly, so `Inject::by_type()` on `Clock` looks for a component named `Clock`. For
//! trait objects, `dyn` and auto trait bounds are dropped too: `dyn Greeter + Send + Sync` maps to
//! `Greeter`.
//!
//! ### Dependencies
//!
//! * constructor arguments - resolved in declaration order and handed to the constructor via
//! [Arguments](crate::factory::Arguments)
//! * properties - resolved after construction, in declaration order, and assigned via setters
//! * lazy dependencies - injected as [Lazy](crate::lazy::Lazy) references, resolved on first use
//!
//! ### Aliases
//!
//! Components can be requested as other types, usually `dyn Trait`, if a cast is declared with
//! [ComponentDescriptorBuilder::alias]. Resolution itself is always name-based; aliases only decide
//! which types a resolved instance can be handed out as.

pub(crate) mod blueprint;

use crate::component::blueprint::{
    BlueprintPtr, PropertySetter, TypedAlias, TypedBlueprint, TypedFactoryMethod,
};
pub use crate::component::blueprint::{Constructor, PostConstructHook, PreDestroyHook};
use crate::instance_provider::{ComponentInstancePtr, ErrorPtr, Injectable};
use crate::lazy::Lazy;
use crate::resolver::{materialize, MaterializeFn};
use derivative::Derivative;
use std::any::{type_name, TypeId};

pub type ComponentDescriptorPtr = ComponentInstancePtr<ComponentDescriptor>;

/// Base trait for components which know how to describe themselves. Such components can be
/// registered by type and declared for automatic discovery with
/// [declare_component](crate::declare_component).
pub trait Component: Injectable + Sized {
    /// Creates the descriptor of this component.
    fn describe() -> ComponentDescriptor;
}

/// Identity of a Rust type, along with its names.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeInfo {
    pub id: TypeId,
    pub name: &'static str,
    /// Name used as the default component name - see module documentation.
    pub short_name: &'static str,
}

impl TypeInfo {
    pub fn of<T: ?Sized + 'static>() -> Self {
        let name = type_name::<T>();
        Self {
            id: TypeId::of::<T>(),
            name,
            short_name: short_type_name(name),
        }
    }
}

/// Returns the short version of a full type name: `dyn a::b::Trait + Send` becomes `Trait`,
/// `a::Wrapper<b::Inner>` becomes `Wrapper`.
pub fn short_type_name(name: &str) -> &str {
    let name = name.strip_prefix("dyn ").unwrap_or(name);
    let name = name
        .split(|c: char| c == ' ' || c == '<')
        .next()
        .unwrap_or(name);
    name.rsplit("::").next().unwrap_or(name)
}

/// Where a resolved dependency ends up.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum DependencySlot {
    /// Constructor argument at given position.
    Constructor(usize),
    /// Property with given key, assigned after construction.
    Property(String),
}

/// Declaration of a single dependency of a component.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct DependencySpec {
    pub slot: DependencySlot,
    /// Name of the component or property to inject. When absent, the property key (if a property
    /// with such name exists) or the target type short name is used.
    pub explicit_name: Option<String>,
    pub lazy: bool,
    pub target: TypeInfo,
    #[derivative(Debug = "ignore")]
    pub(crate) materialize: MaterializeFn,
}

impl DependencySpec {
    fn new<D: ?Sized + 'static>(slot: DependencySlot, inject: Inject) -> Self {
        Self {
            slot,
            explicit_name: inject.name,
            lazy: inject.lazy,
            target: TypeInfo::of::<D>(),
            materialize: materialize::<D>,
        }
    }
}

/// Options for a single dependency: which name to look for and whether to resolve lazily.
#[derive(Clone, Default, Eq, PartialEq, Debug)]
pub struct Inject {
    name: Option<String>,
    lazy: bool,
}

impl Inject {
    /// Injects a component named after the dependency type.
    pub fn by_type() -> Self {
        Self::default()
    }

    /// Injects a component or property with given name.
    pub fn named<S: ToString>(name: S) -> Self {
        Self {
            name: Some(name.to_string()),
            lazy: false,
        }
    }

    /// Injects a [Lazy] reference instead of resolving immediately.
    pub fn lazy(self) -> Self {
        self.lazy_flag(true)
    }

    fn lazy_flag(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }
}

/// Declaration of a factory method producing another component.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct FactorySpec {
    pub method_slot: String,
    /// Name under which the produced component is registered.
    pub produced_name: String,
    /// Caching of the produced component, independent of the owner.
    pub singleton: bool,
    #[derivative(Debug = "ignore")]
    pub(crate) produced: ComponentDescriptorPtr,
}

/// Options for a factory method: see [ComponentDescriptorBuilder::factory].
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct FactoryOptions {
    method_slot: String,
    produced_name: Option<String>,
    singleton: bool,
}

impl FactoryOptions {
    /// Creates options for a factory method identified by given name. The produced component is a
    /// singleton named after its type, unless configured otherwise.
    pub fn method<S: ToString>(method_slot: S) -> Self {
        Self {
            method_slot: method_slot.to_string(),
            produced_name: None,
            singleton: true,
        }
    }

    pub fn named<S: ToString>(mut self, produced_name: S) -> Self {
        self.produced_name = Some(produced_name.to_string());
        self
    }

    pub fn singleton(mut self, singleton: bool) -> Self {
        self.singleton = singleton;
        self
    }
}

/// Static metadata about a component - see module documentation.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct ComponentDescriptor {
    name: Option<String>,
    component_type: TypeInfo,
    singleton: bool,
    dependencies: Vec<DependencySpec>,
    factories: Vec<FactorySpec>,
    #[derivative(Debug = "ignore")]
    pub(crate) blueprint: BlueprintPtr,
}

impl ComponentDescriptor {
    /// Starts building a descriptor for given type.
    pub fn builder<T: Injectable>() -> ComponentDescriptorBuilder<T> {
        ComponentDescriptorBuilder {
            name: None,
            singleton: true,
            dependencies: vec![],
            factories: vec![],
            blueprint: TypedBlueprint::default(),
            argument_count: 0,
        }
    }

    /// Explicitly declared name, if any.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Declared name or the short type name.
    #[inline]
    pub fn effective_name(&self) -> &str {
        self.name
            .as_deref()
            .unwrap_or(self.component_type.short_name)
    }

    #[inline]
    pub fn component_type(&self) -> &TypeInfo {
        &self.component_type
    }

    #[inline]
    pub fn is_singleton(&self) -> bool {
        self.singleton
    }

    /// All dependencies in declaration order.
    #[inline]
    pub fn dependencies(&self) -> &[DependencySpec] {
        &self.dependencies
    }

    #[inline]
    pub fn factories(&self) -> &[FactorySpec] {
        &self.factories
    }

    /// Checks if registering this descriptor makes given name available, either as the component
    /// itself or as one of the components produced by its factories.
    pub fn provides(&self, name: &str) -> bool {
        self.effective_name() == name
            || self
                .factories
                .iter()
                .any(|factory| factory.produced_name == name)
    }

    pub(crate) fn constructor_dependencies(&self) -> impl Iterator<Item = &DependencySpec> {
        self.dependencies
            .iter()
            .filter(|spec| matches!(spec.slot, DependencySlot::Constructor(_)))
    }

    pub(crate) fn property_dependencies(&self) -> impl Iterator<Item = &DependencySpec> {
        self.dependencies
            .iter()
            .filter(|spec| matches!(spec.slot, DependencySlot::Property(_)))
    }
}

/// Builder for [ComponentDescriptor]s.
pub struct ComponentDescriptorBuilder<T: Injectable> {
    name: Option<String>,
    singleton: bool,
    dependencies: Vec<DependencySpec>,
    factories: Vec<FactorySpec>,
    blueprint: TypedBlueprint<T>,
    argument_count: usize,
}

impl<T: Injectable> ComponentDescriptorBuilder<T> {
    /// Sets the component name, instead of the type name.
    pub fn name<S: ToString>(mut self, name: S) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Sets whether a single instance should be shared (default) or a new one created on each
    /// request.
    pub fn singleton(mut self, singleton: bool) -> Self {
        self.singleton = singleton;
        self
    }

    /// Adds the next constructor argument. The constructor should retrieve it with
    /// [Arguments::instance](crate::factory::Arguments::instance) or, if `inject` is lazy,
    /// [Arguments::lazy](crate::factory::Arguments::lazy).
    pub fn argument<D: ?Sized + 'static>(mut self, inject: Inject) -> Self {
        let slot = DependencySlot::Constructor(self.argument_count);
        self.argument_count += 1;
        self.dependencies.push(DependencySpec::new::<D>(slot, inject));
        self
    }

    /// Sets the constructor used when the container creates instances.
    pub fn constructor(mut self, constructor: Constructor<T>) -> Self {
        self.blueprint.constructor = Some(constructor);
        self
    }

    /// Adds a property assigned right after construction. The `lazy` flag of `inject` is ignored -
    /// see [ComponentDescriptorBuilder::lazy_property].
    pub fn property<D: ?Sized + 'static>(
        mut self,
        key: &str,
        inject: Inject,
        setter: fn(&mut T, ComponentInstancePtr<D>),
    ) -> Self {
        self.push_property::<D, _>(key, inject.lazy_flag(false), setter);
        self
    }

    /// Adds a property receiving a [Lazy] reference.
    pub fn lazy_property<D: ?Sized + 'static>(
        mut self,
        key: &str,
        inject: Inject,
        setter: fn(&mut T, Lazy<D>),
    ) -> Self {
        self.push_property::<D, _>(key, inject.lazy_flag(true), setter);
        self
    }

    fn push_property<D: ?Sized + 'static, V: 'static>(
        &mut self,
        key: &str,
        inject: Inject,
        set: fn(&mut T, V),
    ) {
        self.dependencies.push(DependencySpec::new::<D>(
            DependencySlot::Property(key.to_string()),
            inject,
        ));
        self.blueprint.properties.push(Box::new(PropertySetter {
            slot: key.to_string(),
            set,
        }));
    }

    /// Adds a hook run after all dependencies are injected and before the instance is shared.
    /// Hooks run in declaration order.
    pub fn post_construct(mut self, hook: PostConstructHook<T>) -> Self {
        self.blueprint.post_construct.push(hook);
        self
    }

    /// Adds a hook run on a cached instance when the container closes.
    pub fn pre_destroy(mut self, hook: PreDestroyHook<T>) -> Self {
        self.blueprint.pre_destroy.push(hook);
        self
    }

    /// Declares a factory method producing `P` components. Registering this component registers
    /// the produced component too, created by calling `produce` on the resolved owner.
    pub fn factory<P: Injectable>(
        mut self,
        options: FactoryOptions,
        produce: fn(&T) -> Result<P, ErrorPtr>,
    ) -> Self {
        let produced_name = options
            .produced_name
            .unwrap_or_else(|| TypeInfo::of::<P>().short_name.to_string());

        let produced = ComponentDescriptor::builder::<P>()
            .name(&produced_name)
            .singleton(options.singleton)
            .build();

        self.factories.push(FactorySpec {
            method_slot: options.method_slot.clone(),
            produced_name,
            singleton: options.singleton,
            produced: ComponentDescriptorPtr::new(produced),
        });
        self.blueprint.factories.push(Box::new(TypedFactoryMethod {
            slot: options.method_slot,
            produce,
        }));
        self
    }

    /// Allows requesting this component as `I`, usually a `dyn Trait`.
    pub fn alias<I: ?Sized + 'static>(
        mut self,
        cast: fn(ComponentInstancePtr<T>) -> ComponentInstancePtr<I>,
    ) -> Self {
        self.blueprint.aliases.push(Box::new(TypedAlias { cast }));
        self
    }

    pub fn build(self) -> ComponentDescriptor {
        ComponentDescriptor {
            name: self.name,
            component_type: TypeInfo::of::<T>(),
            singleton: self.singleton,
            dependencies: self.dependencies,
            factories: self.factories,
            blueprint: ComponentInstancePtr::new(self.blueprint) as BlueprintPtr,
        }
    }
}

impl<T: Injectable + Default> ComponentDescriptorBuilder<T> {
    /// Uses `Default::default()` as the constructor.
    pub fn default_constructor(self) -> Self {
        self.constructor(|_| Ok(T::default()))
    }
}
