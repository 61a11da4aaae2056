//! Lazily resolved dependencies.
//!
//! A [Lazy] reference is injected instead of an instance when a dependency is declared as lazy.
//! Creating one doesn't resolve anything - the target is looked up on first access and memoized
//! afterwards. This allows components to depend on each other in a cycle, as long as at least one
//! edge of the cycle is lazy.
//!
//! Failed resolutions are not memoized, so accessing a reference again after e.g. registering the
//! missing component will succeed.

use crate::container::{Container, ContainerWeakPtr};
use crate::error::ComponentInstanceProviderError;
use crate::instance_provider::ComponentInstancePtr;
use crate::resolver::LookupKind;
#[cfg(not(feature = "threadsafe"))]
use once_cell::unsync::OnceCell;
#[cfg(feature = "threadsafe")]
use once_cell::sync::OnceCell;
use std::fmt::{Debug, Formatter};
use std::ops::Deref;

/// Reference to a component resolved on first use. Holds only a weak handle to the container, so
/// it doesn't keep the container alive.
///
/// Dereferencing panics when the target cannot be resolved. Constructors and lifecycle hooks can
/// run while the target is still being created, so they should use [Lazy::try_get] instead:
///
/// ```
/// use autowire::component::{Component, ComponentDescriptor, Inject};
/// use autowire::container::Container;
/// use autowire::instance_provider::ComponentInstancePtr;
/// use autowire::lazy::Lazy;
/// use autowire::ComponentInstanceProviderError;
///
/// struct Registry {
///     audit: Option<Lazy<Audit>>,
/// }
///
/// impl Component for Registry {
///     fn describe() -> ComponentDescriptor {
///         ComponentDescriptor::builder::<Self>()
///             .constructor(|_| Ok(Registry { audit: None }))
///             .lazy_property::<Audit>("audit", Inject::by_type(), |registry, audit| {
///                 registry.audit = Some(audit)
///             })
///             .build()
///     }
/// }
///
/// struct Audit {
///     registry: ComponentInstancePtr<Registry>,
///     cyclic: bool,
/// }
///
/// impl Component for Audit {
///     fn describe() -> ComponentDescriptor {
///         ComponentDescriptor::builder::<Self>()
///             .argument::<Registry>(Inject::by_type())
///             .constructor(|arguments| {
///                 Ok(Audit {
///                     registry: arguments.instance()?,
///                     cyclic: false,
///                 })
///             })
///             .post_construct(|audit| {
///                 // Audit is still being created here
///                 if let Some(lazy) = &audit.registry.audit {
///                     audit.cyclic = matches!(
///                         lazy.try_get(),
///                         Err(ComponentInstanceProviderError::CyclicDependency(_))
///                     );
///                 }
///                 Ok(())
///             })
///             .build()
///     }
/// }
///
/// let container = Container::new();
/// container.register::<Registry>();
/// container.register::<Audit>();
///
/// let registry = container.get::<Registry>().unwrap();
/// let audit = registry.audit.as_ref().unwrap();
/// assert!(audit.try_get().unwrap().cyclic);
/// assert!(audit.is_resolved());
/// ```
pub struct Lazy<T: ?Sized + 'static> {
    container: ContainerWeakPtr,
    name: String,
    kind: LookupKind,
    instance: OnceCell<ComponentInstancePtr<T>>,
}

impl<T: ?Sized + 'static> Lazy<T> {
    pub(crate) fn new(container: &Container, name: &str, kind: LookupKind) -> Self {
        Self {
            container: container.downgrade(),
            name: name.to_string(),
            kind,
            instance: OnceCell::new(),
        }
    }

    /// Name of the target component.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Checks if the target has already been resolved.
    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.instance.get().is_some()
    }

    /// Returns the target instance, resolving it if needed. Fails with
    /// [ContainerClosed](ComponentInstanceProviderError::ContainerClosed) if the container is
    /// already gone.
    ///
    /// Resolution happens outside of the memoizing cell, so reaching the same reference again
    /// while its target is still being created yields
    /// [CyclicDependency](ComponentInstanceProviderError::CyclicDependency).
    pub fn try_get(&self) -> Result<&ComponentInstancePtr<T>, ComponentInstanceProviderError> {
        if let Some(instance) = self.instance.get() {
            return Ok(instance);
        }

        let resolved = Container::upgrade(&self.container)
            .ok_or(ComponentInstanceProviderError::ContainerClosed)?
            .resolve_typed::<T>(&self.name, self.kind)?;

        Ok(self.instance.get_or_init(|| resolved))
    }
}

/// Panics if the target cannot be resolved - use [Lazy::try_get] to handle errors.
impl<T: ?Sized + 'static> Deref for Lazy<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        match self.try_get() {
            Ok(instance) => instance,
            Err(error) => panic!("Cannot resolve lazy component '{}': {}", self.name, error),
        }
    }
}

impl<T: ?Sized + 'static> Debug for Lazy<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lazy")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}
