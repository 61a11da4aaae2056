//! Discovery of components which haven't been registered explicitly.
//!
//! When a container has a scanner enabled, names unknown to its registry are looked up in the
//! scanner before failing. A descriptor providing the name (either directly or through one of its
//! factory methods) is then registered on the spot.
//!
//! The default [StaticComponentScanner] reads descriptors declared with
//! [declare_component](crate::declare_component), which are collected at link time:
//!
//! ```
//! use autowire::component::{Component, ComponentDescriptor};
//! use autowire::container::Container;
//! use autowire::declare_component;
//!
//! #[derive(Default)]
//! struct Discovered;
//!
//! impl Component for Discovered {
//!     fn describe() -> ComponentDescriptor {
//!         ComponentDescriptor::builder::<Self>()
//!             .default_constructor()
//!             .build()
//!     }
//! }
//!
//! declare_component!(Discovered);
//!
//! fn main() {
//!     let container = Container::new();
//!     container.enable_component_scanner();
//!
//!     assert!(container.get::<Discovered>().is_ok());
//! }
//! ```

use crate::component::{ComponentDescriptor, ComponentDescriptorPtr};
use crate::instance_provider::ComponentInstancePtr;
use itertools::Itertools;
#[cfg(test)]
use mockall::automock;

#[cfg(not(feature = "threadsafe"))]
pub type ScannerPtr = ComponentInstancePtr<dyn ComponentScanner>;
#[cfg(feature = "threadsafe")]
pub type ScannerPtr = ComponentInstancePtr<dyn ComponentScanner + Send + Sync>;

/// Source of component descriptors for automatic discovery.
#[cfg_attr(test, automock)]
pub trait ComponentScanner {
    /// Returns all descriptors known to this scanner.
    fn all_declared_descriptors(&self) -> Vec<ComponentDescriptorPtr>;

    /// Returns a descriptor providing given name, if any.
    fn discover_descriptor(&self, name: &str) -> Option<ComponentDescriptorPtr> {
        self.all_declared_descriptors()
            .into_iter()
            .find(|descriptor| descriptor.provides(name))
    }
}

/// Static declaration of a component, submitted with [declare_component](crate::declare_component).
pub struct ComponentDeclaration {
    pub describe: fn() -> ComponentDescriptor,
}

inventory::collect!(ComponentDeclaration);

/// Scanner over all statically declared components.
#[derive(Clone, Debug)]
pub struct StaticComponentScanner {
    descriptors: Vec<ComponentDescriptorPtr>,
}

impl StaticComponentScanner {
    pub fn new() -> Self {
        Self {
            descriptors: inventory::iter::<ComponentDeclaration>
                .into_iter()
                .map(|declaration| ComponentDescriptorPtr::new((declaration.describe)()))
                .collect_vec(),
        }
    }
}

impl Default for StaticComponentScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentScanner for StaticComponentScanner {
    fn all_declared_descriptors(&self) -> Vec<ComponentDescriptorPtr> {
        self.descriptors.clone()
    }

    fn discover_descriptor(&self, name: &str) -> Option<ComponentDescriptorPtr> {
        self.descriptors
            .iter()
            .find(|descriptor| descriptor.provides(name))
            .cloned()
    }
}

/// Declares a type implementing [Component](crate::component::Component) for discovery by the
/// [StaticComponentScanner].
#[macro_export]
macro_rules! declare_component {
    ($ty:ty) => {
        $crate::scanner::internal::submit! {
            $crate::scanner::ComponentDeclaration {
                describe: <$ty as $crate::component::Component>::describe,
            }
        }
    };
}

#[doc(hidden)]
pub mod internal {
    pub use inventory::submit;
}

#[cfg(test)]
mod tests {
    use crate::component::{
        Component, ComponentDescriptor, ComponentDescriptorPtr, FactoryOptions,
    };
    use crate::container::Container;
    use crate::instance_provider::ComponentInstancePtr;
    use crate::registry::InstantiationStrategy;
    use crate::scanner::{
        ComponentScanner, MockComponentScanner, ScannerPtr, StaticComponentScanner,
    };

    #[derive(Default)]
    struct Declared;

    struct Produced;

    impl Component for Declared {
        fn describe() -> ComponentDescriptor {
            ComponentDescriptor::builder::<Self>()
                .default_constructor()
                .factory::<Produced>(FactoryOptions::method("produce"), |_| Ok(Produced))
                .build()
        }
    }

    declare_component!(Declared);

    #[test]
    fn should_collect_declared_components() {
        let scanner = StaticComponentScanner::new();

        assert!(scanner
            .all_declared_descriptors()
            .iter()
            .any(|descriptor| descriptor.effective_name() == "Declared"));
        assert!(scanner.discover_descriptor("Produced").is_some());
        assert!(scanner.discover_descriptor("Undeclared").is_none());
    }

    #[test]
    fn should_register_discovered_component() {
        let mut scanner = MockComponentScanner::new();
        scanner
            .expect_discover_descriptor()
            .withf(|name| name == "Produced")
            .times(1)
            .returning(|_| {
                Some(ComponentDescriptorPtr::new(
                    <Declared as Component>::describe(),
                ))
            });

        let container = Container::new();
        container.enable_component_scanner_with(ComponentInstancePtr::new(scanner) as ScannerPtr);

        assert!(container.get::<Produced>().is_ok());
        assert!(container.is_registered("Declared"));
        assert_eq!(
            container
                .registration("Produced")
                .map(|registration| registration.strategy),
            Some(InstantiationStrategy::FactoryMethod {
                owner: "Declared".to_string(),
                method: "produce".to_string()
            })
        );
    }

    #[test]
    fn should_not_discover_without_scanner() {
        let container = Container::new();
        assert!(container.get::<Declared>().is_err());
    }
}
