//! Functionality related to storing component registrations.
//!
//! The [ComponentRegistry] maps names to [Registration]s. A name can be registered only once - the
//! first registration wins and later ones are ignored with a warning. Registering a component also
//! registers all components produced by its factory methods, each under its own name.

use crate::component::{ComponentDescriptorPtr, TypeInfo};
use crate::instance_provider::ComponentInstanceAnyPtr;
use fxhash::FxHashMap;
use tracing::{debug, warn};

/// Progress of the instantiation of a registration.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum RegistrationStatus {
    Registered,
    /// Currently being created by a resolution chain.
    Instantiating,
    /// Created at least once. Only singletons keep their instance.
    Instantiated,
}

/// How instances of a registration are created.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum InstantiationStrategy {
    /// Using the constructor of the registered descriptor.
    Constructor,
    /// By calling the factory method `method` on the resolved `owner` component.
    FactoryMethod { owner: String, method: String },
}

/// A registered component: its descriptor and instantiation state.
#[derive(Clone, Debug)]
pub struct Registration {
    pub name: String,
    pub component_type: TypeInfo,
    pub descriptor: ComponentDescriptorPtr,
    pub singleton: bool,
    pub strategy: InstantiationStrategy,
    pub instance: Option<ComponentInstanceAnyPtr>,
    pub status: RegistrationStatus,
}

impl Registration {
    fn new(name: String, descriptor: ComponentDescriptorPtr, strategy: InstantiationStrategy) -> Self {
        Self {
            name,
            component_type: *descriptor.component_type(),
            singleton: descriptor.is_singleton(),
            descriptor,
            strategy,
            instance: None,
            status: RegistrationStatus::Registered,
        }
    }

    /// Name of the component producing this one, if created by a factory method.
    pub fn factory_owner(&self) -> Option<&str> {
        match &self.strategy {
            InstantiationStrategy::Constructor => None,
            InstantiationStrategy::FactoryMethod { owner, .. } => Some(owner),
        }
    }
}

/// Name-based storage of registrations, preserving registration order.
#[derive(Clone, Debug, Default)]
pub struct ComponentRegistry {
    registrations: FxHashMap<String, Registration>,
    names: Vec<String>,
}

impl ComponentRegistry {
    /// Registers given descriptor under given name, or under its effective name when absent, along
    /// with all components produced by its factories. Returns `false` if the name was already
    /// taken, in which case nothing is registered.
    pub fn register(&mut self, descriptor: ComponentDescriptorPtr, name: Option<&str>) -> bool {
        let name = name.unwrap_or_else(|| descriptor.effective_name()).to_string();
        if !self.insert(Registration::new(
            name.clone(),
            descriptor.clone(),
            InstantiationStrategy::Constructor,
        )) {
            return false;
        }

        for factory in descriptor.factories() {
            self.insert(Registration::new(
                factory.produced_name.clone(),
                factory.produced.clone(),
                InstantiationStrategy::FactoryMethod {
                    owner: name.clone(),
                    method: factory.method_slot.clone(),
                },
            ));
        }

        true
    }

    fn insert(&mut self, registration: Registration) -> bool {
        if self.registrations.contains_key(&registration.name) {
            warn!(
                "Component with name '{}' already registered.",
                registration.name
            );
            return false;
        }

        debug!(
            name = registration.name,
            component_type = registration.component_type.name,
            "Registering component."
        );

        self.names.push(registration.name.clone());
        self.registrations
            .insert(registration.name.clone(), registration);
        true
    }

    #[inline]
    pub fn lookup(&self, name: &str) -> Option<&Registration> {
        self.registrations.get(name)
    }

    #[inline]
    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Registration> {
        self.registrations.get_mut(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.registrations.contains_key(name)
    }

    /// Iterates over all registered names, in registration order.
    pub fn all_known_names(&self) -> impl Iterator<Item = &str> + Clone {
        self.names.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use crate::component::{ComponentDescriptor, ComponentDescriptorPtr, FactoryOptions};
    use crate::registry::{ComponentRegistry, InstantiationStrategy, RegistrationStatus};
    use itertools::Itertools;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    struct TestComponent;

    struct Produced;

    #[derive(Clone, Default)]
    struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

    impl CapturedOutput {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for CapturedOutput {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedOutput {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn create_descriptor() -> ComponentDescriptorPtr {
        ComponentDescriptorPtr::new(
            ComponentDescriptor::builder::<TestComponent>()
                .factory::<Produced>(FactoryOptions::method("produce").singleton(false), |_| {
                    Ok(Produced)
                })
                .build(),
        )
    }

    #[test]
    fn should_register_component_with_factories() {
        let mut registry = ComponentRegistry::default();
        assert!(registry.register(create_descriptor(), Some("test")));

        let registration = registry.lookup("test").unwrap();
        assert_eq!(registration.strategy, InstantiationStrategy::Constructor);
        assert_eq!(registration.status, RegistrationStatus::Registered);
        assert!(registration.singleton);
        assert!(registration.instance.is_none());
        assert_eq!(registration.factory_owner(), None);

        let produced = registry.lookup("Produced").unwrap();
        assert_eq!(produced.factory_owner(), Some("test"));
        assert!(!produced.singleton);
        assert_eq!(
            produced.strategy,
            InstantiationStrategy::FactoryMethod {
                owner: "test".to_string(),
                method: "produce".to_string()
            }
        );
    }

    #[test]
    fn should_keep_first_registration_and_warn() {
        let output = CapturedOutput::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(output.clone())
            .with_ansi(false)
            .finish();

        let mut registry = ComponentRegistry::default();
        let first = create_descriptor();

        tracing::subscriber::with_default(subscriber, || {
            assert!(registry.register(first.clone(), None));
            assert!(!registry.register(create_descriptor(), None));
        });

        assert!(ComponentDescriptorPtr::ptr_eq(
            &registry.lookup("TestComponent").unwrap().descriptor,
            &first
        ));
        assert!(output
            .contents()
            .contains("Component with name 'TestComponent' already registered."));
    }

    #[test]
    fn should_list_names_in_registration_order() {
        let mut registry = ComponentRegistry::default();
        registry.register(create_descriptor(), Some("b"));
        registry.register(
            ComponentDescriptorPtr::new(ComponentDescriptor::builder::<TestComponent>().build()),
            Some("a"),
        );

        let names = registry.all_known_names();
        assert_eq!(names.clone().collect_vec(), vec!["b", "Produced", "a"]);
        assert_eq!(names.count(), 3);
        assert!(registry.contains("a"));
        assert!(registry.lookup("c").is_none());
    }
}
