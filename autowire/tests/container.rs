mod container_test {
    use autowire::component::{Component, ComponentDescriptor, FactoryOptions, Inject};
    use autowire::container::{Container, CONTAINER_NAME};
    use autowire::instance_provider::{ComponentInstancePtr, ErrorPtr};
    use autowire::lazy::Lazy;
    use autowire::registry::RegistrationStatus;
    use autowire::ComponentInstanceProviderError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    trait Greeter {
        fn greet(&self) -> String;
    }

    #[cfg(feature = "threadsafe")]
    type GreeterTrait = dyn Greeter + Send + Sync;
    #[cfg(not(feature = "threadsafe"))]
    type GreeterTrait = dyn Greeter;

    struct Engine;

    impl Component for Engine {
        fn describe() -> ComponentDescriptor {
            ComponentDescriptor::builder::<Self>()
                .constructor(|_| Ok(Engine))
                .build()
        }
    }

    struct Car {
        engine: ComponentInstancePtr<Engine>,
    }

    impl Component for Car {
        fn describe() -> ComponentDescriptor {
            ComponentDescriptor::builder::<Self>()
                .argument::<Engine>(Inject::by_type())
                .constructor(|arguments| {
                    Ok(Car {
                        engine: arguments.instance()?,
                    })
                })
                .build()
        }
    }

    #[derive(Default)]
    struct Ticket;

    impl Component for Ticket {
        fn describe() -> ComponentDescriptor {
            ComponentDescriptor::builder::<Self>()
                .singleton(false)
                .default_constructor()
                .build()
        }
    }

    #[derive(Default)]
    struct English;

    impl Greeter for English {
        fn greet(&self) -> String {
            "Hello".to_string()
        }
    }

    impl Component for English {
        fn describe() -> ComponentDescriptor {
            ComponentDescriptor::builder::<Self>()
                .name("english")
                .default_constructor()
                .alias::<GreeterTrait>(|english| english as ComponentInstancePtr<GreeterTrait>)
                .build()
        }
    }

    #[derive(Default)]
    struct Polish;

    impl Greeter for Polish {
        fn greet(&self) -> String {
            "Cześć".to_string()
        }
    }

    impl Component for Polish {
        fn describe() -> ComponentDescriptor {
            ComponentDescriptor::builder::<Self>()
                .default_constructor()
                .alias::<GreeterTrait>(|polish| polish as ComponentInstancePtr<GreeterTrait>)
                .build()
        }
    }

    struct Chicken;

    impl Component for Chicken {
        fn describe() -> ComponentDescriptor {
            ComponentDescriptor::builder::<Self>()
                .argument::<Egg>(Inject::by_type())
                .constructor(|arguments| {
                    arguments.instance::<Egg>()?;
                    Ok(Chicken)
                })
                .build()
        }
    }

    struct Egg;

    impl Component for Egg {
        fn describe() -> ComponentDescriptor {
            ComponentDescriptor::builder::<Self>()
                .argument::<Chicken>(Inject::by_type())
                .constructor(|arguments| {
                    arguments.instance::<Chicken>()?;
                    Ok(Egg)
                })
                .build()
        }
    }

    struct Left {
        right: ComponentInstancePtr<Right>,
    }

    impl Component for Left {
        fn describe() -> ComponentDescriptor {
            ComponentDescriptor::builder::<Self>()
                .argument::<Right>(Inject::by_type())
                .constructor(|arguments| {
                    Ok(Left {
                        right: arguments.instance()?,
                    })
                })
                .build()
        }
    }

    #[derive(Default)]
    struct Right {
        left: Option<Lazy<Left>>,
    }

    impl Component for Right {
        fn describe() -> ComponentDescriptor {
            ComponentDescriptor::builder::<Self>()
                .default_constructor()
                .lazy_property::<Left>("left", Inject::by_type(), |right, left| {
                    right.left = Some(left)
                })
                .build()
        }
    }

    struct Feature {
        enabled: ComponentInstancePtr<bool>,
    }

    impl Component for Feature {
        fn describe() -> ComponentDescriptor {
            ComponentDescriptor::builder::<Self>()
                .argument::<bool>(Inject::named("flag"))
                .constructor(|arguments| {
                    Ok(Feature {
                        enabled: arguments.instance()?,
                    })
                })
                .build()
        }
    }

    static CONNECTIONS: AtomicUsize = AtomicUsize::new(0);

    #[derive(Default)]
    struct ConnectionPool;

    struct Connection {
        id: usize,
    }

    impl ConnectionPool {
        fn connect(&self) -> Result<Connection, ErrorPtr> {
            Ok(Connection {
                id: CONNECTIONS.fetch_add(1, Ordering::SeqCst),
            })
        }
    }

    impl Component for ConnectionPool {
        fn describe() -> ComponentDescriptor {
            ComponentDescriptor::builder::<Self>()
                .default_constructor()
                .factory::<Connection>(
                    FactoryOptions::method("connect").singleton(false),
                    ConnectionPool::connect,
                )
                .factory::<Connection>(
                    FactoryOptions::method("primary").named("primary_connection"),
                    ConnectionPool::connect,
                )
                .build()
        }
    }

    #[derive(Default)]
    struct Widget {
        engine: Option<ComponentInstancePtr<Engine>>,
        greeter: Option<ComponentInstancePtr<GreeterTrait>>,
        initialized: usize,
    }

    impl Component for Widget {
        fn describe() -> ComponentDescriptor {
            ComponentDescriptor::builder::<Self>()
                .property::<Engine>("engine", Inject::by_type(), |widget, engine| {
                    widget.engine = Some(engine)
                })
                .property::<GreeterTrait>("greeter", Inject::named("english"), |widget, greeter| {
                    widget.greeter = Some(greeter)
                })
                .post_construct(|widget| -> Result<(), ErrorPtr> {
                    widget.initialized += 1;
                    Ok(())
                })
                .build()
        }
    }

    struct ContainerAware {
        container: ComponentInstancePtr<Container>,
    }

    impl Component for ContainerAware {
        fn describe() -> ComponentDescriptor {
            ComponentDescriptor::builder::<Self>()
                .singleton(false)
                .argument::<Container>(Inject::named(CONTAINER_NAME))
                .constructor(|arguments| {
                    Ok(ContainerAware {
                        container: arguments.instance()?,
                    })
                })
                .build()
        }
    }

    struct Catalog {
        index: Option<Lazy<Index>>,
    }

    impl Component for Catalog {
        fn describe() -> ComponentDescriptor {
            ComponentDescriptor::builder::<Self>()
                .constructor(|_| Ok(Catalog { index: None }))
                .lazy_property::<Index>("index", Inject::by_type(), |catalog, index| {
                    catalog.index = Some(index)
                })
                .build()
        }
    }

    struct Index {
        catalog: ComponentInstancePtr<Catalog>,
        reentry: Option<ComponentInstanceProviderError>,
    }

    impl Component for Index {
        fn describe() -> ComponentDescriptor {
            ComponentDescriptor::builder::<Self>()
                .argument::<Catalog>(Inject::by_type())
                .constructor(|arguments| {
                    Ok(Index {
                        catalog: arguments.instance()?,
                        reentry: None,
                    })
                })
                .post_construct(|index| {
                    if let Some(lazy) = &index.catalog.index {
                        index.reentry = lazy.try_get().err();
                    }
                    Ok(())
                })
                .build()
        }
    }

    static RESOLUTION_LOG: Mutex<Vec<&'static str>> = Mutex::new(Vec::new());

    fn record(name: &'static str) {
        RESOLUTION_LOG.lock().unwrap().push(name);
    }

    struct Lexer;
    struct Parser;
    struct Checker;
    struct Emitter;

    impl Component for Lexer {
        fn describe() -> ComponentDescriptor {
            ComponentDescriptor::builder::<Self>()
                .constructor(|_| {
                    record("Lexer");
                    Ok(Lexer)
                })
                .build()
        }
    }

    impl Component for Parser {
        fn describe() -> ComponentDescriptor {
            ComponentDescriptor::builder::<Self>()
                .constructor(|_| {
                    record("Parser");
                    Ok(Parser)
                })
                .build()
        }
    }

    impl Component for Checker {
        fn describe() -> ComponentDescriptor {
            ComponentDescriptor::builder::<Self>()
                .constructor(|_| {
                    record("Checker");
                    Ok(Checker)
                })
                .build()
        }
    }

    impl Component for Emitter {
        fn describe() -> ComponentDescriptor {
            ComponentDescriptor::builder::<Self>()
                .constructor(|_| {
                    record("Emitter");
                    Ok(Emitter)
                })
                .build()
        }
    }

    struct Compiler {
        lexer: ComponentInstancePtr<Lexer>,
        parser: ComponentInstancePtr<Parser>,
        checker: Option<ComponentInstancePtr<Checker>>,
        emitter: Option<ComponentInstancePtr<Emitter>>,
    }

    impl Component for Compiler {
        fn describe() -> ComponentDescriptor {
            ComponentDescriptor::builder::<Self>()
                .property::<Checker>("checker", Inject::by_type(), |compiler, checker| {
                    compiler.checker = Some(checker)
                })
                .argument::<Lexer>(Inject::by_type())
                .property::<Emitter>("emitter", Inject::by_type(), |compiler, emitter| {
                    compiler.emitter = Some(emitter)
                })
                .argument::<Parser>(Inject::by_type())
                .constructor(|arguments| {
                    Ok(Compiler {
                        lexer: arguments.instance()?,
                        parser: arguments.instance()?,
                        checker: None,
                        emitter: None,
                    })
                })
                .build()
        }
    }

    #[test]
    fn should_inject_same_singleton_instance() {
        let container = Container::new();
        container.register::<Engine>();
        container.register::<Car>();

        let car = container.get::<Car>().unwrap();
        let engine = container.get::<Engine>().unwrap();

        assert!(ComponentInstancePtr::ptr_eq(&car.engine, &engine));
        assert!(ComponentInstancePtr::ptr_eq(
            &car,
            &container.get::<Car>().unwrap()
        ));
    }

    #[test]
    fn should_create_new_prototype_instances() {
        let container = Container::new();
        container.register::<Ticket>();

        let first = container.get::<Ticket>().unwrap();
        let second = container.get::<Ticket>().unwrap();

        assert!(!ComponentInstancePtr::ptr_eq(&first, &second));
        assert_eq!(
            container.status("Ticket"),
            Some(RegistrationStatus::Instantiated)
        );
    }

    #[test]
    fn should_keep_first_registration_of_duplicate_name() {
        let container = Container::new();
        assert!(container.register_named::<English>("greeter"));
        assert!(!container.register_named::<Polish>("greeter"));

        let greeter = container.get_named::<GreeterTrait>("greeter").unwrap();
        assert_eq!(greeter.greet(), "Hello");
    }

    #[test]
    fn should_detect_cycles() {
        let container = Container::new();
        container.register::<Chicken>();
        container.register::<Egg>();

        let error = container.get::<Chicken>().err().unwrap();
        assert!(matches!(
            error,
            ComponentInstanceProviderError::CyclicDependency(name) if name == "Chicken"
        ));

        assert_eq!(
            container.status("Chicken"),
            Some(RegistrationStatus::Registered)
        );
        assert_eq!(container.status("Egg"), Some(RegistrationStatus::Registered));
    }

    #[test]
    fn should_break_cycle_with_lazy_dependency() {
        let container = Container::new();
        container.register::<Left>();
        container.register::<Right>();

        let left = container.get::<Left>().unwrap();
        let lazy_left = left.right.left.as_ref().unwrap();

        assert!(!lazy_left.is_resolved());
        assert!(ComponentInstancePtr::ptr_eq(lazy_left.try_get().unwrap(), &left));
    }

    #[test]
    fn should_resolve_lazy_dependency_on_first_access() {
        let container = Container::new();
        container.register::<Left>();
        container.register::<Right>();

        let right = container.get::<Right>().unwrap();
        assert_eq!(container.status("Left"), Some(RegistrationStatus::Registered));

        let left = right.left.as_ref().unwrap();
        assert!(ComponentInstancePtr::ptr_eq(&left.right, &right));
        assert_eq!(
            container.status("Left"),
            Some(RegistrationStatus::Instantiated)
        );
    }

    #[test]
    fn should_report_unknown_component() {
        let container = Container::new();
        let error = container.get::<Engine>().err().unwrap();

        assert!(matches!(
            &error,
            ComponentInstanceProviderError::ComponentNotFound(name) if name == "Engine"
        ));
        assert_eq!(error.to_string(), "Component 'Engine' not found");
    }

    #[test]
    fn should_cache_singleton_factory_products() {
        let container = Container::new();
        container.register::<ConnectionPool>();

        let first = container
            .get_named::<Connection>("primary_connection")
            .unwrap();
        let second = container
            .get_named::<Connection>("primary_connection")
            .unwrap();

        assert!(ComponentInstancePtr::ptr_eq(&first, &second));
        assert_eq!(first.id, second.id);
    }

    #[test]
    fn should_create_new_prototype_factory_products() {
        let container = Container::new();
        container.register::<ConnectionPool>();

        let first = container.get::<Connection>().unwrap();
        let second = container.get::<Connection>().unwrap();

        assert!(!ComponentInstancePtr::ptr_eq(&first, &second));
        assert_ne!(first.id, second.id);
        assert!(ComponentInstancePtr::ptr_eq(
            &container.get::<ConnectionPool>().unwrap(),
            &container.get::<ConnectionPool>().unwrap()
        ));
        assert_eq!(
            container
                .registration("Connection")
                .and_then(|registration| registration.factory_owner().map(str::to_string)),
            Some("ConnectionPool".to_string())
        );
    }

    #[test]
    fn should_inject_property_value_verbatim() {
        let container = Container::new();
        container.add_property("flag", false);
        container.register::<Feature>();

        let feature = container.get::<Feature>().unwrap();
        assert!(!*feature.enabled);
    }

    #[test]
    fn should_retry_after_adding_missing_property() {
        let container = Container::new();
        container.register::<Feature>();

        assert!(matches!(
            container.get::<Feature>().err().unwrap(),
            ComponentInstanceProviderError::NamedComponentNotFound(name) if name == "flag"
        ));
        assert_eq!(
            container.status("Feature"),
            Some(RegistrationStatus::Registered)
        );

        container.add_property("flag", true);
        assert!(*container.get::<Feature>().unwrap().enabled);
    }

    #[test]
    fn should_wire_external_object() {
        let container = Container::new();
        container.register::<Engine>();
        container.register::<English>();

        let mut widget = Widget::default();
        container.wire(&mut widget).unwrap();

        assert!(ComponentInstancePtr::ptr_eq(
            widget.engine.as_ref().unwrap(),
            &container.get::<Engine>().unwrap()
        ));
        assert_eq!(widget.greeter.as_ref().unwrap().greet(), "Hello");
        assert_eq!(widget.initialized, 1);
        assert!(!container.is_registered("Widget"));
    }

    #[test]
    fn should_resolve_alias_by_name() {
        let container = Container::new();
        container.register::<English>();
        container.register_named::<Polish>("Greeter");

        assert_eq!(container.get::<GreeterTrait>().unwrap().greet(), "Cześć");
        assert_eq!(
            container
                .get_named::<GreeterTrait>("english")
                .unwrap()
                .greet(),
            "Hello"
        );
        assert!(matches!(
            container.get_named::<Engine>("english").err().unwrap(),
            ComponentInstanceProviderError::IncompatibleComponent { name, .. } if name == "english"
        ));
    }

    #[test]
    fn should_inject_container() {
        let container = Container::new();
        container.register::<ContainerAware>();

        let aware = container.get::<ContainerAware>().unwrap();
        assert_eq!(*aware.container, container);
    }

    #[test]
    fn should_list_known_names() {
        let container = Container::new();
        container.register::<Engine>();
        container.register::<ConnectionPool>();

        assert_eq!(
            container.all_known_names(),
            vec![
                CONTAINER_NAME,
                "Engine",
                "ConnectionPool",
                "Connection",
                "primary_connection"
            ]
        );
    }

    #[test]
    fn should_report_cycle_when_lazy_dependency_is_reentered() {
        let container = Container::new();
        container.register::<Catalog>();
        container.register::<Index>();

        let catalog = container.get::<Catalog>().unwrap();
        let index = catalog.index.as_ref().unwrap().try_get().unwrap();

        assert!(matches!(
            &index.reentry,
            Some(ComponentInstanceProviderError::CyclicDependency(name)) if name == "Index"
        ));
        assert!(catalog.index.as_ref().unwrap().is_resolved());
        assert_eq!(
            container.status("Index"),
            Some(RegistrationStatus::Instantiated)
        );
    }

    #[test]
    fn should_resolve_arguments_before_properties() {
        let container = Container::new();
        container.register::<Lexer>();
        container.register::<Parser>();
        container.register::<Checker>();
        container.register::<Emitter>();
        container.register::<Compiler>();

        let compiler = container.get::<Compiler>().unwrap();

        assert!(compiler.checker.is_some());
        assert!(compiler.emitter.is_some());
        assert!(ComponentInstancePtr::ptr_eq(
            &compiler.lexer,
            &container.get::<Lexer>().unwrap()
        ));
        assert!(ComponentInstancePtr::ptr_eq(
            &compiler.parser,
            &container.get::<Parser>().unwrap()
        ));
        assert_eq!(
            *RESOLUTION_LOG.lock().unwrap(),
            vec!["Lexer", "Parser", "Checker", "Emitter"]
        );
    }
}
