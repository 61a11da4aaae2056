use autowire::component::{Component, ComponentDescriptor, Inject};
use autowire::container::Container;
use autowire::instance_provider::{ComponentInstancePtr, ErrorPtr};

#[derive(Default)]
struct Database {
    connected: bool,
}

impl Component for Database {
    fn describe() -> ComponentDescriptor {
        ComponentDescriptor::builder::<Self>()
            .default_constructor()
            // runs after all dependencies are injected, before anyone can use the instance
            .post_construct(|database| -> Result<(), ErrorPtr> {
                database.connected = true;
                println!("Database connected");
                Ok(())
            })
            // runs when the container is closed
            .pre_destroy(|_| -> Result<(), ErrorPtr> {
                println!("Database disconnected");
                Ok(())
            })
            .build()
    }
}

// an object created outside the container, which still wants its dependencies injected
#[derive(Default)]
struct Report {
    database: Option<ComponentInstancePtr<Database>>,
}

impl Component for Report {
    fn describe() -> ComponentDescriptor {
        ComponentDescriptor::builder::<Self>()
            .property::<Database>("database", Inject::by_type(), |report, database| {
                report.database = Some(database)
            })
            .post_construct(|_| -> Result<(), ErrorPtr> {
                println!("Report wired");
                Ok(())
            })
            .build()
    }
}

fn main() {
    let container = Container::new();
    container.register::<Database>();

    let mut report = Report::default();
    container.wire(&mut report).expect("error wiring Report");

    // prints "Connected: true"
    println!(
        "Connected: {}",
        report
            .database
            .as_ref()
            .map(|database| database.connected)
            .unwrap_or_default()
    );

    // prints "Database disconnected", and makes the container unusable
    container.close();
    println!("Closed: {}", container.get::<Database>().is_err());
}
