use autowire::component::{Component, ComponentDescriptor, FactoryOptions};
use autowire::container::Container;
use autowire::instance_provider::{ComponentInstancePtr, ErrorPtr};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
struct ConnectionPool {
    created: AtomicUsize,
}

impl ConnectionPool {
    fn connect(&self) -> Result<Connection, ErrorPtr> {
        Ok(Connection {
            id: self.created.fetch_add(1, Ordering::SeqCst),
        })
    }
}

struct Connection {
    id: usize,
}

impl Component for ConnectionPool {
    fn describe() -> ComponentDescriptor {
        ComponentDescriptor::builder::<Self>()
            .default_constructor()
            // a new connection is produced for every request
            .factory::<Connection>(
                FactoryOptions::method("connect").singleton(false),
                ConnectionPool::connect,
            )
            // while this one is shared, like any other singleton
            .factory::<Connection>(
                FactoryOptions::method("admin").named("admin_connection"),
                ConnectionPool::connect,
            )
            .build()
    }
}

fn main() {
    let container = Container::new();

    // registering the pool also registers both produced components
    container.register::<ConnectionPool>();

    for _ in 0..2 {
        let connection = container
            .get::<Connection>()
            .expect("error creating Connection");
        let admin = container
            .get_named::<Connection>("admin_connection")
            .expect("error creating admin Connection");

        // prints different ids for regular connections, but the same one for the admin connection
        println!("Connection: {}, admin connection: {}", connection.id, admin.id);
    }

    let pool: ComponentInstancePtr<ConnectionPool> = container
        .get()
        .expect("error retrieving ConnectionPool");

    // prints "Created: 3"
    println!("Created: {}", pool.created.load(Ordering::SeqCst));
}
