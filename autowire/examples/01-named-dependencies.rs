use autowire::component::{Component, ComponentDescriptor, Inject};
use autowire::container::Container;
use autowire::instance_provider::ComponentInstancePtr;

trait Greeter {
    fn greet(&self) -> String;
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
            .default_constructor()
            .alias::<dyn Greeter + Send + Sync>(|greeter| {
                greeter as ComponentInstancePtr<dyn Greeter + Send + Sync>
            })
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
            .alias::<dyn Greeter + Send + Sync>(|greeter| {
                greeter as ComponentInstancePtr<dyn Greeter + Send + Sync>
            })
            .build()
    }
}

#[derive(Default)]
struct Welcome {
    greeter: Option<ComponentInstancePtr<dyn Greeter + Send + Sync>>,
    audience: Option<ComponentInstancePtr<String>>,
}

impl Welcome {
    fn print(&self) {
        if let (Some(greeter), Some(audience)) = (&self.greeter, &self.audience) {
            println!("{} {}!", greeter.greet(), audience);
        }
    }
}

impl Component for Welcome {
    fn describe() -> ComponentDescriptor {
        ComponentDescriptor::builder::<Self>()
            .default_constructor()
            // an explicit name selects one of many components implementing the same trait
            .property::<dyn Greeter + Send + Sync>(
                "greeter",
                Inject::named("polish"),
                |welcome, greeter| welcome.greeter = Some(greeter),
            )
            // unnamed properties are first looked up in properties added to the container, using
            // the property key
            .property::<String>("audience", Inject::by_type(), |welcome, audience| {
                welcome.audience = Some(audience)
            })
            .build()
    }
}

fn main() {
    let container = Container::new();
    container.register_named::<English>("english");
    container.register_named::<Polish>("polish");
    container.register::<Welcome>();
    container.add_property("audience", "world".to_string());

    // prints "Cześć world!"
    container
        .get::<Welcome>()
        .expect("error creating Welcome")
        .print();

    // components can also be retrieved by name, as any of their aliases
    let greeter = container
        .get_named::<dyn Greeter + Send + Sync>("english")
        .expect("error retrieving english greeter");

    // prints "Hello"
    println!("{}", greeter.greet());
}
