use autowire::component::{Component, ComponentDescriptor, Inject};
use autowire::container::Container;
use autowire::instance_provider::ComponentInstancePtr;
use autowire::lazy::Lazy;

// Parent and Child depend on each other - such cycle can be broken by making one of the
// dependencies lazy
struct Parent {
    child: ComponentInstancePtr<Child>,
}

impl Parent {
    fn title(&self) -> &str {
        "parent"
    }
}

impl Component for Parent {
    fn describe() -> ComponentDescriptor {
        ComponentDescriptor::builder::<Self>()
            .argument::<Child>(Inject::by_type())
            .constructor(|arguments| {
                Ok(Parent {
                    child: arguments.instance()?,
                })
            })
            .build()
    }
}

struct Child {
    // resolved on first use
    parent: Lazy<Parent>,
}

impl Component for Child {
    fn describe() -> ComponentDescriptor {
        ComponentDescriptor::builder::<Self>()
            .argument::<Parent>(Inject::by_type().lazy())
            .constructor(|arguments| {
                Ok(Child {
                    parent: arguments.lazy()?,
                })
            })
            .build()
    }
}

fn main() {
    let container = Container::new();
    container.register::<Parent>();
    container.register::<Child>();

    let parent = container.get::<Parent>().expect("error creating Parent");

    // nothing was resolved yet
    println!("Resolved: {}", parent.child.parent.is_resolved());

    // lazy references can be used directly, or with explicit error handling via try_get()
    println!("Child of: {}", parent.child.parent.title());
    println!("Resolved: {}", parent.child.parent.is_resolved());
}
