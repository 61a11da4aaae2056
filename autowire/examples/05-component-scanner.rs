use autowire::component::{Component, ComponentDescriptor, Inject};
use autowire::config::ContainerConfig;
use autowire::container::Container;
use autowire::declare_component;
use autowire::instance_provider::ComponentInstancePtr;

#[derive(Default)]
struct Clock;

impl Clock {
    fn now(&self) -> &'static str {
        "noon"
    }
}

impl Component for Clock {
    fn describe() -> ComponentDescriptor {
        ComponentDescriptor::builder::<Self>()
            .default_constructor()
            .build()
    }
}

struct Scheduler {
    clock: ComponentInstancePtr<Clock>,
}

impl Component for Scheduler {
    fn describe() -> ComponentDescriptor {
        ComponentDescriptor::builder::<Self>()
            .argument::<Clock>(Inject::by_type())
            .constructor(|arguments| {
                Ok(Scheduler {
                    clock: arguments.instance()?,
                })
            })
            .build()
    }
}

// declared components don't need to be registered when the scanner is enabled
declare_component!(Clock);
declare_component!(Scheduler);

fn main() {
    // the config can also be read with ContainerConfig::init_from_environment(), e.g. with
    // AUTOWIRE_ENABLE_COMPONENT_SCANNER=true
    let container = Container::from_config(&ContainerConfig::new(true, true));

    let scheduler = container
        .get::<Scheduler>()
        .expect("error creating Scheduler");

    // prints "It's noon"
    println!("It's {}", scheduler.clock.now());
}
