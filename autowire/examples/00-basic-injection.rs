use autowire::component::{Component, ComponentDescriptor, Inject};
use autowire::container::Container;
use autowire::instance_provider::ComponentInstancePtr;

// this is a trait we would like to use in our component
trait TestTrait {
    fn foo(&self);
}

// this is a dependency which implements the above trait and also is an injectable component
#[derive(Default)]
struct TestDependency;

impl TestTrait for TestDependency {
    fn foo(&self) {
        println!("Hello world!");
    }
}

impl Component for TestDependency {
    fn describe() -> ComponentDescriptor {
        ComponentDescriptor::builder::<Self>()
            // registered under the "TestTrait" name, so it's found when asked for dyn TestTrait
            .name("TestTrait")
            .default_constructor()
            // we're telling the container how to provide TestDependency as dyn TestTrait
            .alias::<dyn TestTrait + Send + Sync>(|dependency| {
                dependency as ComponentInstancePtr<dyn TestTrait + Send + Sync>
            })
            .build()
    }
}

// this is another component, but with a dependency
struct TestComponent {
    // the container will know how to inject dyn TestTrait, when asked for TestComponent
    dependency: ComponentInstancePtr<dyn TestTrait + Send + Sync>,
}

impl TestComponent {
    fn call_foo(&self) {
        self.dependency.foo();
    }
}

impl Component for TestComponent {
    fn describe() -> ComponentDescriptor {
        ComponentDescriptor::builder::<Self>()
            // dependencies without an explicit name are looked up by the short type name
            .argument::<dyn TestTrait + Send + Sync>(Inject::by_type())
            .constructor(|arguments| {
                Ok(TestComponent {
                    dependency: arguments.instance()?,
                })
            })
            .build()
    }
}

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    let container = Container::new();
    container.register::<TestDependency>();
    container.register::<TestComponent>();

    let component = container
        .get::<TestComponent>()
        .expect("error creating TestComponent");

    // prints "Hello world!"
    component.call_foo();
}
