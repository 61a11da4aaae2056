use crate::instance_provider::ErrorPtr;
use thiserror::Error;

/// Errors related to resolving and creating components. All of them are fatal only to the
/// resolution chain which produced them.
#[derive(Error, Clone, Debug)]
pub enum ComponentInstanceProviderError {
    #[error("Component '{0}' not found")]
    ComponentNotFound(String),
    #[error("Named component '{0}' not found")]
    NamedComponentNotFound(String),
    #[error("Cyclic dependency detected while creating component '{0}'")]
    CyclicDependency(String),
    #[error("Tried to use component '{name}' as incompatible type: {type_name}")]
    IncompatibleComponent {
        name: String,
        type_name: &'static str,
    },
    #[error("Component '{0}' does not declare a constructor")]
    MissingConstructor(String),
    #[error("Component '{owner}' does not declare factory method '{method}'")]
    MissingFactoryMethod { owner: String, method: String },
    #[error("Constructor argument #{index} of component '{component}' is missing or of a different kind")]
    ArgumentMismatch { component: String, index: usize },
    #[error("Error in component constructor: {0}")]
    ConstructorError(ErrorPtr),
    #[error("Lifecycle hook of component '{name}' failed: {error}")]
    LifecycleError { name: String, error: ErrorPtr },
    #[error("Container has been closed")]
    ContainerClosed,
}
