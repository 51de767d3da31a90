pub mod model;
pub mod validation;

pub use model::{TargetApi, TestConfiguration, TestType};
pub use validation::validate_configuration;
