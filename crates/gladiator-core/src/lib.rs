pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod plan;
pub mod registry;
pub mod results;
pub mod service;

pub use config::AppConfig;
pub use error::GladiatorError;
pub use service::TestService;
