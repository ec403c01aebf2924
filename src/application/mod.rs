mod application;
mod command;
pub mod data;
mod runtime_config;

pub use application::{Application, ApplicationError};
pub use command::{Command, CommandParseError};
pub use runtime_config::RuntimeConfig;
