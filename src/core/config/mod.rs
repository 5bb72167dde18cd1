pub mod data;
pub mod defaults;
pub mod io;

pub use data::{Config, SecretsBackend};
pub use io::ConfigError;

#[cfg(test)]
pub mod tests;
