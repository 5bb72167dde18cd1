pub mod config;
pub mod constants;
pub mod events;
pub mod keyring;
