//! Chatkeep backs up, restores, and resets the local data of an AI coding
//! assistant: chat history, the settings snapshot, and provider API keys.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`archive`] decodes single-chat and multi-chat documents into
//!   [`archive::ChatRecord`]s, encodes exports, and replays or bulk-deletes
//!   records against a chat store.
//! - [`settings`] exports and imports the settings snapshot and handles API
//!   key templates and imports.
//! - [`store`] defines the key/value and chat store traits with file,
//!   directory, and in-memory implementations.
//! - [`actions`] wraps every operation in user-facing notices, event-log
//!   entries, and change events.
//! - [`core`] holds configuration, constants, the keyring store, and the
//!   change-event bus.
//!
//! The binary (`src/main.rs`) routes through [`crate::cli::main`].

pub mod actions;
pub mod archive;
pub mod cli;
pub mod core;
pub mod settings;
pub mod store;
pub mod utils;
