//! Setting handlers for different setting patterns.

pub mod boolean;
pub mod config;
pub mod string;

pub use boolean::*;
pub use config::*;
pub use string::*;
