//! Core types used throughout the library.

pub mod config;
pub mod message;

pub use config::*;
pub use message::*;
