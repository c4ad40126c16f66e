//! Command handlers for the hifilm CLI
//!
//! Each subcommand has its own module with handler functions.

pub mod batch;
pub mod configure;
pub mod correlate;
pub mod decode;
pub mod inspect;
pub mod stats;
