//! services/client/src/lib.rs
//!
//! The command-line study client: adapters for the server and the text
//! generators, plus configuration and rendering.

pub mod adapters;
pub mod config;
pub mod error;
pub mod render;
