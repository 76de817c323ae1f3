//! GRBL protocol implementation
//!
//! - [`status_parser`]: `<State|WPos:x,y,z|...>` frame parsing
//! - [`command_creator`]: motion, zero and unlock command text
//! - [`controller`]: motion and control operations over the link
//! - [`utils`]: line classification helpers

pub mod command_creator;
pub mod controller;
pub mod status_parser;
pub mod utils;
