//! Core error types shared by the commands.

mod errors;

pub use errors::*;
