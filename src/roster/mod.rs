//! Roster input.

pub mod reader;

pub use reader::*;
