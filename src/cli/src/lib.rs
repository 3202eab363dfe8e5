//! boxpub CLI - publish boxes to a box registry.

pub mod commands;
pub mod output;
