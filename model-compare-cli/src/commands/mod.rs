//! CLI commands

pub mod compare;
