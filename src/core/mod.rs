//! Ambient plumbing shared by every subsystem: configuration and errors.

pub mod config;
pub mod errors;
