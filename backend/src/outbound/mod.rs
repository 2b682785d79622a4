//! Outbound adapters implementing domain ports.

pub mod memory;
pub mod notifications;
pub mod persistence;
