//! Ads platform implementations.

pub mod memory;

pub use memory::{AccountSnapshot, EntityStatus, MemoryPlatform};
