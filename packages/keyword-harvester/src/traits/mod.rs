//! Trait seams for the harvester's external collaborators.
//!
//! Applications implement these to plug in an ads platform, a text oracle
//! and a report destination.

pub mod oracle;
pub mod platform;
pub mod report;
