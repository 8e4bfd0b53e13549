//! Ecosystem-facing plumbing: tree extractors and ignore scanners

pub mod extractors;
pub mod ignores;
