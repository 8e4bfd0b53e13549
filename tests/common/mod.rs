//! Common test utilities for sbomgraph

#![allow(dead_code)]

pub mod fixtures;

pub use fixtures::*;
