//! Storage backend implementations.

pub mod memory;
pub mod s3;
