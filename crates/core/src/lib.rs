//! Core domain types shared by the Spindle crates.
//!
//! This crate defines the canonical data model used across all other crates:
//! - Content-derived object ids (BLAKE2b-256)
//! - The invocation wire protocol
//! - Store and runtime configuration

pub mod config;
pub mod error;
pub mod hash;
pub mod protocol;

pub use config::{RuntimeConfig, StoreAddress, StoreConfig};
pub use error::{Error, Result};
pub use hash::{ObjectHasher, ObjectId};
pub use protocol::{Blob, File, FileEntry, FileList, InvocationResponse, InvocationSpec, OutputResult};
