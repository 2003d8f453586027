//! Invocation runtime for Spindle.
//!
//! Receives an [`InvocationSpec`](spindle_core::InvocationSpec) whose inputs
//! are blob references, lays the inputs out in a private scratch directory,
//! runs the command there, and returns stdout, stderr and the declared
//! outputs as new blobs.

pub mod cmdline;
pub mod error;
pub mod job;
pub mod runner;

pub use cmdline::resolve_command;
pub use error::{FailureKind, RuntimeError, RuntimeResult};
pub use job::{Job, materialize};
pub use runner::{Invocation, RunOptions, parse_spec, run, run_with};
