//! Job materialization.
//!
//! A [`Job`] is an [`InvocationSpec`] laid out on local disk: a fresh scratch
//! directory holding every input file, with parent directories for every
//! declared output already created.

use crate::error::{RuntimeError, RuntimeResult};
use spindle_core::InvocationSpec;
use spindle_storage::ContentStore;
use std::path::{Component, Path, PathBuf};
use tempfile::TempDir;
use tokio::fs;
use tracing::{debug, instrument};

const SCRATCH_PREFIX: &str = "spindle-";

/// A materialized invocation.
///
/// The job owns its scratch directory exclusively. [`Job::cleanup`] removes it;
/// dropping the job removes it as well if cleanup was never called.
#[derive(Debug)]
pub struct Job {
    /// Full command line: base command followed by the invocation's arguments.
    pub args: Vec<String>,
    /// Declared output paths, relative to the root.
    pub outputs: Vec<String>,
    root: PathBuf,
    dir: Option<TempDir>,
}

impl Job {
    /// Scratch directory the job runs in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a job-relative path inside the scratch root.
    pub fn path(&self, relative: &str) -> RuntimeResult<PathBuf> {
        scratch_path(&self.root, relative)
    }

    /// Remove the scratch directory. Calling this more than once is a no-op.
    pub fn cleanup(&mut self) -> std::io::Result<()> {
        match self.dir.take() {
            Some(dir) => dir.close(),
            None => Ok(()),
        }
    }
}

/// Join `relative` onto `root`, rejecting anything that could land outside it.
/// `.` components are dropped.
pub fn scratch_path(root: &Path, relative: &str) -> RuntimeResult<PathBuf> {
    let invalid = |reason: &'static str| RuntimeError::InvalidPath {
        path: relative.to_string(),
        reason,
    };

    let mut clean = PathBuf::new();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir => return Err(invalid("path escapes the scratch directory")),
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("path must be relative"));
            }
        }
    }

    if clean.as_os_str().is_empty() {
        return Err(invalid("path is empty"));
    }
    Ok(root.join(clean))
}

async fn ensure_parent(path: &Path, relative: &str) -> RuntimeResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| RuntimeError::Materialize {
                path: relative.to_string(),
                source,
            })?;
    }
    Ok(())
}

/// Lay out `spec` in a fresh scratch directory under `scratch_parent`
/// (the OS temp directory when `None`).
///
/// All-or-nothing: on any failure the partially populated directory is
/// removed before the error is returned.
#[instrument(skip_all, fields(files = spec.files.len(), outputs = spec.outputs.len()))]
pub async fn materialize(
    store: &ContentStore,
    base_cmd: &[String],
    spec: &InvocationSpec,
    scratch_parent: Option<&Path>,
) -> RuntimeResult<Job> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(SCRATCH_PREFIX);
    let dir = match scratch_parent {
        Some(parent) => builder.tempdir_in(parent),
        None => builder.tempdir(),
    }
    .map_err(RuntimeError::ScratchDir)?;

    let job = Job {
        args: base_cmd.iter().chain(spec.args.iter()).cloned().collect(),
        outputs: spec.outputs.clone(),
        root: dir.path().to_path_buf(),
        dir: Some(dir),
    };
    debug!(root = %job.root.display(), "created scratch directory");

    for entry in &spec.files {
        let dest = job.path(&entry.path)?;
        ensure_parent(&dest, &entry.path).await?;

        let data = store
            .read_blob(&entry.file.blob)
            .await
            .map_err(|source| RuntimeError::Fetch {
                path: entry.path.clone(),
                source,
            })?;

        fs::write(&dest, &data)
            .await
            .map_err(|source| RuntimeError::Materialize {
                path: entry.path.clone(),
                source,
            })?;
        debug!(path = %entry.path, bytes = data.len(), "wrote input");
    }

    for output in &spec.outputs {
        let dest = job.path(output)?;
        ensure_parent(&dest, output).await?;
    }

    Ok(job)
}
