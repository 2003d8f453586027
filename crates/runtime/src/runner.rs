//! Running a job and assembling its response.

use crate::error::{RuntimeError, RuntimeResult};
use crate::job::{Job, materialize};
use spindle_core::{InvocationResponse, InvocationSpec, OutputResult};
use spindle_storage::ContentStore;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Options for [`run_with`].
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    /// Parent directory for scratch directories. Defaults to the OS temp dir.
    pub scratch_dir: Option<PathBuf>,
}

/// Outcome of a completed invocation.
#[derive(Clone, Debug)]
pub struct Invocation {
    pub response: InvocationResponse,
    /// Exit code of the program, `None` if it was killed by a signal.
    pub exit_code: Option<i32>,
}

/// Decode an invocation spec from its JSON wire form.
pub fn parse_spec(raw: &str) -> RuntimeResult<InvocationSpec> {
    serde_json::from_str(raw).map_err(RuntimeError::InvalidRequest)
}

/// Materialize `spec`, run it, and collect its outputs.
///
/// See [`run_with`].
pub async fn run(
    store: &ContentStore,
    base_cmd: &[String],
    spec: &InvocationSpec,
) -> RuntimeResult<Invocation> {
    run_with(store, base_cmd, spec, &RunOptions::default()).await
}

/// Materialize `spec`, run `base_cmd` followed by `spec.args` in the scratch
/// directory, and store stdout, stderr and every declared output.
///
/// Errors mean the invocation itself could not be carried out. A non-zero
/// exit status or a missing output is not an error; it shows up in the
/// returned response. The scratch directory is removed on every path.
///
/// Dropping the returned future before the process starts abandons the
/// invocation. Once the process has started it is left to run to completion.
#[instrument(skip_all, fields(args = spec.args.len()))]
pub async fn run_with(
    store: &ContentStore,
    base_cmd: &[String],
    spec: &InvocationSpec,
    options: &RunOptions,
) -> RuntimeResult<Invocation> {
    let mut job = materialize(store, base_cmd, spec, options.scratch_dir.as_deref()).await?;

    let result = execute(store, &job).await;

    if let Err(e) = job.cleanup() {
        warn!(root = %job.root().display(), error = %e, "failed to remove scratch directory");
    }
    result
}

/// Read a pipe to the end on its own task.
fn drain<R>(pipe: Option<R>) -> JoinHandle<std::io::Result<Vec<u8>>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf).await?;
        }
        Ok(buf)
    })
}

async fn join_drain(handle: JoinHandle<std::io::Result<Vec<u8>>>) -> RuntimeResult<Vec<u8>> {
    handle
        .await
        .map_err(|e| RuntimeError::Wait(std::io::Error::other(e)))?
        .map_err(RuntimeError::Wait)
}

async fn execute(store: &ContentStore, job: &Job) -> RuntimeResult<Invocation> {
    let (program, args) = job.args.split_first().ok_or(RuntimeError::EmptyCommand)?;

    info!(program = %program, args = ?args, root = %job.root().display(), "starting process");

    let mut child = Command::new(program)
        .args(args)
        .current_dir(job.root())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| RuntimeError::Spawn {
            program: program.clone(),
            source,
        })?;

    // Both pipes are drained while the child runs so neither can fill up and
    // block it.
    let stdout_task = drain(child.stdout.take());
    let stderr_task = drain(child.stderr.take());

    let status = child.wait().await.map_err(RuntimeError::Wait)?;
    let (stdout, stderr) = tokio::join!(join_drain(stdout_task), join_drain(stderr_task));
    let (stdout, stderr) = (stdout?, stderr?);

    info!(
        exit_code = ?status.code(),
        stdout_bytes = stdout.len(),
        stderr_bytes = stderr.len(),
        "process exited"
    );

    let stdout = store.put_blob(stdout).await?;
    let stderr = store.put_blob(stderr).await?;

    let mut outputs = Vec::with_capacity(job.outputs.len());
    for path in &job.outputs {
        outputs.push(collect_output(store, job, path).await?);
    }

    Ok(Invocation {
        response: InvocationResponse {
            stdout,
            stderr,
            outputs,
        },
        exit_code: status.code(),
    })
}

/// Store one declared output. A file that cannot be read is recorded on the
/// result; only a failure to store it is an error.
async fn collect_output(store: &ContentStore, job: &Job, path: &str) -> RuntimeResult<OutputResult> {
    let read = match job.path(path) {
        Ok(full) => tokio::fs::read(&full).await.map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };

    match read {
        Ok(data) => {
            let blob = store.put_blob(data).await?;
            debug!(path = %path, object_id = %blob.hash, "captured output");
            Ok(OutputResult::captured(path, blob))
        }
        Err(err) => {
            debug!(path = %path, error = %err, "output not captured");
            Ok(OutputResult::failed(path, format!("reading {path}: {err}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use spindle_core::FileEntry;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_spec() {
        let spec = parse_spec(r#"{"Args": ["echo", "hello"]}"#).unwrap();
        assert_eq!(spec.args, strings(&["echo", "hello"]));
        assert!(spec.files.is_empty());

        let err = parse_spec(r#"{"Args": "echo"}"#).unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidRequest(_)), "{err:?}");
        assert_eq!(err.kind(), FailureKind::InvalidRequest);
        assert!(parse_spec("not json").is_err());
    }

    #[tokio::test]
    async fn test_empty_command_is_rejected() {
        let store = ContentStore::in_memory();
        let err = run(&store, &[], &InvocationSpec::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RuntimeError::EmptyCommand), "{err:?}");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_not_an_error() {
        let store = ContentStore::in_memory();
        let base = strings(&["/bin/sh", "-c", "echo failing >&2; exit 3"]);
        let invocation = run(&store, &base, &InvocationSpec::default())
            .await
            .unwrap();

        assert_eq!(invocation.exit_code, Some(3));
        let stderr = store.read_blob(&invocation.response.stderr).await.unwrap();
        assert_eq!(&stderr[..], b"failing\n");
        let stdout = store.read_blob(&invocation.response.stdout).await.unwrap();
        assert!(stdout.is_empty());
    }

    #[tokio::test]
    async fn test_outputs_keep_declared_order() {
        let store = ContentStore::in_memory();
        let input = store.put_blob("x").await.unwrap();
        let spec = InvocationSpec {
            args: vec!["echo two > out/2; echo one > out/1".to_string()],
            files: vec![FileEntry::new("seed", input)],
            outputs: strings(&["out/1", "missing", "out/2"]),
        };
        let invocation = run(&store, &strings(&["/bin/sh", "-c"]), &spec)
            .await
            .unwrap();

        let outputs = &invocation.response.outputs;
        let paths: Vec<&str> = outputs.iter().map(|o| o.path.as_str()).collect();
        assert_eq!(paths, vec!["out/1", "missing", "out/2"]);
        assert!(outputs[0].is_captured());
        assert!(!outputs[1].is_captured());
        assert!(outputs[1].err.as_deref().unwrap().contains("missing"));
        assert!(outputs[2].is_captured());
    }
}
