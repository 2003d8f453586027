//! Invocation wire protocol.
//!
//! An invocation travels as JSON: the caller sends an [`InvocationSpec`] whose
//! input files reference blobs by hash, and receives an [`InvocationResponse`]
//! whose outputs are again blob references. Raw bytes never travel through
//! this channel; they live in the object store.

use crate::hash::ObjectId;
use serde::{Deserialize, Serialize};

/// Reference to an immutable, content-addressed byte sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Blob {
    pub hash: ObjectId,
}

impl Blob {
    pub fn new(hash: ObjectId) -> Self {
        Self { hash }
    }
}

/// A file is a single blob. Permissions and timestamps are not carried.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct File {
    pub blob: Blob,
}

/// One input file, placed at `path` relative to the job's scratch root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileEntry {
    pub path: String,
    pub file: File,
}

impl FileEntry {
    pub fn new(path: impl Into<String>, blob: Blob) -> Self {
        Self {
            path: path.into(),
            file: File { blob },
        }
    }
}

/// Ordered list of input files.
pub type FileList = Vec<FileEntry>;

/// A request to run a command against declared inputs and collect outputs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvocationSpec {
    /// Extra arguments appended to the base command.
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub files: FileList,
    /// Output paths relative to the scratch root, collected after exit.
    #[serde(default)]
    pub outputs: Vec<String>,
}

/// Result of collecting one declared output.
///
/// Exactly one of `blob` and `err` is set. A missing output is reported
/// through `err`; it never causes the entry to be dropped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutputResult {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob: Option<Blob>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
}

impl OutputResult {
    pub fn captured(path: impl Into<String>, blob: Blob) -> Self {
        Self {
            path: path.into(),
            blob: Some(blob),
            err: None,
        }
    }

    pub fn failed(path: impl Into<String>, err: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            blob: None,
            err: Some(err.into()),
        }
    }

    pub fn is_captured(&self) -> bool {
        self.blob.is_some()
    }
}

/// Everything an invocation produced, referenced by hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvocationResponse {
    pub stdout: Blob,
    pub stderr: Blob,
    #[serde(default)]
    pub outputs: Vec<OutputResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_wire_shape() {
        let id = ObjectId::compute(b"Hello, A\n");
        let json = format!(
            r#"{{"Args":["World"],"Files":[{{"Path":"in/a.txt","File":{{"Blob":{{"hash":"{id}"}}}}}}],"Outputs":["b.txt"]}}"#
        );
        let spec: InvocationSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(spec.args, vec!["World"]);
        assert_eq!(spec.files, vec![FileEntry::new("in/a.txt", Blob::new(id))]);
        assert_eq!(spec.outputs, vec!["b.txt"]);
    }

    #[test]
    fn test_spec_fields_default_when_absent() {
        let spec: InvocationSpec = serde_json::from_str(r#"{"Args":["echo"]}"#).unwrap();
        assert!(spec.files.is_empty());
        assert!(spec.outputs.is_empty());
    }

    #[test]
    fn test_response_omits_absent_output_fields() {
        let id = ObjectId::compute(b"");
        let response = InvocationResponse {
            stdout: Blob::new(id),
            stderr: Blob::new(id),
            outputs: vec![
                OutputResult::captured("b.txt", Blob::new(id)),
                OutputResult::failed("c.txt", "not found"),
            ],
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["Stdout"]["hash"], id.to_hex());
        assert_eq!(value["Outputs"][0]["Blob"]["hash"], id.to_hex());
        assert!(value["Outputs"][0].get("Err").is_none());
        assert!(value["Outputs"][1].get("Blob").is_none());
        assert_eq!(value["Outputs"][1]["Err"], "not found");
    }

    #[test]
    fn test_blob_rejects_malformed_hash() {
        let result: Result<Blob, _> = serde_json::from_str(r#"{"hash":"nope"}"#);
        assert!(result.is_err());
    }
}
