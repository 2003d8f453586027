use spindle_core::{Blob, FileEntry};
use spindle_storage::ContentStore;
use std::path::Path;

pub fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

/// Store each `(path, contents)` pair and return the matching file entries.
pub async fn seed_files(store: &ContentStore, files: &[(&str, &str)]) -> Vec<FileEntry> {
    let mut entries = Vec::with_capacity(files.len());
    for (path, contents) in files {
        let blob = store.put_blob(contents.to_string()).await.unwrap();
        entries.push(FileEntry::new(*path, blob));
    }
    entries
}

#[allow(dead_code)]
pub async fn read_string(store: &ContentStore, blob: &Blob) -> String {
    let data = store.read_blob(blob).await.unwrap();
    String::from_utf8(data.to_vec()).unwrap()
}

#[allow(dead_code)]
pub fn is_empty_dir(path: &Path) -> bool {
    std::fs::read_dir(path).unwrap().next().is_none()
}
