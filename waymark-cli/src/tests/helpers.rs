//! Test helpers for laying out GPX inputs in a temporary workspace.

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// Temporary directory addressed with UTF-8 paths.
pub(super) struct Workspace {
    _tmp: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
        Self { _tmp: tmp, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    waymark_fs::write_utf8(path, contents).expect("write test file");
}

/// Parse captured stdout as JSON.
pub(super) fn stdout_json(buffer: &[u8]) -> serde_json::Value {
    let text = std::str::from_utf8(buffer).expect("stdout utf-8");
    serde_json::from_str(text).expect("stdout should be JSON")
}
