//! Capability-based file helpers for the Waymark tools.
//!
//! Paths are UTF-8 (`camino`) and every access goes through a `cap-std`
//! directory handle opened with ambient authority for the containing
//! directory. GPX inputs are read whole; exports are written whole, creating
//! the parent directory on demand.
#![forbid(unsafe_code)]

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use std::io::{self, Read, Write};

/// Open a UTF-8 file path for reading.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Read a whole UTF-8 text file, such as a GPX track.
pub fn read_utf8_to_string(path: &Utf8Path) -> io::Result<String> {
    let mut contents = String::new();
    open_utf8_file(path)?.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Write `contents` to `path`, replacing any existing file and creating
/// missing parent directories.
pub fn write_utf8(path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_dir_and_file(path)?;
    let mut file = dir.create(name.as_str())?;
    file.write_all(contents)?;
    file.flush()
}

/// Whether `path` exists and is a regular file.
///
/// A missing parent directory or file surfaces as `NotFound`.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.metadata(name.as_str()).map(|meta| meta.is_file())
}

/// Open the directory containing `path` and return it with the file name.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Create the parent directory of `path` if it is missing.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }
    let (base, relative) = base_dir_and_relative(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base.create_dir_all(&relative)
}

/// Split `parent` into an ambient base directory and a path relative to it.
///
/// cap-std refuses absolute paths below a directory handle. The leading
/// prefix and root components become the anchor that is opened; everything
/// after them stays relative. A path without an anchor is opened from `.`.
pub fn base_dir_and_relative(parent: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let mut anchor = Utf8PathBuf::new();
    let mut relative = Utf8PathBuf::new();
    for component in parent.components() {
        match component {
            Utf8Component::Prefix(_) | Utf8Component::RootDir if relative.as_str().is_empty() => {
                anchor.push(component);
            }
            other => relative.push(other),
        }
    }
    if anchor.as_str().is_empty() {
        anchor.push(".");
    }
    let dir = fs_utf8::Dir::open_ambient_dir(&anchor, ambient_authority())?;
    Ok((dir, relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct Workspace {
        _tmp: TempDir,
        root: Utf8PathBuf,
    }

    #[fixture]
    fn workspace() -> Workspace {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 tempdir");
        Workspace { _tmp: tmp, root }
    }

    #[rstest]
    fn write_then_read_creates_parents(workspace: Workspace) {
        let path = workspace.root.join("exports/2024/route.gpx");

        write_utf8(&path, b"<gpx/>").expect("write export");

        assert_eq!(read_utf8_to_string(&path).expect("read back"), "<gpx/>");
        assert!(file_is_file(&path).expect("inspect export"));
    }

    #[rstest]
    fn write_replaces_existing_contents(workspace: Workspace) {
        let path = workspace.root.join("route.gpx");
        write_utf8(&path, b"first version").expect("first write");
        write_utf8(&path, b"second").expect("second write");

        assert_eq!(read_utf8_to_string(&path).expect("read back"), "second");
    }

    #[rstest]
    fn directories_are_not_files(workspace: Workspace) {
        let dir = workspace.root.join("tracks");
        std::fs::create_dir(&dir).expect("create dir");

        assert!(!file_is_file(&dir).expect("inspect dir"));
    }

    #[rstest]
    fn missing_files_report_not_found(workspace: Workspace) {
        let err = read_utf8_to_string(&workspace.root.join("absent.gpx"))
            .expect_err("missing file should fail");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);

        let err = file_is_file(&workspace.root.join("absent/track.gpx"))
            .expect_err("missing parent should fail");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[rstest]
    fn relative_parents_anchor_at_current_dir() {
        let (_dir, relative) =
            base_dir_and_relative(Utf8Path::new("exports/gpx")).expect("current dir opens");
        assert_eq!(relative, Utf8PathBuf::from("exports/gpx"));
    }

    #[rstest]
    fn absolute_parents_keep_everything_below_the_root(workspace: Workspace) {
        let parent = workspace.root.join("exports");
        std::fs::create_dir(&parent).expect("create exports");

        let (dir, relative) = base_dir_and_relative(&parent).expect("root opens");

        assert!(relative.is_relative());
        assert!(parent.as_str().ends_with(relative.as_str()));
        assert!(dir.metadata(&relative).expect("reachable from anchor").is_dir());
    }
}
