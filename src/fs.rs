//! Filesystem contract (AMBIENT STACK, SPEC_FULL.md §"Filesystem contract"):
//! a small trait the parser and resolver are generic over, so tests can
//! substitute an in-memory fake without touching disk. `RealFs` is the
//! production implementation, backed by `std::fs` and the `glob` crate for
//! the `SRC += *.c` wildcard case (spec §4.5).

use std::path::{Path, PathBuf};

use crate::error::{LmError, LmResult};

pub trait Fs {
    fn read_to_string(&self, path: &Path) -> LmResult<String>;

    /// Returns the `.c` files directly inside `dir`, in directory-listing
    /// order, for wildcard `SRC` tokens (`*.c`, `dir/*.c`).
    fn glob_c_files(&self, dir: &Path) -> LmResult<Vec<String>>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl Fs for RealFs {
    fn read_to_string(&self, path: &Path) -> LmResult<String> {
        std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LmError::MissingFile {
                    path: path.to_path_buf(),
                }
            } else {
                LmError::Io(e)
            }
        })
    }

    fn glob_c_files(&self, dir: &Path) -> LmResult<Vec<String>> {
        let pattern = format!("{}/*.c", dir.display());
        let mut names = Vec::new();
        for entry in glob::glob(&pattern).map_err(|e| LmError::Syntax {
            path: dir.to_path_buf(),
            line: 0,
            message: format!("bad glob pattern: {e}"),
        })? {
            match entry {
                Ok(path) => {
                    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                        names.push(name.to_string());
                    }
                }
                Err(e) => {
                    log::warn!("glob entry error under {}: {e}", dir.display());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

/// `--rm PATH`: delete a regular file outright, or a directory's immediate
/// children and then the directory itself (non-recursive, one level). A
/// missing path is treated as already satisfied, not an error — grounded on
/// `original_source/source/lm_cmd.c`'s `lm_rm`.
pub fn rm(path: &Path) -> LmResult<()> {
    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(LmError::Io(e)),
    };

    if meta.is_file() {
        return std::fs::remove_file(path).map_err(LmError::Io);
    }

    for entry in std::fs::read_dir(path).map_err(LmError::Io)? {
        let entry = entry.map_err(LmError::Io)?;
        let child = entry.path();
        if child.is_file() {
            let _ = std::fs::remove_file(&child);
        }
    }
    std::fs::remove_dir(path).map_err(LmError::Io)
}

/// `--cp SRC DST`: a whole-file byte copy, grounded on
/// `original_source/source/lm_cmd.c`'s `lm_copy_file` (which streams through
/// a manual buffer; `std::fs::copy` is the idiomatic equivalent).
pub fn cp(src: &Path, dst: &Path) -> LmResult<()> {
    std::fs::copy(src, dst).map(|_| ()).map_err(LmError::Io)
}

pub fn join(base: &Path, child: &str) -> PathBuf {
    if base == Path::new(".") {
        PathBuf::from(child)
    } else {
        base.join(child)
    }
}
