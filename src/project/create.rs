use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::error::{Result, SkellyError};
use crate::template::FILES_DIR;

#[derive(Debug)]
pub struct CreatedProject {
    pub output_dir: PathBuf,
    /// Copied files, relative to `output_dir`.
    pub files: Vec<PathBuf>,
}

/// Fail unless `dest` is missing or an empty directory.
pub fn ensure_destination_empty(dest: &Path) -> Result<()> {
    if !dest.exists() {
        return Ok(());
    }
    let has_contents = !dest.is_dir()
        || std::fs::read_dir(dest)
            .map_err(|e| SkellyError::Io {
                context: format!("reading directory {}", dest.display()),
                source: e,
            })?
            .next()
            .is_some();
    if has_contents {
        return Err(SkellyError::DestinationNotEmpty {
            path: dest.to_path_buf(),
        });
    }
    Ok(())
}

/// Copy the template's `files/` payload into `dest`, creating it.
///
/// Symlinks inside the payload are skipped.
pub fn create_project(template_dir: &Path, dest: &Path) -> Result<CreatedProject> {
    let payload = template_dir.join(FILES_DIR);
    std::fs::create_dir_all(dest).map_err(|e| SkellyError::Io {
        context: format!("creating project directory {}", dest.display()),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry in WalkDir::new(&payload).min_depth(1) {
        let entry = entry.map_err(|e| SkellyError::Io {
            context: format!("walking {}", payload.display()),
            source: e.into(),
        })?;
        let rel = entry
            .path()
            .strip_prefix(&payload)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| PathBuf::from(entry.file_name()));
        let target = dest.join(&rel);

        let file_type = entry.file_type();
        if file_type.is_symlink() {
            debug!("Skipping symlink {}", entry.path().display());
            continue;
        }
        if file_type.is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| SkellyError::Io {
                context: format!("creating directory {}", target.display()),
                source: e,
            })?;
            continue;
        }

        std::fs::copy(entry.path(), &target).map_err(|e| SkellyError::Io {
            context: format!("copying {} to {}", entry.path().display(), target.display()),
            source: e,
        })?;
        files.push(rel);
    }

    Ok(CreatedProject {
        output_dir: dest.to_path_buf(),
        files,
    })
}

/// Undo a failed materialization so the same command can be retried.
///
/// `dest` is removed when `remove_root` is set (this run created it),
/// otherwise only its contents are.
pub fn discard_project(dest: &Path, remove_root: bool) -> Result<()> {
    if !dest.exists() {
        return Ok(());
    }
    if remove_root {
        return std::fs::remove_dir_all(dest).map_err(|e| SkellyError::Io {
            context: format!("removing {}", dest.display()),
            source: e,
        });
    }

    let read_dir = std::fs::read_dir(dest).map_err(|e| SkellyError::Io {
        context: format!("reading directory {}", dest.display()),
        source: e,
    })?;
    for entry in read_dir {
        let entry = entry.map_err(|e| SkellyError::Io {
            context: "reading directory entry".into(),
            source: e,
        })?;
        let path = entry.path();
        let removed = match entry.file_type() {
            Ok(t) if t.is_dir() => std::fs::remove_dir_all(&path),
            _ => std::fs::remove_file(&path),
        };
        removed.map_err(|e| SkellyError::Io {
            context: format!("removing {}", path.display()),
            source: e,
        })?;
    }
    Ok(())
}
