use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::{Result, SkellyError};
use crate::template::descriptor::{descriptor_path, read_descriptor};
use crate::template::select::{TemplateCandidate, TemplateSelector, NO_DESCRIPTION};

/// Payload directory copied into new projects.
pub const FILES_DIR: &str = "files";

/// How the synced repository root is interpreted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryMode {
    /// The root may itself be a template; otherwise it is a collection.
    #[default]
    Auto,
    /// The root is always treated as a collection of templates.
    Collection,
}

/// True if `path` has a `files/` directory and a readable descriptor.
pub fn is_template(path: &Path) -> bool {
    let descriptor = descriptor_path(path);
    path.join(FILES_DIR).is_dir() && descriptor.is_file() && std::fs::File::open(descriptor).is_ok()
}

/// Find the template to scaffold from inside a synced repository.
///
/// A repository that is itself a template is returned as-is without
/// consulting `selector`. Otherwise its immediate subdirectories that are
/// templates become candidates, sorted by name, and `selector` picks one.
pub fn discover(
    repo_path: &Path,
    mode: DiscoveryMode,
    selector: &dyn TemplateSelector,
) -> Result<PathBuf> {
    if mode == DiscoveryMode::Auto && is_template(repo_path) {
        debug!("{} is a single template", repo_path.display());
        return Ok(repo_path.to_path_buf());
    }

    let candidates = list_candidates(repo_path)?;
    if candidates.is_empty() {
        return Err(SkellyError::NoTemplatesFound {
            path: repo_path.to_path_buf(),
        });
    }

    let index = selector.choose(&candidates)?;
    candidates
        .into_iter()
        .nth(index)
        .map(|c| c.path)
        .ok_or_else(|| SkellyError::NoTemplatesFound {
            path: repo_path.to_path_buf(),
        })
}

/// Templates among the immediate subdirectories of a collection, sorted by name.
pub fn list_candidates(collection: &Path) -> Result<Vec<TemplateCandidate>> {
    let read_dir = std::fs::read_dir(collection).map_err(|e| SkellyError::Io {
        context: format!("reading directory {}", collection.display()),
        source: e,
    })?;

    let mut candidates = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| SkellyError::Io {
            context: "reading directory entry".into(),
            source: e,
        })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();

        if name.starts_with('.') || !path.is_dir() || !is_template(&path) {
            continue;
        }

        let description = match read_descriptor(&path) {
            Ok(descriptor) => descriptor
                .description
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            Err(e) => {
                warn!("Ignoring unreadable descriptor for template {name}: {e}");
                NO_DESCRIPTION.to_string()
            }
        };

        candidates.push(TemplateCandidate {
            name,
            description,
            path,
        });
    }

    candidates.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(candidates)
}
