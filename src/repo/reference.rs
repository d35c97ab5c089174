use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use regex_lite::Regex;

use crate::error::{Result, SkellyError};

/// How a matched reference is turned into a canonical URL.
#[derive(Debug, Clone, Copy)]
enum Rewrite {
    GitHubShorthand,
    Verbatim,
    LocalPath,
}

/// Recognized reference formats, tried in order. The first match wins.
const PATTERNS: &[(&str, Rewrite)] = &[
    (r"^[A-Za-z0-9_-][A-Za-z0-9_.-]*/[A-Za-z0-9_.-]+$", Rewrite::GitHubShorthand),
    (r"^https?://.+$", Rewrite::Verbatim),
    (r"^git@.+$", Rewrite::Verbatim),
    (r"^ssh://git@.+$", Rewrite::Verbatim),
    (r"^\.\.?/.+$", Rewrite::LocalPath),
];

fn compiled() -> &'static [(Regex, Rewrite)] {
    static COMPILED: OnceLock<Vec<(Regex, Rewrite)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        PATTERNS
            .iter()
            .filter_map(|&(pattern, rewrite)| Regex::new(pattern).ok().map(|re| (re, rewrite)))
            .collect()
    })
}

/// Resolve a free-form repository reference to a canonical, fetchable URL.
///
/// Relative paths are made absolute against `base_dir` lexically; nothing
/// on disk is consulted. Returns `None` when the reference matches none of
/// the known formats.
pub fn resolve_reference(reference: &str, base_dir: &Path) -> Option<String> {
    let (_, rewrite) = compiled().iter().find(|(re, _)| re.is_match(reference))?;

    let url = match rewrite {
        Rewrite::GitHubShorthand => format!("https://github.com/{reference}"),
        Rewrite::Verbatim => reference.to_string(),
        Rewrite::LocalPath => {
            let absolute = normalize_lexically(&base_dir.join(reference));
            format!("file://{}", absolute.display())
        }
    };
    Some(url)
}

/// Like [`resolve_reference`], but an unresolvable reference is an error
/// carrying the list of accepted formats.
pub fn parse_reference(reference: &str, base_dir: &Path) -> Result<String> {
    resolve_reference(reference, base_dir).ok_or_else(|| SkellyError::InvalidReference {
        input: reference.to_string(),
    })
}

/// Collapse `.` and `..` components without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
