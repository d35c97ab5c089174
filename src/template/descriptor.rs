use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, SkellyError};

/// Package descriptor expected at the root of every template.
pub const DESCRIPTOR_FILE: &str = "package.json";

/// The fields of `package.json` that matter for template selection.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Descriptor {
    #[serde(default)]
    pub description: Option<String>,
}

pub fn descriptor_path(template_dir: &Path) -> PathBuf {
    template_dir.join(DESCRIPTOR_FILE)
}

pub fn read_descriptor(template_dir: &Path) -> Result<Descriptor> {
    let path = descriptor_path(template_dir);
    let content = std::fs::read_to_string(&path).map_err(|e| SkellyError::Io {
        context: format!("reading {}", path.display()),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| SkellyError::DescriptorParse { path, source: e })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_description_and_ignores_unknown_fields() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DESCRIPTOR_FILE),
            r#"{"name": "alpha", "description": "Alpha template", "scripts": {"test": "jest"}}"#,
        )
        .unwrap();

        let descriptor = read_descriptor(dir.path()).unwrap();
        assert_eq!(descriptor.description.as_deref(), Some("Alpha template"));
    }

    #[test]
    fn description_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DESCRIPTOR_FILE), r#"{"name": "alpha"}"#).unwrap();
        assert!(read_descriptor(dir.path()).unwrap().description.is_none());
    }

    #[test]
    fn missing_descriptor_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_descriptor(dir.path()).unwrap_err();
        assert!(matches!(err, SkellyError::Io { .. }));
    }

    #[test]
    fn malformed_descriptor_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DESCRIPTOR_FILE), "{").unwrap();
        let err = read_descriptor(dir.path()).unwrap_err();
        assert!(matches!(err, SkellyError::DescriptorParse { .. }));
    }
}
