use std::path::{Path, PathBuf};

use console::style;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use tera::{Context, Tera};
use walkdir::WalkDir;

use crate::error::{Result, SkellyError};
use crate::project::questions::{Answers, Question};

/// Optional per-template configuration at the template root.
pub const REWRITE_CONFIG_FILE: &str = "skelly.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RewriteConfig {
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub files: Vec<RewriteRule>,
}

/// Files matching `pattern` (relative to the new project) are rendered.
#[derive(Debug, Clone, Deserialize)]
pub struct RewriteRule {
    pub pattern: String,
}

pub fn load_rewrite_config(template_dir: &Path) -> Result<Option<RewriteConfig>> {
    let path = template_dir.join(REWRITE_CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path).map_err(|e| SkellyError::Io {
        context: format!("reading {}", path.display()),
        source: e,
    })?;
    let config = toml::from_str(&content)
        .map_err(|e| SkellyError::RewriteConfigParse { path, source: e })?;
    Ok(Some(config))
}

/// A payload file rendered through Tera, not yet written anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    /// Relative to the payload, and so to the new project.
    pub path: PathBuf,
    pub content: String,
}

/// Render every text file in `payload_dir` matching a rule.
///
/// Nothing is written; a template error surfaces before the destination is
/// touched.
pub fn render_rewrite(
    config: &RewriteConfig,
    payload_dir: &Path,
    answers: &Answers,
) -> Result<Vec<RenderedFile>> {
    if config.files.is_empty() {
        return Ok(Vec::new());
    }

    let patterns: Vec<&str> = config.files.iter().map(|r| r.pattern.as_str()).collect();
    let matcher = build_glob_set(&patterns)?;
    let context = build_context(answers);

    let mut rendered = Vec::new();
    for entry in WalkDir::new(payload_dir)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let Ok(rel) = path.strip_prefix(payload_dir) else {
            continue;
        };
        if !matcher.is_match(rel) {
            continue;
        }

        let bytes = std::fs::read(path).map_err(|e| SkellyError::Io {
            context: format!("reading {}", path.display()),
            source: e,
        })?;
        if !content_inspector::inspect(&bytes).is_text() {
            eprintln!(
                "{} {}",
                style("warning:").yellow().bold(),
                style(format!("skipping binary file {}", rel.display())).yellow()
            );
            continue;
        }

        let name = rel.to_string_lossy().into_owned();
        let text = String::from_utf8_lossy(&bytes);
        let content = Tera::one_off(&text, &context, false)
            .map_err(|e| SkellyError::RenderError { file: name, source: e })?;

        rendered.push(RenderedFile {
            path: rel.to_path_buf(),
            content,
        });
    }

    rendered.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(rendered)
}

/// Overwrite the copied files in `project_dir` with their rendered content.
///
/// Returns the rewritten paths relative to `project_dir`.
pub fn write_rendered(project_dir: &Path, files: &[RenderedFile]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let target = project_dir.join(&file.path);
        std::fs::write(&target, &file.content).map_err(|e| SkellyError::Io {
            context: format!("writing {}", target.display()),
            source: e,
        })?;
        written.push(file.path.clone());
    }
    Ok(written)
}

fn build_context(answers: &Answers) -> Context {
    let mut context = Context::new();
    for (key, value) in answers {
        context.insert(key, value);
    }
    context
}

fn build_glob_set(patterns: &[&str]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| SkellyError::GlobPattern {
            pattern: pattern.to_string(),
            source: e,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| SkellyError::GlobPattern {
        pattern: "<combined>".into(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tera::Value;

    fn answers() -> Answers {
        let mut answers = Answers::new();
        answers.insert("name".into(), Value::String("demo".into()));
        answers.insert("private".into(), Value::Bool(true));
        answers
    }

    fn rules(patterns: &[&str]) -> RewriteConfig {
        RewriteConfig {
            questions: Vec::new(),
            files: patterns
                .iter()
                .map(|p| RewriteRule {
                    pattern: p.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_rewrite_config(dir.path()).unwrap().is_none());
    }

    #[test]
    fn parses_questions_and_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(REWRITE_CONFIG_FILE),
            r#"
[[questions]]
name = "name"
message = "Project name"
default = "my-app"

[[questions]]
name = "license"
kind = "select"
choices = ["MIT", "ISC"]

[[files]]
pattern = "package.json"

[[files]]
pattern = "src/**/*.js"
"#,
        )
        .unwrap();

        let config = load_rewrite_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.questions.len(), 2);
        assert_eq!(config.questions[1].choices, vec!["MIT", "ISC"]);
        assert_eq!(config.files[1].pattern, "src/**/*.js");
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(REWRITE_CONFIG_FILE), "[[questions]\n").unwrap();
        let err = load_rewrite_config(dir.path()).unwrap_err();
        assert!(matches!(err, SkellyError::RewriteConfigParse { .. }));
    }

    #[test]
    fn renders_only_matching_files_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), r#"{"name": "{{ name }}"}"#).unwrap();
        std::fs::write(dir.path().join("README.md"), "# {{ name }}").unwrap();

        let rendered =
            render_rewrite(&rules(&["package.json"]), dir.path(), &answers()).unwrap();

        assert_eq!(
            rendered,
            vec![RenderedFile {
                path: PathBuf::from("package.json"),
                content: r#"{"name": "demo"}"#.to_string(),
            }]
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("package.json")).unwrap(),
            r#"{"name": "{{ name }}"}"#
        );
    }

    #[test]
    fn nested_matches_are_relative_to_the_payload() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src/bin")).unwrap();
        std::fs::write(dir.path().join("src/bin/main.js"), "// {{ name }}").unwrap();

        let rendered = render_rewrite(&rules(&["src/**/*.js"]), dir.path(), &answers()).unwrap();

        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].path, PathBuf::from("src/bin/main.js"));
        assert_eq!(rendered[0].content, "// demo");
    }

    #[test]
    fn write_rendered_overwrites_project_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), "{{ name }}").unwrap();
        let files = vec![RenderedFile {
            path: PathBuf::from("package.json"),
            content: "demo".to_string(),
        }];

        let written = write_rendered(dir.path(), &files).unwrap();

        assert_eq!(written, vec![PathBuf::from("package.json")]);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("package.json")).unwrap(),
            "demo"
        );
    }

    #[test]
    fn binary_matches_are_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let png = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
        std::fs::write(dir.path().join("logo.png"), png).unwrap();

        let rendered = render_rewrite(&rules(&["*.png"]), dir.path(), &answers()).unwrap();

        assert!(rendered.is_empty());
    }

    #[test]
    fn render_failure_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.txt"), "{{ missing }}").unwrap();

        let err = render_rewrite(&rules(&["*.txt"]), dir.path(), &answers()).unwrap_err();

        assert!(matches!(err, SkellyError::RenderError { ref file, .. } if file == "broken.txt"));
    }

    #[test]
    fn invalid_glob_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = render_rewrite(&rules(&["a[b"]), dir.path(), &answers()).unwrap_err();
        assert!(matches!(err, SkellyError::GlobPattern { .. }));
    }
}
