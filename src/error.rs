#![allow(unused_assignments)]

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum SkellyError {
    #[error("Invalid repository reference: {input}")]
    #[diagnostic(help(
        "Expected repo formats:\n  * github-user/repo\n  * https://github.com/user/repo\n  * git@github.com:user/repo.git\n  * ssh://git@github.com:user/repo.git\n  * ./local/repo"
    ))]
    InvalidReference { input: String },

    #[error("Cache manifest at {path} is corrupt")]
    #[diagnostic(help("Fix or delete the manifest file; cached working copies will be re-synced"))]
    ManifestCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unable to determine the cache directory")]
    #[diagnostic(help("Set SKELLY_CACHE_DIR or `cache_dir` in the user config"))]
    CacheDirUnavailable,

    #[error("git executable not found")]
    #[diagnostic(help("Install git and make sure it is on your PATH"))]
    GitNotFound,

    #[error("`git {step}` failed for {url}: {reason}")]
    #[diagnostic(help("Check the URL and your network connection"))]
    SyncFailed {
        step: String,
        url: String,
        reason: String,
    },

    #[error("No available templates in {path}")]
    #[diagnostic(help(
        "A template is a directory with a 'files/' subdirectory and a package.json; a collection holds templates as immediate subdirectories"
    ))]
    NoTemplatesFound { path: PathBuf },

    #[error("{count} templates found in {path}, refusing to guess")]
    #[diagnostic(help("Run interactively, or pass --first to take the first template"))]
    AmbiguousTemplates { path: PathBuf, count: usize },

    #[error("Directory \"{path}\" is not empty, nothing to do")]
    #[diagnostic(help("Choose a new or empty project directory"))]
    DestinationNotEmpty { path: PathBuf },

    #[error("Failed to parse template descriptor {path}")]
    #[diagnostic(help("Check the JSON syntax of the template's package.json"))]
    DescriptorParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse user config {path}")]
    #[diagnostic(help("Check the TOML syntax in your config.toml"))]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to parse skelly.toml in {path}")]
    #[diagnostic(help("Check the TOML syntax in the template's skelly.toml"))]
    RewriteConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Glob pattern error: {pattern}")]
    GlobPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Failed to render {file}")]
    #[diagnostic(help("Check the Tera syntax in the template file"))]
    RenderError {
        file: String,
        #[source]
        source: tera::Error,
    },

    #[error("Prompt cancelled by user")]
    PromptCancelled,

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, SkellyError>;
