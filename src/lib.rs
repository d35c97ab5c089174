pub mod config;
pub mod error;
pub mod project;
pub mod repo;
pub mod template;

use std::path::{Path, PathBuf};

use console::style;
use log::{debug, warn};

use crate::error::Result;
use crate::project::{
    create_project, discard_project, ensure_destination_empty, load_rewrite_config, render_rewrite,
    write_rendered, Asker,
};
use crate::repo::{
    parse_reference, GitRunner, IdGenerator, ManifestStore, RepoCache, SyncEngine, SyncOutcome,
};
use crate::template::{discover, DiscoveryMode, TemplateSelector, FILES_DIR};

#[derive(Debug)]
pub struct CreateOptions {
    /// Repository reference as typed by the user.
    pub reference: String,
    /// Directory the new project is written to; must be missing or empty.
    pub destination: PathBuf,
    pub mode: DiscoveryMode,
    /// Directory relative references are resolved against.
    pub base_dir: PathBuf,
}

/// External capabilities the pipeline needs.
pub struct Collaborators<'a, S, G, R> {
    pub cache: &'a mut RepoCache<S, G>,
    pub engine: &'a SyncEngine<R>,
    pub selector: &'a dyn TemplateSelector,
    pub asker: &'a dyn Asker,
}

#[derive(Debug)]
pub struct GeneratedProject {
    pub output_dir: PathBuf,
    pub template_dir: PathBuf,
    pub sync: SyncOutcome,
    /// Copied files, relative to `output_dir`.
    pub files: Vec<PathBuf>,
    /// Files rendered by the template's rewrite rules.
    pub rewritten: Vec<PathBuf>,
}

/// Scaffold a new project: resolve the reference, sync its cached working
/// copy, pick a template and copy it into the destination.
///
/// When writing the project fails the destination is left as it was found.
pub fn create<S, G, R>(
    options: &CreateOptions,
    with: Collaborators<'_, S, G, R>,
) -> Result<GeneratedProject>
where
    S: ManifestStore,
    G: IdGenerator,
    R: GitRunner,
{
    // Before any network work.
    ensure_destination_empty(&options.destination)?;

    let url = parse_reference(&options.reference, &options.base_dir)?;
    debug!("Resolved {} to {url}", options.reference);

    let sync = with.engine.sync(with.cache, &url)?;
    for failure in sync.failures() {
        eprintln!(
            "{} {}",
            style("warning:").yellow().bold(),
            style(format!(
                "`git {}` failed, continuing with the cached working copy",
                failure.step
            ))
            .yellow()
        );
    }

    let template_dir = discover(&sync.path, options.mode, with.selector)?;
    debug!("Using template {}", template_dir.display());

    let rewrite = load_rewrite_config(&template_dir)?;
    let answers = match &rewrite {
        Some(config) if !config.questions.is_empty() => with.asker.ask(&config.questions)?,
        _ => Default::default(),
    };

    let rendered = match &rewrite {
        Some(config) => render_rewrite(config, &template_dir.join(FILES_DIR), &answers)?,
        None => Vec::new(),
    };

    let existed = options.destination.exists();
    let written = create_project(&template_dir, &options.destination).and_then(|created| {
        let rewritten = write_rendered(&created.output_dir, &rendered)?;
        Ok((created, rewritten))
    });
    let (created, rewritten) = match written {
        Ok(written) => written,
        Err(e) => {
            if let Err(cleanup) = discard_project(&options.destination, !existed) {
                warn!("Could not clean up {}: {cleanup}", options.destination.display());
            }
            return Err(e);
        }
    };

    Ok(GeneratedProject {
        output_dir: created.output_dir,
        template_dir,
        sync,
        files: created.files,
        rewritten,
    })
}

/// Absolute form of `dest`, relative paths taken from `base_dir`.
pub fn destination_path(base_dir: &Path, dest: &str) -> PathBuf {
    let path = Path::new(dest);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
