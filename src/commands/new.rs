use console::style;
use miette::{IntoDiagnostic, Result};

use skelly::config::{cache_root, load_user_config};
use skelly::project::{parse_data_pairs, AskOptions, Asker, DefaultsAsker, PromptAsker};
use skelly::repo::{RepoCache, SyncEngine, SyncPolicy, SystemGit};
use skelly::template::{DiscoveryMode, FirstCandidate, PromptSelector, TemplateSelector};
use skelly::{create, destination_path, Collaborators, CreateOptions};

pub struct NewArgs {
    pub project_dir: String,
    pub from: Option<String>,
    pub index: Option<String>,
    pub first: bool,
    pub data: Vec<String>,
    pub defaults: bool,
    pub best_effort: bool,
    pub branch: Option<String>,
}

pub fn run(args: NewArgs) -> Result<()> {
    let user = load_user_config()?;
    let cwd = std::env::current_dir().into_diagnostic()?;

    // clap guarantees exactly one of the two.
    let (reference, mode) = match (args.from, args.index) {
        (Some(repo), _) => (repo, DiscoveryMode::Auto),
        (None, Some(repo)) => (repo, DiscoveryMode::Collection),
        (None, None) => return Err(miette::miette!("Require '--from' or '--index'")),
    };

    let options = CreateOptions {
        reference,
        destination: destination_path(&cwd, &args.project_dir),
        mode,
        base_dir: cwd,
    };

    let policy = if args.best_effort {
        SyncPolicy::BestEffort
    } else {
        user.as_ref()
            .and_then(|u| u.sync_policy)
            .unwrap_or_default()
    };
    let branch = args
        .branch
        .or_else(|| user.as_ref().and_then(|u| u.default_branch.clone()));

    let mut cache = RepoCache::open(cache_root(user.as_ref())?);
    let engine = SyncEngine::new(SystemGit)
        .with_policy(policy)
        .with_default_branch(branch);

    let prompt_selector = PromptSelector::default();
    let selector: &dyn TemplateSelector = if args.first {
        &FirstCandidate
    } else {
        &prompt_selector
    };

    let ask_options = AskOptions {
        data_overrides: parse_data_pairs(&args.data),
    };
    let prompt_asker = PromptAsker {
        options: ask_options.clone(),
    };
    let defaults_asker = DefaultsAsker {
        options: ask_options,
    };
    let asker: &dyn Asker = if args.defaults {
        &defaults_asker
    } else {
        &prompt_asker
    };

    let project = create(
        &options,
        Collaborators {
            cache: &mut cache,
            engine: &engine,
            selector,
            asker,
        },
    )?;

    println!(
        "\n{} Project created at {}",
        style("✓").green().bold(),
        style(project.output_dir.display()).cyan()
    );
    println!(
        "  {} files copied, {} files rendered",
        project.files.len(),
        project.rewritten.len()
    );

    Ok(())
}
