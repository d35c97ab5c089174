use console::style;
use miette::Result;

use skelly::config::{cache_root, load_user_config};
use skelly::repo::{CachedRepo, RepoCache};

pub fn run() -> Result<()> {
    let user = load_user_config()?;
    let root = cache_root(user.as_ref())?;
    let entries = RepoCache::open(&root).slots()?;

    if entries.is_empty() {
        println!(
            "No cached repositories. Use '{}' to cache one.",
            style("skelly new <dir> --from <repo>").cyan()
        );
        return Ok(());
    }

    println!(
        "{} ({} repositor{}) in {}\n",
        style("Cached repositories").bold(),
        entries.len(),
        if entries.len() == 1 { "y" } else { "ies" },
        root.display()
    );

    for entry in &entries {
        print_entry(entry);
    }

    Ok(())
}

fn print_entry(entry: &CachedRepo) {
    let state = if entry.present {
        style("synced").green()
    } else {
        style("missing, re-synced on next use").yellow()
    };

    println!("  {} {}", style("source:").dim(), entry.url);
    println!("  {}     {}", style("dir:").dim(), entry.id);
    println!("  {}   {}", style("state:").dim(), state);
    println!();
}
