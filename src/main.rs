mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> miette::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("SKELLY_LOG", "warn")).init();

    match Cli::parse().command {
        Commands::New {
            project_dir,
            from,
            index,
            first,
            data,
            defaults,
            best_effort,
            branch,
        } => commands::new::run(commands::new::NewArgs {
            project_dir,
            from,
            index,
            first,
            data,
            defaults,
            best_effort,
            branch,
        }),
        Commands::List => commands::list::run(),
    }
}
