use clap::{ArgGroup, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "skelly",
    about = "Scaffold projects from git-hosted templates and template collections",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new project from a template repository
    #[command(group(ArgGroup::new("source").required(true).args(["from", "index"])))]
    New {
        /// Directory to create the project in (must be missing or empty)
        project_dir: String,

        /// Template repository, or a collection to pick a template from
        #[arg(long, visible_alias = "template", value_name = "REPO")]
        from: Option<String>,

        /// Collection repository; always offers a choice of templates
        #[arg(long, value_name = "REPO")]
        index: Option<String>,

        /// Take the first template of a collection without prompting
        #[arg(long)]
        first: bool,

        /// Answer template questions (can be repeated: -d key=value)
        #[arg(short, long = "data", value_name = "KEY=VALUE")]
        data: Vec<String>,

        /// Use default answers without prompting
        #[arg(long)]
        defaults: bool,

        /// Keep going with the cached copy when git fails
        #[arg(long)]
        best_effort: bool,

        /// Branch to reset cached repositories to (default: the remote's default branch)
        #[arg(long)]
        branch: Option<String>,
    },

    /// List cached template repositories
    List,
}
