pub mod create;
pub mod questions;
pub mod rewrite;

pub use create::{create_project, discard_project, ensure_destination_empty, CreatedProject};
pub use questions::{
    parse_data_pairs, Answers, AskOptions, Asker, DefaultsAsker, PromptAsker, Question,
    QuestionKind,
};
pub use rewrite::{
    load_rewrite_config, render_rewrite, write_rendered, RenderedFile, RewriteConfig, RewriteRule,
    REWRITE_CONFIG_FILE,
};
