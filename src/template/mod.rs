pub mod descriptor;
pub mod discover;
pub mod select;

pub use descriptor::{read_descriptor, Descriptor, DESCRIPTOR_FILE};
pub use discover::{discover, is_template, list_candidates, DiscoveryMode, FILES_DIR};
pub use select::{
    FirstCandidate, PromptSelector, RequireSingle, TemplateCandidate, TemplateSelector,
};
