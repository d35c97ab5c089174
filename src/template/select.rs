use std::fmt;
use std::path::PathBuf;

use crate::error::{Result, SkellyError};

/// Shown when a template's descriptor has no usable `description`.
pub const NO_DESCRIPTION: &str = "No description";

/// One template offered for selection from a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateCandidate {
    /// Directory name inside the collection.
    pub name: String,
    pub description: String,
    pub path: PathBuf,
}

impl fmt::Display for TemplateCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.name, self.description)
    }
}

/// Picks one template out of a non-empty candidate list.
pub trait TemplateSelector {
    /// Return the index of the chosen candidate.
    fn choose(&self, candidates: &[TemplateCandidate]) -> Result<usize>;
}

/// Interactive single-choice prompt.
#[derive(Debug, Clone)]
pub struct PromptSelector {
    pub message: String,
}

impl Default for PromptSelector {
    fn default() -> Self {
        Self {
            message: "Select a template".to_string(),
        }
    }
}

impl TemplateSelector for PromptSelector {
    fn choose(&self, candidates: &[TemplateCandidate]) -> Result<usize> {
        let options: Vec<String> = candidates.iter().map(ToString::to_string).collect();
        let picked = inquire::Select::new(&self.message, options)
            .raw_prompt()
            .map_err(|_| SkellyError::PromptCancelled)?;
        Ok(picked.index)
    }
}

/// Non-interactive: always the first candidate.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstCandidate;

impl TemplateSelector for FirstCandidate {
    fn choose(&self, _candidates: &[TemplateCandidate]) -> Result<usize> {
        Ok(0)
    }
}

/// Non-interactive: succeed only when there is nothing to choose between.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequireSingle;

impl TemplateSelector for RequireSingle {
    fn choose(&self, candidates: &[TemplateCandidate]) -> Result<usize> {
        match candidates {
            [_] => Ok(0),
            [first, ..] => Err(SkellyError::AmbiguousTemplates {
                path: first
                    .path
                    .parent()
                    .map(PathBuf::from)
                    .unwrap_or_default(),
                count: candidates.len(),
            }),
            [] => Err(SkellyError::NoTemplatesFound {
                path: PathBuf::new(),
            }),
        }
    }
}
