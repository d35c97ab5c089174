use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use tera::Value;

use crate::error::{Result, SkellyError};

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    #[default]
    Text,
    Confirm,
    Select,
}

/// A question a template asks before its files are rewritten.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Question {
    /// Name the answer is bound to when rendering.
    pub name: String,
    /// Prompt text; defaults to `name`.
    pub message: Option<String>,
    #[serde(default)]
    pub kind: QuestionKind,
    pub default: Option<toml::Value>,
    #[serde(default)]
    pub choices: Vec<String>,
}

impl Question {
    fn message(&self) -> &str {
        self.message.as_deref().unwrap_or(&self.name)
    }

    fn default_value(&self) -> Option<Value> {
        match (&self.kind, &self.default) {
            (_, Some(value)) => Some(toml_to_value(value)),
            (QuestionKind::Confirm, None) => Some(Value::Bool(false)),
            (QuestionKind::Select, None) => self.choices.first().cloned().map(Value::String),
            (QuestionKind::Text, None) => None,
        }
    }
}

pub type Answers = BTreeMap<String, Value>;

/// Answers questions, interactively or not.
pub trait Asker {
    fn ask(&self, questions: &[Question]) -> Result<Answers>;
}

/// Options shared by the bundled askers.
#[derive(Debug, Default, Clone)]
pub struct AskOptions {
    /// Pre-supplied key=value answers (from --data flags).
    pub data_overrides: HashMap<String, String>,
}

/// Prompts on the terminal for anything not covered by an override.
#[derive(Debug, Default, Clone)]
pub struct PromptAsker {
    pub options: AskOptions,
}

impl Asker for PromptAsker {
    fn ask(&self, questions: &[Question]) -> Result<Answers> {
        let mut answers = Answers::new();
        for question in questions {
            let value = match self.options.data_overrides.get(&question.name) {
                Some(raw) => parse_override(raw, question),
                None => prompt_question(question)?,
            };
            answers.insert(question.name.clone(), value);
        }
        Ok(answers)
    }
}

/// Never prompts: overrides first, then defaults. Text questions without
/// a default get an empty string.
#[derive(Debug, Default, Clone)]
pub struct DefaultsAsker {
    pub options: AskOptions,
}

impl Asker for DefaultsAsker {
    fn ask(&self, questions: &[Question]) -> Result<Answers> {
        Ok(questions
            .iter()
            .map(|q| {
                let value = match self.options.data_overrides.get(&q.name) {
                    Some(raw) => parse_override(raw, q),
                    None => q
                        .default_value()
                        .unwrap_or_else(|| Value::String(String::new())),
                };
                (q.name.clone(), value)
            })
            .collect())
    }
}

fn prompt_question(question: &Question) -> Result<Value> {
    let message = question.message();
    match question.kind {
        QuestionKind::Text => {
            let default = match &question.default {
                Some(toml::Value::String(s)) => Some(s.clone()),
                Some(other) => Some(other.to_string()),
                None => None,
            };
            let mut prompt = inquire::Text::new(message);
            if let Some(default) = &default {
                prompt = prompt.with_default(default);
            }
            let answer = prompt.prompt().map_err(|_| SkellyError::PromptCancelled)?;
            Ok(Value::String(answer))
        }
        QuestionKind::Confirm => {
            let default = matches!(question.default, Some(toml::Value::Boolean(true)));
            let answer = inquire::Confirm::new(message)
                .with_default(default)
                .prompt()
                .map_err(|_| SkellyError::PromptCancelled)?;
            Ok(Value::Bool(answer))
        }
        QuestionKind::Select => {
            let mut prompt = inquire::Select::new(message, question.choices.clone());
            if let Some(toml::Value::String(default)) = &question.default {
                if let Some(idx) = question.choices.iter().position(|c| c == default) {
                    prompt = prompt.with_starting_cursor(idx);
                }
            }
            let answer = prompt.prompt().map_err(|_| SkellyError::PromptCancelled)?;
            Ok(Value::String(answer))
        }
    }
}

fn parse_override(value: &str, question: &Question) -> Value {
    match question.kind {
        QuestionKind::Confirm => Value::Bool(matches!(value, "true" | "1" | "yes" | "y")),
        _ => Value::String(value.to_string()),
    }
}

/// Parse `key=value` pairs as given on the command line; malformed
/// entries are dropped.
pub fn parse_data_pairs(data: &[String]) -> HashMap<String, String> {
    data.iter()
        .filter_map(|kv| {
            let (key, value) = kv.split_once('=')?;
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

fn toml_to_value(val: &toml::Value) -> Value {
    match val {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(n) => Value::Number(serde_json::Number::from(*n)),
        toml::Value::Float(f) => serde_json::to_value(f).unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Array(arr) => Value::Array(arr.iter().map(toml_to_value).collect()),
        toml::Value::Table(t) => Value::Object(
            t.iter()
                .map(|(k, v)| (k.clone(), toml_to_value(v)))
                .collect(),
        ),
        toml::Value::Datetime(d) => Value::String(d.to_string()),
    }
}
