//! Supported languages and their static metadata
//!
//! This module defines the closed set of languages the gateway knows about and
//! the registry that maps each of them to backend identifiers, file naming
//! conventions and runtime-input signatures.

pub mod registry;

pub use registry::{LanguageConfig, LanguageRegistry, StderrPolicy, DEFAULT_JAVA_NOISE_MARKERS};

use crate::engine::ExecutionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A language the execution backend can compile or interpret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    Java,
    Cpp,
    C,
    Go,
    Rust,
    Php,
    Ruby,
    Kotlin,
    Swift,
}

/// How a matched identifier is re-cased before it becomes a filename
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryCase {
    /// Keep the identifier as written
    Preserve,
    /// Force the first letter to uppercase (type-name conventions)
    UpperFirst,
    /// Force the whole identifier to lowercase (module-name conventions)
    Lower,
}

impl Language {
    /// Every language, in the order the UI lists them
    pub const ALL: [Language; 11] = [
        Language::Python,
        Language::JavaScript,
        Language::Java,
        Language::Cpp,
        Language::C,
        Language::Go,
        Language::Rust,
        Language::Php,
        Language::Ruby,
        Language::Kotlin,
        Language::Swift,
    ];

    /// Wire identifier (`python`, `cpp`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::C => "c",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Php => "php",
            Language::Ruby => "ruby",
            Language::Kotlin => "kotlin",
            Language::Swift => "swift",
        }
    }

    /// Human-readable label: the identifier with its first letter capitalized
    pub fn label(&self) -> String {
        let id = self.as_str();
        let mut chars = id.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn entry_case(&self) -> EntryCase {
        match self {
            Language::Java | Language::Kotlin | Language::Swift | Language::Cpp => {
                EntryCase::UpperFirst
            }
            Language::Python | Language::Ruby => EntryCase::Lower,
            _ => EntryCase::Preserve,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = ExecutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Language::ALL
            .into_iter()
            .find(|language| language.as_str() == wanted)
            .ok_or_else(|| ExecutionError::UnsupportedLanguage(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parsing() {
        assert_eq!("python".parse::<Language>().unwrap(), Language::Python);
        assert_eq!("JavaScript".parse::<Language>().unwrap(), Language::JavaScript);
        assert_eq!(" cpp ".parse::<Language>().unwrap(), Language::Cpp);
    }

    #[test]
    fn test_unknown_language_is_rejected() {
        let err = "cobol".parse::<Language>().unwrap_err();
        assert_eq!(err, ExecutionError::UnsupportedLanguage("cobol".to_string()));
        assert_eq!(err.to_string(), "Language cobol not supported");
    }

    #[test]
    fn test_labels() {
        assert_eq!(Language::Python.label(), "Python");
        assert_eq!(Language::Cpp.label(), "Cpp");
        assert_eq!(Language::JavaScript.label(), "Javascript");
    }

    #[test]
    fn test_serde_uses_wire_ids() {
        let json = serde_json::to_string(&Language::JavaScript).unwrap();
        assert_eq!(json, "\"javascript\"");
        let parsed: Language = serde_json::from_str("\"kotlin\"").unwrap();
        assert_eq!(parsed, Language::Kotlin);
    }
}
