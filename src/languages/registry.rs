//! Language registry
//!
//! Immutable per-language configuration, built once at startup and shared by
//! every execution. Only languages that are both offered to callers and
//! supported by the backend end up in the registry.

use super::Language;
use crate::engine::ExecutionError;
use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;

/// Substrings marking JVM/javac stderr lines that are informational only
pub const DEFAULT_JAVA_NOISE_MARKERS: [&str; 3] =
    ["note:", "warning:", "picked up java_tool_options"];

/// What to do with a successful run's stderr before it is shown to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StderrPolicy {
    /// Append stderr verbatim after stdout
    Passthrough,
    /// Keep only non-blank lines that contain none of the markers (compared lowercased)
    FilterNoise(Vec<String>),
}

/// Static metadata for one language
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    pub id: Language,
    /// Language identifier understood by the execution backend
    pub backend_language_id: u32,
    pub file_extension: &'static str,
    pub default_entry_name: &'static str,
    pub timeout_seconds: u64,
    /// Case-insensitive probes for blocking stdin reads, checked in order
    pub input_signatures: Vec<Regex>,
    pub stderr_policy: StderrPolicy,
}

struct LanguageRow {
    id: Language,
    backend_language_id: u32,
    file_extension: &'static str,
    default_entry_name: &'static str,
    timeout_seconds: u64,
    input_signatures: &'static [&'static str],
}

const LANGUAGE_TABLE: [LanguageRow; 11] = [
    LanguageRow {
        id: Language::Python,
        backend_language_id: 71,
        file_extension: "py",
        default_entry_name: "main",
        timeout_seconds: 10,
        input_signatures: &[r"input\s*\(", r"sys\.stdin\.read", r"raw_input\s*\("],
    },
    LanguageRow {
        id: Language::JavaScript,
        backend_language_id: 63,
        file_extension: "js",
        default_entry_name: "main",
        timeout_seconds: 10,
        input_signatures: &[r"prompt\s*\(", r"readline\s*\(", r"process\.stdin"],
    },
    LanguageRow {
        id: Language::Java,
        backend_language_id: 62,
        file_extension: "java",
        default_entry_name: "Main",
        timeout_seconds: 15,
        input_signatures: &[r"Scanner\s*\(", r"System\.in", r"BufferedReader"],
    },
    LanguageRow {
        id: Language::Cpp,
        backend_language_id: 54,
        file_extension: "cpp",
        default_entry_name: "main",
        timeout_seconds: 15,
        input_signatures: &[r"cin\s*>>", r"getline\s*\(", r"scanf\s*\("],
    },
    LanguageRow {
        id: Language::C,
        backend_language_id: 50,
        file_extension: "c",
        default_entry_name: "main",
        timeout_seconds: 15,
        input_signatures: &[
            r"scanf\s*\(",
            r"getchar\s*\(",
            r"fgets\s*\(",
            r"gets\s*\(",
        ],
    },
    LanguageRow {
        id: Language::Go,
        backend_language_id: 60,
        file_extension: "go",
        default_entry_name: "main",
        timeout_seconds: 15,
        input_signatures: &[r"fmt\.Scan", r"bufio\.NewScanner", r"os\.Stdin"],
    },
    LanguageRow {
        id: Language::Rust,
        backend_language_id: 73,
        file_extension: "rs",
        default_entry_name: "main",
        timeout_seconds: 20,
        input_signatures: &[r"stdin\s*\(", r"read_line", r"io::stdin"],
    },
    LanguageRow {
        id: Language::Php,
        backend_language_id: 68,
        file_extension: "php",
        default_entry_name: "main",
        timeout_seconds: 10,
        input_signatures: &[r"fgets\s*\(", r"readline\s*\(", r"STDIN"],
    },
    LanguageRow {
        id: Language::Ruby,
        backend_language_id: 72,
        file_extension: "rb",
        default_entry_name: "main",
        timeout_seconds: 10,
        input_signatures: &[r"gets\s*", r"STDIN\.read", r"readline"],
    },
    LanguageRow {
        id: Language::Kotlin,
        backend_language_id: 78,
        file_extension: "kt",
        default_entry_name: "Main",
        timeout_seconds: 20,
        input_signatures: &[r"readLine\s*\(", r"Scanner\s*\(", r"System\.`in`"],
    },
    LanguageRow {
        id: Language::Swift,
        backend_language_id: 83,
        file_extension: "swift",
        default_entry_name: "main",
        timeout_seconds: 15,
        input_signatures: &[r"readLine\s*\(", r"FileHandle\.standardInput"],
    },
];

fn compile_signature(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("input signatures are static, valid patterns")
}

impl LanguageRow {
    fn to_config(&self, java_noise_markers: &[String]) -> LanguageConfig {
        let stderr_policy = match self.id {
            Language::Java => StderrPolicy::FilterNoise(
                java_noise_markers.iter().map(|m| m.to_lowercase()).collect(),
            ),
            _ => StderrPolicy::Passthrough,
        };

        LanguageConfig {
            id: self.id,
            backend_language_id: self.backend_language_id,
            file_extension: self.file_extension,
            default_entry_name: self.default_entry_name,
            timeout_seconds: self.timeout_seconds,
            input_signatures: self
                .input_signatures
                .iter()
                .map(|p| compile_signature(p))
                .collect(),
            stderr_policy,
        }
    }
}

/// Lookup table from language to its configuration
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    entries: BTreeMap<Language, LanguageConfig>,
}

impl LanguageRegistry {
    /// Build a registry restricted to `enabled` languages
    ///
    /// `java_noise_markers` feeds the Java stderr filter.
    pub fn new(enabled: &[Language], java_noise_markers: &[String]) -> Self {
        let entries = LANGUAGE_TABLE
            .iter()
            .filter(|row| enabled.contains(&row.id))
            .map(|row| (row.id, row.to_config(java_noise_markers)))
            .collect();

        Self { entries }
    }

    /// Registry with every known language and the default Java noise markers
    pub fn with_all_languages() -> Self {
        let markers: Vec<String> = DEFAULT_JAVA_NOISE_MARKERS
            .iter()
            .map(|m| m.to_string())
            .collect();
        Self::new(&Language::ALL, &markers)
    }

    pub fn lookup(&self, language: Language) -> Result<&LanguageConfig, ExecutionError> {
        self.entries
            .get(&language)
            .ok_or_else(|| ExecutionError::UnsupportedLanguage(language.to_string()))
    }

    /// Parse a wire identifier and look it up in one step
    pub fn resolve(&self, name: &str) -> Result<&LanguageConfig, ExecutionError> {
        let language: Language = name.parse()?;
        self.lookup(language)
    }

    /// Configured languages in UI order
    pub fn iter(&self) -> impl Iterator<Item = &LanguageConfig> {
        Language::ALL
            .into_iter()
            .filter_map(move |language| self.entries.get(&language))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::with_all_languages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_language_has_one_entry() {
        let registry = LanguageRegistry::with_all_languages();
        assert_eq!(registry.len(), Language::ALL.len());
        for language in Language::ALL {
            assert_eq!(registry.lookup(language).unwrap().id, language);
        }
    }

    #[test]
    fn test_backend_ids_and_extensions() {
        let registry = LanguageRegistry::default();
        let java = registry.lookup(Language::Java).unwrap();
        assert_eq!(java.backend_language_id, 62);
        assert_eq!(java.file_extension, "java");
        assert_eq!(java.default_entry_name, "Main");

        let rust = registry.lookup(Language::Rust).unwrap();
        assert_eq!(rust.backend_language_id, 73);
        assert_eq!(rust.file_extension, "rs");
        assert_eq!(rust.timeout_seconds, 20);
    }

    #[test]
    fn test_disabled_language_is_unsupported() {
        let registry = LanguageRegistry::new(&[Language::Python, Language::Java], &[]);
        assert_eq!(registry.len(), 2);
        assert!(registry.lookup(Language::Python).is_ok());
        assert_eq!(
            registry.lookup(Language::Swift).unwrap_err(),
            ExecutionError::UnsupportedLanguage("swift".to_string())
        );
    }

    #[test]
    fn test_resolve_by_name() {
        let registry = LanguageRegistry::default();
        assert_eq!(registry.resolve("go").unwrap().id, Language::Go);
        assert!(registry.resolve("brainfuck").is_err());
    }

    #[test]
    fn test_only_java_filters_stderr() {
        let registry = LanguageRegistry::default();
        for config in registry.iter() {
            match config.id {
                Language::Java => assert_eq!(
                    config.stderr_policy,
                    StderrPolicy::FilterNoise(vec![
                        "note:".to_string(),
                        "warning:".to_string(),
                        "picked up java_tool_options".to_string(),
                    ])
                ),
                _ => assert_eq!(config.stderr_policy, StderrPolicy::Passthrough),
            }
        }
    }

    #[test]
    fn test_iteration_follows_ui_order() {
        let registry = LanguageRegistry::new(&[Language::Swift, Language::Python], &[]);
        let ids: Vec<Language> = registry.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![Language::Python, Language::Swift]);
    }
}
