//! Source analyzer
//!
//! Derives a display filename from raw source text. Each language has an
//! ordered list of structural probes; the first one that matches supplies the
//! entry name. Probes are regular expressions over the raw text, so malformed
//! or partial code simply falls through to the language default.

use crate::languages::{EntryCase, Language, LanguageConfig};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// One structural probe: a pattern whose first capture group is the name
struct Probe {
    pattern: Regex,
    /// Extra condition on the captured name; a rejected match ends this probe
    accepts: fn(&str) -> bool,
}

fn any_name(_: &str) -> bool {
    true
}

fn not_main_package(name: &str) -> bool {
    name != "main"
}

fn entry_function(name: &str) -> bool {
    matches!(name.to_lowercase().as_str(), "main" | "app" | "index")
}

fn probe(pattern: &str) -> Probe {
    probe_if(pattern, any_name)
}

fn probe_if(pattern: &str, accepts: fn(&str) -> bool) -> Probe {
    Probe {
        pattern: Regex::new(pattern).expect("entry probes are static, valid patterns"),
        accepts,
    }
}

fn probes_for(language: Language) -> &'static [Probe] {
    static PROBES: OnceLock<HashMap<Language, Vec<Probe>>> = OnceLock::new();

    let table = PROBES.get_or_init(|| {
        let mut table = HashMap::new();
        table.insert(
            Language::Java,
            vec![
                probe(r"(?i)\bpublic\s+class\s+(\w+)"),
                probe(r"(?i)\bclass\s+(\w+)"),
            ],
        );
        table.insert(
            Language::Kotlin,
            vec![probe(r"(?i)\bclass\s+(\w+)"), probe(r"(?i)\bobject\s+(\w+)")],
        );
        table.insert(Language::Swift, vec![probe(r"(?i)\b(?:class|struct)\s+(\w+)")]);
        table.insert(Language::Cpp, vec![probe(r"(?i)\bclass\s+(\w+)")]);
        table.insert(Language::Python, vec![probe(r"(?i)\bclass\s+(\w+)")]);
        table.insert(
            Language::Go,
            vec![probe_if(r"\bpackage\s+(\w+)", not_main_package)],
        );
        table.insert(Language::Rust, vec![probe(r"\bmod\s+(\w+)")]);
        table.insert(Language::Php, vec![probe(r"(?i)\bclass\s+(\w+)")]);
        table.insert(Language::Ruby, vec![probe(r"(?i)\bclass\s+(\w+)")]);
        table.insert(
            Language::JavaScript,
            vec![
                probe(r"(?i)\bclass\s+(\w+)"),
                probe_if(r"(?i)\bfunction\s+(\w+)", entry_function),
            ],
        );
        table.insert(Language::C, Vec::new());
        table
    });

    table.get(&language).map(Vec::as_slice).unwrap_or(&[])
}

fn apply_case(name: &str, case: EntryCase) -> String {
    match case {
        EntryCase::Preserve => name.to_string(),
        EntryCase::Lower => name.to_lowercase(),
        EntryCase::UpperFirst => {
            let mut chars = name.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

/// Best-guess entry name (class, module or package) for `source`
///
/// Falls back to the language's default entry name when no probe matches.
pub fn extract_entry_name(source: &str, config: &LanguageConfig) -> String {
    for probe in probes_for(config.id) {
        let Some(name) = probe
            .pattern
            .captures(source)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
        else {
            continue;
        };

        if (probe.accepts)(name) {
            return apply_case(name, config.id.entry_case());
        }
    }

    config.default_entry_name.to_string()
}

/// Entry name plus the registry's file extension
pub fn build_filename(source: &str, config: &LanguageConfig) -> String {
    format!("{}.{}", extract_entry_name(source, config), config.file_extension)
}
