//! Runtime-input guard
//!
//! The backend runs programs in batch mode with no interactive stdin, so code
//! that reads from the terminal would hang until the time limit. This is a
//! static heuristic: it can match inside comments or strings and can miss
//! indirect reads.

use crate::languages::LanguageConfig;

/// First input signature of the language that matches `source`, if any
pub fn matching_signature<'a>(source: &str, config: &'a LanguageConfig) -> Option<&'a str> {
    config
        .input_signatures
        .iter()
        .find(|signature| signature.is_match(source))
        .map(|signature| signature.as_str())
}

pub fn requires_interactive_input(source: &str, config: &LanguageConfig) -> bool {
    matching_signature(source, config).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::{Language, LanguageRegistry};

    fn flagged(source: &str, language: Language) -> bool {
        let registry = LanguageRegistry::default();
        requires_interactive_input(source, registry.lookup(language).unwrap())
    }

    #[test]
    fn test_known_constructs_are_flagged() {
        assert!(flagged("name = input()", Language::Python));
        assert!(flagged("data = sys.stdin.read()", Language::Python));
        assert!(flagged("Scanner sc = new Scanner(System.in);", Language::Java));
        assert!(flagged("std::cin >> n;", Language::Cpp));
        assert!(flagged("scanf(\"%d\", &n);", Language::C));
        assert!(flagged("fmt.Scanln(&x)", Language::Go));
        assert!(flagged("io::stdin().read_line(&mut s)", Language::Rust));
        assert!(flagged("$line = fgets(STDIN);", Language::Php));
        assert!(flagged("name = gets.chomp", Language::Ruby));
        assert!(flagged("val n = readLine()", Language::Kotlin));
        assert!(flagged("let s = readLine()", Language::Swift));
        assert!(flagged("process.stdin.on('data', f)", Language::JavaScript));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert!(flagged("x = INPUT ()", Language::Python));
    }

    #[test]
    fn test_plain_programs_pass() {
        assert!(!flagged("print(\"hi\")", Language::Python));
        assert!(!flagged("System.out.println(1);", Language::Java));
        assert!(!flagged("fn main() { println!(\"hi\"); }", Language::Rust));
        assert!(!flagged("console.log(1)", Language::JavaScript));
    }

    #[test]
    fn test_reports_first_matching_signature() {
        let registry = LanguageRegistry::default();
        let python = registry.lookup(Language::Python).unwrap();
        assert_eq!(
            matching_signature("raw_input() or input()", python),
            Some(r"input\s*\(")
        );
    }
}
