//! Entry-point identifier extraction.
//!
//! Finding the component to render is a heuristic. It sits behind
//! [`EntryPointExtractor`] so a real JSX/TS parser can replace the regex
//! strategy without touching the rest of the preview pipeline.

use once_cell::sync::Lazy;
use regex::Regex;

/// Strategy that locates the component identifier to render.
pub trait EntryPointExtractor: Send + Sync {
    /// Returns the capitalized component name declared in `source`, if any.
    fn extract(&self, source: &str) -> Option<String>;
}

static DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:function|class|const)\s+([A-Z][A-Za-z0-9_]*)").expect("valid regex")
});

static ARROW_ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"const\s+([A-Z][A-Za-z0-9_]*)\s*=\s*\([^)]*\)\s*=>").expect("valid regex")
});

/// Regex-based name sniffing: a function/class/const declaration first,
/// then a const-assigned arrow function.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegexEntryPointExtractor;

impl EntryPointExtractor for RegexEntryPointExtractor {
    fn extract(&self, source: &str) -> Option<String> {
        [&*DECLARATION, &*ARROW_ASSIGNMENT]
            .iter()
            .find_map(|pattern| pattern.captures(source))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> Option<String> {
        RegexEntryPointExtractor.extract(source)
    }

    #[test]
    fn test_function_declaration() {
        assert_eq!(
            extract("function Card() { return <div/>; }").as_deref(),
            Some("Card")
        );
    }

    #[test]
    fn test_class_declaration() {
        assert_eq!(
            extract("class Panel extends React.Component {}").as_deref(),
            Some("Panel")
        );
    }

    #[test]
    fn test_const_arrow() {
        assert_eq!(
            extract("const PricingTable = ({ tiers }) => <table/>").as_deref(),
            Some("PricingTable")
        );
    }

    #[test]
    fn test_first_declaration_wins() {
        let source = "const Icon = () => <i/>;\nfunction App() { return <Icon/>; }";
        assert_eq!(extract(source).as_deref(), Some("Icon"));
    }

    #[test]
    fn test_lowercase_names_ignored() {
        assert_eq!(extract("const helper = () => 1; function main() {}"), None);
    }

    #[test]
    fn test_plain_markup_has_no_entry_point() {
        assert_eq!(extract("<section><h1>Hi</h1></section>"), None);
    }
}
