//! Detection of scoped code questions.
//!
//! A scoped question is a chat submission embedding a fenced `jsx` or `css`
//! block followed by free text, e.g.
//!
//! ````text
//! ```jsx
//! <Button/>
//! ```
//! make this red
//! ````

use crate::code_kind::CodeKind;
use once_cell::sync::Lazy;
use regex::Regex;

static SCOPED_QUESTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?i:(jsx|css))[ \t]*\r?\n(.*?)\r?\n```(.*)").expect("valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedQuestion {
    pub kind: CodeKind,
    pub snippet: String,
    pub query: String,
}

/// Extracts `(kind, snippet, trailing query)` from a submission.
///
/// Returns `None` unless both the snippet and the trailing text are non-blank.
pub fn parse_scoped_question(text: &str) -> Option<ScopedQuestion> {
    let captures = SCOPED_QUESTION.captures(text)?;
    let kind = captures.get(1)?.as_str().parse::<CodeKind>().ok()?;
    let snippet = captures.get(2)?.as_str();
    let query = captures.get(3)?.as_str().trim();

    if snippet.trim().is_empty() || query.is_empty() {
        return None;
    }

    Some(ScopedQuestion {
        kind,
        snippet: snippet.to_string(),
        query: query.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jsx_question() {
        let question = parse_scoped_question("```jsx\n<Button/>\n```\nmake this red").unwrap();
        assert_eq!(question.kind, CodeKind::Jsx);
        assert_eq!(question.snippet, "<Button/>");
        assert_eq!(question.query, "make this red");
    }

    #[test]
    fn test_multiline_css_snippet() {
        let text = "```css\n.btn {\n  color: red;\n}\n```\n  what does this do?  ";
        let question = parse_scoped_question(text).unwrap();
        assert_eq!(question.kind, CodeKind::Css);
        assert_eq!(question.snippet, ".btn {\n  color: red;\n}");
        assert_eq!(question.query, "what does this do?");
    }

    #[test]
    fn test_requires_trailing_text() {
        assert!(parse_scoped_question("```jsx\n<Button/>\n```\n   ").is_none());
    }

    #[test]
    fn test_other_languages_are_plain_prompts() {
        assert!(parse_scoped_question("```html\n<b/>\n```\nwhy").is_none());
        assert!(parse_scoped_question("make the header sticky").is_none());
    }
}
