use aether_core::session::Session;
use std::fmt;
use std::str::FromStr;

/// The two editable sources of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeKind {
    Jsx,
    Css,
}

impl CodeKind {
    /// Display label, as used in toasts and assistant messages.
    pub fn label(self) -> &'static str {
        match self {
            CodeKind::Jsx => "JSX",
            CodeKind::Css => "CSS",
        }
    }

    /// Borrows this source from a session.
    pub fn source(self, session: &Session) -> &str {
        match self {
            CodeKind::Jsx => &session.jsx_code,
            CodeKind::Css => &session.css_code,
        }
    }
}

impl fmt::Display for CodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jsx" | "tsx" => Ok(CodeKind::Jsx),
            "css" => Ok(CodeKind::Css),
            other => Err(format!("unknown code kind '{other}' (expected jsx or css)")),
        }
    }
}
