//! Linear undo/redo over a session's code versions.
//!
//! Every operation keeps `jsx_code`/`css_code` equal to
//! `code_history[current_version]`. Undo and redo are no-ops at the
//! boundaries; they never error and never wrap around.

use super::model::{CodeVersion, HISTORY_CAP, Session};

impl Session {
    /// Commits a new version after the current one.
    ///
    /// Versions after `current_version` are discarded first, then the new
    /// version is appended and only the most recent [`HISTORY_CAP`] entries
    /// are kept.
    pub fn commit_version(&mut self, version: CodeVersion) {
        let keep = (self.current_version + 1).min(self.code_history.len());
        self.code_history.truncate(keep);
        self.code_history.push(version);
        if self.code_history.len() > HISTORY_CAP {
            let excess = self.code_history.len() - HISTORY_CAP;
            self.code_history.drain(..excess);
        }
        self.current_version = self.code_history.len() - 1;
        self.sync_code();
    }

    /// Replaces the whole timeline with a single version.
    ///
    /// Used by the first generation: the placeholder is discarded, not versioned.
    pub fn replace_history(&mut self, version: CodeVersion) {
        self.code_history = vec![version];
        self.current_version = 0;
        self.sync_code();
    }

    /// Steps back one version. Returns whether the position changed.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.current_version -= 1;
        self.sync_code();
        true
    }

    /// Steps forward one version. Returns whether the position changed.
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.current_version += 1;
        self.sync_code();
        true
    }

    pub fn can_undo(&self) -> bool {
        self.current_version > 0
    }

    pub fn can_redo(&self) -> bool {
        self.current_version + 1 < self.code_history.len()
    }

    /// Checks the versioning invariants, returning a description of the
    /// first violation found.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.code_history.is_empty() {
            return Err("code history is empty".to_string());
        }
        if self.code_history.len() > HISTORY_CAP {
            return Err(format!(
                "code history holds {} versions (cap {})",
                self.code_history.len(),
                HISTORY_CAP
            ));
        }
        let Some(current) = self.current() else {
            return Err(format!(
                "current version {} out of range 0..{}",
                self.current_version,
                self.code_history.len()
            ));
        };
        if current.jsx_code != self.jsx_code || current.css_code != self.css_code {
            return Err("current code differs from the current version".to_string());
        }
        Ok(())
    }

    /// Clamps `current_version` into range and reloads the code from it.
    ///
    /// An empty history is seeded from the current code.
    pub fn resync(&mut self) {
        if self.code_history.is_empty() {
            self.code_history
                .push(CodeVersion::new(self.jsx_code.clone(), self.css_code.clone()));
        }
        if self.code_history.len() > HISTORY_CAP {
            let excess = self.code_history.len() - HISTORY_CAP;
            self.code_history.drain(..excess);
            self.current_version = self.current_version.saturating_sub(excess);
        }
        self.current_version = self.current_version.min(self.code_history.len() - 1);
        self.sync_code();
    }

    fn sync_code(&mut self) {
        if let Some(version) = self.code_history.get(self.current_version) {
            self.jsx_code = version.jsx_code.clone();
            self.css_code = version.css_code.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(n: usize) -> CodeVersion {
        CodeVersion::new(format!("const V{n} = () => <div/>"), format!(".v{n} {{}}"))
    }

    fn session_with(versions: &[usize], current: usize) -> Session {
        let mut session = Session::new();
        session.code_history = versions.iter().map(|n| v(*n)).collect();
        session.current_version = current;
        session.resync();
        session
    }

    #[test]
    fn test_branch_truncation() {
        let mut session = session_with(&[0, 1, 2, 3], 1);
        session.commit_version(v(4));
        assert_eq!(session.code_history, vec![v(0), v(1), v(4)]);
        assert_eq!(session.current_version, 2);
        assert_eq!(session.jsx_code, v(4).jsx_code);
    }

    #[test]
    fn test_history_cap_keeps_most_recent() {
        let mut session = session_with(&[0], 0);
        for n in 1..=7 {
            session.commit_version(v(n));
        }
        assert_eq!(session.code_history.len(), HISTORY_CAP);
        assert_eq!(session.code_history, (3..=7).map(v).collect::<Vec<_>>());
        assert_eq!(session.current_version, HISTORY_CAP - 1);
        assert!(session.check_invariants().is_ok());
    }

    #[test]
    fn test_undo_redo_bounds() {
        for n in 1..=8usize {
            let mut session = Session::new();
            session.replace_history(v(0));
            for i in 1..n {
                session.commit_version(v(i));
            }
            let max = n.min(HISTORY_CAP) - 1;
            for _ in 0..10 {
                session.undo();
                assert!(session.current_version <= max);
            }
            assert_eq!(session.current_version, 0);
            assert!(!session.undo());
            for _ in 0..10 {
                session.redo();
                assert!(session.current_version <= max);
            }
            assert_eq!(session.current_version, max);
            assert!(!session.redo());
            assert!(session.check_invariants().is_ok());
        }
    }

    #[test]
    fn test_undo_restores_code() {
        let mut session = session_with(&[0, 1], 1);
        assert!(session.undo());
        assert_eq!(session.jsx_code, v(0).jsx_code);
        assert_eq!(session.css_code, v(0).css_code);
        assert!(session.redo());
        assert_eq!(session.jsx_code, v(1).jsx_code);
    }

    #[test]
    fn test_replace_history_discards_placeholder() {
        let mut session = Session::new();
        session.replace_history(v(9));
        assert_eq!(session.code_history, vec![v(9)]);
        assert_eq!(session.current_version, 0);
        assert!(!session.is_placeholder());
    }

    #[test]
    fn test_resync_clamps_out_of_range_index() {
        let mut session = Session::new();
        session.code_history = vec![v(0), v(1)];
        session.current_version = 7;
        session.resync();
        assert_eq!(session.current_version, 1);
        assert_eq!(session.jsx_code, v(1).jsx_code);
    }

    #[test]
    fn test_invariant_violation_detected() {
        let mut session = Session::new();
        session.jsx_code = "drifted".to_string();
        assert!(session.check_invariants().is_err());
    }
}
