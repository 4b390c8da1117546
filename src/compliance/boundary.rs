//! Boundary guard.
//!
//! Free-text scanner for language that does not belong in a non-monetary
//! ledger (payouts, wagers, currency). Pure: callers run it on notes before
//! handing input to a registry; the registry never calls it.

use serde::{Deserialize, Serialize};

/// Keywords flagged by [`BoundaryGuard::with_defaults`].
pub const DEFAULT_FORBIDDEN_KEYWORDS: &[&str] = &[
    "payout",
    "cash out",
    "cashout",
    "withdrawal",
    "deposit",
    "wager",
    "betting",
    "jackpot",
    "profit",
    "dividend",
    "currency",
    "real money",
];

/// Violation severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationSeverity {
    /// Worth a human look
    Warning,
    /// Must not be recorded as-is
    Critical,
}

/// One flagged keyword.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundaryRule {
    /// Lowercased keyword or phrase
    pub keyword: String,
    /// Severity reported on a match
    pub severity: ViolationSeverity,
}

/// A keyword occurrence in scanned text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryViolation {
    /// Matched keyword
    pub keyword: String,
    /// Byte offset of the match in the scanned text
    pub offset: usize,
    /// Severity of the matching rule
    pub severity: ViolationSeverity,
}

/// Keyword scanner.
#[derive(Clone, Debug, Default)]
pub struct BoundaryGuard {
    rules: Vec<BoundaryRule>,
}

impl BoundaryGuard {
    /// Guard flagging the given keywords as critical.
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        let mut guard = Self::default();
        for keyword in keywords {
            guard.add_rule(keyword.as_ref(), ViolationSeverity::Critical);
        }
        guard
    }

    /// Guard over [`DEFAULT_FORBIDDEN_KEYWORDS`].
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_FORBIDDEN_KEYWORDS)
    }

    /// Add a rule. Blank keywords are ignored.
    pub fn add_rule(&mut self, keyword: &str, severity: ViolationSeverity) {
        let keyword = keyword.trim().to_ascii_lowercase();
        if !keyword.is_empty() {
            self.rules.push(BoundaryRule { keyword, severity });
        }
    }

    /// Configured rules, in insertion order.
    pub fn rules(&self) -> &[BoundaryRule] {
        &self.rules
    }

    /// Every whole-word, case-insensitive keyword occurrence, ordered by offset.
    pub fn scan(&self, text: &str) -> Vec<BoundaryViolation> {
        let haystack = text.to_ascii_lowercase();
        let mut violations = Vec::new();

        for rule in &self.rules {
            let mut from = 0;
            while let Some(pos) = haystack[from..].find(&rule.keyword) {
                let start = from + pos;
                let end = start + rule.keyword.len();
                if is_boundary(&haystack, start, end) {
                    violations.push(BoundaryViolation {
                        keyword: rule.keyword.clone(),
                        offset: start,
                        severity: rule.severity,
                    });
                }
                from = end;
            }
        }

        violations.sort_by(|a, b| a.offset.cmp(&b.offset).then_with(|| a.keyword.cmp(&b.keyword)));
        violations
    }

    /// Whether the text contains no flagged keyword.
    pub fn is_clean(&self, text: &str) -> bool {
        self.scan(text).is_empty()
    }
}

fn is_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

/// Scan with the default keyword list.
pub fn scan(text: &str) -> Vec<BoundaryViolation> {
    BoundaryGuard::with_defaults().scan(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text() {
        assert!(scan("Weekly unit reconciliation for region 4").is_empty());
    }

    #[test]
    fn test_flags_keywords_case_insensitive() {
        let violations = scan("Player asked for a PAYOUT and a cash out");
        let keywords: Vec<&str> = violations.iter().map(|v| v.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["payout", "cash out"]);
        assert_eq!(violations[0].offset, 19);
    }

    #[test]
    fn test_whole_words_only() {
        let guard = BoundaryGuard::new(&["bet"]);
        assert!(guard.is_clean("the alphabet between us"));
        assert_eq!(guard.scan("no bet, no bet.").len(), 2);
    }

    #[test]
    fn test_custom_rules() {
        let mut guard = BoundaryGuard::default();
        guard.add_rule("Bonus", ViolationSeverity::Warning);
        guard.add_rule("   ", ViolationSeverity::Critical);
        assert_eq!(guard.rules().len(), 1);

        let violations = guard.scan("bonus units");
        assert_eq!(violations[0].severity, ViolationSeverity::Warning);
    }
}
