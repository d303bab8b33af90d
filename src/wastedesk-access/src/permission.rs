//! Permission codes and the validated permission set held by a session.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The literal code granting unconditional access.
pub const WILDCARD: &str = "*";

/// A single permission code as issued by the server.
///
/// Codes come in two equivalent surface forms, dotted (`INVOICE.VIEW`) and
/// underscored (`INVOICE_VIEW`). Nothing is canonicalized on storage; the
/// matcher expands variants at query time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionCode(String);

impl PermissionCode {
    /// Creates a code from raw input, trimming surrounding whitespace.
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_string())
    }

    /// The wildcard code.
    pub fn wildcard() -> Self {
        Self(WILDCARD.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.0 == WILDCARD
    }

    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the code plus its cross-notation spellings.
    ///
    /// A code containing `.` also yields the `_` spelling and vice versa.
    /// Codes mixing both separators get both single-direction substitutions.
    pub fn variants(&self) -> Vec<String> {
        let mut out = vec![self.0.clone()];
        if self.0.contains('.') {
            out.push(self.0.replace('.', "_"));
        }
        if self.0.contains('_') {
            out.push(self.0.replace('_', "."));
        }
        out
    }
}

impl std::fmt::Display for PermissionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PermissionCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for PermissionCode {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}

/// The set of permission codes held by a session.
///
/// This is the only constructor boundary for permission data: entries are
/// trimmed, blank entries are dropped and duplicates collapse. Every consumer
/// downstream receives a normalized, never-absent collection.
///
/// An empty set is meaningful: authenticated, authorized for nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct PermissionSet {
    codes: BTreeSet<PermissionCode>,
}

impl PermissionSet {
    /// Builds a set from raw code strings.
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let codes = codes
            .into_iter()
            .map(PermissionCode::new)
            .filter(|c| !c.is_blank())
            .collect();
        Self { codes }
    }

    /// The empty set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a set from an arbitrary JSON value.
    ///
    /// Anything other than an array yields the empty set; non-string
    /// elements are skipped.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value.as_array() {
            Some(items) => Self::new(items.iter().filter_map(serde_json::Value::as_str)),
            None => Self::empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Returns `true` if the literal wildcard is held.
    pub fn contains_wildcard(&self) -> bool {
        self.codes.iter().any(PermissionCode::is_wildcard)
    }

    /// Exact membership test, no variant expansion.
    pub fn contains_exact(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c.as_str() == code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PermissionCode> {
        self.codes.iter()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.codes.iter().map(|c| c.as_str().to_string()).collect()
    }
}

impl From<Vec<String>> for PermissionSet {
    fn from(codes: Vec<String>) -> Self {
        Self::new(codes)
    }
}

impl From<PermissionSet> for Vec<String> {
    fn from(set: PermissionSet) -> Self {
        set.to_vec()
    }
}

impl<S: AsRef<str>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_variants_dotted() {
        let code = PermissionCode::new("INVOICE.VIEW");
        assert_eq!(code.variants(), vec!["INVOICE.VIEW", "INVOICE_VIEW"]);
    }

    #[test]
    fn test_variants_underscored() {
        let code = PermissionCode::new("INVOICE_VIEW");
        assert_eq!(code.variants(), vec!["INVOICE_VIEW", "INVOICE.VIEW"]);
    }

    #[test]
    fn test_variants_plain() {
        assert_eq!(PermissionCode::new("ADMIN").variants(), vec!["ADMIN"]);
    }

    #[test]
    fn test_code_trims_input() {
        assert_eq!(PermissionCode::new("  FLEET_VIEW \n").as_str(), "FLEET_VIEW");
        assert!(PermissionCode::new("   ").is_blank());
    }

    #[test]
    fn test_set_drops_blanks_and_duplicates() {
        let set = PermissionSet::new(["A_VIEW", " A_VIEW ", "", "   ", "B.EDIT"]);
        assert_eq!(set.len(), 2);
        assert!(set.contains_exact("A_VIEW"));
        assert!(set.contains_exact("B.EDIT"));
    }

    #[test]
    fn test_set_wildcard_detection() {
        assert!(PermissionSet::new(["*"]).contains_wildcard());
        assert!(PermissionSet::new([" * "]).contains_wildcard());
        assert!(!PermissionSet::new(["**", "A"]).contains_wildcard());
        assert!(!PermissionSet::empty().contains_wildcard());
    }

    #[test]
    fn test_from_json_array() {
        let set = PermissionSet::from_json(&json!(["INVOICE_VIEW", 42, null, "ROUTE.EDIT"]));
        assert_eq!(set.to_vec(), vec!["INVOICE_VIEW", "ROUTE.EDIT"]);
    }

    #[test]
    fn test_from_json_non_array_is_empty() {
        assert!(PermissionSet::from_json(&json!(null)).is_empty());
        assert!(PermissionSet::from_json(&json!("INVOICE_VIEW")).is_empty());
        assert!(PermissionSet::from_json(&json!({"permissions": ["A"]})).is_empty());
    }

    #[test]
    fn test_serde_as_plain_list() {
        let set = PermissionSet::new(["B", "A"]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["A","B"]"#);

        let parsed: PermissionSet = serde_json::from_str(r#"["A", " ", "B"]"#).unwrap();
        assert_eq!(parsed, set);
    }
}
