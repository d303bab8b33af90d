//! Permission code matching.
//!
//! This is the only place aware of the dotted/underscored dual notation.
//! Everything else asks [`satisfies`] or [`satisfies_any`].
//!
//! A blank requirement is checked before the wildcard: it never matches, even
//! for a session holding `*`.

use crate::permission::{PermissionCode, PermissionSet};

/// Returns `true` if `held` satisfies the `required` code.
pub fn satisfies(held: &PermissionSet, required: &str) -> bool {
    let required = PermissionCode::new(required);
    if required.is_blank() {
        return false;
    }

    if held.contains_wildcard() {
        return true;
    }

    required
        .variants()
        .iter()
        .any(|variant| held.contains_exact(variant))
}

/// Returns `true` if `held` satisfies at least one of `required`.
///
/// An empty list is never satisfied.
pub fn satisfies_any<S: AsRef<str>>(held: &PermissionSet, required: &[S]) -> bool {
    required.iter().any(|r| satisfies(held, r.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(codes: &[&str]) -> PermissionSet {
        PermissionSet::new(codes.iter().copied())
    }

    #[test]
    fn test_exact_match() {
        assert!(satisfies(&set(&["INVOICE_VIEW"]), "INVOICE_VIEW"));
        assert!(!satisfies(&set(&["INVOICE_VIEW"]), "INVOICE_EDIT"));
    }

    #[test]
    fn test_cross_notation_both_directions() {
        assert!(satisfies(&set(&["INVOICE_VIEW"]), "INVOICE.VIEW"));
        assert!(satisfies(&set(&["INVOICE.VIEW"]), "INVOICE_VIEW"));
    }

    #[test]
    fn test_required_is_trimmed() {
        assert!(satisfies(&set(&["INVOICE_VIEW"]), "  INVOICE.VIEW  "));
    }

    #[test]
    fn test_wildcard_grants_anything_non_blank() {
        let admin = set(&["*"]);
        assert!(satisfies(&admin, "INVOICE_VIEW"));
        assert!(satisfies(&admin, "#not a code at all#"));
    }

    #[test]
    fn test_blank_requirement_fails_even_with_wildcard() {
        assert!(!satisfies(&set(&["*"]), ""));
        assert!(!satisfies(&set(&["*"]), "   "));
        assert!(!satisfies(&set(&["INVOICE_VIEW"]), ""));
    }

    #[test]
    fn test_empty_set_denies() {
        assert!(!satisfies(&PermissionSet::empty(), "INVOICE_VIEW"));
        assert!(!satisfies(&PermissionSet::empty(), "*"));
    }

    #[test]
    fn test_wildcard_requirement_is_not_a_grant() {
        // "*" as a requirement only matches a held "*".
        assert!(!satisfies(&set(&["INVOICE_VIEW"]), "*"));
    }

    #[test]
    fn test_satisfies_any() {
        let held = set(&["ROUTE_EDIT"]);
        assert!(satisfies_any(&held, &["INVOICE_VIEW", "ROUTE.EDIT"]));
        assert!(!satisfies_any(&held, &["INVOICE_VIEW", "FLEET_VIEW"]));
    }

    #[test]
    fn test_satisfies_any_empty_list() {
        let empty: [&str; 0] = [];
        assert!(!satisfies_any(&set(&["*"]), &empty));
        assert!(!satisfies_any(&set(&["A"]), &empty));
    }

    #[test]
    fn test_satisfies_any_skips_blank_entries() {
        assert!(satisfies_any(&set(&["A_VIEW"]), &["", "A.VIEW"]));
        assert!(!satisfies_any(&set(&["*"]), &["", "  "]));
    }
}
