//! Unit selection by name

use std::borrow::Cow;
use std::collections::HashSet;

use tracing::debug;

use crate::discovery::Unit;

/// Narrow `units` down to those whose name exactly matches one of `requested`.
///
/// An empty request selects every unit and borrows the input unchanged.
/// Discovery order is preserved, and requested names that match nothing
/// are ignored.
pub fn select<'a, S: AsRef<str>>(units: &'a [Unit], requested: &[S]) -> Cow<'a, [Unit]> {
    if requested.is_empty() {
        return Cow::Borrowed(units);
    }

    let wanted: HashSet<&str> = requested.iter().map(|name| name.as_ref()).collect();
    let selected: Vec<Unit> = units
        .iter()
        .filter(|unit| wanted.contains(unit.name.as_str()))
        .cloned()
        .collect();

    debug!(
        requested = wanted.len(),
        selected = selected.len(),
        "filtered units"
    );
    Cow::Owned(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units() -> Vec<Unit> {
        ["svc-a", "svc-b", "svc-c"]
            .iter()
            .map(|name| Unit::from_path(format!("/repo/{}", name)))
            .collect()
    }

    fn names(units: &[Unit]) -> Vec<&str> {
        units.iter().map(|u| u.name.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_selects_all() {
        let all = units();
        let selected = select::<&str>(&all, &[]);
        assert!(matches!(selected, Cow::Borrowed(_)));
        assert_eq!(&*selected, all.as_slice());
    }

    #[test]
    fn test_single_name() {
        let all = units();
        let selected = select(&all, &["svc-b"]);
        assert_eq!(names(&selected), vec!["svc-b"]);
    }

    #[test]
    fn test_preserves_discovery_order() {
        let all = units();
        let selected = select(&all, &["svc-c".to_string(), "svc-a".to_string()]);
        assert_eq!(names(&selected), vec!["svc-a", "svc-c"]);
    }

    #[test]
    fn test_unknown_names_are_ignored() {
        let all = units();
        let selected = select(&all, &["svc-x", "svc-a"]);
        assert_eq!(names(&selected), vec!["svc-a"]);

        let none = select(&all, &["svc-typo"]);
        assert!(none.is_empty());
    }

    #[test]
    fn test_exact_match_only() {
        let all = units();
        assert!(select(&all, &["svc"]).is_empty());
        assert!(select(&all, &["SVC-A"]).is_empty());
    }

    #[test]
    fn test_duplicate_names_all_selected() {
        let all = vec![
            Unit::from_path("/repo/team-a/api"),
            Unit::from_path("/repo/web"),
            Unit::from_path("/repo/team-b/api"),
        ];
        let selected = select(&all, &["api", "api"]);
        assert_eq!(selected.len(), 2);
    }
}
