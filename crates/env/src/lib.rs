//! Environment lookup helpers.
//!
//! Helpers take a lookup function instead of reading the process environment directly. Pass
//! [`process_env`] in production; tests pass a map and never touch process-wide state.

use std::path::PathBuf;

/// Variables whose presence marks a CI environment.
pub const CI_MARKERS: &[&str] = &[
    "CI",
    "JENKINS_URL",
    "JENKINS_HOME",
    "TRAVIS",
    "CIRCLECI",
    "GITLAB_CI",
    "GITHUB_ACTIONS",
    "BITRISE_IO",
    "TEAMCITY_VERSION",
];

/// Read a variable from the process environment.
#[must_use]
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Trimmed, non-empty string value.
pub fn env_string_with(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `true` for `1`, `true`, `yes` or `on` (case-insensitive).
pub fn env_flag_with(lookup: impl Fn(&str) -> Option<String>, name: &str) -> bool {
    parse_bool(&lookup(name).unwrap_or_default()).unwrap_or(false)
}

/// Whether the variable is present at all, regardless of its value.
pub fn env_present_with(lookup: impl Fn(&str) -> Option<String>, name: &str) -> bool {
    lookup(name).is_some()
}

/// `None` when `raw` is not a recognised boolean spelling.
#[must_use]
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Best-effort CI detection based on [`CI_MARKERS`].
pub fn is_ci_with(lookup: impl Fn(&str) -> Option<String>) -> bool {
    CI_MARKERS.iter().any(|name| lookup(name).is_some())
}

/// The user's home directory, from `HOME` (or `USERPROFILE` on Windows-like environments).
pub fn home_dir_with(lookup: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    env_string_with(&lookup, "HOME")
        .or_else(|| env_string_with(&lookup, "USERPROFILE"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn flags_accept_common_truthy_spellings() {
        for raw in ["1", "true", "TRUE", "yes", "On"] {
            assert!(env_flag_with(lookup(&[("X", raw)]), "X"), "{raw}");
        }
        assert!(!env_flag_with(lookup(&[("X", "0")]), "X"));
        assert!(!env_flag_with(lookup(&[("X", "nope")]), "X"));
        assert!(!env_flag_with(lookup(&[]), "X"));
    }

    #[test]
    fn parse_bool_is_tristate() {
        assert_eq!(parse_bool(" false "), Some(false));
        assert_eq!(parse_bool("YES"), Some(true));
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn strings_are_trimmed_and_empty_is_none() {
        assert_eq!(
            env_string_with(lookup(&[("X", "  abc ")]), "X").as_deref(),
            Some("abc")
        );
        assert_eq!(env_string_with(lookup(&[("X", "   ")]), "X"), None);
    }

    #[test]
    fn ci_detected_from_any_marker() {
        assert!(is_ci_with(lookup(&[("GITHUB_ACTIONS", "true")])));
        assert!(is_ci_with(lookup(&[("JENKINS_URL", "")])));
        assert!(!is_ci_with(lookup(&[("HOME", "/root")])));
    }

    #[test]
    fn home_prefers_home_over_userprofile() {
        let home = home_dir_with(lookup(&[("HOME", "/home/a"), ("USERPROFILE", "C:\\b")]));
        assert_eq!(home, Some(PathBuf::from("/home/a")));
        let home = home_dir_with(lookup(&[("USERPROFILE", "C:\\b")]));
        assert_eq!(home, Some(PathBuf::from("C:\\b")));
        assert_eq!(home_dir_with(lookup(&[])), None);
    }
}
